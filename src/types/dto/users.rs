use poem_openapi::Object;
use poem_openapi::types::MaybeUndefined;

use crate::coordinators::user_coordinator::{CreateUserInput, UserDetails};
use crate::stores::user_store::UserChanges;
use crate::types::db::user;
use crate::types::dto::common::PageInfo;
use crate::types::dto::into_change;
use crate::types::dto::roles::RoleSummary;
use crate::types::internal::permission::SystemRole;
use crate::types::internal::scope::{ScopeInput, ScopeRef};

/// Province and/or district; a district alone implies its province
#[derive(Object, Debug, Clone, Default)]
pub struct ScopeRequest {
    pub province_id: Option<String>,
    pub district_id: Option<String>,
}

impl From<ScopeRequest> for ScopeInput {
    fn from(request: ScopeRequest) -> Self {
        Self {
            province_id: request.province_id,
            district_id: request.district_id,
        }
    }
}

#[derive(Object, Debug, Clone)]
pub struct ScopeResponse {
    pub province_id: String,
    /// Absent for a province-wide scope
    pub district_id: Option<String>,
}

impl From<ScopeRef> for ScopeResponse {
    fn from(scope: ScopeRef) -> Self {
        Self {
            province_id: scope.province_id,
            district_id: scope.district_id,
        }
    }
}

#[derive(Object, Debug, Clone)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub email: Option<String>,
    pub roles: Vec<SystemRole>,
    /// Member record this account was promoted from
    pub member_id: Option<String>,
    pub is_active: bool,
    pub password_change_required: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        let roles = user.system_roles().unwrap_or_else(|e| {
            tracing::error!(user_id = %user.id, "Unreadable role column: {}", e);
            Vec::new()
        });
        Self {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            email: user.email,
            roles,
            member_id: user.member_id,
            is_active: user.is_active,
            password_change_required: user.password_change_required,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// A user with custom roles and scopes
#[derive(Object, Debug)]
pub struct UserDetailResponse {
    #[oai(flatten)]
    pub user: UserResponse,
    pub custom_roles: Vec<RoleSummary>,
    pub scopes: Vec<ScopeResponse>,
}

impl From<UserDetails> for UserDetailResponse {
    fn from(details: UserDetails) -> Self {
        Self {
            user: details.user.into(),
            custom_roles: details.custom_roles.into_iter().map(RoleSummary::from).collect(),
            scopes: details.scopes.into_iter().map(ScopeResponse::from).collect(),
        }
    }
}

#[derive(Object, Debug)]
pub struct UserListResponse {
    pub items: Vec<UserResponse>,
    pub page: PageInfo,
}

#[derive(Object, Debug)]
pub struct CreateUserRequest {
    #[oai(validator(min_length = 3, max_length = 64))]
    pub username: String,
    pub password: String,
    #[oai(validator(min_length = 1, max_length = 200))]
    pub full_name: String,
    pub email: Option<String>,
    #[oai(default)]
    pub roles: Vec<SystemRole>,
    #[oai(default)]
    pub custom_role_ids: Vec<String>,
    #[oai(default)]
    pub scopes: Vec<ScopeRequest>,
}

impl From<CreateUserRequest> for CreateUserInput {
    fn from(request: CreateUserRequest) -> Self {
        Self {
            username: request.username,
            password: request.password,
            full_name: request.full_name,
            email: request.email,
            roles: request.roles,
            custom_role_ids: request.custom_role_ids,
            scopes: request.scopes.into_iter().map(ScopeInput::from).collect(),
        }
    }
}

/// Fields left out are unchanged; `email: null` clears the address
#[derive(Object, Debug, Default)]
pub struct UpdateUserRequest {
    pub full_name: Option<String>,
    pub email: MaybeUndefined<String>,
    pub roles: Option<Vec<SystemRole>>,
    pub is_active: Option<bool>,
}

impl From<UpdateUserRequest> for UserChanges {
    fn from(request: UpdateUserRequest) -> Self {
        Self {
            full_name: request.full_name,
            email: into_change(request.email),
            roles: request.roles,
            is_active: request.is_active,
        }
    }
}

#[derive(Object, Debug)]
pub struct AssignRolesRequest {
    /// Complete set of custom role ids; replaces the current assignment
    pub role_ids: Vec<String>,
}

#[derive(Object, Debug)]
pub struct ReplaceScopesRequest {
    pub scopes: Vec<ScopeRequest>,
}
