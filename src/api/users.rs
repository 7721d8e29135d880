use std::sync::Arc;

use poem::Request;
use poem_openapi::param::{Path, Query};
use poem_openapi::{OpenApi, Tags, payload::Json};

use crate::api::BearerAuth;
use crate::api::helpers::require_context;
use crate::app_data::AppData;
use crate::coordinators::UserCoordinator;
use crate::errors::AdminError;
use crate::stores::user_store::UserFilter;
use crate::types::dto::common::{PageInfo, PageRequest};
use crate::types::dto::users::{
    AssignRolesRequest, CreateUserRequest, ReplaceScopesRequest, UpdateUserRequest, UserDetailResponse,
    UserListResponse,
};

/// Panel user administration
pub struct UserApi {
    app_data: Arc<AppData>,
    user_coordinator: UserCoordinator,
}

impl UserApi {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            user_coordinator: UserCoordinator::new(app_data.clone()),
            app_data,
        }
    }
}

#[derive(Tags)]
enum UserTags {
    /// Panel user accounts, custom role assignment and scopes
    Users,
}

#[OpenApi]
impl UserApi {
    /// List users
    #[oai(path = "/users", method = "get", tag = "UserTags::Users")]
    async fn list(
        &self,
        req: &Request,
        auth: BearerAuth,
        is_active: Query<Option<bool>>,
        search: Query<Option<String>>,
        page: Query<Option<u64>>,
        page_size: Query<Option<u64>>,
    ) -> Result<Json<UserListResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;
        let page = PageRequest::new(page.0, page_size.0);
        let filter = UserFilter {
            is_active: is_active.0,
            search: search.0,
        };

        let (users, total) = self
            .user_coordinator
            .list(&ctx, &filter, page)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(UserListResponse {
            items: users.into_iter().map(Into::into).collect(),
            page: PageInfo::new(page, total),
        }))
    }

    /// Get a user with custom roles and scopes
    #[oai(path = "/users/:id", method = "get", tag = "UserTags::Users")]
    async fn get(&self, req: &Request, auth: BearerAuth, id: Path<String>) -> Result<Json<UserDetailResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        let details = self
            .user_coordinator
            .get(&ctx, &id.0)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(details.into()))
    }

    /// Create a user
    ///
    /// Only an ADMIN may grant the ADMIN system role.
    #[oai(path = "/users", method = "post", tag = "UserTags::Users")]
    async fn create(
        &self,
        req: &Request,
        auth: BearerAuth,
        body: Json<CreateUserRequest>,
    ) -> Result<Json<UserDetailResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        let details = self
            .user_coordinator
            .create(&ctx, body.0.into())
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(details.into()))
    }

    /// Update name, email, system roles or active flag
    #[oai(path = "/users/:id", method = "patch", tag = "UserTags::Users")]
    async fn update(
        &self,
        req: &Request,
        auth: BearerAuth,
        id: Path<String>,
        body: Json<UpdateUserRequest>,
    ) -> Result<Json<UserDetailResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        let details = self
            .user_coordinator
            .update(&ctx, &id.0, body.0.into())
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(details.into()))
    }

    /// Replace the user's custom roles
    #[oai(path = "/users/:id/roles", method = "put", tag = "UserTags::Users")]
    async fn assign_roles(
        &self,
        req: &Request,
        auth: BearerAuth,
        id: Path<String>,
        body: Json<AssignRolesRequest>,
    ) -> Result<Json<UserDetailResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        let details = self
            .user_coordinator
            .assign_roles(&ctx, &id.0, body.0.role_ids)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(details.into()))
    }

    /// Replace the user's province and district scopes
    #[oai(path = "/users/:id/scopes", method = "put", tag = "UserTags::Users")]
    async fn replace_scopes(
        &self,
        req: &Request,
        auth: BearerAuth,
        id: Path<String>,
        body: Json<ReplaceScopesRequest>,
    ) -> Result<Json<UserDetailResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;
        let scopes = body.0.scopes.into_iter().map(Into::into).collect();

        let details = self
            .user_coordinator
            .replace_scopes(&ctx, &id.0, scopes)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(details.into()))
    }

    /// Deactivate a user and revoke their refresh tokens
    #[oai(path = "/users/:id/deactivate", method = "post", tag = "UserTags::Users")]
    async fn deactivate(&self, req: &Request, auth: BearerAuth, id: Path<String>) -> Result<Json<UserDetailResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        let details = self
            .user_coordinator
            .deactivate(&ctx, &id.0)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(details.into()))
    }
}
