use poem_openapi::Object;

use crate::coordinators::application_coordinator::{ApprovalOutcome, CreateApplicationInput};
use crate::types::db::panel_user_application::{self, ApplicationStatus};
use crate::types::dto::common::PageInfo;
use crate::types::dto::users::{ScopeRequest, ScopeResponse, UserResponse};
use crate::types::internal::scope::ScopeInput;

#[derive(Object, Debug)]
pub struct ApplicationResponse {
    pub id: String,
    pub member_id: String,
    pub requested_username: String,
    /// Custom role granted on approval
    pub requested_role_id: String,
    pub scopes: Vec<ScopeResponse>,
    pub note: Option<String>,
    pub status: ApplicationStatus,
    pub created_by: String,
    pub reviewed_by: Option<String>,
    pub review_note: Option<String>,
    pub created_user_id: Option<String>,
    pub created_at: i64,
    pub reviewed_at: Option<i64>,
}

impl From<panel_user_application::Model> for ApplicationResponse {
    fn from(application: panel_user_application::Model) -> Self {
        let scopes = application.scope_refs().unwrap_or_else(|e| {
            tracing::error!(application_id = %application.id, "Unreadable scope column: {}", e);
            Vec::new()
        });
        Self {
            id: application.id,
            member_id: application.member_id,
            requested_username: application.requested_username,
            requested_role_id: application.requested_role_id,
            scopes: scopes.into_iter().map(ScopeResponse::from).collect(),
            note: application.note,
            status: application.status,
            created_by: application.created_by,
            reviewed_by: application.reviewed_by,
            review_note: application.review_note,
            created_user_id: application.created_user_id,
            created_at: application.created_at,
            reviewed_at: application.reviewed_at,
        }
    }
}

#[derive(Object, Debug)]
pub struct ApplicationListResponse {
    pub items: Vec<ApplicationResponse>,
    pub page: PageInfo,
}

#[derive(Object, Debug)]
pub struct CreateApplicationRequest {
    pub member_id: String,
    #[oai(validator(min_length = 3, max_length = 64))]
    pub requested_username: String,
    pub requested_role_id: String,
    #[oai(default)]
    pub scopes: Vec<ScopeRequest>,
    pub note: Option<String>,
}

impl From<CreateApplicationRequest> for CreateApplicationInput {
    fn from(request: CreateApplicationRequest) -> Self {
        Self {
            member_id: request.member_id,
            requested_username: request.requested_username,
            requested_role_id: request.requested_role_id,
            scopes: request.scopes.into_iter().map(ScopeInput::from).collect(),
            note: request.note,
        }
    }
}

#[derive(Object, Debug, Default)]
pub struct ReviewApplicationRequest {
    /// Required when rejecting
    pub note: Option<String>,
}

/// Approval result; the temporary password is shown only here
#[derive(Object, Debug)]
pub struct ApprovalResponse {
    pub application: ApplicationResponse,
    pub user: UserResponse,
    pub temporary_password: String,
}

impl From<ApprovalOutcome> for ApprovalResponse {
    fn from(outcome: ApprovalOutcome) -> Self {
        Self {
            application: outcome.application.into(),
            user: outcome.user.into(),
            temporary_password: outcome.temporary_password,
        }
    }
}
