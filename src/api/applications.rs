use std::sync::Arc;

use poem::Request;
use poem_openapi::param::{Path, Query};
use poem_openapi::{OpenApi, Tags, payload::Json};

use crate::api::BearerAuth;
use crate::api::helpers::require_context;
use crate::app_data::AppData;
use crate::coordinators::ApplicationCoordinator;
use crate::errors::AdminError;
use crate::types::db::panel_user_application::ApplicationStatus;
use crate::types::dto::applications::{
    ApplicationListResponse, ApplicationResponse, ApprovalResponse, CreateApplicationRequest,
    ReviewApplicationRequest,
};
use crate::types::dto::common::{PageInfo, PageRequest};

/// Approval workflow for promoting members to panel users
pub struct ApplicationApi {
    app_data: Arc<AppData>,
    application_coordinator: ApplicationCoordinator,
}

impl ApplicationApi {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            application_coordinator: ApplicationCoordinator::new(app_data.clone()),
            app_data,
        }
    }
}

#[derive(Tags)]
enum ApplicationTags {
    /// Panel user applications
    PanelUserApplications,
}

#[OpenApi]
impl ApplicationApi {
    #[oai(path = "/panel-user-applications", method = "get", tag = "ApplicationTags::PanelUserApplications")]
    async fn list(
        &self,
        req: &Request,
        auth: BearerAuth,
        status: Query<Option<ApplicationStatus>>,
        page: Query<Option<u64>>,
        page_size: Query<Option<u64>>,
    ) -> Result<Json<ApplicationListResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;
        let page = PageRequest::new(page.0, page_size.0);

        let (applications, total) = self
            .application_coordinator
            .list(&ctx, status.0, page)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(ApplicationListResponse {
            items: applications.into_iter().map(Into::into).collect(),
            page: PageInfo::new(page, total),
        }))
    }

    #[oai(path = "/panel-user-applications/:id", method = "get", tag = "ApplicationTags::PanelUserApplications")]
    async fn get(&self, req: &Request, auth: BearerAuth, id: Path<String>) -> Result<Json<ApplicationResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        let application = self
            .application_coordinator
            .get(&ctx, &id.0)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(application.into()))
    }

    /// Apply for an active member to become a panel user
    #[oai(path = "/panel-user-applications", method = "post", tag = "ApplicationTags::PanelUserApplications")]
    async fn create(
        &self,
        req: &Request,
        auth: BearerAuth,
        body: Json<CreateApplicationRequest>,
    ) -> Result<Json<ApplicationResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        let application = self
            .application_coordinator
            .create(&ctx, body.0.into())
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(application.into()))
    }

    /// Approve a pending application and create the panel user
    ///
    /// The temporary password is only ever returned by this response.
    #[oai(path = "/panel-user-applications/:id/approve", method = "post", tag = "ApplicationTags::PanelUserApplications")]
    async fn approve(
        &self,
        req: &Request,
        auth: BearerAuth,
        id: Path<String>,
        body: Json<ReviewApplicationRequest>,
    ) -> Result<Json<ApprovalResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        let outcome = self
            .application_coordinator
            .approve(&ctx, &id.0, body.0.note)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(outcome.into()))
    }

    /// Reject a pending application; a note is required
    #[oai(path = "/panel-user-applications/:id/reject", method = "post", tag = "ApplicationTags::PanelUserApplications")]
    async fn reject(
        &self,
        req: &Request,
        auth: BearerAuth,
        id: Path<String>,
        body: Json<ReviewApplicationRequest>,
    ) -> Result<Json<ApplicationResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        let application = self
            .application_coordinator
            .reject(&ctx, &id.0, body.0.note)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(application.into()))
    }
}
