use std::sync::Arc;

use poem::Request;
use poem_openapi::param::{Path, Query};
use poem_openapi::{OpenApi, Tags, payload::Json};

use crate::api::BearerAuth;
use crate::api::helpers::require_context;
use crate::app_data::AppData;
use crate::coordinators::MemberCoordinator;
use crate::errors::AdminError;
use crate::stores::member_store::MemberFilter;
use crate::types::db::member::MemberStatus;
use crate::types::dto::common::{MessageResponse, PageInfo, PageRequest};
use crate::types::dto::members::{
    ChangeMemberStatusRequest, CreateMemberRequest, MemberListResponse, MemberResponse, RejectMemberRequest,
    UpdateMemberRequest,
};

/// Member registry
pub struct MemberApi {
    app_data: Arc<AppData>,
    member_coordinator: MemberCoordinator,
}

impl MemberApi {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            member_coordinator: MemberCoordinator::new(app_data.clone()),
            app_data,
        }
    }
}

#[derive(Tags)]
enum MemberTags {
    /// Members and membership status
    Members,
}

#[OpenApi]
impl MemberApi {
    /// List members visible to the caller
    ///
    /// Scope restricted callers only see members inside their provinces and districts.
    #[oai(path = "/members", method = "get", tag = "MemberTags::Members")]
    async fn list(
        &self,
        req: &Request,
        auth: BearerAuth,
        status: Query<Option<MemberStatus>>,
        province_id: Query<Option<String>>,
        district_id: Query<Option<String>>,
        search: Query<Option<String>>,
        page: Query<Option<u64>>,
        page_size: Query<Option<u64>>,
    ) -> Result<Json<MemberListResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;
        let page = PageRequest::new(page.0, page_size.0);
        let filter = MemberFilter {
            status: status.0,
            province_id: province_id.0,
            district_id: district_id.0,
            search: search.0,
        };

        let (members, total) = self
            .member_coordinator
            .list(&ctx, &filter, page)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(MemberListResponse {
            items: members.into_iter().map(Into::into).collect(),
            page: PageInfo::new(page, total),
        }))
    }

    #[oai(path = "/members/:id", method = "get", tag = "MemberTags::Members")]
    async fn get(&self, req: &Request, auth: BearerAuth, id: Path<String>) -> Result<Json<MemberResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        let member = self
            .member_coordinator
            .get(&ctx, &id.0)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(member.into()))
    }

    /// Register a member
    ///
    /// New members start PENDING unless `membership_auto_approve` is on.
    #[oai(path = "/members", method = "post", tag = "MemberTags::Members")]
    async fn create(&self, req: &Request, auth: BearerAuth, body: Json<CreateMemberRequest>) -> Result<Json<MemberResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        let member = self
            .member_coordinator
            .create(&ctx, body.0.into())
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(member.into()))
    }

    #[oai(path = "/members/:id", method = "patch", tag = "MemberTags::Members")]
    async fn update(
        &self,
        req: &Request,
        auth: BearerAuth,
        id: Path<String>,
        body: Json<UpdateMemberRequest>,
    ) -> Result<Json<MemberResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        let member = self
            .member_coordinator
            .update(&ctx, &id.0, body.0.into())
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(member.into()))
    }

    /// Delete a PENDING or REJECTED member
    #[oai(path = "/members/:id", method = "delete", tag = "MemberTags::Members")]
    async fn delete(&self, req: &Request, auth: BearerAuth, id: Path<String>) -> Result<Json<MessageResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        self.member_coordinator
            .delete(&ctx, &id.0)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(MessageResponse::new("Member deleted")))
    }

    #[oai(path = "/members/:id/approve", method = "post", tag = "MemberTags::Members")]
    async fn approve(&self, req: &Request, auth: BearerAuth, id: Path<String>) -> Result<Json<MemberResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        let member = self
            .member_coordinator
            .approve(&ctx, &id.0)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(member.into()))
    }

    #[oai(path = "/members/:id/reject", method = "post", tag = "MemberTags::Members")]
    async fn reject(
        &self,
        req: &Request,
        auth: BearerAuth,
        id: Path<String>,
        body: Json<RejectMemberRequest>,
    ) -> Result<Json<MemberResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        let member = self
            .member_coordinator
            .reject(&ctx, &id.0, body.0.reason)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(member.into()))
    }

    /// Move a member along the status transition table
    #[oai(path = "/members/:id/status", method = "post", tag = "MemberTags::Members")]
    async fn change_status(
        &self,
        req: &Request,
        auth: BearerAuth,
        id: Path<String>,
        body: Json<ChangeMemberStatusRequest>,
    ) -> Result<Json<MemberResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;
        let ChangeMemberStatusRequest { status, reason } = body.0;

        let member = self
            .member_coordinator
            .change_status(&ctx, &id.0, status, reason)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(member.into()))
    }
}
