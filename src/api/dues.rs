use std::sync::Arc;

use poem::Request;
use poem_openapi::param::{Path, Query};
use poem_openapi::{OpenApi, Tags, payload::Json};

use crate::api::BearerAuth;
use crate::api::helpers::require_context;
use crate::app_data::AppData;
use crate::coordinators::DuesCoordinator;
use crate::errors::AdminError;
use crate::types::dto::common::{MessageResponse, PageInfo, PageRequest};
use crate::types::dto::dues::{
    DuesSummaryResponse, PaymentListResponse, PaymentResponse, RecordPaymentRequest, UpdatePaymentRequest,
};
use crate::types::dto::into_change;

/// Membership dues
pub struct DuesApi {
    app_data: Arc<AppData>,
    dues_coordinator: DuesCoordinator,
}

impl DuesApi {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            dues_coordinator: DuesCoordinator::new(app_data.clone()),
            app_data,
        }
    }
}

#[derive(Tags)]
enum DuesTags {
    /// Dues payments
    Dues,
}

#[OpenApi]
impl DuesApi {
    /// List payments, optionally for one period (`YYYY-MM`)
    #[oai(path = "/dues", method = "get", tag = "DuesTags::Dues")]
    async fn list(
        &self,
        req: &Request,
        auth: BearerAuth,
        period: Query<Option<String>>,
        page: Query<Option<u64>>,
        page_size: Query<Option<u64>>,
    ) -> Result<Json<PaymentListResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;
        let page = PageRequest::new(page.0, page_size.0);

        let (payments, total) = self
            .dues_coordinator
            .list(&ctx, period.0.as_deref(), page)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(PaymentListResponse {
            items: payments.into_iter().map(Into::into).collect(),
            page: PageInfo::new(page, total),
        }))
    }

    /// Record a payment for an active member
    #[oai(path = "/dues", method = "post", tag = "DuesTags::Dues")]
    async fn record(&self, req: &Request, auth: BearerAuth, body: Json<RecordPaymentRequest>) -> Result<Json<PaymentResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        let payment = self
            .dues_coordinator
            .record(&ctx, body.0.into())
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(payment.into()))
    }

    #[oai(path = "/dues/:id", method = "patch", tag = "DuesTags::Dues")]
    async fn update(
        &self,
        req: &Request,
        auth: BearerAuth,
        id: Path<String>,
        body: Json<UpdatePaymentRequest>,
    ) -> Result<Json<PaymentResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;
        let UpdatePaymentRequest { amount_cents, note } = body.0;

        let payment = self
            .dues_coordinator
            .update(&ctx, &id.0, amount_cents, into_change(note))
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(payment.into()))
    }

    #[oai(path = "/dues/:id", method = "delete", tag = "DuesTags::Dues")]
    async fn delete(&self, req: &Request, auth: BearerAuth, id: Path<String>) -> Result<Json<MessageResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        self.dues_coordinator
            .delete(&ctx, &id.0)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(MessageResponse::new("Payment deleted")))
    }

    /// All payments of one member, newest period first
    #[oai(path = "/members/:id/dues", method = "get", tag = "DuesTags::Dues")]
    async fn list_for_member(
        &self,
        req: &Request,
        auth: BearerAuth,
        id: Path<String>,
    ) -> Result<Json<Vec<PaymentResponse>>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        let payments = self
            .dues_coordinator
            .list_for_member(&ctx, &id.0)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(payments.into_iter().map(Into::into).collect()))
    }

    /// Total paid and the periods covered
    #[oai(path = "/members/:id/dues/summary", method = "get", tag = "DuesTags::Dues")]
    async fn summary(&self, req: &Request, auth: BearerAuth, id: Path<String>) -> Result<Json<DuesSummaryResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        let summary = self
            .dues_coordinator
            .summary(&ctx, &id.0)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(summary.into()))
    }
}
