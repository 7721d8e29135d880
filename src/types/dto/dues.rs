use poem_openapi::Object;
use poem_openapi::types::MaybeUndefined;

use crate::coordinators::dues_coordinator::RecordPaymentInput;
use crate::stores::dues_store::DuesSummary;
use crate::types::db::dues_payment;
use crate::types::dto::common::PageInfo;

#[derive(Object, Debug)]
pub struct PaymentResponse {
    pub id: String,
    pub member_id: String,
    /// `YYYY-MM`
    pub period: String,
    pub amount_cents: i64,
    pub paid_at: i64,
    pub note: Option<String>,
    pub recorded_by: String,
    pub created_at: i64,
}

impl From<dues_payment::Model> for PaymentResponse {
    fn from(payment: dues_payment::Model) -> Self {
        Self {
            id: payment.id,
            member_id: payment.member_id,
            period: payment.period,
            amount_cents: payment.amount_cents,
            paid_at: payment.paid_at,
            note: payment.note,
            recorded_by: payment.recorded_by,
            created_at: payment.created_at,
        }
    }
}

#[derive(Object, Debug)]
pub struct PaymentListResponse {
    pub items: Vec<PaymentResponse>,
    pub page: PageInfo,
}

#[derive(Object, Debug)]
pub struct RecordPaymentRequest {
    pub member_id: String,
    pub period: String,
    pub amount_cents: i64,
    /// Unix seconds, defaults to now
    pub paid_at: Option<i64>,
    pub note: Option<String>,
}

impl From<RecordPaymentRequest> for RecordPaymentInput {
    fn from(request: RecordPaymentRequest) -> Self {
        Self {
            member_id: request.member_id,
            period: request.period,
            amount_cents: request.amount_cents,
            paid_at: request.paid_at,
            note: request.note,
        }
    }
}

#[derive(Object, Debug, Default)]
pub struct UpdatePaymentRequest {
    pub amount_cents: Option<i64>,
    pub note: MaybeUndefined<String>,
}

#[derive(Object, Debug)]
pub struct DuesSummaryResponse {
    pub member_id: String,
    pub total_cents: i64,
    pub payment_count: u64,
    /// Sorted ascending
    pub periods: Vec<String>,
}

impl From<DuesSummary> for DuesSummaryResponse {
    fn from(summary: DuesSummary) -> Self {
        Self {
            member_id: summary.member_id,
            total_cents: summary.total_cents,
            payment_count: summary.payment_count,
            periods: summary.periods,
        }
    }
}
