use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use crate::app_data::AppData;
use crate::coordinators::authorize;
use crate::errors::InternalError;
use crate::errors::internal::{DuesError, MemberError};
use crate::providers::AccessProfile;
use crate::stores::dues_store::{DuesSummary, NewPayment};
use crate::types::db::dues_payment;
use crate::types::db::member::{self, MemberStatus};
use crate::types::dto::common::PageRequest;
use crate::types::internal::audit::EventType;
use crate::types::internal::context::RequestContext;
use crate::types::internal::permission::Permission;

#[derive(Debug, Clone)]
pub struct RecordPaymentInput {
    pub member_id: String,
    pub period: String,
    pub amount_cents: i64,
    /// Unix seconds; defaults to now
    pub paid_at: Option<i64>,
    pub note: Option<String>,
}

/// Periods are calendar months written `YYYY-MM`
pub fn validate_period(period: &str) -> Result<(), InternalError> {
    let valid = period.len() == 7 && NaiveDate::parse_from_str(&format!("{period}-01"), "%Y-%m-%d").is_ok();
    if valid {
        Ok(())
    } else {
        Err(DuesError::InvalidPeriod(period.to_string()).into())
    }
}

/// Largest single payment accepted, in cents
pub const MAX_AMOUNT_CENTS: i64 = 10_000_000_000;

fn validate_amount(amount_cents: i64) -> Result<(), InternalError> {
    if (1..=MAX_AMOUNT_CENTS).contains(&amount_cents) {
        Ok(())
    } else {
        Err(DuesError::InvalidAmount.into())
    }
}

pub struct DuesCoordinator {
    app_data: Arc<AppData>,
}

impl DuesCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self { app_data }
    }

    async fn scoped_member(&self, profile: &AccessProfile, member_id: &str) -> Result<member::Model, InternalError> {
        let member = self
            .app_data
            .member_store
            .get(&self.app_data.connections.main, member_id)
            .await?;
        profile.ensure_in_scope(&member.province_id, member.district_id.as_deref())?;
        Ok(member)
    }

    /// Load a payment whose member is inside the caller's scope
    async fn scoped_payment(&self, profile: &AccessProfile, payment_id: &str) -> Result<dues_payment::Model, InternalError> {
        let payment = self
            .app_data
            .dues_store
            .get(&self.app_data.connections.main, payment_id)
            .await?;
        self.scoped_member(profile, &payment.member_id).await?;
        Ok(payment)
    }

    pub async fn list_for_member(
        &self,
        ctx: &RequestContext,
        member_id: &str,
    ) -> Result<Vec<dues_payment::Model>, InternalError> {
        let profile = authorize(&self.app_data, ctx, Permission::DuesList).await?;
        self.scoped_member(&profile, member_id).await?;
        self.app_data
            .dues_store
            .list_for_member(&self.app_data.connections.main, member_id)
            .await
    }

    pub async fn list(
        &self,
        ctx: &RequestContext,
        period: Option<&str>,
        page: PageRequest,
    ) -> Result<(Vec<dues_payment::Model>, u64), InternalError> {
        let profile = authorize(&self.app_data, ctx, Permission::DuesList).await?;
        if let Some(period) = period {
            validate_period(period)?;
        }
        self.app_data
            .dues_store
            .list(&self.app_data.connections.main, period, &profile.member_scope(), page)
            .await
    }

    pub async fn summary(&self, ctx: &RequestContext, member_id: &str) -> Result<DuesSummary, InternalError> {
        let profile = authorize(&self.app_data, ctx, Permission::DuesList).await?;
        self.scoped_member(&profile, member_id).await?;
        self.app_data
            .dues_store
            .summary(&self.app_data.connections.main, member_id)
            .await
    }

    /// Record a payment for an ACTIVE member
    pub async fn record(&self, ctx: &RequestContext, input: RecordPaymentInput) -> Result<dues_payment::Model, InternalError> {
        let profile = authorize(&self.app_data, ctx, Permission::DuesCreate).await?;
        let period = input.period.trim().to_string();
        validate_period(&period)?;
        validate_amount(input.amount_cents)?;

        let member = self.scoped_member(&profile, &input.member_id).await?;
        if member.status != MemberStatus::Active {
            return Err(MemberError::NotActive.into());
        }

        let payment = self
            .app_data
            .dues_store
            .create(
                &self.app_data.connections.main,
                NewPayment {
                    member_id: member.id,
                    period,
                    amount_cents: input.amount_cents,
                    paid_at: input.paid_at.unwrap_or_else(|| Utc::now().timestamp()),
                    note: input.note,
                    recorded_by: profile.user_id().to_string(),
                },
            )
            .await?;

        self.app_data
            .audit_logger
            .builder(EventType::DuesRecorded)
            .with_context(ctx)
            .add_field("payment_id", &payment.id)
            .add_field("member_id", &payment.member_id)
            .add_field("period", &payment.period)
            .add_field("amount_cents", payment.amount_cents)
            .emit()
            .await;

        Ok(payment)
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        payment_id: &str,
        amount_cents: Option<i64>,
        note: Option<Option<String>>,
    ) -> Result<dues_payment::Model, InternalError> {
        let profile = authorize(&self.app_data, ctx, Permission::DuesUpdate).await?;
        if let Some(amount_cents) = amount_cents {
            validate_amount(amount_cents)?;
        }
        let before = self.scoped_payment(&profile, payment_id).await?;

        let payment = self
            .app_data
            .dues_store
            .update(&self.app_data.connections.main, payment_id, amount_cents, note)
            .await?;

        self.app_data
            .audit_logger
            .builder(EventType::DuesUpdated)
            .with_context(ctx)
            .add_field("payment_id", payment_id)
            .add_field("previous_amount_cents", before.amount_cents)
            .add_field("amount_cents", payment.amount_cents)
            .emit()
            .await;

        Ok(payment)
    }

    pub async fn delete(&self, ctx: &RequestContext, payment_id: &str) -> Result<(), InternalError> {
        let profile = authorize(&self.app_data, ctx, Permission::DuesDelete).await?;
        let payment = self.scoped_payment(&profile, payment_id).await?;

        self.app_data
            .dues_store
            .delete(&self.app_data.connections.main, payment_id)
            .await?;

        self.app_data
            .audit_logger
            .builder(EventType::DuesDeleted)
            .with_context(ctx)
            .add_field("payment_id", payment_id)
            .add_field("member_id", &payment.member_id)
            .add_field("period", &payment.period)
            .emit()
            .await;

        Ok(())
    }
}
