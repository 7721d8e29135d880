use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, QueryTrait, Set,
};
use uuid::Uuid;

use crate::errors::InternalError;
use crate::errors::internal::DuesError;
use crate::stores::is_unique_violation;
use crate::stores::member_store::scope_condition;
use crate::types::db::{dues_payment, member};
use crate::types::dto::common::PageRequest;
use crate::types::internal::scope::MemberScope;

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub member_id: String,
    pub period: String,
    pub amount_cents: i64,
    pub paid_at: i64,
    pub note: Option<String>,
    pub recorded_by: String,
}

/// Total paid by a member and the periods covered
#[derive(Debug, Clone, PartialEq)]
pub struct DuesSummary {
    pub member_id: String,
    pub total_cents: i64,
    pub payment_count: u64,
    pub periods: Vec<String>,
}

/// Repository for dues payments
pub struct DuesStore;

impl DuesStore {
    pub fn new() -> Self {
        Self
    }

    pub async fn get(&self, conn: &impl ConnectionTrait, payment_id: &str) -> Result<dues_payment::Model, InternalError> {
        dues_payment::Entity::find_by_id(payment_id.to_string())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("get_dues_payment", e))?
            .ok_or_else(|| DuesError::NotFound(payment_id.to_string()).into())
    }

    /// Every payment of one member, latest period first
    pub async fn list_for_member(
        &self,
        conn: &impl ConnectionTrait,
        member_id: &str,
    ) -> Result<Vec<dues_payment::Model>, InternalError> {
        dues_payment::Entity::find()
            .filter(dues_payment::Column::MemberId.eq(member_id))
            .order_by_desc(dues_payment::Column::Period)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_member_dues", e))
    }

    /// Paginated list of payments for members inside the scope
    pub async fn list(
        &self,
        conn: &impl ConnectionTrait,
        period: Option<&str>,
        scope: &MemberScope,
        page: PageRequest,
    ) -> Result<(Vec<dues_payment::Model>, u64), InternalError> {
        if scope.is_empty() {
            return Ok((Vec::new(), 0));
        }

        let mut query = dues_payment::Entity::find();
        if let Some(condition) = scope_condition(scope) {
            let visible_members = member::Entity::find()
                .select_only()
                .column(member::Column::Id)
                .filter(condition)
                .into_query();
            query = query.filter(dues_payment::Column::MemberId.in_subquery(visible_members));
        }
        if let Some(period) = period {
            query = query.filter(dues_payment::Column::Period.eq(period));
        }

        let paginator = query
            .order_by_desc(dues_payment::Column::Period)
            .order_by_desc(dues_payment::Column::PaidAt)
            .paginate(conn, page.page_size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| InternalError::database("count_dues", e))?;
        let payments = paginator
            .fetch_page(page.index())
            .await
            .map_err(|e| InternalError::database("list_dues", e))?;

        Ok((payments, total))
    }

    /// Record a payment
    ///
    /// # Errors
    /// `DuesError::DuplicatePeriod` when the member already paid for the period
    pub async fn create(&self, conn: &impl ConnectionTrait, payment: NewPayment) -> Result<dues_payment::Model, InternalError> {
        let existing = dues_payment::Entity::find()
            .filter(dues_payment::Column::MemberId.eq(payment.member_id.as_str()))
            .filter(dues_payment::Column::Period.eq(payment.period.as_str()))
            .count(conn)
            .await
            .map_err(|e| InternalError::database("count_dues_period", e))?;
        if existing > 0 {
            return Err(DuesError::DuplicatePeriod(payment.period).into());
        }

        let period = payment.period.clone();
        dues_payment::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            member_id: Set(payment.member_id),
            period: Set(payment.period),
            amount_cents: Set(payment.amount_cents),
            paid_at: Set(payment.paid_at),
            note: Set(payment.note),
            recorded_by: Set(payment.recorded_by),
            created_at: Set(Utc::now().timestamp()),
        }
        .insert(conn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DuesError::DuplicatePeriod(period).into()
            } else {
                InternalError::database("create_dues_payment", e)
            }
        })
    }

    pub async fn update(
        &self,
        conn: &impl ConnectionTrait,
        payment_id: &str,
        amount_cents: Option<i64>,
        note: Option<Option<String>>,
    ) -> Result<dues_payment::Model, InternalError> {
        let mut active: dues_payment::ActiveModel = self.get(conn, payment_id).await?.into();
        if let Some(amount_cents) = amount_cents {
            active.amount_cents = Set(amount_cents);
        }
        if let Some(note) = note {
            active.note = Set(note);
        }
        active
            .update(conn)
            .await
            .map_err(|e| InternalError::database("update_dues_payment", e))
    }

    pub async fn delete(&self, conn: &impl ConnectionTrait, payment_id: &str) -> Result<(), InternalError> {
        let result = dues_payment::Entity::delete_by_id(payment_id.to_string())
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("delete_dues_payment", e))?;
        if result.rows_affected == 0 {
            return Err(DuesError::NotFound(payment_id.to_string()).into());
        }
        Ok(())
    }

    pub async fn summary(&self, conn: &impl ConnectionTrait, member_id: &str) -> Result<DuesSummary, InternalError> {
        let payments = self.list_for_member(conn, member_id).await?;
        let total_cents = payments
            .iter()
            .try_fold(0i64, |total, p| total.checked_add(p.amount_cents))
            .ok_or_else(|| InternalError::parse("dues total", format!("sum overflows for member {member_id}")))?;
        let mut periods: Vec<String> = payments.iter().map(|p| p.period.clone()).collect();
        periods.sort();

        Ok(DuesSummary {
            member_id: member_id.to_string(),
            total_cents,
            payment_count: payments.len() as u64,
            periods,
        })
    }
}

impl Default for DuesStore {
    fn default() -> Self {
        Self::new()
    }
}
