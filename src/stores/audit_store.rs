use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::errors::InternalError;
use crate::errors::internal::AuditError;
use crate::types::db::audit_event;
use crate::types::dto::common::PageRequest;
use crate::types::internal::audit::AuditEvent;

/// Filters for browsing the activity log
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub event_type: Option<String>,
    pub user_id: Option<String>,
    pub since: Option<i64>,
    pub until: Option<i64>,
}

/// Repository for activity log storage
///
/// Owns its connection because the activity log lives in a separate database.
pub struct AuditStore {
    db: DatabaseConnection,
}

impl AuditStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Write an audit event to the database
    ///
    /// # Errors
    ///
    /// Returns `InternalError` if serialization or database insert fails
    pub async fn write_event(&self, event: AuditEvent) -> Result<(), InternalError> {
        let data_json = serde_json::to_string(&event.data).map_err(|e| {
            AuditError::LogWriteFailed(format!("Failed to serialize audit data: {}", e))
        })?;

        let audit_event = audit_event::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            timestamp: Set(Utc::now().timestamp()),
            event_type: Set(event.event_type.to_string()),
            user_id: Set(event.user_id),
            ip_address: Set(event.ip_address),
            jwt_id: Set(event.jwt_id),
            data: Set(data_json),
        };

        audit_event
            .insert(&self.db)
            .await
            .map_err(|e| InternalError::database("write_audit_event", e))?;

        Ok(())
    }

    /// Newest first, paginated
    pub async fn list_events(
        &self,
        filter: &AuditFilter,
        page: PageRequest,
    ) -> Result<(Vec<audit_event::Model>, u64), InternalError> {
        let mut query = audit_event::Entity::find();
        if let Some(event_type) = &filter.event_type {
            query = query.filter(audit_event::Column::EventType.eq(event_type.as_str()));
        }
        if let Some(user_id) = &filter.user_id {
            query = query.filter(audit_event::Column::UserId.eq(user_id.as_str()));
        }
        if let Some(since) = filter.since {
            query = query.filter(audit_event::Column::Timestamp.gte(since));
        }
        if let Some(until) = filter.until {
            query = query.filter(audit_event::Column::Timestamp.lte(until));
        }

        let paginator = query
            .order_by_desc(audit_event::Column::Timestamp)
            .order_by_desc(audit_event::Column::Id)
            .paginate(&self.db, page.page_size);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| InternalError::database("count_audit_events", e))?;
        let events = paginator
            .fetch_page(page.index())
            .await
            .map_err(|e| InternalError::database("list_audit_events", e))?;

        Ok((events, total))
    }

    /// Delete events strictly older than the cutoff, returning how many went
    pub async fn delete_older_than(&self, cutoff: i64) -> Result<u64, InternalError> {
        let result = audit_event::Entity::delete_many()
            .filter(audit_event::Column::Timestamp.lt(cutoff))
            .exec(&self.db)
            .await
            .map_err(|e| InternalError::database("prune_audit_events", e))?;

        Ok(result.rows_affected)
    }

    /// Test-only raw insert with an explicit timestamp
    #[cfg(test)]
    pub async fn insert_at(&self, event_type: &str, user_id: &str, timestamp: i64) -> Result<(), InternalError> {
        audit_event::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            timestamp: Set(timestamp),
            event_type: Set(event_type.to_string()),
            user_id: Set(user_id.to_string()),
            ip_address: Set(None),
            jwt_id: Set(None),
            data: Set("{}".to_string()),
        }
        .insert(&self.db)
        .await
        .map_err(|e| InternalError::database("insert_audit_event", e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::setup_test_audit_db;
    use crate::types::internal::audit::EventType;

    #[tokio::test]
    async fn test_write_and_list_events() {
        let store = AuditStore::new(setup_test_audit_db().await);

        let mut event = AuditEvent::new(EventType::MemberCreated);
        event.user_id = "admin-1".to_string();
        event.data.insert("member_id".to_string(), serde_json::json!("m-1"));
        store.write_event(event).await.unwrap();
        store.write_event(AuditEvent::new(EventType::LoginFailure)).await.unwrap();

        let (all, total) = store.list_events(&AuditFilter::default(), PageRequest::default()).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(all.len(), 2);

        let filter = AuditFilter {
            event_type: Some("member_created".to_string()),
            ..Default::default()
        };
        let (filtered, total) = store.list_events(&filter, PageRequest::default()).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(filtered[0].user_id, "admin-1");
        assert!(filtered[0].data.contains("m-1"));
    }

    #[tokio::test]
    async fn test_delete_older_than_keeps_recent_events() {
        let store = AuditStore::new(setup_test_audit_db().await);
        let now = Utc::now().timestamp();

        store.insert_at("old", "u", now - 400 * 86_400).await.unwrap();
        store.insert_at("recent", "u", now - 86_400).await.unwrap();

        let deleted = store.delete_older_than(now - 365 * 86_400).await.unwrap();
        assert_eq!(deleted, 1);

        let (remaining, _) = store.list_events(&AuditFilter::default(), PageRequest::default()).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].event_type, "recent");
    }
}
