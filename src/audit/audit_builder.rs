use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::errors::InternalError;
use crate::stores::AuditStore;
use crate::types::internal::audit::{AuditEvent, EventType};
use crate::types::internal::context::RequestContext;

/// Builder for activity log entries
///
/// Provides a fluent API for constructing audit events with type-safe field
/// addition and hashing of sensitive values.
///
/// # Example
/// ```ignore
/// app_data
///     .audit_logger
///     .builder(EventType::MemberStatusChanged)
///     .with_context(ctx)
///     .add_field("member_id", &member.id)
///     .add_field("to", "ACTIVE")
///     .emit()
///     .await;
/// ```
pub struct AuditBuilder {
    event_type: EventType,
    user_id: Option<String>,
    ip_address: Option<String>,
    jwt_id: Option<String>,
    data: HashMap<String, serde_json::Value>,
    store: Arc<AuditStore>,
}

impl AuditBuilder {
    pub fn new(store: Arc<AuditStore>, event_type: impl Into<EventType>) -> Self {
        Self {
            event_type: event_type.into(),
            user_id: None,
            ip_address: None,
            jwt_id: None,
            data: HashMap::new(),
            store,
        }
    }

    /// Populate actor, IP, JWT id and request metadata from the context
    pub fn with_context(mut self, ctx: &RequestContext) -> Self {
        self.user_id = Some(ctx.actor_id.clone());
        self.ip_address = ctx.ip_address.clone();
        self.jwt_id = ctx.jwt_id().map(str::to_string);

        self.data.insert("request_id".to_string(), json!(ctx.request_id));
        self.data.insert("source".to_string(), json!(format!("{:?}", ctx.source)));
        self
    }

    /// Override the actor, e.g. for a login where the context is still anonymous
    pub fn user_id(mut self, id: impl Into<String>) -> Self {
        self.user_id = Some(id.into());
        self
    }

    pub fn jwt_id(mut self, id: impl Into<String>) -> Self {
        self.jwt_id = Some(id.into());
        self
    }

    /// Add a field to the event data; values that fail to serialize are skipped
    pub fn add_field(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.data.insert(key.into(), json_value);
        }
        self
    }

    /// Add a field stored as a SHA-256 digest
    ///
    /// Same input always produces the same digest, so events stay correlatable
    /// without revealing the value.
    pub fn add_sensitive(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(json_value) = serde_json::to_value(&value) {
            let digest = Sha256::digest(json_value.to_string().as_bytes());
            self.data.insert(key.into(), json!(format!("sha256:{:x}", digest)));
        }
        self
    }

    pub fn build(self) -> AuditEvent {
        AuditEvent {
            event_type: self.event_type,
            user_id: self.user_id.unwrap_or_else(|| "unknown".to_string()),
            ip_address: self.ip_address,
            jwt_id: self.jwt_id,
            data: self.data,
        }
    }

    /// Write the event, returning storage failures to the caller
    pub async fn write(self) -> Result<(), InternalError> {
        let store = self.store.clone();
        store.write_event(self.build()).await
    }

    /// Write the event; failures are logged and swallowed
    pub async fn emit(self) {
        let event_type = self.event_type.clone();
        if let Err(e) = self.write().await {
            tracing::error!("Failed to write audit event {}: {}", event_type, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::audit_store::AuditFilter;
    use crate::test::utils::setup_test_audit_db;
    use crate::types::dto::common::PageRequest;

    #[tokio::test]
    async fn test_context_fields_are_recorded() {
        let store = Arc::new(AuditStore::new(setup_test_audit_db().await));
        let ctx = RequestContext::new().with_ip_address("10.1.2.3");

        AuditBuilder::new(store.clone(), EventType::MemberCreated)
            .with_context(&ctx)
            .user_id("actor-1")
            .add_field("member_id", "m-1")
            .write()
            .await
            .unwrap();

        let (events, total) = store
            .list_events(&AuditFilter::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(events[0].event_type, "member_created");
        assert_eq!(events[0].user_id, "actor-1");
        assert_eq!(events[0].ip_address.as_deref(), Some("10.1.2.3"));
        let data: serde_json::Value = serde_json::from_str(&events[0].data).unwrap();
        assert_eq!(data["member_id"], "m-1");
        assert_eq!(data["request_id"], ctx.request_id.as_str());
    }

    #[test]
    fn test_sensitive_values_are_hashed() {
        let store = Arc::new(AuditStore::new(sea_orm::DatabaseConnection::Disconnected));
        let event = AuditBuilder::new(store, "custom_event")
            .add_sensitive("password", "hunter2")
            .build();

        let value = event.data["password"].as_str().unwrap();
        assert!(value.starts_with("sha256:"));
        assert!(!value.contains("hunter2"));
    }
}
