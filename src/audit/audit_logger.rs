use std::sync::Arc;

use serde_json::json;

use crate::audit::AuditBuilder;
use crate::errors::InternalError;
use crate::stores::audit_store::AuditStore;
use crate::types::internal::audit::{AuditEvent, EventType};
use crate::types::internal::context::RequestContext;

/// Entry point for writing activity log entries
///
/// Coordinators use [`AuditLogger::builder`] for domain events. The login and
/// CLI helpers cover the events that happen before or outside a normal
/// authenticated request.
pub struct AuditLogger {
    pub audit_store: Arc<AuditStore>,
}

impl AuditLogger {
    pub fn new(audit_store: Arc<AuditStore>) -> Self {
        Self { audit_store }
    }

    pub fn builder(&self, event_type: impl Into<EventType>) -> AuditBuilder {
        AuditBuilder::new(self.audit_store.clone(), event_type)
    }

    fn context_event(ctx: &RequestContext, event_type: EventType) -> AuditEvent {
        let mut event = AuditEvent::new(event_type);
        event.user_id = ctx.actor_id.clone();
        event.ip_address = ctx.ip_address.clone();
        event.jwt_id = ctx.jwt_id().map(str::to_string);
        event.data.insert("request_id".to_string(), json!(ctx.request_id));
        event.data.insert("source".to_string(), json!(format!("{:?}", ctx.source)));
        event
    }

    /// Log a successful login; the actor is the user who just signed in
    pub async fn log_login_success(&self, ctx: &RequestContext, user_id: &str, jwt_id: &str) {
        let mut event = Self::context_event(ctx, EventType::LoginSuccess);
        event.user_id = user_id.to_string();
        event.jwt_id = Some(jwt_id.to_string());
        self.write_best_effort(event).await;
    }

    /// Log a failed login; the attempted username is stored hashed
    pub async fn log_login_failure(&self, ctx: &RequestContext, username: &str, reason: &str) {
        let builder = self
            .builder(EventType::LoginFailure)
            .with_context(ctx)
            .add_sensitive("username", username)
            .add_field("reason", reason);
        builder.emit().await;
    }

    pub async fn log_cli_session_start(
        &self,
        ctx: &RequestContext,
        command_name: &str,
        args: Vec<String>,
    ) -> Result<(), InternalError> {
        let mut event = Self::context_event(ctx, EventType::CliSessionStart);
        event.data.insert("command_name".to_string(), json!(command_name));
        event.data.insert("args".to_string(), json!(args));
        self.audit_store.write_event(event).await
    }

    pub async fn log_cli_session_end(
        &self,
        ctx: &RequestContext,
        command_name: &str,
        success: bool,
        error_message: Option<String>,
    ) -> Result<(), InternalError> {
        let mut event = Self::context_event(ctx, EventType::CliSessionEnd);
        event.data.insert("command_name".to_string(), json!(command_name));
        event.data.insert("success".to_string(), json!(success));
        if let Some(error) = error_message {
            event.data.insert("error_message".to_string(), json!(error));
        }
        self.audit_store.write_event(event).await
    }

    async fn write_best_effort(&self, event: AuditEvent) {
        let event_type = event.event_type.clone();
        if let Err(e) = self.audit_store.write_event(event).await {
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

    async fn logger() -> AuditLogger {
        AuditLogger::new(Arc::new(AuditStore::new(setup_test_audit_db().await)))
    }

    #[tokio::test]
    async fn test_login_failure_hashes_username() {
        let logger = logger().await;
        logger
            .log_login_failure(&RequestContext::new(), "alice", "invalid_credentials")
            .await;

        let (events, _) = logger
            .audit_store
            .list_events(&AuditFilter::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(events[0].event_type, "login_failure");
        assert!(!events[0].data.contains("alice"));
        assert!(events[0].data.contains("invalid_credentials"));
    }

    #[tokio::test]
    async fn test_login_success_records_user_and_jwt() {
        let logger = logger().await;
        logger.log_login_success(&RequestContext::new(), "user-1", "jti-1").await;

        let filter = AuditFilter {
            user_id: Some("user-1".to_string()),
            ..Default::default()
        };
        let (events, total) = logger.audit_store.list_events(&filter, PageRequest::default()).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(events[0].jwt_id.as_deref(), Some("jti-1"));
    }

    #[tokio::test]
    async fn test_cli_session_events() {
        let logger = logger().await;
        let ctx = RequestContext::for_cli("prune-logs");

        logger.log_cli_session_start(&ctx, "prune-logs", vec![]).await.unwrap();
        logger
            .log_cli_session_end(&ctx, "prune-logs", false, Some("boom".to_string()))
            .await
            .unwrap();

        let (events, total) = logger
            .audit_store
            .list_events(&AuditFilter::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(total, 2);
        assert!(events.iter().all(|e| e.user_id == "cli"));
        assert!(events.iter().any(|e| e.data.contains("boom")));
    }
}
