use std::sync::Arc;

use crate::app_data::AppData;
use crate::coordinators::ActivityLogCoordinator;
use crate::types::internal::context::RequestContext;

/// Delete activity log entries past the configured retention
pub async fn prune_logs(app_data: &Arc<AppData>) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = RequestContext::for_cli("prune-logs");
    if let Err(audit_err) = app_data.audit_logger.log_cli_session_start(&ctx, "prune-logs", vec![]).await {
        tracing::warn!("Failed to log CLI session start: {}", audit_err);
    }

    let result = ActivityLogCoordinator::new(app_data.clone()).prune_expired().await;

    let (success, error_message) = match &result {
        Ok(_) => (true, None),
        Err(e) => (false, Some(e.to_string())),
    };
    if let Err(audit_err) = app_data
        .audit_logger
        .log_cli_session_end(&ctx, "prune-logs", success, error_message)
        .await
    {
        tracing::warn!("Failed to log CLI session end: {}", audit_err);
    }

    let deleted = result?;
    println!("Deleted {} activity log entries", deleted);
    Ok(())
}
