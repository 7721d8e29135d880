use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::app_data::AppData;
use crate::coordinators::authorize;
use crate::errors::InternalError;
use crate::stores::audit_store::AuditFilter;
use crate::stores::settings_store::ACTIVITY_LOG_RETENTION_DAYS;
use crate::types::db::audit_event;
use crate::types::dto::common::PageRequest;
use crate::types::internal::context::RequestContext;
use crate::types::internal::permission::Permission;

const DEFAULT_RETENTION_DAYS: u64 = 365;

pub struct ActivityLogCoordinator {
    app_data: Arc<AppData>,
}

impl ActivityLogCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self { app_data }
    }

    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: &AuditFilter,
        page: PageRequest,
    ) -> Result<(Vec<audit_event::Model>, u64), InternalError> {
        authorize(&self.app_data, ctx, Permission::ActivityLogView).await?;
        self.app_data.audit_store.list_events(filter, page).await
    }

    /// Delete events older than `activity_log_retention_days`
    ///
    /// A retention of 0 keeps everything. Returns the number of deleted events.
    pub async fn prune_expired(&self) -> Result<u64, InternalError> {
        let days = self
            .app_data
            .settings_store
            .get_u64(
                &self.app_data.connections.main,
                ACTIVITY_LOG_RETENTION_DAYS,
                DEFAULT_RETENTION_DAYS,
            )
            .await?;
        if days == 0 {
            tracing::info!("Activity log retention disabled, nothing pruned");
            return Ok(0);
        }

        let days = i64::try_from(days).unwrap_or(i64::MAX / 86_400);
        let cutoff = Utc::now() - Duration::days(days);
        let deleted = self.app_data.audit_store.delete_older_than(cutoff.timestamp()).await?;
        tracing::info!(deleted, retention_days = days, "Pruned activity log");
        Ok(deleted)
    }
}
