use std::sync::Arc;

use poem::Request;
use poem_openapi::param::Query;
use poem_openapi::{OpenApi, Tags, payload::Json};

use crate::api::BearerAuth;
use crate::api::helpers::require_context;
use crate::app_data::AppData;
use crate::coordinators::ActivityLogCoordinator;
use crate::errors::AdminError;
use crate::stores::audit_store::AuditFilter;
use crate::types::dto::activity_logs::ActivityLogListResponse;
use crate::types::dto::common::{PageInfo, PageRequest};

/// Read access to the activity log
pub struct ActivityLogApi {
    app_data: Arc<AppData>,
    activity_log_coordinator: ActivityLogCoordinator,
}

impl ActivityLogApi {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            activity_log_coordinator: ActivityLogCoordinator::new(app_data.clone()),
            app_data,
        }
    }
}

#[derive(Tags)]
enum ActivityLogTags {
    /// Activity log
    ActivityLogs,
}

#[OpenApi]
impl ActivityLogApi {
    /// Activity log entries, newest first
    ///
    /// `since` and `until` are Unix timestamps in seconds.
    #[oai(path = "/activity-logs", method = "get", tag = "ActivityLogTags::ActivityLogs")]
    async fn list(
        &self,
        req: &Request,
        auth: BearerAuth,
        event_type: Query<Option<String>>,
        user_id: Query<Option<String>>,
        since: Query<Option<i64>>,
        until: Query<Option<i64>>,
        page: Query<Option<u64>>,
        page_size: Query<Option<u64>>,
    ) -> Result<Json<ActivityLogListResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;
        let page = PageRequest::new(page.0, page_size.0);
        let filter = AuditFilter {
            event_type: event_type.0,
            user_id: user_id.0,
            since: since.0,
            until: until.0,
        };

        let (events, total) = self
            .activity_log_coordinator
            .list(&ctx, &filter, page)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(ActivityLogListResponse {
            items: events.into_iter().map(Into::into).collect(),
            page: PageInfo::new(page, total),
        }))
    }
}
