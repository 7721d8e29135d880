use poem_openapi::Object;

use crate::types::db::audit_event;
use crate::types::dto::common::PageInfo;

#[derive(Object, Debug)]
pub struct ActivityLogResponse {
    pub id: i64,
    pub timestamp: i64,
    pub event_type: String,
    /// Actor: user id, `cli` or `unknown`
    pub user_id: String,
    pub ip_address: Option<String>,
    pub jwt_id: Option<String>,
    /// Event specific fields
    pub data: serde_json::Value,
}

impl From<audit_event::Model> for ActivityLogResponse {
    fn from(event: audit_event::Model) -> Self {
        let data = serde_json::from_str(&event.data).unwrap_or(serde_json::Value::Null);
        Self {
            id: event.id,
            timestamp: event.timestamp,
            event_type: event.event_type,
            user_id: event.user_id,
            ip_address: event.ip_address,
            jwt_id: event.jwt_id,
            data,
        }
    }
}

#[derive(Object, Debug)]
pub struct ActivityLogListResponse {
    pub items: Vec<ActivityLogResponse>,
    pub page: PageInfo,
}
