use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, QueryTrait, Set,
};
use uuid::Uuid;

use crate::errors::InternalError;
use crate::errors::internal::PanelApplicationError;
use crate::stores::member_store::scope_condition;
use crate::types::db::member;
use crate::types::db::panel_user_application::{self, ApplicationStatus};
use crate::types::dto::common::PageRequest;
use crate::types::internal::scope::{MemberScope, ScopeRef};

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub member_id: String,
    pub requested_username: String,
    pub requested_role_id: String,
    pub scopes: Vec<ScopeRef>,
    pub note: Option<String>,
    pub created_by: String,
}

/// Repository for panel user applications
pub struct ApplicationStore;

impl ApplicationStore {
    pub fn new() -> Self {
        Self
    }

    pub async fn get(
        &self,
        conn: &impl ConnectionTrait,
        application_id: &str,
    ) -> Result<panel_user_application::Model, InternalError> {
        panel_user_application::Entity::find_by_id(application_id.to_string())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("get_application", e))?
            .ok_or_else(|| PanelApplicationError::NotFound(application_id.to_string()).into())
    }

    /// Applications whose member lies inside the scope, newest first
    pub async fn list(
        &self,
        conn: &impl ConnectionTrait,
        status: Option<ApplicationStatus>,
        scope: &MemberScope,
        page: PageRequest,
    ) -> Result<(Vec<panel_user_application::Model>, u64), InternalError> {
        if scope.is_empty() {
            return Ok((Vec::new(), 0));
        }

        let mut query = panel_user_application::Entity::find();
        if let Some(condition) = scope_condition(scope) {
            let visible_members = member::Entity::find()
                .select_only()
                .column(member::Column::Id)
                .filter(condition)
                .into_query();
            query = query.filter(panel_user_application::Column::MemberId.in_subquery(visible_members));
        }
        if let Some(status) = status {
            query = query.filter(panel_user_application::Column::Status.eq(status));
        }

        let paginator = query
            .order_by_desc(panel_user_application::Column::CreatedAt)
            .paginate(conn, page.page_size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| InternalError::database("count_applications", e))?;
        let applications = paginator
            .fetch_page(page.index())
            .await
            .map_err(|e| InternalError::database("list_applications", e))?;

        Ok((applications, total))
    }

    pub async fn create(
        &self,
        conn: &impl ConnectionTrait,
        application: NewApplication,
    ) -> Result<panel_user_application::Model, InternalError> {
        let scopes = serde_json::to_string(&application.scopes)
            .map_err(|e| InternalError::parse("application scopes", e.to_string()))?;

        panel_user_application::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            member_id: Set(application.member_id),
            requested_username: Set(application.requested_username),
            requested_role_id: Set(application.requested_role_id),
            scopes: Set(scopes),
            note: Set(application.note),
            status: Set(ApplicationStatus::Pending),
            created_by: Set(application.created_by),
            reviewed_by: Set(None),
            review_note: Set(None),
            created_user_id: Set(None),
            created_at: Set(Utc::now().timestamp()),
            reviewed_at: Set(None),
        }
        .insert(conn)
        .await
        .map_err(|e| InternalError::database("create_application", e))
    }

    async fn count_pending_where(
        &self,
        conn: &impl ConnectionTrait,
        column: panel_user_application::Column,
        value: &str,
    ) -> Result<u64, InternalError> {
        panel_user_application::Entity::find()
            .filter(panel_user_application::Column::Status.eq(ApplicationStatus::Pending))
            .filter(column.eq(value))
            .count(conn)
            .await
            .map_err(|e| InternalError::database("count_pending_applications", e))
    }

    pub async fn has_pending_for_member(&self, conn: &impl ConnectionTrait, member_id: &str) -> Result<bool, InternalError> {
        Ok(self
            .count_pending_where(conn, panel_user_application::Column::MemberId, member_id)
            .await?
            > 0)
    }

    pub async fn count_pending_for_role(&self, conn: &impl ConnectionTrait, role_id: &str) -> Result<u64, InternalError> {
        self.count_pending_where(conn, panel_user_application::Column::RequestedRoleId, role_id)
            .await
    }

    /// Whether a pending application already reserves this username
    pub async fn pending_username_exists(&self, conn: &impl ConnectionTrait, username: &str) -> Result<bool, InternalError> {
        Ok(self
            .count_pending_where(conn, panel_user_application::Column::RequestedUsername, username)
            .await?
            > 0)
    }

    /// Move a PENDING application to its final status
    ///
    /// The update only matches rows still PENDING, so of two concurrent
    /// reviews exactly one sees `true`.
    pub async fn mark_reviewed(
        &self,
        conn: &impl ConnectionTrait,
        application_id: &str,
        status: ApplicationStatus,
        reviewed_by: &str,
        review_note: Option<String>,
    ) -> Result<bool, InternalError> {
        let result = panel_user_application::Entity::update_many()
            .col_expr(panel_user_application::Column::Status, Expr::value(status.to_value()))
            .col_expr(panel_user_application::Column::ReviewedBy, Expr::value(reviewed_by))
            .col_expr(panel_user_application::Column::ReviewNote, Expr::value(review_note))
            .col_expr(
                panel_user_application::Column::ReviewedAt,
                Expr::value(Utc::now().timestamp()),
            )
            .filter(panel_user_application::Column::Id.eq(application_id))
            .filter(panel_user_application::Column::Status.eq(ApplicationStatus::Pending))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("mark_application_reviewed", e))?;

        Ok(result.rows_affected == 1)
    }

    pub async fn set_created_user(
        &self,
        conn: &impl ConnectionTrait,
        application_id: &str,
        user_id: &str,
    ) -> Result<panel_user_application::Model, InternalError> {
        let mut active: panel_user_application::ActiveModel = self.get(conn, application_id).await?.into();
        active.created_user_id = Set(Some(user_id.to_string()));
        active
            .update(conn)
            .await
            .map_err(|e| InternalError::database("set_application_user", e))
    }
}

impl Default for ApplicationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::{create_test_member, create_test_province, setup_test_db};
    use sea_orm::DatabaseConnection;

    async fn member_id(db: &DatabaseConnection) -> String {
        let province = create_test_province(db, &Uuid::new_v4().to_string()).await;
        create_test_member(db, &province.id, None).await.id
    }

    fn application(member_id: &str, username: &str) -> NewApplication {
        NewApplication {
            member_id: member_id.to_string(),
            requested_username: username.to_string(),
            requested_role_id: "role-1".to_string(),
            scopes: vec![ScopeRef {
                province_id: "p1".to_string(),
                district_id: None,
            }],
            note: None,
            created_by: "admin".to_string(),
        }
    }

    #[tokio::test]
    async fn test_review_happens_exactly_once() {
        let db = setup_test_db().await;
        let store = ApplicationStore::new();
        let m1 = member_id(&db).await;
        let created = store.create(&db, application(&m1, "ayse")).await.unwrap();

        let first = store
            .mark_reviewed(&db, &created.id, ApplicationStatus::Approved, "admin", None)
            .await
            .unwrap();
        let second = store
            .mark_reviewed(&db, &created.id, ApplicationStatus::Rejected, "other", Some("late".to_string()))
            .await
            .unwrap();
        assert!(first);
        assert!(!second);

        let stored = store.get(&db, &created.id).await.unwrap();
        assert_eq!(stored.status, ApplicationStatus::Approved);
        assert_eq!(stored.reviewed_by.as_deref(), Some("admin"));
        assert!(stored.reviewed_at.is_some());
    }

    #[tokio::test]
    async fn test_pending_checks() {
        let db = setup_test_db().await;
        let store = ApplicationStore::new();
        let m1 = member_id(&db).await;
        let created = store.create(&db, application(&m1, "ayse")).await.unwrap();

        assert!(store.has_pending_for_member(&db, &m1).await.unwrap());
        assert!(store.pending_username_exists(&db, "ayse").await.unwrap());
        assert_eq!(store.count_pending_for_role(&db, "role-1").await.unwrap(), 1);

        store
            .mark_reviewed(&db, &created.id, ApplicationStatus::Rejected, "admin", Some("no".to_string()))
            .await
            .unwrap();
        assert!(!store.has_pending_for_member(&db, &m1).await.unwrap());
        assert_eq!(store.count_pending_for_role(&db, "role-1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_scopes_round_trip_through_json() {
        let db = setup_test_db().await;
        let store = ApplicationStore::new();
        let m1 = member_id(&db).await;
        let created = store.create(&db, application(&m1, "ayse")).await.unwrap();

        let scopes = created.scope_refs().unwrap();
        assert_eq!(scopes.len(), 1);
        assert_eq!(scopes[0].province_id, "p1");
    }

    #[tokio::test]
    async fn test_list_by_status() {
        let db = setup_test_db().await;
        let store = ApplicationStore::new();
        let m1 = member_id(&db).await;
        let m2 = member_id(&db).await;
        let first = store.create(&db, application(&m1, "ayse")).await.unwrap();
        store.create(&db, application(&m2, "mehmet")).await.unwrap();
        store
            .mark_reviewed(&db, &first.id, ApplicationStatus::Approved, "admin", None)
            .await
            .unwrap();

        let (pending, total) = store
            .list(
                &db,
                Some(ApplicationStatus::Pending),
                &MemberScope::Unrestricted,
                PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(pending[0].requested_username, "mehmet");
    }

    #[tokio::test]
    async fn test_list_only_shows_members_in_scope() {
        let db = setup_test_db().await;
        let store = ApplicationStore::new();
        let ankara = create_test_province(&db, "06").await;
        let izmir = create_test_province(&db, "35").await;
        let inside = create_test_member(&db, &ankara.id, None).await;
        let outside = create_test_member(&db, &izmir.id, None).await;
        store.create(&db, application(&inside.id, "ayse")).await.unwrap();
        store.create(&db, application(&outside.id, "mehmet")).await.unwrap();

        let scope = MemberScope::from_scopes(&[ScopeRef {
            province_id: ankara.id.clone(),
            district_id: None,
        }]);
        let (visible, total) = store.list(&db, None, &scope, PageRequest::default()).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(visible[0].member_id, inside.id);

        let nothing = MemberScope::from_scopes(&[]);
        let (visible, total) = store.list(&db, None, &nothing, PageRequest::default()).await.unwrap();
        assert_eq!(total, 0);
        assert!(visible.is_empty());
    }
}
