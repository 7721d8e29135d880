use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::errors::InternalError;
use crate::errors::internal::UserError;
use crate::stores::is_unique_violation;
use crate::types::db::user::{self, encode_roles};
use crate::types::dto::common::PageRequest;
use crate::types::internal::permission::SystemRole;

/// Fields needed to insert a user; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub full_name: String,
    pub email: Option<String>,
    pub roles: Vec<SystemRole>,
    pub member_id: Option<String>,
    pub password_change_required: bool,
}

/// Partial update; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub full_name: Option<String>,
    pub email: Option<Option<String>>,
    pub roles: Option<Vec<SystemRole>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

/// Repository for panel user accounts
pub struct UserStore;

impl UserStore {
    pub fn new() -> Self {
        Self
    }

    pub async fn find_by_id(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<Option<user::Model>, InternalError> {
        user::Entity::find_by_id(user_id.to_string())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_user_by_id", e))
    }

    pub async fn get_by_id(&self, conn: &impl ConnectionTrait, user_id: &str) -> Result<user::Model, InternalError> {
        self.find_by_id(conn, user_id).await?.ok_or_else(|| {
            UserError::UserNotFound {
                user_id: user_id.to_string(),
            }
            .into()
        })
    }

    pub async fn find_by_username(
        &self,
        conn: &impl ConnectionTrait,
        username: &str,
    ) -> Result<Option<user::Model>, InternalError> {
        user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_user_by_username", e))
    }

    pub async fn username_exists(&self, conn: &impl ConnectionTrait, username: &str) -> Result<bool, InternalError> {
        Ok(self.find_by_username(conn, username).await?.is_some())
    }

    /// Insert a user
    ///
    /// # Errors
    /// `UserError::DuplicateUsername` when the username is taken
    pub async fn create(&self, conn: &impl ConnectionTrait, new_user: NewUser) -> Result<user::Model, InternalError> {
        if self.username_exists(conn, &new_user.username).await? {
            return Err(UserError::DuplicateUsername {
                username: new_user.username,
            }
            .into());
        }

        let now = Utc::now().timestamp();
        let username = new_user.username.clone();
        let model = user::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            username: Set(new_user.username),
            password_hash: Set(new_user.password_hash),
            full_name: Set(new_user.full_name),
            email: Set(new_user.email),
            roles: Set(encode_roles(&new_user.roles)?),
            member_id: Set(new_user.member_id),
            is_active: Set(true),
            password_change_required: Set(new_user.password_change_required),
            created_at: Set(now),
            updated_at: Set(now),
        };

        model.insert(conn).await.map_err(|e| {
            if is_unique_violation(&e) {
                UserError::DuplicateUsername { username }.into()
            } else {
                InternalError::database("create_user", e)
            }
        })
    }

    /// Paginated list ordered by username
    pub async fn list(
        &self,
        conn: &impl ConnectionTrait,
        filter: &UserFilter,
        page: PageRequest,
    ) -> Result<(Vec<user::Model>, u64), InternalError> {
        let mut query = user::Entity::find();
        if let Some(is_active) = filter.is_active {
            query = query.filter(user::Column::IsActive.eq(is_active));
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(user::Column::Username.contains(search))
                    .add(user::Column::FullName.contains(search)),
            );
        }

        let paginator = query
            .order_by_asc(user::Column::Username)
            .paginate(conn, page.page_size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| InternalError::database("count_users", e))?;
        let users = paginator
            .fetch_page(page.index())
            .await
            .map_err(|e| InternalError::database("list_users", e))?;

        Ok((users, total))
    }

    pub async fn update(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
        changes: UserChanges,
    ) -> Result<user::Model, InternalError> {
        let mut active: user::ActiveModel = self.get_by_id(conn, user_id).await?.into();

        if let Some(full_name) = changes.full_name {
            active.full_name = Set(full_name);
        }
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(roles) = changes.roles {
            active.roles = Set(encode_roles(&roles)?);
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now().timestamp());

        active
            .update(conn)
            .await
            .map_err(|e| InternalError::database("update_user", e))
    }

    /// Replace the password hash and set the change-required flag
    pub async fn set_password(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
        password_hash: String,
        password_change_required: bool,
    ) -> Result<(), InternalError> {
        let mut active: user::ActiveModel = self.get_by_id(conn, user_id).await?.into();
        active.password_hash = Set(password_hash);
        active.password_change_required = Set(password_change_required);
        active.updated_at = Set(Utc::now().timestamp());

        active
            .update(conn)
            .await
            .map_err(|e| InternalError::database("set_user_password", e))?;
        Ok(())
    }

    pub async fn count_with_role(&self, conn: &impl ConnectionTrait, role: SystemRole) -> Result<u64, InternalError> {
        // Roles are a JSON array of quoted tags
        user::Entity::find()
            .filter(user::Column::Roles.contains(format!("\"{}\"", role.as_str())))
            .count(conn)
            .await
            .map_err(|e| InternalError::database("count_users_with_role", e))
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::setup_test_db;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password_hash: "$argon2id$test".to_string(),
            full_name: format!("{} Full", username),
            email: None,
            roles: vec![SystemRole::Moderator],
            member_id: None,
            password_change_required: false,
        }
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let db = setup_test_db().await;
        let store = UserStore::new();

        let created = store.create(&db, new_user("ayse")).await.unwrap();
        assert!(created.is_active);
        assert_eq!(created.system_roles().unwrap(), vec![SystemRole::Moderator]);

        let found = store.find_by_username(&db, "ayse").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
    }

    #[tokio::test]
    async fn test_duplicate_username_is_rejected() {
        let db = setup_test_db().await;
        let store = UserStore::new();

        store.create(&db, new_user("ayse")).await.unwrap();
        let result = store.create(&db, new_user("ayse")).await;

        assert!(matches!(
            result,
            Err(InternalError::User(UserError::DuplicateUsername { .. }))
        ));
    }

    #[tokio::test]
    async fn test_list_filters_by_active_flag_and_search() {
        let db = setup_test_db().await;
        let store = UserStore::new();

        store.create(&db, new_user("ayse")).await.unwrap();
        let mehmet = store.create(&db, new_user("mehmet")).await.unwrap();
        store
            .update(
                &db,
                &mehmet.id,
                UserChanges {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let active = UserFilter {
            is_active: Some(true),
            ..Default::default()
        };
        let (users, total) = store.list(&db, &active, PageRequest::default()).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(users[0].username, "ayse");

        let search = UserFilter {
            search: Some("meh".to_string()),
            ..Default::default()
        };
        let (users, _) = store.list(&db, &search, PageRequest::default()).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "mehmet");
    }

    #[tokio::test]
    async fn test_get_missing_user_is_not_found() {
        let db = setup_test_db().await;
        let result = UserStore::new().get_by_id(&db, "missing").await;

        assert!(matches!(result, Err(InternalError::User(UserError::UserNotFound { .. }))));
    }
}
