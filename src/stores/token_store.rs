use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

use crate::errors::InternalError;
use crate::types::db::refresh_token;

/// Repository for hashed refresh tokens
pub struct TokenStore;

impl TokenStore {
    pub fn new() -> Self {
        Self
    }

    pub async fn save_refresh_token(
        &self,
        conn: &impl ConnectionTrait,
        token_hash: String,
        user_id: &str,
        expires_at: i64,
    ) -> Result<(), InternalError> {
        refresh_token::ActiveModel {
            token_hash: Set(token_hash),
            user_id: Set(user_id.to_string()),
            expires_at: Set(expires_at),
            created_at: Set(Utc::now().timestamp()),
        }
        .insert(conn)
        .await
        .map_err(|e| InternalError::database("save_refresh_token", e))?;

        Ok(())
    }

    pub async fn find_refresh_token(
        &self,
        conn: &impl ConnectionTrait,
        token_hash: &str,
    ) -> Result<Option<refresh_token::Model>, InternalError> {
        refresh_token::Entity::find_by_id(token_hash.to_string())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_refresh_token", e))
    }

    /// Delete one token, but only if it belongs to `user_id`
    pub async fn revoke_for_user(
        &self,
        conn: &impl ConnectionTrait,
        token_hash: &str,
        user_id: &str,
    ) -> Result<u64, InternalError> {
        let result = refresh_token::Entity::delete_many()
            .filter(refresh_token::Column::TokenHash.eq(token_hash))
            .filter(refresh_token::Column::UserId.eq(user_id))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("revoke_refresh_token", e))?;

        Ok(result.rows_affected)
    }

    pub async fn revoke_all_for_user(&self, conn: &impl ConnectionTrait, user_id: &str) -> Result<u64, InternalError> {
        let result = refresh_token::Entity::delete_many()
            .filter(refresh_token::Column::UserId.eq(user_id))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("revoke_user_refresh_tokens", e))?;

        Ok(result.rows_affected)
    }

    pub async fn delete_expired(&self, conn: &impl ConnectionTrait) -> Result<u64, InternalError> {
        let result = refresh_token::Entity::delete_many()
            .filter(refresh_token::Column::ExpiresAt.lt(Utc::now().timestamp()))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("delete_expired_refresh_tokens", e))?;

        Ok(result.rows_affected)
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::{create_test_user, setup_test_db};

    #[tokio::test]
    async fn test_revoke_only_touches_own_tokens() {
        let db = setup_test_db().await;
        let store = TokenStore::new();
        let alice = create_test_user(&db, "alice").await;
        let bob = create_test_user(&db, "bob").await;
        let expires = Utc::now().timestamp() + 3600;

        store.save_refresh_token(&db, "hash-a".to_string(), &alice.id, expires).await.unwrap();

        // Bob cannot revoke Alice's token
        assert_eq!(store.revoke_for_user(&db, "hash-a", &bob.id).await.unwrap(), 0);
        assert!(store.find_refresh_token(&db, "hash-a").await.unwrap().is_some());

        assert_eq!(store.revoke_for_user(&db, "hash-a", &alice.id).await.unwrap(), 1);
        assert!(store.find_refresh_token(&db, "hash-a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_revoke_all_and_delete_expired() {
        let db = setup_test_db().await;
        let store = TokenStore::new();
        let alice = create_test_user(&db, "alice").await;
        let now = Utc::now().timestamp();

        store.save_refresh_token(&db, "h1".to_string(), &alice.id, now + 3600).await.unwrap();
        store.save_refresh_token(&db, "h2".to_string(), &alice.id, now - 10).await.unwrap();

        assert_eq!(store.delete_expired(&db).await.unwrap(), 1);
        assert_eq!(store.revoke_all_for_user(&db, &alice.id).await.unwrap(), 1);
    }
}
