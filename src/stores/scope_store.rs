use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::errors::InternalError;
use crate::types::db::user_scope;
use crate::types::internal::scope::ScopeRef;

/// Repository for the regions a user is responsible for
pub struct ScopeStore;

impl ScopeStore {
    pub fn new() -> Self {
        Self
    }

    pub async fn scopes_for_user(&self, conn: &impl ConnectionTrait, user_id: &str) -> Result<Vec<ScopeRef>, InternalError> {
        let rows = user_scope::Entity::find()
            .filter(user_scope::Column::UserId.eq(user_id))
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_user_scopes", e))?;

        Ok(rows.iter().filter_map(user_scope::Model::to_scope_ref).collect())
    }

    /// Replace all scopes of a user; inputs must already be validated
    pub async fn replace_for_user(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
        scopes: &[ScopeRef],
    ) -> Result<(), InternalError> {
        user_scope::Entity::delete_many()
            .filter(user_scope::Column::UserId.eq(user_id))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("clear_user_scopes", e))?;

        let now = Utc::now().timestamp();
        for scope in dedup(scopes) {
            user_scope::ActiveModel {
                id: Set(Uuid::new_v4().to_string()),
                user_id: Set(user_id.to_string()),
                province_id: Set(Some(scope.province_id.clone())),
                district_id: Set(scope.district_id.clone()),
                created_at: Set(now),
            }
            .insert(conn)
            .await
            .map_err(|e| InternalError::database("create_user_scope", e))?;
        }

        Ok(())
    }

    /// Number of scopes pointing at the province and/or district
    pub async fn count_referencing(
        &self,
        conn: &impl ConnectionTrait,
        province_id: Option<&str>,
        district_id: Option<&str>,
    ) -> Result<u64, InternalError> {
        let mut query = user_scope::Entity::find();
        if let Some(province_id) = province_id {
            query = query.filter(user_scope::Column::ProvinceId.eq(province_id));
        }
        if let Some(district_id) = district_id {
            query = query.filter(user_scope::Column::DistrictId.eq(district_id));
        }

        query
            .count(conn)
            .await
            .map_err(|e| InternalError::database("count_scope_references", e))
    }
}

impl Default for ScopeStore {
    fn default() -> Self {
        Self::new()
    }
}

fn dedup(scopes: &[ScopeRef]) -> Vec<&ScopeRef> {
    let mut unique: Vec<&ScopeRef> = Vec::with_capacity(scopes.len());
    for scope in scopes {
        if !unique.contains(&scope) {
            unique.push(scope);
        }
    }
    unique
}
