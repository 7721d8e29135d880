use sea_orm::entity::prelude::*;

use crate::types::internal::scope::ScopeRef;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "user_scopes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub province_id: Option<String>,
    pub district_id: Option<String>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Rows are written from validated scopes, so a province is always present.
    /// Rows that somehow lack one are skipped.
    pub fn to_scope_ref(&self) -> Option<ScopeRef> {
        self.province_id.as_ref().map(|province_id| ScopeRef {
            province_id: province_id.clone(),
            district_id: self.district_id.clone(),
        })
    }
}
