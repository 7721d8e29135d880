use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::errors::InternalError;
use crate::errors::internal::{RegionError, UserError};
use crate::stores::is_unique_violation;
use crate::types::db::{branch, district, institution, member, province, user_scope};
use crate::types::internal::scope::{ScopeInput, ScopeRef};

/// Location fields of a member record
#[derive(Debug, Clone, Copy)]
pub struct MemberLocation<'a> {
    pub province_id: &'a str,
    pub district_id: Option<&'a str>,
    pub branch_id: Option<&'a str>,
    pub institution_id: Option<&'a str>,
}

/// Repository for provinces, districts, branches and institutions
pub struct RegionStore;

impl RegionStore {
    pub fn new() -> Self {
        Self
    }

    // Provinces

    pub async fn list_provinces(&self, conn: &impl ConnectionTrait) -> Result<Vec<province::Model>, InternalError> {
        province::Entity::find()
            .order_by_asc(province::Column::Name)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_provinces", e))
    }

    pub async fn get_province(&self, conn: &impl ConnectionTrait, id: &str) -> Result<province::Model, InternalError> {
        province::Entity::find_by_id(id.to_string())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("get_province", e))?
            .ok_or_else(|| RegionError::ProvinceNotFound(id.to_string()).into())
    }

    pub async fn create_province(
        &self,
        conn: &impl ConnectionTrait,
        code: String,
        name: String,
    ) -> Result<province::Model, InternalError> {
        let duplicate = code.clone();
        province::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            code: Set(code),
            name: Set(name),
            created_at: Set(Utc::now().timestamp()),
        }
        .insert(conn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RegionError::DuplicateCode(duplicate).into()
            } else {
                InternalError::database("create_province", e)
            }
        })
    }

    pub async fn update_province(
        &self,
        conn: &impl ConnectionTrait,
        id: &str,
        code: Option<String>,
        name: Option<String>,
    ) -> Result<province::Model, InternalError> {
        let mut active: province::ActiveModel = self.get_province(conn, id).await?.into();
        let duplicate = code.clone();
        if let Some(code) = code {
            active.code = Set(code);
        }
        if let Some(name) = name {
            active.name = Set(name);
        }

        active.update(conn).await.map_err(|e| match duplicate {
            Some(code) if is_unique_violation(&e) => RegionError::DuplicateCode(code).into(),
            _ => InternalError::database("update_province", e),
        })
    }

    /// Delete a province nothing refers to
    ///
    /// # Errors
    /// `RegionError::InUse` while districts, branches, members or user scopes reference it
    pub async fn delete_province(&self, conn: &impl ConnectionTrait, id: &str) -> Result<(), InternalError> {
        let province = self.get_province(conn, id).await?;

        let districts = district::Entity::find()
            .filter(district::Column::ProvinceId.eq(id))
            .count(conn)
            .await
            .map_err(|e| InternalError::database("count_province_districts", e))?;
        let branches = branch::Entity::find()
            .filter(branch::Column::ProvinceId.eq(id))
            .count(conn)
            .await
            .map_err(|e| InternalError::database("count_province_branches", e))?;
        let members = member::Entity::find()
            .filter(member::Column::ProvinceId.eq(id))
            .count(conn)
            .await
            .map_err(|e| InternalError::database("count_province_members", e))?;
        let scopes = user_scope::Entity::find()
            .filter(user_scope::Column::ProvinceId.eq(id))
            .count(conn)
            .await
            .map_err(|e| InternalError::database("count_province_scopes", e))?;

        if districts + branches + members + scopes > 0 {
            return Err(RegionError::InUse(format!("Province {}", province.name)).into());
        }

        province::Entity::delete_by_id(id.to_string())
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("delete_province", e))?;
        Ok(())
    }

    // Districts

    pub async fn list_districts(
        &self,
        conn: &impl ConnectionTrait,
        province_id: Option<&str>,
    ) -> Result<Vec<district::Model>, InternalError> {
        let mut query = district::Entity::find();
        if let Some(province_id) = province_id {
            query = query.filter(district::Column::ProvinceId.eq(province_id));
        }
        query
            .order_by_asc(district::Column::Name)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_districts", e))
    }

    pub async fn get_district(&self, conn: &impl ConnectionTrait, id: &str) -> Result<district::Model, InternalError> {
        district::Entity::find_by_id(id.to_string())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("get_district", e))?
            .ok_or_else(|| RegionError::DistrictNotFound(id.to_string()).into())
    }

    pub async fn create_district(
        &self,
        conn: &impl ConnectionTrait,
        province_id: &str,
        name: String,
    ) -> Result<district::Model, InternalError> {
        self.get_province(conn, province_id).await?;

        district::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            province_id: Set(province_id.to_string()),
            name: Set(name),
            created_at: Set(Utc::now().timestamp()),
        }
        .insert(conn)
        .await
        .map_err(|e| InternalError::database("create_district", e))
    }

    pub async fn update_district(
        &self,
        conn: &impl ConnectionTrait,
        id: &str,
        name: String,
    ) -> Result<district::Model, InternalError> {
        let mut active: district::ActiveModel = self.get_district(conn, id).await?.into();
        active.name = Set(name);
        active
            .update(conn)
            .await
            .map_err(|e| InternalError::database("update_district", e))
    }

    pub async fn delete_district(&self, conn: &impl ConnectionTrait, id: &str) -> Result<(), InternalError> {
        let district = self.get_district(conn, id).await?;

        let members = member::Entity::find()
            .filter(member::Column::DistrictId.eq(id))
            .count(conn)
            .await
            .map_err(|e| InternalError::database("count_district_members", e))?;
        let institutions = institution::Entity::find()
            .filter(institution::Column::DistrictId.eq(id))
            .count(conn)
            .await
            .map_err(|e| InternalError::database("count_district_institutions", e))?;
        let scopes = user_scope::Entity::find()
            .filter(user_scope::Column::DistrictId.eq(id))
            .count(conn)
            .await
            .map_err(|e| InternalError::database("count_district_scopes", e))?;

        if members + institutions + scopes > 0 {
            return Err(RegionError::InUse(format!("District {}", district.name)).into());
        }

        district::Entity::delete_by_id(id.to_string())
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("delete_district", e))?;
        Ok(())
    }

    // Branches

    pub async fn list_branches(
        &self,
        conn: &impl ConnectionTrait,
        province_id: Option<&str>,
    ) -> Result<Vec<branch::Model>, InternalError> {
        let mut query = branch::Entity::find();
        if let Some(province_id) = province_id {
            query = query.filter(branch::Column::ProvinceId.eq(province_id));
        }
        query
            .order_by_asc(branch::Column::Name)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_branches", e))
    }

    pub async fn get_branch(&self, conn: &impl ConnectionTrait, id: &str) -> Result<branch::Model, InternalError> {
        branch::Entity::find_by_id(id.to_string())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("get_branch", e))?
            .ok_or_else(|| RegionError::BranchNotFound(id.to_string()).into())
    }

    pub async fn create_branch(
        &self,
        conn: &impl ConnectionTrait,
        province_id: &str,
        name: String,
    ) -> Result<branch::Model, InternalError> {
        self.get_province(conn, province_id).await?;

        branch::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            province_id: Set(province_id.to_string()),
            name: Set(name),
            created_at: Set(Utc::now().timestamp()),
        }
        .insert(conn)
        .await
        .map_err(|e| InternalError::database("create_branch", e))
    }

    pub async fn update_branch(&self, conn: &impl ConnectionTrait, id: &str, name: String) -> Result<branch::Model, InternalError> {
        let mut active: branch::ActiveModel = self.get_branch(conn, id).await?.into();
        active.name = Set(name);
        active
            .update(conn)
            .await
            .map_err(|e| InternalError::database("update_branch", e))
    }

    pub async fn delete_branch(&self, conn: &impl ConnectionTrait, id: &str) -> Result<(), InternalError> {
        let branch = self.get_branch(conn, id).await?;

        let members = member::Entity::find()
            .filter(member::Column::BranchId.eq(id))
            .count(conn)
            .await
            .map_err(|e| InternalError::database("count_branch_members", e))?;
        if members > 0 {
            return Err(RegionError::InUse(format!("Branch {}", branch.name)).into());
        }

        branch::Entity::delete_by_id(id.to_string())
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("delete_branch", e))?;
        Ok(())
    }

    // Institutions

    pub async fn list_institutions(
        &self,
        conn: &impl ConnectionTrait,
        district_id: Option<&str>,
    ) -> Result<Vec<institution::Model>, InternalError> {
        let mut query = institution::Entity::find();
        if let Some(district_id) = district_id {
            query = query.filter(institution::Column::DistrictId.eq(district_id));
        }
        query
            .order_by_asc(institution::Column::Name)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_institutions", e))
    }

    pub async fn get_institution(&self, conn: &impl ConnectionTrait, id: &str) -> Result<institution::Model, InternalError> {
        institution::Entity::find_by_id(id.to_string())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("get_institution", e))?
            .ok_or_else(|| RegionError::InstitutionNotFound(id.to_string()).into())
    }

    pub async fn create_institution(
        &self,
        conn: &impl ConnectionTrait,
        name: String,
        district_id: Option<&str>,
    ) -> Result<institution::Model, InternalError> {
        if let Some(district_id) = district_id {
            self.get_district(conn, district_id).await?;
        }

        institution::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(name),
            district_id: Set(district_id.map(str::to_string)),
            created_at: Set(Utc::now().timestamp()),
        }
        .insert(conn)
        .await
        .map_err(|e| InternalError::database("create_institution", e))
    }

    pub async fn update_institution(
        &self,
        conn: &impl ConnectionTrait,
        id: &str,
        name: Option<String>,
        district_id: Option<Option<String>>,
    ) -> Result<institution::Model, InternalError> {
        let mut active: institution::ActiveModel = self.get_institution(conn, id).await?.into();
        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(district_id) = district_id {
            if let Some(id) = &district_id {
                self.get_district(conn, id).await?;
            }
            active.district_id = Set(district_id);
        }
        active
            .update(conn)
            .await
            .map_err(|e| InternalError::database("update_institution", e))
    }

    pub async fn delete_institution(&self, conn: &impl ConnectionTrait, id: &str) -> Result<(), InternalError> {
        let institution = self.get_institution(conn, id).await?;

        let members = member::Entity::find()
            .filter(member::Column::InstitutionId.eq(id))
            .count(conn)
            .await
            .map_err(|e| InternalError::database("count_institution_members", e))?;
        if members > 0 {
            return Err(RegionError::InUse(format!("Institution {}", institution.name)).into());
        }

        institution::Entity::delete_by_id(id.to_string())
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("delete_institution", e))?;
        Ok(())
    }

    // Validation

    /// Turn a raw province/district pair into a validated scope
    ///
    /// At least one side is required. A district alone gets its province
    /// filled in; when both are given the district must belong to the province.
    pub async fn resolve_scope(
        &self,
        conn: &impl ConnectionTrait,
        province_id: Option<&str>,
        district_id: Option<&str>,
    ) -> Result<ScopeRef, InternalError> {
        let province_id = province_id.map(str::trim).filter(|id| !id.is_empty());
        let district_id = district_id.map(str::trim).filter(|id| !id.is_empty());

        match (province_id, district_id) {
            (None, None) => Err(UserError::invalid_scope("a scope needs a province or a district").into()),
            (Some(province_id), None) => {
                self.get_province(conn, province_id).await?;
                Ok(ScopeRef {
                    province_id: province_id.to_string(),
                    district_id: None,
                })
            }
            (province_id, Some(district_id)) => {
                let district = self.get_district(conn, district_id).await?;
                if let Some(province_id) = province_id {
                    if province_id != district.province_id {
                        return Err(RegionError::DistrictProvinceMismatch {
                            district_id: district.id,
                            province_id: province_id.to_string(),
                        }
                        .into());
                    }
                }
                Ok(ScopeRef {
                    province_id: district.province_id,
                    district_id: Some(district.id),
                })
            }
        }
    }

    /// Resolve every input, failing on the first invalid one
    pub async fn resolve_scopes(
        &self,
        conn: &impl ConnectionTrait,
        inputs: &[ScopeInput],
    ) -> Result<Vec<ScopeRef>, InternalError> {
        let mut scopes = Vec::with_capacity(inputs.len());
        for input in inputs {
            scopes.push(
                self.resolve_scope(conn, input.province_id.as_deref(), input.district_id.as_deref())
                    .await?,
            );
        }
        Ok(scopes)
    }

    /// Check that every referenced region exists and fits together
    pub async fn validate_member_location(
        &self,
        conn: &impl ConnectionTrait,
        location: MemberLocation<'_>,
    ) -> Result<(), InternalError> {
        self.get_province(conn, location.province_id).await?;

        if let Some(district_id) = location.district_id {
            let district = self.get_district(conn, district_id).await?;
            if district.province_id != location.province_id {
                return Err(RegionError::DistrictProvinceMismatch {
                    district_id: district.id,
                    province_id: location.province_id.to_string(),
                }
                .into());
            }
        }

        if let Some(branch_id) = location.branch_id {
            let branch = self.get_branch(conn, branch_id).await?;
            if branch.province_id != location.province_id {
                return Err(RegionError::BranchNotFound(format!(
                    "{} in province {}",
                    branch_id, location.province_id
                ))
                .into());
            }
        }

        if let Some(institution_id) = location.institution_id {
            self.get_institution(conn, institution_id).await?;
        }

        Ok(())
    }
}

impl Default for RegionStore {
    fn default() -> Self {
        Self::new()
    }
}
