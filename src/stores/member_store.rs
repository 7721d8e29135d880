use chrono::{Datelike, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::errors::InternalError;
use crate::errors::internal::MemberError;
use crate::stores::is_unique_violation;
use crate::types::db::member::{self, MemberStatus};
use crate::types::dto::common::PageRequest;
use crate::types::internal::scope::MemberScope;

#[derive(Debug, Clone)]
pub struct NewMember {
    pub national_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<String>,
    pub province_id: String,
    pub district_id: Option<String>,
    pub branch_id: Option<String>,
    pub institution_id: Option<String>,
    pub status: MemberStatus,
    pub created_by: String,
}

/// Partial update; `None` leaves a field untouched, `Some(None)` clears it
#[derive(Debug, Clone, Default)]
pub struct MemberChanges {
    pub national_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub birth_date: Option<Option<String>>,
    pub province_id: Option<String>,
    pub district_id: Option<Option<String>>,
    pub branch_id: Option<Option<String>>,
    pub institution_id: Option<Option<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct MemberFilter {
    pub status: Option<MemberStatus>,
    pub province_id: Option<String>,
    pub district_id: Option<String>,
    pub search: Option<String>,
}

/// SQL condition matching the members a scope can see
///
/// Returns `None` for an unrestricted scope.
pub fn scope_condition(scope: &MemberScope) -> Option<Condition> {
    match scope {
        MemberScope::Unrestricted => None,
        MemberScope::Restricted {
            province_ids,
            district_ids,
        } => {
            let mut condition = Condition::any();
            if !province_ids.is_empty() {
                condition = condition.add(member::Column::ProvinceId.is_in(province_ids.clone()));
            }
            if !district_ids.is_empty() {
                condition = condition.add(member::Column::DistrictId.is_in(district_ids.clone()));
            }
            Some(condition)
        }
    }
}

/// Repository for member records
pub struct MemberStore;

impl MemberStore {
    pub fn new() -> Self {
        Self
    }

    pub async fn find_by_id(
        &self,
        conn: &impl ConnectionTrait,
        member_id: &str,
    ) -> Result<Option<member::Model>, InternalError> {
        member::Entity::find_by_id(member_id.to_string())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_member_by_id", e))
    }

    pub async fn get(&self, conn: &impl ConnectionTrait, member_id: &str) -> Result<member::Model, InternalError> {
        self.find_by_id(conn, member_id)
            .await?
            .ok_or_else(|| MemberError::NotFound(member_id.to_string()).into())
    }

    pub async fn national_id_exists(
        &self,
        conn: &impl ConnectionTrait,
        national_id: &str,
        except_member_id: Option<&str>,
    ) -> Result<bool, InternalError> {
        let mut query = member::Entity::find().filter(member::Column::NationalId.eq(national_id));
        if let Some(id) = except_member_id {
            query = query.filter(member::Column::Id.ne(id));
        }
        let count = query
            .count(conn)
            .await
            .map_err(|e| InternalError::database("count_national_id", e))?;
        Ok(count > 0)
    }

    /// Paginated, scope-filtered list, newest first
    pub async fn list(
        &self,
        conn: &impl ConnectionTrait,
        filter: &MemberFilter,
        scope: &MemberScope,
        page: PageRequest,
    ) -> Result<(Vec<member::Model>, u64), InternalError> {
        if scope.is_empty() {
            return Ok((Vec::new(), 0));
        }

        let mut query = member::Entity::find();
        if let Some(condition) = scope_condition(scope) {
            query = query.filter(condition);
        }
        if let Some(status) = filter.status {
            query = query.filter(member::Column::Status.eq(status));
        }
        if let Some(province_id) = &filter.province_id {
            query = query.filter(member::Column::ProvinceId.eq(province_id.as_str()));
        }
        if let Some(district_id) = &filter.district_id {
            query = query.filter(member::Column::DistrictId.eq(district_id.as_str()));
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(member::Column::FirstName.contains(search))
                    .add(member::Column::LastName.contains(search))
                    .add(member::Column::RegistrationNumber.contains(search)),
            );
        }

        let paginator = query
            .order_by_desc(member::Column::CreatedAt)
            .order_by_asc(member::Column::RegistrationNumber)
            .paginate(conn, page.page_size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| InternalError::database("count_members", e))?;
        let members = paginator
            .fetch_page(page.index())
            .await
            .map_err(|e| InternalError::database("list_members", e))?;

        Ok((members, total))
    }

    /// Highest yearly sequence that fits the six digit format
    pub const MAX_REGISTRATION_SEQUENCE: u32 = 999_999;

    /// Next registration number for the current year, `<year>-<6 digits>`
    ///
    /// Numbers always have six digits so string order matches sequence order.
    ///
    /// # Errors
    /// `MemberError::RegistrationNumbersExhausted` once the year's sequence is used up
    pub async fn next_registration_number(&self, conn: &impl ConnectionTrait) -> Result<String, InternalError> {
        let year = Utc::now().year();
        let prefix = format!("{}-", year);
        let last = member::Entity::find()
            .filter(member::Column::RegistrationNumber.starts_with(prefix.as_str()))
            .order_by_desc(member::Column::RegistrationNumber)
            .one(conn)
            .await
            .map_err(|e| InternalError::database("last_registration_number", e))?;

        let sequence = match last {
            Some(model) => {
                let suffix = model.registration_number.trim_start_matches(prefix.as_str());
                suffix
                    .parse::<u32>()
                    .map_err(|e| InternalError::parse("registration_number", e.to_string()))?
                    + 1
            }
            None => 1,
        };
        if sequence > Self::MAX_REGISTRATION_SEQUENCE {
            return Err(MemberError::RegistrationNumbersExhausted(year).into());
        }

        Ok(format!("{}{:06}", prefix, sequence))
    }

    /// Insert a member with a freshly generated registration number
    ///
    /// # Errors
    /// `MemberError::DuplicateNationalId` when the national id is taken
    pub async fn create(&self, conn: &impl ConnectionTrait, new_member: NewMember) -> Result<member::Model, InternalError> {
        if self.national_id_exists(conn, &new_member.national_id, None).await? {
            return Err(MemberError::DuplicateNationalId.into());
        }

        let now = Utc::now().timestamp();
        let model = member::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            registration_number: Set(self.next_registration_number(conn).await?),
            national_id: Set(new_member.national_id),
            first_name: Set(new_member.first_name),
            last_name: Set(new_member.last_name),
            email: Set(new_member.email),
            phone: Set(new_member.phone),
            birth_date: Set(new_member.birth_date),
            province_id: Set(new_member.province_id),
            district_id: Set(new_member.district_id),
            branch_id: Set(new_member.branch_id),
            institution_id: Set(new_member.institution_id),
            status: Set(new_member.status),
            status_reason: Set(None),
            created_by: Set(new_member.created_by),
            created_at: Set(now),
            updated_at: Set(now),
        };

        model.insert(conn).await.map_err(|e| {
            if is_unique_violation(&e) {
                MemberError::DuplicateNationalId.into()
            } else {
                InternalError::database("create_member", e)
            }
        })
    }

    pub async fn update(
        &self,
        conn: &impl ConnectionTrait,
        member_id: &str,
        changes: MemberChanges,
    ) -> Result<member::Model, InternalError> {
        let existing = self.get(conn, member_id).await?;
        if let Some(national_id) = &changes.national_id {
            if national_id != &existing.national_id
                && self.national_id_exists(conn, national_id, Some(member_id)).await?
            {
                return Err(MemberError::DuplicateNationalId.into());
            }
        }

        let mut active: member::ActiveModel = existing.into();
        if let Some(national_id) = changes.national_id {
            active.national_id = Set(national_id);
        }
        if let Some(first_name) = changes.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = changes.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(phone) = changes.phone {
            active.phone = Set(phone);
        }
        if let Some(birth_date) = changes.birth_date {
            active.birth_date = Set(birth_date);
        }
        if let Some(province_id) = changes.province_id {
            active.province_id = Set(province_id);
        }
        if let Some(district_id) = changes.district_id {
            active.district_id = Set(district_id);
        }
        if let Some(branch_id) = changes.branch_id {
            active.branch_id = Set(branch_id);
        }
        if let Some(institution_id) = changes.institution_id {
            active.institution_id = Set(institution_id);
        }
        active.updated_at = Set(Utc::now().timestamp());

        active.update(conn).await.map_err(|e| {
            if is_unique_violation(&e) {
                MemberError::DuplicateNationalId.into()
            } else {
                InternalError::database("update_member", e)
            }
        })
    }

    /// Write a new status; transition rules are checked by the caller
    pub async fn set_status(
        &self,
        conn: &impl ConnectionTrait,
        member_id: &str,
        status: MemberStatus,
        reason: Option<String>,
    ) -> Result<member::Model, InternalError> {
        let mut active: member::ActiveModel = self.get(conn, member_id).await?.into();
        active.status = Set(status);
        active.status_reason = Set(reason);
        active.updated_at = Set(Utc::now().timestamp());

        active
            .update(conn)
            .await
            .map_err(|e| InternalError::database("set_member_status", e))
    }

    pub async fn delete(&self, conn: &impl ConnectionTrait, member_id: &str) -> Result<(), InternalError> {
        member::Entity::delete_by_id(member_id.to_string())
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("delete_member", e))?;
        Ok(())
    }
}

impl Default for MemberStore {
    fn default() -> Self {
        Self::new()
    }
}
