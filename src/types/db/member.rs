use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Membership status
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, poem_openapi::Enum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[oai(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    #[sea_orm(string_value = "INACTIVE")]
    Inactive,
    #[sea_orm(string_value = "RESIGNED")]
    Resigned,
    #[sea_orm(string_value = "EXPELLED")]
    Expelled,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

impl MemberStatus {
    /// Allowed status transitions
    pub fn can_transition_to(&self, next: MemberStatus) -> bool {
        use MemberStatus::*;
        matches!(
            (self, next),
            (Pending, Active)
                | (Pending, Rejected)
                | (Active, Inactive)
                | (Active, Resigned)
                | (Active, Expelled)
                | (Inactive, Active)
                | (Inactive, Resigned)
                | (Inactive, Expelled)
                | (Resigned, Active)
        )
    }

    /// Only records that never became real memberships may be deleted
    pub fn is_deletable(&self) -> bool {
        matches!(self, MemberStatus::Pending | MemberStatus::Rejected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
            Self::Resigned => "RESIGNED",
            Self::Expelled => "EXPELLED",
            Self::Rejected => "REJECTED",
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub registration_number: String,
    #[sea_orm(unique)]
    pub national_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    // ISO date (YYYY-MM-DD)
    pub birth_date: Option<String>,
    pub province_id: String,
    pub district_id: Option<String>,
    pub branch_id: Option<String>,
    pub institution_id: Option<String>,
    pub status: MemberStatus,
    pub status_reason: Option<String>,
    pub created_by: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::MemberStatus::*;

    #[test]
    fn test_pending_can_only_be_approved_or_rejected() {
        assert!(Pending.can_transition_to(Active));
        assert!(Pending.can_transition_to(Rejected));
        assert!(!Pending.can_transition_to(Inactive));
        assert!(!Pending.can_transition_to(Expelled));
    }

    #[test]
    fn test_terminal_statuses_have_no_transitions() {
        for next in [Pending, Active, Inactive, Resigned, Expelled, Rejected] {
            assert!(!Expelled.can_transition_to(next));
            assert!(!Rejected.can_transition_to(next));
        }
    }

    #[test]
    fn test_resigned_member_can_rejoin() {
        assert!(Resigned.can_transition_to(Active));
        assert!(!Resigned.can_transition_to(Inactive));
    }

    #[test]
    fn test_status_never_transitions_to_itself() {
        for status in [Pending, Active, Inactive, Resigned, Expelled, Rejected] {
            assert!(!status.can_transition_to(status));
        }
    }

    #[test]
    fn test_only_pending_and_rejected_are_deletable() {
        assert!(Pending.is_deletable());
        assert!(Rejected.is_deletable());
        assert!(!Active.is_deletable());
        assert!(!Resigned.is_deletable());
    }
}
