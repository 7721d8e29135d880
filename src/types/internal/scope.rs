use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Geographic level a custom role is restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, poem_openapi::Enum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[oai(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScopeLevel {
    #[sea_orm(string_value = "PROVINCE")]
    Province,
    #[sea_orm(string_value = "DISTRICT")]
    District,
}

impl ScopeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Province => "PROVINCE",
            Self::District => "DISTRICT",
        }
    }

    /// Province-level roles take province-wide scopes, district-level roles district scopes
    pub fn accepts(&self, scope: &ScopeRef) -> bool {
        match self {
            Self::Province => scope.district_id.is_none(),
            Self::District => scope.district_id.is_some(),
        }
    }
}

/// A validated province/district pair
///
/// `province_id` is always filled in: a district-only scope gets its
/// province from the district. A scope with a district grants authority over
/// that district only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeRef {
    pub province_id: String,
    pub district_id: Option<String>,
}

/// Unvalidated province/district pair as received from a client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeInput {
    pub province_id: Option<String>,
    pub district_id: Option<String>,
}

/// Which members a user may see and act on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberScope {
    /// No geographic restriction
    Unrestricted,
    /// Members in any listed province (province-wide scopes) or district
    Restricted {
        province_ids: Vec<String>,
        district_ids: Vec<String>,
    },
}

impl MemberScope {
    /// Build the restriction from a user's scopes
    pub fn from_scopes(scopes: &[ScopeRef]) -> Self {
        let mut province_ids = Vec::new();
        let mut district_ids = Vec::new();
        for scope in scopes {
            match &scope.district_id {
                Some(district_id) => district_ids.push(district_id.clone()),
                None => province_ids.push(scope.province_id.clone()),
            }
        }
        Self::Restricted { province_ids, district_ids }
    }

    /// Whether a member located at the given province/district is visible
    pub fn allows(&self, province_id: &str, district_id: Option<&str>) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Restricted { province_ids, district_ids } => {
                province_ids.iter().any(|p| p == province_id)
                    || district_id.is_some_and(|d| district_ids.iter().any(|id| id == d))
            }
        }
    }

    /// Restricted with nothing granted
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Restricted { province_ids, district_ids } if province_ids.is_empty() && district_ids.is_empty())
    }
}
