use poem_openapi::Object;
use poem_openapi::types::MaybeUndefined;

use crate::types::db::{branch, district, institution, province};

#[derive(Object, Debug)]
pub struct ProvinceResponse {
    pub id: String,
    pub code: String,
    pub name: String,
    pub created_at: i64,
}

impl From<province::Model> for ProvinceResponse {
    fn from(province: province::Model) -> Self {
        Self {
            id: province.id,
            code: province.code,
            name: province.name,
            created_at: province.created_at,
        }
    }
}

#[derive(Object, Debug)]
pub struct CreateProvinceRequest {
    #[oai(validator(min_length = 1, max_length = 16))]
    pub code: String,
    #[oai(validator(min_length = 1, max_length = 100))]
    pub name: String,
}

#[derive(Object, Debug, Default)]
pub struct UpdateProvinceRequest {
    pub code: Option<String>,
    pub name: Option<String>,
}

/// Shared by districts and branches, which both hang off a province
#[derive(Object, Debug)]
pub struct ProvinceChildResponse {
    pub id: String,
    pub province_id: String,
    pub name: String,
    pub created_at: i64,
}

impl From<district::Model> for ProvinceChildResponse {
    fn from(district: district::Model) -> Self {
        Self {
            id: district.id,
            province_id: district.province_id,
            name: district.name,
            created_at: district.created_at,
        }
    }
}

impl From<branch::Model> for ProvinceChildResponse {
    fn from(branch: branch::Model) -> Self {
        Self {
            id: branch.id,
            province_id: branch.province_id,
            name: branch.name,
            created_at: branch.created_at,
        }
    }
}

#[derive(Object, Debug)]
pub struct CreateProvinceChildRequest {
    pub province_id: String,
    #[oai(validator(min_length = 1, max_length = 100))]
    pub name: String,
}

#[derive(Object, Debug)]
pub struct RenameRequest {
    #[oai(validator(min_length = 1, max_length = 100))]
    pub name: String,
}

#[derive(Object, Debug)]
pub struct InstitutionResponse {
    pub id: String,
    pub name: String,
    pub district_id: Option<String>,
    pub created_at: i64,
}

impl From<institution::Model> for InstitutionResponse {
    fn from(institution: institution::Model) -> Self {
        Self {
            id: institution.id,
            name: institution.name,
            district_id: institution.district_id,
            created_at: institution.created_at,
        }
    }
}

#[derive(Object, Debug)]
pub struct CreateInstitutionRequest {
    #[oai(validator(min_length = 1, max_length = 200))]
    pub name: String,
    pub district_id: Option<String>,
}

#[derive(Object, Debug, Default)]
pub struct UpdateInstitutionRequest {
    pub name: Option<String>,
    pub district_id: MaybeUndefined<String>,
}
