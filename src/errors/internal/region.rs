use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegionError {
    #[error("Province not found: {0}")]
    ProvinceNotFound(String),

    #[error("District not found: {0}")]
    DistrictNotFound(String),

    #[error("Branch not found: {0}")]
    BranchNotFound(String),

    #[error("Institution not found: {0}")]
    InstitutionNotFound(String),

    #[error("District {district_id} does not belong to province {province_id}")]
    DistrictProvinceMismatch {
        district_id: String,
        province_id: String,
    },

    #[error("Province code already exists: {0}")]
    DuplicateCode(String),

    #[error("{0} is still referenced and cannot be deleted")]
    InUse(String),
}
