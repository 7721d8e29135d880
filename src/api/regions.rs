use std::sync::Arc;

use poem::Request;
use poem_openapi::param::{Path, Query};
use poem_openapi::{OpenApi, Tags, payload::Json};

use crate::api::BearerAuth;
use crate::api::helpers::require_context;
use crate::app_data::AppData;
use crate::coordinators::RegionCoordinator;
use crate::errors::AdminError;
use crate::types::dto::common::MessageResponse;
use crate::types::dto::into_change;
use crate::types::dto::regions::{
    CreateInstitutionRequest, CreateProvinceChildRequest, CreateProvinceRequest, InstitutionResponse,
    ProvinceChildResponse, ProvinceResponse, RenameRequest, UpdateInstitutionRequest, UpdateProvinceRequest,
};

/// Provinces, districts, branches and institutions
pub struct RegionApi {
    app_data: Arc<AppData>,
    region_coordinator: RegionCoordinator,
}

impl RegionApi {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            region_coordinator: RegionCoordinator::new(app_data.clone()),
            app_data,
        }
    }
}

#[derive(Tags)]
enum RegionTags {
    /// Administrative regions
    Regions,
}

#[OpenApi]
impl RegionApi {
    #[oai(path = "/provinces", method = "get", tag = "RegionTags::Regions")]
    async fn list_provinces(&self, req: &Request, auth: BearerAuth) -> Result<Json<Vec<ProvinceResponse>>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        let provinces = self
            .region_coordinator
            .list_provinces(&ctx)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(provinces.into_iter().map(Into::into).collect()))
    }

    #[oai(path = "/provinces/:id", method = "get", tag = "RegionTags::Regions")]
    async fn get_province(&self, req: &Request, auth: BearerAuth, id: Path<String>) -> Result<Json<ProvinceResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        let province = self
            .region_coordinator
            .get_province(&ctx, &id.0)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(province.into()))
    }

    #[oai(path = "/provinces", method = "post", tag = "RegionTags::Regions")]
    async fn create_province(
        &self,
        req: &Request,
        auth: BearerAuth,
        body: Json<CreateProvinceRequest>,
    ) -> Result<Json<ProvinceResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;
        let CreateProvinceRequest { code, name } = body.0;

        let province = self
            .region_coordinator
            .create_province(&ctx, code, name)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(province.into()))
    }

    #[oai(path = "/provinces/:id", method = "patch", tag = "RegionTags::Regions")]
    async fn update_province(
        &self,
        req: &Request,
        auth: BearerAuth,
        id: Path<String>,
        body: Json<UpdateProvinceRequest>,
    ) -> Result<Json<ProvinceResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;
        let UpdateProvinceRequest { code, name } = body.0;

        let province = self
            .region_coordinator
            .update_province(&ctx, &id.0, code, name)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(province.into()))
    }

    /// Delete a province nothing references
    #[oai(path = "/provinces/:id", method = "delete", tag = "RegionTags::Regions")]
    async fn delete_province(&self, req: &Request, auth: BearerAuth, id: Path<String>) -> Result<Json<MessageResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        self.region_coordinator
            .delete_province(&ctx, &id.0)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(MessageResponse::new("Province deleted")))
    }

    #[oai(path = "/districts", method = "get", tag = "RegionTags::Regions")]
    async fn list_districts(
        &self,
        req: &Request,
        auth: BearerAuth,
        province_id: Query<Option<String>>,
    ) -> Result<Json<Vec<ProvinceChildResponse>>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        let districts = self
            .region_coordinator
            .list_districts(&ctx, province_id.0.as_deref())
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(districts.into_iter().map(Into::into).collect()))
    }

    #[oai(path = "/districts", method = "post", tag = "RegionTags::Regions")]
    async fn create_district(
        &self,
        req: &Request,
        auth: BearerAuth,
        body: Json<CreateProvinceChildRequest>,
    ) -> Result<Json<ProvinceChildResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;
        let CreateProvinceChildRequest { province_id, name } = body.0;

        let district = self
            .region_coordinator
            .create_district(&ctx, &province_id, name)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(district.into()))
    }

    #[oai(path = "/districts/:id", method = "patch", tag = "RegionTags::Regions")]
    async fn update_district(
        &self,
        req: &Request,
        auth: BearerAuth,
        id: Path<String>,
        body: Json<RenameRequest>,
    ) -> Result<Json<ProvinceChildResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        let district = self
            .region_coordinator
            .update_district(&ctx, &id.0, body.0.name)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(district.into()))
    }

    #[oai(path = "/districts/:id", method = "delete", tag = "RegionTags::Regions")]
    async fn delete_district(&self, req: &Request, auth: BearerAuth, id: Path<String>) -> Result<Json<MessageResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        self.region_coordinator
            .delete_district(&ctx, &id.0)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(MessageResponse::new("District deleted")))
    }

    #[oai(path = "/branches", method = "get", tag = "RegionTags::Regions")]
    async fn list_branches(
        &self,
        req: &Request,
        auth: BearerAuth,
        province_id: Query<Option<String>>,
    ) -> Result<Json<Vec<ProvinceChildResponse>>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        let branches = self
            .region_coordinator
            .list_branches(&ctx, province_id.0.as_deref())
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(branches.into_iter().map(Into::into).collect()))
    }

    #[oai(path = "/branches", method = "post", tag = "RegionTags::Regions")]
    async fn create_branch(
        &self,
        req: &Request,
        auth: BearerAuth,
        body: Json<CreateProvinceChildRequest>,
    ) -> Result<Json<ProvinceChildResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;
        let CreateProvinceChildRequest { province_id, name } = body.0;

        let branch = self
            .region_coordinator
            .create_branch(&ctx, &province_id, name)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(branch.into()))
    }

    #[oai(path = "/branches/:id", method = "patch", tag = "RegionTags::Regions")]
    async fn update_branch(
        &self,
        req: &Request,
        auth: BearerAuth,
        id: Path<String>,
        body: Json<RenameRequest>,
    ) -> Result<Json<ProvinceChildResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        let branch = self
            .region_coordinator
            .update_branch(&ctx, &id.0, body.0.name)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(branch.into()))
    }

    #[oai(path = "/branches/:id", method = "delete", tag = "RegionTags::Regions")]
    async fn delete_branch(&self, req: &Request, auth: BearerAuth, id: Path<String>) -> Result<Json<MessageResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        self.region_coordinator
            .delete_branch(&ctx, &id.0)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(MessageResponse::new("Branch deleted")))
    }

    #[oai(path = "/institutions", method = "get", tag = "RegionTags::Regions")]
    async fn list_institutions(
        &self,
        req: &Request,
        auth: BearerAuth,
        district_id: Query<Option<String>>,
    ) -> Result<Json<Vec<InstitutionResponse>>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        let institutions = self
            .region_coordinator
            .list_institutions(&ctx, district_id.0.as_deref())
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(institutions.into_iter().map(Into::into).collect()))
    }

    #[oai(path = "/institutions", method = "post", tag = "RegionTags::Regions")]
    async fn create_institution(
        &self,
        req: &Request,
        auth: BearerAuth,
        body: Json<CreateInstitutionRequest>,
    ) -> Result<Json<InstitutionResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;
        let CreateInstitutionRequest { name, district_id } = body.0;

        let institution = self
            .region_coordinator
            .create_institution(&ctx, name, district_id.as_deref())
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(institution.into()))
    }

    #[oai(path = "/institutions/:id", method = "patch", tag = "RegionTags::Regions")]
    async fn update_institution(
        &self,
        req: &Request,
        auth: BearerAuth,
        id: Path<String>,
        body: Json<UpdateInstitutionRequest>,
    ) -> Result<Json<InstitutionResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;
        let UpdateInstitutionRequest { name, district_id } = body.0;

        let institution = self
            .region_coordinator
            .update_institution(&ctx, &id.0, name, into_change(district_id))
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(institution.into()))
    }

    #[oai(path = "/institutions/:id", method = "delete", tag = "RegionTags::Regions")]
    async fn delete_institution(&self, req: &Request, auth: BearerAuth, id: Path<String>) -> Result<Json<MessageResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        self.region_coordinator
            .delete_institution(&ctx, &id.0)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(MessageResponse::new("Institution deleted")))
    }
}
