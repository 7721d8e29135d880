use std::sync::Arc;

use poem::Request;
use poem_openapi::param::{Path, Query};
use poem_openapi::{OpenApi, Tags, payload::Json};

use crate::api::BearerAuth;
use crate::api::helpers::require_context;
use crate::app_data::AppData;
use crate::coordinators::SettingsCoordinator;
use crate::errors::AdminError;
use crate::types::dto::settings::{PublicSettingResponse, SettingResponse, UpdateSettingRequest};

/// Runtime system settings
pub struct SettingsApi {
    app_data: Arc<AppData>,
    settings_coordinator: SettingsCoordinator,
}

impl SettingsApi {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            settings_coordinator: SettingsCoordinator::new(app_data.clone()),
            app_data,
        }
    }
}

#[derive(Tags)]
enum SettingsTags {
    /// System settings
    Settings,
}

#[OpenApi]
impl SettingsApi {
    /// Settings flagged public, no authentication required
    #[oai(path = "/settings/public", method = "get", tag = "SettingsTags::Settings")]
    async fn public(&self) -> Result<Json<Vec<PublicSettingResponse>>, AdminError> {
        let settings = self
            .settings_coordinator
            .public()
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(settings.into_iter().map(Into::into).collect()))
    }

    #[oai(path = "/settings", method = "get", tag = "SettingsTags::Settings")]
    async fn list(
        &self,
        req: &Request,
        auth: BearerAuth,
        category: Query<Option<String>>,
    ) -> Result<Json<Vec<SettingResponse>>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        let settings = self
            .settings_coordinator
            .list(&ctx, category.0.as_deref())
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(settings.into_iter().map(Into::into).collect()))
    }

    #[oai(path = "/settings/:key", method = "get", tag = "SettingsTags::Settings")]
    async fn get(&self, req: &Request, auth: BearerAuth, key: Path<String>) -> Result<Json<SettingResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        let setting = self
            .settings_coordinator
            .get(&ctx, &key.0)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(setting.into()))
    }

    /// Update an editable setting; the value must parse as its declared type
    #[oai(path = "/settings/:key", method = "put", tag = "SettingsTags::Settings")]
    async fn update(
        &self,
        req: &Request,
        auth: BearerAuth,
        key: Path<String>,
        body: Json<UpdateSettingRequest>,
    ) -> Result<Json<SettingResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        let setting = self
            .settings_coordinator
            .update(&ctx, &key.0, &body.0.value)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(setting.into()))
    }
}
