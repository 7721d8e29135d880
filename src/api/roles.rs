use std::sync::Arc;

use poem::Request;
use poem_openapi::param::Path;
use poem_openapi::{OpenApi, Tags, payload::Json};

use crate::api::BearerAuth;
use crate::api::helpers::require_context;
use crate::app_data::AppData;
use crate::coordinators::RoleCoordinator;
use crate::errors::AdminError;
use crate::types::dto::common::MessageResponse;
use crate::types::dto::roles::{CreateRoleRequest, PermissionResponse, RoleResponse, UpdateRoleRequest};

/// Custom roles and the permission catalog
pub struct RoleApi {
    app_data: Arc<AppData>,
    role_coordinator: RoleCoordinator,
}

impl RoleApi {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            role_coordinator: RoleCoordinator::new(app_data.clone()),
            app_data,
        }
    }
}

#[derive(Tags)]
enum RoleTags {
    /// Custom roles
    Roles,
}

#[OpenApi]
impl RoleApi {
    /// Permission catalog with direct and transitive dependencies
    #[oai(path = "/roles/permissions", method = "get", tag = "RoleTags::Roles")]
    async fn permissions(&self, req: &Request, auth: BearerAuth) -> Result<Json<Vec<PermissionResponse>>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        let catalog = self
            .role_coordinator
            .catalog(&ctx)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(catalog.into_iter().map(Into::into).collect()))
    }

    /// List custom roles
    #[oai(path = "/roles", method = "get", tag = "RoleTags::Roles")]
    async fn list(&self, req: &Request, auth: BearerAuth) -> Result<Json<Vec<RoleResponse>>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        let roles = self
            .role_coordinator
            .list(&ctx)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(roles.into_iter().map(Into::into).collect()))
    }

    #[oai(path = "/roles/:id", method = "get", tag = "RoleTags::Roles")]
    async fn get(&self, req: &Request, auth: BearerAuth, id: Path<String>) -> Result<Json<RoleResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        let role = self
            .role_coordinator
            .get(&ctx, &id.0)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(role.into()))
    }

    /// Create a custom role
    ///
    /// Permissions are stored together with everything they depend on.
    #[oai(path = "/roles", method = "post", tag = "RoleTags::Roles")]
    async fn create(&self, req: &Request, auth: BearerAuth, body: Json<CreateRoleRequest>) -> Result<Json<RoleResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        let role = self
            .role_coordinator
            .create(&ctx, body.0.into())
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(role.into()))
    }

    #[oai(path = "/roles/:id", method = "patch", tag = "RoleTags::Roles")]
    async fn update(
        &self,
        req: &Request,
        auth: BearerAuth,
        id: Path<String>,
        body: Json<UpdateRoleRequest>,
    ) -> Result<Json<RoleResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        let role = self
            .role_coordinator
            .update(&ctx, &id.0, body.0.into())
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(role.into()))
    }

    /// Delete a custom role that nobody holds or requested
    #[oai(path = "/roles/:id", method = "delete", tag = "RoleTags::Roles")]
    async fn delete(&self, req: &Request, auth: BearerAuth, id: Path<String>) -> Result<Json<MessageResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        self.role_coordinator
            .delete(&ctx, &id.0)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(MessageResponse::new("Role deleted")))
    }
}
