use std::sync::Arc;

use poem::Request;
use poem_openapi::{OpenApi, Tags, payload::Json};

use crate::api::BearerAuth;
use crate::api::helpers::{bearer_from_header, create_request_context};
use crate::app_data::AppData;
use crate::coordinators::AuthCoordinator;
use crate::errors::AuthError;
use crate::types::dto::auth::{
    ChangePasswordRequest, LoginRequest, LogoutRequest, MeResponse, RefreshRequest, RefreshResponse,
    TokenResponse,
};
use crate::types::dto::common::MessageResponse;

/// Authentication API endpoints
pub struct AuthApi {
    app_data: Arc<AppData>,
    auth_coordinator: AuthCoordinator,
}

impl AuthApi {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            auth_coordinator: AuthCoordinator::new(app_data.clone()),
            app_data,
        }
    }
}

/// API tags for authentication endpoints
#[derive(Tags)]
enum AuthTags {
    /// Authentication endpoints
    Authentication,
}

#[OpenApi(prefix_path = "/auth")]
impl AuthApi {
    /// Login with username and password to receive authentication tokens
    ///
    /// Rejected with 503 while maintenance mode is on, except for admins.
    #[oai(path = "/login", method = "post", tag = "AuthTags::Authentication")]
    async fn login(&self, req: &Request, body: Json<LoginRequest>) -> Result<Json<TokenResponse>, AuthError> {
        let ctx = create_request_context(req, None, &self.app_data.token_provider).into_context();

        let tokens = self
            .auth_coordinator
            .login(&ctx, &body.username, &body.password)
            .await
            .map_err(AuthError::from_internal_error)?;

        Ok(Json(tokens.into()))
    }

    /// Exchange a refresh token for a new access token
    #[oai(path = "/refresh", method = "post", tag = "AuthTags::Authentication")]
    async fn refresh(&self, req: &Request, body: Json<RefreshRequest>) -> Result<Json<RefreshResponse>, AuthError> {
        let ctx = create_request_context(req, None, &self.app_data.token_provider).into_context();

        let jwt = self
            .auth_coordinator
            .refresh(&ctx, &body.refresh_token)
            .await
            .map_err(AuthError::from_internal_error)?;

        Ok(Json(jwt.into()))
    }

    /// Revoke a refresh token
    ///
    /// The access token is optional; when present it attributes the logout.
    #[oai(path = "/logout", method = "post", tag = "AuthTags::Authentication")]
    async fn logout(&self, req: &Request, body: Json<LogoutRequest>) -> Result<Json<MessageResponse>, AuthError> {
        let ctx = create_request_context(req, bearer_from_header(req), &self.app_data.token_provider).into_context();

        self.auth_coordinator
            .logout(&ctx, &body.refresh_token)
            .await
            .map_err(AuthError::from_internal_error)?;

        Ok(Json(MessageResponse::new("Logged out")))
    }

    /// Current user with effective permissions and scopes
    ///
    /// Available while a password change is pending.
    #[oai(path = "/me", method = "get", tag = "AuthTags::Authentication")]
    async fn me(&self, req: &Request, auth: BearerAuth) -> Result<Json<MeResponse>, AuthError> {
        let ctx = create_request_context(req, Some(auth.0), &self.app_data.token_provider).into_context();

        let profile = self
            .auth_coordinator
            .me(&ctx)
            .await
            .map_err(AuthError::from_internal_error)?;

        Ok(Json(profile.into()))
    }

    /// Change the caller's password
    ///
    /// Clears the password change requirement and revokes all refresh tokens.
    #[oai(path = "/change-password", method = "post", tag = "AuthTags::Authentication")]
    async fn change_password(
        &self,
        req: &Request,
        auth: BearerAuth,
        body: Json<ChangePasswordRequest>,
    ) -> Result<Json<MessageResponse>, AuthError> {
        let ctx = create_request_context(req, Some(auth.0), &self.app_data.token_provider).into_context();

        self.auth_coordinator
            .change_password(&ctx, &body.old_password, &body.new_password)
            .await
            .map_err(AuthError::from_internal_error)?;

        Ok(Json(MessageResponse::new("Password changed. Please log in again.")))
    }
}
