// API layer - HTTP endpoints
//
// Endpoints build a RequestContext, call one coordinator method and convert
// the result into DTOs. Errors are converted explicitly with
// `AdminError::from_internal_error` / `AuthError::from_internal_error`.
pub mod activity_logs;
pub mod applications;
pub mod auth;
pub mod dues;
pub mod files;
pub mod health;
pub mod helpers;
pub mod members;
pub mod regions;
pub mod roles;
pub mod settings;
pub mod users;

#[cfg(test)]
mod helpers_test;

use std::sync::Arc;

use poem::Route;
use poem_openapi::{OpenApiService, SecurityScheme, auth::Bearer};

pub use activity_logs::ActivityLogApi;
pub use applications::ApplicationApi;
pub use auth::AuthApi;
pub use dues::DuesApi;
pub use files::FileApi;
pub use health::HealthApi;
pub use members::MemberApi;
pub use regions::RegionApi;
pub use roles::RoleApi;
pub use settings::SettingsApi;
pub use users::UserApi;

use crate::app_data::AppData;

/// JWT Bearer token authentication
#[derive(SecurityScheme)]
#[oai(
    ty = "bearer",
    key_name = "Authorization",
    key_in = "header",
    bearer_format = "JWT"
)]
pub struct BearerAuth(pub Bearer);

/// Compose every API under `/api` and the Swagger UI under `/swagger`
pub fn routes(app_data: Arc<AppData>, server_url: &str) -> Route {
    let apis = (
        HealthApi,
        AuthApi::new(app_data.clone()),
        UserApi::new(app_data.clone()),
        RoleApi::new(app_data.clone()),
        MemberApi::new(app_data.clone()),
        ApplicationApi::new(app_data.clone()),
        DuesApi::new(app_data.clone()),
        RegionApi::new(app_data.clone()),
        SettingsApi::new(app_data.clone()),
        FileApi::new(app_data.clone()),
        ActivityLogApi::new(app_data),
    );

    let api_service = OpenApiService::new(apis, "Union Administration API", env!("CARGO_PKG_VERSION"))
        .server(format!("{}/api", server_url.trim_end_matches('/')));
    let ui = api_service.swagger_ui();

    Route::new().nest("/api", api_service).nest("/swagger", ui)
}
