// Database entities - SeaORM models
pub mod audit_event;
pub mod branch;
pub mod custom_role;
pub mod district;
pub mod dues_payment;
pub mod institution;
pub mod member;
pub mod panel_user_application;
pub mod province;
pub mod refresh_token;
pub mod system_setting;
pub mod uploaded_file;
pub mod user;
pub mod user_custom_role;
pub mod user_scope;
