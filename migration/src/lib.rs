pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_user_tables;
mod m20250301_000002_create_region_tables;
mod m20250301_000003_create_role_tables;
mod m20250301_000004_create_member_tables;
mod m20250301_000005_create_panel_user_applications;
mod m20250301_000006_create_system_settings;
mod m20250301_000007_create_uploaded_files;
mod m20250301_000008_create_audit_events;

/// Migrations for the main application database
pub struct MainMigrator;

#[async_trait::async_trait]
impl MigratorTrait for MainMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_user_tables::Migration),
            Box::new(m20250301_000002_create_region_tables::Migration),
            Box::new(m20250301_000003_create_role_tables::Migration),
            Box::new(m20250301_000004_create_member_tables::Migration),
            Box::new(m20250301_000005_create_panel_user_applications::Migration),
            Box::new(m20250301_000006_create_system_settings::Migration),
            Box::new(m20250301_000007_create_uploaded_files::Migration),
        ]
    }
}

/// Migrations for the activity log database
pub struct AuditMigrator;

#[async_trait::async_trait]
impl MigratorTrait for AuditMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000008_create_audit_events::Migration),
        ]
    }
}
