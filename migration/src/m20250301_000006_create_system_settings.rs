use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// (key, value, value_type, category, description, is_editable, is_public)
const DEFAULT_SETTINGS: &[(&str, &str, &str, &str, &str, bool, bool)] = &[
    ("site_name", "Union Administration", "STRING", "general", "Name shown in the panel header", true, true),
    ("site_logo_url", "", "STRING", "general", "Logo URL shown in the panel header", true, true),
    ("maintenance_mode", "false", "BOOLEAN", "general", "Only administrators can sign in while enabled", true, true),
    ("membership_auto_approve", "false", "BOOLEAN", "membership", "New members start ACTIVE instead of PENDING", true, false),
    ("password_min_length", "8", "NUMBER", "security", "Minimum password length", true, false),
    ("password_require_uppercase", "true", "BOOLEAN", "security", "Passwords need an uppercase letter", true, false),
    ("password_require_lowercase", "true", "BOOLEAN", "security", "Passwords need a lowercase letter", true, false),
    ("password_require_number", "true", "BOOLEAN", "security", "Passwords need a digit", true, false),
    ("password_require_special", "false", "BOOLEAN", "security", "Passwords need a special character", true, false),
    ("max_upload_size_mb", "10", "NUMBER", "files", "Maximum upload size in megabytes", true, false),
    ("allowed_upload_types", "image/png,image/jpeg,application/pdf", "STRING", "files", "Comma separated list of accepted content types, empty accepts all", true, false),
    ("activity_log_retention_days", "365", "NUMBER", "audit", "Activity log entries older than this are pruned", true, false),
    ("schema_version", "1", "NUMBER", "system", "Settings schema version", false, false),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SystemSettings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SystemSettings::Key).string().not_null().primary_key())
                    .col(ColumnDef::new(SystemSettings::Value).string().not_null())
                    .col(ColumnDef::new(SystemSettings::ValueType).string().not_null())
                    .col(ColumnDef::new(SystemSettings::Category).string().not_null())
                    .col(ColumnDef::new(SystemSettings::Description).string().null())
                    .col(ColumnDef::new(SystemSettings::IsEditable).boolean().not_null().default(true))
                    .col(ColumnDef::new(SystemSettings::IsPublic).boolean().not_null().default(false))
                    .col(ColumnDef::new(SystemSettings::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(SystemSettings::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_system_settings_category")
                    .table(SystemSettings::Table)
                    .col(SystemSettings::Category)
                    .to_owned(),
            )
            .await?;

        // Initial timestamp, bumped when a setting is modified
        let now = 0i64;

        for (key, value, value_type, category, description, is_editable, is_public) in DEFAULT_SETTINGS {
            manager
                .exec_stmt(
                    Query::insert()
                        .into_table(SystemSettings::Table)
                        .columns([
                            SystemSettings::Key,
                            SystemSettings::Value,
                            SystemSettings::ValueType,
                            SystemSettings::Category,
                            SystemSettings::Description,
                            SystemSettings::IsEditable,
                            SystemSettings::IsPublic,
                            SystemSettings::CreatedAt,
                            SystemSettings::UpdatedAt,
                        ])
                        .values_panic([
                            (*key).into(),
                            (*value).into(),
                            (*value_type).into(),
                            (*category).into(),
                            (*description).into(),
                            (*is_editable).into(),
                            (*is_public).into(),
                            now.into(),
                            now.into(),
                        ])
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SystemSettings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SystemSettings {
    Table,
    Key,
    Value,
    ValueType,
    Category,
    Description,
    IsEditable,
    IsPublic,
    CreatedAt,
    UpdatedAt,
}
