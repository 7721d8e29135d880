use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UploadedFiles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UploadedFiles::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(UploadedFiles::OriginalName).string().not_null())
                    .col(ColumnDef::new(UploadedFiles::StoredName).string().not_null().unique_key())
                    .col(ColumnDef::new(UploadedFiles::ContentType).string().not_null())
                    .col(ColumnDef::new(UploadedFiles::SizeBytes).big_integer().not_null())
                    .col(ColumnDef::new(UploadedFiles::Category).string().null())
                    .col(ColumnDef::new(UploadedFiles::UploadedBy).string().not_null())
                    .col(ColumnDef::new(UploadedFiles::CreatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UploadedFiles::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UploadedFiles {
    Table,
    Id,
    OriginalName,
    StoredName,
    ContentType,
    SizeBytes,
    Category,
    UploadedBy,
    CreatedAt,
}
