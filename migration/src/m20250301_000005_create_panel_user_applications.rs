use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PanelUserApplications::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PanelUserApplications::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(PanelUserApplications::MemberId).string().not_null())
                    .col(ColumnDef::new(PanelUserApplications::RequestedUsername).string().not_null())
                    .col(ColumnDef::new(PanelUserApplications::RequestedRoleId).string().not_null())
                    .col(ColumnDef::new(PanelUserApplications::Scopes).string().not_null().default("[]"))
                    .col(ColumnDef::new(PanelUserApplications::Note).string().null())
                    .col(ColumnDef::new(PanelUserApplications::Status).string().not_null())
                    .col(ColumnDef::new(PanelUserApplications::CreatedBy).string().not_null())
                    .col(ColumnDef::new(PanelUserApplications::ReviewedBy).string().null())
                    .col(ColumnDef::new(PanelUserApplications::ReviewNote).string().null())
                    .col(ColumnDef::new(PanelUserApplications::CreatedUserId).string().null())
                    .col(ColumnDef::new(PanelUserApplications::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(PanelUserApplications::ReviewedAt).big_integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_panel_user_applications_member_id")
                            .from(PanelUserApplications::Table, PanelUserApplications::MemberId)
                            .to(Members::Table, Members::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_panel_user_applications_status")
                    .table(PanelUserApplications::Table)
                    .col(PanelUserApplications::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PanelUserApplications::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Members {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum PanelUserApplications {
    Table,
    Id,
    MemberId,
    RequestedUsername,
    RequestedRoleId,
    Scopes,
    Note,
    Status,
    CreatedBy,
    ReviewedBy,
    ReviewNote,
    CreatedUserId,
    CreatedAt,
    ReviewedAt,
}
