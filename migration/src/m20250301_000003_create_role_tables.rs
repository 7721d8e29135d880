use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CustomRoles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(CustomRoles::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(CustomRoles::Name).string().not_null().unique_key())
                    .col(ColumnDef::new(CustomRoles::Description).string().null())
                    .col(ColumnDef::new(CustomRoles::Permissions).string().not_null().default("[]"))
                    .col(ColumnDef::new(CustomRoles::ScopeLevel).string().null())
                    .col(ColumnDef::new(CustomRoles::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(CustomRoles::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(CustomRoles::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // Role assignments
        manager
            .create_table(
                Table::create()
                    .table(UserCustomRoles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserCustomRoles::UserId).string().not_null())
                    .col(ColumnDef::new(UserCustomRoles::RoleId).string().not_null())
                    .col(ColumnDef::new(UserCustomRoles::CreatedAt).big_integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(UserCustomRoles::UserId)
                            .col(UserCustomRoles::RoleId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_custom_roles_user_id")
                            .from(UserCustomRoles::Table, UserCustomRoles::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_custom_roles_role_id")
                            .from(UserCustomRoles::Table, UserCustomRoles::RoleId)
                            .to(CustomRoles::Table, CustomRoles::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserScopes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserScopes::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(UserScopes::UserId).string().not_null())
                    .col(ColumnDef::new(UserScopes::ProvinceId).string().null())
                    .col(ColumnDef::new(UserScopes::DistrictId).string().null())
                    .col(ColumnDef::new(UserScopes::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_scopes_user_id")
                            .from(UserScopes::Table, UserScopes::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_scopes_user_id")
                    .table(UserScopes::Table)
                    .col(UserScopes::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserScopes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserCustomRoles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CustomRoles::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum CustomRoles {
    Table,
    Id,
    Name,
    Description,
    Permissions,
    ScopeLevel,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum UserCustomRoles {
    Table,
    UserId,
    RoleId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum UserScopes {
    Table,
    Id,
    UserId,
    ProvinceId,
    DistrictId,
    CreatedAt,
}
