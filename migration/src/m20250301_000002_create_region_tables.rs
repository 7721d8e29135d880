use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Provinces::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Provinces::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Provinces::Code).string().not_null().unique_key())
                    .col(ColumnDef::new(Provinces::Name).string().not_null())
                    .col(ColumnDef::new(Provinces::CreatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Districts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Districts::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Districts::ProvinceId).string().not_null())
                    .col(ColumnDef::new(Districts::Name).string().not_null())
                    .col(ColumnDef::new(Districts::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_districts_province_id")
                            .from(Districts::Table, Districts::ProvinceId)
                            .to(Provinces::Table, Provinces::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_districts_province_id")
                    .table(Districts::Table)
                    .col(Districts::ProvinceId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Branches::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Branches::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Branches::ProvinceId).string().not_null())
                    .col(ColumnDef::new(Branches::Name).string().not_null())
                    .col(ColumnDef::new(Branches::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_branches_province_id")
                            .from(Branches::Table, Branches::ProvinceId)
                            .to(Provinces::Table, Provinces::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Institutions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Institutions::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Institutions::Name).string().not_null())
                    .col(ColumnDef::new(Institutions::DistrictId).string().null())
                    .col(ColumnDef::new(Institutions::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_institutions_district_id")
                            .from(Institutions::Table, Institutions::DistrictId)
                            .to(Districts::Table, Districts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Institutions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Branches::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Districts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Provinces::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Provinces {
    Table,
    Id,
    Code,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Districts {
    Table,
    Id,
    ProvinceId,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Branches {
    Table,
    Id,
    ProvinceId,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Institutions {
    Table,
    Id,
    Name,
    DistrictId,
    CreatedAt,
}
