use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Members::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Members::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Members::RegistrationNumber).string().not_null().unique_key())
                    .col(ColumnDef::new(Members::NationalId).string().not_null().unique_key())
                    .col(ColumnDef::new(Members::FirstName).string().not_null())
                    .col(ColumnDef::new(Members::LastName).string().not_null())
                    .col(ColumnDef::new(Members::Email).string().null())
                    .col(ColumnDef::new(Members::Phone).string().null())
                    .col(ColumnDef::new(Members::BirthDate).string().null())
                    .col(ColumnDef::new(Members::ProvinceId).string().not_null())
                    .col(ColumnDef::new(Members::DistrictId).string().null())
                    .col(ColumnDef::new(Members::BranchId).string().null())
                    .col(ColumnDef::new(Members::InstitutionId).string().null())
                    .col(ColumnDef::new(Members::Status).string().not_null())
                    .col(ColumnDef::new(Members::StatusReason).string().null())
                    .col(ColumnDef::new(Members::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Members::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Members::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_members_status")
                    .table(Members::Table)
                    .col(Members::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_members_province_id")
                    .table(Members::Table)
                    .col(Members::ProvinceId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DuesPayments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DuesPayments::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(DuesPayments::MemberId).string().not_null())
                    .col(ColumnDef::new(DuesPayments::Period).string().not_null())
                    .col(ColumnDef::new(DuesPayments::AmountCents).big_integer().not_null())
                    .col(ColumnDef::new(DuesPayments::PaidAt).big_integer().not_null())
                    .col(ColumnDef::new(DuesPayments::Note).string().null())
                    .col(ColumnDef::new(DuesPayments::RecordedBy).string().not_null())
                    .col(ColumnDef::new(DuesPayments::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_dues_payments_member_id")
                            .from(DuesPayments::Table, DuesPayments::MemberId)
                            .to(Members::Table, Members::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One payment per member and period
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_dues_payments_member_period")
                    .table(DuesPayments::Table)
                    .col(DuesPayments::MemberId)
                    .col(DuesPayments::Period)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DuesPayments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Members::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Members {
    Table,
    Id,
    RegistrationNumber,
    NationalId,
    FirstName,
    LastName,
    Email,
    Phone,
    BirthDate,
    ProvinceId,
    DistrictId,
    BranchId,
    InstitutionId,
    Status,
    StatusReason,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum DuesPayments {
    Table,
    Id,
    MemberId,
    Period,
    AmountCents,
    PaidAt,
    Note,
    RecordedBy,
    CreatedAt,
}
