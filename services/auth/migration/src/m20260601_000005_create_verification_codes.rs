use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VerificationCodes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(VerificationCodes::Email).string().not_null())
                    .col(
                        ColumnDef::new(VerificationCodes::Purpose)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(VerificationCodes::Code).string().not_null())
                    .col(
                        ColumnDef::new(VerificationCodes::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VerificationCodes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(VerificationCodes::Email)
                            .col(VerificationCodes::Purpose),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VerificationCodes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum VerificationCodes {
    Table,
    Email,
    Purpose,
    Code,
    ExpiresAt,
    CreatedAt,
}
