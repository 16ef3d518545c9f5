use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Minute-keyed ICX/USD, sICX/bnUSD and sICX/ICX quotes
        manager
            .create_table(
                Table::create()
                    .table(IcxSicxBnusdQuotes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IcxSicxBnusdQuotes::Timestamp)
                            .timestamp()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(IcxSicxBnusdQuotes::IcxUsd).decimal().not_null())
                    .col(ColumnDef::new(IcxSicxBnusdQuotes::SicxBnusd).decimal().not_null())
                    .col(ColumnDef::new(IcxSicxBnusdQuotes::SicxIcx).decimal().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ValidatorNodeStatuses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ValidatorNodeStatuses::Address)
                            .string_len(42)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ValidatorNodeStatuses::Timestamp).timestamp().not_null())
                    .col(ColumnDef::new(ValidatorNodeStatuses::Status).boolean().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ValidatorNodeStatuses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(IcxSicxBnusdQuotes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum IcxSicxBnusdQuotes {
    Table,
    Timestamp,
    IcxUsd,
    SicxBnusd,
    SicxIcx,
}

#[derive(Iden)]
enum ValidatorNodeStatuses {
    Table,
    Address,
    Timestamp,
    Status,
}
