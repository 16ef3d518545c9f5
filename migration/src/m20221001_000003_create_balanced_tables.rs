use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BalancedLoans::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BalancedLoans::PosId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BalancedLoans::Address).string_len(42).not_null())
                    .col(ColumnDef::new(BalancedLoans::Created).timestamp().not_null())
                    .col(ColumnDef::new(BalancedLoans::Collateral).decimal().not_null())
                    .col(ColumnDef::new(BalancedLoans::Ratio).decimal().not_null())
                    .col(ColumnDef::new(BalancedLoans::TotalDebt).decimal().not_null())
                    .col(ColumnDef::new(BalancedLoans::Standing).string().not_null())
                    .col(ColumnDef::new(BalancedLoans::Assets).json_binary().not_null())
                    .col(ColumnDef::new(BalancedLoans::Holdings).json_binary().not_null())
                    .col(ColumnDef::new(BalancedLoans::Standings).json_binary().not_null())
                    .col(
                        ColumnDef::new(BalancedLoans::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BalancedPoolStaticData::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BalancedPoolStaticData::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BalancedPoolStaticData::BaseDecimals).integer().not_null())
                    .col(ColumnDef::new(BalancedPoolStaticData::BaseName).string().not_null())
                    .col(ColumnDef::new(BalancedPoolStaticData::BaseToken).string_len(42).null())
                    .col(ColumnDef::new(BalancedPoolStaticData::BaseSymbol).string().not_null())
                    .col(ColumnDef::new(BalancedPoolStaticData::MinQuote).decimal().not_null())
                    .col(ColumnDef::new(BalancedPoolStaticData::PoolName).string().not_null())
                    .col(ColumnDef::new(BalancedPoolStaticData::QuoteDecimals).integer().not_null())
                    .col(ColumnDef::new(BalancedPoolStaticData::QuoteName).string().not_null())
                    .col(ColumnDef::new(BalancedPoolStaticData::QuoteToken).string_len(42).null())
                    .col(ColumnDef::new(BalancedPoolStaticData::QuoteSymbol).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BalancedPoolDynamicSnapshots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BalancedPoolDynamicSnapshots::Timestamp)
                            .timestamp()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BalancedPoolDynamicSnapshots::BlockHeight)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BalancedPoolDynamicSnapshots::Data)
                            .json_binary()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BalancedPoolDynamicSnapshots::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BalancedPoolStaticData::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BalancedLoans::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum BalancedLoans {
    Table,
    PosId,
    Address,
    Created,
    Collateral,
    Ratio,
    TotalDebt,
    Standing,
    Assets,
    Holdings,
    Standings,
    UpdatedAt,
}

#[derive(Iden)]
enum BalancedPoolStaticData {
    Table,
    Id,
    BaseDecimals,
    BaseName,
    BaseToken,
    BaseSymbol,
    MinQuote,
    PoolName,
    QuoteDecimals,
    QuoteName,
    QuoteToken,
    QuoteSymbol,
}

#[derive(Iden)]
enum BalancedPoolDynamicSnapshots {
    Table,
    Timestamp,
    BlockHeight,
    Data,
}
