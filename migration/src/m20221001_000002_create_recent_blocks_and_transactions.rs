use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RecentBlocks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RecentBlocks::Number)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RecentBlocks::Hash).string_len(66).not_null())
                    .col(ColumnDef::new(RecentBlocks::Timestamp).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RecentTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RecentTransactions::Hash)
                            .string_len(66)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RecentTransactions::BlockTimestamp)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RecentTransactions::Value).string().not_null())
                    .col(ColumnDef::new(RecentTransactions::Method).string().null())
                    .to_owned(),
            )
            .await?;

        // Pruning and the home page both read newest-first
        manager
            .create_index(
                Index::create()
                    .name("idx_recent_transactions_block_timestamp")
                    .table(RecentTransactions::Table)
                    .col((RecentTransactions::BlockTimestamp, IndexOrder::Desc))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RecentTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RecentBlocks::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum RecentBlocks {
    Table,
    Number,
    Hash,
    Timestamp,
}

#[derive(Iden)]
enum RecentTransactions {
    Table,
    Hash,
    BlockTimestamp,
    Value,
    Method,
}
