use entity::donation;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(donation::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(donation::Column::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(donation::Column::Name).string().not_null())
                    .col(ColumnDef::new(donation::Column::Email).string())
                    .col(ColumnDef::new(donation::Column::Phone).string())
                    .col(
                        ColumnDef::new(donation::Column::Amount)
                            .double()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(donation::Column::Purpose)
                            .string()
                            .not_null()
                            .default("General".to_owned()),
                    )
                    .col(ColumnDef::new(donation::Column::PaymentMethod).string())
                    .col(ColumnDef::new(donation::Column::Message).text())
                    .col(ColumnDef::new(donation::Column::UserId).string())
                    .col(
                        ColumnDef::new(donation::Column::Timestamp)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_donation_timestamp")
                    .col(donation::Column::Timestamp)
                    .table(donation::Entity)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_donation_timestamp").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(donation::Entity).to_owned())
            .await
    }
}
