use entity::prashad;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(prashad::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(prashad::Column::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(prashad::Column::Type).string().not_null())
                    .col(ColumnDef::new(prashad::Column::Name).string().not_null())
                    .col(ColumnDef::new(prashad::Column::Phone).string().not_null())
                    .col(ColumnDef::new(prashad::Column::FatherName).string())
                    .col(ColumnDef::new(prashad::Column::Village).string())
                    .col(ColumnDef::new(prashad::Column::Pincode).string())
                    .col(ColumnDef::new(prashad::Column::Address).text())
                    .col(
                        ColumnDef::new(prashad::Column::Amount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(prashad::Column::Status)
                            .string()
                            .not_null()
                            .default("pending".to_owned()),
                    )
                    .col(
                        ColumnDef::new(prashad::Column::BookingDate)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(prashad::Column::DeliveryDate).big_integer())
                    .col(ColumnDef::new(prashad::Column::Notes).text())
                    .col(
                        ColumnDef::new(prashad::Column::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(prashad::Column::UpdatedAt)
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
                    .name("idx_prashad_type_status")
                    .col(prashad::Column::Type)
                    .col(prashad::Column::Status)
                    .table(prashad::Entity)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_prashad_type_status").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(prashad::Entity).to_owned())
            .await
    }
}
