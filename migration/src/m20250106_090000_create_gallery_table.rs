use entity::gallery;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(gallery::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(gallery::Column::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(gallery::Column::Filename).string().not_null())
                    .col(
                        ColumnDef::new(gallery::Column::OriginalName)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(gallery::Column::Path).string().not_null())
                    .col(
                        ColumnDef::new(gallery::Column::Category)
                            .string()
                            .not_null()
                            .default("temple".to_owned()),
                    )
                    .col(
                        ColumnDef::new(gallery::Column::UploadedBy)
                            .string()
                            .not_null()
                            .default("admin".to_owned()),
                    )
                    .col(
                        ColumnDef::new(gallery::Column::UploadDate)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(gallery::Column::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(gallery::Column::Views)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(gallery::Column::Likes)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(gallery::Column::Notes).text())
                    .col(
                        ColumnDef::new(gallery::Column::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(gallery::Column::UpdatedAt)
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
                    .name("idx_gallery_upload_date")
                    .col(gallery::Column::UploadDate)
                    .table(gallery::Entity)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_gallery_upload_date").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(gallery::Entity).to_owned())
            .await
    }
}
