use entity::member;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(member::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(member::Column::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(member::Column::Name).string().not_null())
                    .col(
                        ColumnDef::new(member::Column::FatherName)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(member::Column::Religion).string().not_null())
                    .col(ColumnDef::new(member::Column::Pincode).string().not_null())
                    .col(ColumnDef::new(member::Column::Email).string().not_null())
                    .col(
                        ColumnDef::new(member::Column::ContactNo)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(member::Column::MemberId).string().not_null())
                    .col(
                        ColumnDef::new(member::Column::Status)
                            .string()
                            .not_null()
                            .default("pending".to_owned()),
                    )
                    .col(
                        ColumnDef::new(member::Column::JoinDate)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(member::Column::ApprovedDate).big_integer())
                    .col(ColumnDef::new(member::Column::Notes).text())
                    .col(
                        ColumnDef::new(member::Column::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(member::Column::UpdatedAt)
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
                    .name("uq_member_email")
                    .col(member::Column::Email)
                    .table(member::Entity)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_member_member_id")
                    .col(member::Column::MemberId)
                    .table(member::Entity)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_member_status")
                    .col(member::Column::Status)
                    .table(member::Entity)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_member_status").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uq_member_member_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uq_member_email").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(member::Entity).to_owned())
            .await
    }
}
