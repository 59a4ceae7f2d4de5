use entity::sequence;
use sea_orm_migration::prelude::*;

/// member id sequence, created here so concurrent first joins only update it
const MEMBER: &str = "member";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(sequence::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(sequence::Column::Name)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(sequence::Column::Value)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        let seed = Query::insert()
            .into_table(sequence::Entity)
            .columns([sequence::Column::Name, sequence::Column::Value])
            .values([MEMBER.into(), 0i64.into()])
            .map_err(|e| DbErr::Custom(e.to_string()))?
            .to_owned();
        manager.exec_stmt(seed).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(sequence::Entity).to_owned())
            .await
    }
}
