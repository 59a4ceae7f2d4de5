pub use sea_orm_migration::prelude::*;

mod m20230822_184929_create_event_table;
mod m20230828_220838_create_donation_table;
mod m20250105_101500_create_member_table;
mod m20250105_102000_create_prashad_table;
mod m20250106_090000_create_gallery_table;
mod m20250106_093000_create_sequence_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20230822_184929_create_event_table::Migration),
            Box::new(m20230828_220838_create_donation_table::Migration),
            Box::new(m20250105_101500_create_member_table::Migration),
            Box::new(m20250105_102000_create_prashad_table::Migration),
            Box::new(m20250106_090000_create_gallery_table::Migration),
            Box::new(m20250106_093000_create_sequence_table::Migration),
        ]
    }
}
