//! Normalized cash-flow records.
//!
//! One row per successfully parsed (category, year, amount) cell.
//! (category, year) pairs are deliberately not unique: repeated ingests
//! or split source rows are summed by the pivot, never overwritten.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cashflow_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub username: String,
    pub entity_ref: Option<String>,
    pub category_id: Uuid,
    pub year: i32,
    pub amount: f64,
    pub source_file_id: Uuid,
    /// Always `true` from the CSV ingest path; reserved for a future
    /// non-recurring distinction, unused in aggregation.
    pub recurring: bool,
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::source_files::Entity",
        from = "Column::SourceFileId",
        to = "super::source_files::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    SourceFile,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::source_files::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SourceFile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
