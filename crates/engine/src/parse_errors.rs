//! Per-cell parse error log.
//!
//! Exactly one row per (row, column) cell that failed conversion during
//! one ingest pass. Rows here are data, not pipeline failures.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

/// Error kind strings stored in `kind`.
pub const KIND_EMPTY_CELL: &str = "empty_cell";
pub const KIND_INVALID_NUMBER: &str = "invalid_number";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "parse_errors")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub source_file_id: Uuid,
    pub username: String,
    /// 1-based data row number, header excluded.
    pub row: i32,
    /// Header text of the offending column.
    pub column: String,
    /// `empty_cell` or `invalid_number`.
    pub kind: String,
    pub message: String,
    pub raw_value: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::source_files::Entity",
        from = "Column::SourceFileId",
        to = "super::source_files::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    SourceFile,
}

impl Related<super::source_files::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SourceFile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
