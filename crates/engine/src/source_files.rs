//! Uploaded statement files.
//!
//! The raw CSV text is stored alongside the metadata; `processed_at`
//! doubles as the idempotency marker that blocks re-ingest.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "source_files")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub username: String,
    pub filename: String,
    pub content: String,
    pub uploaded_at: DateTimeUtc,
    pub processed_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::records::Entity")]
    Records,
    #[sea_orm(has_many = "super::parse_errors::Entity")]
    ParseErrors,
}

impl Related<super::records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Records.def()
    }
}

impl Related<super::parse_errors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ParseErrors.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
