//! Pivot op: load one file's records plus category metadata, then
//! hand off to the pure aggregation in [`crate::pivot`].

use sea_orm::{QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    ResultEngine, categories,
    pivot::{PivotedCashflow, compute},
    records, source_files,
};

use super::{Engine, with_tx};

impl Engine {
    /// Recompute the pivot for one source file.
    ///
    /// Always derived from the current record set; nothing is cached or
    /// persisted. Returns the file metadata alongside the grid.
    pub async fn pivot(
        &self,
        file_id: Uuid,
        username: &str,
    ) -> ResultEngine<(source_files::Model, PivotedCashflow)> {
        with_tx!(self, |db_tx| {
            let file = self.require_source_file(&db_tx, file_id, username).await?;
            let records = records::Entity::find()
                .filter(records::Column::SourceFileId.eq(file_id))
                .all(&db_tx)
                .await?;
            let categories = categories::Entity::find().all(&db_tx).await?;
            Ok((file, compute(&records, &categories)))
        })
    }
}
