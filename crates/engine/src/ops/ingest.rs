//! Persisted ingest pass: parse, resolve categories, batch insert.
//!
//! Category creation, the record batch, the error batch, and the
//! processed marker all live in one database transaction, so the caller
//! sees the pass succeed or fail as a unit and no created category is
//! left orphaned from its records.

use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    classify::normalize_category_key,
    ingest::{RowOutcome, parse_statement},
    parse_errors, records, source_files,
};

use super::{Engine, with_tx};

// Keeps one insert_many under SQLite's bind-parameter limit even for
// large statements.
const INSERT_CHUNK: usize = 100;

/// Counts reported back to the caller after one ingest pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct IngestOutcome {
    /// Normalized records written.
    pub rows_inserted: u64,
    /// Parse error records written (skipped rows and failed cells).
    pub rows_failed: u64,
}

impl Engine {
    /// Ingest an uploaded source file into normalized records.
    ///
    /// Fatal failures (`KeyNotFound`, `AlreadyProcessed`,
    /// `NoYearColumns`, database errors) leave no writes behind.
    /// Per-cell problems become [`parse_errors`] rows instead.
    pub async fn ingest(&self, file_id: Uuid, username: &str) -> ResultEngine<IngestOutcome> {
        with_tx!(self, |db_tx| {
            self.ingest_in_tx(&db_tx, file_id, username).await
        })
    }

    async fn ingest_in_tx(
        &self,
        db_tx: &DatabaseTransaction,
        file_id: Uuid,
        username: &str,
    ) -> ResultEngine<IngestOutcome> {
        let file = self.require_source_file(db_tx, file_id, username).await?;
        if file.processed_at.is_some() {
            return Err(EngineError::AlreadyProcessed(file.filename));
        }

        let statement = parse_statement(&file.content)?;

        // One bulk lookup for every distinct category name, in row order.
        let names: Vec<String> = statement
            .rows
            .iter()
            .filter_map(|outcome| match outcome {
                RowOutcome::Parsed(row) => Some(row.category.clone()),
                RowOutcome::MissingCategory { .. } => None,
            })
            .collect();
        let categories = self.resolve_categories(db_tx, &names).await?;

        let mut record_batch: Vec<records::ActiveModel> = Vec::new();
        let mut error_batch: Vec<parse_errors::ActiveModel> = Vec::new();

        for outcome in &statement.rows {
            match outcome {
                RowOutcome::MissingCategory { row, column } => {
                    error_batch.push(parse_errors::ActiveModel {
                        id: ActiveValue::Set(Uuid::new_v4()),
                        source_file_id: ActiveValue::Set(file_id),
                        username: ActiveValue::Set(username.to_string()),
                        row: ActiveValue::Set(*row as i32),
                        column: ActiveValue::Set(column.clone()),
                        kind: ActiveValue::Set(parse_errors::KIND_EMPTY_CELL.to_string()),
                        message: ActiveValue::Set("category name is empty".to_string()),
                        raw_value: ActiveValue::Set(String::new()),
                    });
                }
                RowOutcome::Parsed(row) => {
                    let norm = normalize_category_key(&row.category);
                    let category = categories.get(&norm).ok_or_else(|| {
                        EngineError::KeyNotFound(format!(
                            "category '{}' not exists",
                            row.category
                        ))
                    })?;

                    for (year, amount) in &row.values {
                        record_batch.push(records::ActiveModel {
                            id: ActiveValue::Set(Uuid::new_v4()),
                            username: ActiveValue::Set(username.to_string()),
                            entity_ref: ActiveValue::Set(None),
                            category_id: ActiveValue::Set(category.id),
                            year: ActiveValue::Set(*year),
                            amount: ActiveValue::Set(*amount),
                            source_file_id: ActiveValue::Set(file_id),
                            recurring: ActiveValue::Set(true),
                            notes: ActiveValue::Set(None),
                        });
                    }
                    for cell in &row.errors {
                        error_batch.push(parse_errors::ActiveModel {
                            id: ActiveValue::Set(Uuid::new_v4()),
                            source_file_id: ActiveValue::Set(file_id),
                            username: ActiveValue::Set(username.to_string()),
                            row: ActiveValue::Set(row.row as i32),
                            column: ActiveValue::Set(cell.column.clone()),
                            kind: ActiveValue::Set(
                                parse_errors::KIND_INVALID_NUMBER.to_string(),
                            ),
                            message: ActiveValue::Set(format!(
                                "'{}' is not a valid number",
                                cell.raw
                            )),
                            raw_value: ActiveValue::Set(cell.raw.clone()),
                        });
                    }
                }
            }
        }

        let rows_inserted = record_batch.len() as u64;
        let rows_failed = error_batch.len() as u64;

        for chunk in record_batch.chunks(INSERT_CHUNK) {
            records::Entity::insert_many(chunk.to_vec())
                .exec(db_tx)
                .await?;
        }
        for chunk in error_batch.chunks(INSERT_CHUNK) {
            parse_errors::Entity::insert_many(chunk.to_vec())
                .exec(db_tx)
                .await?;
        }

        let mut processed: source_files::ActiveModel = file.into();
        processed.processed_at = ActiveValue::Set(Some(Utc::now()));
        processed.update(db_tx).await?;

        tracing::info!(
            file = %file_id,
            rows_inserted,
            rows_failed,
            "ingest pass complete"
        );

        Ok(IngestOutcome {
            rows_inserted,
            rows_failed,
        })
    }

    /// Load a source file, hiding other users' files as not-found.
    pub(super) async fn require_source_file(
        &self,
        db_tx: &DatabaseTransaction,
        file_id: Uuid,
        username: &str,
    ) -> ResultEngine<source_files::Model> {
        source_files::Entity::find_by_id(file_id)
            .filter(source_files::Column::Username.eq(username))
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("source file not exists".to_string()))
    }
}
