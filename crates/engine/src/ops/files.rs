//! Source file upload and inspection ops.

use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, parse_errors, source_files};

use super::{Engine, with_tx};

impl Engine {
    /// Store an uploaded statement and return its id.
    pub async fn upload_source_file(
        &self,
        username: &str,
        filename: &str,
        content: &str,
    ) -> ResultEngine<Uuid> {
        let filename = filename.trim();
        if filename.is_empty() {
            return Err(EngineError::InvalidInput(
                "filename must not be empty".to_string(),
            ));
        }
        if content.trim().is_empty() {
            return Err(EngineError::InvalidInput(
                "file content must not be empty".to_string(),
            ));
        }

        let id = Uuid::new_v4();
        let active = source_files::ActiveModel {
            id: ActiveValue::Set(id),
            username: ActiveValue::Set(username.to_string()),
            filename: ActiveValue::Set(filename.to_string()),
            content: ActiveValue::Set(content.to_string()),
            uploaded_at: ActiveValue::Set(Utc::now()),
            processed_at: ActiveValue::Set(None),
        };

        with_tx!(self, |db_tx| {
            active.insert(&db_tx).await?;
            Ok(id)
        })
    }

    /// List the caller's uploaded files, newest first.
    pub async fn list_source_files(
        &self,
        username: &str,
    ) -> ResultEngine<Vec<source_files::Model>> {
        with_tx!(self, |db_tx| {
            let files = source_files::Entity::find()
                .filter(source_files::Column::Username.eq(username))
                .order_by_desc(source_files::Column::UploadedAt)
                .all(&db_tx)
                .await?;
            Ok(files)
        })
    }

    /// The per-cell parse error log written by the ingest pass.
    pub async fn parse_errors(
        &self,
        file_id: Uuid,
        username: &str,
    ) -> ResultEngine<Vec<parse_errors::Model>> {
        with_tx!(self, |db_tx| {
            self.require_source_file(&db_tx, file_id, username).await?;
            let errors = parse_errors::Entity::find()
                .filter(parse_errors::Column::SourceFileId.eq(file_id))
                .order_by_asc(parse_errors::Column::Row)
                .all(&db_tx)
                .await?;
            Ok(errors)
        })
    }
}
