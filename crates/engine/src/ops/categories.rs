//! Category lookup and idempotent get-or-create.
//!
//! Ingest resolves all distinct first-column names with one bulk query
//! instead of one round trip per row. Creation relies on the unique
//! index over `name_norm`: insert-on-conflict-do-nothing, then reselect,
//! so two ingests racing on the same new name converge on one row.

use std::collections::HashMap;

use sea_orm::{
    ActiveValue, DatabaseTransaction, DbErr, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*, sea_query::OnConflict,
};
use uuid::Uuid;

use crate::{
    ResultEngine, categories,
    classify::{classify_new_category, normalize_category_key},
};

use super::{Engine, with_tx};

impl Engine {
    /// List every category, ordered by display name.
    pub async fn list_categories(&self) -> ResultEngine<Vec<categories::Model>> {
        with_tx!(self, |db_tx| {
            let models = categories::Entity::find()
                .order_by_asc(categories::Column::Name)
                .all(&db_tx)
                .await?;
            Ok(models)
        })
    }

    /// Resolve a batch of category names, creating the missing ones.
    ///
    /// `names` must preserve row order: when several raw spellings
    /// normalize to the same key, the first occurrence supplies the
    /// display name and the kind guess. Existing categories win over
    /// the guess; their kind is never touched.
    pub(super) async fn resolve_categories(
        &self,
        db_tx: &DatabaseTransaction,
        names: &[String],
    ) -> ResultEngine<HashMap<String, categories::Model>> {
        let mut order: Vec<String> = Vec::new();
        let mut display_by_norm: HashMap<String, &str> = HashMap::new();
        for name in names {
            let norm = normalize_category_key(name);
            if !display_by_norm.contains_key(&norm) {
                display_by_norm.insert(norm.clone(), name.as_str());
                order.push(norm);
            }
        }

        let mut resolved: HashMap<String, categories::Model> = categories::Entity::find()
            .filter(categories::Column::NameNorm.is_in(order.clone()))
            .all(db_tx)
            .await?
            .into_iter()
            .map(|model| (model.name_norm.clone(), model))
            .collect();

        for norm in order {
            if resolved.contains_key(&norm) {
                continue;
            }
            let display = display_by_norm[&norm];
            let model = Self::get_or_create_category(db_tx, display, &norm).await?;
            resolved.insert(norm, model);
        }

        Ok(resolved)
    }

    async fn get_or_create_category(
        db_tx: &DatabaseTransaction,
        display: &str,
        norm: &str,
    ) -> ResultEngine<categories::Model> {
        let kind = classify_new_category(display);
        let active = categories::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            name: ActiveValue::Set(display.to_string()),
            name_norm: ActiveValue::Set(norm.to_string()),
            kind: ActiveValue::Set(kind.as_str().to_string()),
            is_system: ActiveValue::Set(false),
        };

        let insert = categories::Entity::insert(active).on_conflict(
            OnConflict::column(categories::Column::NameNorm)
                .do_nothing()
                .to_owned(),
        );
        match insert.exec(db_tx).await {
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(err) => return Err(err.into()),
        }

        // Reselect: either our row or the one a concurrent ingest won with.
        categories::Entity::find()
            .filter(categories::Column::NameNorm.eq(norm))
            .one(db_tx)
            .await?
            .ok_or_else(|| {
                crate::EngineError::KeyNotFound(format!("category '{display}' not exists"))
            })
    }
}
