//! Pivot API endpoint.

use api_types::category::CategoryKind;
use api_types::pivot::{PivotResponse, RecordView, SummaryView};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn map_kind(kind: engine::CategoryKind) -> CategoryKind {
    match kind {
        engine::CategoryKind::Income => CategoryKind::Income,
        engine::CategoryKind::Expense => CategoryKind::Expense,
        engine::CategoryKind::Debt => CategoryKind::Debt,
    }
}

/// Recompute and return the category x year pivot for one file.
pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(file_id): Path<Uuid>,
) -> Result<Json<PivotResponse>, ServerError> {
    let (file, pivot) = state.engine.pivot(file_id, &user.username).await?;

    // Kinds come from the metadata join; the display-name fallback only
    // fills names the join could not type.
    let mut category_kinds: BTreeMap<String, CategoryKind> = pivot
        .category_kinds
        .iter()
        .map(|(name, kind)| (name.clone(), map_kind(*kind)))
        .collect();
    for name in &pivot.category_names {
        if category_kinds.contains_key(name) {
            continue;
        }
        if let Some(kind) = engine::kind_from_display_name(name) {
            category_kinds.insert(name.clone(), map_kind(kind));
        }
    }

    Ok(Json(PivotResponse {
        file_id: file.id,
        filename: file.filename,
        processed_at: file.processed_at,
        by_category: pivot.by_category,
        by_year: pivot.by_year,
        years: pivot.years,
        category_names: pivot.category_names,
        category_kinds,
        row_totals: pivot.row_totals,
        column_totals: pivot.column_totals,
        grand_total: pivot.grand_total,
        summary: SummaryView {
            income_by_year: pivot.summary.income_by_year,
            expenses_by_year: pivot.summary.expenses_by_year,
            net_by_year: pivot.summary.net_by_year,
            total_income: pivot.summary.total_income,
            total_expenses: pivot.summary.total_expenses,
            total_net: pivot.summary.total_net,
        },
        records: pivot
            .records
            .into_iter()
            .map(|record| RecordView {
                id: record.id,
                category: record.category,
                year: record.year,
                amount: record.amount,
            })
            .collect(),
    }))
}
