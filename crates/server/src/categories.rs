//! Categories API endpoints.

use api_types::category::{CategoryKind, CategoryListResponse, CategoryView};
use axum::{Extension, Json, extract::State};

use crate::{ServerError, server::ServerState, user};

fn map_category(category: engine::categories::Model) -> CategoryView {
    let kind = match category.kind.as_str() {
        "income" => CategoryKind::Income,
        "debt" => CategoryKind::Debt,
        _ => CategoryKind::Expense,
    };
    CategoryView {
        id: category.id,
        name: category.name,
        kind,
        is_system: category.is_system,
    }
}

pub async fn list(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<CategoryListResponse>, ServerError> {
    let categories = state
        .engine
        .list_categories()
        .await?
        .into_iter()
        .map(map_category)
        .collect();

    Ok(Json(CategoryListResponse { categories }))
}
