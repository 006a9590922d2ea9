//! `/category` handlers

use crate::core::error::ShopResult;
use crate::core::extractors::{ShopPath, ValidatedJson};
use crate::core::model::{Category, CategoryInput, Created, Product};
use crate::core::service::CategoryService;
use crate::server::envelope::ApiResponse;
use crate::server::host::AppState;
use axum::extract::State;

pub async fn list_categories(
    State(state): State<AppState>,
) -> ShopResult<ApiResponse<Vec<Category>>> {
    let categories = state.store.list_categories().await?;
    Ok(ApiResponse::success(categories, "Retrieved all categories."))
}

pub async fn get_category(
    State(state): State<AppState>,
    ShopPath(id): ShopPath<i64>,
) -> ShopResult<ApiResponse<Category>> {
    let category = state.store.get_category(id).await?;
    Ok(ApiResponse::success(
        category,
        format!("Retrieved category {}.", id),
    ))
}

pub async fn category_products(
    State(state): State<AppState>,
    ShopPath(id): ShopPath<i64>,
) -> ShopResult<ApiResponse<Vec<Product>>> {
    let products = state.store.category_products(id).await?;
    tracing::debug!(category_id = id, count = products.len(), "listed category products");
    Ok(ApiResponse::success(
        products,
        format!("Retrieved products of category {}.", id),
    ))
}

pub async fn insert_category(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CategoryInput>,
) -> ShopResult<ApiResponse<Created>> {
    let id = state.store.create_category(input).await?;
    tracing::info!(category_id = id, "category created");
    Ok(ApiResponse::success(Created { id }, "Inserted one category."))
}

pub async fn update_category(
    State(state): State<AppState>,
    ShopPath(id): ShopPath<i64>,
    ValidatedJson(input): ValidatedJson<CategoryInput>,
) -> ShopResult<ApiResponse<()>> {
    state.store.update_category(id, input).await?;
    tracing::info!(category_id = id, "category updated");
    Ok(ApiResponse::ack(format!("Updated category {}.", id)))
}

pub async fn delete_category(
    State(state): State<AppState>,
    ShopPath(id): ShopPath<i64>,
) -> ShopResult<ApiResponse<()>> {
    state.store.delete_category(id).await?;
    tracing::info!(category_id = id, "category deleted");
    Ok(ApiResponse::ack(format!("Deleted category {}.", id)))
}
