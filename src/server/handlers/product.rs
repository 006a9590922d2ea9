//! `/product` handlers, including the product-category links

use crate::core::error::ShopResult;
use crate::core::extractors::{ShopPath, ValidatedJson};
use crate::core::model::{Category, CategoryAssignment, Created, Product, ProductInput};
use crate::core::service::ProductService;
use crate::server::envelope::ApiResponse;
use crate::server::host::AppState;
use axum::extract::State;

pub async fn list_products(
    State(state): State<AppState>,
) -> ShopResult<ApiResponse<Vec<Product>>> {
    let products = state.store.list_products().await?;
    Ok(ApiResponse::success(products, "Retrieved all products."))
}

pub async fn get_product(
    State(state): State<AppState>,
    ShopPath(id): ShopPath<i64>,
) -> ShopResult<ApiResponse<Product>> {
    let product = state.store.get_product(id).await?;
    Ok(ApiResponse::success(
        product,
        format!("Retrieved product {}.", id),
    ))
}

pub async fn product_categories(
    State(state): State<AppState>,
    ShopPath(id): ShopPath<i64>,
) -> ShopResult<ApiResponse<Vec<Category>>> {
    let categories = state.store.product_categories(id).await?;
    Ok(ApiResponse::success(
        categories,
        format!("Retrieved categories of product {}.", id),
    ))
}

pub async fn insert_product(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<ProductInput>,
) -> ShopResult<ApiResponse<Created>> {
    let id = state.store.create_product(input).await?;
    tracing::info!(product_id = id, "product created");
    Ok(ApiResponse::success(Created { id }, "Inserted one product."))
}

pub async fn update_product(
    State(state): State<AppState>,
    ShopPath(id): ShopPath<i64>,
    ValidatedJson(input): ValidatedJson<ProductInput>,
) -> ShopResult<ApiResponse<()>> {
    state.store.update_product(id, input).await?;
    tracing::info!(product_id = id, "product updated");
    Ok(ApiResponse::ack(format!(
        "Updated name and quantity of product {}.",
        id
    )))
}

pub async fn delete_product(
    State(state): State<AppState>,
    ShopPath(id): ShopPath<i64>,
) -> ShopResult<ApiResponse<()>> {
    state.store.delete_product(id).await?;
    tracing::info!(product_id = id, "product deleted");
    Ok(ApiResponse::ack(format!("Deleted product {}.", id)))
}

pub async fn add_product_category(
    State(state): State<AppState>,
    ShopPath(id): ShopPath<i64>,
    ValidatedJson(assignment): ValidatedJson<CategoryAssignment>,
) -> ShopResult<ApiResponse<()>> {
    state
        .store
        .add_product_category(id, assignment.category)
        .await?;
    tracing::info!(
        product_id = id,
        category_id = assignment.category,
        "product linked to category"
    );
    Ok(ApiResponse::ack(format!(
        "Added category {} to product {}.",
        assignment.category, id
    )))
}

pub async fn remove_product_category(
    State(state): State<AppState>,
    ShopPath((id, category_id)): ShopPath<(i64, i64)>,
) -> ShopResult<ApiResponse<()>> {
    state.store.remove_product_category(id, category_id).await?;
    tracing::info!(product_id = id, category_id, "product unlinked from category");
    Ok(ApiResponse::ack(format!(
        "Removed category {} from product {}.",
        category_id, id
    )))
}
