//! `/customer` handlers

use crate::core::error::ShopResult;
use crate::core::extractors::{ShopPath, ValidatedJson};
use crate::core::model::{CategoryPurchase, Created, Customer, CustomerInput, Order};
use crate::core::service::{CustomerService, ReportService};
use crate::server::envelope::ApiResponse;
use crate::server::host::AppState;
use axum::extract::State;

pub async fn list_customers(
    State(state): State<AppState>,
) -> ShopResult<ApiResponse<Vec<Customer>>> {
    let customers = state.store.list_customers().await?;
    tracing::debug!(count = customers.len(), "listed customers");
    Ok(ApiResponse::success(customers, "Retrieved all customers."))
}

pub async fn get_customer(
    State(state): State<AppState>,
    ShopPath(id): ShopPath<i64>,
) -> ShopResult<ApiResponse<Customer>> {
    let customer = state.store.get_customer(id).await?;
    Ok(ApiResponse::success(
        customer,
        format!("Retrieved customer {}.", id),
    ))
}

pub async fn customer_orders(
    State(state): State<AppState>,
    ShopPath(id): ShopPath<i64>,
) -> ShopResult<ApiResponse<Vec<Order>>> {
    let orders = state.store.customer_orders(id).await?;
    Ok(ApiResponse::success(
        orders,
        format!("Retrieved orders of customer {}.", id),
    ))
}

/// Units each customer bought per category
pub async fn category_count(
    State(state): State<AppState>,
) -> ShopResult<ApiResponse<Vec<CategoryPurchase>>> {
    let rows = state.store.category_purchases().await?;
    tracing::debug!(rows = rows.len(), "computed category purchases");
    Ok(ApiResponse::success(
        rows,
        "Retrieved units purchased per customer and category.",
    ))
}

pub async fn insert_customer(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CustomerInput>,
) -> ShopResult<ApiResponse<Created>> {
    let id = state.store.create_customer(input).await?;
    tracing::info!(customer_id = id, "customer created");
    Ok(ApiResponse::success(Created { id }, "Inserted one customer."))
}

pub async fn update_customer(
    State(state): State<AppState>,
    ShopPath(id): ShopPath<i64>,
    ValidatedJson(input): ValidatedJson<CustomerInput>,
) -> ShopResult<ApiResponse<()>> {
    state.store.update_customer(id, input).await?;
    tracing::info!(customer_id = id, "customer updated");
    Ok(ApiResponse::ack(format!("Updated customer {}.", id)))
}

pub async fn delete_customer(
    State(state): State<AppState>,
    ShopPath(id): ShopPath<i64>,
) -> ShopResult<ApiResponse<()>> {
    state.store.delete_customer(id).await?;
    tracing::info!(customer_id = id, "customer deleted");
    Ok(ApiResponse::ack(format!("Deleted customer {}.", id)))
}
