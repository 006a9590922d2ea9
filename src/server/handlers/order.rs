//! `/order` handlers: order headers, their line items and the sales average

use crate::core::error::ShopResult;
use crate::core::extractors::{ShopPath, ShopQuery, ValidatedJson};
use crate::core::model::{
    AddProduct, Created, LineItem, NewOrder, Order, OrderDetail, OrderUpdate, QuantityUpdate,
};
use crate::core::sales::{AverageQuery, SalesAverage};
use crate::core::service::{OrderService, ReportService};
use crate::server::envelope::ApiResponse;
use crate::server::host::AppState;
use axum::extract::State;

pub async fn list_orders(State(state): State<AppState>) -> ShopResult<ApiResponse<Vec<Order>>> {
    let orders = state.store.list_orders().await?;
    Ok(ApiResponse::success(orders, "Retrieved all orders."))
}

pub async fn get_order(
    State(state): State<AppState>,
    ShopPath(id): ShopPath<i64>,
) -> ShopResult<ApiResponse<OrderDetail>> {
    let order = state.store.get_order(id).await?;
    Ok(ApiResponse::success(order, format!("Retrieved order {}.", id)))
}

pub async fn order_products(
    State(state): State<AppState>,
    ShopPath(id): ShopPath<i64>,
) -> ShopResult<ApiResponse<Vec<LineItem>>> {
    let lines = state.store.order_line_items(id).await?;
    Ok(ApiResponse::success(
        lines,
        format!("Retrieved products of order {}.", id),
    ))
}

/// Average units sold per day, week or month over `[start, end]`
pub async fn sales_average(
    State(state): State<AppState>,
    ShopQuery(query): ShopQuery<AverageQuery>,
) -> ShopResult<ApiResponse<SalesAverage>> {
    let window = query.into_window()?;
    let total = state.store.units_sold(window.start(), window.end()).await?;
    let report = window.report(total);
    tracing::debug!(
        total_units = total,
        days = report.days,
        unit = %window.unit(),
        "computed sales average"
    );
    Ok(ApiResponse::success(
        report,
        format!("Computed average units sold per {}.", window.unit()),
    ))
}

pub async fn insert_order(
    State(state): State<AppState>,
    ValidatedJson(order): ValidatedJson<NewOrder>,
) -> ShopResult<ApiResponse<Created>> {
    let customer_id = order.customer_id;
    let lines = order.products.len();
    let id = state.store.create_order(order).await?;
    tracing::info!(order_id = id, customer_id, lines, "order created");
    Ok(ApiResponse::success(Created { id }, "Inserted one order."))
}

pub async fn update_order(
    State(state): State<AppState>,
    ShopPath(id): ShopPath<i64>,
    ValidatedJson(update): ValidatedJson<OrderUpdate>,
) -> ShopResult<ApiResponse<()>> {
    state.store.update_order(id, update).await?;
    tracing::info!(order_id = id, "order updated");
    Ok(ApiResponse::ack(format!(
        "Updated status and place date of order {}.",
        id
    )))
}

pub async fn delete_order(
    State(state): State<AppState>,
    ShopPath(id): ShopPath<i64>,
) -> ShopResult<ApiResponse<()>> {
    state.store.delete_order(id).await?;
    tracing::info!(order_id = id, "order deleted");
    Ok(ApiResponse::ack(format!("Deleted order {}.", id)))
}

pub async fn add_order_product(
    State(state): State<AppState>,
    ShopPath(id): ShopPath<i64>,
    ValidatedJson(add): ValidatedJson<AddProduct>,
) -> ShopResult<ApiResponse<LineItem>> {
    let product_id = add.product;
    let mode = state.line_item_mode();
    let quantity = state.store.add_order_product(id, add, mode).await?;
    tracing::info!(
        order_id = id,
        product_id,
        quantity,
        mode = ?mode,
        "product added to order"
    );
    Ok(ApiResponse::success(
        LineItem {
            product_id,
            quantity,
        },
        format!("Added product {} to order {}.", product_id, id),
    ))
}

pub async fn update_order_product(
    State(state): State<AppState>,
    ShopPath((id, product_id)): ShopPath<(i64, i64)>,
    ValidatedJson(update): ValidatedJson<QuantityUpdate>,
) -> ShopResult<ApiResponse<()>> {
    state
        .store
        .update_order_product(id, product_id, update.quantity)
        .await?;
    tracing::info!(
        order_id = id,
        product_id,
        quantity = update.quantity,
        "order line updated"
    );
    Ok(ApiResponse::ack(format!(
        "Updated quantity of product {} in order {}.",
        product_id, id
    )))
}

pub async fn remove_order_product(
    State(state): State<AppState>,
    ShopPath((id, product_id)): ShopPath<(i64, i64)>,
) -> ShopResult<ApiResponse<()>> {
    state.store.remove_order_product(id, product_id).await?;
    tracing::info!(order_id = id, product_id, "product removed from order");
    Ok(ApiResponse::ack(format!(
        "Removed product {} from order {}.",
        product_id, id
    )))
}
