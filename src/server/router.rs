//! Route table
//!
//! Every resource lives under its own prefix with the same shape:
//! `GET /all`, `GET /{id}`, `POST /insert`, `POST /{id}/update` and
//! `POST /{id}/delete`, plus nested sub-resources.

use crate::server::handlers::{category, customer, order, product};
use crate::server::host::AppState;
use axum::{
    Json, Router,
    routing::{get, post},
};
use serde_json::{Value, json};

/// Build the full API router over the given state
pub fn build_routes(state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .nest("/customer", customer_routes())
        .nest("/category", category_routes())
        .nest("/product", product_routes())
        .nest("/order", order_routes())
        .with_state(state)
}

fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "shopfront"
    }))
}

fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/all", get(customer::list_customers))
        .route("/categoryCount", get(customer::category_count))
        .route("/insert", post(customer::insert_customer))
        .route("/{id}", get(customer::get_customer))
        .route("/{id}/order", get(customer::customer_orders))
        .route("/{id}/update", post(customer::update_customer))
        .route("/{id}/delete", post(customer::delete_customer))
}

fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/all", get(category::list_categories))
        .route("/insert", post(category::insert_category))
        .route("/{id}", get(category::get_category))
        .route("/{id}/products", get(category::category_products))
        .route("/{id}/update", post(category::update_category))
        .route("/{id}/delete", post(category::delete_category))
}

fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/all", get(product::list_products))
        .route("/insert", post(product::insert_product))
        .route("/{id}", get(product::get_product))
        .route("/{id}/categories", get(product::product_categories))
        .route("/{id}/update", post(product::update_product))
        .route("/{id}/delete", post(product::delete_product))
        .route("/{id}/category/insert", post(product::add_product_category))
        .route(
            "/{id}/category/{category_id}/delete",
            post(product::remove_product_category),
        )
}

fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/all", get(order::list_orders))
        .route("/average", get(order::sales_average))
        .route("/insert", post(order::insert_order))
        .route("/{id}", get(order::get_order))
        .route("/{id}/products", get(order::order_products))
        .route("/{id}/update", post(order::update_order))
        .route("/{id}/delete", post(order::delete_order))
        .route("/{id}/product/insert", post(order::add_order_product))
        .route(
            "/{id}/product/{product_id}/update",
            post(order::update_order_product),
        )
        .route(
            "/{id}/product/{product_id}/delete",
            post(order::remove_order_product),
        )
}
