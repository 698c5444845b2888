//! Route definitions for the inventory ledger API

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/inventory", inventory_routes())
        .nest("/products", product_routes())
        .nest("/suppliers", supplier_routes())
        .nest("/categories", category_routes())
}

/// Inventory ledger routes
fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_inventory_records))
        // Movements
        .route("/movement/in", post(handlers::post_in_movement))
        .route("/movement/out", post(handlers::post_out_movement))
        .route("/movement/out/:movement_id", patch(handlers::update_out_movement))
        .route(
            "/movement/:movement_id",
            get(handlers::get_movement).delete(handlers::undo_movement),
        )
        .route("/movements", get(handlers::list_movements))
        // Reports
        .route("/profit-report", get(handlers::get_profit_report))
        // Records
        .route(
            "/:record_id",
            get(handlers::get_inventory_record).delete(handlers::delete_inventory_record),
        )
}

/// Product catalog routes
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products).post(handlers::create_product))
        .route(
            "/:product_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
}

/// Supplier directory routes
fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_suppliers).post(handlers::create_supplier))
        .route(
            "/:supplier_id",
            get(handlers::get_supplier)
                .put(handlers::update_supplier)
                .delete(handlers::delete_supplier),
        )
}

/// Category routes
fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_categories).post(handlers::create_category))
        .route(
            "/:category_id",
            get(handlers::get_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category),
        )
}
