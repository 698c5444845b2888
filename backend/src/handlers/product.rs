//! HTTP handlers for the product catalog

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use shared::{CreateProductInput, PageQuery, Product, UpdateProductInput};
use uuid::Uuid;

use crate::error::AppResult;
use crate::extract::{JsonBody, PathParam, QueryParams};
use crate::services::ProductService;
use crate::AppState;

fn product_service(state: &AppState) -> ProductService {
    ProductService::new(state.db.clone(), state.config.catalog.clone())
}

/// Create a product
pub async fn create_product(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateProductInput>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let product = product_service(&state).create_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// List products
pub async fn list_products(
    State(state): State<AppState>,
    QueryParams(page): QueryParams<PageQuery>,
) -> AppResult<Json<Vec<Product>>> {
    let products = product_service(&state).list_products(page).await?;
    Ok(Json(products))
}

/// Get a product
pub async fn get_product(
    State(state): State<AppState>,
    PathParam(product_id): PathParam<Uuid>,
) -> AppResult<Json<Product>> {
    let product = product_service(&state).get_product(product_id).await?;
    Ok(Json(product))
}

/// Update a product
pub async fn update_product(
    State(state): State<AppState>,
    PathParam(product_id): PathParam<Uuid>,
    JsonBody(input): JsonBody<UpdateProductInput>,
) -> AppResult<Json<Product>> {
    let product = product_service(&state)
        .update_product(product_id, input)
        .await?;
    Ok(Json(product))
}

/// Delete a product
pub async fn delete_product(
    State(state): State<AppState>,
    PathParam(product_id): PathParam<Uuid>,
) -> AppResult<StatusCode> {
    product_service(&state).delete_product(product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
