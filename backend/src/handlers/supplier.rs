//! HTTP handlers for the supplier directory

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use shared::{CreateSupplierInput, PageQuery, Supplier, UpdateSupplierInput};
use uuid::Uuid;

use crate::error::AppResult;
use crate::extract::{JsonBody, PathParam, QueryParams};
use crate::services::SupplierService;
use crate::AppState;

/// Create a supplier
pub async fn create_supplier(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateSupplierInput>,
) -> AppResult<(StatusCode, Json<Supplier>)> {
    let service = SupplierService::new(state.db);
    let supplier = service.create_supplier(input).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

/// List suppliers
pub async fn list_suppliers(
    State(state): State<AppState>,
    QueryParams(page): QueryParams<PageQuery>,
) -> AppResult<Json<Vec<Supplier>>> {
    let service = SupplierService::new(state.db);
    let suppliers = service.list_suppliers(page).await?;
    Ok(Json(suppliers))
}

/// Get a supplier
pub async fn get_supplier(
    State(state): State<AppState>,
    PathParam(supplier_id): PathParam<Uuid>,
) -> AppResult<Json<Supplier>> {
    let service = SupplierService::new(state.db);
    let supplier = service.get_supplier(supplier_id).await?;
    Ok(Json(supplier))
}

/// Update a supplier
pub async fn update_supplier(
    State(state): State<AppState>,
    PathParam(supplier_id): PathParam<Uuid>,
    JsonBody(input): JsonBody<UpdateSupplierInput>,
) -> AppResult<Json<Supplier>> {
    let service = SupplierService::new(state.db);
    let supplier = service.update_supplier(supplier_id, input).await?;
    Ok(Json(supplier))
}

/// Delete a supplier
pub async fn delete_supplier(
    State(state): State<AppState>,
    PathParam(supplier_id): PathParam<Uuid>,
) -> AppResult<StatusCode> {
    let service = SupplierService::new(state.db);
    service.delete_supplier(supplier_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
