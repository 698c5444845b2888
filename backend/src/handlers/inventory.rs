//! HTTP handlers for inventory ledger endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use shared::{
    InMovementInput, InventoryRecordView, MovementPage, MovementPosted, MovementQuery,
    MovementUndone, MovementView, OutMovementInput, UpdateOutMovementInput,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::extract::{JsonBody, PathParam, QueryParams};
use crate::services::InventoryService;
use crate::AppState;

fn inventory_service(state: &AppState) -> InventoryService {
    InventoryService::new(state.db.clone(), state.config.inventory.clone())
}

/// Post an IN movement
pub async fn post_in_movement(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<InMovementInput>,
) -> AppResult<(StatusCode, Json<MovementPosted>)> {
    let posted = inventory_service(&state).post_in_movement(input).await?;
    Ok((StatusCode::CREATED, Json(posted)))
}

/// Post an OUT movement
pub async fn post_out_movement(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<OutMovementInput>,
) -> AppResult<(StatusCode, Json<MovementPosted>)> {
    let posted = inventory_service(&state).post_out_movement(input).await?;
    Ok((StatusCode::CREATED, Json(posted)))
}

/// Update the purchase order status of an OUT movement
pub async fn update_out_movement(
    State(state): State<AppState>,
    PathParam(movement_id): PathParam<Uuid>,
    JsonBody(input): JsonBody<UpdateOutMovementInput>,
) -> AppResult<Json<MovementView>> {
    let movement = inventory_service(&state)
        .update_out_movement_status(movement_id, input)
        .await?;
    Ok(Json(movement))
}

/// Get one movement
pub async fn get_movement(
    State(state): State<AppState>,
    PathParam(movement_id): PathParam<Uuid>,
) -> AppResult<Json<MovementView>> {
    let movement = inventory_service(&state).get_movement(movement_id).await?;
    Ok(Json(movement))
}

/// Undo a movement
pub async fn undo_movement(
    State(state): State<AppState>,
    PathParam(movement_id): PathParam<Uuid>,
) -> AppResult<Json<MovementUndone>> {
    let undone = inventory_service(&state).undo_movement(movement_id).await?;
    Ok(Json(undone))
}

/// List a product's movements
pub async fn list_movements(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<MovementQuery>,
) -> AppResult<Json<MovementPage>> {
    let page = inventory_service(&state).list_movements(query).await?;
    Ok(Json(page))
}

/// List inventory records
pub async fn list_inventory_records(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<InventoryRecordView>>> {
    let records = inventory_service(&state).list_inventory_records().await?;
    Ok(Json(records))
}

/// Get one inventory record
pub async fn get_inventory_record(
    State(state): State<AppState>,
    PathParam(record_id): PathParam<Uuid>,
) -> AppResult<Json<InventoryRecordView>> {
    let record = inventory_service(&state).get_inventory_record(record_id).await?;
    Ok(Json(record))
}

/// Delete an inventory record
pub async fn delete_inventory_record(
    State(state): State<AppState>,
    PathParam(record_id): PathParam<Uuid>,
) -> AppResult<StatusCode> {
    inventory_service(&state)
        .delete_inventory_record(record_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
