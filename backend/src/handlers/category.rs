//! HTTP handlers for product categories

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use shared::{Category, CategoryFilter, CreateCategoryInput, MessageResponse, UpdateCategoryInput};
use uuid::Uuid;

use crate::error::AppResult;
use crate::extract::{JsonBody, PathParam, QueryParams};
use crate::services::CategoryService;
use crate::AppState;

/// Create a category
pub async fn create_category(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateCategoryInput>,
) -> AppResult<(StatusCode, Json<Category>)> {
    let service = CategoryService::new(state.db);
    let category = service.create_category(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// List categories, optionally filtered by `isMain`
pub async fn list_categories(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<CategoryFilter>,
) -> AppResult<Json<Vec<Category>>> {
    let service = CategoryService::new(state.db);
    let categories = service.list_categories(filter).await?;
    Ok(Json(categories))
}

/// Get a category
pub async fn get_category(
    State(state): State<AppState>,
    PathParam(category_id): PathParam<Uuid>,
) -> AppResult<Json<Category>> {
    let service = CategoryService::new(state.db);
    let category = service.get_category(category_id).await?;
    Ok(Json(category))
}

/// Update a category
pub async fn update_category(
    State(state): State<AppState>,
    PathParam(category_id): PathParam<Uuid>,
    JsonBody(input): JsonBody<UpdateCategoryInput>,
) -> AppResult<Json<Category>> {
    let service = CategoryService::new(state.db);
    let category = service.update_category(category_id, input).await?;
    Ok(Json(category))
}

/// Delete a category
pub async fn delete_category(
    State(state): State<AppState>,
    PathParam(category_id): PathParam<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    let service = CategoryService::new(state.db);
    let message = service.delete_category(category_id).await?;
    Ok(Json(message))
}
