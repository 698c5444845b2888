//! Category service

use chrono::{DateTime, Utc};
use shared::{validate_name, Category, CategoryFilter, CreateCategoryInput, MessageResponse, UpdateCategoryInput};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct CategoryService {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    is_main: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            description: row.description,
            is_main: row.is_main,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn category_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Category with id '{}' not found", id))
}

impl CategoryService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create_category(&self, input: CreateCategoryInput) -> AppResult<Category> {
        validate_name(&input.name).map_err(|m| AppError::validation("name", m))?;

        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            INSERT INTO categories (name, description, is_main)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, is_main, created_at, updated_at
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.is_main)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// List categories, optionally only main or only secondary ones
    pub async fn list_categories(&self, filter: CategoryFilter) -> AppResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, name, description, is_main, created_at, updated_at
            FROM categories
            WHERE ($1::boolean IS NULL OR is_main = $1)
            ORDER BY name ASC
            "#,
        )
        .bind(filter.is_main)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    pub async fn get_category(&self, id: Uuid) -> AppResult<Category> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, description, is_main, created_at, updated_at FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| category_not_found(id))?;

        Ok(row.into())
    }

    pub async fn update_category(&self, id: Uuid, input: UpdateCategoryInput) -> AppResult<Category> {
        if let Some(name) = &input.name {
            validate_name(name).map_err(|m| AppError::validation("name", m))?;
        }

        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            UPDATE categories
            SET name = COALESCE($1, name),
                description = COALESCE($2, description),
                is_main = COALESCE($3, is_main),
                updated_at = NOW()
            WHERE id = $4
            RETURNING id, name, description, is_main, created_at, updated_at
            "#,
        )
        .bind(input.name.as_deref().map(str::trim))
        .bind(&input.description)
        .bind(input.is_main)
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| category_not_found(id))?;

        Ok(row.into())
    }

    /// Delete a category; products referencing it lose the reference
    pub async fn delete_category(&self, id: Uuid) -> AppResult<MessageResponse> {
        let name = sqlx::query_scalar::<_, String>("DELETE FROM categories WHERE id = $1 RETURNING name")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| category_not_found(id))?;

        tracing::info!("Deleted category {}", id);
        Ok(MessageResponse {
            message: format!("Category '{}' deleted", name),
        })
    }
}
