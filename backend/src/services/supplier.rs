//! Supplier directory service

use chrono::{DateTime, Utc};
use shared::{
    resolve_list_limit, resolve_offset, validate_email, validate_supplier_name,
    CreateSupplierInput, PageQuery, Supplier, UpdateSupplierInput,
};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

const SUPPLIER_COLUMNS: &str =
    "id, name, description, nit, address, contact_number, email, created_at, updated_at";

/// Supplier directory service
#[derive(Clone)]
pub struct SupplierService {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct SupplierRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    nit: Option<String>,
    address: Option<String>,
    contact_number: Option<String>,
    email: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SupplierRow> for Supplier {
    fn from(row: SupplierRow) -> Self {
        Supplier {
            id: row.id,
            name: row.name,
            description: row.description,
            nit: row.nit,
            address: row.address,
            contact_number: row.contact_number,
            email: row.email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn supplier_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Supplier with id '{}' not found", id))
}

fn check_email(email: Option<&str>) -> AppResult<()> {
    if let Some(email) = email {
        validate_email(email).map_err(|m| AppError::validation("email", m))?;
    }
    Ok(())
}

impl SupplierService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Resolve a supplier on an open connection or transaction
    pub async fn find(conn: &mut PgConnection, id: Uuid) -> AppResult<Supplier> {
        let row = sqlx::query_as::<_, SupplierRow>(&format!(
            "SELECT {} FROM suppliers WHERE id = $1",
            SUPPLIER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| supplier_not_found(id))?;

        Ok(row.into())
    }

    pub async fn create_supplier(&self, input: CreateSupplierInput) -> AppResult<Supplier> {
        validate_supplier_name(&input.name).map_err(|m| AppError::validation("name", m))?;
        check_email(input.email.as_deref())?;

        let row = sqlx::query_as::<_, SupplierRow>(&format!(
            r#"
            INSERT INTO suppliers (name, description, nit, address, contact_number, email)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            SUPPLIER_COLUMNS
        ))
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(&input.nit)
        .bind(&input.address)
        .bind(&input.contact_number)
        .bind(&input.email)
        .fetch_one(&self.db)
        .await?;

        tracing::info!("Created supplier {}", row.id);
        Ok(row.into())
    }

    pub async fn list_suppliers(&self, page: PageQuery) -> AppResult<Vec<Supplier>> {
        let limit = resolve_list_limit(page.limit, shared::DEFAULT_LIST_LIMIT, shared::MAX_LIST_LIMIT)
            .map_err(|m| AppError::validation("limit", m))?;
        let offset = resolve_offset(page.offset).map_err(|m| AppError::validation("offset", m))?;

        let rows = sqlx::query_as::<_, SupplierRow>(&format!(
            "SELECT {} FROM suppliers ORDER BY name ASC LIMIT $1 OFFSET $2",
            SUPPLIER_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Supplier::from).collect())
    }

    pub async fn get_supplier(&self, id: Uuid) -> AppResult<Supplier> {
        let mut conn = self.db.acquire().await?;
        Self::find(&mut conn, id).await
    }

    pub async fn update_supplier(&self, id: Uuid, input: UpdateSupplierInput) -> AppResult<Supplier> {
        if let Some(name) = &input.name {
            validate_supplier_name(name).map_err(|m| AppError::validation("name", m))?;
        }
        check_email(input.email.as_deref())?;

        // COALESCE keeps the stored value for every field left out of the input
        let row = sqlx::query_as::<_, SupplierRow>(&format!(
            r#"
            UPDATE suppliers
            SET name = COALESCE($1, name),
                description = COALESCE($2, description),
                nit = COALESCE($3, nit),
                address = COALESCE($4, address),
                contact_number = COALESCE($5, contact_number),
                email = COALESCE($6, email),
                updated_at = NOW()
            WHERE id = $7
            RETURNING {}
            "#,
            SUPPLIER_COLUMNS
        ))
        .bind(input.name.as_deref().map(str::trim))
        .bind(&input.description)
        .bind(&input.nit)
        .bind(&input.address)
        .bind(&input.contact_number)
        .bind(&input.email)
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| supplier_not_found(id))?;

        Ok(row.into())
    }

    /// Delete a supplier. Movements that referenced it keep their rows with
    /// the supplier cleared.
    pub async fn delete_supplier(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(supplier_not_found(id));
        }

        tracing::info!("Deleted supplier {}", id);
        Ok(())
    }
}
