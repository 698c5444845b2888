//! Product catalog service
//!
//! Besides plain CRUD this exposes the two calls the inventory engine makes
//! inside its own transaction: [`ProductService::lock`] and
//! [`ProductService::save_pricing`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::{
    build_sku, new_sku_code, rename_sku, resolve_list_limit, resolve_offset,
    validate_min_stock, validate_money_scale, validate_name, validate_non_negative_price,
    CategoryRole,
    CreateProductInput, PageQuery, Product, UpdateProductInput,
};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::config::CatalogConfig;
use crate::error::{AppError, AppResult};

const PRODUCT_COLUMNS: &str = "id, name, sku, description, sale_price, current_purchase_price, \
     min_stock, is_active, main_category_id, secondary_category_id, created_at, updated_at";

/// Product catalog service
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
    catalog: CatalogConfig,
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    sku: String,
    description: Option<String>,
    sale_price: Decimal,
    current_purchase_price: Decimal,
    min_stock: i32,
    is_active: bool,
    main_category_id: Option<Uuid>,
    secondary_category_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            sku: row.sku,
            description: row.description,
            sale_price: row.sale_price,
            current_purchase_price: row.current_purchase_price,
            min_stock: row.min_stock,
            is_active: row.is_active,
            main_category_id: row.main_category_id,
            secondary_category_id: row.secondary_category_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn validate_list_price(price: Decimal) -> AppResult<()> {
    validate_non_negative_price(price)
        .and_then(|_| validate_money_scale(price))
        .map_err(|m| AppError::validation("salePrice", m))
}

pub(crate) fn product_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Product with id '{}' not found", id))
}

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool, catalog: CatalogConfig) -> Self {
        Self { db, catalog }
    }

    /// Lock a product row for the rest of the surrounding transaction
    pub async fn lock(conn: &mut PgConnection, id: Uuid) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = $1 FOR UPDATE",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| product_not_found(id))?;

        Ok(row.into())
    }

    /// Persist the fields the inventory engine owns: list price, current
    /// purchase price and the active flag
    pub async fn save_pricing(conn: &mut PgConnection, product: &Product) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE products
            SET sale_price = $1, current_purchase_price = $2, is_active = $3, updated_at = NOW()
            WHERE id = $4
            "#,
        )
        .bind(product.sale_price)
        .bind(product.current_purchase_price)
        .bind(product.is_active)
        .bind(product.id)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Create a product with a freshly generated SKU
    pub async fn create_product(&self, input: CreateProductInput) -> AppResult<Product> {
        validate_name(&input.name).map_err(|m| AppError::validation("name", m))?;
        validate_min_stock(input.min_stock).map_err(|m| AppError::validation("minStock", m))?;

        let sale_price = input.sale_price.unwrap_or(Decimal::ZERO);
        let purchase_price = input.current_purchase_price.unwrap_or(Decimal::ZERO);
        validate_list_price(sale_price)?;
        validate_non_negative_price(purchase_price)
            .map_err(|m| AppError::validation("currentPurchasePrice", m))?;

        let mut conn = self.db.acquire().await?;
        if let Some(id) = input.main_category_id {
            ensure_category_role(&mut conn, id, CategoryRole::Main).await?;
        }
        if let Some(id) = input.secondary_category_id {
            ensure_category_role(&mut conn, id, CategoryRole::Secondary).await?;
        }

        let name = input.name.trim().to_string();
        let sku = build_sku(&self.catalog.sku_prefix, &name, &new_sku_code());

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            INSERT INTO products (
                name, sku, description, sale_price, current_purchase_price, min_stock,
                is_active, main_category_id, secondary_category_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(&name)
        .bind(&sku)
        .bind(&input.description)
        .bind(sale_price)
        .bind(purchase_price)
        .bind(input.min_stock)
        .bind(input.is_active.unwrap_or(true))
        .bind(input.main_category_id)
        .bind(input.secondary_category_id)
        .fetch_one(&mut *conn)
        .await?;

        tracing::info!("Created product {} ({})", row.id, row.sku);
        Ok(row.into())
    }

    /// List products ordered by name
    pub async fn list_products(&self, page: PageQuery) -> AppResult<Vec<Product>> {
        let limit = resolve_list_limit(page.limit, shared::DEFAULT_LIST_LIMIT, shared::MAX_LIST_LIMIT)
            .map_err(|m| AppError::validation("limit", m))?;
        let offset = resolve_offset(page.offset).map_err(|m| AppError::validation("offset", m))?;

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products ORDER BY name ASC LIMIT $1 OFFSET $2",
            PRODUCT_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Get a product by id
    pub async fn get_product(&self, id: Uuid) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| product_not_found(id))?;

        Ok(row.into())
    }

    /// Partially update a product. A rename regenerates the initials segment
    /// of the SKU.
    pub async fn update_product(&self, id: Uuid, input: UpdateProductInput) -> AppResult<Product> {
        let mut tx = self.db.begin().await?;
        let mut product = Self::lock(&mut tx, id).await?;

        if let Some(name) = input.name {
            validate_name(&name).map_err(|m| AppError::validation("name", m))?;
            let name = name.trim().to_string();
            if let Some(sku) = rename_sku(&product.sku, &name) {
                product.sku = sku;
            }
            product.name = name;
        }
        if let Some(description) = input.description {
            product.description = Some(description);
        }
        if let Some(price) = input.sale_price {
            validate_list_price(price)?;
            product.sale_price = price;
        }
        if let Some(price) = input.current_purchase_price {
            validate_non_negative_price(price)
                .map_err(|m| AppError::validation("currentPurchasePrice", m))?;
            product.current_purchase_price = price;
        }
        if let Some(min_stock) = input.min_stock {
            validate_min_stock(min_stock).map_err(|m| AppError::validation("minStock", m))?;
            product.min_stock = min_stock;
        }
        if let Some(is_active) = input.is_active {
            product.is_active = is_active;
        }
        if let Some(main) = input.main_category_id {
            if let Some(category_id) = main {
                ensure_category_role(&mut tx, category_id, CategoryRole::Main).await?;
            }
            product.main_category_id = main;
        }
        if let Some(secondary) = input.secondary_category_id {
            if let Some(category_id) = secondary {
                ensure_category_role(&mut tx, category_id, CategoryRole::Secondary).await?;
            }
            product.secondary_category_id = secondary;
        }

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            UPDATE products
            SET name = $1, sku = $2, description = $3, sale_price = $4,
                current_purchase_price = $5, min_stock = $6, is_active = $7,
                main_category_id = $8, secondary_category_id = $9, updated_at = NOW()
            WHERE id = $10
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(&product.name)
        .bind(&product.sku)
        .bind(&product.description)
        .bind(product.sale_price)
        .bind(product.current_purchase_price)
        .bind(product.min_stock)
        .bind(product.is_active)
        .bind(product.main_category_id)
        .bind(product.secondary_category_id)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    /// Delete a product together with its inventory record and ledger
    pub async fn delete_product(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(product_not_found(id));
        }

        tracing::info!("Deleted product {}", id);
        Ok(())
    }
}

/// Check that a category exists and can fill `role` on a product
async fn ensure_category_role(
    conn: &mut PgConnection,
    category_id: Uuid,
    role: CategoryRole,
) -> AppResult<()> {
    let field = match role {
        CategoryRole::Main => "mainCategoryId",
        CategoryRole::Secondary => "secondaryCategoryId",
    };

    let is_main = sqlx::query_scalar::<_, bool>("SELECT is_main FROM categories WHERE id = $1")
        .bind(category_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| {
            AppError::validation(field, format!("Category with id '{}' not found", category_id))
        })?;

    if !role.accepts(is_main) {
        return Err(AppError::validation(
            field,
            format!("Category '{}' cannot be used as a {} category", category_id, role.as_str()),
        ));
    }

    Ok(())
}
