//! Inventory accounting engine
//!
//! Posts IN and OUT movements against a product's inventory record, keeps the
//! weighted-average cost and sale price current, and reverses movements on
//! undo. Every mutation runs in one transaction that locks, in this order, the
//! product row, the inventory record and (undo only) the movement row.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::{
    discounted_price, resolve_list_limit, resolve_offset, sale_price_from_margin,
    validate_discount, validate_money_scale, validate_positive_price, validate_price_ceiling,
    validate_profit_margin, validate_quantity,
    AccountingError, DateWindow, InMovementInput, InventoryRecordView, MovementPage,
    MovementPosted, MovementQuery, MovementType, MovementUndone, MovementView, OutMovementInput,
    ProductRef, PurchaseOrderStatus, ReversalOutcome, StockPosition, SupplierRef,
    UpdateOutMovementInput,
};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::config::InventoryConfig;
use crate::error::{AppError, AppResult};
use crate::services::{ProductService, SupplierService};

const RECORD_VIEW_SELECT: &str = r#"
    SELECT i.id, i.stock, i.average_cost, i.average_sale_price, i.updated_at,
           p.id AS product_id, p.name AS product_name, p.sku AS product_sku,
           p.sale_price AS product_sale_price
    FROM inventory i
    JOIN products p ON p.id = i.product_id
"#;

const MOVEMENT_VIEW_SELECT: &str = r#"
    SELECT m.id, m.movement_type, m.quantity, m.purchase_price, m.sale_price,
           m.purchase_order_status, m.created_at,
           p.id AS product_id, p.name AS product_name, p.sku AS product_sku,
           p.sale_price AS product_sale_price,
           s.id AS supplier_id, s.name AS supplier_name
    FROM inventory_movements m
    JOIN products p ON p.id = m.product_id
    LEFT JOIN suppliers s ON s.id = m.supplier_id
"#;

/// Shared filter for ledger listings and their count
const MOVEMENT_FILTER: &str = r#"
    WHERE m.product_id = $1
      AND ($2::text IS NULL OR m.movement_type = $2)
      AND ($3::timestamptz IS NULL OR m.created_at >= $3)
      AND ($4::timestamptz IS NULL OR m.created_at <= $4)
"#;

/// Inventory accounting engine
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
    settings: InventoryConfig,
}

/// Stored inventory record
#[derive(Debug, FromRow)]
struct InventoryRow {
    id: Uuid,
    stock: i32,
    average_cost: Decimal,
    average_sale_price: Decimal,
}

impl InventoryRow {
    fn position(&self) -> StockPosition {
        StockPosition::new(self.stock, self.average_cost, self.average_sale_price)
    }
}

/// Stored movement, as needed to reverse it
#[derive(Debug, FromRow)]
struct MovementRow {
    id: Uuid,
    product_id: Uuid,
    quantity: i32,
    purchase_price: Option<Decimal>,
    sale_price: Decimal,
}

#[derive(Debug, FromRow)]
struct RecordViewRow {
    id: Uuid,
    stock: i32,
    average_cost: Decimal,
    average_sale_price: Decimal,
    updated_at: DateTime<Utc>,
    product_id: Uuid,
    product_name: String,
    product_sku: String,
    product_sale_price: Decimal,
}

impl From<RecordViewRow> for InventoryRecordView {
    fn from(row: RecordViewRow) -> Self {
        InventoryRecordView {
            id: row.id,
            stock: row.stock,
            average_cost: row.average_cost,
            average_sale_price: row.average_sale_price,
            updated_at: row.updated_at,
            product: ProductRef {
                id: row.product_id,
                name: row.product_name,
                sku: row.product_sku,
                sale_price: row.product_sale_price,
            },
        }
    }
}

#[derive(Debug, FromRow)]
struct MovementViewRow {
    id: Uuid,
    movement_type: String,
    quantity: i32,
    purchase_price: Option<Decimal>,
    sale_price: Decimal,
    purchase_order_status: Option<String>,
    created_at: DateTime<Utc>,
    product_id: Uuid,
    product_name: String,
    product_sku: String,
    product_sale_price: Decimal,
    supplier_id: Option<Uuid>,
    supplier_name: Option<String>,
}

impl TryFrom<MovementViewRow> for MovementView {
    type Error = AppError;

    fn try_from(row: MovementViewRow) -> Result<Self, Self::Error> {
        let movement_type = row
            .movement_type
            .parse::<MovementType>()
            .map_err(AppError::Internal)?;
        let purchase_order_status = row
            .purchase_order_status
            .as_deref()
            .map(str::parse::<PurchaseOrderStatus>)
            .transpose()
            .map_err(AppError::Internal)?;
        let supplier = match (row.supplier_id, row.supplier_name) {
            (Some(id), Some(name)) => Some(SupplierRef { id, name }),
            _ => None,
        };

        Ok(MovementView {
            id: row.id,
            movement_type,
            quantity: row.quantity,
            purchase_price: row.purchase_price,
            sale_price: row.sale_price,
            purchase_order_status,
            created_at: row.created_at,
            product: ProductRef {
                id: row.product_id,
                name: row.product_name,
                sku: row.product_sku,
                sale_price: row.product_sale_price,
            },
            supplier,
        })
    }
}

/// Movement about to be written to the ledger
struct NewMovement {
    product_id: Uuid,
    supplier_id: Option<Uuid>,
    movement_type: MovementType,
    quantity: i32,
    purchase_price: Decimal,
    sale_price: Decimal,
    purchase_order_status: Option<PurchaseOrderStatus>,
}

fn movement_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Inventory movement with id '{}' not found", id))
}

fn record_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Inventory record with id '{}' not found", id))
}

/// List price for an IN movement. An explicit sale price wins over the
/// margin; without either the configured default margin applies. A derived
/// price must still fit the stored range.
pub fn resolve_in_sale_price(
    purchase_price: Decimal,
    sale_price: Option<Decimal>,
    profit_margin_percent: Option<Decimal>,
    default_margin_percent: Decimal,
) -> AppResult<Decimal> {
    if let Some(price) = sale_price {
        return Ok(price);
    }
    let price = sale_price_from_margin(
        purchase_price,
        profit_margin_percent.unwrap_or(default_margin_percent),
    )?;
    validate_price_ceiling(price).map_err(|m| AppError::validation("salePrice", m))?;
    Ok(price)
}

fn validate_in_input(input: &InMovementInput) -> AppResult<()> {
    validate_quantity(input.quantity).map_err(|m| AppError::validation("quantity", m))?;
    validate_positive_price(input.purchase_price)
        .map_err(|m| AppError::validation("purchasePrice", m))?;
    if let Some(price) = input.sale_price {
        validate_positive_price(price)
            .and_then(|_| validate_money_scale(price))
            .map_err(|m| AppError::validation("salePrice", m))?;
    }
    if let Some(margin) = input.profit_margin_percent {
        validate_profit_margin(margin)
            .map_err(|m| AppError::validation("profitMarginPercent", m))?;
    }
    Ok(())
}

fn validate_out_input(input: &OutMovementInput) -> AppResult<Decimal> {
    validate_quantity(input.quantity).map_err(|m| AppError::validation("quantity", m))?;
    let discount = input.discount_percent.unwrap_or(Decimal::ZERO);
    validate_discount(discount).map_err(|m| AppError::validation("discountPercent", m))?;
    Ok(discount)
}

/// Whether a product stays listed once a movement has settled at `position`.
/// Selling out always delists; a receipt relists only when configured to.
fn next_active_state(
    is_active: bool,
    movement_type: MovementType,
    position: &StockPosition,
    reactivate_on_restock: bool,
) -> bool {
    match movement_type {
        MovementType::Out if position.is_depleted() => false,
        MovementType::In if reactivate_on_restock && !position.is_depleted() => true,
        _ => is_active,
    }
}

fn ensure_outbound(movement_type: &str) -> AppResult<()> {
    if movement_type != MovementType::Out.as_str() {
        return Err(AppError::ValidationError(
            "Only outbound movements can have their purchase order status updated".to_string(),
        ));
    }
    Ok(())
}

/// Take `quantity` units off for a sale and return the realized unit cost
fn issue_stock(position: &mut StockPosition, quantity: i32, product_name: &str) -> AppResult<Decimal> {
    position.issue(quantity).map_err(|err| match err {
        AccountingError::InsufficientStock { .. } => {
            AppError::PreconditionFailed(format!("Not enough stock for product \"{}\"", product_name))
        }
        other => other.into(),
    })
}

/// Reverse a stored movement's effect on `position`
fn reverse_movement(
    position: &mut StockPosition,
    movement_type: MovementType,
    stored: &MovementRow,
    product_name: &str,
    list_price: Decimal,
) -> AppResult<ReversalOutcome> {
    match (movement_type, stored.purchase_price) {
        (MovementType::In, Some(purchase_price)) => position
            .reverse_receipt(stored.quantity, purchase_price, stored.sale_price)
            .map_err(|err| match err {
                AccountingError::InsufficientStock { .. } => AppError::PreconditionFailed(format!(
                    "Not enough stock for product {} to undo movement",
                    product_name
                )),
                other => other.into(),
            }),
        // Receipts without a purchase price never entered the averages
        (MovementType::In, None) => Ok(ReversalOutcome::Exact),
        (MovementType::Out, recorded_cost) => {
            position.reverse_issue(
                stored.quantity,
                recorded_cost.unwrap_or(Decimal::ZERO),
                list_price,
            )?;
            Ok(ReversalOutcome::Exact)
        }
    }
}

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(db: PgPool, settings: InventoryConfig) -> Self {
        Self { db, settings }
    }

    /// Post an IN movement: blend the receipt into the running averages and
    /// update the product's prices
    pub async fn post_in_movement(&self, input: InMovementInput) -> AppResult<MovementPosted> {
        validate_in_input(&input)?;
        let sale_price = resolve_in_sale_price(
            input.purchase_price,
            input.sale_price,
            input.profit_margin_percent,
            self.settings.default_profit_margin_percent,
        )?;

        let mut tx = self.db.begin().await?;

        let mut product = ProductService::lock(&mut tx, input.product_id).await?;
        if let Some(supplier_id) = input.supplier_id {
            SupplierService::find(&mut tx, supplier_id).await?;
        }
        let record = lock_or_create_record(&mut tx, product.id).await?;

        let mut position = record.position();
        position.receive(input.quantity, input.purchase_price, sale_price)?;

        product.current_purchase_price = position.average_cost;
        product.sale_price = sale_price;
        let is_active = next_active_state(
            product.is_active,
            MovementType::In,
            &position,
            self.settings.reactivate_on_restock,
        );
        if is_active && !product.is_active {
            tracing::info!("Reactivating restocked product {}", product.id);
        }
        product.is_active = is_active;

        ProductService::save_pricing(&mut tx, &product).await?;
        save_position(&mut tx, record.id, &position).await?;
        let movement_id = insert_movement(
            &mut tx,
            NewMovement {
                product_id: product.id,
                supplier_id: input.supplier_id,
                movement_type: MovementType::In,
                quantity: input.quantity,
                purchase_price: input.purchase_price,
                sale_price,
                purchase_order_status: None,
            },
        )
        .await?;

        let inventory_record = fetch_record_view(&mut tx, record.id).await?;
        let movement = fetch_movement_view(&mut tx, movement_id).await?;
        tx.commit().await?;

        tracing::info!(
            "IN movement {} for product {}: +{} units, stock {}, average cost {}, average sale price {}",
            movement_id,
            product.id,
            input.quantity,
            position.stock,
            position.average_cost,
            position.average_sale_price
        );

        Ok(MovementPosted {
            inventory_record,
            movement,
        })
    }

    /// Post an OUT movement: take stock off at the current average cost and
    /// record the charged price
    pub async fn post_out_movement(&self, input: OutMovementInput) -> AppResult<MovementPosted> {
        let discount = validate_out_input(&input)?;

        let mut tx = self.db.begin().await?;

        let mut product = ProductService::lock(&mut tx, input.product_id).await?;
        if let Some(supplier_id) = input.supplier_id {
            SupplierService::find(&mut tx, supplier_id).await?;
        }
        let record = lock_or_create_record(&mut tx, product.id).await?;

        let mut position = record.position();
        let recorded_cost = issue_stock(&mut position, input.quantity, &product.name)?;
        let charged_price = discounted_price(product.sale_price, discount);

        let is_active = next_active_state(
            product.is_active,
            MovementType::Out,
            &position,
            self.settings.reactivate_on_restock,
        );
        if is_active != product.is_active {
            tracing::info!("Product {} is out of stock, deactivating", product.id);
            product.is_active = is_active;
            ProductService::save_pricing(&mut tx, &product).await?;
        }

        save_position(&mut tx, record.id, &position).await?;
        let movement_id = insert_movement(
            &mut tx,
            NewMovement {
                product_id: product.id,
                supplier_id: input.supplier_id,
                movement_type: MovementType::Out,
                quantity: input.quantity,
                purchase_price: recorded_cost,
                sale_price: charged_price,
                purchase_order_status: input.purchase_order_status,
            },
        )
        .await?;

        let inventory_record = fetch_record_view(&mut tx, record.id).await?;
        let movement = fetch_movement_view(&mut tx, movement_id).await?;
        tx.commit().await?;

        tracing::info!(
            "OUT movement {} for product {}: -{} units at {} (cost {}), stock {}",
            movement_id,
            product.id,
            input.quantity,
            charged_price,
            recorded_cost,
            position.stock
        );

        Ok(MovementPosted {
            inventory_record,
            movement,
        })
    }

    /// Change the purchase order status of an OUT movement
    pub async fn update_out_movement_status(
        &self,
        id: Uuid,
        input: UpdateOutMovementInput,
    ) -> AppResult<MovementView> {
        let mut tx = self.db.begin().await?;

        let movement_type = sqlx::query_scalar::<_, String>(
            "SELECT movement_type FROM inventory_movements WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| movement_not_found(id))?;

        ensure_outbound(&movement_type)?;

        sqlx::query("UPDATE inventory_movements SET purchase_order_status = $1 WHERE id = $2")
            .bind(input.purchase_order_status.as_str())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let movement = fetch_movement_view(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!(
            "Movement {} purchase order status set to {}",
            id,
            input.purchase_order_status.as_str()
        );
        Ok(movement)
    }

    /// Reverse a movement's effect on stock and averages, then delete it
    pub async fn undo_movement(&self, id: Uuid) -> AppResult<MovementUndone> {
        // The product id is needed before anything can be locked in order
        let product_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT product_id FROM inventory_movements WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| movement_not_found(id))?;

        let mut tx = self.db.begin().await?;

        let product = ProductService::lock(&mut tx, product_id).await?;
        let record = lock_record_by_product(&mut tx, product_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Inventory record for product '{}' not found",
                    product_id
                ))
            })?;

        let stored = sqlx::query_as::<_, MovementRow>(
            r#"
            SELECT id, product_id, quantity, purchase_price, sale_price
            FROM inventory_movements
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .filter(|m| m.product_id == product_id)
        .ok_or_else(|| movement_not_found(id))?;

        let movement = fetch_movement_view(&mut tx, stored.id).await?;
        let mut position = record.position();

        let outcome = reverse_movement(
            &mut position,
            movement.movement_type,
            &stored,
            &product.name,
            product.sale_price,
        )?;
        if outcome == ReversalOutcome::Clamped {
            tracing::warn!(
                "Undoing movement {} left negative averages for product {}; clamped to zero",
                id,
                product_id
            );
        }

        save_position(&mut tx, record.id, &position).await?;
        sqlx::query("DELETE FROM inventory_movements WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let updated_inventory = fetch_record_view(&mut tx, record.id).await?;
        tx.commit().await?;

        tracing::info!(
            "Undid {} movement {} for product {}: stock {}, average cost {}",
            movement.movement_type,
            id,
            product_id,
            position.stock,
            position.average_cost
        );

        Ok(MovementUndone {
            movement,
            updated_inventory,
        })
    }

    /// One page of a product's ledger
    pub async fn list_movements(&self, query: MovementQuery) -> AppResult<MovementPage> {
        let product_id = query
            .product_id
            .ok_or_else(|| AppError::validation("productId", "Product ID is required"))?;
        let limit = resolve_list_limit(
            query.limit,
            self.settings.default_list_limit,
            self.settings.max_list_limit,
        )
        .map_err(|m| AppError::validation("limit", m))?;
        let offset = resolve_offset(query.offset).map_err(|m| AppError::validation("offset", m))?;
        let window = DateWindow::from_dates(
            query.start_date.as_deref(),
            query.end_date.as_deref(),
            self.settings.timezone,
        )?;
        let movement_type = query
            .movement_type
            .unwrap_or_default()
            .movement_type()
            .map(|t| t.as_str());
        let order = query.order_by.unwrap_or_default().as_sql();

        let total_records = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM inventory_movements m {}",
            MOVEMENT_FILTER
        ))
        .bind(product_id)
        .bind(movement_type)
        .bind(window.start)
        .bind(window.end)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, MovementViewRow>(&format!(
            "{} {} ORDER BY m.created_at {}, m.id {} LIMIT $5 OFFSET $6",
            MOVEMENT_VIEW_SELECT, MOVEMENT_FILTER, order, order
        ))
        .bind(product_id)
        .bind(movement_type)
        .bind(window.start)
        .bind(window.end)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        let movements = rows
            .into_iter()
            .map(MovementView::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(MovementPage {
            product_id,
            start_date: window.start,
            end_date: window.end,
            limit,
            offset,
            total_records,
            movements,
        })
    }

    /// Get one movement
    pub async fn get_movement(&self, id: Uuid) -> AppResult<MovementView> {
        let mut conn = self.db.acquire().await?;
        fetch_movement_view(&mut conn, id).await
    }

    /// All inventory records ordered by product name
    pub async fn list_inventory_records(&self) -> AppResult<Vec<InventoryRecordView>> {
        let rows = sqlx::query_as::<_, RecordViewRow>(&format!(
            "{} ORDER BY p.name ASC",
            RECORD_VIEW_SELECT
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(InventoryRecordView::from).collect())
    }

    /// Get one inventory record
    pub async fn get_inventory_record(&self, id: Uuid) -> AppResult<InventoryRecordView> {
        let mut conn = self.db.acquire().await?;
        fetch_record_view(&mut conn, id).await
    }

    /// Delete an inventory record. The ledger rows of the product stay.
    ///
    /// Takes the product lock first so a concurrent post never sees the
    /// record disappear between creating and locking it.
    pub async fn delete_inventory_record(&self, id: Uuid) -> AppResult<()> {
        let product_id = sqlx::query_scalar::<_, Uuid>("SELECT product_id FROM inventory WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| record_not_found(id))?;

        let mut tx = self.db.begin().await?;
        ProductService::lock(&mut tx, product_id).await?;

        let result = sqlx::query("DELETE FROM inventory WHERE id = $1 AND product_id = $2")
            .bind(id)
            .bind(product_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(record_not_found(id));
        }
        tx.commit().await?;

        tracing::info!("Deleted inventory record {} of product {}", id, product_id);
        Ok(())
    }
}

// ============================================================================
// Transaction helpers
// ============================================================================

/// Lock the product's inventory record, creating an empty one first if the
/// product has none yet. The caller must already hold the product lock.
async fn lock_or_create_record(conn: &mut PgConnection, product_id: Uuid) -> AppResult<InventoryRow> {
    sqlx::query(
        r#"
        INSERT INTO inventory (product_id)
        VALUES ($1)
        ON CONFLICT (product_id) DO NOTHING
        "#,
    )
    .bind(product_id)
    .execute(&mut *conn)
    .await?;

    lock_record_by_product(conn, product_id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("Inventory record for product {} vanished", product_id)))
}

async fn lock_record_by_product(
    conn: &mut PgConnection,
    product_id: Uuid,
) -> AppResult<Option<InventoryRow>> {
    let row = sqlx::query_as::<_, InventoryRow>(
        r#"
        SELECT id, stock, average_cost, average_sale_price
        FROM inventory
        WHERE product_id = $1
        FOR UPDATE
        "#,
    )
    .bind(product_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row)
}

async fn save_position(conn: &mut PgConnection, record_id: Uuid, position: &StockPosition) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE inventory
        SET stock = $1, average_cost = $2, average_sale_price = $3, updated_at = NOW()
        WHERE id = $4
        "#,
    )
    .bind(position.stock)
    .bind(position.average_cost)
    .bind(position.average_sale_price)
    .bind(record_id)
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        tracing::error!("Failed to persist inventory record {}: {}", record_id, e);
        e
    })?;

    Ok(())
}

async fn insert_movement(conn: &mut PgConnection, movement: NewMovement) -> AppResult<Uuid> {
    let id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO inventory_movements (
            product_id, supplier_id, movement_type, quantity, purchase_price,
            sale_price, purchase_order_status
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(movement.product_id)
    .bind(movement.supplier_id)
    .bind(movement.movement_type.as_str())
    .bind(movement.quantity)
    .bind(movement.purchase_price)
    .bind(movement.sale_price)
    .bind(movement.purchase_order_status.map(|s| s.as_str()))
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| {
        tracing::error!(
            "Failed to record {} movement for product {}: {}",
            movement.movement_type,
            movement.product_id,
            e
        );
        e
    })?;

    Ok(id)
}

async fn fetch_record_view(conn: &mut PgConnection, id: Uuid) -> AppResult<InventoryRecordView> {
    let row = sqlx::query_as::<_, RecordViewRow>(&format!("{} WHERE i.id = $1", RECORD_VIEW_SELECT))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| record_not_found(id))?;

    Ok(row.into())
}

async fn fetch_movement_view(conn: &mut PgConnection, id: Uuid) -> AppResult<MovementView> {
    let row = sqlx::query_as::<_, MovementViewRow>(&format!("{} WHERE m.id = $1", MOVEMENT_VIEW_SELECT))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| movement_not_found(id))?;

    row.try_into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn in_input(quantity: i32, purchase: &str) -> InMovementInput {
        InMovementInput {
            product_id: Uuid::new_v4(),
            quantity,
            purchase_price: dec(purchase),
            sale_price: None,
            profit_margin_percent: None,
            supplier_id: None,
        }
    }

    fn stored(quantity: i32, purchase_price: Option<&str>, sale_price: &str) -> MovementRow {
        MovementRow {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            quantity,
            purchase_price: purchase_price.map(dec),
            sale_price: dec(sale_price),
        }
    }

    #[test]
    fn test_explicit_sale_price_wins_over_margin() {
        let price =
            resolve_in_sale_price(dec("10"), Some(dec("25")), Some(dec("300")), dec("100")).unwrap();
        assert_eq!(price, dec("25"));
    }

    #[test]
    fn test_margin_and_default_margin() {
        assert_eq!(
            resolve_in_sale_price(dec("10"), None, Some(dec("150")), dec("100")).unwrap(),
            dec("25")
        );
        assert_eq!(resolve_in_sale_price(dec("10"), None, None, dec("100")).unwrap(), dec("20"));
    }

    #[test]
    fn test_margin_price_beyond_storable_range() {
        // 9e9 with a 300% markup is 3.6e10
        let err = resolve_in_sale_price(dec("9000000000"), None, Some(dec("300")), dec("100"))
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "salePrice"));
    }

    #[test]
    fn test_huge_prices_rejected_before_math() {
        let err = validate_in_input(&in_input(10, "79228162514264337593543950335")).unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "purchasePrice"));

        let mut input = in_input(10, "10");
        input.sale_price = Some(dec("10000000000"));
        let err = validate_in_input(&input).unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "salePrice"));
    }

    #[test]
    fn test_sale_price_must_be_whole_cents() {
        let mut input = in_input(10, "5");
        input.sale_price = Some(dec("9.999"));
        let err = validate_in_input(&input).unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "salePrice"));

        input.sale_price = Some(dec("9.99"));
        assert!(validate_in_input(&input).is_ok());
        assert_eq!(
            resolve_in_sale_price(input.purchase_price, input.sale_price, None, dec("100")).unwrap(),
            dec("9.99")
        );
    }

    #[test]
    fn test_selling_out_delists_product() {
        let empty = StockPosition::default();
        let stocked = StockPosition::new(3, dec("10"), dec("25"));

        assert!(!next_active_state(true, MovementType::Out, &empty, false));
        assert!(!next_active_state(true, MovementType::Out, &empty, true));
        assert!(next_active_state(true, MovementType::Out, &stocked, false));
    }

    #[test]
    fn test_restock_relists_only_when_configured() {
        let stocked = StockPosition::new(10, dec("10"), dec("25"));

        assert!(!next_active_state(false, MovementType::In, &stocked, false));
        assert!(next_active_state(false, MovementType::In, &stocked, true));
        assert!(next_active_state(true, MovementType::In, &stocked, false));
    }

    #[test]
    fn test_status_update_only_for_outbound() {
        assert!(ensure_outbound("OUT").is_ok());
        let err = ensure_outbound("IN").unwrap_err();
        assert!(matches!(err, AppError::ValidationError(ref m) if m.starts_with("Only outbound")));
    }

    #[test]
    fn test_sale_beyond_stock_is_precondition_failed() {
        let mut position = StockPosition::new(5, dec("10"), dec("25"));
        let err = issue_stock(&mut position, 6, "Green Tea").unwrap_err();

        assert!(
            matches!(err, AppError::PreconditionFailed(ref m) if m == "Not enough stock for product \"Green Tea\"")
        );
        assert_eq!(position.stock, 5);
    }

    #[test]
    fn test_undo_receipt_after_sales_is_precondition_failed() {
        // 10 received, 8 sold: the receipt can no longer be taken back
        let mut position = StockPosition::new(2, dec("5"), dec("10"));
        let receipt = stored(10, Some("5"), "10");

        let err = reverse_movement(&mut position, MovementType::In, &receipt, "Green Tea", dec("10"))
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::PreconditionFailed(ref m) if m == "Not enough stock for product Green Tea to undo movement"
        ));
        assert_eq!(position, StockPosition::new(2, dec("5"), dec("10")));
    }

    #[test]
    fn test_undo_receipt_without_purchase_price_leaves_position() {
        let mut position = StockPosition::new(4, dec("5"), dec("10"));
        let receipt = stored(10, None, "10");

        let outcome =
            reverse_movement(&mut position, MovementType::In, &receipt, "Green Tea", dec("10")).unwrap();
        assert_eq!(outcome, ReversalOutcome::Exact);
        assert_eq!(position, StockPosition::new(4, dec("5"), dec("10")));
    }

    #[test]
    fn test_undo_sale_on_depleted_position_reseeds_from_list_price() {
        let mut position = StockPosition::default();
        let sale = stored(10, Some("8"), "12");

        reverse_movement(&mut position, MovementType::Out, &sale, "Green Tea", dec("15")).unwrap();
        assert_eq!(position, StockPosition::new(10, dec("8"), dec("15")));
    }

    #[test]
    fn test_in_validation_fields() {
        let err = validate_in_input(&in_input(0, "10")).unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "quantity"));

        let err = validate_in_input(&in_input(5, "0")).unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "purchasePrice"));

        let mut input = in_input(5, "10");
        input.profit_margin_percent = Some(dec("50"));
        let err = validate_in_input(&input).unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "profitMarginPercent"));

        let mut input = in_input(5, "10");
        input.sale_price = Some(dec("25"));
        input.profit_margin_percent = Some(dec("200"));
        assert!(validate_in_input(&input).is_ok());
    }

    #[test]
    fn test_out_validation_defaults_discount() {
        let input = OutMovementInput {
            product_id: Uuid::new_v4(),
            quantity: 3,
            discount_percent: None,
            supplier_id: None,
            purchase_order_status: None,
        };
        assert_eq!(validate_out_input(&input).unwrap(), Decimal::ZERO);

        let input = OutMovementInput {
            discount_percent: Some(dec("120")),
            ..input
        };
        assert!(validate_out_input(&input).is_err());
    }

    #[test]
    fn test_movement_row_conversion() {
        let row = MovementViewRow {
            id: Uuid::new_v4(),
            movement_type: "OUT".to_string(),
            quantity: 30,
            purchase_price: Some(dec("10")),
            sale_price: dec("25"),
            purchase_order_status: Some("COMPLETED".to_string()),
            created_at: Utc::now(),
            product_id: Uuid::new_v4(),
            product_name: "Green Tea".to_string(),
            product_sku: "KND-GT-0A1B2C3D".to_string(),
            product_sale_price: dec("25"),
            supplier_id: None,
            supplier_name: None,
        };

        let view = MovementView::try_from(row).unwrap();
        assert_eq!(view.movement_type, MovementType::Out);
        assert_eq!(view.purchase_order_status, Some(PurchaseOrderStatus::Completed));
        assert!(view.supplier.is_none());
    }

    #[test]
    fn test_movement_row_with_unknown_type_is_internal() {
        let row = MovementViewRow {
            id: Uuid::new_v4(),
            movement_type: "ALL".to_string(),
            quantity: 1,
            purchase_price: None,
            sale_price: dec("1"),
            purchase_order_status: None,
            created_at: Utc::now(),
            product_id: Uuid::new_v4(),
            product_name: "Green Tea".to_string(),
            product_sku: "KND-GT-0A1B2C3D".to_string(),
            product_sale_price: dec("1"),
            supplier_id: None,
            supplier_name: None,
        };

        assert!(matches!(MovementView::try_from(row), Err(AppError::Internal(_))));
    }
}
