//! Inventory ledger models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::accounting::ProfitTotals;

/// Direction of a stored movement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementType {
    /// Purchase or receipt
    In,
    /// Sale or issue
    Out,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::In => "IN",
            MovementType::Out => "OUT",
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN" => Ok(MovementType::In),
            "OUT" => Ok(MovementType::Out),
            other => Err(format!("Unknown movement type '{}'", other)),
        }
    }
}

/// Movement type filter for ledger queries. `All` is never stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementTypeFilter {
    In,
    Out,
    #[default]
    All,
}

impl MovementTypeFilter {
    /// The stored type to filter on, or `None` for no filter
    pub fn movement_type(&self) -> Option<MovementType> {
        match self {
            MovementTypeFilter::In => Some(MovementType::In),
            MovementTypeFilter::Out => Some(MovementType::Out),
            MovementTypeFilter::All => None,
        }
    }
}

/// Fulfilment state tracked on OUT movements
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum PurchaseOrderStatus {
    Pending,
    Completed,
}

impl PurchaseOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseOrderStatus::Pending => "PENDING",
            PurchaseOrderStatus::Completed => "COMPLETED",
        }
    }
}

impl FromStr for PurchaseOrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(PurchaseOrderStatus::Pending),
            "COMPLETED" => Ok(PurchaseOrderStatus::Completed),
            other => Err(format!("Unknown purchase order status '{}'", other)),
        }
    }
}

// ============================================================================
// Inputs
// ============================================================================

/// Input for posting an IN movement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InMovementInput {
    pub product_id: Uuid,
    pub quantity: i32,
    pub purchase_price: Decimal,
    /// Explicit list price; takes precedence over the margin
    pub sale_price: Option<Decimal>,
    /// Markup over the purchase price, 100 to 300
    #[serde(alias = "profitMarginPercentage")]
    pub profit_margin_percent: Option<Decimal>,
    pub supplier_id: Option<Uuid>,
}

/// Input for posting an OUT movement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutMovementInput {
    pub product_id: Uuid,
    pub quantity: i32,
    pub discount_percent: Option<Decimal>,
    pub supplier_id: Option<Uuid>,
    pub purchase_order_status: Option<PurchaseOrderStatus>,
}

/// Input for updating the status of an OUT movement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutMovementInput {
    pub purchase_order_status: PurchaseOrderStatus,
}

/// Ledger listing filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementQuery {
    pub product_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub movement_type: Option<MovementTypeFilter>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub order_by: Option<crate::types::SortOrder>,
}

/// Profit report filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitReportQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub order_by: Option<crate::types::SortOrder>,
    pub format: Option<crate::types::ReportFormat>,
}

// ============================================================================
// Projections
// ============================================================================

/// Product fields shown alongside ledger rows
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductRef {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub sale_price: Decimal,
}

/// Supplier fields shown alongside ledger rows
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SupplierRef {
    pub id: Uuid,
    pub name: String,
}

/// Inventory record with its product
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecordView {
    pub id: Uuid,
    pub stock: i32,
    pub average_cost: Decimal,
    pub average_sale_price: Decimal,
    pub updated_at: DateTime<Utc>,
    pub product: ProductRef,
}

/// Movement with its product and supplier
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementView {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub quantity: i32,
    /// Price paid (IN) or realized average cost (OUT)
    pub purchase_price: Option<Decimal>,
    /// New list price (IN) or charged price after discount (OUT)
    pub sale_price: Decimal,
    pub purchase_order_status: Option<PurchaseOrderStatus>,
    pub created_at: DateTime<Utc>,
    pub product: ProductRef,
    pub supplier: Option<SupplierRef>,
}

/// Result of posting a movement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementPosted {
    pub inventory_record: InventoryRecordView,
    pub movement: MovementView,
}

/// Result of undoing a movement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementUndone {
    /// The movement as it was before deletion
    pub movement: MovementView,
    pub updated_inventory: InventoryRecordView,
}

/// One page of ledger rows
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementPage {
    pub product_id: Uuid,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub limit: i64,
    pub offset: i64,
    /// Matching rows ignoring limit and offset
    pub total_records: i64,
    pub movements: Vec<MovementView>,
}

/// Profit aggregated for one product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfitReportLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub product_sale_price: Decimal,
    pub total_sold_quantity: i64,
    pub total_sales_revenue: Decimal,
    pub total_cost: Decimal,
    pub total_profit: Decimal,
}

impl ProfitReportLine {
    pub fn totals(&self) -> ProfitTotals {
        ProfitTotals {
            sold_quantity: self.total_sold_quantity,
            revenue: self.total_sales_revenue,
            cost: self.total_cost,
            profit: self.total_profit,
        }
    }
}

/// Profit report over a date window
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitReport {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub report: Vec<ProfitReportLine>,
    pub total_records: i64,
}

impl ProfitReport {
    /// Totals across every product in the report
    pub fn grand_totals(&self) -> ProfitTotals {
        self.report.iter().fold(ProfitTotals::default(), |mut acc, line| {
            acc.merge(&line.totals());
            acc
        })
    }
}
