//! Profit reporting over the movement ledger

use rust_decimal::Decimal;
use serde::Serialize;
use shared::{DateWindow, ProfitReport, ProfitReportLine, ProfitReportQuery};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::config::InventoryConfig;
use crate::error::{AppError, AppResult};

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
    settings: InventoryConfig,
}

#[derive(Debug, FromRow)]
struct ProfitRow {
    product_id: Uuid,
    product_name: String,
    product_sale_price: Decimal,
    total_sold_quantity: i64,
    total_sales_revenue: Decimal,
    total_cost: Decimal,
    total_profit: Decimal,
}

impl From<ProfitRow> for ProfitReportLine {
    fn from(row: ProfitRow) -> Self {
        ProfitReportLine {
            product_id: row.product_id,
            product_name: row.product_name,
            product_sale_price: row.product_sale_price,
            total_sold_quantity: row.total_sold_quantity,
            total_sales_revenue: row.total_sales_revenue,
            total_cost: row.total_cost,
            total_profit: row.total_profit,
        }
    }
}

/// One CSV line of the profit export
#[derive(Debug, Serialize)]
struct ProfitCsvRow<'a> {
    product_id: String,
    product_name: &'a str,
    product_sale_price: Option<Decimal>,
    total_sold_quantity: i64,
    total_sales_revenue: Decimal,
    total_cost: Decimal,
    total_profit: Decimal,
}

impl ReportingService {
    pub fn new(db: PgPool, settings: InventoryConfig) -> Self {
        Self { db, settings }
    }

    /// Revenue, cost and profit of OUT movements per product in the window
    pub async fn get_profit_report(&self, query: &ProfitReportQuery) -> AppResult<ProfitReport> {
        let window = DateWindow::from_dates(
            query.start_date.as_deref(),
            query.end_date.as_deref(),
            self.settings.timezone,
        )?;
        let order = query.order_by.unwrap_or_default().as_sql();

        // Legacy OUT rows without a recorded cost count as zero cost
        let rows = sqlx::query_as::<_, ProfitRow>(&format!(
            r#"
            SELECT p.id AS product_id,
                   p.name AS product_name,
                   p.sale_price AS product_sale_price,
                   SUM(m.quantity)::BIGINT AS total_sold_quantity,
                   SUM(m.sale_price * m.quantity) AS total_sales_revenue,
                   SUM(COALESCE(m.purchase_price, 0) * m.quantity) AS total_cost,
                   SUM((m.sale_price - COALESCE(m.purchase_price, 0)) * m.quantity) AS total_profit
            FROM inventory_movements m
            JOIN products p ON p.id = m.product_id
            WHERE m.movement_type = 'OUT'
              AND ($1::timestamptz IS NULL OR m.created_at >= $1)
              AND ($2::timestamptz IS NULL OR m.created_at <= $2)
            GROUP BY p.id, p.name, p.sale_price
            ORDER BY total_profit {}, p.name ASC
            "#,
            order
        ))
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.db)
        .await?;

        let report: Vec<ProfitReportLine> = rows.into_iter().map(ProfitReportLine::from).collect();
        tracing::debug!("Profit report with {} products", report.len());

        Ok(ProfitReport {
            start_date: window.start,
            end_date: window.end,
            total_records: report.len() as i64,
            report,
        })
    }

    /// Export a profit report to CSV, one row per product and a closing
    /// TOTAL row
    pub fn export_profit_csv(report: &ProfitReport) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for line in &report.report {
            wtr.serialize(ProfitCsvRow {
                product_id: line.product_id.to_string(),
                product_name: &line.product_name,
                product_sale_price: Some(line.product_sale_price),
                total_sold_quantity: line.total_sold_quantity,
                total_sales_revenue: line.total_sales_revenue,
                total_cost: line.total_cost,
                total_profit: line.total_profit,
            })
            .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }

        let totals = report.grand_totals();
        wtr.serialize(ProfitCsvRow {
            product_id: "TOTAL".to_string(),
            product_name: "",
            product_sale_price: None,
            total_sold_quantity: totals.sold_quantity,
            total_sales_revenue: totals.revenue,
            total_cost: totals.cost,
            total_profit: totals.profit,
        })
        .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;

        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str, quantity: i64, revenue: i64, cost: i64) -> ProfitReportLine {
        ProfitReportLine {
            product_id: Uuid::nil(),
            product_name: name.to_string(),
            product_sale_price: Decimal::from(25),
            total_sold_quantity: quantity,
            total_sales_revenue: Decimal::from(revenue),
            total_cost: Decimal::from(cost),
            total_profit: Decimal::from(revenue - cost),
        }
    }

    #[test]
    fn test_csv_export_has_total_row() {
        let report = ProfitReport {
            start_date: None,
            end_date: None,
            report: vec![line("Green Tea", 30, 750, 300), line("Black Tea", 5, 100, 60)],
            total_records: 2,
        };

        let csv = ReportingService::export_profit_csv(&report).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "product_id,product_name,product_sale_price,total_sold_quantity,total_sales_revenue,total_cost,total_profit"
        );
        assert!(lines[1].contains("Green Tea,25,30,750,300,450"));
        assert_eq!(lines[3], "TOTAL,,,35,850,360,490");
    }

    #[test]
    fn test_csv_export_of_empty_report() {
        let report = ProfitReport {
            start_date: None,
            end_date: None,
            report: vec![],
            total_records: 0,
        };

        let csv = ReportingService::export_profit_csv(&report).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "TOTAL,,,0,0,0,0");
    }
}
