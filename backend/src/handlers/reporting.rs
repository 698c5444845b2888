//! Reporting handlers

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use shared::{ProfitReportQuery, ReportFormat};

use crate::error::AppResult;
use crate::extract::QueryParams;
use crate::services::ReportingService;
use crate::AppState;

/// Get the profit report as JSON or, with `format=csv`, as a CSV download
pub async fn get_profit_report(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ProfitReportQuery>,
) -> AppResult<Response> {
    let service = ReportingService::new(state.db.clone(), state.config.inventory.clone());
    let report = service.get_profit_report(&query).await?;

    match query.format.unwrap_or_default() {
        ReportFormat::Csv => {
            let csv = ReportingService::export_profit_csv(&report)?;
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv"),
                    (header::CONTENT_DISPOSITION, "attachment; filename=\"profit_report.csv\""),
                ],
                csv,
            )
                .into_response())
        }
        ReportFormat::Json => Ok(Json(report).into_response()),
    }
}
