//! Loan evaluation endpoints

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::{AppError, AppResult},
    models::loan::{BorrowRecord, LoanView, Shelf},
};

use super::{ApiJson, ApiQuery};

/// Evaluation query parameters
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EvaluateQuery {
    /// Evaluation instant (RFC 3339); defaults to the current time
    pub at: Option<String>,
}

impl EvaluateQuery {
    fn instant(&self) -> AppResult<DateTime<Utc>> {
        match &self.at {
            Some(at) => DateTime::parse_from_rfc3339(at)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| AppError::BadRequest(format!("Invalid 'at' timestamp '{}': {}", at, e))),
            None => Ok(Utc::now()),
        }
    }
}

/// Reject records that carry no book identifier
fn validate_records(records: &[BorrowRecord]) -> AppResult<()> {
    if let Some(index) = records
        .iter()
        .position(|r| r.id.is_none() && r.book_id.is_none())
    {
        return Err(AppError::Validation(format!(
            "Record {} has neither id nor book_id",
            index
        )));
    }
    Ok(())
}

/// Evaluate a batch of borrow records
#[utoipa::path(
    post,
    path = "/loans/evaluate",
    tag = "loans",
    params(EvaluateQuery),
    request_body = Vec<BorrowRecord>,
    responses(
        (status = 200, description = "Evaluated loans, in input order", body = Vec<LoanView>),
        (status = 400, description = "Invalid record or timestamp", body = crate::error::ErrorResponse)
    )
)]
pub async fn evaluate_loans(
    State(state): State<crate::AppState>,
    ApiQuery(query): ApiQuery<EvaluateQuery>,
    ApiJson(records): ApiJson<Vec<BorrowRecord>>,
) -> AppResult<Json<Vec<LoanView>>> {
    let now = query.instant()?;
    validate_records(&records)?;

    tracing::debug!("Evaluating {} loans at {}", records.len(), now);

    Ok(Json(state.services.loans.evaluate(&records, now)))
}

/// Build a shelf (current borrows and history) from borrow records
#[utoipa::path(
    post,
    path = "/loans/shelf",
    tag = "loans",
    params(EvaluateQuery),
    request_body = Vec<BorrowRecord>,
    responses(
        (status = 200, description = "Loans split into current and history", body = Shelf),
        (status = 400, description = "Invalid record or timestamp", body = crate::error::ErrorResponse)
    )
)]
pub async fn build_shelf(
    State(state): State<crate::AppState>,
    ApiQuery(query): ApiQuery<EvaluateQuery>,
    ApiJson(records): ApiJson<Vec<BorrowRecord>>,
) -> AppResult<Json<Shelf>> {
    let now = query.instant()?;
    validate_records(&records)?;

    Ok(Json(state.services.loans.shelf(&records, now)))
}
