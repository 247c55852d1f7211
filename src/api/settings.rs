//! Loan policy and presentation defaults

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::{AssetsConfig, LoanPolicy};

#[derive(Serialize, ToSchema)]
pub struct LoanPolicyResponse {
    pub policy: LoanPolicy,
    pub assets: AssetsConfig,
}

/// Get the active renewal policy and asset defaults
#[utoipa::path(
    get,
    path = "/settings/loan-policy",
    tag = "settings",
    responses(
        (status = 200, description = "Active loan policy", body = LoanPolicyResponse)
    )
)]
pub async fn get_loan_policy(State(state): State<crate::AppState>) -> Json<LoanPolicyResponse> {
    let loans = &state.services.loans;
    Json(LoanPolicyResponse {
        policy: *loans.evaluator().policy(),
        assets: loans.assets().clone(),
    })
}
