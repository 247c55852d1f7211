//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{health, loans, settings};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shelfmark API",
        version = "1.0.0",
        description = "Loan lifecycle evaluation for library lending clients",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Loans
        loans::evaluate_loans,
        loans::build_shelf,
        // Settings
        settings::get_loan_policy,
    ),
    components(
        schemas(
            // Loans
            crate::models::loan::BorrowRecord,
            crate::models::loan::NormalizedLoan,
            crate::models::loan::LoanAssessment,
            crate::models::loan::LoanDisplay,
            crate::models::loan::LoanView,
            crate::models::loan::Shelf,
            crate::models::loan::ShelfCounts,
            crate::models::enums::DisplayCategory,
            // Settings
            settings::LoanPolicyResponse,
            crate::config::LoanPolicy,
            crate::config::AssetsConfig,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "loans", description = "Loan lifecycle evaluation"),
        (name = "settings", description = "Loan policy")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
