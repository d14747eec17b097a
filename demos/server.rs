//! Simple REST API server example for the payoff engine.
//!
//! Run with: `cargo run --example server`
//!
//! ## Endpoints
//!
//! - `POST /plan` - Simulate one policy
//! - `POST /compare` - Simulate both policies and recommend one
//! - `POST /cash-flow` - Free cash flow from a household budget
//!
//! ## Example Usage
//!
//! ```bash
//! # Snowball plan
//! curl -X POST http://localhost:3000/plan \
//!   -H "Content-Type: application/json" \
//!   -d '{"policy": "snowball", "free_cash_flow": "200", "debts": [
//!         {"id": "A", "balance": "100", "minimum_payment": "0"},
//!         {"id": "B", "balance": "50", "minimum_payment": "0"}]}'
//!
//! # Compare policies
//! curl -X POST http://localhost:3000/compare \
//!   -H "Content-Type: application/json" \
//!   -d '{"free_cash_flow": "200", "debts": [
//!         {"id": "visa", "balance": "2000", "minimum_payment": "60", "interest_rate_annual": "29"}]}'
//! ```

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use log::info;
use payoff_planner::{
    Budget, CashFlow, Comparison, DEFAULT_SCALE, DebtRecord, LedgerSnapshot, PayoffPolicy, Plan,
    Simulation, ValidationError, compare_snapshot,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

const DEFAULT_MAX_PERIODS: u32 = 1200;

// === Request/Response DTOs ===

fn default_max_periods() -> u32 {
    DEFAULT_MAX_PERIODS
}

fn default_scale() -> u32 {
    DEFAULT_SCALE
}

/// Request body for `/plan`.
///
/// ```json
/// {"policy": "avalanche", "free_cash_flow": "150.00", "debts": [...]}
/// ```
#[derive(Debug, Deserialize)]
pub struct PlanRequest {
    pub policy: PayoffPolicy,
    pub free_cash_flow: Decimal,
    pub debts: Vec<DebtRecord>,
    #[serde(default = "default_max_periods")]
    pub max_periods: u32,
    #[serde(default = "default_scale")]
    pub scale: u32,
}

/// Request body for `/compare`.
#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    pub free_cash_flow: Decimal,
    pub debts: Vec<DebtRecord>,
    #[serde(default = "default_max_periods")]
    pub max_periods: u32,
    #[serde(default = "default_scale")]
    pub scale: u32,
}

/// Request body for `/cash-flow`.
#[derive(Debug, Deserialize)]
pub struct CashFlowRequest {
    pub budget: Budget,
    pub debts: Vec<DebtRecord>,
}

/// Response body for errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub field: String,
    pub debt: Option<String>,
}

// === Error Handling ===

/// Wrapper for converting `ValidationError` into HTTP responses.
pub struct AppError(ValidationError);

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = match &self.0 {
            ValidationError::DuplicateId { .. } => "DUPLICATE_ID",
            ValidationError::NegativeBalance { .. } => "NEGATIVE_BALANCE",
            ValidationError::NegativeMinimumPayment { .. } => "NEGATIVE_MINIMUM_PAYMENT",
            ValidationError::NegativeInterestRate { .. } => "NEGATIVE_INTEREST_RATE",
            ValidationError::InvalidMaxPeriods => "INVALID_MAX_PERIODS",
            ValidationError::UnsupportedScale(_) => "UNSUPPORTED_SCALE",
            ValidationError::NegativeBudgetAmount { .. } => "NEGATIVE_BUDGET_AMOUNT",
            ValidationError::InvalidAllowance => "INVALID_ALLOWANCE",
            ValidationError::BudgetOutOfRange => "BUDGET_OUT_OF_RANGE",
        };

        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: self.0.to_string(),
                code: code.to_string(),
                field: self.0.field().to_string(),
                debt: self.0.debt_id().map(ToString::to_string),
            }),
        )
            .into_response()
    }
}

// === Handlers ===

/// POST /plan - Simulate one policy.
async fn plan(Json(request): Json<PlanRequest>) -> Result<Json<Plan>, AppError> {
    let snapshot = LedgerSnapshot::new(request.debts)?;
    let plan = Simulation::from_snapshot(
        snapshot,
        request.free_cash_flow,
        request.policy,
        request.max_periods,
    )?
    .with_scale(request.scale)?
    .into_plan();
    Ok(Json(plan))
}

/// POST /compare - Simulate both policies.
async fn compare(Json(request): Json<CompareRequest>) -> Result<Json<Comparison>, AppError> {
    let snapshot = LedgerSnapshot::new(request.debts)?;
    let comparison = compare_snapshot(
        &snapshot,
        request.free_cash_flow,
        request.max_periods,
        request.scale,
    )?;
    Ok(Json(comparison))
}

/// POST /cash-flow - Free cash flow for a budget.
async fn cash_flow(Json(request): Json<CashFlowRequest>) -> Result<Json<CashFlow>, AppError> {
    let snapshot = LedgerSnapshot::new(request.debts)?;
    Ok(Json(request.budget.cash_flow(&snapshot)?))
}

// === Router ===

fn create_router() -> Router {
    Router::new()
        .route("/plan", post(plan))
        .route("/compare", post(compare))
        .route("/cash-flow", post(cash_flow))
}

// === Main ===

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let addr = std::env::var("PAYOFF_PLANNER_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    let listener = TcpListener::bind(&addr).await?;

    info!("Payoff planner API running on http://{}", addr);
    info!("  POST /plan       - Simulate one policy");
    info!("  POST /compare    - Compare snowball and avalanche");
    info!("  POST /cash-flow  - Free cash flow from a budget");

    axum::serve(listener, create_router()).await
}
