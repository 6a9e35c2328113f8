//! API Request Handlers

use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::middleware::RateLimiter;
use super::types::*;
use crate::core::calculator::PremiumCalculator;
use crate::core::rate_table::RateTable;
use crate::models::config::ServerConfig;
use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::MAX_BATCH_SIZE;
use crate::utils::telemetry::TelemetryCollector;

type ApiRejection = (StatusCode, Json<ApiResponse<()>>);

/// Shared application state
pub struct AppState {
    pub calculator: PremiumCalculator,
    pub telemetry: Arc<TelemetryCollector>,
    pub rate_limiter: Arc<RateLimiter>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        table: Arc<RateTable>,
        telemetry: Arc<TelemetryCollector>,
        rate_limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            calculator: PremiumCalculator::new(table),
            telemetry,
            rate_limiter,
            start_time: Instant::now(),
        }
    }

    /// State wired from server configuration
    pub fn from_config(config: &ServerConfig, table: Arc<RateTable>) -> Self {
        Self::new(
            table,
            Arc::new(TelemetryCollector::with_export_dir(config.telemetry_dir.clone())),
            Arc::new(RateLimiter::new(
                config.rate_limit_per_window,
                config.rate_limit_window,
            )),
        )
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Compute one estimate and record it in telemetry
    fn estimate(&self, req: &EstimateRequest) -> AppResult<EstimateData> {
        let started = Instant::now();

        let result = self
            .calculator
            .table()
            .lookup(&req.category)
            .and_then(|(category, profile)| {
                let result = self.calculator.compute_for(category, &req.inputs)?;
                Ok((result, profile.label.clone()))
            });

        match result {
            Ok((result, label)) => {
                self.telemetry.record_estimate(
                    result.category,
                    result.annual_premium,
                    started.elapsed().as_micros() as u64,
                );
                Ok(EstimateData::from_result(result, &label))
            }
            Err(err) => {
                self.telemetry.record_failure(err.code);
                Err(err)
            }
        }
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Map a failed estimate onto a status code and error envelope
fn reject(err: &AppError, req: &EstimateRequest, start: Instant) -> ApiRejection {
    let mut api_error = ApiError::from(err);
    if let Ok(category) = req.category.parse() {
        let missing: Vec<&str> = req
            .inputs
            .missing_fields(category)
            .iter()
            .map(|f| f.as_str())
            .collect();
        if !missing.is_empty() {
            api_error = api_error.with_details(format!("missing: {}", missing.join(", ")));
        }
    }

    let status =
        StatusCode::from_u16(err.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ApiResponse::error(api_error, elapsed_ms(start))))
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let data = HealthData {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        categories: state.calculator.table().len(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}

// ============================================
// Categories
// ============================================

pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<Vec<CategoryData>>> {
    let start = Instant::now();

    let data = state
        .calculator
        .table()
        .iter()
        .map(|(key, profile)| CategoryData::from_profile(key, profile))
        .collect();

    Json(ApiResponse::success(data, elapsed_ms(start)))
}

// ============================================
// Premium Estimate
// ============================================

pub async fn estimate_premium(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EstimateRequest>,
) -> Result<Json<ApiResponse<EstimateData>>, ApiRejection> {
    let start = Instant::now();

    match state.estimate(&req) {
        Ok(data) => {
            info!(
                category = %data.category,
                annual = data.annual_premium,
                "💰 Premium estimated"
            );
            Ok(Json(ApiResponse::success(data, elapsed_ms(start))))
        }
        Err(err) => {
            warn!(code = err.code_str(), category = %req.category, "Estimate rejected: {}", err);
            Err(reject(&err, &req, start))
        }
    }
}

// ============================================
// Batch Estimate
// ============================================

pub async fn batch_estimate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchEstimateRequest>,
) -> Result<Json<ApiResponse<BatchEstimateData>>, ApiRejection> {
    let start = Instant::now();

    if req.requests.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(
                ApiError::bad_request("requests array cannot be empty"),
                elapsed_ms(start),
            )),
        ));
    }

    if req.requests.len() > MAX_BATCH_SIZE {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(
                ApiError::bad_request(format!(
                    "Maximum {} estimates per batch request",
                    MAX_BATCH_SIZE
                )),
                elapsed_ms(start),
            )),
        ));
    }

    // Pure arithmetic, no need to fan out
    let results: Vec<BatchEstimateResult> = req
        .requests
        .iter()
        .map(|item| match state.estimate(item) {
            Ok(estimate) => BatchEstimateResult {
                category: item.category.clone(),
                status: "success".to_string(),
                estimate: Some(estimate),
                error: None,
            },
            Err(err) => BatchEstimateResult {
                category: item.category.clone(),
                status: "error".to_string(),
                estimate: None,
                error: Some(ApiError::from(&err)),
            },
        })
        .collect();

    let total_succeeded = results.iter().filter(|r| r.estimate.is_some()).count();

    info!(
        total = results.len(),
        succeeded = total_succeeded,
        "📦 Batch estimate completed"
    );

    let data = BatchEstimateData {
        total_requested: req.requests.len(),
        total_succeeded,
        total_failed: results.len() - total_succeeded,
        results,
        processing_time_ms: elapsed_ms(start),
    };

    Ok(Json(ApiResponse::success(data, elapsed_ms(start))))
}

// ============================================
// Stats
// ============================================

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<StatsData>> {
    let start = Instant::now();
    let stats = state.telemetry.get_stats();

    let data = StatsData {
        total_estimates: stats.total_estimates,
        total_failures: stats.total_failures,
        estimates_by_category: stats.estimates_by_category,
        failures_by_code: stats.failures_by_code,
        avg_latency_ms: stats.avg_latency_ms,
        avg_annual_premium: stats.avg_annual_premium,
        uptime_seconds: state.uptime_seconds(),
        api_version: env!("CARGO_PKG_VERSION").to_string(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}
