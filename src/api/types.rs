//! API Request/Response Types

use serde::{Deserialize, Serialize};

use crate::core::calculator::{EstimateResult, FactorContribution};
use crate::core::rate_table::CategoryProfile;
use crate::models::errors::AppError;
use crate::models::types::{FactorKind, InsuranceCategory, RatingInputs};
use crate::utils::constants::{ESTIMATE_DISCLAIMER, FORM_MAX_AGE, FORM_MIN_AGE};

/// API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    pub latency_ms: f64,
    pub timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, latency_ms: f64) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(error: ApiError, latency_ms: f64) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// API Error
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "API_BAD_REQUEST".to_string(),
            message: message.into(),
            field: None,
            details: None,
        }
    }

    pub fn rate_limited(retry_after: u64) -> Self {
        Self {
            code: "API_RATE_LIMITED".to_string(),
            message: format!("Rate limit exceeded. Retry after {} seconds", retry_after),
            field: None,
            details: Some(format!("retry_after: {}", retry_after)),
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl From<&AppError> for ApiError {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code_str().to_string(),
            message: err.user_message(),
            field: err.field.map(str::to_string),
            details: None,
        }
    }
}

// ============================================
// Premium Estimate
// ============================================

/// One estimate request: category key plus flattened rating inputs
#[derive(Debug, Clone, Deserialize)]
pub struct EstimateRequest {
    pub category: String,
    #[serde(flatten)]
    pub inputs: RatingInputs,
}

#[derive(Debug, Serialize)]
pub struct EstimateData {
    pub estimate_id: String,
    pub category: InsuranceCategory,
    pub label: String,
    pub annual_premium: i64,
    /// Rounded to cents
    pub monthly_premium: f64,
    pub annual_premium_display: String,
    pub monthly_premium_display: String,
    pub multiplier: f64,
    pub breakdown: Vec<FactorContributionResponse>,
    pub disclaimer: String,
}

#[derive(Debug, Serialize)]
pub struct FactorContributionResponse {
    pub factor: String,
    pub value: f64,
    pub weight: f64,
    pub contribution: f64,
    pub reason: String,
}

impl From<FactorContribution> for FactorContributionResponse {
    fn from(f: FactorContribution) -> Self {
        Self {
            factor: f.factor.as_str().to_string(),
            value: f.value,
            weight: f.weight,
            contribution: f.contribution,
            reason: f.reason,
        }
    }
}

impl EstimateData {
    pub fn from_result(result: EstimateResult, label: &str) -> Self {
        Self {
            estimate_id: uuid::Uuid::new_v4().to_string(),
            category: result.category,
            label: label.to_string(),
            annual_premium: result.annual_premium,
            monthly_premium: result.monthly_premium_cents(),
            annual_premium_display: result.annual_display(),
            monthly_premium_display: result.monthly_display(),
            multiplier: result.multiplier,
            breakdown: result.breakdown.into_iter().map(Into::into).collect(),
            disclaimer: ESTIMATE_DISCLAIMER.to_string(),
        }
    }
}

// ============================================
// Batch Estimate
// ============================================

#[derive(Debug, Deserialize)]
pub struct BatchEstimateRequest {
    pub requests: Vec<EstimateRequest>,
}

#[derive(Debug, Serialize)]
pub struct BatchEstimateData {
    pub total_requested: usize,
    pub total_succeeded: usize,
    pub total_failed: usize,
    pub results: Vec<BatchEstimateResult>,
    pub processing_time_ms: f64,
}

#[derive(Debug, Serialize)]
pub struct BatchEstimateResult {
    pub category: String,
    pub status: String, // "success" | "error"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate: Option<EstimateData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

// ============================================
// Categories
// ============================================

#[derive(Debug, Serialize)]
pub struct CategoryData {
    pub key: InsuranceCategory,
    pub label: String,
    pub base_price: f64,
    pub required_fields: Vec<String>,
    pub factors: Vec<FactorData>,
    pub declared_weight_sum: f64,
    pub min_age: i32,
    pub max_age: i32,
}

#[derive(Debug, Serialize)]
pub struct FactorData {
    pub name: String,
    pub weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline: Option<f64>,
}

impl CategoryData {
    pub fn from_profile(key: InsuranceCategory, profile: &CategoryProfile) -> Self {
        Self {
            key,
            label: profile.label.clone(),
            base_price: profile.base_price,
            required_fields: key
                .required_fields()
                .iter()
                .map(|f: &FactorKind| f.as_str().to_string())
                .collect(),
            factors: profile
                .factors
                .iter()
                .map(|(kind, factor)| FactorData {
                    name: kind.as_str().to_string(),
                    weight: factor.weight,
                    baseline: factor.baseline,
                })
                .collect(),
            declared_weight_sum: profile.declared_weight_sum(),
            min_age: FORM_MIN_AGE,
            max_age: FORM_MAX_AGE,
        }
    }
}

// ============================================
// Stats / Telemetry
// ============================================

#[derive(Debug, Serialize)]
pub struct StatsData {
    pub total_estimates: u64,
    pub total_failures: u64,
    pub estimates_by_category: std::collections::BTreeMap<String, u64>,
    pub failures_by_code: std::collections::BTreeMap<String, u64>,
    pub avg_latency_ms: f64,
    pub avg_annual_premium: f64,
    pub uptime_seconds: u64,
    pub api_version: String,
}

// ============================================
// Health Check
// ============================================

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub categories: usize,
}
