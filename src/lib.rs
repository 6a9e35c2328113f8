//! Premium Engine Library
//!
//! Insurance premium estimation: a static rate table of categories and
//! weighted rating factors, a pure calculator that blends those factors into
//! an annual and monthly premium, and a small HTTP API serving estimates to
//! the customer portal.

pub mod api;
pub mod core;
pub mod models;
pub mod utils;

pub use crate::core::{compute, EstimateResult, FactorContribution, PremiumCalculator};
pub use crate::core::{CategoryProfile, RateTable, RatingFactor};
pub use models::{AppError, AppResult, ErrorCode, ServerConfig};
pub use models::{
    Coverage, DrivingHistory, FactorKind, HealthStatus, InsuranceCategory, Location, RatingInputs,
};
pub use utils::{TelemetryCollector, TelemetryStats};
