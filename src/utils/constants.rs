//! Constants Module - Single Source of Truth
//!
//! Every multiplier, slope and default used by the rating engine and the API
//! lives here. Other modules reference these names instead of literals.

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "PremiumEngine";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Shown next to every estimate
pub const ESTIMATE_DISCLAIMER: &str =
    "This is an estimate. Actual premium may vary based on additional factors and underwriting.";

// ============================================
// RATING FORMULA
// ============================================

/// Age deviation penalty per year for auto policies
pub const AUTO_AGE_SLOPE: f64 = 0.02;

/// Age deviation penalty per year for life and health policies
pub const LIFE_HEALTH_AGE_SLOPE: f64 = 0.03;

/// The age factor never drops below this floor
pub const MIN_AGE_FACTOR: f64 = 1.0;

/// Property value that maps to a property factor of exactly 1.0
pub const REFERENCE_PROPERTY_VALUE: f64 = 300_000.0;

/// Driving history multipliers
pub const DRIVING_EXCELLENT: f64 = 0.8;
pub const DRIVING_GOOD: f64 = 1.0;
pub const DRIVING_FAIR: f64 = 1.5;

/// Health status multipliers
pub const HEALTH_EXCELLENT: f64 = 0.8;
pub const HEALTH_GOOD: f64 = 1.0;
pub const HEALTH_FAIR: f64 = 1.4;

/// Location multipliers
pub const LOCATION_URBAN: f64 = 1.2;
pub const LOCATION_SUBURBAN: f64 = 1.0;
pub const LOCATION_RURAL: f64 = 0.9;

/// Coverage tier multipliers
pub const COVERAGE_BASIC: f64 = 0.8;
pub const COVERAGE_STANDARD: f64 = 1.0;
pub const COVERAGE_PREMIUM: f64 = 1.3;

/// Months used to derive the monthly premium
pub const MONTHS_PER_YEAR: f64 = 12.0;

/// Age range offered by the estimation form (informational, not enforced)
pub const FORM_MIN_AGE: i32 = 18;
pub const FORM_MAX_AGE: i32 = 80;

/// Tolerance when checking that applied weights sum to 1.0
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

// ============================================
// SERVER DEFAULTS
// ============================================

/// Default listen host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default listen port
pub const DEFAULT_PORT: u16 = 8080;

/// Default requests per client per window
pub const DEFAULT_RATE_LIMIT_PER_WINDOW: u32 = 100;

/// Rate limit window (seconds)
pub const RATE_LIMIT_WINDOW_SECS: u64 = 60;

/// How often stale rate limiter entries are purged (seconds)
pub const RATE_LIMIT_CLEANUP_SECS: u64 = 120;

/// Maximum estimates per batch request
pub const MAX_BATCH_SIZE: usize = 100;

/// Default telemetry export directory
pub const DEFAULT_TELEMETRY_DIR: &str = "./telemetry";

// ============================================
// HELPERS
// ============================================

/// Round a currency amount to cents
#[inline]
pub fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Format an amount as `$1234.50`
pub fn format_currency(amount: f64) -> String {
    format!("${:.2}", amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_cents() {
        assert_eq!(round_to_cents(129.0), 129.0);
        assert_eq!(round_to_cents(163.75), 163.75);
        assert_eq!(round_to_cents(1965.0 / 12.0), 163.75);
        assert_eq!(round_to_cents(100.0 / 12.0), 8.33);
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(1548.0), "$1548.00");
        assert_eq!(format_currency(129.0), "$129.00");
        assert_eq!(format_currency(1965.0 / 12.0), "$163.75");
    }
}
