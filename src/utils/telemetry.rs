//! Telemetry Module
//!
//! Collects anonymous statistics about estimates served:
//! - volume per insurance category
//! - failures per error code
//! - latency and average quoted premium
//!
//! Privacy-first: no rating inputs are stored, only counters.

use chrono::Utc;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::models::errors::ErrorCode;
use crate::models::types::InsuranceCategory;
use crate::utils::constants::DEFAULT_TELEMETRY_DIR;

/// Aggregated statistics for reporting
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TelemetryStats {
    /// Estimates computed successfully
    pub total_estimates: u64,
    /// Estimate requests that failed
    pub total_failures: u64,
    pub estimates_by_category: BTreeMap<String, u64>,
    pub failures_by_code: BTreeMap<String, u64>,
    /// Average compute latency (ms)
    pub avg_latency_ms: f64,
    /// Average annual premium quoted
    pub avg_annual_premium: f64,
    /// Period start timestamp
    pub period_start: i64,
    /// Period end timestamp
    pub period_end: i64,
}

impl TelemetryStats {
    /// Human-readable summary for shutdown logs
    pub fn summary(&self) -> String {
        format!(
            "{} estimates ({} failed), avg premium ${:.2}, avg latency {:.3}ms",
            self.total_estimates, self.total_failures, self.avg_annual_premium, self.avg_latency_ms
        )
    }
}

/// Main telemetry collector
pub struct TelemetryCollector {
    total_estimates: AtomicU64,
    total_failures: AtomicU64,
    total_latency_us: AtomicU64,
    total_annual_premium: AtomicU64,
    by_category: DashMap<InsuranceCategory, u64>,
    by_error: DashMap<ErrorCode, u64>,
    /// Session start time
    session_start: i64,
    /// Export directory
    export_dir: PathBuf,
}

impl TelemetryCollector {
    /// Create new collector with default settings
    pub fn new() -> Self {
        Self::with_export_dir(PathBuf::from(DEFAULT_TELEMETRY_DIR))
    }

    /// Create collector exporting into a custom directory
    pub fn with_export_dir(export_dir: PathBuf) -> Self {
        Self {
            total_estimates: AtomicU64::new(0),
            total_failures: AtomicU64::new(0),
            total_latency_us: AtomicU64::new(0),
            total_annual_premium: AtomicU64::new(0),
            by_category: DashMap::new(),
            by_error: DashMap::new(),
            session_start: Utc::now().timestamp(),
            export_dir,
        }
    }

    /// Record a successful estimate
    pub fn record_estimate(&self, category: InsuranceCategory, annual_premium: i64, latency_us: u64) {
        self.total_estimates.fetch_add(1, Ordering::Relaxed);
        self.total_latency_us.fetch_add(latency_us, Ordering::Relaxed);
        self.total_annual_premium
            .fetch_add(annual_premium.max(0) as u64, Ordering::Relaxed);
        *self.by_category.entry(category).or_insert(0) += 1;
    }

    /// Record a failed estimate request
    pub fn record_failure(&self, code: ErrorCode) {
        self.total_failures.fetch_add(1, Ordering::Relaxed);
        *self.by_error.entry(code).or_insert(0) += 1;
    }

    /// Get current statistics
    pub fn get_stats(&self) -> TelemetryStats {
        let total_estimates = self.total_estimates.load(Ordering::Relaxed);
        let total_latency_us = self.total_latency_us.load(Ordering::Relaxed);
        let total_premium = self.total_annual_premium.load(Ordering::Relaxed);

        let (avg_latency_ms, avg_annual_premium) = if total_estimates > 0 {
            (
                total_latency_us as f64 / total_estimates as f64 / 1000.0,
                total_premium as f64 / total_estimates as f64,
            )
        } else {
            (0.0, 0.0)
        };

        TelemetryStats {
            total_estimates,
            total_failures: self.total_failures.load(Ordering::Relaxed),
            estimates_by_category: self
                .by_category
                .iter()
                .map(|e| (e.key().as_str().to_string(), *e.value()))
                .collect(),
            failures_by_code: self
                .by_error
                .iter()
                .map(|e| (e.key().as_str().to_string(), *e.value()))
                .collect(),
            avg_latency_ms,
            avg_annual_premium,
            period_start: self.session_start,
            period_end: Utc::now().timestamp(),
        }
    }

    /// Export current stats to a JSON file in the export directory
    pub fn export_stats_json(&self) -> Result<PathBuf, std::io::Error> {
        fs::create_dir_all(&self.export_dir)?;

        let stats = self.get_stats();
        let filename = format!("stats_{}.json", stats.period_end);
        let path = self.export_dir.join(filename);

        let json = serde_json::to_string_pretty(&stats)?;
        fs::write(&path, json)?;

        Ok(path)
    }

    /// Reset counters (for new reporting period)
    pub fn reset(&self) {
        self.total_estimates.store(0, Ordering::Relaxed);
        self.total_failures.store(0, Ordering::Relaxed);
        self.total_latency_us.store(0, Ordering::Relaxed);
        self.total_annual_premium.store(0, Ordering::Relaxed);
        self.by_category.clear();
        self.by_error.clear();
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let telemetry = TelemetryCollector::new();
        telemetry.record_estimate(InsuranceCategory::Auto, 1200, 40);
        telemetry.record_estimate(InsuranceCategory::Auto, 1548, 60);
        telemetry.record_estimate(InsuranceCategory::Home, 1965, 20);
        telemetry.record_failure(ErrorCode::MissingField);

        let stats = telemetry.get_stats();
        assert_eq!(stats.total_estimates, 3);
        assert_eq!(stats.total_failures, 1);
        assert_eq!(stats.estimates_by_category.get("auto"), Some(&2));
        assert_eq!(stats.estimates_by_category.get("home"), Some(&1));
        assert_eq!(stats.failures_by_code.get("RATE_MISSING_FIELD"), Some(&1));
        assert!((stats.avg_annual_premium - 1571.0).abs() < 1e-9);
        assert!((stats.avg_latency_ms - 0.04).abs() < 1e-9);
    }

    #[test]
    fn test_empty_stats() {
        let stats = TelemetryCollector::new().get_stats();
        assert_eq!(stats.total_estimates, 0);
        assert_eq!(stats.avg_latency_ms, 0.0);
        assert!(stats.summary().contains("0 estimates"));
    }

    #[test]
    fn test_reset() {
        let telemetry = TelemetryCollector::new();
        telemetry.record_estimate(InsuranceCategory::Life, 800, 10);
        telemetry.record_failure(ErrorCode::UnknownCategory);
        telemetry.reset();

        let stats = telemetry.get_stats();
        assert_eq!(stats.total_estimates, 0);
        assert_eq!(stats.total_failures, 0);
        assert!(stats.estimates_by_category.is_empty());
    }

    #[test]
    fn test_export_json() {
        let dir = std::env::temp_dir().join(format!("premium-telemetry-{}", uuid::Uuid::new_v4()));
        let telemetry = TelemetryCollector::with_export_dir(dir.clone());
        telemetry.record_estimate(InsuranceCategory::Health, 2000, 5);

        let path = telemetry.export_stats_json().unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        let stats: TelemetryStats = serde_json::from_str(&raw).unwrap();
        assert_eq!(stats.total_estimates, 1);

        let _ = std::fs::remove_dir_all(dir);
    }
}
