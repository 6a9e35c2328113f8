//! Type definitions for the premium estimation engine
//! Insurance categories, rating factor names and the user-supplied rating inputs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::{AppError, AppResult};
use crate::utils::constants::*;

/// Insurance product a quote is requested for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsuranceCategory {
    Auto,
    Home,
    Life,
    Health,
}

impl InsuranceCategory {
    pub const ALL: [InsuranceCategory; 4] = [Self::Auto, Self::Home, Self::Life, Self::Health];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Home => "home",
            Self::Life => "life",
            Self::Health => "health",
        }
    }

    /// Rating inputs the calculator reads for this category, in formula order
    pub fn required_fields(&self) -> &'static [FactorKind] {
        match self {
            Self::Auto => &[FactorKind::Age, FactorKind::DrivingHistory, FactorKind::Coverage],
            Self::Home => &[FactorKind::PropertyValue, FactorKind::Location, FactorKind::Coverage],
            Self::Life | Self::Health => {
                &[FactorKind::Age, FactorKind::HealthStatus, FactorKind::Coverage]
            }
        }
    }
}

impl FromStr for InsuranceCategory {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        match s {
            "auto" => Ok(Self::Auto),
            "home" => Ok(Self::Home),
            "life" => Ok(Self::Life),
            "health" => Ok(Self::Health),
            other => Err(AppError::unknown_category(other)),
        }
    }
}

impl fmt::Display for InsuranceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named rating factor as declared in a category profile
///
/// `HealthStatus` and `HealthHistory` are both fed by the `health_status`
/// input; they only differ in which weight the profile declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorKind {
    Age,
    DrivingHistory,
    PropertyValue,
    Location,
    HealthStatus,
    HealthHistory,
    Coverage,
}

impl FactorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::DrivingHistory => "driving_history",
            Self::PropertyValue => "property_value",
            Self::Location => "location",
            Self::HealthStatus => "health_status",
            Self::HealthHistory => "health_history",
            Self::Coverage => "coverage",
        }
    }
}

/// Driving record (auto)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrivingHistory {
    /// No accidents or claims
    Excellent,
    /// One minor claim
    Good,
    /// Multiple claims
    Fair,
}

impl DrivingHistory {
    pub fn factor(&self) -> f64 {
        match self {
            Self::Excellent => DRIVING_EXCELLENT,
            Self::Good => DRIVING_GOOD,
            Self::Fair => DRIVING_FAIR,
        }
    }
}

/// Property location (home)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Urban,
    Suburban,
    Rural,
}

impl Location {
    pub fn factor(&self) -> f64 {
        match self {
            Self::Urban => LOCATION_URBAN,
            Self::Suburban => LOCATION_SUBURBAN,
            Self::Rural => LOCATION_RURAL,
        }
    }
}

/// Self-reported health (life, health)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Excellent,
    Good,
    Fair,
}

impl HealthStatus {
    pub fn factor(&self) -> f64 {
        match self {
            Self::Excellent => HEALTH_EXCELLENT,
            Self::Good => HEALTH_GOOD,
            Self::Fair => HEALTH_FAIR,
        }
    }
}

/// Coverage tier (all categories)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Coverage {
    Basic,
    Standard,
    Premium,
}

impl Coverage {
    pub fn factor(&self) -> f64 {
        match self {
            Self::Basic => COVERAGE_BASIC,
            Self::Standard => COVERAGE_STANDARD,
            Self::Premium => COVERAGE_PREMIUM,
        }
    }
}

/// User-supplied rating inputs
///
/// Every field is optional so that an absent category-specific input can be
/// reported as a missing field instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingInputs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driving_history: Option<DrivingHistory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_status: Option<HealthStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<Coverage>,
}

impl RatingInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_age(mut self, age: i32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_driving_history(mut self, history: DrivingHistory) -> Self {
        self.driving_history = Some(history);
        self
    }

    pub fn with_property_value(mut self, value: f64) -> Self {
        self.property_value = Some(value);
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_health_status(mut self, status: HealthStatus) -> Self {
        self.health_status = Some(status);
        self
    }

    pub fn with_coverage(mut self, coverage: Coverage) -> Self {
        self.coverage = Some(coverage);
        self
    }

    fn has(&self, kind: FactorKind) -> bool {
        match kind {
            FactorKind::Age => self.age.is_some(),
            FactorKind::DrivingHistory => self.driving_history.is_some(),
            FactorKind::PropertyValue => self.property_value.is_some(),
            FactorKind::Location => self.location.is_some(),
            FactorKind::HealthStatus | FactorKind::HealthHistory => self.health_status.is_some(),
            FactorKind::Coverage => self.coverage.is_some(),
        }
    }

    /// All inputs the category needs that are absent, in formula order
    pub fn missing_fields(&self, category: InsuranceCategory) -> Vec<FactorKind> {
        category
            .required_fields()
            .iter()
            .copied()
            .filter(|kind| !self.has(*kind))
            .collect()
    }

    /// Whether the age falls inside the range the form offers
    pub fn age_in_form_range(&self) -> bool {
        self.age
            .map(|age| (FORM_MIN_AGE..=FORM_MAX_AGE).contains(&age))
            .unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parsing() {
        assert_eq!("auto".parse::<InsuranceCategory>().unwrap(), InsuranceCategory::Auto);
        assert_eq!("health".parse::<InsuranceCategory>().unwrap(), InsuranceCategory::Health);

        let err = "Auto".parse::<InsuranceCategory>().unwrap_err();
        assert_eq!(err.code, crate::models::errors::ErrorCode::UnknownCategory);
        assert!("".parse::<InsuranceCategory>().is_err());
    }

    #[test]
    fn test_missing_fields_for_home() {
        let inputs = RatingInputs::new().with_coverage(Coverage::Basic);
        assert_eq!(
            inputs.missing_fields(InsuranceCategory::Home),
            vec![FactorKind::PropertyValue, FactorKind::Location]
        );
    }

    #[test]
    fn test_missing_fields_ignores_other_categories_inputs() {
        let inputs = RatingInputs::new()
            .with_age(40)
            .with_health_status(HealthStatus::Good)
            .with_coverage(Coverage::Standard);
        assert!(inputs.missing_fields(InsuranceCategory::Life).is_empty());
        assert!(inputs.missing_fields(InsuranceCategory::Health).is_empty());
        assert_eq!(
            inputs.missing_fields(InsuranceCategory::Auto),
            vec![FactorKind::DrivingHistory]
        );
    }

    #[test]
    fn test_inputs_deserialize_lowercase() {
        let inputs: RatingInputs = serde_json::from_str(
            r#"{"age": 45, "driving_history": "fair", "coverage": "premium"}"#,
        )
        .unwrap();
        assert_eq!(inputs.age, Some(45));
        assert_eq!(inputs.driving_history, Some(DrivingHistory::Fair));
        assert_eq!(inputs.coverage, Some(Coverage::Premium));
        assert!(inputs.location.is_none());
    }

    #[test]
    fn test_age_form_range() {
        assert!(RatingInputs::new().with_age(18).age_in_form_range());
        assert!(RatingInputs::new().with_age(80).age_in_form_range());
        assert!(!RatingInputs::new().with_age(17).age_in_form_range());
        assert!(!RatingInputs::new().with_age(121).age_in_form_range());
        assert!(RatingInputs::new().age_in_form_range());
    }

    #[test]
    fn test_factor_multipliers() {
        assert_eq!(Coverage::Standard.factor(), 1.0);
        assert_eq!(DrivingHistory::Fair.factor(), 1.5);
        assert_eq!(HealthStatus::Fair.factor(), 1.4);
        assert_eq!(Location::Rural.factor(), 0.9);
    }
}
