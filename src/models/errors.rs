//! Centralized Error Handling Module
//!
//! Every failure carries a unique error code so it can be logged, counted in
//! telemetry and mapped onto an HTTP status without string matching.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - RATE_xxx: Rating / estimation errors
//! - API_xxx: API errors
//! - CFG_xxx: Configuration errors

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Input field the error refers to, for field-level validation messages
    pub field: Option<&'static str>,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // ============================================
    // Rating Errors (1xx)
    // ============================================
    /// Category key not present in the rate table
    UnknownCategory,
    /// A category-specific rating input is absent
    MissingField,

    // ============================================
    // API Errors (3xx)
    // ============================================
    /// Invalid request format
    ApiBadRequest,
    /// Rate limit exceeded
    ApiRateLimited,
    /// Internal server error
    ApiInternalError,

    // ============================================
    // Configuration Errors (4xx)
    // ============================================
    /// Invalid configuration value
    ConfigInvalidValue,
    /// Rate table document failed to parse or validate
    ConfigInvalidRateTable,

    // ============================================
    // Generic Errors (9xx)
    // ============================================
    /// Unknown error
    Unknown,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownCategory => "RATE_UNKNOWN_CATEGORY",
            Self::MissingField => "RATE_MISSING_FIELD",

            Self::ApiBadRequest => "API_BAD_REQUEST",
            Self::ApiRateLimited => "API_RATE_LIMITED",
            Self::ApiInternalError => "API_INTERNAL_ERROR",

            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",
            Self::ConfigInvalidRateTable => "CFG_INVALID_RATE_TABLE",

            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Get HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::UnknownCategory | Self::ApiBadRequest => 400,
            Self::MissingField => 422,
            Self::ApiRateLimited => 429,
            _ => 500,
        }
    }

    /// True for failures the user can fix by correcting the form
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::UnknownCategory | Self::MissingField)
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Category key not in the rate table
    pub fn unknown_category(key: &str) -> Self {
        Self::new(
            ErrorCode::UnknownCategory,
            format!("Unknown insurance category '{}'", key),
        )
    }

    /// Required rating input absent
    pub fn missing_field(field: &'static str) -> Self {
        Self {
            code: ErrorCode::MissingField,
            message: format!("Missing required field: {}", field),
            field: Some(field),
            source: None,
        }
    }

    /// Invalid configuration value
    pub fn invalid_config(name: &str, value: &str) -> Self {
        Self::new(
            ErrorCode::ConfigInvalidValue,
            format!("Invalid value for {}: '{}'", name, value),
        )
    }

    /// Rate table rejected
    pub fn invalid_rate_table(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalidRateTable, msg)
    }

    /// API bad request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiBadRequest, msg)
    }

    /// API internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiInternalError, msg)
    }

    /// Message suitable for showing next to the estimation form
    pub fn user_message(&self) -> String {
        match (self.code, self.field) {
            (ErrorCode::UnknownCategory, _) => "Please select a valid insurance type".to_string(),
            (ErrorCode::MissingField, Some(field)) => {
                format!("Please provide a value for {}", field)
            }
            _ => self.message.clone(),
        }
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        Self::new(ErrorCode::Unknown, err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorCode::Unknown, "IO error", err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::ConfigInvalidRateTable, "JSON parse error", err)
    }
}
