//! Typed error handling for crudkit
//!
//! Errors are grouped by category so callers can match on what went wrong
//! instead of inspecting strings. Every variant knows its HTTP status.
//!
//! # Error Categories
//!
//! - [`FilterError`]: the filter/sort request could not be compiled
//! - [`EntityError`]: entity lookups and writes (not found, conflicts)
//! - [`RequestError`]: malformed request parameters
//! - [`ConfigError`]: configuration parsing and validation
//!
//! # Example
//!
//! ```rust,ignore
//! match service.get_by_id(42).await {
//!     Ok(user) => println!("{:?}", user),
//!     Err(CrudError::Entity(EntityError::NotFound { id, .. })) => println!("{} not found", id),
//!     Err(e) => eprintln!("{}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

/// Result alias used on the request path
pub type CrudResult<T> = Result<T, CrudError>;

/// The main error type of the crate
#[derive(Debug)]
pub enum CrudError {
    /// Filter or sort compilation errors
    Filter(FilterError),

    /// Entity-related errors
    Entity(EntityError),

    /// Malformed request parameters
    Request(RequestError),

    /// Configuration errors
    Config(ConfigError),

    /// Anything else surfaced by a collaborator
    Internal(String),
}

impl fmt::Display for CrudError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrudError::Filter(e) => write!(f, "{}", e),
            CrudError::Entity(e) => write!(f, "{}", e),
            CrudError::Request(e) => write!(f, "{}", e),
            CrudError::Config(e) => write!(f, "{}", e),
            CrudError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for CrudError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CrudError::Filter(e) => Some(e),
            CrudError::Entity(e) => Some(e),
            CrudError::Request(e) => Some(e),
            CrudError::Config(e) => Some(e),
            CrudError::Internal(_) => None,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl CrudError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CrudError::Filter(e) => e.status_code(),
            CrudError::Entity(e) => e.status_code(),
            CrudError::Request(e) => e.status_code(),
            CrudError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CrudError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            CrudError::Filter(e) => e.error_code(),
            CrudError::Entity(e) => e.error_code(),
            CrudError::Request(e) => e.error_code(),
            CrudError::Config(_) => "CONFIG_ERROR",
            CrudError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            CrudError::Entity(EntityError::NotFound { entity_type, id }) => {
                Some(serde_json::json!({ "entity_type": entity_type, "id": id }))
            }
            CrudError::Filter(FilterError::UnsupportedOperator {
                field, operation, ..
            }) => Some(serde_json::json!({ "field": field, "operation": operation })),
            CrudError::Request(
                RequestError::MalformedJson { parameter, .. }
                | RequestError::InvalidParameter { parameter, .. },
            ) => Some(serde_json::json!({ "parameter": parameter })),
            _ => None,
        }
    }
}

impl IntoResponse for CrudError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "request rejected");
        }
        (status, Json(self.to_response())).into_response()
    }
}

// =============================================================================
// Filter Errors
// =============================================================================

/// Errors raised while compiling filter and sort clauses
#[derive(Debug, Clone, PartialEq)]
pub enum FilterError {
    /// Structured filter against a localized text field
    LocalizedField { field: String },

    /// `null` inside a membership list
    NullInList { operation: String },

    /// A list or range element could not be read as the field's type
    InvalidLiteral {
        field: String,
        value: String,
        expected: String,
    },

    /// `between` without exactly two bounds
    InvalidRange { field: String, message: String },

    /// Operator outside the vocabulary
    UnknownOperator { operation: String },

    /// Operator not defined for the field's type
    UnsupportedOperator {
        field: String,
        operation: String,
        kind: String,
    },

    /// Comparison literal rejected in strict mode
    UncoercibleLiteral {
        field: String,
        value: String,
        kind: String,
    },
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::LocalizedField { field } => write!(
                f,
                "Cannot perform filtering on {} field, use the search query for filtering on localized strings",
                field
            ),
            FilterError::NullInList { operation } => {
                write!(f, "Invalid value (null) with ({}) filter operation", operation)
            }
            FilterError::InvalidLiteral {
                field,
                value,
                expected,
            } => write!(
                f,
                "Invalid value '{}' for field '{}': expected {}",
                value, field, expected
            ),
            FilterError::InvalidRange { field, message } => {
                write!(f, "Invalid range for field '{}': {}", field, message)
            }
            FilterError::UnknownOperator { operation } => {
                write!(f, "Invalid operation: {}", operation)
            }
            FilterError::UnsupportedOperator {
                field,
                operation,
                kind,
            } => write!(
                f,
                "Operation '{}' is not supported on {} field '{}'",
                operation, kind, field
            ),
            FilterError::UncoercibleLiteral { field, value, kind } => write!(
                f,
                "Value '{}' cannot be converted to {} for field '{}'",
                value, kind, field
            ),
        }
    }
}

impl std::error::Error for FilterError {}

impl FilterError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            FilterError::LocalizedField { .. } => StatusCode::BAD_REQUEST,
            FilterError::NullInList { .. } => StatusCode::BAD_REQUEST,
            FilterError::InvalidLiteral { .. } => StatusCode::BAD_REQUEST,
            FilterError::InvalidRange { .. } => StatusCode::BAD_REQUEST,
            FilterError::UnknownOperator { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            FilterError::UnsupportedOperator { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            FilterError::UncoercibleLiteral { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            FilterError::LocalizedField { .. } => "LOCALIZED_FIELD_FILTER",
            FilterError::NullInList { .. } => "NULL_IN_LIST",
            FilterError::InvalidLiteral { .. } => "INVALID_LITERAL",
            FilterError::InvalidRange { .. } => "INVALID_RANGE",
            FilterError::UnknownOperator { .. } => "UNKNOWN_OPERATOR",
            FilterError::UnsupportedOperator { .. } => "UNSUPPORTED_OPERATOR",
            FilterError::UncoercibleLiteral { .. } => "UNCOERCIBLE_LITERAL",
        }
    }
}

impl From<FilterError> for CrudError {
    fn from(err: FilterError) -> Self {
        CrudError::Filter(err)
    }
}

// =============================================================================
// Entity Errors
// =============================================================================

/// Errors related to entity lookups and writes
#[derive(Debug, Clone, PartialEq)]
pub enum EntityError {
    NotFound { entity_type: String, id: i64 },

    AlreadyExists { entity_type: String, id: i64 },

    /// Constraint violation surfaced by the persistence collaborator
    Conflict { entity_type: String, message: String },
}

impl fmt::Display for EntityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityError::NotFound { entity_type, id } => {
                write!(f, "{} with id '{}' not found", entity_type, id)
            }
            EntityError::AlreadyExists { entity_type, id } => {
                write!(f, "{} with id '{}' already exists", entity_type, id)
            }
            EntityError::Conflict {
                entity_type,
                message,
            } => write!(f, "Conflict on {}: {}", entity_type, message),
        }
    }
}

impl std::error::Error for EntityError {}

impl EntityError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            EntityError::NotFound { .. } => StatusCode::NOT_FOUND,
            EntityError::AlreadyExists { .. } => StatusCode::CONFLICT,
            EntityError::Conflict { .. } => StatusCode::CONFLICT,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            EntityError::NotFound { .. } => "ENTITY_NOT_FOUND",
            EntityError::AlreadyExists { .. } => "ENTITY_ALREADY_EXISTS",
            EntityError::Conflict { .. } => "ENTITY_CONFLICT",
        }
    }
}

impl From<EntityError> for CrudError {
    fn from(err: EntityError) -> Self {
        CrudError::Entity(err)
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to request parameters
#[derive(Debug, Clone, PartialEq)]
pub enum RequestError {
    /// A JSON-encoded parameter (filters, orders) could not be parsed
    MalformedJson { parameter: String, message: String },

    /// A scalar parameter is out of range
    InvalidParameter { parameter: String, message: String },
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::MalformedJson { parameter, message } => {
                write!(f, "Invalid {} json format: {}", parameter, message)
            }
            RequestError::InvalidParameter { parameter, message } => {
                write!(f, "Invalid parameter '{}': {}", parameter, message)
            }
        }
    }
}

impl std::error::Error for RequestError {}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::MalformedJson { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            RequestError::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::MalformedJson { .. } => "MALFORMED_JSON",
            RequestError::InvalidParameter { .. } => "INVALID_PARAMETER",
        }
    }
}

impl From<RequestError> for CrudError {
    fn from(err: RequestError) -> Self {
        CrudError::Request(err)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    ParseError {
        file: Option<String>,
        message: String,
    },

    InvalidValue {
        field: String,
        value: String,
        message: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError { file, message } => {
                if let Some(file) = file {
                    write!(f, "Failed to parse config file '{}': {}", file, message)
                } else {
                    write!(f, "Failed to parse config: {}", message)
                }
            }
            ConfigError::InvalidValue {
                field,
                value,
                message,
            } => write!(
                f,
                "Invalid value '{}' for field '{}': {}",
                value, field, message
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for CrudError {
    fn from(err: ConfigError) -> Self {
        CrudError::Config(err)
    }
}
