use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

use crate::core::entity::EntityId;

/// Application-wide Result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type of the data-access layer
pub type DataResult<T> = std::result::Result<T, DataError>;

/// Result type of store implementations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Main application error type
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Validation errors for business rules
    #[error("Validation error: {0}")]
    Validation(String),

    /// Data-access layer errors (store failures and misuse)
    #[error(transparent)]
    Data(#[from] DataError),

    /// Database connection setup errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unauthorized access
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Requested API version is not served
    #[error("Unsupported API version: {0}")]
    UnsupportedApiVersion(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors raised by repositories, sessions and units of work.
///
/// `Store` failures are passed through untouched. Every other variant is a
/// programming error and is never retried.
#[derive(thiserror::Error, Debug)]
pub enum DataError {
    #[error("Store failure: {0}")]
    Store(#[from] StoreError),

    #[error("Unit of work {0} was used after dispose")]
    Disposed(uuid::Uuid),

    #[error("Entity type `{0}` has no store mapping")]
    Unmapped(&'static str),

    #[error("Entity of table `{0}` has no identifier")]
    MissingKey(&'static str),

    #[error("Invalid model: {0}")]
    InvalidModel(String),
}

impl DataError {
    /// True for errors caused by misuse of the data-access API rather than the store.
    pub fn is_misuse(&self) -> bool {
        !matches!(self, DataError::Store(_))
    }
}

impl From<serde_json::Error> for DataError {
    fn from(value: serde_json::Error) -> Self {
        DataError::Store(StoreError::Serialization(value))
    }
}

impl From<sqlx::Error> for DataError {
    fn from(value: sqlx::Error) -> Self {
        DataError::Store(StoreError::Database(value))
    }
}

/// Failures reported by the persisted store.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Constraint `{constraint}` violated on `{table}`")]
    ConstraintViolation {
        table: &'static str,
        constraint: String,
    },

    #[error("Row {id} of `{table}` was modified or removed concurrently")]
    ConcurrencyConflict { table: &'static str, id: EntityId },

    #[error("Document serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// True when the store rejected a write because of a unique/foreign-key constraint.
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            StoreError::ConstraintViolation { .. } => true,
            StoreError::Database(err) => err
                .as_database_error()
                .map(|db_err| db_err.is_unique_violation() || db_err.is_foreign_key_violation())
                .unwrap_or(false),
            _ => false,
        }
    }

    pub fn is_concurrency_conflict(&self) -> bool {
        matches!(self, StoreError::ConcurrencyConflict { .. })
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let error_message = match self {
            // Misuse is a server bug; keep details in the logs
            AppError::Data(err) if err.is_misuse() => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        HttpResponse::build(status_code).json(serde_json::json!({
            "error": {
                "message": error_message,
                "code": status_code.as_u16(),
            }
        }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Data(DataError::Store(err))
                if err.is_constraint_violation() || err.is_concurrency_conflict() =>
            {
                StatusCode::CONFLICT
            }
            AppError::Data(DataError::Store(StoreError::Unavailable(_))) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Data(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::UnsupportedApiVersion(_) => StatusCode::BAD_REQUEST,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Helper functions for common error scenarios
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        AppError::NotFound(resource.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        AppError::Unauthorized(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
