/// Error Handling Module
///
/// One unified `AppError` for request handling, fed by the domain-specific
/// errors of each layer:
/// 1. `ValidationError` - bad input shape
/// 2. `HashError` - credential hashing
/// 3. `TokenError` - session token issuance and validation
/// 4. `DirectoryError` - account storage
///
/// Only `AppError` is turned into an HTTP response, and the response never
/// carries the internal detail of the error it was built from.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

/// ============================================================================
/// 1. DOMAIN-SPECIFIC ERROR TYPES
/// ============================================================================

/// Validation errors for input data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyField(&'static str),
    TooShort(&'static str, usize),
    TooLong(&'static str, usize),
    InvalidFormat(&'static str),
    SuspiciousContent(&'static str),
    MalformedBody(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "{} is empty", field),
            ValidationError::TooShort(field, min) => {
                write!(f, "{} is too short (minimum {} characters)", field, min)
            }
            ValidationError::TooLong(field, max) => {
                write!(f, "{} is too long (maximum {} characters)", field, max)
            }
            ValidationError::InvalidFormat(field) => write!(f, "{} has invalid format", field),
            ValidationError::SuspiciousContent(field) => {
                write!(f, "{} contains suspicious content", field)
            }
            ValidationError::MalformedBody(msg) => write!(f, "malformed request body: {}", msg),
        }
    }
}

impl StdError for ValidationError {}

/// Password hashing errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    /// The hasher itself failed (entropy, resources, worker pool)
    Failure(String),
    /// A stored hash could not be parsed
    MalformedHash,
}

impl fmt::Display for HashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashError::Failure(msg) => write!(f, "password hashing failed: {}", msg),
            HashError::MalformedHash => write!(f, "stored password hash is malformed"),
        }
    }
}

impl StdError for HashError {}

/// Session token errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The token could not be parsed or its claims are unusable
    Malformed,
    /// Tampered token, wrong secret, or a non-HMAC algorithm
    SignatureInvalid,
    /// The current instant is at or past `exp`
    Expired,
    /// Signing failed while issuing
    IssueFailed(String),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::Malformed => write!(f, "token is malformed"),
            TokenError::SignatureInvalid => write!(f, "token signature is invalid"),
            TokenError::Expired => write!(f, "token has expired"),
            TokenError::IssueFailed(msg) => write!(f, "token issuance failed: {}", msg),
        }
    }
}

impl StdError for TokenError {}

/// Account directory errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// The call did not complete before the deadline
    Timeout(Duration),
    /// The backing store could not be reached
    Unavailable(String),
    /// The email is already owned by another account
    DuplicateEmail,
    Unexpected(String),
}

impl fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectoryError::Timeout(after) => {
                write!(f, "directory call timed out after {}ms", after.as_millis())
            }
            DirectoryError::Unavailable(msg) => write!(f, "directory unavailable: {}", msg),
            DirectoryError::DuplicateEmail => write!(f, "email already registered"),
            DirectoryError::Unexpected(msg) => write!(f, "directory error: {}", msg),
        }
    }
}

impl StdError for DirectoryError {}

impl From<sqlx::Error> for DirectoryError {
    fn from(err: sqlx::Error) -> Self {
        // 23505 = unique_violation
        if let Some(db_err) = err.as_database_error() {
            if db_err.code().as_deref() == Some("23505") {
                return DirectoryError::DuplicateEmail;
            }
        }

        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DirectoryError::Unavailable(err.to_string())
            }
            other => DirectoryError::Unexpected(other.to_string()),
        }
    }
}

/// ============================================================================
/// 2. UNIFIED APPLICATION ERROR TYPE
/// ============================================================================

/// Central error type that every request-scoped failure maps to
#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    DuplicateAccount,
    /// Unknown email and wrong password are deliberately the same variant
    InvalidCredentials,
    /// Missing, malformed, forged or expired token
    Unauthenticated,
    NotFound(String),
    DependencyUnavailable(String),
    HashingFailure(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::DuplicateAccount => write!(f, "An account with this email already exists"),
            AppError::InvalidCredentials => write!(f, "Invalid email or password"),
            AppError::Unauthenticated => write!(f, "Authentication required"),
            AppError::NotFound(what) => write!(f, "{} not found", what),
            AppError::DependencyUnavailable(msg) => write!(f, "Dependency unavailable: {}", msg),
            AppError::HashingFailure(msg) => write!(f, "Hashing failure: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

// ============================================================================
// FROM IMPLEMENTATIONS
// ============================================================================

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<HashError> for AppError {
    fn from(err: HashError) -> Self {
        AppError::HashingFailure(err.to_string())
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::IssueFailed(msg) => AppError::Internal(msg),
            _ => AppError::Unauthenticated,
        }
    }
}

impl From<DirectoryError> for AppError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::DuplicateEmail => AppError::DuplicateAccount,
            DirectoryError::Timeout(_) | DirectoryError::Unavailable(_) => {
                AppError::DependencyUnavailable(err.to_string())
            }
            DirectoryError::Unexpected(msg) => AppError::DependencyUnavailable(msg),
        }
    }
}

// ============================================================================
// 3. HTTP RESPONSE MAPPING
// ============================================================================

/// Error response structure for HTTP responses
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// Unique error ID, also present in the server log line
    pub error_id: String,
    /// Human-readable error message
    pub message: String,
    /// Error code for client-side handling
    pub code: String,
    /// HTTP status code
    pub status: u16,
    /// Timestamp when error occurred
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, message: String, code: String, status: u16) -> Self {
        Self {
            error_id,
            message,
            code,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Trait for converting errors to HTTP responses with proper logging
pub trait ErrorHandler {
    fn error_response(&self, error_id: &str) -> (StatusCode, ErrorResponse);
    fn log_error(&self, error_id: &str);
}

impl AppError {
    /// Wire code and the message safe to show a caller
    fn public_parts(&self) -> (&'static str, String) {
        match self {
            AppError::Validation(e) => ("VALIDATION_ERROR", e.to_string()),
            AppError::DuplicateAccount => ("DUPLICATE_ACCOUNT", self.to_string()),
            AppError::InvalidCredentials => ("INVALID_CREDENTIALS", self.to_string()),
            AppError::Unauthenticated => ("UNAUTHENTICATED", self.to_string()),
            AppError::NotFound(_) => ("NOT_FOUND", self.to_string()),
            AppError::DependencyUnavailable(_) => (
                "DEPENDENCY_UNAVAILABLE",
                "A required service is temporarily unavailable".to_string(),
            ),
            AppError::HashingFailure(_) | AppError::Internal(_) => {
                ("INTERNAL_ERROR", "Internal server error".to_string())
            }
        }
    }
}

impl ErrorHandler for AppError {
    fn error_response(&self, error_id: &str) -> (StatusCode, ErrorResponse) {
        let status = ResponseError::status_code(self);
        let (code, message) = self.public_parts();

        let error_response = ErrorResponse::new(
            error_id.to_string(),
            message,
            code.to_string(),
            status.as_u16(),
        );

        (status, error_response)
    }

    fn log_error(&self, error_id: &str) {
        match self {
            AppError::Validation(e) => {
                tracing::warn!(error_id = error_id, error = %e, "Validation error");
            }
            AppError::DuplicateAccount => {
                tracing::warn!(error_id = error_id, "Duplicate registration attempt");
            }
            AppError::InvalidCredentials => {
                tracing::warn!(error_id = error_id, "Invalid credentials attempt");
            }
            AppError::Unauthenticated => {
                tracing::warn!(error_id = error_id, "Unauthenticated request");
            }
            AppError::NotFound(what) => {
                tracing::debug!(error_id = error_id, resource = %what, "Resource not found");
            }
            AppError::DependencyUnavailable(msg) => {
                tracing::error!(error_id = error_id, error = %msg, "Dependency unavailable");
            }
            AppError::HashingFailure(msg) => {
                tracing::error!(error_id = error_id, error = %msg, "Hashing failure");
            }
            AppError::Internal(msg) => {
                tracing::error!(error_id = error_id, error = %msg, "Internal error");
            }
        }
    }
}

/// Implement ResponseError for Actix-web integration
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let error_id = uuid::Uuid::new_v4().to_string();
        self.log_error(&error_id);

        let (status, error_response) = <Self as ErrorHandler>::error_response(self, &error_id);

        HttpResponse::build(status).json(error_response)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateAccount => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DependencyUnavailable(_)
            | AppError::HashingFailure(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::EmptyField("email");
        assert_eq!(err.to_string(), "email is empty");
    }

    #[test]
    fn test_app_error_conversion() {
        let app_err: AppError = ValidationError::InvalidFormat("email").into();
        assert!(matches!(app_err, AppError::Validation(_)));
    }

    #[test]
    fn test_every_token_failure_is_unauthenticated() {
        for err in [TokenError::Malformed, TokenError::SignatureInvalid, TokenError::Expired] {
            let app_err: AppError = err.into();
            assert!(matches!(app_err, AppError::Unauthenticated));
            assert_eq!(app_err.status_code(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_directory_errors_map_to_status() {
        let timeout: AppError = DirectoryError::Timeout(Duration::from_secs(10)).into();
        assert!(matches!(timeout, AppError::DependencyUnavailable(_)));
        assert_eq!(timeout.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let duplicate: AppError = DirectoryError::DuplicateEmail.into();
        assert_eq!(duplicate.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_error_response_hides_internal_detail() {
        let err = AppError::DependencyUnavailable("connection refused to 10.0.0.5".to_string());
        let (status, body) = <AppError as ErrorHandler>::error_response(&err, "test-123");

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error_id, "test-123");
        assert_eq!(body.code, "DEPENDENCY_UNAVAILABLE");
        assert!(!body.message.contains("10.0.0.5"));
    }

    #[test]
    fn test_hashing_failure_is_generic_internal_error() {
        let err: AppError = HashError::Failure("rng exhausted".to_string()).into();
        let (status, body) = <AppError as ErrorHandler>::error_response(&err, "id");

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.code, "INTERNAL_ERROR");
        assert!(!body.message.contains("rng"));
    }
}
