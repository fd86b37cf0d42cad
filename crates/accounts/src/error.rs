//! Service error taxonomy.
//!
//! Every failure a caller can see is a [`ServiceError`]: an [`ErrorCode`]
//! (mapped to an HTTP status), an [`Action`] telling the client what to do
//! next, a message key, an optional detail and an optional per-field error map.

use querygen::QueryError;
use serde::Serialize;
use std::fmt;

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Invalid,
    NotFound,
    Unauthorized,
    Unexpected,
    MethodNotAllowed,
    Forbidden,
    Timeout,
    ServiceUnavailable,
}

impl ErrorCode {
    pub fn http_status(self) -> u16 {
        match self {
            ErrorCode::Invalid => 400,
            ErrorCode::NotFound => 404,
            ErrorCode::Unauthorized => 401,
            ErrorCode::Unexpected => 500,
            ErrorCode::MethodNotAllowed => 405,
            ErrorCode::Forbidden => 403,
            ErrorCode::Timeout => 408,
            ErrorCode::ServiceUnavailable => 503,
        }
    }
}

/// What the client should do about an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    DoNothing = 0,
    ReSignIn = 1,
    Report = 2,
    /// Correct the sent data and request again.
    Resend = 3,
    TryLater = 4,
    RefreshToken = 5,
}

impl Action {
    pub fn as_i64(self) -> i64 {
        self as i64
    }
}

/// A failure reported to the caller of the service.
#[derive(Debug, Clone)]
pub struct ServiceError {
    pub code: ErrorCode,
    pub action: Action,
    /// Message key, e.g. `PageNotFound`.
    pub message: String,
    /// Underlying error text; empty when there is none.
    pub detail: String,
    /// Per-field validation errors.
    pub errors: Option<serde_json::Value>,
}

impl ServiceError {
    pub fn new(
        code: ErrorCode,
        action: Action,
        message: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            code,
            action,
            message: message.into(),
            detail: detail.into(),
            errors: None,
        }
    }

    /// Attach a per-field error map.
    pub fn with_errors(mut self, errors: serde_json::Value) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn internal(err: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::Unexpected,
            Action::Report,
            "InternalServerError",
            err.to_string(),
        )
    }

    pub fn login_please(detail: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, Action::ReSignIn, "LoginPlease", detail)
    }

    pub fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// The body sent back to clients.
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            message: self.message.clone(),
            action: self.action.as_i64(),
            code: self.http_status(),
            errors: self.errors.clone(),
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Code: {} - Action: {} - Message: {}",
            self.http_status(),
            self.action.as_i64(),
            self.message
        )?;
        if !self.detail.is_empty() {
            write!(f, " - Error: {}", self.detail)?;
        }
        Ok(())
    }
}

impl std::error::Error for ServiceError {}

impl From<QueryError> for ServiceError {
    fn from(err: QueryError) -> Self {
        let detail = err.to_string();
        match err {
            QueryError::NotFound(_) => {
                Self::new(ErrorCode::NotFound, Action::DoNothing, "NotFound", detail)
            }
            QueryError::Timeout(_) => Self::new(
                ErrorCode::Timeout,
                Action::TryLater,
                "RequestTimeout",
                detail,
            ),
            QueryError::Pool(_) | QueryError::Connection(_) => Self::new(
                ErrorCode::ServiceUnavailable,
                Action::TryLater,
                "DbNotFound",
                detail,
            ),
            QueryError::Validation(_) => Self::new(
                ErrorCode::Invalid,
                Action::Resend,
                "BodyNotProvidedProperly",
                detail,
            ),
            _ => Self::internal(detail),
        }
    }
}

/// Serialized error body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub action: i64,
    pub code: u16,
    pub errors: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn display_omits_empty_detail() {
        let err = ServiceError::new(ErrorCode::NotFound, Action::DoNothing, "PageNotFound", "");
        assert_eq!(err.to_string(), "Code: 404 - Action: 0 - Message: PageNotFound");

        let err = ServiceError::login_please("token is invalid");
        assert_eq!(
            err.to_string(),
            "Code: 401 - Action: 1 - Message: LoginPlease - Error: token is invalid"
        );
    }

    #[test]
    fn query_errors_map_to_codes_and_actions() {
        let err = ServiceError::from(QueryError::not_found("no rows"));
        assert_eq!((err.code, err.action), (ErrorCode::NotFound, Action::DoNothing));

        let err = ServiceError::from(QueryError::Timeout(Duration::from_secs(1)));
        assert_eq!(err.http_status(), 408);
        assert_eq!(err.action, Action::TryLater);

        let err = ServiceError::from(QueryError::Pool("exhausted".into()));
        assert_eq!(err.http_status(), 503);

        let err = ServiceError::from(QueryError::unexpected("boom", "SELECT 1;"));
        assert_eq!((err.code, err.action), (ErrorCode::Unexpected, Action::Report));
        assert!(err.detail.contains("Query: SELECT 1;"));
    }

    #[test]
    fn response_carries_status_and_errors() {
        let err = ServiceError::new(
            ErrorCode::Invalid,
            Action::Resend,
            "BodyNotProvidedProperly",
            "",
        )
        .with_errors(serde_json::json!({ "phone_number": ["required"] }));
        let body = serde_json::to_value(err.to_response()).unwrap();
        assert_eq!(body["code"], 400);
        assert_eq!(body["action"], 3);
        assert_eq!(body["errors"]["phone_number"][0], "required");
    }
}
