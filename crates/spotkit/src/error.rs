//! Error types for Spot API operations.
//!
//! Errors are categorized so the CLI can print actionable advice, and vendor
//! error codes are decoded so "resource does not exist" can be told apart
//! from every other failure.

use declarative::RemoteFailure;
use serde_json::Value;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Result type alias for Spot API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of Spot API errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Network-related errors and server-side failures.
    Network,
    /// Missing or rejected credentials.
    Auth,
    /// The addressed resource does not exist.
    NotFound,
    /// The API rejected the request payload.
    Validation,
    /// Unexpected response shape.
    Format,
    /// Local file errors.
    Io,
    /// Other/unknown errors.
    Other,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Network connectivity issue",
            Self::Auth => "Authentication failed",
            Self::NotFound => "Resource not found",
            Self::Validation => "Request rejected by the Spot API",
            Self::Format => "Invalid API response",
            Self::Io => "File access failed",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check your internet connection and try again",
            Self::Auth => {
                "Set --token, SPOTINST_TOKEN or a token in ~/.spotinst/credentials, and check the account id"
            }
            Self::NotFound => "Verify the resource id and the account it belongs to",
            Self::Validation => "Check the configuration document against the Spot API reference",
            Self::Format => "The API returned something unexpected, retry with -vv for details",
            Self::Io => "Check that the file exists and is readable",
            Self::Other => "Check the error details for more information",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Vendor error codes the client understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ManagedInstanceDoesNotExist,
    GroupDoesNotExist,
    ClusterDoesNotExist,
    AccountDoesNotExist,
    UserDoesNotExist,
    Unauthorized,
}

impl ErrorCode {
    /// Decode a vendor error code string.
    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "MANAGED_INSTANCE_DOES_NOT_EXIST" => Some(Self::ManagedInstanceDoesNotExist),
            "GROUP_DOESNT_EXIST" => Some(Self::GroupDoesNotExist),
            "CLUSTER_DOESNT_EXIST" => Some(Self::ClusterDoesNotExist),
            "ACCOUNT_DOES_NOT_EXIST" => Some(Self::AccountDoesNotExist),
            "USER_DOES_NOT_EXIST" => Some(Self::UserDoesNotExist),
            "UNAUTHORIZED" => Some(Self::Unauthorized),
            _ => None,
        }
    }

    /// The wire representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ManagedInstanceDoesNotExist => "MANAGED_INSTANCE_DOES_NOT_EXIST",
            Self::GroupDoesNotExist => "GROUP_DOESNT_EXIST",
            Self::ClusterDoesNotExist => "CLUSTER_DOESNT_EXIST",
            Self::AccountDoesNotExist => "ACCOUNT_DOES_NOT_EXIST",
            Self::UserDoesNotExist => "USER_DOES_NOT_EXIST",
            Self::Unauthorized => "UNAUTHORIZED",
        }
    }

    /// Whether the code means the addressed resource does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        !matches!(self, Self::Unauthorized)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while talking to the Spot API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The API answered with an error envelope.
    #[error("Spot API error (HTTP {status}{}): {message}", code_suffix(.code))]
    Api {
        /// HTTP status code.
        status: u16,
        /// First vendor error code, if any.
        code: Option<String>,
        /// First vendor error message.
        message: String,
        /// Raw response body.
        payload: Value,
    },

    /// HTTP transport failed.
    #[error("HTTP request failed: {message}")]
    Http {
        /// Error message.
        message: String,
        /// HTTP status code if available.
        status: Option<u16>,
    },

    /// Response did not have the expected shape.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),

    /// No usable credentials.
    #[error("credentials error: {0}")]
    Credentials(String),

    /// IO error reading a local file.
    #[error("IO error at {path}: {source}")]
    Io {
        /// Path involved in the error.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// The resource kind does not support the requested operation.
    #[error("{kind} does not support {operation}")]
    Unsupported {
        /// Resource kind.
        kind: &'static str,
        /// Requested operation.
        operation: String,
    },
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_ref().map(|c| format!(", {c}")).unwrap_or_default()
}

impl Error {
    /// Create an IO error with path context.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an HTTP error.
    pub fn http(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Http {
            message: message.into(),
            status,
        }
    }

    /// The decoded vendor error code, if this is an API error with a known code.
    #[must_use]
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Api { code: Some(code), .. } => ErrorCode::parse(code),
            _ => None,
        }
    }

    /// Whether the API reported that the addressed resource does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.code().is_some_and(|c| c.is_not_found())
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Api { status, .. } => {
                if self.is_not_found() {
                    ErrorCategory::NotFound
                } else if matches!(status, 401 | 403)
                    || self.code() == Some(ErrorCode::Unauthorized)
                {
                    ErrorCategory::Auth
                } else if *status >= 500 {
                    ErrorCategory::Network
                } else {
                    ErrorCategory::Validation
                }
            }
            Error::Http { .. } => ErrorCategory::Network,
            Error::InvalidResponse(_) => ErrorCategory::Format,
            Error::Credentials(_) => ErrorCategory::Auth,
            Error::Io { .. } => ErrorCategory::Io,
            Error::Unsupported { .. } => ErrorCategory::Other,
        }
    }
}

impl RemoteFailure for Error {
    fn is_not_found(&self) -> bool {
        Error::is_not_found(self)
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::Http {
                message: format!("HTTP {code}"),
                status: Some(code),
            },
            other => Self::Http {
                message: other.to_string(),
                status: None,
            },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn api(status: u16, code: Option<&str>) -> Error {
        Error::Api {
            status,
            code: code.map(str::to_string),
            message: "boom".into(),
            payload: json!({}),
        }
    }

    #[test]
    fn test_error_code_round_trip_known_codes() {
        for code in [
            ErrorCode::ManagedInstanceDoesNotExist,
            ErrorCode::GroupDoesNotExist,
            ErrorCode::ClusterDoesNotExist,
            ErrorCode::AccountDoesNotExist,
            ErrorCode::UserDoesNotExist,
            ErrorCode::Unauthorized,
        ] {
            assert_eq!(ErrorCode::parse(code.as_str()), Some(code));
        }
        assert_eq!(ErrorCode::parse("SOMETHING_ELSE"), None);
    }

    #[test]
    fn test_not_found_needs_explicit_code() {
        assert!(api(400, Some("MANAGED_INSTANCE_DOES_NOT_EXIST")).is_not_found());
        assert!(api(400, Some("USER_DOES_NOT_EXIST")).is_not_found());
        // A bare 404 without a known code is not treated as "already gone".
        assert!(!api(404, None).is_not_found());
        assert!(!api(400, Some("UNAUTHORIZED")).is_not_found());
        assert!(!Error::http("reset", None).is_not_found());
    }

    #[test]
    fn test_remote_failure_delegates() {
        let err = api(400, Some("GROUP_DOESNT_EXIST"));
        assert!(RemoteFailure::is_not_found(&err));
    }

    #[test]
    fn test_api_error_category() {
        assert_eq!(
            api(400, Some("CLUSTER_DOESNT_EXIST")).category(),
            ErrorCategory::NotFound
        );
        assert_eq!(api(401, None).category(), ErrorCategory::Auth);
        assert_eq!(api(400, Some("UNAUTHORIZED")).category(), ErrorCategory::Auth);
        assert_eq!(api(503, None).category(), ErrorCategory::Network);
        assert_eq!(api(400, Some("VALIDATION")).category(), ErrorCategory::Validation);
    }

    #[test]
    fn test_other_categories() {
        assert_eq!(Error::http("x", Some(502)).category(), ErrorCategory::Network);
        assert_eq!(
            Error::InvalidResponse("x".into()).category(),
            ErrorCategory::Format
        );
        assert_eq!(Error::Credentials("x".into()).category(), ErrorCategory::Auth);
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert_eq!(Error::io("/tmp/x", io_err).category(), ErrorCategory::Io);
    }

    #[test]
    fn test_category_advice_not_empty() {
        for category in [
            ErrorCategory::Network,
            ErrorCategory::Auth,
            ErrorCategory::NotFound,
            ErrorCategory::Validation,
            ErrorCategory::Format,
            ErrorCategory::Io,
            ErrorCategory::Other,
        ] {
            assert!(!category.advice().is_empty());
            assert!(!category.description().is_empty());
        }
    }

    #[test]
    fn test_api_error_display() {
        let err = api(400, Some("GROUP_DOESNT_EXIST"));
        let display = err.to_string();
        assert!(display.contains("HTTP 400"));
        assert!(display.contains("GROUP_DOESNT_EXIST"));
        assert!(display.contains("boom"));

        assert_eq!(api(500, None).to_string(), "Spot API error (HTTP 500): boom");
    }

    #[test]
    fn test_from_serde_error() {
        let err: Error = serde_json::from_str::<Value>("{").unwrap_err().into();
        assert!(matches!(err, Error::InvalidResponse(_)));
    }
}
