//! Business error codes and their HTTP status mapping.
//!
//! Every code is five characters long. The first character names the
//! origin (`A` for the caller, `B` for this service, `C` for a third
//! party) and the first three characters form the code's *scope*, which
//! selects the HTTP status returned to the client.

use axum::http::StatusCode;
use std::fmt;

/// Scope reported for codes that do not follow the five-character layout.
pub const INVALID_SCOPE: &str = "999";

/// A stable, machine-readable error code with a default message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode {
    code: &'static str,
    message: &'static str,
}

impl ErrorCode {
    pub const fn new(code: &'static str, message: &'static str) -> Self {
        Self { code, message }
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    pub fn message(&self) -> &'static str {
        self.message
    }

    /// The first three characters of the code, or [`INVALID_SCOPE`].
    pub fn scope(&self) -> &'static str {
        scope(self.code)
    }

    /// HTTP status for this code, chosen by scope.
    pub fn status_code(&self) -> StatusCode {
        status_code(self.code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

pub const SUCCESS: ErrorCode = ErrorCode::new("00000", "Success");
pub const CLIENT_ERROR: ErrorCode = ErrorCode::new("A0001", "Client error");
pub const NOT_FOUND: ErrorCode = ErrorCode::new("A0100", "Not found");
pub const ACCESS_PERMISSION_ERROR: ErrorCode = ErrorCode::new("A0200", "Access permission error");
pub const ABNORMAL_USER_OPERATION: ErrorCode = ErrorCode::new("A0300", "Abnormal user operation");
pub const INVALID_PARAMS: ErrorCode = ErrorCode::new("A0400", "Invalid user input");
pub const BLANK_REQUIRED_PARAMS: ErrorCode = ErrorCode::new("A0401", "Required request parameter is blank");
pub const EXCEED_RANGE_PARAMS: ErrorCode =
    ErrorCode::new("A0402", "Request parameter is out of the allowed range");
pub const MALFORMED_PARAMS: ErrorCode = ErrorCode::new("A0403", "Malformed request parameter");
pub const DESERIALIZED_PARAMS: ErrorCode =
    ErrorCode::new("A0404", "Failed to deserialize request parameters");
pub const SENSITIVE_WORDS_PARAMS: ErrorCode =
    ErrorCode::new("A0405", "Request parameter contains sensitive words");
pub const SERVER_ERROR: ErrorCode = ErrorCode::new("A0500", "User request service error");
pub const TOO_MANY_REQUESTS: ErrorCode = ErrorCode::new("A0501", "Too many requests");
pub const CONCURRENT_EXCEED_LIMIT: ErrorCode =
    ErrorCode::new("A0502", "Concurrent requests exceed the limit");
pub const WAIT_USER_OPERATION: ErrorCode = ErrorCode::new("A0503", "Please wait for the user operation");
pub const REPEATED_REQUEST: ErrorCode = ErrorCode::new("A0504", "Repeated request");
pub const ABNORMAL_USER_RESOURCES: ErrorCode = ErrorCode::new("A0600", "Abnormal user resources");
pub const ABNORMAL_USER_VERSION: ErrorCode = ErrorCode::new("A0700", "Abnormal user version");
pub const MISMATCH_USER_VERSION: ErrorCode =
    ErrorCode::new("A0701", "User version does not match the system");
pub const TOO_LOW_USER_VERSION: ErrorCode = ErrorCode::new("A0702", "User version is too low");
pub const TOO_HIGH_USER_VERSION: ErrorCode = ErrorCode::new("A0703", "User version is too high");
pub const EXPIRED_USER_VERSION: ErrorCode = ErrorCode::new("A0704", "User version has expired");
pub const MISMATCH_API_VERSION: ErrorCode = ErrorCode::new("A0705", "API version does not match");
pub const TOO_LOW_API_VERSION: ErrorCode = ErrorCode::new("A0706", "API version is too low");
pub const TOO_HIGH_API_VERSION: ErrorCode = ErrorCode::new("A0707", "API version is too high");
pub const INTERNAL_ERROR: ErrorCode = ErrorCode::new("B0001", "System execution error");
pub const INVALID_STARTUP_PARAMS: ErrorCode = ErrorCode::new("B0002", "Invalid system startup parameters");
pub const SYSTEM_TIMEOUT: ErrorCode = ErrorCode::new("B0100", "System execution timeout");
pub const SYSTEM_RESOURCE_ERROR: ErrorCode = ErrorCode::new("B0200", "System resource error");
pub const READ_DISK_FAILED: ErrorCode = ErrorCode::new("B0201", "Failed to read disk file");
pub const THIRD_PARTY_SERVICE_ERROR: ErrorCode = ErrorCode::new("C0001", "Third-party service error");
pub const MIDDLEWARE_SERVICE_ERROR: ErrorCode = ErrorCode::new("C0100", "Middleware service error");
pub const MIDDLEWARE_SERVICE_TIMEOUT: ErrorCode = ErrorCode::new("C0101", "Middleware service timeout");
pub const DATABASE_SERVICE_ERROR: ErrorCode = ErrorCode::new("C0200", "Database service error");
pub const DATABASE_SERVICE_TIMEOUT: ErrorCode = ErrorCode::new("C0201", "Database service timeout");
pub const NOTIFICATION_SERVICE_ERROR: ErrorCode = ErrorCode::new("C0300", "Notification service error");
pub const NOTIFICATION_SERVICE_TIMEOUT: ErrorCode =
    ErrorCode::new("C0301", "Notification service timeout");

/// Every code defined above, in declaration order.
pub const ALL: &[ErrorCode] = &[
    SUCCESS,
    CLIENT_ERROR,
    NOT_FOUND,
    ACCESS_PERMISSION_ERROR,
    ABNORMAL_USER_OPERATION,
    INVALID_PARAMS,
    BLANK_REQUIRED_PARAMS,
    EXCEED_RANGE_PARAMS,
    MALFORMED_PARAMS,
    DESERIALIZED_PARAMS,
    SENSITIVE_WORDS_PARAMS,
    SERVER_ERROR,
    TOO_MANY_REQUESTS,
    CONCURRENT_EXCEED_LIMIT,
    WAIT_USER_OPERATION,
    REPEATED_REQUEST,
    ABNORMAL_USER_RESOURCES,
    ABNORMAL_USER_VERSION,
    MISMATCH_USER_VERSION,
    TOO_LOW_USER_VERSION,
    TOO_HIGH_USER_VERSION,
    EXPIRED_USER_VERSION,
    MISMATCH_API_VERSION,
    TOO_LOW_API_VERSION,
    TOO_HIGH_API_VERSION,
    INTERNAL_ERROR,
    INVALID_STARTUP_PARAMS,
    SYSTEM_TIMEOUT,
    SYSTEM_RESOURCE_ERROR,
    READ_DISK_FAILED,
    THIRD_PARTY_SERVICE_ERROR,
    MIDDLEWARE_SERVICE_ERROR,
    MIDDLEWARE_SERVICE_TIMEOUT,
    DATABASE_SERVICE_ERROR,
    DATABASE_SERVICE_TIMEOUT,
    NOTIFICATION_SERVICE_ERROR,
    NOTIFICATION_SERVICE_TIMEOUT,
];

/// Returns the scope of a raw code string.
pub fn scope(code: &str) -> &str {
    if code.len() == 5 && code.is_char_boundary(3) {
        &code[..3]
    } else {
        INVALID_SCOPE
    }
}

/// Maps a raw code to an HTTP status by its scope.
///
/// Scopes are compared in a fixed order, so `A0501` (too many requests)
/// lands on the `A05` server-error scope and yields 500.
pub fn status_code(code: &str) -> StatusCode {
    let s = scope(code);
    if s == SUCCESS.scope() {
        StatusCode::OK
    } else if s == NOT_FOUND.scope() {
        StatusCode::NOT_FOUND
    } else if s == SERVER_ERROR.scope() || s == INTERNAL_ERROR.scope() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else if s == INVALID_PARAMS.scope() {
        StatusCode::BAD_REQUEST
    } else if s == ACCESS_PERMISSION_ERROR.scope() {
        StatusCode::UNAUTHORIZED
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}
