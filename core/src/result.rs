//! The uniform outcome envelope returned by every call.

use std::fmt;

/// Code used for every non-2xx upstream response under `StatusPolicy::Normalize`.
pub const HTTP_BAD_REQUEST: i32 = 400;

/// Code for connect, timeout and I/O failures raised by the transport.
pub const TRANSPORT_ERROR_CODE: i32 = -1;

/// Code for success responses whose body is blank or cannot be decoded.
pub const DECODE_ERROR_CODE: i32 = -2;

/// Message used when a failed upstream response carries no readable body.
pub const BAD_REQUEST_PHRASE: &str = "Bad Request";

/// Prefix of every decode failure message.
pub const EMPTY_RESPONSE_MESSAGE: &str = "empty or invalid response";

/// Outcome of one call: a decoded payload or an error code with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallResult<T> {
    Success(T),
    Failure { code: i32, message: String },
}

impl<T> CallResult<T> {
    pub fn failure(code: i32, message: impl Into<String>) -> Self {
        CallResult::Failure {
            code,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CallResult::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// `0` on success, the failure code otherwise.
    pub fn code(&self) -> i32 {
        match self {
            CallResult::Success(_) => 0,
            CallResult::Failure { code, .. } => *code,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            CallResult::Success(_) => None,
            CallResult::Failure { message, .. } => Some(message),
        }
    }

    pub fn success(self) -> Option<T> {
        match self {
            CallResult::Success(value) => Some(value),
            CallResult::Failure { .. } => None,
        }
    }

    pub fn as_ref(&self) -> CallResult<&T> {
        match self {
            CallResult::Success(value) => CallResult::Success(value),
            CallResult::Failure { code, message } => CallResult::Failure {
                code: *code,
                message: message.clone(),
            },
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> CallResult<U> {
        match self {
            CallResult::Success(value) => CallResult::Success(f(value)),
            CallResult::Failure { code, message } => CallResult::Failure { code, message },
        }
    }

    /// Convert into a `Result` so callers can use `?`.
    pub fn into_result(self) -> Result<T, CallFailure> {
        match self {
            CallResult::Success(value) => Ok(value),
            CallResult::Failure { code, message } => Err(CallFailure { code, message }),
        }
    }
}

impl<T> From<CallResult<T>> for Result<T, CallFailure> {
    fn from(result: CallResult<T>) -> Self {
        result.into_result()
    }
}

/// The failure half of a `CallResult`, usable as a `std::error::Error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallFailure {
    pub code: i32,
    pub message: String,
}

impl fmt::Display for CallFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "call failed with code {}: {}", self.code, self.message)
    }
}

impl std::error::Error for CallFailure {}
