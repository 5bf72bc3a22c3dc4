//! Error types for the typed HTTP client.
//!
//! # Design
//! Only two kinds of failure ever surface as Rust errors. `InputError` is a
//! precondition violation caught before any I/O and returned to the caller
//! as `Err`. `TransportError` is produced by a `Transport` and is always
//! folded into `CallResult::Failure` by the client, never returned directly.

use thiserror::Error;

/// Precondition failures detected before a request is sent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("url must not be empty")]
    EmptyUrl,

    #[error("response type must not be null")]
    MissingResponseType,

    #[error("json body must not be blank")]
    BlankBody,

    /// `CallRequest::json_body` could not serialize the payload.
    #[error("json body could not be serialized: {0}")]
    BodySerialization(String),
}

/// The transport failed to complete the round trip (connect, timeout, I/O).
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
