//! Decode strategies for success bodies.
//!
//! The caller picks the strategy when building a `CallRequest`: text targets
//! receive the body verbatim (or parsed with `FromStr` for primitives) and
//! never go through the JSON parser; structured targets are parsed with
//! serde_json.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;

/// How to turn a success body into `T`.
pub enum DecodeAs<T> {
    /// Raw text or a primitive parsed from it. No JSON parsing.
    Text(fn(&str) -> Result<T, String>),
    /// JSON document deserialized into a structured type.
    Json(fn(&str) -> Result<T, String>),
}

impl DecodeAs<String> {
    /// The body itself, unmodified.
    pub fn text() -> Self {
        DecodeAs::Text(|body| Ok(body.to_string()))
    }
}

impl<T> DecodeAs<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    /// A primitive (number, bool, char) parsed from the trimmed body text.
    pub fn primitive() -> Self {
        DecodeAs::Text(|body| body.trim().parse::<T>().map_err(|e| e.to_string()))
    }
}

impl<T: DeserializeOwned> DecodeAs<T> {
    pub fn json() -> Self {
        DecodeAs::Json(|body| serde_json::from_str(body).map_err(|e| e.to_string()))
    }
}

impl<T> DecodeAs<T> {
    pub fn decode(&self, body: &str) -> Result<T, String> {
        match self {
            DecodeAs::Text(f) | DecodeAs::Json(f) => f(body),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, DecodeAs::Text(_))
    }
}

impl<T> Clone for DecodeAs<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for DecodeAs<T> {}

impl<T> fmt::Debug for DecodeAs<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeAs::Text(_) => f.write_str("DecodeAs::Text"),
            DecodeAs::Json(_) => f.write_str("DecodeAs::Json"),
        }
    }
}
