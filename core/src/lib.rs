//! Typed HTTP calls with a uniform result envelope.
//!
//! # Overview
//! `TypedHttpClient` issues GET, form POST, partially-encoded form POST and
//! JSON POST calls through an injected `Transport` and turns every outcome
//! (decoded payload, upstream error status, transport failure, undecodable
//! body) into one `CallResult<T>`. Only precondition violations such as a
//! blank url are returned as `Err(InputError)`, and those never reach the
//! network.
//!
//! # Design
//! - Host-does-IO split: `build_*` produces a plain-data `HttpRequest`,
//!   `normalize` consumes a plain-data `HttpResponse`. `UreqTransport` is the
//!   default blocking transport in between.
//! - The caller states how to decode a success body with `DecodeAs`
//!   (text, primitive or JSON) instead of relying on runtime type checks.
//! - No globals: transport and `ClientConfig` are handed to the constructor.

pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod form;
pub mod http;
pub mod request;
pub mod result;
pub mod transport;

pub use client::TypedHttpClient;
pub use config::{ClientConfig, StatusPolicy, TransportConfig};
pub use decode::DecodeAs;
pub use error::{InputError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use request::CallRequest;
pub use result::{
    CallFailure, CallResult, BAD_REQUEST_PHRASE, DECODE_ERROR_CODE, EMPTY_RESPONSE_MESSAGE,
    HTTP_BAD_REQUEST, TRANSPORT_ERROR_CODE,
};
pub use transport::{Transport, UreqTransport};
