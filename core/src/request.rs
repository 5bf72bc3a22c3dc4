//! Per-call request description.

use serde::Serialize;

use crate::decode::DecodeAs;
use crate::error::InputError;

/// One outbound call: target, headers, parameters, optional JSON body and the
/// decode strategy for a success body.
///
/// Built fresh for every call and borrowed by the client, which never keeps
/// it past the call.
#[derive(Debug, Clone)]
pub struct CallRequest<T> {
    pub(crate) url: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) params: Vec<(String, Option<String>)>,
    pub(crate) body: Option<String>,
    pub(crate) decode: Option<DecodeAs<T>>,
}

impl<T> CallRequest<T> {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            params: Vec::new(),
            body: None,
            decode: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), Some(value.into())));
        self
    }

    /// A parameter that may be null. Null parameters are never sent.
    pub fn param_opt(mut self, key: impl Into<String>, value: Option<String>) -> Self {
        self.params.push((key.into(), value));
        self
    }

    pub fn params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.params
            .extend(params.into_iter().map(|(k, v)| (k.into(), Some(v.into()))));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `value` with serde_json and use it as the body.
    pub fn json_body<B: Serialize + ?Sized>(mut self, value: &B) -> Result<Self, InputError> {
        let body = serde_json::to_string(value)
            .map_err(|e| InputError::BodySerialization(e.to_string()))?;
        self.body = Some(body);
        Ok(self)
    }

    pub fn decode_as(mut self, decode: DecodeAs<T>) -> Self {
        self.decode = Some(decode);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn query_params(&self) -> &[(String, Option<String>)] {
        &self.params
    }

    pub fn body_text(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn decode(&self) -> Option<&DecodeAs<T>> {
        self.decode.as_ref()
    }
}
