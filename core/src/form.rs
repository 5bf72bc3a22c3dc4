//! Query string and `application/x-www-form-urlencoded` body encoding.

use tracing::warn;
use url::form_urlencoded::byte_serialize;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

fn encode(s: &str) -> String {
    byte_serialize(s.as_bytes()).collect()
}

/// Append `params` to `url` as `?k=v&k2=v2`, in the order given.
///
/// Parameters without a value are skipped. With nothing to append the url is
/// returned unchanged.
pub fn encode_query(url: &str, params: &[(String, Option<String>)]) -> String {
    let mut out = url.to_string();
    let mut first = true;
    for (key, value) in params {
        let Some(value) = value else {
            warn!(key = %key, "skipping query parameter with null value");
            continue;
        };
        out.push(if first { '?' } else { '&' });
        first = false;
        out.push_str(&encode(key));
        out.push('=');
        out.push_str(&encode(value));
    }
    out
}

/// Ordered form body. `add` percent-encodes, `add_encoded` trusts the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormBody {
    pairs: Vec<(String, String)>,
}

impl FormBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: &str, value: &str) -> &mut Self {
        self.pairs.push((encode(key), encode(value)));
        self
    }

    /// Add a pair whose key and value are already encoded.
    pub fn add_encoded(&mut self, key: &str, value: &str) -> &mut Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn encode(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}
