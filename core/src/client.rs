//! Typed HTTP calls with one normalized outcome per call.
//!
//! # Design
//! Every operation is split into a pure `build_*` method that validates the
//! `CallRequest` and produces an `HttpRequest`, and `normalize`, which folds
//! whatever the transport produced into a `CallResult`. The `get`/`post`/...
//! methods just compose the two around `Transport::execute`.
//!
//! Precondition violations are returned as `Err(InputError)` before any I/O.
//! Everything that can go wrong during the round trip ends up in
//! `CallResult::Failure`.
//!
//! The client holds only its transport and an immutable config, so a single
//! instance can serve concurrent callers.

use tracing::{error, warn};

use crate::config::{ClientConfig, StatusPolicy};
use crate::decode::DecodeAs;
use crate::error::{InputError, TransportError};
use crate::form::{encode_query, FormBody, FORM_CONTENT_TYPE, JSON_CONTENT_TYPE};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::request::CallRequest;
use crate::result::{
    CallResult, BAD_REQUEST_PHRASE, DECODE_ERROR_CODE, EMPTY_RESPONSE_MESSAGE, HTTP_BAD_REQUEST,
    TRANSPORT_ERROR_CODE,
};
use crate::transport::{Transport, UreqTransport};

pub struct TypedHttpClient<X> {
    transport: X,
    config: ClientConfig,
}

impl TypedHttpClient<UreqTransport> {
    /// Client over a `UreqTransport` built from `config.transport`.
    pub fn from_config(config: ClientConfig) -> Self {
        let transport = UreqTransport::new(&config.transport);
        Self { transport, config }
    }
}

impl<X> TypedHttpClient<X> {
    pub fn new(transport: X) -> Self {
        Self::with_config(transport, ClientConfig::default())
    }

    pub fn with_config(transport: X, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    pub fn transport(&self) -> &X {
        &self.transport
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn build_get<T>(&self, req: &CallRequest<T>) -> Result<HttpRequest, InputError> {
        check_basic(req)?;
        Ok(HttpRequest {
            method: HttpMethod::Get,
            url: encode_query(&req.url, &req.params),
            headers: req.headers.clone(),
            body: None,
        })
    }

    pub fn build_post<T>(&self, req: &CallRequest<T>) -> Result<HttpRequest, InputError> {
        self.build_post_partial_encoded(req, &[])
    }

    /// Form POST where values of `exclude_keys` are sent exactly as given
    /// (already encoded) and all other values are percent-encoded.
    pub fn build_post_partial_encoded<T>(
        &self,
        req: &CallRequest<T>,
        exclude_keys: &[&str],
    ) -> Result<HttpRequest, InputError> {
        check_basic(req)?;
        let mut form = FormBody::new();
        for (key, value) in &req.params {
            let Some(value) = value else {
                warn!(key = %key, "skipping form parameter with null value");
                continue;
            };
            if exclude_keys.contains(&key.as_str()) {
                form.add_encoded(key, value);
            } else {
                form.add(key, value);
            }
        }
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: req.url.clone(),
            headers: with_content_type(&req.headers, FORM_CONTENT_TYPE),
            body: Some(form.encode()),
        })
    }

    pub fn build_post_json<T>(&self, req: &CallRequest<T>) -> Result<HttpRequest, InputError> {
        check_basic(req)?;
        let body = match req.body.as_deref() {
            Some(body) if !body.trim().is_empty() => body.to_string(),
            _ => return Err(InputError::BlankBody),
        };
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: req.url.clone(),
            headers: with_content_type(&req.headers, JSON_CONTENT_TYPE),
            body: Some(body),
        })
    }

    /// Fold a transport outcome into a `CallResult`.
    pub fn normalize<T>(
        &self,
        url: &str,
        decode: &DecodeAs<T>,
        outcome: Result<HttpResponse, TransportError>,
    ) -> CallResult<T> {
        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                error!(url, error = %e, "http transport failed");
                return CallResult::failure(TRANSPORT_ERROR_CODE, e.message());
            }
        };

        if response.is_success() {
            return decode_body(url, decode, response.body);
        }

        error!(url, status = response.status, "upstream returned error status");
        let message = response
            .body
            .filter(|body| !body.is_empty())
            .unwrap_or_else(|| BAD_REQUEST_PHRASE.to_string());
        let code = match self.config.status_policy {
            StatusPolicy::Normalize => HTTP_BAD_REQUEST,
            StatusPolicy::Preserve => i32::from(response.status),
        };
        CallResult::failure(code, message)
    }
}

impl<X: Transport> TypedHttpClient<X> {
    pub fn get<T>(&self, req: &CallRequest<T>) -> Result<CallResult<T>, InputError> {
        let request = self.build_get(req)?;
        Ok(self.execute(request, req))
    }

    pub fn post<T>(&self, req: &CallRequest<T>) -> Result<CallResult<T>, InputError> {
        let request = self.build_post(req)?;
        Ok(self.execute(request, req))
    }

    pub fn post_form_partial_encoded<T>(
        &self,
        req: &CallRequest<T>,
        exclude_keys: &[&str],
    ) -> Result<CallResult<T>, InputError> {
        let request = self.build_post_partial_encoded(req, exclude_keys)?;
        Ok(self.execute(request, req))
    }

    pub fn post_json<T>(&self, req: &CallRequest<T>) -> Result<CallResult<T>, InputError> {
        let request = self.build_post_json(req)?;
        Ok(self.execute(request, req))
    }

    fn execute<T>(&self, request: HttpRequest, req: &CallRequest<T>) -> CallResult<T> {
        // build_* already rejected a missing decode strategy
        let Some(decode) = req.decode.as_ref() else {
            return CallResult::failure(DECODE_ERROR_CODE, EMPTY_RESPONSE_MESSAGE);
        };
        let outcome = self.transport.execute(&request);
        self.normalize(&request.url, decode, outcome)
    }
}

fn check_basic<T>(req: &CallRequest<T>) -> Result<(), InputError> {
    if req.url.trim().is_empty() {
        return Err(InputError::EmptyUrl);
    }
    if req.decode.is_none() {
        return Err(InputError::MissingResponseType);
    }
    Ok(())
}

/// Caller headers with any `content-type` replaced by the body's own.
fn with_content_type(headers: &[(String, String)], content_type: &str) -> Vec<(String, String)> {
    headers
        .iter()
        .filter(|(k, _)| !k.eq_ignore_ascii_case("content-type"))
        .cloned()
        .chain(std::iter::once((
            "content-type".to_string(),
            content_type.to_string(),
        )))
        .collect()
}

fn decode_body<T>(url: &str, decode: &DecodeAs<T>, body: Option<String>) -> CallResult<T> {
    let body = match body {
        Some(body) if !body.trim().is_empty() => body,
        _ => {
            error!(url, "upstream returned an empty body");
            return CallResult::failure(DECODE_ERROR_CODE, format!("{EMPTY_RESPONSE_MESSAGE}: empty body"));
        }
    };
    match decode.decode(&body) {
        Ok(value) => CallResult::Success(value),
        Err(e) => {
            error!(url, error = %e, ?decode, "failed to decode response body");
            CallResult::failure(DECODE_ERROR_CODE, format!("{EMPTY_RESPONSE_MESSAGE}: {e}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde::Deserialize;

    use super::*;

    type Responder = Box<dyn Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync>;

    /// Records every request and answers with a canned outcome.
    struct FakeTransport {
        sent: Mutex<Vec<HttpRequest>>,
        respond: Responder,
    }

    impl FakeTransport {
        fn new<F>(respond: F) -> Self
        where
            F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync + 'static,
        {
            Self {
                sent: Mutex::new(Vec::new()),
                respond: Box::new(respond),
            }
        }

        fn replying(status: u16, body: Option<&str>) -> Self {
            let body = body.map(str::to_string);
            Self::new(move |_| {
                Ok(HttpResponse {
                    status,
                    headers: Vec::new(),
                    body: body.clone(),
                })
            })
        }

        fn sent(&self) -> Vec<HttpRequest> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Transport for FakeTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            self.sent.lock().unwrap().push(request.clone());
            (self.respond)(request)
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        name: String,
        quantity: u32,
    }

    fn text_request(url: &str) -> CallRequest<String> {
        CallRequest::new(url).decode_as(DecodeAs::text())
    }

    // --- preconditions ---

    #[test]
    fn blank_url_is_rejected_without_io() {
        let client = TypedHttpClient::new(FakeTransport::replying(200, Some("ok")));
        for url in ["", "   "] {
            let req = text_request(url);
            assert_eq!(client.get(&req).unwrap_err(), InputError::EmptyUrl);
            assert_eq!(client.post(&req).unwrap_err(), InputError::EmptyUrl);
            assert_eq!(client.post_json(&req.clone().body("{}")).unwrap_err(), InputError::EmptyUrl);
        }
        assert!(client.transport().sent().is_empty());
    }

    #[test]
    fn missing_decode_is_rejected_without_io() {
        let client = TypedHttpClient::new(FakeTransport::replying(200, Some("ok")));
        let req: CallRequest<String> = CallRequest::new("http://x/y");
        assert_eq!(client.get(&req).unwrap_err(), InputError::MissingResponseType);
        assert_eq!(
            client.post_form_partial_encoded(&req, &["a"]).unwrap_err(),
            InputError::MissingResponseType
        );
        assert!(client.transport().sent().is_empty());
    }

    #[test]
    fn blank_json_body_is_rejected_without_io() {
        let client = TypedHttpClient::new(FakeTransport::replying(200, Some("ok")));
        let missing = text_request("http://x/y");
        let blank = text_request("http://x/y").body(" \n\t");
        assert_eq!(client.post_json(&missing).unwrap_err(), InputError::BlankBody);
        assert_eq!(client.post_json(&blank).unwrap_err(), InputError::BlankBody);
        assert!(client.transport().sent().is_empty());
    }

    // --- request building ---

    #[test]
    fn get_appends_params_as_query_string() {
        let client = TypedHttpClient::new(FakeTransport::replying(200, Some("ok")));
        let req = text_request("http://x/y")
            .header("x-trace", "abc")
            .param("a", "1")
            .param("b", "2");

        let result = client.get(&req).unwrap();

        assert_eq!(result, CallResult::Success("ok".to_string()));
        let sent = client.transport().sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, HttpMethod::Get);
        assert_eq!(sent[0].url, "http://x/y?a=1&b=2");
        assert_eq!(sent[0].header("x-trace"), Some("abc"));
        assert!(sent[0].body.is_none());
    }

    #[test]
    fn get_without_params_keeps_url() {
        let client = TypedHttpClient::new(FakeTransport::replying(200, Some("ok")));
        let req = client.build_get(&text_request("http://x/y")).unwrap();
        assert_eq!(req.url, "http://x/y");
        assert!(req.body.is_none());
    }

    #[test]
    fn post_sends_form_body() {
        let client = TypedHttpClient::new(FakeTransport::replying(200, Some("ok")));
        let req = client
            .build_post(&text_request("http://x/y").param("name", "a b").param("n", "1"))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://x/y");
        assert_eq!(req.header("content-type"), Some(FORM_CONTENT_TYPE));
        assert_eq!(req.body.as_deref(), Some("name=a+b&n=1"));
    }

    #[test]
    fn post_without_params_sends_empty_form() {
        let client = TypedHttpClient::new(FakeTransport::replying(200, Some("ok")));
        let req = client.build_post(&text_request("http://x/y")).unwrap();
        assert_eq!(req.body.as_deref(), Some(""));
    }

    #[test_log::test]
    fn post_skips_null_params() {
        let client = TypedHttpClient::new(FakeTransport::replying(200, Some("ok")));
        let req = text_request("http://x/y")
            .param_opt("missing", None)
            .param("kept", "1");

        let result = client.post(&req).unwrap();

        assert!(result.is_success());
        assert_eq!(client.transport().sent()[0].body.as_deref(), Some("kept=1"));
    }

    #[test]
    fn partial_encoding_leaves_excluded_keys_raw() {
        let client = TypedHttpClient::new(FakeTransport::replying(200, Some("ok")));
        let req = text_request("http://x/y")
            .param("token", "a+b")
            .param("q", "a+b");

        client.post_form_partial_encoded(&req, &["token"]).unwrap();

        let sent = client.transport().sent();
        assert_eq!(sent[0].body.as_deref(), Some("token=a+b&q=a%2Bb"));
    }

    #[test]
    fn post_json_sets_json_content_type_over_caller_header() {
        let client = TypedHttpClient::new(FakeTransport::replying(200, Some("ok")));
        let req = text_request("http://x/y")
            .header("Content-Type", "text/plain")
            .header("x-trace", "abc")
            .body(r#"{"name":"bolt"}"#);

        let built = client.build_post_json(&req).unwrap();

        assert_eq!(built.method, HttpMethod::Post);
        assert_eq!(built.body.as_deref(), Some(r#"{"name":"bolt"}"#));
        assert_eq!(
            built.headers,
            vec![
                ("x-trace".to_string(), "abc".to_string()),
                ("content-type".to_string(), JSON_CONTENT_TYPE.to_string()),
            ]
        );
    }

    // --- normalization ---

    #[test]
    fn text_decode_returns_raw_body_even_if_not_json() {
        let client = TypedHttpClient::new(FakeTransport::replying(200, Some("{oops")));
        let result = client.get(&text_request("http://x/y")).unwrap();
        assert_eq!(result, CallResult::Success("{oops".to_string()));
    }

    #[test]
    fn primitive_decode_parses_body_text() {
        let client = TypedHttpClient::new(FakeTransport::replying(200, Some("42")));
        let req = CallRequest::new("http://x/y").decode_as(DecodeAs::<u64>::primitive());
        assert_eq!(client.get(&req).unwrap(), CallResult::Success(42));
    }

    #[test]
    fn json_decode_parses_structured_body() {
        let client = TypedHttpClient::new(FakeTransport::replying(
            201,
            Some(r#"{"name":"bolt","quantity":3}"#),
        ));
        let req = CallRequest::new("http://x/items")
            .body(r#"{"name":"bolt"}"#)
            .decode_as(DecodeAs::<Item>::json());

        let result = client.post_json(&req).unwrap();

        assert_eq!(
            result,
            CallResult::Success(Item {
                name: "bolt".to_string(),
                quantity: 3
            })
        );
    }

    #[test]
    fn unparsable_json_is_a_decode_failure() {
        let client = TypedHttpClient::new(FakeTransport::replying(200, Some("not json")));
        let req = CallRequest::new("http://x/y").decode_as(DecodeAs::<Item>::json());

        let result = client.get(&req).unwrap();

        assert_eq!(result.code(), DECODE_ERROR_CODE);
        assert!(result.message().unwrap().starts_with(EMPTY_RESPONSE_MESSAGE));
    }

    #[test]
    fn blank_or_missing_success_body_is_a_decode_failure() {
        for body in [None, Some(""), Some("   ")] {
            let client = TypedHttpClient::new(FakeTransport::replying(200, body));
            let result = client.get(&text_request("http://x/y")).unwrap();
            assert_eq!(result.code(), DECODE_ERROR_CODE, "body {body:?}");
        }
    }

    #[test]
    fn error_status_is_normalized_to_400_with_body() {
        let client = TypedHttpClient::new(FakeTransport::replying(503, Some("maintenance")));
        let result = client.get(&text_request("http://x/y")).unwrap();
        assert_eq!(
            result,
            CallResult::Failure {
                code: HTTP_BAD_REQUEST,
                message: "maintenance".to_string()
            }
        );
    }

    #[test]
    fn error_status_without_body_uses_bad_request_phrase() {
        for body in [None, Some("")] {
            let client = TypedHttpClient::new(FakeTransport::replying(404, body));
            let result = client.get(&text_request("http://x/y")).unwrap();
            assert_eq!(result.code(), HTTP_BAD_REQUEST);
            assert_eq!(result.message(), Some(BAD_REQUEST_PHRASE));
        }
    }

    #[test]
    fn preserve_policy_reports_upstream_status() {
        let config = ClientConfig {
            status_policy: StatusPolicy::Preserve,
            ..ClientConfig::default()
        };
        let client =
            TypedHttpClient::with_config(FakeTransport::replying(503, Some("maintenance")), config);
        let result = client.get(&text_request("http://x/y")).unwrap();
        assert_eq!(result.code(), 503);
        assert_eq!(result.message(), Some("maintenance"));
    }

    #[test]
    fn transport_failure_becomes_failure_result() {
        let client = TypedHttpClient::new(FakeTransport::new(|_| {
            Err(TransportError::new("connect timed out"))
        }));
        let result = client.get(&text_request("http://x/y")).unwrap();
        assert_eq!(
            result,
            CallResult::Failure {
                code: TRANSPORT_ERROR_CODE,
                message: "connect timed out".to_string()
            }
        );
    }

    #[test]
    fn normalize_works_without_a_transport() {
        let client: TypedHttpClient<()> = TypedHttpClient::new(());
        let decode = DecodeAs::<u32>::primitive();
        let ok = HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: Some("7".to_string()),
        };
        assert_eq!(client.normalize("http://x", &decode, Ok(ok)), CallResult::Success(7));
    }

    #[test]
    fn shared_client_serves_concurrent_callers() {
        let client = TypedHttpClient::new(FakeTransport::new(|req| {
            Ok(HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: Some(req.url.clone()),
            })
        }));

        std::thread::scope(|s| {
            for i in 0..8 {
                let client = &client;
                s.spawn(move || {
                    let req = text_request("http://x/y").param("i", i.to_string());
                    let result = client.get(&req).unwrap();
                    assert_eq!(result, CallResult::Success(format!("http://x/y?i={i}")));
                });
            }
        });
        assert_eq!(client.transport().sent().len(), 8);
    }
}
