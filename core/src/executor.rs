//! Issues one HTTP request and validates the response.
//!
//! # Design
//! I/O sits behind the `Transport` trait. `UreqTransport` is the production
//! implementation; validation (`check_response`) is a pure function over the
//! `RawResponse` the transport returns, so status and content-type rules are
//! testable without a network. The transport never treats a status code as an
//! error; only `check_response` interprets it.

use std::collections::BTreeMap;

use http::{header, HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, warn};
use ureq::typestate::{WithBody, WithoutBody};
use ureq::{Agent, Body, RequestBuilder};

use crate::config::ExecutorConfig;
use crate::content_type;
use crate::error::ExecError;
use crate::http::{canonical_header_name, HttpMethod, RequestSpec, ResponseOutcome};
use crate::types::Phase;

/// A response as received, before any validation.
///
/// `body` is `None` when the caller asked the transport not to read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Vec<u8>>,
}

/// Performs exactly one outbound call per `send`. No retries.
pub trait Transport {
    fn send(&self, spec: &RequestSpec, read_body: bool) -> Result<RawResponse, ExecError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, spec: &RequestSpec, read_body: bool) -> Result<RawResponse, ExecError> {
        (**self).send(spec, read_body)
    }
}

/// How much of a response gets validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCheck {
    /// Read the body, check status, then require a text `Content-Type`.
    Full,
    /// Check status only; the body is never read.
    StatusOnly,
}

impl ResponseCheck {
    pub fn for_phase(phase: Phase) -> Self {
        match phase {
            Phase::Create | Phase::Update => ResponseCheck::Full,
            Phase::Delete => ResponseCheck::StatusOnly,
        }
    }
}

/// Send `spec` over `transport` and validate the result.
pub fn execute<T: Transport + ?Sized>(
    transport: &T,
    spec: &RequestSpec,
    check: ResponseCheck,
) -> Result<ResponseOutcome, ExecError> {
    debug!(method = %spec.method, url = %spec.url, "sending request");
    let raw = transport.send(spec, check == ResponseCheck::Full)?;
    debug!(status = raw.status, url = %spec.url, "received response");
    check_response(raw, spec.expected_status, check)
}

/// Validate a raw response against the expected status and, for
/// `ResponseCheck::Full`, the content-type allow-list.
pub fn check_response(
    raw: RawResponse,
    expected_status: u16,
    check: ResponseCheck,
) -> Result<ResponseOutcome, ExecError> {
    let body = raw.body.unwrap_or_default();

    if raw.status != expected_status {
        warn!(got = raw.status, want = expected_status, "unexpected response status");
        return Err(ExecError::StatusMismatch {
            got: raw.status,
            want: expected_status,
            body: match check {
                ResponseCheck::Full => Some(String::from_utf8_lossy(&body).into_owned()),
                ResponseCheck::StatusOnly => None,
            },
        });
    }

    if check == ResponseCheck::Full {
        let content_type = header_value(&raw.headers, "content-type").unwrap_or_default();
        if !content_type::is_allowed(content_type) {
            warn!(content_type, "rejecting non-text response");
            return Err(ExecError::UnsupportedContentType {
                content_type: content_type.to_string(),
            });
        }
    }

    Ok(ResponseOutcome {
        status: raw.status,
        headers: raw.headers,
        body,
    })
}

/// Case-insensitive header lookup.
pub fn header_value<'a>(headers: &'a BTreeMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Blocking transport backed by a `ureq::Agent`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
    max_body_bytes: u64,
}

impl UreqTransport {
    pub fn new(config: &ExecutorConfig) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(config.timeout)
            .build()
            .new_agent();
        Self {
            agent,
            max_body_bytes: config.max_body_bytes,
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(&ExecutorConfig::default())
    }
}

impl Transport for UreqTransport {
    fn send(&self, spec: &RequestSpec, read_body: bool) -> Result<RawResponse, ExecError> {
        let headers = request_headers(&spec.headers)?;
        let url = spec.url.as_str();
        let payload = spec.payload();

        let result = match spec.method {
            HttpMethod::Get => send_bodyless(with_headers(self.agent.get(url), &headers), payload),
            HttpMethod::Head => send_bodyless(with_headers(self.agent.head(url), &headers), payload),
            HttpMethod::Delete => send_bodyless(with_headers(self.agent.delete(url), &headers), payload),
            HttpMethod::Options => send_bodyless(with_headers(self.agent.options(url), &headers), payload),
            HttpMethod::Connect => send_bodyless(with_headers(self.agent.connect(url), &headers), payload),
            HttpMethod::Trace => send_bodyless(with_headers(self.agent.trace(url), &headers), payload),
            HttpMethod::Post => send_with_body(with_headers(self.agent.post(url), &headers), payload),
            HttpMethod::Put => send_with_body(with_headers(self.agent.put(url), &headers), payload),
            HttpMethod::Patch => send_with_body(with_headers(self.agent.patch(url), &headers), payload),
        };
        let mut response = result.map_err(|err| transport_error(url, err))?;

        let status = response.status().as_u16();
        let headers = response_headers(response.headers());
        let body = if read_body {
            let bytes = response
                .body_mut()
                .with_config()
                .limit(self.max_body_bytes)
                .read_to_vec()
                .map_err(|err| ExecError::Read(Box::new(err)))?;
            Some(bytes)
        } else {
            None
        };

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

type UreqResult = Result<http::Response<Body>, ureq::Error>;

/// Methods that normally carry no payload still send one when declared.
fn send_bodyless(builder: RequestBuilder<WithoutBody>, payload: Option<&str>) -> UreqResult {
    match payload {
        Some(body) => builder.force_send_body().send(body.as_bytes()),
        None => builder.call(),
    }
}

fn send_with_body(builder: RequestBuilder<WithBody>, payload: Option<&str>) -> UreqResult {
    match payload {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &HeaderMap) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.clone());
    }
    builder
}

/// Fold the declared headers into a `HeaderMap`. Names collide
/// case-insensitively and the later entry wins.
fn request_headers(declared: &BTreeMap<String, String>) -> Result<HeaderMap, ExecError> {
    let mut headers = HeaderMap::with_capacity(declared.len());
    for (name, value) in declared {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|err| ExecError::InvalidRequest(format!("header name {name:?}: {err}")))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|err| ExecError::InvalidRequest(format!("value of header {name:?}: {err}")))?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}

/// Repeated response headers keep their last value, except `Content-Type`,
/// which keeps its first so the stored value is the one that was classified.
fn response_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut flat = BTreeMap::new();
    for (name, value) in headers {
        if *name == header::CONTENT_TYPE && flat.contains_key("Content-Type") {
            continue;
        }
        flat.insert(
            canonical_header_name(name.as_str()),
            String::from_utf8_lossy(value.as_bytes()).into_owned(),
        );
    }
    flat
}

fn transport_error(url: &str, err: ureq::Error) -> ExecError {
    match err {
        ureq::Error::Http(err) => ExecError::InvalidRequest(err.to_string()),
        ureq::Error::BadUri(uri) => ExecError::InvalidRequest(format!("bad url: {uri}")),
        err => ExecError::Connection {
            url: url.to_string(),
            source: Box::new(err),
        },
    }
}
