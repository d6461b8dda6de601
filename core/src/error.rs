//! Error types for request execution and lifecycle transitions.
//!
//! # Design
//! `ExecError` covers a single request/response cycle. `LifecycleError` wraps
//! it with the phase that failed so the host can report which action broke.
//! None of these are retried; every variant carries enough context (status
//! codes, content type, transport cause) to diagnose without re-running.

use crate::types::Phase;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors from building, sending or validating one HTTP request.
#[derive(thiserror::Error, Debug)]
pub enum ExecError {
    /// The method, URL or a header could not be turned into a request.
    #[error("error creating request: {0}")]
    InvalidRequest(String),

    /// DNS failure, refused connection, timeout or any other transport error.
    #[error("error making a request to {url}: {source}")]
    Connection {
        url: String,
        #[source]
        source: BoxError,
    },

    /// The connection succeeded but the body could not be read.
    #[error("error while reading response body: {0}")]
    Read(#[source] BoxError),

    /// The response status differs from the declared one. `body` is `None`
    /// when the body was never read (delete phase). `want` is not part of the
    /// message.
    #[error("HTTP request error. Response code: {got}{}", body_suffix(.body))]
    StatusMismatch {
        got: u16,
        want: u16,
        body: Option<String>,
    },

    /// Missing or non-text `Content-Type` on a response whose body is kept.
    #[error("Content-Type is not a text type. Got: {content_type}")]
    UnsupportedContentType { content_type: String },
}

/// Errors from a lifecycle transition.
#[derive(thiserror::Error, Debug)]
pub enum LifecycleError {
    #[error("{phase} action failed: {source}")]
    Exec {
        phase: Phase,
        #[source]
        source: ExecError,
    },

    /// Update and delete operate on an existing record.
    #[error("{phase} requires an existing record")]
    MissingRecord { phase: Phase },
}

/// Returned by `HttpMethod::from_str` for anything outside the nine verbs.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unsupported HTTP method: {0}")]
pub struct UnknownMethod(pub String);

fn body_suffix(body: &Option<String>) -> String {
    match body.as_deref() {
        Some(body) if !body.is_empty() => format!("\n\n{body}"),
        _ => String::new(),
    }
}
