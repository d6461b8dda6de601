//! HTTP request and response values exchanged with the transport.
//!
//! # Design
//! Requests and responses are plain owned data. The core builds a
//! `RequestSpec` from declarative phase fields, hands it to a `Transport`,
//! and validates what comes back. Header maps are `BTreeMap`s so iteration
//! order, and therefore "last write wins" on case-insensitive collisions, is
//! deterministic.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownMethod;

/// The verbs a phase or query may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
    Put,
    Head,
    Options,
    Connect,
    Trace,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 9] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Patch,
        HttpMethod::Delete,
        HttpMethod::Put,
        HttpMethod::Head,
        HttpMethod::Options,
        HttpMethod::Connect,
        HttpMethod::Trace,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Put => "PUT",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Connect => "CONNECT",
            HttpMethod::Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-sensitive: only the uppercase verb is accepted.
impl FromStr for HttpMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownMethod(s.to_string()))
    }
}

/// One fully-specified outbound request.
///
/// Built once per phase invocation or query and not modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
    pub expected_status: u16,
}

impl RequestSpec {
    /// The payload to attach, if any. Empty bodies are never sent.
    pub fn payload(&self) -> Option<&str> {
        self.body.as_deref().filter(|body| !body.is_empty())
    }
}

/// A validated response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseOutcome {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl ResponseOutcome {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Renders a header name the way most servers spell it: `content-type`
/// becomes `Content-Type`.
pub fn canonical_header_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first
                    .to_ascii_uppercase()
                    .to_string()
                    + &chars.as_str().to_ascii_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_method_parses_back_from_its_name() {
        for method in HttpMethod::ALL {
            assert_eq!(method.as_str().parse::<HttpMethod>(), Ok(method));
            assert_eq!(method.to_string(), method.as_str());
        }
    }

    #[test]
    fn lowercase_method_is_rejected() {
        let err = "get".parse::<HttpMethod>().unwrap_err();
        assert_eq!(err, UnknownMethod("get".to_string()));
        assert!("FETCH".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn method_serializes_as_uppercase_verb() {
        let json = serde_json::to_string(&HttpMethod::Options).unwrap();
        assert_eq!(json, r#""OPTIONS""#);
        let back: HttpMethod = serde_json::from_str(r#""PATCH""#).unwrap();
        assert_eq!(back, HttpMethod::Patch);
    }

    #[test]
    fn empty_body_is_not_a_payload() {
        let mut spec = RequestSpec {
            method: HttpMethod::Post,
            url: "http://localhost/".to_string(),
            headers: BTreeMap::new(),
            body: Some(String::new()),
            expected_status: 200,
        };
        assert_eq!(spec.payload(), None);
        spec.body = Some("{}".to_string());
        assert_eq!(spec.payload(), Some("{}"));
    }

    #[test]
    fn header_names_are_canonicalized() {
        assert_eq!(canonical_header_name("content-type"), "Content-Type");
        assert_eq!(canonical_header_name("X-REQUEST-ID"), "X-Request-Id");
        assert_eq!(canonical_header_name("etag"), "Etag");
    }
}
