//! One-shot request mode: no persistence, a fresh identifier per call.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ExecError;
use crate::executor::{execute, ResponseCheck, Transport};
use crate::http::{HttpMethod, RequestSpec};
use crate::types::QueryOutcome;

fn default_method() -> HttpMethod {
    HttpMethod::Get
}

fn default_status() -> u16 {
    200
}

/// Declared fields of a query. Unlike a lifecycle phase the method is
/// always set, defaulting to GET.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    #[serde(default = "default_method")]
    pub method: HttpMethod,
    pub url: String,
    #[serde(default)]
    pub request_headers: BTreeMap<String, String>,
    #[serde(default)]
    pub request_body: Option<String>,
    #[serde(default = "default_status")]
    pub response_status_code: u16,
}

impl QueryConfig {
    pub fn get(url: &str) -> Self {
        Self {
            method: default_method(),
            url: url.to_string(),
            request_headers: BTreeMap::new(),
            request_body: None,
            response_status_code: default_status(),
        }
    }

    pub fn to_request(&self) -> RequestSpec {
        RequestSpec {
            method: self.method,
            url: self.url.clone(),
            headers: self.request_headers.clone(),
            body: self.request_body.clone(),
            expected_status: self.response_status_code,
        }
    }
}

/// Execute `spec` with full validation and return its body and headers.
pub fn run_query<T: Transport + ?Sized>(
    transport: &T,
    spec: &RequestSpec,
) -> Result<QueryOutcome, ExecError> {
    let outcome = execute(transport, spec, ResponseCheck::Full)?;
    Ok(QueryOutcome {
        id: Uuid::new_v4(),
        body: outcome.body_text(),
        headers: outcome.headers,
    })
}
