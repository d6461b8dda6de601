//! Declarative phase configuration and the persisted lifecycle record.
//!
//! # Design
//! The host validates and stores these values; the core only reads the
//! declared fields and writes response snapshots back. Everything derives
//! serde so a host can persist a `LifecycleRecord` as JSON and hand it back
//! on the next lifecycle event.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::http::{HttpMethod, RequestSpec};

/// One of the three independently configured HTTP calls of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Create,
    Update,
    Delete,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Create => "create",
            Phase::Update => "update",
            Phase::Delete => "delete",
        })
    }
}

fn default_status() -> u16 {
    200
}

/// The declared fields of one phase.
///
/// A phase without a method is "not configured": it makes no network call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub request_headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<String>,
    #[serde(default = "default_status")]
    pub response_status_code: u16,
}

impl Default for PhaseConfig {
    fn default() -> Self {
        Self {
            method: None,
            url: String::new(),
            request_headers: BTreeMap::new(),
            request_body: None,
            response_status_code: default_status(),
        }
    }
}

impl PhaseConfig {
    pub fn new(method: HttpMethod, url: &str) -> Self {
        Self {
            method: Some(method),
            url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.request_headers
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn body(mut self, body: &str) -> Self {
        self.request_body = Some(body.to_string());
        self
    }

    pub fn status(mut self, code: u16) -> Self {
        self.response_status_code = code;
        self
    }

    /// `None` when no method is configured.
    pub fn to_request(&self) -> Option<RequestSpec> {
        let method = self.method?;
        Some(RequestSpec {
            method,
            url: self.url.clone(),
            headers: self.request_headers.clone(),
            body: self.request_body.clone(),
            expected_status: self.response_status_code,
        })
    }
}

/// The `action` block of a record: up to one configuration per phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    #[serde(
        default,
        deserialize_with = "create_with_default_method",
        skip_serializing_if = "Option::is_none"
    )]
    pub create: Option<PhaseConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<PhaseConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<PhaseConfig>,
}

impl Action {
    pub fn phase(&self, phase: Phase) -> Option<&PhaseConfig> {
        match phase {
            Phase::Create => self.create.as_ref(),
            Phase::Update => self.update.as_ref(),
            Phase::Delete => self.delete.as_ref(),
        }
    }
}

/// A declared create block without a method issues a POST.
fn create_with_default_method<'de, D>(deserializer: D) -> Result<Option<PhaseConfig>, D::Error>
where
    D: Deserializer<'de>,
{
    let create = Option::<PhaseConfig>::deserialize(deserializer)?;
    Ok(create.map(|mut config| {
        config.method.get_or_insert(HttpMethod::Post);
        config
    }))
}

/// Body and headers captured from a create or update response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseResponse {
    pub body: String,
    pub headers: BTreeMap<String, String>,
}

/// Snapshot of a phase's declared fields plus, for create and update, the
/// response it produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub request: PhaseConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<PhaseResponse>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phases {
    pub create: PhaseRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<PhaseRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<PhaseRecord>,
}

/// The persisted result of a record's lifecycle.
///
/// `id` is assigned by the create phase and survives update and delete.
/// `triggers` is opaque to the core; the host diffs it to force recreation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub triggers: BTreeMap<String, String>,
    pub phases: Phases,
}

/// Result of a one-shot query. `id` is fresh on every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOutcome {
    pub id: Uuid,
    pub body: String,
    pub headers: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_config_defaults_to_status_200() {
        let config: PhaseConfig = serde_json::from_str(r#"{"url":"http://x/"}"#).unwrap();
        assert_eq!(config.response_status_code, 200);
        assert!(config.method.is_none());
        assert!(config.to_request().is_none());
    }

    #[test]
    fn to_request_copies_declared_fields() {
        let config = PhaseConfig::new(HttpMethod::Put, "http://x/item")
            .header("Authorization", "token")
            .body(r#"{"hello":"update"}"#)
            .status(201);
        let spec = config.to_request().unwrap();
        assert_eq!(spec.method, HttpMethod::Put);
        assert_eq!(spec.url, "http://x/item");
        assert_eq!(spec.headers["Authorization"], "token");
        assert_eq!(spec.body.as_deref(), Some(r#"{"hello":"update"}"#));
        assert_eq!(spec.expected_status, 201);
    }

    #[test]
    fn create_block_defaults_to_post() {
        let action: Action = serde_json::from_str(
            r#"{"create":{"url":"http://x/"},"update":{"url":"http://x/"}}"#,
        )
        .unwrap();
        assert_eq!(action.create.unwrap().method, Some(HttpMethod::Post));
        assert_eq!(action.update.unwrap().method, None);
        assert!(action.delete.is_none());
    }

    #[test]
    fn missing_create_block_stays_unconfigured() {
        let action: Action = serde_json::from_str(r#"{"delete":{"url":"http://x/","method":"DELETE"}}"#).unwrap();
        assert!(action.phase(Phase::Create).is_none());
        assert_eq!(
            action.phase(Phase::Delete).and_then(|c| c.method),
            Some(HttpMethod::Delete)
        );
    }

    #[test]
    fn record_survives_json_persistence() {
        let record = LifecycleRecord {
            id: "abc".to_string(),
            triggers: BTreeMap::from([("version".to_string(), "1".to_string())]),
            phases: Phases {
                create: PhaseRecord {
                    request: PhaseConfig::new(HttpMethod::Get, "http://x/meta_200.txt"),
                    response: Some(PhaseResponse {
                        body: "1.0.0".to_string(),
                        headers: BTreeMap::from([(
                            "Content-Type".to_string(),
                            "text/plain".to_string(),
                        )]),
                    }),
                },
                update: None,
                delete: Some(PhaseRecord {
                    request: PhaseConfig::new(HttpMethod::Delete, "http://x/meta_200.txt")
                        .status(204),
                    response: None,
                }),
            },
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["phases"]["create"]["response"]["body"], "1.0.0");
        assert!(json["phases"]["delete"].get("response").is_none());
        assert!(json["phases"].get("update").is_none());

        let back: LifecycleRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
