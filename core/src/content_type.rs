//! Decides whether a response body may be surfaced as text.
//!
//! A value is accepted when its media type is on the allow-list and any
//! declared `charset` is UTF-8 compatible. The check is on the declared
//! charset string only; the body bytes are never inspected.

const ALLOWED_MEDIA_TYPES: &[&str] = &[
    "application/json",
    "application/xml",
    "application/javascript",
    "application/samlmetadata+xml",
];

const ALLOWED_CHARSETS: &[&str] = &["utf-8", "us-ascii"];

/// A parsed `Content-Type` value. Type and parameter names are lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    pub essence: String,
    pub params: Vec<(String, String)>,
}

impl MediaType {
    /// Returns `None` for empty values or values without a `type/subtype`.
    pub fn parse(value: &str) -> Option<Self> {
        let mut parts = value.split(';');
        let essence = parts.next()?.trim().to_ascii_lowercase();
        let (kind, subtype) = essence.split_once('/')?;
        if kind.is_empty() || subtype.is_empty() || subtype.contains('/') {
            return None;
        }

        let mut params = Vec::new();
        for part in parts {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let (name, value) = part.split_once('=')?;
            let value = value.trim().trim_matches('"');
            params.push((name.trim().to_ascii_lowercase(), value.to_string()));
        }

        Some(Self { essence, params })
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn is_text_like(&self) -> bool {
        self.essence.starts_with("text/") || ALLOWED_MEDIA_TYPES.contains(&self.essence.as_str())
    }
}

/// Classify a raw `Content-Type` header value.
pub fn is_allowed(content_type: &str) -> bool {
    let Some(media) = MediaType::parse(content_type) else {
        return false;
    };
    if !media.is_text_like() {
        return false;
    }
    match media.param("charset") {
        None => true,
        Some(charset) => ALLOWED_CHARSETS.contains(&charset.to_ascii_lowercase().as_str()),
    }
}
