//! Typed views over NodeBB documents.
//!
//! # Design
//! Only the fields this crate interprets are named. Everything else the
//! server sends is retained in `extra`, so newer NodeBB versions lose nothing.
//! Time fields stay raw `Value`s and are coerced on access, where a bad value
//! can be reported against its field name.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// The profile returned by `GET /api/user/{userslug}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub username: String,
    #[serde(default)]
    pub uid: Option<u64>,
    #[serde(default)]
    pub userslug: Option<String>,
    /// Relative upload path or absolute URL; empty when the user has none.
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub joindate: Option<Value>,
    #[serde(default)]
    pub lastonline: Option<Value>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub postcount: Option<i64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub reputation: Option<i64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub follower_count: Option<i64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub following_count: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// The picture reference, if the user has uploaded or linked one.
    pub fn picture(&self) -> Option<&str> {
        self.picture.as_deref().map(str::trim).filter(|p| !p.is_empty())
    }
}

/// Counters are informational, so a value of the wrong shape becomes `None`
/// instead of failing the whole profile. The raw value stays in the document.
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Bytes of a fetched image plus the content type the server declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl ImageData {
    /// File extension matching the content type, `img` when unknown.
    pub fn extension(&self) -> &'static str {
        let mime = self
            .content_type
            .as_deref()
            .and_then(|ct| ct.split(';').next())
            .map(str::trim)
            .unwrap_or_default();
        match mime {
            "image/png" => "png",
            "image/jpeg" | "image/jpg" => "jpg",
            "image/gif" => "gif",
            "image/webp" => "webp",
            "image/svg+xml" => "svg",
            _ => "img",
        }
    }
}
