//! Stateless HTTP request builder and response parser for the NodeBB API.
//!
//! # Design
//! `NodeBbClient` holds only the normalized base URL and the derived API
//! endpoint. Each resource is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! `Forum` and `User` drive the round-trips through a `Transport`.

use serde_json::{Map, Value};
use url::Url;

use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// A JSON object as returned by the API.
pub type Document = Map<String, Value>;

const USER_AGENT: &str = concat!("nodebb-core/", env!("CARGO_PKG_VERSION"));

/// Request builder and response parser bound to one forum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeBbClient {
    base: Url,
    endpoint: Url,
}

impl NodeBbClient {
    /// Parse and normalize `base_url`. Query and fragment are dropped and the
    /// path always ends in `/`, so forums mounted below the host root resolve
    /// `api/` relative to their own prefix.
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base =
            Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(format!(
                "{base_url}: expected an http(s) URL"
            )));
        }
        base.set_query(None);
        base.set_fragment(None);
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base
            .join("api/")
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        Ok(Self { base, endpoint })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// The `api/` root every resource path is resolved against.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// `HEAD` on the forum root, used to check the platform header.
    pub fn build_probe(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Head,
            url: self.base.to_string(),
            headers: plain_headers(),
        }
    }

    pub fn build_index(&self) -> HttpRequest {
        api_request(self.endpoint.to_string())
    }

    pub fn build_config(&self) -> Result<HttpRequest> {
        let url = self
            .endpoint
            .join("config")
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        Ok(api_request(url.to_string()))
    }

    /// The username is pushed as a single percent-encoded path segment.
    pub fn build_user(&self, username: &str) -> Result<HttpRequest> {
        if username.trim().is_empty() {
            return Err(ApiError::InvalidInput("username must not be empty".to_string()));
        }
        // `url` treats these as dot segments and would walk up the path.
        if matches!(username, "." | "..") {
            return Err(ApiError::InvalidInput(format!(
                "username {username:?} is not a path segment"
            )));
        }
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.endpoint.to_string()))?
            .pop_if_empty()
            .push("user")
            .push(username);
        Ok(api_request(url.to_string()))
    }

    pub fn parse_probe(&self, response: &HttpResponse) -> Result<()> {
        match response.header("x-powered-by") {
            Some(value) if value.trim() == "NodeBB" => Ok(()),
            _ => Err(ApiError::NotNodeBb),
        }
    }

    pub fn parse_index(&self, response: HttpResponse) -> Result<Document> {
        parse_document(response)
    }

    pub fn parse_config(&self, response: HttpResponse) -> Result<Document> {
        parse_document(response)
    }

    /// A user document must at least name the user.
    pub fn parse_user(&self, response: HttpResponse) -> Result<Document> {
        let document = parse_document(response)?;
        match document.get("username") {
            Some(Value::String(_)) => Ok(document),
            _ => Err(ApiError::ResponseFormat(
                "user document has no `username`".to_string(),
            )),
        }
    }

    /// Resolve a picture reference the way a browser would: relative paths
    /// against the API endpoint, absolute URLs unchanged.
    pub fn resolve_picture(&self, picture: &str) -> Result<Url> {
        self.endpoint
            .join(picture)
            .map_err(|e| ApiError::InvalidUrl(format!("{picture}: {e}")))
    }
}

/// Forum title from the config document: `siteTitle`, then `title`.
pub fn site_title(config: &Document) -> Result<String> {
    ["siteTitle", "title"]
        .iter()
        .find_map(|key| config.get(*key).and_then(Value::as_str))
        .map(str::to_string)
        .ok_or_else(|| ApiError::ResponseFormat("config has no `siteTitle` or `title`".to_string()))
}

pub(crate) fn plain_headers() -> Vec<(String, String)> {
    vec![("user-agent".to_string(), USER_AGENT.to_string())]
}

fn api_request(url: String) -> HttpRequest {
    let mut headers = plain_headers();
    headers.push(("accept".to_string(), "application/json".to_string()));
    HttpRequest {
        method: HttpMethod::Get,
        url,
        headers,
    }
}

fn parse_document(response: HttpResponse) -> Result<Document> {
    check_status(&response)?;
    let value: Value = serde_json::from_slice(&response.body)
        .map_err(|e| ApiError::ResponseFormat(e.to_string()))?;
    match value {
        Value::Object(document) => Ok(document),
        other => Err(ApiError::ResponseFormat(format!(
            "expected a JSON object, got {}",
            kind(&other)
        ))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Map non-success status codes to the appropriate `ApiError` variant.
pub(crate) fn check_status(response: &HttpResponse) -> Result<()> {
    if (200..300).contains(&response.status) {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::Http {
        status: response.status,
        body: response.text(),
    })
}
