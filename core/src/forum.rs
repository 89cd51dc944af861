//! Forum snapshots.
//!
//! # Design
//! `Forum` performs all of its I/O in the constructor: the platform probe,
//! the index document and the config document. After that it is an
//! immutable snapshot; users are fetched on demand and borrow the forum for
//! its endpoint and transport.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::client::{site_title, Document, NodeBbClient};
use crate::coerce::{coerce, Attr};
use crate::error::{ApiError, Result};
use crate::transport::{Transport, UreqTransport};
use crate::user::User;

pub struct Forum {
    client: NodeBbClient,
    transport: Arc<dyn Transport>,
    index: Document,
    config: Document,
    title: String,
}

impl Forum {
    /// Open the forum at `base_url` over a default blocking transport.
    pub fn open(base_url: &str) -> Result<Self> {
        Self::with_transport(base_url, Arc::new(UreqTransport::new()))
    }

    pub fn with_transport(base_url: &str, transport: Arc<dyn Transport>) -> Result<Self> {
        let client = NodeBbClient::new(base_url)?;

        let probe = transport.execute(&client.build_probe())?;
        client.parse_probe(&probe)?;
        debug!(url = %client.base_url(), "NodeBB header present");

        let index = client.parse_index(transport.execute(&client.build_index())?)?;
        let config = client.parse_config(transport.execute(&client.build_config()?)?)?;
        let title = site_title(&config)?;

        info!(url = %client.base_url(), %title, "opened forum");
        Ok(Self {
            client,
            transport,
            index,
            config,
            title,
        })
    }

    pub fn url(&self) -> &Url {
        self.client.base_url()
    }

    pub fn endpoint(&self) -> &Url {
        self.client.endpoint()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// The `GET api/` document.
    pub fn index(&self) -> &Document {
        &self.index
    }

    /// The `GET api/config` document.
    pub fn config(&self) -> &Document {
        &self.config
    }

    /// Raw value of `key`, looked up in the index document, then the config.
    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.index.get(key).or_else(|| self.config.get(key))
    }

    /// Coerced value of `key`; see [`coerce`].
    pub fn get(&self, key: &str) -> Option<Attr> {
        self.raw(key).map(coerce)
    }

    /// Fetch the profile of `username`.
    pub fn user(&self, username: &str) -> Result<User<'_>> {
        User::fetch(self, username)
    }

    /// Write the index document to `<dir>/forum.json`.
    pub fn dump_data(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        write_document(dir.as_ref().join("forum.json"), &self.index)
    }

    pub(crate) fn client(&self) -> &NodeBbClient {
        &self.client
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }
}

impl fmt::Debug for Forum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Forum")
            .field("url", &self.client.base_url().as_str())
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

/// Two snapshots are equal when they describe the same remote state.
impl PartialEq for Forum {
    fn eq(&self, other: &Self) -> bool {
        self.client == other.client
            && self.title == other.title
            && self.index == other.index
            && self.config == other.config
    }
}

/// Pretty-printed with top-level keys sorted.
pub(crate) fn write_document(path: PathBuf, document: &Document) -> Result<PathBuf> {
    let sorted: BTreeMap<&String, &Value> = document.iter().collect();
    let text = serde_json::to_string_pretty(&sorted)
        .map_err(|e| ApiError::ResponseFormat(e.to_string()))?;
    std::fs::write(&path, text)?;
    debug!(path = %path.display(), "dumped document");
    Ok(path)
}
