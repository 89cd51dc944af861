//! Profile picture handles.
//!
//! Fetching and displaying are separate steps: [`Image::fetch`] returns the
//! bytes, and an [`ImageViewer`] decides what showing them means. The library
//! itself never opens windows or spawns processes unless the caller hands it
//! a [`SystemViewer`].

use std::io::Write;
use std::path::Path;
use std::process::Command;

use tracing::{debug, warn};
use url::Url;

use crate::client::{check_status, plain_headers};
use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::ImageData;

/// A remote image belonging to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    url: Url,
    owner: String,
}

impl Image {
    pub fn new(url: Url, owner: &str) -> Self {
        Self {
            url,
            owner: owner.to_string(),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Username of the profile this picture belongs to.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn build_request(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.url.to_string(),
            headers: plain_headers(),
        }
    }

    pub fn parse_response(&self, response: HttpResponse) -> Result<ImageData> {
        check_status(&response)?;
        if response.body.is_empty() {
            return Err(ApiError::ResponseFormat(format!(
                "empty image body from {}",
                self.url
            )));
        }
        let content_type = response.header("content-type").map(str::to_string);
        Ok(ImageData {
            bytes: response.body,
            content_type,
        })
    }

    /// Blocking fetch of the image bytes.
    pub fn fetch(&self, transport: &dyn Transport) -> Result<ImageData> {
        let response = transport.execute(&self.build_request())?;
        let data = self.parse_response(response)?;
        debug!(owner = %self.owner, url = %self.url, bytes = data.bytes.len(), "fetched image");
        Ok(data)
    }
}

impl ImageData {
    /// Hand the bytes to a viewer.
    pub fn show(&self, viewer: &dyn ImageViewer) -> Result<()> {
        viewer.show(self)
    }
}

/// Something that can present image bytes to a person.
pub trait ImageViewer {
    fn show(&self, image: &ImageData) -> Result<()>;
}

/// Writes the image to a kept temp file and opens it with the desktop's
/// default application.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemViewer;

impl ImageViewer for SystemViewer {
    fn show(&self, image: &ImageData) -> Result<()> {
        let mut file = tempfile::Builder::new()
            .prefix("nodebb-")
            .suffix(&format!(".{}", image.extension()))
            .tempfile()?;
        file.write_all(&image.bytes)?;
        // The viewer may read the file after we return.
        let (_, path) = file.keep().map_err(|e| ApiError::Io(e.error))?;

        let status = opener(&path).status()?;
        if !status.success() {
            warn!(path = %path.display(), %status, "image viewer exited with failure");
            return Err(ApiError::Io(std::io::Error::other(format!(
                "viewer exited with {status}"
            ))));
        }
        Ok(())
    }
}

#[cfg(target_os = "macos")]
fn opener(path: &Path) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(path);
    cmd
}

#[cfg(target_os = "windows")]
fn opener(path: &Path) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", ""]).arg(path);
    cmd
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn opener(path: &Path) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(path);
    cmd
}
