//! Error types for the NodeBB client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "no such user" from "the server returned an unexpected status." All other
//! non-2xx responses land in `Http` with the raw status code and body.

use thiserror::Error;

/// Errors returned while opening a forum, fetching a user or an image.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The host could not be reached or the transfer failed midway.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The payload was not valid JSON or lacked an expected field.
    #[error("unexpected response format: {0}")]
    ResponseFormat(String),

    /// The server returned 404 for the requested resource.
    #[error("resource not found")]
    NotFound,

    /// A field known to hold a richer value could not be converted.
    #[error("cannot coerce field `{field}`: {reason}")]
    Coercion { field: String, reason: String },

    /// The base URL does not answer with `X-Powered-By: NodeBB`.
    #[error("not a NodeBB forum")]
    NotNodeBb,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ApiError>;
