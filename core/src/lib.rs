//! Blocking client for the NodeBB forum API.
//!
//! # Overview
//! [`Forum::open`] probes a forum, then snapshots its index and config
//! documents. [`Forum::user`] fetches a profile, and [`User::image`] hands
//! out a picture handle whose bytes are fetched on request.
//!
//! # Design
//! - `NodeBbClient` builds `HttpRequest` values and parses `HttpResponse`
//!   values without touching the network (host-does-IO pattern). A
//!   [`Transport`] performs the round-trip; [`UreqTransport`] is the default.
//! - Snapshots keep the raw documents and expose coerced values through
//!   `get`: millisecond epochs and ISO 8601 strings become UTC date/times.
//! - Displaying an image is delegated to an [`ImageViewer`].
//!
//! ```no_run
//! use nodebb_core::{Forum, SystemViewer};
//!
//! let forum = Forum::open("https://community.nodebb.org/")?;
//! println!("{}", forum.title());
//! let user = forum.user("julian")?;
//! user.fetch_image()?.show(&SystemViewer)?;
//! # Ok::<(), nodebb_core::ApiError>(())
//! ```

pub mod client;
pub mod coerce;
pub mod error;
pub mod forum;
pub mod http;
pub mod image;
pub mod transport;
pub mod types;
pub mod user;

pub use client::{Document, NodeBbClient};
pub use coerce::{coerce, coerce_timestamp, Attr};
pub use error::{ApiError, Result};
pub use forum::Forum;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use image::{Image, ImageViewer, SystemViewer};
pub use transport::{Transport, UreqTransport};
pub use types::{ImageData, UserProfile};
pub use user::User;
