//! User profile snapshots.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::info;

use crate::client::Document;
use crate::coerce::{coerce, coerce_timestamp, Attr};
use crate::error::{ApiError, Result};
use crate::forum::{write_document, Forum};
use crate::image::Image;
use crate::types::{ImageData, UserProfile};

/// A user's profile as it was when fetched, scoped to its forum.
#[derive(Debug, Clone)]
pub struct User<'f> {
    forum: &'f Forum,
    data: Document,
    profile: UserProfile,
}

impl<'f> User<'f> {
    pub(crate) fn fetch(forum: &'f Forum, username: &str) -> Result<Self> {
        let client = forum.client();
        let request = client.build_user(username)?;
        let data = client.parse_user(forum.transport().execute(&request)?)?;
        let profile: UserProfile = serde_json::from_value(Value::Object(data.clone()))
            .map_err(|e| ApiError::ResponseFormat(format!("user {username}: {e}")))?;

        info!(forum = %forum.url(), username = %profile.username, uid = ?profile.uid, "fetched user");
        Ok(Self {
            forum,
            data,
            profile,
        })
    }

    pub fn forum(&self) -> &'f Forum {
        self.forum
    }

    /// The username as the server spells it.
    pub fn username(&self) -> &str {
        &self.profile.username
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// The full profile document.
    pub fn data(&self) -> &Document {
        &self.data
    }

    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Coerced value of `key`; see [`coerce`].
    pub fn get(&self, key: &str) -> Option<Attr> {
        self.raw(key).map(coerce)
    }

    /// When the account was created. `None` if the server omits it.
    pub fn joined(&self) -> Result<Option<DateTime<Utc>>> {
        timestamp("joindate", self.profile.joindate.as_ref())
    }

    pub fn last_online(&self) -> Result<Option<DateTime<Utc>>> {
        timestamp("lastonline", self.profile.lastonline.as_ref())
    }

    /// Handle to the profile picture, or `None` if the user has none.
    pub fn image(&self) -> Result<Option<Image>> {
        self.profile
            .picture()
            .map(|picture| -> Result<Image> {
                let url = self.forum.client().resolve_picture(picture)?;
                Ok(Image::new(url, self.username()))
            })
            .transpose()
    }

    /// Fetch the profile picture bytes through the forum's transport.
    pub fn fetch_image(&self) -> Result<ImageData> {
        match self.image()? {
            Some(image) => image.fetch(self.forum.transport()),
            None => Err(ApiError::NotFound),
        }
    }

    /// Write the profile document to `<dir>/<username>.json`.
    pub fn dump_data(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let name = self.username().replace(['/', '\\'], "_");
        write_document(dir.as_ref().join(format!("{name}.json")), &self.data)
    }
}

fn timestamp(field: &str, value: Option<&Value>) -> Result<Option<DateTime<Utc>>> {
    value.map(|v| coerce_timestamp(field, v)).transpose()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;
    use serde_json::json;

    use super::*;
    use crate::http::{HttpMethod, HttpResponse};
    use crate::transport::fake::FakeTransport;

    const BASE: &str = "http://forum.test/";
    const PICTURE: &str = "http://forum.test/assets/uploads/profile/2-profileavatar.png";

    fn forum() -> Forum {
        let transport = FakeTransport::nodebb(BASE)
            .json("http://forum.test/api/", json!({}))
            .json("http://forum.test/api/config", json!({"siteTitle": "Test Forum"}))
            .json(
                "http://forum.test/api/user/alice",
                json!({
                    "uid": 2,
                    "username": "alice",
                    "userslug": "alice",
                    "picture": "/assets/uploads/profile/2-profileavatar.png",
                    "joindate": 1700000000000u64,
                    "lastonline": "2023-11-15T08:00:00.000Z",
                    "postcount": 5,
                    "aboutme": "hi",
                }),
            )
            .json(
                "http://forum.test/api/user/bob",
                json!({"uid": 3, "username": "bob", "picture": null, "joindate": "soon"}),
            )
            .route(
                HttpMethod::Get,
                PICTURE,
                HttpResponse {
                    status: 200,
                    headers: vec![("content-type".to_string(), "image/png".to_string())],
                    body: b"\x89PNG\r\n\x1a\n".to_vec(),
                },
            );
        Forum::with_transport(BASE, Arc::new(transport)).unwrap()
    }

    #[test]
    fn fetches_profile_fields() {
        let forum = forum();
        let user = forum.user("alice").unwrap();
        assert_eq!(user.username(), "alice");
        assert_eq!(user.profile().postcount, Some(5));
        assert_eq!(user.get("aboutme").unwrap().as_str(), Some("hi"));
        assert_eq!(
            user.joined().unwrap(),
            Some(Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap())
        );
        assert_eq!(
            user.last_online().unwrap(),
            Some(Utc.with_ymd_and_hms(2023, 11, 15, 8, 0, 0).unwrap())
        );
        assert!(user.get("joindate").unwrap().as_datetime().is_some());
        assert!(std::ptr::eq(user.forum(), &forum));
    }

    #[test]
    fn image_resolves_against_forum() {
        let forum = forum();
        let user = forum.user("alice").unwrap();
        let image = user.image().unwrap().unwrap();
        assert_eq!(image.url().as_str(), PICTURE);
        assert_eq!(image.owner(), "alice");

        let data = user.fetch_image().unwrap();
        assert!(data.bytes.starts_with(b"\x89PNG"));
    }

    #[test]
    fn user_without_picture_has_no_image() {
        let forum = forum();
        let user = forum.user("bob").unwrap();
        assert_eq!(user.image().unwrap(), None);
        assert!(matches!(user.fetch_image(), Err(ApiError::NotFound)));
    }

    #[test]
    fn bad_timestamp_is_coercion_error_but_get_passes_through() {
        let forum = forum();
        let user = forum.user("bob").unwrap();
        assert!(matches!(user.joined(), Err(ApiError::Coercion { .. })));
        assert_eq!(user.get("joindate"), Some(Attr::Raw(json!("soon"))));
        assert_eq!(user.last_online().unwrap(), None);
    }

    #[test]
    fn unknown_user_is_not_found() {
        let forum = forum();
        assert!(matches!(forum.user("carol"), Err(ApiError::NotFound)));
    }

    #[test]
    fn dot_usernames_are_rejected_before_any_request() {
        let forum = forum();
        for name in [".", ".."] {
            assert!(matches!(forum.user(name), Err(ApiError::InvalidInput(_))));
        }
    }

    #[test]
    fn odd_counter_types_still_yield_a_user() {
        let transport = FakeTransport::nodebb(BASE)
            .json("http://forum.test/api/", json!({}))
            .json("http://forum.test/api/config", json!({"siteTitle": "Test Forum"}))
            .json(
                "http://forum.test/api/user/al",
                json!({"username": "al", "reputation": 1.5}),
            );
        let forum = Forum::with_transport(BASE, Arc::new(transport)).unwrap();
        let user = forum.user("al").unwrap();
        assert_eq!(user.profile().reputation, None);
        assert_eq!(user.raw("reputation"), Some(&json!(1.5)));
    }

    #[test]
    fn dump_data_uses_username() {
        let forum = forum();
        let user = forum.user("alice").unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = user.dump_data(dir.path()).unwrap();
        assert_eq!(path, dir.path().join("alice.json"));
        let back: Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(back["uid"], 2);
    }
}
