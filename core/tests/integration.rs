//! Forum and user round-trips against the live mock server.
//!
//! # Design
//! Each test starts its own mock server on a random port, then drives the
//! library over real HTTP through the default ureq transport.

use chrono::{TimeZone, Utc};
use mock_server::{Site, AVATAR_PNG};
use nodebb_core::{ApiError, Attr, Forum};
use serde_json::json;

/// Serve `site` on a background thread and return its base URL.
fn spawn(site: Site) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run_with(listener, site).await
        })
        .unwrap();
    });

    format!("http://{addr}/")
}

#[test]
fn forum_title_and_attributes() {
    let base = spawn(Site::demo());

    let forum = Forum::open(&base).unwrap();
    assert_eq!(forum.title(), "Mock NodeBB");
    assert_eq!(forum.url().as_str(), base);
    assert_eq!(forum.get("version"), Some(Attr::Raw(json!("3.6.0"))));
    assert_eq!(forum.index()["categories"].as_array().unwrap().len(), 2);
}

#[test]
fn title_falls_back_to_config_title() {
    let base = spawn(Site::with_config(json!({"title": "Test Forum"})));

    let forum = Forum::open(&base).unwrap();
    assert_eq!(forum.title(), "Test Forum");
}

#[test]
fn repeated_opens_see_the_same_snapshot() {
    let base = spawn(Site::demo());

    let first = Forum::open(&base).unwrap();
    let second = Forum::open(&base).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.get("maxPostLength"), second.get("maxPostLength"));
}

#[test]
fn user_profile_and_picture() {
    let base = spawn(Site::demo());
    let forum = Forum::open(&base).unwrap();

    // Step 1: fetch by display name; the mock resolves slugs case-insensitively.
    let user = forum.user("Alice").unwrap();
    assert_eq!(user.username(), "Alice");
    assert_eq!(user.profile().uid, Some(1));
    assert_eq!(
        user.joined().unwrap(),
        Some(Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap())
    );

    // Step 2: the picture handle points at the forum's upload path.
    let image = user.image().unwrap().expect("alice has a picture");
    assert_eq!(
        image.url().as_str(),
        format!("{base}assets/uploads/profile/1-profileavatar.png")
    );
    assert_eq!(image.owner(), "Alice");

    // Step 3: fetch the bytes.
    let data = image.fetch(forum.transport()).unwrap();
    assert_eq!(data.bytes, AVATAR_PNG);
    assert_eq!(data.content_type.as_deref(), Some("image/png"));
}

#[test]
fn user_without_picture() {
    let base = spawn(Site::demo());
    let forum = Forum::open(&base).unwrap();

    let user = forum.user("bob").unwrap();
    assert!(user.image().unwrap().is_none());
}

#[test]
fn unknown_user_is_not_found() {
    let base = spawn(Site::demo());
    let forum = Forum::open(&base).unwrap();

    let err = forum.user("nobody").unwrap_err();
    assert!(matches!(err, ApiError::NotFound));
}

#[test]
fn unreachable_host_is_connection_error() {
    // Bind and release a port so nothing is listening on it.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();

    let err = Forum::open(&format!("http://{addr}/")).unwrap_err();
    assert!(matches!(err, ApiError::Connection(_)), "got {err:?}");
}
