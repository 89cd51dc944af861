//! A read-only stand-in for the parts of the NodeBB API the client reads.
//!
//! Every response carries `X-Powered-By: NodeBB`, like a real instance.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    middleware,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// 1x1 transparent PNG.
pub const AVATAR_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f, 0x15, 0xc4,
    0x89, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0d, 0x0a, 0x2d, 0xb4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4e, 0x44, 0xae,
    0x42, 0x60, 0x82,
];

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub uid: u64,
    pub username: String,
    pub userslug: String,
    pub picture: Option<String>,
    pub joindate: u64,
    pub lastonline: u64,
    pub postcount: u64,
    pub reputation: i64,
    pub follower_count: u64,
    pub following_count: u64,
}

impl User {
    fn new(uid: u64, username: &str, picture: Option<&str>) -> Self {
        Self {
            uid,
            username: username.to_string(),
            userslug: username.to_lowercase(),
            picture: picture.map(str::to_string),
            joindate: 1_700_000_000_000,
            lastonline: 1_700_086_400_000,
            postcount: 3 * uid,
            reputation: 0,
            follower_count: 0,
            following_count: 0,
        }
    }
}

/// Everything the mock serves. Users are keyed by slug, pictures by file name.
#[derive(Clone, Debug)]
pub struct Site {
    pub index: Value,
    pub config: Value,
    pub users: HashMap<String, User>,
    pub pictures: HashMap<String, Vec<u8>>,
}

impl Site {
    pub fn demo() -> Self {
        let users = [
            User::new(1, "Alice", Some("/assets/uploads/profile/1-profileavatar.png")),
            User::new(2, "bob", None),
        ];
        Self {
            index: json!({
                "categories": [
                    {"cid": 1, "name": "General Discussion", "slug": "1/general-discussion"},
                    {"cid": 2, "name": "Announcements", "slug": "2/announcements"},
                ],
                "loggedIn": false,
            }),
            config: json!({
                "siteTitle": "Mock NodeBB",
                "version": "3.6.0",
                "maxPostLength": 32767,
                "relative_path": "",
            }),
            users: users
                .into_iter()
                .map(|u| (u.userslug.clone(), u))
                .collect(),
            pictures: HashMap::from([("1-profileavatar.png".to_string(), AVATAR_PNG.to_vec())]),
        }
    }

    /// The demo site with its config document replaced.
    pub fn with_config(config: Value) -> Self {
        Self {
            config,
            ..Self::demo()
        }
    }
}

pub type Db = Arc<Site>;

pub fn app() -> Router {
    app_with(Site::demo())
}

pub fn app_with(site: Site) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/api", get(index))
        .route("/api/", get(index))
        .route("/api/config", get(config))
        .route("/api/user/{userslug}", get(get_user))
        .route("/assets/uploads/profile/{file}", get(get_picture))
        .layer(middleware::map_response(powered_by))
        .with_state(Arc::new(site))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, site: Site) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(site)).await
}

async fn powered_by<B>(mut response: Response<B>) -> Response<B> {
    response
        .headers_mut()
        .insert("x-powered-by", HeaderValue::from_static("NodeBB"));
    response
}

async fn home() -> Html<&'static str> {
    Html("<!DOCTYPE html><html><head><title>Mock NodeBB</title></head><body></body></html>")
}

async fn index(State(db): State<Db>) -> Json<Value> {
    Json(db.index.clone())
}

async fn config(State(db): State<Db>) -> Json<Value> {
    Json(db.config.clone())
}

async fn get_user(
    State(db): State<Db>,
    Path(userslug): Path<String>,
) -> Result<Json<User>, (StatusCode, Json<Value>)> {
    tracing::debug!(%userslug, "user lookup");
    db.users
        .get(&userslug.to_lowercase())
        .cloned()
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, Json(json!({"error": "[[error:no-user]]"}))))
}

async fn get_picture(
    State(db): State<Db>,
    Path(file): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let bytes = db.pictures.get(&file).cloned().ok_or(StatusCode::NOT_FOUND)?;
    Ok(([(header::CONTENT_TYPE, "image/png")], bytes))
}
