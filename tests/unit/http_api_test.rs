//! Unit tests for the HTTP surface.
//!
//! Each test builds the full router over a fresh in-memory store and drives
//! it through `tower::ServiceExt::oneshot`, checking status codes, JSON
//! bodies, and the uniform error shape.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use bookmarkd::database::Database;
use bookmarkd::http::{create_router, AppState};

fn app() -> Router {
    let db = Database::open_in_memory().expect("Failed to open in-memory database");
    create_router(AppState::new(db))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec();
    (status, bytes)
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, request).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn with_json(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

const BOUNDARY: &str = "bookmarkd-test-boundary";

/// Builds a single-part multipart upload carrying the given file payload.
fn upload(uri: &str, filename: &str, payload: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; \
             name=\"file\"; filename=\"{filename}\"\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(payload);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// The liveness probe reports ok and the crate version.
#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, body) = send_json(&app, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

/// A fresh store serves a tree holding just the root.
#[tokio::test]
async fn test_tree_starts_with_root() {
    let app = app();
    let (status, body) = send_json(&app, get("/api/tree")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "My Collections");
    assert_eq!(body["children"], json!([]));
    assert_eq!(body["bookmarks"], json!([]));
}

/// Creating a topic without a parent places it under the root and it shows
/// up in the tree.
#[tokio::test]
async fn test_create_topic() {
    let app = app();
    let (status, topic) =
        send_json(&app, with_json("POST", "/api/topics", json!({"name": "Dev"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(topic["name"], "Dev");
    assert!(topic["parent_id"].is_string());

    let (_, tree) = send_json(&app, get("/api/tree")).await;
    assert_eq!(tree["children"][0]["name"], "Dev");
}

/// An unknown parent is a 404 with the uniform error body.
#[tokio::test]
async fn test_create_topic_unknown_parent() {
    let app = app();
    let (status, body) = send_json(
        &app,
        with_json(
            "POST",
            "/api/topics",
            json!({"name": "Orphan", "parent_id": "no-such-id"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "TOPIC_NOT_FOUND");
    assert!(body["message"].as_str().unwrap().contains("no-such-id"));
}

/// Rename and cascade delete work over the API; the root refuses deletion.
#[tokio::test]
async fn test_rename_and_delete_topic() {
    let app = app();
    let (_, topic) =
        send_json(&app, with_json("POST", "/api/topics", json!({"name": "Old"}))).await;
    let id = topic["id"].as_str().unwrap();

    let (status, renamed) = send_json(
        &app,
        with_json("PATCH", &format!("/api/topics/{id}"), json!({"name": "New"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["name"], "New");

    let (status, _) = send(
        &app,
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/topics/{id}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, tree) = send_json(&app, get("/api/tree")).await;
    let root_id = tree["id"].as_str().unwrap();
    let (status, body) = send(
        &app,
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/topics/{root_id}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["code"], "ROOT_PROTECTED");
}

/// A bookmark without a topic lands under the root; an empty title falls
/// back to the url.
#[tokio::test]
async fn test_create_bookmark_defaults() {
    let app = app();
    let (status, bookmark) = send_json(
        &app,
        with_json(
            "POST",
            "/api/bookmarks",
            json!({"url": "https://www.rust-lang.org"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(bookmark["title"], "https://www.rust-lang.org");
    assert!(bookmark["notes"].is_null());

    let (_, tree) = send_json(&app, get("/api/tree")).await;
    assert_eq!(tree["bookmarks"][0]["url"], "https://www.rust-lang.org");
}

/// A blank url is rejected as a validation error.
#[tokio::test]
async fn test_create_bookmark_empty_url() {
    let app = app();
    let (status, body) = send_json(
        &app,
        with_json("POST", "/api/bookmarks", json!({"url": "   "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

/// Partial edits keep absent fields; deleting twice turns into a 404.
#[tokio::test]
async fn test_update_and_delete_bookmark() {
    let app = app();
    let (_, bookmark) = send_json(
        &app,
        with_json(
            "POST",
            "/api/bookmarks",
            json!({"title": "Rust", "url": "https://www.rust-lang.org"}),
        ),
    )
    .await;
    let id = bookmark["id"].as_str().unwrap();

    let (status, updated) = send_json(
        &app,
        with_json(
            "PATCH",
            &format!("/api/bookmarks/{id}"),
            json!({"notes": "read later"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Rust");
    assert_eq!(updated["notes"], "read later");

    let delete = |id: String| {
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/bookmarks/{id}"))
            .body(Body::empty())
            .unwrap()
    };
    let (status, _) = send(&app, delete(id.to_string())).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = send_json(&app, delete(id.to_string())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "BOOKMARK_NOT_FOUND");
}

/// Moving a bookmark is visible through the per-topic listing.
#[tokio::test]
async fn test_move_bookmark_and_list() {
    let app = app();
    let (_, topic) =
        send_json(&app, with_json("POST", "/api/topics", json!({"name": "Dev"}))).await;
    let topic_id = topic["id"].as_str().unwrap();
    let (_, bookmark) = send_json(
        &app,
        with_json(
            "POST",
            "/api/bookmarks",
            json!({"title": "Rust", "url": "https://www.rust-lang.org"}),
        ),
    )
    .await;
    let id = bookmark["id"].as_str().unwrap();

    let (status, moved) = send_json(
        &app,
        with_json(
            "POST",
            &format!("/api/bookmarks/{id}/move"),
            json!({"topic_id": topic_id}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["topic_id"], *topic_id);

    let (status, listed) =
        send_json(&app, get(&format!("/api/topics/{topic_id}/bookmarks"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    // The root no longer holds it directly, but the subtree listing does
    let (_, tree) = send_json(&app, get("/api/tree")).await;
    let root_id = tree["id"].as_str().unwrap();
    let (_, direct) = send_json(&app, get(&format!("/api/topics/{root_id}/bookmarks"))).await;
    assert_eq!(direct.as_array().unwrap().len(), 0);
    let (_, subtree) = send_json(
        &app,
        get(&format!("/api/topics/{root_id}/bookmarks?include_sub=true")),
    )
    .await;
    assert_eq!(subtree.as_array().unwrap().len(), 1);
}

/// A bulk delete with one unknown id changes nothing; a clean batch reports
/// the touched count.
#[tokio::test]
async fn test_bulk_delete_all_or_nothing() {
    let app = app();
    let mut ids = Vec::new();
    for url in ["https://a.example", "https://b.example"] {
        let (_, bookmark) =
            send_json(&app, with_json("POST", "/api/bookmarks", json!({"url": url}))).await;
        ids.push(bookmark["id"].as_str().unwrap().to_string());
    }

    let (status, body) = send_json(
        &app,
        with_json(
            "POST",
            "/api/bookmarks/bulk-delete",
            json!({"ids": [ids[0], "no-such-id"]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "BOOKMARK_NOT_FOUND");

    let (_, hits) = send_json(&app, get("/api/search?q=example")).await;
    assert_eq!(hits.as_array().unwrap().len(), 2);

    let (status, outcome) = send_json(
        &app,
        with_json("POST", "/api/bookmarks/bulk-delete", json!({"ids": ids})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["affected"], 2);
    let (_, hits) = send_json(&app, get("/api/search?q=example")).await;
    assert_eq!(hits.as_array().unwrap().len(), 0);
}

/// Search matches case-insensitively and honors the domain filter.
#[tokio::test]
async fn test_search_and_duplicates() {
    let app = app();
    for (title, url) in [
        ("Repo", "https://github.com/serde-rs/serde"),
        ("Docs", "https://docs.rs/serde"),
        ("Dup", "https://docs.rs/serde"),
    ] {
        send_json(
            &app,
            with_json("POST", "/api/bookmarks", json!({"title": title, "url": url})),
        )
        .await;
    }

    let (status, hits) = send_json(&app, get("/api/search?q=SERDE")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hits.as_array().unwrap().len(), 3);

    let (_, hits) = send_json(&app, get("/api/search?q=serde&domain=github.com")).await;
    assert_eq!(hits.as_array().unwrap().len(), 1);
    assert_eq!(hits[0]["title"], "Repo");

    let (status, groups) = send_json(&app, get("/api/duplicates")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(groups.as_array().unwrap().len(), 1);
    assert_eq!(groups[0]["url"], "https://docs.rs/serde");
}

/// The HTML export downloads as an attachment in the Netscape format.
#[tokio::test]
async fn test_export_html_attachment() {
    let app = app();
    send_json(
        &app,
        with_json(
            "POST",
            "/api/bookmarks",
            json!({"title": "Rust", "url": "https://www.rust-lang.org"}),
        ),
    )
    .await;

    let response = app.clone().oneshot(get("/api/export.html")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(
        headers.get(header::CONTENT_TYPE).unwrap(),
        "text/html; charset=utf-8"
    );
    assert_eq!(
        headers.get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"bookmarks.html\""
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(body.starts_with("<!DOCTYPE NETSCAPE-Bookmark-file-1>"));
    assert!(body.contains("https://www.rust-lang.org"));
}

/// A JSON upload imports through the multipart endpoint and reports its
/// summary.
#[tokio::test]
async fn test_import_json_upload() {
    let app = app();
    let payload = json!([
        {"title": "Rust", "url": "https://www.rust-lang.org", "topic_path": "Dev"},
        {"title": "No Url", "topic_path": "Dev"}
    ])
    .to_string();

    let (status, summary) = send_json(
        &app,
        upload("/api/import/json", "bookmarks.json", payload.as_bytes()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["bookmarks_imported"], 1);
    assert_eq!(summary["bookmarks_skipped"], 1);
    assert_eq!(summary["topics_created"], 1);

    let (_, tree) = send_json(&app, get("/api/tree")).await;
    assert_eq!(tree["children"][0]["name"], "Dev");
    assert_eq!(
        tree["children"][0]["bookmarks"][0]["url"],
        "https://www.rust-lang.org"
    );
}

/// An upload the decoder does not recognize is a 400, and an upload with no
/// file part is rejected before decoding.
#[tokio::test]
async fn test_import_rejects_bad_uploads() {
    let app = app();
    let (status, body) = send_json(
        &app,
        upload("/api/import/html", "notes.txt", b"just some text"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "UNRECOGNIZED_FORMAT");

    let empty = Request::builder()
        .method("POST")
        .uri("/api/import/html")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(format!("--{BOUNDARY}--\r\n")))
        .unwrap();
    let (status, body) = send_json(&app, empty).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MISSING_FILE");
}

/// A downloaded backup restores into another instance with the data intact.
#[tokio::test]
async fn test_backup_restore_round_trip() {
    let source = app();
    send_json(
        &source,
        with_json(
            "POST",
            "/api/bookmarks",
            json!({"title": "Rust", "url": "https://www.rust-lang.org"}),
        ),
    )
    .await;

    let (status, snapshot) = send(&source, get("/api/backup")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(snapshot.starts_with(b"SQLite format 3\0"));

    let target = app();
    let (status, _) = send(&target, upload("/api/restore", "bookmarkd.sqlite3", &snapshot)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, hits) = send_json(&target, get("/api/search?q=rust")).await;
    assert_eq!(hits.as_array().unwrap().len(), 1);
    assert_eq!(hits[0]["url"], "https://www.rust-lang.org");
}

/// A restore upload that is not a SQLite file is rejected and the store
/// keeps serving.
#[tokio::test]
async fn test_restore_rejects_garbage() {
    let app = app();
    let (status, body) = send_json(
        &app,
        upload("/api/restore", "fake.sqlite3", b"definitely not a database"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "NOT_A_SQLITE_FILE");

    let (status, _) = send_json(&app, get("/api/tree")).await;
    assert_eq!(status, StatusCode::OK);
}
