use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use std::fs;
use tower::ServiceExt;

use rax_file_store::protocol::router;
use rax_file_store::{AppState, ServerConfig, StorageRoot};

const BOUNDARY: &str = "rax-test-boundary";

// Helper to build the router over a fresh storage root
fn setup_app() -> (tempfile::TempDir, StorageRoot, Router) {
    let tmp = tempfile::tempdir().unwrap();
    let root = StorageRoot::open(tmp.path()).unwrap();
    let config = ServerConfig {
        storage_root: tmp.path().to_string_lossy().into_owned(),
        ..ServerConfig::default()
    };
    let app = router(AppState::new(root.clone(), config));
    (tmp, root, app)
}

// Helper to encode a multipart body: text fields first, then an optional file
fn multipart(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, content)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::HOST, "store.test")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::HOST, "store.test")
        .body(Body::empty())
        .unwrap()
}

// Helper to send a request and decode the JSON response
async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_health() {
    let (_tmp, _root, app) = setup_app();
    let (status, json) = send(&app, request(Method::GET, "/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_upload_echoes_metadata() {
    let (_tmp, root, app) = setup_app();

    let body = multipart(&[("folder", "pics"), ("filename", "photo")], Some(("photo.jpg", &b"jpeg"[..])));
    let (status, json) = send(&app, upload_request("/upload", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["filename"], "photo.jpg");
    assert_eq!(json["directory"], "pics");
    assert_eq!(json["relative_path"], "pics/photo.jpg");
    assert_eq!(json["url"], "http://store.test/pics/photo.jpg");
    assert_eq!(json["size"], 4);
    assert_eq!(fs::read(root.path().join("pics/photo.jpg")).unwrap(), b"jpeg");
}

#[tokio::test]
async fn test_upload_body_field_beats_query() {
    let (_tmp, root, app) = setup_app();

    let body = multipart(&[("directory", "from-body")], Some(("a.txt", &b"a"[..])));
    let (status, json) = send(&app, upload_request("/upload?directory=from-query&filename=renamed", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["relative_path"], "from-body/renamed.txt");
    assert!(root.path().join("from-body/renamed.txt").is_file());
    assert!(!root.path().join("from-query").exists());
}

#[tokio::test]
async fn test_upload_without_file_is_rejected() {
    let (_tmp, _root, app) = setup_app();

    let body = multipart(&[("directory", "pics")], None);
    let (status, json) = send(&app, upload_request("/upload", body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["kind"], "NoFileProvided");
}

#[tokio::test]
async fn test_upload_traversal_is_forbidden() {
    let (tmp, _root, app) = setup_app();

    let body = multipart(&[("directory", "../../escape")], Some(("x.txt", &b"x"[..])));
    let (status, json) = send(&app, upload_request("/upload", body)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error"]["kind"], "PathEscape");
    assert!(!tmp.path().join("../escape").exists());
}

#[tokio::test]
async fn test_list_info_static_and_delete() {
    let (_tmp, _root, app) = setup_app();

    for name in ["a.txt", "b.txt"] {
        let body = multipart(&[("folder", "docs")], Some((name, &b"hello"[..])));
        let (status, _) = send(&app, upload_request("/upload", body)).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, listing) = send(&app, request(Method::GET, "/files?directory=docs")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["count"], 2);
    let mut paths: Vec<&str> = listing["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["path"].as_str().unwrap())
        .collect();
    paths.sort();
    assert_eq!(paths, ["docs/a.txt", "docs/b.txt"]);

    let (status, info) = send(&app, request(Method::GET, "/files/info?path=docs/a.txt")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(info["size"], 5);
    assert_eq!(info["is_file"], true);
    assert_eq!(info["url"], "http://store.test/docs/a.txt");

    let response = app
        .clone()
        .oneshot(request(Method::GET, "/docs/a.txt"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"hello");

    let (status, deleted) = send(&app, request(Method::DELETE, "/files?path=docs/a.txt")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["deleted"], "docs/a.txt");

    let (status, json) = send(&app, request(Method::GET, "/files/info?path=docs/a.txt")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["kind"], "NotFound");
}

#[tokio::test]
async fn test_error_kinds_map_to_statuses() {
    let (_tmp, root, app) = setup_app();
    fs::create_dir_all(root.path().join("dir")).unwrap();
    fs::write(root.path().join("file.txt"), b"x").unwrap();

    let (status, json) = send(&app, request(Method::DELETE, "/files?path=dir")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["kind"], "NotAFile");
    assert!(root.path().join("dir").is_dir());

    let (status, json) = send(&app, request(Method::GET, "/files?directory=file.txt")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["kind"], "NotADirectory");

    let (status, json) = send(&app, request(Method::GET, "/files?directory=missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["kind"], "NotFound");

    let (status, json) = send(&app, request(Method::GET, "/files/info?path=../x")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error"]["kind"], "PathEscape");
}

#[tokio::test]
async fn test_list_defaults_to_root() {
    let (_tmp, root, app) = setup_app();
    fs::write(root.path().join("top.txt"), b"top").unwrap();

    let (status, listing) = send(&app, request(Method::GET, "/files")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["directory"], "");
    assert_eq!(listing["count"], 1);
    assert_eq!(listing["files"][0]["path"], "top.txt");
}
