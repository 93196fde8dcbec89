//! Gateway tests over a real loopback listener.

mod common;

use common::{docx_bytes, ScriptedPdfEngine};
use edgequake_doc2md::engine::{ContentItem, OoxmlReader};
use edgequake_doc2md::server::{self, ConvertResponse, ErrorResponse, HealthResponse, MISSING_PATH};
use edgequake_doc2md::{ConversionConfig, Converter};
use reqwest::StatusCode;
use std::sync::atomic::Ordering;
use std::sync::Arc;

async fn spawn_gateway(engine: Arc<ScriptedPdfEngine>) -> String {
    let converter = Converter::with_engines(ConversionConfig::default(), engine, Arc::new(OoxmlReader));
    let app = server::build_router(Arc::new(converter));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn health_reports_ok() {
    let base = spawn_gateway(ScriptedPdfEngine::new(vec![])).await;
    let resp = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: HealthResponse = resp.json().await.unwrap();
    assert_eq!(body.status, "ok");
}

#[tokio::test]
async fn converts_pdf_path() {
    let docs = tempfile::tempdir().unwrap();
    let pdf = docs.path().join("a.pdf");
    std::fs::write(&pdf, b"%PDF-1.7").unwrap();
    let engine = ScriptedPdfEngine::new(vec![
        ContentItem::text(0, "Title"),
        ContentItem::image(0, "p1_0.png"),
        ContentItem::text(0, "Body"),
    ]);
    let base = spawn_gateway(engine).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/convert"))
        .json(&serde_json::json!({ "path": pdf.to_str().unwrap() }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: ConvertResponse = resp.json().await.unwrap();
    assert_eq!(body.markdown, "Title\n\nBody\n\n");
}

#[tokio::test]
async fn converts_docx_path() {
    let docs = tempfile::tempdir().unwrap();
    let path = docs.path().join("b.DOCX");
    std::fs::write(&path, docx_bytes(&["one", "two"])).unwrap();
    let base = spawn_gateway(ScriptedPdfEngine::new(vec![])).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/convert"))
        .json(&serde_json::json!({ "path": path.to_str().unwrap() }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: ConvertResponse = resp.json().await.unwrap();
    assert_eq!(body.markdown, "one\ntwo\n");
}

#[tokio::test]
async fn missing_or_empty_path_is_bad_request() {
    let engine = ScriptedPdfEngine::new(vec![ContentItem::text(0, "never")]);
    let base = spawn_gateway(engine.clone()).await;
    let client = reqwest::Client::new();

    for body in [
        serde_json::json!({}),
        serde_json::json!({ "path": "" }),
        serde_json::json!({ "path": null }),
        serde_json::json!({ "file": "/a.pdf" }),
    ] {
        let resp = client
            .post(format!("{base}/convert"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body: {body}");
        let err: ErrorResponse = resp.json().await.unwrap();
        assert_eq!(err.error, MISSING_PATH);
    }
    assert_eq!(engine.opened.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let base = spawn_gateway(ScriptedPdfEngine::new(vec![])).await;
    let resp = reqwest::Client::new()
        .post(format!("{base}/convert"))
        .header("content-type", "application/json")
        .body("{\"path\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let err: ErrorResponse = resp.json().await.unwrap();
    assert_eq!(err.error, MISSING_PATH);
}

#[tokio::test]
async fn conversion_failure_is_server_error() {
    let base = spawn_gateway(ScriptedPdfEngine::new(vec![])).await;
    let client = reqwest::Client::new();

    for (path, needle) in [
        ("/definitely/not/here.pdf", "not found"),
        ("/tmp/readme.txt", "Unsupported file type"),
    ] {
        let resp = client
            .post(format!("{base}/convert"))
            .json(&serde_json::json!({ "path": path }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR, "{path}");
        let err: ErrorResponse = resp.json().await.unwrap();
        assert!(err.error.contains(needle), "{path}: {}", err.error);
    }
}

#[tokio::test]
async fn engine_failure_is_server_error() {
    let docs = tempfile::tempdir().unwrap();
    let pdf = docs.path().join("c.pdf");
    std::fs::write(&pdf, b"%PDF-1.4").unwrap();
    let base = spawn_gateway(ScriptedPdfEngine::failing()).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/convert"))
        .json(&serde_json::json!({ "path": pdf.to_str().unwrap() }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let err: ErrorResponse = resp.json().await.unwrap();
    assert!(err.error.contains("layout analysis failed"), "{}", err.error);
}
