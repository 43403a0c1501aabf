#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response};
use parlemoi_gateway::test_support::ScriptedProvider;
use parlemoi_gateway::{
    ConversationStore, DEFAULT_CHAT_MODEL, DEFAULT_MAX_JSON_BYTES, GatewayOptions, GatewayState,
    router,
};
use serde_json::Value;

pub const BOUNDARY: &str = "parlemoi-test-boundary";

/// Router over a `ScriptedProvider`, plus handles to inspect provider calls and history.
pub struct TestGateway {
    pub app: Router,
    pub provider: Arc<ScriptedProvider>,
    pub conversations: ConversationStore,
}

pub fn options(upload_dir: &Path) -> GatewayOptions {
    GatewayOptions {
        chat_model: DEFAULT_CHAT_MODEL.to_string(),
        upload_dir: upload_dir.to_path_buf(),
        max_upload_bytes: 64 * 1024,
        max_json_bytes: DEFAULT_MAX_JSON_BYTES,
        allowed_origins: Vec::new(),
        rate_limit_max_requests: 50,
        rate_limit_window: Duration::from_secs(900),
    }
}

pub fn test_gateway(options: GatewayOptions) -> TestGateway {
    let provider = Arc::new(ScriptedProvider::new());
    let conversations = ConversationStore::new(10);
    let state = GatewayState::new(provider.clone(), conversations.clone(), options);
    TestGateway {
        app: router(state),
        provider,
        conversations,
    }
}

pub fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Hand-built multipart body: optional `audio` file part and optional `language` text part.
pub fn stt_request(audio: Option<(&str, &str, &[u8])>, language: Option<&str>) -> Request<Body> {
    let mut body = Vec::new();
    if let Some((file_name, mime, bytes)) = audio {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"audio\"; filename=\"{file_name}\"\r\nContent-Type: {mime}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    if let Some(language) = language {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"language\"\r\n\r\n{language}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    Request::post("/stt")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub fn dir_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).map_or(0, Iterator::count)
}
