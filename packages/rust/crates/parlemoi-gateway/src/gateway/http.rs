//! HTTP gateway: router wiring (routes, body limits, rate limit, security headers, CORS,
//! tracing, panic boundary) and server loop.
//!
//! Handlers translate their own failures (400/413/415/500); anything that escapes them
//! as a panic is turned into a generic 500 by `CatchPanicLayer`, so no request can take
//! the process down.

use std::any::Any;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Method, StatusCode, header},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{self, AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use super::chat::handle_chat;
use super::error::INTERNAL_ERROR_MESSAGE;
use super::info::{
    handle_feedback, handle_frequencies, handle_health, handle_index, handle_prompt_version,
};
use super::rate_limit::enforce_rate_limit;
use super::speech::handle_speech;
use super::state::GatewayState;
use super::transcription::handle_transcription;

/// Room for multipart boundaries and small text fields on top of the audio limit.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Browser-hardening response headers, set unless a handler already chose a value.
pub const SECURITY_HEADERS: [(&str, &str); 12] = [
    (
        "content-security-policy",
        "default-src 'self';base-uri 'self';font-src 'self' https: data:;form-action 'self';frame-ancestors 'self';img-src 'self' data:;object-src 'none';script-src 'self';script-src-attr 'none';style-src 'self' https: 'unsafe-inline';upgrade-insecure-requests",
    ),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("origin-agent-cluster", "?1"),
    ("referrer-policy", "no-referrer"),
    ("strict-transport-security", "max-age=15552000; includeSubDomains"),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-permitted-cross-domain-policies", "none"),
    ("x-xss-protection", "0"),
];

fn with_security_headers(mut app: Router<GatewayState>) -> Router<GatewayState> {
    for (name, value) in SECURITY_HEADERS {
        app = app.layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        ));
    }
    app
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let methods = [Method::GET, Method::POST];
    if allowed_origins.is_empty() || allowed_origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(cors::Any)
            .allow_methods(methods)
            .allow_headers(cors::Any);
    }
    let origins = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!(origin = %origin, error = %error, "ignoring invalid CORS origin");
                None
            }
        })
        .collect::<Vec<_>>();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(methods)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(
        event = "gateway.internal.panic",
        panic = %message,
        "request handler panicked"
    );
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": INTERNAL_ERROR_MESSAGE, "message": message })),
    )
        .into_response()
}

/// Build the gateway router (all routes of the public API).
pub fn router(state: GatewayState) -> Router {
    let upload_limit = state
        .options
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    let json_limit = state.options.max_json_bytes;
    let cors_policy = cors_layer(&state.options.allowed_origins);
    let routes = Router::new()
        .route("/", get(handle_index))
        .route("/health", get(handle_health))
        .route("/chat", post(handle_chat))
        .route(
            "/stt",
            post(handle_transcription).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/tts", post(handle_speech))
        .route("/frequencies", get(handle_frequencies))
        .route("/feedback", post(handle_feedback))
        .route("/prompts/version", get(handle_prompt_version))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            enforce_rate_limit,
        ))
        .layer(DefaultBodyLimit::max(json_limit));
    with_security_headers(routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_policy)
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

/// Run the HTTP server; binds to `bind_addr` (e.g. `0.0.0.0:3000`).
/// Creates the upload directory first. Graceful shutdown on Ctrl+C (SIGINT) and SIGTERM (Unix);
/// in-flight requests complete before exit.
pub async fn run_http(state: GatewayState, bind_addr: &str) -> Result<()> {
    let upload_dir = state.options.upload_dir.clone();
    tokio::fs::create_dir_all(&upload_dir)
        .await
        .with_context(|| format!("failed to create upload dir {}", upload_dir.display()))?;
    let app = router(state);
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(
        "Parle-moi gateway listening on {} (upload_dir={}, Ctrl+C/SIGTERM to stop)",
        bind_addr,
        upload_dir.display()
    );
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
    tracing::info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %error, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(error) => {
                tracing::warn!(error = %error, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
