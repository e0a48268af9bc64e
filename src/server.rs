//! Receiving side over HTTP.
//!
//! `POST /decode` takes an envelope as JSON and answers with the decode
//! response. `GET /health` and `GET /` describe the service. Decoding runs
//! on the blocking pool since correlation decoding is CPU bound.

use crate::error::Result;
use crate::pipeline::OrthogonalCodec;
use crate::receiver::respond;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::future::Future;
use tokio::net::TcpListener;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 5000;

/// Envelopes are about 18 times their input at the default width
const MAX_BODY_BYTES: usize = 256 * 1024 * 1024;

pub fn router(codec: OrthogonalCodec) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/decode", post(decode))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(codec)
}

async fn index() -> Json<Value> {
    Json(json!({
        "message": "Fanowire receiver",
        "endpoints": {
            "/decode": "POST - Decode compressed and encoded messages",
            "/health": "GET - Health check"
        }
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "message": "Server is running" }))
}

async fn decode(State(codec): State<OrthogonalCodec>, body: Bytes) -> Response {
    if !is_json_object(&body) {
        tracing::warn!("Rejecting /decode request without a JSON object ({} bytes)", body.len());
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "No JSON data received" })),
        )
            .into_response();
    }

    tracing::info!("Decoding {} byte envelope", body.len());
    match tokio::task::spawn_blocking(move || respond(&body, &codec)).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            tracing::error!("Decode task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// Non-empty JSON object
fn is_json_object(body: &[u8]) -> bool {
    matches!(serde_json::from_slice::<Value>(body), Ok(Value::Object(map)) if !map.is_empty())
}

/// Serve on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, codec: OrthogonalCodec, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tracing::info!(
        "Receiver listening on {} ({} bit blocks)",
        listener.local_addr()?,
        codec.block_bits()
    );
    axum::serve(listener, router(codec))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Bind `host:port` and serve until Ctrl-C
pub fn run(host: &str, port: u16, codec: OrthogonalCodec) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let listener = TcpListener::bind((host, port)).await?;
        serve(listener, codec, async {
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
            tracing::info!("Shutting down");
        })
        .await
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::DecodeResponse;
    use crate::sender::{build_envelope, SenderOptions};
    use crate::transport::{HttpTransport, Transport};
    use std::thread::JoinHandle;
    use std::time::Duration;
    use tokio::sync::oneshot;

    /// Receiver on an ephemeral port, stopped on drop
    struct Running {
        url: String,
        stop: Option<oneshot::Sender<()>>,
        handle: Option<JoinHandle<()>>,
    }

    impl Running {
        fn start(codec: OrthogonalCodec) -> Self {
            let (addr_tx, addr_rx) = std::sync::mpsc::channel();
            let (stop_tx, stop_rx) = oneshot::channel::<()>();
            let handle = std::thread::spawn(move || {
                let runtime = tokio::runtime::Runtime::new().unwrap();
                runtime.block_on(async move {
                    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
                    addr_tx.send(listener.local_addr().unwrap()).unwrap();
                    serve(listener, codec, async move {
                        let _ = stop_rx.await;
                    })
                    .await
                    .unwrap();
                });
            });
            let addr = addr_rx.recv().unwrap();
            Self {
                url: format!("http://{}", addr),
                stop: Some(stop_tx),
                handle: Some(handle),
            }
        }

        fn post(&self, body: &'static [u8]) -> reqwest::blocking::Response {
            reqwest::blocking::Client::new()
                .post(format!("{}/decode", self.url))
                .header("content-type", "application/json")
                .body(body)
                .send()
                .unwrap()
        }
    }

    impl Drop for Running {
        fn drop(&mut self) {
            if let Some(stop) = self.stop.take() {
                let _ = stop.send(());
            }
            if let Some(handle) = self.handle.take() {
                let _ = handle.join();
            }
        }
    }

    #[test]
    fn test_health_and_index() {
        let server = Running::start(OrthogonalCodec::new(7).unwrap());

        let health: Value = reqwest::blocking::get(format!("{}/health", server.url))
            .unwrap()
            .json()
            .unwrap();
        assert_eq!(health["status"], "healthy");

        let index: Value = reqwest::blocking::get(format!("{}/", server.url))
            .unwrap()
            .json()
            .unwrap();
        assert!(index["endpoints"]["/decode"].is_string());
    }

    #[test]
    fn test_missing_json_is_bad_request() {
        let server = Running::start(OrthogonalCodec::new(7).unwrap());
        let bodies: [&'static [u8]; 4] = [b"", b"not json", b"{}", b"null"];
        for body in bodies {
            let response = server.post(body);
            assert_eq!(response.status().as_u16(), 400);
            let error: Value = response.json().unwrap();
            assert_eq!(error["error"], "No JSON data received");
        }
    }

    #[test]
    fn test_bad_envelope_is_failure_body() {
        let server = Running::start(OrthogonalCodec::new(7).unwrap());
        let response = server.post(br#"{"encoded_message": "AAAA"}"#);
        assert_eq!(response.status().as_u16(), 200);
        match response.json::<DecodeResponse>().unwrap() {
            DecodeResponse::Failure(failure) => assert!(failure.message.starts_with("Decoding failed")),
            DecodeResponse::Success(_) => panic!("incomplete envelope must fail"),
        }
    }

    #[test]
    fn test_http_transport_roundtrip() {
        let codec = OrthogonalCodec::new(7).unwrap();
        let server = Running::start(codec.clone());
        let options = SenderOptions {
            error_percentage: 4.0,
            seed: Some(9),
            ..Default::default()
        };
        let envelope = build_envelope(b"over the wire and back", &codec, &options).unwrap();

        let transport = HttpTransport::new(&server.url, Duration::from_secs(10));
        match transport.deliver(&envelope).unwrap() {
            DecodeResponse::Success(report) => {
                assert!(report.sha256_match);
                assert_eq!(report.original_errors, envelope.errors);
                assert_eq!(report.decompressed_size, 22);
            }
            DecodeResponse::Failure(failure) => panic!("decode failed: {}", failure.error),
        }
    }

    #[test]
    fn test_width_mismatch_is_reported_not_fatal() {
        let server = Running::start(OrthogonalCodec::new(7).unwrap());
        let sender_codec = OrthogonalCodec::new(5).unwrap();
        let options = SenderOptions {
            block_bits: 5,
            ..Default::default()
        };
        let envelope = build_envelope(b"narrow", &sender_codec, &options).unwrap();

        let response = HttpTransport::new(&server.url, Duration::from_secs(10))
            .deliver(&envelope)
            .unwrap();
        assert!(!response.is_success());
        assert!(response.message().contains("Parameter mismatch"));
    }
}
