#![allow(dead_code)]

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use codebeast_server::config::AppConfig;
use codebeast_server::server::{create_router, AppState};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use serde_json::{json, Value};
use std::io::Cursor;
use std::path::Path as FsPath;
use std::sync::{Arc, Mutex};
use url::Url;

/// Serve `app` on an ephemeral local port and return its base URL
pub async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A URL nothing is listening on
pub async fn unused_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

pub fn png_bytes(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(color)));
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png).unwrap();
    buffer.into_inner()
}

/// Requests seen by a fake upstream
#[derive(Clone, Default)]
pub struct Recorder {
    pub requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Recorder {
    fn record(&self, path: String, headers: HeaderMap, body: Bytes) {
        self.requests
            .lock()
            .unwrap()
            .push(RecordedRequest { path, headers, body });
    }

    pub fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last(&self) -> RecordedRequest {
        self.requests.lock().unwrap().last().cloned().expect("no request recorded")
    }

    pub fn last_json(&self) -> Value {
        serde_json::from_slice(&self.last().body).expect("request body is not JSON")
    }
}

#[derive(Clone)]
struct LangflowFake {
    recorder: Recorder,
    reply: Value,
    status: StatusCode,
}

/// Fake Langflow that answers every run with `text`
pub async fn fake_langflow(text: &str) -> (String, Recorder) {
    let reply = json!({
        "outputs": [{"outputs": [{"results": {"message": {"text": text}}}]}]
    });
    fake_langflow_with(reply, StatusCode::OK).await
}

pub async fn fake_langflow_with(reply: Value, status: StatusCode) -> (String, Recorder) {
    let recorder = Recorder::default();
    let fake = LangflowFake {
        recorder: recorder.clone(),
        reply,
        status,
    };

    async fn run(
        State(fake): State<LangflowFake>,
        Path(flow_id): Path<String>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Response {
        fake.recorder
            .record(format!("/api/v1/run/{}", flow_id), headers, body);
        (fake.status, Json(fake.reply.clone())).into_response()
    }

    let app = Router::new()
        .route("/api/v1/run/:flow_id", post(run))
        .with_state(fake);
    (spawn_server(app).await, recorder)
}

#[derive(Clone)]
struct DallEFake {
    recorder: Recorder,
    png: Vec<u8>,
    status: StatusCode,
}

/// Fake OpenAI images API; the returned URL points back at this server.
/// The base URL returned already includes `/v1`.
pub async fn fake_dall_e(png: Vec<u8>, status: StatusCode) -> (String, Recorder) {
    let recorder = Recorder::default();
    let fake = DallEFake {
        recorder: recorder.clone(),
        png,
        status,
    };

    async fn generations(State(fake): State<DallEFake>, headers: HeaderMap, body: Bytes) -> Response {
        let host = headers
            .get(header::HOST)
            .and_then(|h| h.to_str().ok())
            .unwrap_or_default()
            .to_string();
        fake.recorder
            .record("/v1/images/generations".to_string(), headers, body);
        if !fake.status.is_success() {
            return (fake.status, Json(json!({"error": {"message": "boom"}}))).into_response();
        }
        Json(json!({"data": [{"url": format!("http://{}/files/beast.png", host)}]})).into_response()
    }

    async fn file(State(fake): State<DallEFake>) -> Response {
        ([(header::CONTENT_TYPE, "image/png")], fake.png.clone()).into_response()
    }

    let app = Router::new()
        .route("/v1/images/generations", post(generations))
        .route("/files/beast.png", get(file))
        .with_state(fake);
    (format!("{}/v1", spawn_server(app).await), recorder)
}

#[derive(Clone)]
struct StabilityFake {
    recorder: Recorder,
    png: Vec<u8>,
    finish_reason: &'static str,
}

/// Fake Stability endpoint; returns the generation URL
pub async fn fake_stability(png: Vec<u8>, finish_reason: &'static str) -> (String, Recorder) {
    let recorder = Recorder::default();
    let fake = StabilityFake {
        recorder: recorder.clone(),
        png,
        finish_reason,
    };

    async fn generate(State(fake): State<StabilityFake>, headers: HeaderMap, body: Bytes) -> Response {
        fake.recorder
            .record("/v2beta/stable-image/generate/sd3".to_string(), headers, body);
        (
            [
                (header::CONTENT_TYPE.as_str(), "image/png"),
                ("finish-reason", fake.finish_reason),
            ],
            fake.png.clone(),
        )
            .into_response()
    }

    let app = Router::new()
        .route("/v2beta/stable-image/generate/sd3", post(generate))
        .with_state(fake);
    (
        format!("{}/v2beta/stable-image/generate/sd3", spawn_server(app).await),
        recorder,
    )
}

/// Configuration pointing at the given fakes, writing images below `static_dir`
pub fn test_config(
    langflow_url: &str,
    dall_e_url: &str,
    stability_url: Option<&str>,
    static_dir: &FsPath,
) -> AppConfig {
    let mut config = AppConfig::new(Url::parse(langflow_url).unwrap(), "test-flow", "sk-test").unwrap();
    config.openai_base_url = Url::parse(dall_e_url).unwrap();
    if let Some(stability_url) = stability_url {
        config.stability_api_key = Some("stability-test".to_string());
        config.stability_url = Url::parse(stability_url).unwrap();
    }
    config.static_dir = static_dir.to_path_buf();
    config
}

/// Run the full application against `config` and return its base URL
pub async fn spawn_app(config: AppConfig) -> String {
    let state = AppState::from_config(config).unwrap();
    state.store.ensure_dir().await.unwrap();
    spawn_server(create_router(state)).await
}
