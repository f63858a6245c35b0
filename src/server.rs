use crate::config::AppConfig;
use crate::error::{CodeBeastError, Result};
use crate::gallery::{TempImageStore, TEMP_URL_PREFIX};
use crate::health::health_router;
use crate::imaging::{GenerationParams, ImageGenerators};
use crate::langflow::LangflowClient;
use crate::models::{
    ErrorResponse, GalleryEntry, GenerateImageRequest, GenerateImageResponse, ProcessRequest,
    ProcessResponse,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Shared, read-only state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub langflow: Arc<LangflowClient>,
    pub generators: Arc<ImageGenerators>,
    pub store: TempImageStore,
    pub start_time: Instant,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let langflow = LangflowClient::new(&config.langflow)?;
        let generators = ImageGenerators::from_config(&config)?;
        Ok(AppState::new(config, langflow, generators))
    }

    pub fn new(config: AppConfig, langflow: LangflowClient, generators: ImageGenerators) -> Self {
        let store = TempImageStore::new(config.temp_dir());
        AppState {
            config: Arc::new(config),
            langflow: Arc::new(langflow),
            generators: Arc::new(generators),
            store,
            start_time: Instant::now(),
            started_at: Utc::now(),
        }
    }
}

impl IntoResponse for CodeBeastError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            e if e.is_connection() => (
                StatusCode::BAD_GATEWAY,
                "Network error occurred. Please try again later.".to_string(),
            ),
            CodeBeastError::InvalidInput(message) => (StatusCode::BAD_REQUEST, message.clone()),
            CodeBeastError::Io(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error accessing the file system. Please try again later.".to_string(),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected error occurred. Please try again later.".to_string(),
            ),
        };

        if status.is_client_error() {
            warn!("Rejected request: {}", self);
        } else {
            error!("Request failed: {}", self);
        }

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

impl From<JsonRejection> for CodeBeastError {
    fn from(rejection: JsonRejection) -> Self {
        CodeBeastError::InvalidInput(rejection.body_text())
    }
}

/// Build the application router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let temp_files = Router::new()
        .nest_service(TEMP_URL_PREFIX, ServeDir::new(state.store.dir()))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, no-cache, must-revalidate, max-age=0"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::PRAGMA,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::EXPIRES,
            HeaderValue::from_static("0"),
        ));

    // Frontend build, with index.html for client-side routes
    let static_dir = &state.config.static_dir;
    let frontend = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .route("/chat/process", post(process_chat))
        .route("/chat/generate-image", post(generate_image))
        .route("/api/static/temp", get(list_codebeasts))
        .merge(health_router())
        .merge(temp_files)
        .fallback_service(frontend)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Bind and serve until Ctrl+C
pub async fn serve(state: AppState) -> Result<()> {
    let addr = state.config.bind_addr();
    state.store.ensure_dir().await?;

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("CodeBeast server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutting down server...");
}

/// Analyze a GitHub handle through the Langflow flow
async fn process_chat(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ProcessRequest>, JsonRejection>,
) -> Result<Json<ProcessResponse>> {
    let Json(request) = payload?;
    let handle = request.message.trim();
    if handle.is_empty() {
        return Err(CodeBeastError::InvalidInput(
            "message must contain a GitHub handle".to_string(),
        ));
    }

    let mut profile = state.langflow.run_flow(handle).await?;
    if profile.profile_url.is_empty() {
        profile.profile_url = format!("https://github.com/{}", handle.to_lowercase());
    }

    info!(
        "Processed {}: {} languages, {} repositories, {} animals",
        handle,
        profile.languages.len(),
        profile.repository_count,
        profile.animal_selection.len()
    );

    Ok(Json(profile.into()))
}

/// Generate a mascot and store it under the requesting handle
async fn generate_image(
    State(state): State<AppState>,
    payload: std::result::Result<Json<GenerateImageRequest>, JsonRejection>,
) -> Result<Json<GenerateImageResponse>> {
    let Json(request) = payload?;
    if request.prompt.trim().is_empty() {
        return Err(CodeBeastError::InvalidInput("prompt must not be empty".to_string()));
    }

    let handle = request.handle.as_deref().unwrap_or("unknown");
    let provider = state.generators.provider(request.model)?;
    info!("Generating image for {} with {}", handle, provider.kind());

    let params = GenerationParams {
        size: request.size,
        pixel_size: request.pixel_size,
    };
    let generated = provider.generate(&request.prompt, &params).await?;
    let saved = state.store.save(handle, &generated).await?;

    Ok(Json(GenerateImageResponse {
        image_url: saved.url,
        pixelated_url: saved.pixelated_url,
        status: "success".to_string(),
    }))
}

/// All generated CodeBeasts in the temp directory
async fn list_codebeasts(State(state): State<AppState>) -> Result<Json<Vec<GalleryEntry>>> {
    let gallery = state.store.list().await?;
    Ok(Json(gallery))
}
