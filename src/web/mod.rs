// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Web UI for Archescan

mod notice;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use minijinja::{context, Environment};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::annotator::Annotator;
use crate::artifacts::{ArtifactCatalog, ArtifactRecord, ImageUpload, NamedUpload};
use crate::config::AppConfig;
use crate::gallery::Gallery;
use crate::store::{JsonStore, MediaUpload};
use crate::videos::{VideoList, VideoRecord};
use crate::{ArchescanError, Result};

pub use notice::Notice;

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    pub artifacts: ArtifactCatalog,
    pub gallery: Gallery,
    pub videos: VideoList,
    templates: Environment<'static>,
}

impl AppState {
    /// Open all stores named by the configuration
    pub fn new(config: AppConfig, annotator: Annotator) -> Result<Self> {
        let artifacts = ArtifactCatalog::open(&config.storage, annotator, config.prompts.clone())?;
        let gallery = Gallery::open(&config.storage.gallery_dir)?;
        let videos = VideoList::new(JsonStore::new(&config.storage.videos_json));

        Ok(Self {
            config,
            artifacts,
            gallery,
            videos,
            templates: templates()?,
        })
    }

    fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<Html<String>> {
        Ok(Html(self.templates.get_template(name)?.render(ctx)?))
    }
}

fn templates() -> Result<Environment<'static>> {
    let mut env = Environment::new();
    env.add_template("base.html", include_str!("templates/base.html"))?;
    env.add_template("artifact_list.html", include_str!("templates/artifact_list.html"))?;
    env.add_template("index.html", include_str!("templates/index.html"))?;
    env.add_template("upload.html", include_str!("templates/upload.html"))?;
    env.add_template("upload_image_only.html", include_str!("templates/upload_image_only.html"))?;
    env.add_template("model.html", include_str!("templates/model.html"))?;
    env.add_template("gallery.html", include_str!("templates/gallery.html"))?;
    env.add_template("videos.html", include_str!("templates/videos.html"))?;
    Ok(env)
}

/// Create the web application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let upload_dir = state.config.storage.upload_dir.clone();
    let gallery_dir = state.config.storage.gallery_dir.clone();
    let body_limit = state.config.web.max_upload_bytes;

    Router::new()
        // Pages
        .route("/", get(index_page))
        .route("/upload", get(upload_page).post(upload_submit))
        .route("/upload-image-only", get(image_only_page).post(image_only_submit))
        .route("/delete/:filename", post(delete_artifact))
        .route("/model", get(model_page))
        .route("/gallery", get(gallery_page).post(gallery_submit))
        .route("/videos", get(videos_page).post(videos_submit))
        // API endpoints
        .route("/api/artifacts", get(api_get_artifacts))
        .route("/api/videos", get(api_get_videos))
        .route("/api/gallery", get(api_get_gallery))
        .route("/health", get(health))
        // Stored files
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .nest_service("/static/team_photos", ServeDir::new(gallery_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// === Errors ===

/// Failure of a request handler
#[derive(Debug)]
pub enum WebError {
    BadRequest(String),
    Internal(ArchescanError),
}

impl From<ArchescanError> for WebError {
    fn from(e: ArchescanError) -> Self {
        Self::Internal(e)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            Self::Internal(e) => {
                error!("Request failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

type WebResult<T> = std::result::Result<T, WebError>;

/// Redirect back to `page`, turning input errors into a notice
fn redirect_after<T>(page: &str, result: Result<T>, success: Notice) -> WebResult<Redirect> {
    match result {
        Ok(_) => Ok(success.redirect(page)),
        Err(e) => match Notice::from_error(&e) {
            Some(notice) => {
                info!("Rejected submission to {}: {}", page, e);
                Ok(notice.redirect(page))
            }
            None => Err(e.into()),
        },
    }
}

// === Form Parsing ===

#[derive(Deserialize, Default)]
struct PageQuery {
    notice: Option<String>,
}

impl PageQuery {
    fn notice(&self) -> Option<Notice> {
        self.notice.as_deref().and_then(Notice::from_code)
    }
}

/// Text fields and the `file` field of a multipart form
#[derive(Default)]
struct UploadForm {
    fields: HashMap<String, String>,
    file: MediaUpload,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> WebResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| WebError::BadRequest(format!("invalid multipart payload: {}", e)))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == "file" {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| WebError::BadRequest(format!("invalid file field: {}", e)))?;
                form.file = MediaUpload::new(filename, bytes.to_vec());
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| WebError::BadRequest(format!("invalid {} field: {}", name, e)))?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    fn field(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }
}

// === Page Handlers ===

async fn index_page(State(state): State<Arc<AppState>>) -> WebResult<Html<String>> {
    Ok(state.render(
        "index.html",
        context! {
            artifact_count => state.artifacts.list()?.len(),
            photo_count => state.gallery.photos()?.len(),
            video_count => state.videos.list()?.len(),
        },
    )?)
}

async fn upload_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> WebResult<Html<String>> {
    Ok(state.render(
        "upload.html",
        context! {
            uploads => state.artifacts.list()?,
            notice => query.notice().map(|n| n.view()),
            delete_suffix => "",
        },
    )?)
}

async fn upload_submit(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> WebResult<Redirect> {
    let form = UploadForm::read(multipart).await?;
    let upload = NamedUpload {
        name: form.field("name"),
        description: form.field("description"),
        file: form.file,
    };

    let result = state.artifacts.upload_named(upload).await;
    redirect_after("/upload", result, Notice::ArtifactUploaded)
}

async fn image_only_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> WebResult<Html<String>> {
    Ok(state.render(
        "upload_image_only.html",
        context! {
            uploads => state.artifacts.list_image_only()?,
            notice => query.notice().map(|n| n.view()),
            delete_suffix => "?from=image-only",
        },
    )?)
}

async fn image_only_submit(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> WebResult<Redirect> {
    let form = UploadForm::read(multipart).await?;
    let upload = ImageUpload {
        description: form.field("description"),
        file: form.file,
    };

    let result = state.artifacts.upload_image_only(upload).await;
    redirect_after("/upload-image-only", result, Notice::ArtifactIdentified)
}

#[derive(Deserialize)]
struct DeleteQuery {
    from: Option<String>,
}

async fn delete_artifact(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> WebResult<Redirect> {
    let page = match query.from.as_deref() {
        Some("image-only") => "/upload-image-only",
        _ => "/upload",
    };

    redirect_after(page, state.artifacts.delete(&filename), Notice::ArtifactDeleted)
}

async fn model_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> WebResult<Html<String>> {
    let annotator = state.artifacts.annotator();
    Ok(state.render(
        "model.html",
        context! {
            ai_enabled => annotator.is_enabled(),
            model => annotator.model_name().unwrap_or(&state.config.ai.model),
            named_prompt => &state.config.prompts.named_artifact,
            identify_prompt => &state.config.prompts.identify_image,
            notice => query.notice().map(|n| n.view()),
        },
    )?)
}

async fn gallery_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> WebResult<Html<String>> {
    Ok(state.render(
        "gallery.html",
        context! {
            photos => state.gallery.photos()?,
            notice => query.notice().map(|n| n.view()),
        },
    )?)
}

async fn gallery_submit(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> WebResult<Redirect> {
    let form = UploadForm::read(multipart).await?;
    redirect_after("/gallery", state.gallery.upload(form.file), Notice::PhotoUploaded)
}

async fn videos_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> WebResult<Html<String>> {
    Ok(state.render(
        "videos.html",
        context! {
            videos => state.videos.list()?,
            notice => query.notice().map(|n| n.view()),
        },
    )?)
}

#[derive(Deserialize)]
struct VideoForm {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
}

async fn videos_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<VideoForm>,
) -> WebResult<Redirect> {
    redirect_after("/videos", state.videos.add(&form.title, &form.url), Notice::VideoAdded)
}

// === API Handlers ===

#[derive(Deserialize)]
struct ArtifactsQuery {
    #[serde(default)]
    image_only: bool,
}

async fn api_get_artifacts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ArtifactsQuery>,
) -> WebResult<Json<Vec<ArtifactRecord>>> {
    let artifacts = if query.image_only {
        state.artifacts.list_image_only()?
    } else {
        state.artifacts.list()?
    };
    Ok(Json(artifacts))
}

async fn api_get_videos(State(state): State<Arc<AppState>>) -> WebResult<Json<Vec<VideoRecord>>> {
    Ok(Json(state.videos.list()?))
}

async fn api_get_gallery(State(state): State<Arc<AppState>>) -> WebResult<Json<Vec<String>>> {
    Ok(Json(state.gallery.photos()?))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    ai_enabled: bool,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        ai_enabled: state.artifacts.annotator().is_enabled(),
    })
}

/// Start the web server with config and annotator
pub async fn start_server(config: AppConfig, annotator: Annotator) -> Result<()> {
    let addr = format!("{}:{}", config.web.host, config.web.port);
    let state = Arc::new(AppState::new(config, annotator)?);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Web UI available at http://{}", addr);

    let router = create_router(state);
    axum::serve(listener, router)
        .await
        .map_err(|e| ArchescanError::Config(format!("Server error: {}", e)))?;

    Ok(())
}
