use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{delete, get, post},
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::batch::{UploadedFile, process_batch};
use crate::config::ServerConfig;
use crate::downloader::{to_csv, to_xlsx};
use crate::error::OrderError;
use crate::images::image_dimensions;
use crate::report::render_report;
use crate::saving::{
    FileImageStore, FileKeywordRemote, FileProjectRepository, ImageStore, KeywordAdded,
    KeywordService, ProjectRepository,
};
use crate::store::{CellKey, ReorderOptions, RowPosition};
use crate::workspace::Workspace;

pub struct AppState {
    workspace: Mutex<Workspace>,
    projects: Box<dyn ProjectRepository>,
    keywords: KeywordService,
    images: Box<dyn ImageStore>,
}

impl AppState {
    /// File-backed collaborators rooted at the configured data directory.
    pub fn from_config(config: &ServerConfig) -> crate::error::Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        let projects = FileProjectRepository::open(config.projects_dir())?;
        let keywords = KeywordService::new(
            Box::new(FileKeywordRemote::new(config.keywords_path())),
            config.keywords_cache_path(),
        );
        let images = FileImageStore::new(config.uploads_dir(), &config.image_url_prefix());
        Ok(AppState::new(Box::new(projects), keywords, Box::new(images)))
    }

    pub fn new(
        projects: Box<dyn ProjectRepository>,
        keywords: KeywordService,
        images: Box<dyn ImageStore>,
    ) -> Self {
        AppState {
            workspace: Mutex::new(Workspace::new()),
            projects,
            keywords,
            images,
        }
    }

    fn workspace(&self) -> MutexGuard<'_, Workspace> {
        self.workspace.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Serialize)]
struct SaveResponse {
    status: String,
    message: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HeadingUpdate {
    dataset: usize,
    panel_column: bool,
    value: String,
}

#[derive(Deserialize)]
struct ReorderRequest {
    from: RowPosition,
    to: RowPosition,
    #[serde(default)]
    options: ReorderOptions,
}

#[derive(Deserialize)]
struct HighlightRequest {
    key: String,
}

#[derive(Deserialize)]
struct HidePanelsRequest {
    hide: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderInfoUpdate {
    order_no: String,
    #[serde(default)]
    shop_order_note: String,
}

#[derive(Deserialize)]
struct ProjectQuery {
    q: Option<String>,
}

#[derive(Deserialize)]
struct KeywordRequest {
    keyword: String,
}

#[derive(Deserialize)]
struct MoveRequest {
    x: i32,
    y: i32,
}

#[derive(Deserialize)]
struct ResizeRequest {
    delta: i32,
}

/// Build the router around a shared state
pub fn router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route("/report", get(serve_report))
        .route("/api/state", get(get_state))
        .route("/api/upload", post(upload_files))
        .route("/api/heading", post(edit_heading))
        .route("/api/reorder", post(reorder_rows))
        .route("/api/highlight", post(toggle_highlight).delete(clear_highlights))
        .route("/api/hide_panels", post(set_hide_panels))
        .route("/api/order_info", post(set_order_info))
        .route("/api/save", post(save_project))
        .route("/api/projects", get(list_projects))
        .route("/api/projects/:id", delete(delete_project))
        .route("/api/projects/:id/load", post(load_project))
        .route(
            "/api/keywords",
            get(list_keywords).post(add_keyword).delete(remove_keyword),
        )
        .route("/api/images", post(upload_images))
        .route("/api/images/:id", delete(delete_image))
        .route("/api/images/:id/move", post(move_image))
        .route("/api/images/:id/resize", post(resize_image))
        .route("/api/export/csv", get(export_csv))
        .route("/api/export/xlsx", get(export_xlsx))
        .nest_service(&config.image_url_prefix(), ServeDir::new(config.uploads_dir()))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes()))
        .with_state(state)
}

pub async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState::from_config(&config)?);
    let app = router(state, &config);

    let listener = TcpListener::bind(&config.bind).await?;
    info!("Listening on http://{}", config.bind);
    axum::serve(listener, app).await?;

    Ok(())
}

fn ok_response(message: Option<String>) -> Response {
    Json(SaveResponse {
        status: "ok".to_string(),
        message,
    })
    .into_response()
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(SaveResponse {
            status: "error".to_string(),
            message: Some(message.into()),
        }),
    )
        .into_response()
}

fn order_error_response(e: &OrderError) -> Response {
    let status = match e {
        OrderError::Decode { .. }
        | OrderError::Validation(_)
        | OrderError::Image(_)
        | OrderError::EmptyReport => StatusCode::BAD_REQUEST,
        OrderError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, e.to_string())
}

fn state_response(ws: &Workspace) -> Response {
    Json(serde_json::json!({
        "status": "ok",
        "state": ws.view(),
    }))
    .into_response()
}

async fn serve_index() -> Html<&'static str> {
    Html(include_str!("./static/index.html"))
}

async fn serve_report(State(state): State<Arc<AppState>>) -> Response {
    let input = state.workspace().report_input();
    let generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    match render_report(&input, &generated_at) {
        Ok(html) => Html(html).into_response(),
        Err(e) => order_error_response(&e),
    }
}

async fn get_state(State(state): State<Arc<AppState>>) -> Response {
    state_response(&state.workspace())
}

async fn upload_files(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> Response {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.unwrap_or(None) {
        if field.name() != Some("files") {
            continue;
        }
        let name = field.file_name().unwrap_or("upload").to_string();
        match field.bytes().await {
            Ok(bytes) => files.push(UploadedFile::new(name, bytes.to_vec())),
            Err(e) => warn!("Error reading uploaded file {}: {}", name, e),
        }
    }

    let keywords = state.keywords.keywords();
    let outcome = process_batch(&files, &keywords);
    let errors = outcome.errors.clone();

    let mut ws = state.workspace();
    if outcome.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "status": "error",
                "message": errors.join("\n"),
                "errors": errors,
            })),
        )
            .into_response();
    }

    ws.apply_batch(outcome);
    Json(serde_json::json!({
        "status": "ok",
        "errors": errors,
        "state": ws.view(),
    }))
    .into_response()
}

async fn edit_heading(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<HeadingUpdate>,
) -> Response {
    let mut ws = state.workspace();
    ws.edit_heading(payload.dataset, payload.panel_column, &payload.value);
    state_response(&ws)
}

async fn reorder_rows(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ReorderRequest>,
) -> Response {
    let mut ws = state.workspace();
    let changed = ws.reorder(payload.from, payload.to, payload.options);
    Json(serde_json::json!({
        "status": "ok",
        "changed": changed,
        "state": ws.view(),
    }))
    .into_response()
}

async fn toggle_highlight(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<HighlightRequest>,
) -> Response {
    let key: CellKey = match payload.key.parse() {
        Ok(key) => key,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
    };
    let highlighted = state.workspace().toggle_highlight(key);
    Json(serde_json::json!({
        "status": "ok",
        "key": key.to_string(),
        "highlighted": highlighted,
    }))
    .into_response()
}

async fn clear_highlights(State(state): State<Arc<AppState>>) -> Response {
    state.workspace().clear_highlights();
    ok_response(None)
}

async fn set_hide_panels(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<HidePanelsRequest>,
) -> Response {
    state.workspace().set_hide_panel_columns(payload.hide);
    ok_response(None)
}

async fn set_order_info(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<OrderInfoUpdate>,
) -> Response {
    state
        .workspace()
        .set_order_info(&payload.order_no, &payload.shop_order_note);
    ok_response(None)
}

async fn save_project(State(state): State<Arc<AppState>>) -> Response {
    let project = match state.workspace().to_project() {
        Ok(project) => project,
        Err(e) => return order_error_response(&e),
    };

    match state.projects.upsert(&project) {
        Ok(id) => {
            info!("Saved project {} ({})", id, project.order_no);
            Json(serde_json::json!({
                "status": "ok",
                "id": id,
                "message": "Project saved successfully!",
            }))
            .into_response()
        }
        Err(e) => {
            warn!("Error saving project {}: {}", project.order_no, e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to save project. Please try again.",
            )
        }
    }
}

async fn list_projects(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProjectQuery>,
) -> Response {
    match state.projects.list(params.q.as_deref()) {
        Ok(projects) => Json(serde_json::json!({
            "status": "ok",
            "projects": projects,
        }))
        .into_response(),
        Err(e) => {
            warn!("Error listing projects: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load projects.")
        }
    }
}

async fn load_project(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    match state.projects.get(&id) {
        Ok(Some(stored)) => {
            let mut ws = state.workspace();
            ws.load_project(stored);
            state_response(&ws)
        }
        Ok(None) => order_error_response(&OrderError::NotFound(format!("Project {}", id))),
        Err(e) => {
            warn!("Error loading project {}: {}", id, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load project.")
        }
    }
}

async fn delete_project(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    if let Ok(Some(stored)) = state.projects.get(&id) {
        for image in &stored.project.images {
            if let Err(e) = state.images.delete(&image.src) {
                warn!("Error deleting image {}: {}", image.src, e);
            }
        }
    }

    match state.projects.delete(&id) {
        Ok(true) => ok_response(Some("Project deleted.".to_string())),
        Ok(false) => order_error_response(&OrderError::NotFound(format!("Project {}", id))),
        Err(e) => {
            warn!("Error deleting project {}: {}", id, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to delete project.")
        }
    }
}

async fn list_keywords(State(state): State<Arc<AppState>>) -> Response {
    Json(serde_json::json!({
        "status": "ok",
        "keywords": state.keywords.keywords(),
    }))
    .into_response()
}

async fn add_keyword(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<KeywordRequest>,
) -> Response {
    match state.keywords.add(&payload.keyword) {
        KeywordAdded::Added => ok_response(None),
        KeywordAdded::AlreadyPresent => {
            error_response(StatusCode::CONFLICT, "This keyword already exists.")
        }
        KeywordAdded::Empty => error_response(StatusCode::BAD_REQUEST, "Keyword cannot be empty."),
    }
}

async fn remove_keyword(
    State(state): State<Arc<AppState>>,
    Query(params): Query<KeywordRequest>,
) -> Response {
    state.keywords.remove(&params.keyword);
    ok_response(None)
}

async fn upload_images(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> Response {
    let order_no = state.workspace().order_no().to_string();
    let mut added = Vec::new();

    while let Some(field) = multipart.next_field().await.unwrap_or(None) {
        let name = field.file_name().unwrap_or("image.png").to_string();
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
        };

        let natural = match image_dimensions(&bytes) {
            Ok(natural) => natural,
            Err(e) => return order_error_response(&e),
        };
        let url = match state.images.upload(&order_no, &name, &bytes) {
            Ok(url) => url,
            Err(e) => {
                warn!("Error uploading image {}: {}", name, e);
                return order_error_response(&e);
            }
        };

        added.push(state.workspace().add_image(url, natural));
    }

    if added.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "No image data received");
    }

    Json(serde_json::json!({
        "status": "ok",
        "images": added,
    }))
    .into_response()
}

async fn move_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<MoveRequest>,
) -> Response {
    match state.workspace().move_image(&id, payload.x, payload.y) {
        Ok(image) => Json(serde_json::json!({ "status": "ok", "image": image })).into_response(),
        Err(e) => order_error_response(&e),
    }
}

async fn resize_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<ResizeRequest>,
) -> Response {
    match state.workspace().resize_image(&id, payload.delta) {
        Ok(image) => Json(serde_json::json!({ "status": "ok", "image": image })).into_response(),
        Err(e) => order_error_response(&e),
    }
}

async fn delete_image(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    let Some(image) = state.workspace().remove_image(&id) else {
        return order_error_response(&OrderError::NotFound(format!("Image {}", id)));
    };

    if let Err(e) = state.images.delete(&image.src) {
        warn!("Error deleting image {}: {}", image.src, e);
    }
    ok_response(None)
}

fn attachment_name(order_no: &str, extension: &str) -> String {
    let stem: String = order_no
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if stem.is_empty() {
        format!("order.{}", extension)
    } else {
        format!("{}.{}", stem, extension)
    }
}

async fn export_csv(State(state): State<Arc<AppState>>) -> Response {
    let (order_no, result) = {
        let ws = state.workspace();
        let tables = ws.tables();
        (ws.order_no().to_string(), to_csv(&tables.merged, &tables.webbing))
    };

    match result {
        Ok(csv) => (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", attachment_name(&order_no, "csv")),
                ),
            ],
            csv,
        )
            .into_response(),
        Err(e) => order_error_response(&e),
    }
}

async fn export_xlsx(State(state): State<Arc<AppState>>) -> Response {
    let (order_no, result) = {
        let ws = state.workspace();
        let tables = ws.tables();
        (ws.order_no().to_string(), to_xlsx(&tables.merged, &tables.webbing))
    };

    match result {
        Ok(bytes) => (
            [
                (
                    header::CONTENT_TYPE,
                    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
                ),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", attachment_name(&order_no, "xlsx")),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => order_error_response(&e),
    }
}
