//! Route registration and OpenAPI document

use super::{dto::*, error::Problem, handlers};
use crate::domain::Service;
use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Multipart},
    routing::{get, post},
    Extension, Json, Router,
};
use std::sync::Arc;
use utoipa::OpenApi;

/// Path the generated OpenAPI document is served on
pub const OPENAPI_PATH: &str = "/api/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(title = "Vegetation Analysis API"),
    paths(handlers::upload, handlers::analyze, handlers::locate_photo, handlers::health),
    components(schemas(
        AnalyzeRequest,
        AnalyzeResponse,
        BoundsDto,
        CoordinatesDto,
        HealthResponse,
        MapUrlsDto,
        PhotoLocationResponse,
        UploadChangeResponse,
        UploadForm,
        UploadResponse,
        UploadSnapshotResponse
    )),
    tags((name = "vegetation", description = "NDVI vegetation analysis"))
)]
pub struct ApiDoc;

/// Register all REST routes
pub fn register_routes(
    router: Router,
    service: Arc<Service>,
    max_upload_bytes: usize,
) -> anyhow::Result<Router> {
    let uploads = Router::new()
        .route("/upload", post(upload_handler))
        .route("/api/coordinates", post(locate_photo_handler))
        .layer(DefaultBodyLimit::max(max_upload_bytes));

    let router = router
        .merge(uploads)
        .route("/api/analyze", post(analyze_handler))
        .route("/health", get(handlers::health))
        .route(OPENAPI_PATH, get(openapi_handler))
        // Add service as extension for handlers
        .layer(Extension(service));

    Ok(router)
}

// ===== Handler wrappers that extract service from Extension =====

async fn upload_handler(
    Extension(service): Extension<Arc<Service>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, Problem> {
    handlers::upload(service, multipart).await
}

async fn analyze_handler(
    Extension(service): Extension<Arc<Service>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, Problem> {
    handlers::analyze(service, payload).await
}

async fn locate_photo_handler(
    Extension(service): Extension<Arc<Service>>,
    multipart: Multipart,
) -> Result<Json<PhotoLocationResponse>, Problem> {
    handlers::locate_photo(service, multipart).await
}

async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
