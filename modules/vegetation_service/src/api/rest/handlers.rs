//! HTTP request handlers - thin layer that delegates to domain service

use super::{
    dto::*,
    error::{map_domain_error, map_json_rejection, map_multipart_error, Problem},
    mapper,
};
use crate::contract::{AnalysisRequest, BoundingBox, VegetationError, YearRange};
use crate::domain::Service;
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Multipart},
    http::StatusCode,
    Json,
};
use std::collections::HashMap;
use std::sync::Arc;

const IMAGE_FIELD: &str = "image";
const CORNER_FIELDS: [&str; 4] = ["latitude1", "longitude1", "latitude2", "longitude2"];

/// File part of a multipart upload
struct UploadedImage {
    filename: String,
    data: Bytes,
}

/// Multipart upload after all parts have been read
#[derive(Default)]
struct ParsedUpload {
    image: Option<UploadedImage>,
    fields: HashMap<String, String>,
}

impl ParsedUpload {
    async fn read(mut multipart: Multipart) -> Result<Self, Problem> {
        let mut upload = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(map_multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();
            if name == IMAGE_FIELD {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(map_multipart_error)?;
                upload.image = Some(UploadedImage { filename, data });
            } else {
                let value = field.text().await.map_err(map_multipart_error)?;
                upload.fields.insert(name, value);
            }
        }
        Ok(upload)
    }

    /// The uploaded photo after its file name passed the extension check
    fn image(&self, service: &Service) -> Result<&UploadedImage, VegetationError> {
        let image = self
            .image
            .as_ref()
            .ok_or_else(|| VegetationError::validation("No file uploaded"))?;
        service.validate_upload_name(&image.filename)?;
        Ok(image)
    }

    /// Non-empty text field
    fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    fn number<T: std::str::FromStr>(&self, name: &str) -> Result<Option<T>, VegetationError> {
        self.field(name)
            .map(|raw| {
                raw.parse::<T>()
                    .map_err(|_| VegetationError::validation(format!("{} must be a number", name)))
            })
            .transpose()
    }

    /// Manual corners win over EXIF, but only when all four are filled in
    fn corners(&self) -> Result<Option<[f64; 4]>, VegetationError> {
        if CORNER_FIELDS.iter().any(|name| self.field(name).is_none()) {
            return Ok(None);
        }
        let mut corners = [0.0; 4];
        for (slot, name) in corners.iter_mut().zip(CORNER_FIELDS) {
            *slot = self.number(name)?.unwrap_or_default();
        }
        Ok(Some(corners))
    }

    fn years(&self) -> Result<Option<YearRange>, VegetationError> {
        match (self.number::<i32>("startYear")?, self.number::<i32>("endYear")?) {
            (Some(start), Some(end)) => Ok(Some(YearRange::new(start, end))),
            (None, None) => Ok(None),
            _ => Err(VegetationError::validation(
                "startYear and endYear must be provided together",
            )),
        }
    }
}

// ===== Analysis Handlers =====

/// Upload a photo and analyse the area it was taken in
#[utoipa::path(
    post,
    path = "/upload",
    tag = "vegetation",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Analysis finished", body = UploadResponse),
        (status = 400, description = "Invalid upload, coordinates or years"),
        (status = 404, description = "No imagery for the requested period"),
        (status = 502, description = "Earth Engine call failed")
    )
)]
pub async fn upload(
    service: Arc<Service>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, Problem> {
    let upload = ParsedUpload::read(multipart).await?;
    let image = upload.image(&service).map_err(map_domain_error)?;

    let (bounds, coordinates) = match upload.corners().map_err(map_domain_error)? {
        Some([lat1, long1, lat2, long2]) => (
            BoundingBox::from_corners(lat1, long1, lat2, long2),
            CoordinatesDto::Corners {
                lat1,
                long1,
                lat2,
                long2,
            },
        ),
        None => {
            let (point, bounds) = service
                .bounds_for_photo(&image.data)
                .map_err(map_domain_error)?;
            (bounds, point.into())
        }
    };
    let years = upload.years().map_err(map_domain_error)?;

    tracing::info!(
        filename = %image.filename,
        bytes = image.data.len(),
        manual_corners = matches!(coordinates, CoordinatesDto::Corners { .. }),
        "Processing upload"
    );

    let report = service
        .analyze(AnalysisRequest {
            bounds,
            years,
            scale_m: None,
        })
        .await
        .map_err(map_domain_error)?;

    Ok(Json(mapper::upload_response(report, coordinates)))
}

/// Compare mean NDVI of a bounding box between two years
#[utoipa::path(
    post,
    path = "/api/analyze",
    tag = "vegetation",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Change computed", body = AnalyzeResponse),
        (status = 400, description = "Invalid bounds, years or scale"),
        (status = 404, description = "No imagery for one of the years"),
        (status = 502, description = "Earth Engine call failed")
    )
)]
pub async fn analyze(
    service: Arc<Service>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, Problem> {
    let Json(req) = payload.map_err(map_json_rejection)?;

    let years = match (req.start_year, req.end_year) {
        (Some(start), Some(end)) => YearRange::new(start, end),
        _ => {
            return Err(map_domain_error(VegetationError::validation(
                "startYear and endYear are required",
            ))
            .with_instance("/api/analyze"))
        }
    };

    let report = service
        .analyze_change(BoundingBox::from(&req), years, req.scale)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(report.into()))
}

/// Read the GPS position out of a photo without analysing it
#[utoipa::path(
    post,
    path = "/api/coordinates",
    tag = "vegetation",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "GPS position found", body = PhotoLocationResponse),
        (status = 400, description = "Missing or unsupported file"),
        (status = 422, description = "Photo carries no GPS position")
    )
)]
pub async fn locate_photo(
    service: Arc<Service>,
    multipart: Multipart,
) -> Result<Json<PhotoLocationResponse>, Problem> {
    let upload = ParsedUpload::read(multipart).await?;
    let image = upload.image(&service).map_err(map_domain_error)?;

    match service.locate_photo(&image.data) {
        Some(point) => Ok(Json(point.into())),
        None => Err(Problem::new(StatusCode::UNPROCESSABLE_ENTITY, "No GPS Coordinates")
            .with_detail(VegetationError::NoCoordinates.to_string())
            .with_instance("/api/coordinates")),
    }
}

/// Liveness check
#[utoipa::path(
    get,
    path = "/health",
    tag = "vegetation",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
