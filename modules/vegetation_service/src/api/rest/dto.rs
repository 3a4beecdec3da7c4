//! REST DTOs with serde derives for HTTP API

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ===== Shared DTOs =====

/// Bounding box in decimal degrees
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BoundsDto {
    #[schema(example = 39.55)]
    pub north: f64,
    #[schema(example = 39.45)]
    pub south: f64,
    #[schema(example = -96.45)]
    pub east: f64,
    #[schema(example = -96.55)]
    pub west: f64,
}

/// Where the region of interest came from
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum CoordinatesDto {
    /// Corners typed into the upload form
    Corners {
        lat1: f64,
        long1: f64,
        lat2: f64,
        long2: f64,
    },
    /// GPS position read from the photo
    Point { latitude: f64, longitude: f64 },
}

// ===== /api/analyze =====

/// Change analysis request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,

    /// First year to compare
    #[serde(rename = "startYear", default)]
    #[schema(example = 2015)]
    pub start_year: Option<i32>,

    /// Second year to compare
    #[serde(rename = "endYear", default)]
    #[schema(example = 2022)]
    pub end_year: Option<i32>,

    /// Pixel size in metres (optional, defaults to 30)
    #[serde(default)]
    #[schema(example = 30)]
    pub scale: Option<u32>,
}

/// Tile URL templates
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MapUrlsDto {
    pub start: String,
    pub end: String,
    pub difference: String,
}

/// Change analysis response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnalyzeResponse {
    #[serde(rename = "startNDVI")]
    pub start_ndvi: f64,

    #[serde(rename = "endNDVI")]
    pub end_ndvi: f64,

    #[serde(rename = "ndviChange")]
    pub ndvi_change: f64,

    #[serde(rename = "changeCategory")]
    #[schema(example = "Moderate increase")]
    pub change_category: String,

    #[serde(rename = "timePeriod")]
    #[schema(example = "2015 - 2022")]
    pub time_period: String,

    #[serde(rename = "mapUrls")]
    pub map_urls: MapUrlsDto,

    pub bounds: BoundsDto,
}

// ===== /upload =====

/// Multipart form accepted by `/upload` and `/api/coordinates`
#[derive(Debug, Deserialize, ToSchema)]
pub struct UploadForm {
    /// Photo (jpg, jpeg, png, tif, tiff)
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
    pub latitude1: Option<f64>,
    pub longitude1: Option<f64>,
    pub latitude2: Option<f64>,
    pub longitude2: Option<f64>,
    #[serde(rename = "startYear")]
    pub start_year: Option<i32>,
    #[serde(rename = "endYear")]
    pub end_year: Option<i32>,
}

/// Two-year comparison triggered from an upload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadChangeResponse {
    pub start_ndvi: f64,
    pub end_ndvi: f64,
    pub ndvi_change: f64,
    pub vegetation_change: String,
    pub coordinates: CoordinatesDto,
    pub time_period: String,
    pub start_image_url: String,
    pub end_image_url: String,
    pub diff_image_url: String,
    pub bounds: BoundsDto,
}

/// Trailing-year snapshot triggered from an upload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadSnapshotResponse {
    pub ndvi_mean: f64,
    pub ndvi_stddev: f64,
    pub vegetation_status: String,
    pub coordinates: CoordinatesDto,
    pub time_period: String,
    pub area_hectares: f64,
    pub ndvi_image_url: String,
    pub bounds: BoundsDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum UploadResponse {
    Change(UploadChangeResponse),
    Snapshot(UploadSnapshotResponse),
}

// ===== /api/coordinates, /health =====

/// GPS position found in a photo
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PhotoLocationResponse {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
}

// Note: Conversion implementations live in mapper.rs
