//! Mapper implementations for converting between DTOs and contract models

use super::dto::*;
use crate::contract;

impl From<contract::BoundingBox> for BoundsDto {
    fn from(bounds: contract::BoundingBox) -> Self {
        Self {
            north: bounds.north,
            south: bounds.south,
            east: bounds.east,
            west: bounds.west,
        }
    }
}

impl From<&AnalyzeRequest> for contract::BoundingBox {
    fn from(req: &AnalyzeRequest) -> Self {
        Self::new(req.north, req.south, req.east, req.west)
    }
}

impl From<contract::GpsCoordinates> for PhotoLocationResponse {
    fn from(point: contract::GpsCoordinates) -> Self {
        Self {
            latitude: point.latitude,
            longitude: point.longitude,
        }
    }
}

impl From<contract::GpsCoordinates> for CoordinatesDto {
    fn from(point: contract::GpsCoordinates) -> Self {
        Self::Point {
            latitude: point.latitude,
            longitude: point.longitude,
        }
    }
}

impl From<contract::NdviChangeReport> for AnalyzeResponse {
    fn from(report: contract::NdviChangeReport) -> Self {
        Self {
            start_ndvi: report.start_ndvi,
            end_ndvi: report.end_ndvi,
            ndvi_change: report.ndvi_change,
            change_category: report.category.as_str().to_string(),
            time_period: report.years.label(),
            map_urls: MapUrlsDto {
                start: report.start_tiles.url_format,
                end: report.end_tiles.url_format,
                difference: report.diff_tiles.url_format,
            },
            bounds: report.bounds.into(),
        }
    }
}

/// Shape an analysis report the way `/upload` has always answered
pub fn upload_response(report: contract::AnalysisReport, coordinates: CoordinatesDto) -> UploadResponse {
    match report {
        contract::AnalysisReport::Change(report) => UploadResponse::Change(UploadChangeResponse {
            start_ndvi: report.start_ndvi,
            end_ndvi: report.end_ndvi,
            ndvi_change: report.ndvi_change,
            vegetation_change: report.category.as_str().to_string(),
            coordinates,
            time_period: report.years.label(),
            start_image_url: report.start_tiles.url_format,
            end_image_url: report.end_tiles.url_format,
            diff_image_url: report.diff_tiles.url_format,
            bounds: report.bounds.into(),
        }),
        contract::AnalysisReport::Snapshot(report) => {
            UploadResponse::Snapshot(UploadSnapshotResponse {
                ndvi_mean: report.ndvi_mean,
                ndvi_stddev: report.ndvi_stddev,
                vegetation_status: report.status.as_str().to_string(),
                coordinates,
                time_period: format!("{} - {}", report.window.start, report.window.end),
                area_hectares: report.area_hectares,
                ndvi_image_url: report.tiles.url_format,
                bounds: report.bounds.into(),
            })
        }
    }
}
