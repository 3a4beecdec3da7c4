//! Vegetation Service Module
//!
//! Measures vegetation health and change with NDVI computed from Landsat 8
//! imagery on Google Earth Engine. Regions come either from a bounding box or
//! from the GPS position embedded in an uploaded photo.

// Public exports
pub mod contract;
pub use contract::{
    client::VegetationApi, error::VegetationError, AnalysisReport, AnalysisRequest, BoundingBox,
    ChangeCategory, GpsCoordinates, NdviChangeReport, NdviSnapshotReport, TileLayer,
    VegetationStatus, YearRange,
};

pub mod module;
pub use module::VegetationServiceModule;

// Internal modules (hidden from public API)
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
