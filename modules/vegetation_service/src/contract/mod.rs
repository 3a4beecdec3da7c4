//! Contract layer - public API for inter-module communication
//!
//! This layer contains transport-agnostic models and the native client trait.
//! NO serde derives on models - these are pure domain types.

pub mod client;
pub mod error;
pub mod model;

pub use client::VegetationApi;
pub use error::VegetationError;
pub use model::{
    AnalysisReport, AnalysisRequest, BoundingBox, ChangeCategory, DateWindow, GpsCoordinates,
    NdviChangeReport, NdviSnapshotReport, TileLayer, VegetationStatus, YearRange,
};
