//! Native client trait for inter-module communication
//!
//! This trait defines the API that other modules use to interact with vegetation service.
//! NO HTTP - direct function calls for performance.

use super::{
    error::VegetationError,
    model::{
        AnalysisReport, AnalysisRequest, BoundingBox, GpsCoordinates, NdviChangeReport,
        NdviSnapshotReport, YearRange,
    },
};
use async_trait::async_trait;

/// Vegetation service API for inter-module communication
#[async_trait]
pub trait VegetationApi: Send + Sync {
    /// Run a change or snapshot analysis depending on whether years are supplied
    async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisReport, VegetationError>;

    /// Compare mean NDVI of two years over a region
    async fn analyze_change(
        &self,
        bounds: BoundingBox,
        years: YearRange,
        scale_m: Option<u32>,
    ) -> Result<NdviChangeReport, VegetationError>;

    /// Summarise NDVI over the trailing year
    async fn analyze_snapshot(
        &self,
        bounds: BoundingBox,
        scale_m: Option<u32>,
    ) -> Result<NdviSnapshotReport, VegetationError>;

    /// Read the GPS position embedded in a photo, if any
    async fn locate_photo(&self, image: &[u8]) -> Result<Option<GpsCoordinates>, VegetationError>;
}
