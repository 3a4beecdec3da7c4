//! Native client implementation - wraps domain service for in-process calls

use crate::contract::{
    AnalysisReport, AnalysisRequest, BoundingBox, GpsCoordinates, NdviChangeReport,
    NdviSnapshotReport, VegetationApi, VegetationError, YearRange,
};
use crate::domain::Service;
use async_trait::async_trait;
use std::sync::Arc;

/// Native client implementation that directly calls the domain service
///
/// Used by code running in the same process, without going through HTTP.
#[derive(Clone)]
pub struct NativeClient {
    service: Arc<Service>,
}

impl NativeClient {
    /// Create a new native client
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl VegetationApi for NativeClient {
    async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisReport, VegetationError> {
        self.service.analyze(request).await
    }

    async fn analyze_change(
        &self,
        bounds: BoundingBox,
        years: YearRange,
        scale_m: Option<u32>,
    ) -> Result<NdviChangeReport, VegetationError> {
        self.service.analyze_change(bounds, years, scale_m).await
    }

    async fn analyze_snapshot(
        &self,
        bounds: BoundingBox,
        scale_m: Option<u32>,
    ) -> Result<NdviSnapshotReport, VegetationError> {
        self.service.analyze_snapshot(bounds, scale_m).await
    }

    async fn locate_photo(&self, image: &[u8]) -> Result<Option<GpsCoordinates>, VegetationError> {
        Ok(self.service.locate_photo(image))
    }
}
