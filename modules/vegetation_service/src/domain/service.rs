//! Domain service - analysis orchestration

use super::expression::{Expression, ExpressionBuilder, ValueNode};
use super::geotag;
use super::imagery::{EarthEngine, EarthEngineError, Visualization};
use super::ndvi::{self, SceneQuery, MEAN_KEY, NDVI_BAND, STD_DEV_KEY};
use super::validation;
use crate::config::Config;
use crate::contract::{
    AnalysisReport, AnalysisRequest, BoundingBox, ChangeCategory, DateWindow, GpsCoordinates,
    NdviChangeReport, NdviSnapshotReport, TileLayer, VegetationError, VegetationStatus,
    YearRange,
};
use chrono::{Datelike, Utc};
use serde_json::Value;
use std::sync::Arc;

/// Graph outputs needed for a two-year comparison
#[derive(Debug, Clone, Copy)]
enum ChangeOutput {
    StartMean,
    EndMean,
    StartImage,
    EndImage,
    Difference,
}

/// Resolved windows of a two-year comparison
#[derive(Debug, Clone, Copy)]
struct ChangeWindows {
    overall: DateWindow,
    start: DateWindow,
    end: DateWindow,
}

/// Domain service for vegetation analysis
pub struct Service {
    engine: Arc<dyn EarthEngine>,
    config: Config,
}

impl Service {
    /// Create a new service instance
    pub fn new(engine: Arc<dyn EarthEngine>, config: Config) -> Self {
        Self { engine, config }
    }

    /// Dispatch on whether the request names two years
    pub async fn analyze(
        &self,
        request: AnalysisRequest,
    ) -> Result<AnalysisReport, VegetationError> {
        match request.years {
            Some(years) => self
                .analyze_change(request.bounds, years, request.scale_m)
                .await
                .map(AnalysisReport::Change),
            None => self
                .analyze_snapshot(request.bounds, request.scale_m)
                .await
                .map(AnalysisReport::Snapshot),
        }
    }

    /// Compare mean NDVI of `years.start_year` against `years.end_year`
    pub async fn analyze_change(
        &self,
        bounds: BoundingBox,
        years: YearRange,
        scale_m: Option<u32>,
    ) -> Result<NdviChangeReport, VegetationError> {
        validation::validate_bounds(&bounds)?;
        validation::validate_years(years, Utc::now().year())?;
        let scale = self.resolve_scale(scale_m, &bounds)?;

        let windows = ChangeWindows {
            overall: years.overall_window().ok_or(VegetationError::Internal)?,
            start: years.start_window().ok_or(VegetationError::Internal)?,
            end: years.end_window().ok_or(VegetationError::Internal)?,
        };
        let graph = |output: ChangeOutput| self.change_graph(&bounds, &windows, scale, output);

        tracing::info!(
            north = bounds.north,
            south = bounds.south,
            east = bounds.east,
            west = bounds.west,
            start_year = years.start_year,
            end_year = years.end_year,
            scale,
            "Computing NDVI change"
        );

        let start_period = years.start_year.to_string();
        let end_period = years.end_year.to_string();
        let (start_ndvi, end_ndvi) = tokio::try_join!(
            self.compute_mean(graph(ChangeOutput::StartMean), &start_period),
            self.compute_mean(graph(ChangeOutput::EndMean), &end_period),
        )?;

        let ndvi_vis = Visualization::ndvi(NDVI_BAND);
        let diff_vis = Visualization::ndvi_difference(NDVI_BAND);
        let (start_tiles, end_tiles, diff_tiles) = tokio::try_join!(
            self.render(graph(ChangeOutput::StartImage), &ndvi_vis),
            self.render(graph(ChangeOutput::EndImage), &ndvi_vis),
            self.render(graph(ChangeOutput::Difference), &diff_vis),
        )?;

        let ndvi_change = end_ndvi - start_ndvi;
        let category = ChangeCategory::classify(ndvi_change);
        tracing::info!(
            start_ndvi,
            end_ndvi,
            ndvi_change,
            category = category.as_str(),
            "NDVI change computed"
        );

        Ok(NdviChangeReport {
            start_ndvi,
            end_ndvi,
            ndvi_change,
            category,
            bounds,
            years,
            start_tiles,
            end_tiles,
            diff_tiles,
        })
    }

    /// Summarise NDVI over the 365 days ending today
    pub async fn analyze_snapshot(
        &self,
        bounds: BoundingBox,
        scale_m: Option<u32>,
    ) -> Result<NdviSnapshotReport, VegetationError> {
        validation::validate_bounds(&bounds)?;
        let scale = self.resolve_scale(scale_m, &bounds)?;
        let window = DateWindow::trailing_year(Utc::now().date_naive());

        tracing::info!(
            north = bounds.north,
            south = bounds.south,
            east = bounds.east,
            west = bounds.west,
            start = %window.start,
            end = %window.end,
            scale,
            "Computing NDVI snapshot"
        );

        let stats_graph = self.snapshot_graph(&bounds, &window, |area, mean| {
            ndvi::region_statistics(mean, area, scale, self.config.max_pixels)
        });
        let area_graph = {
            let mut builder = ExpressionBuilder::new();
            let area = builder.bind(ndvi::rectangle(&bounds));
            builder.finish(ndvi::area_m2(&area))
        };

        let (stats, area_m2) =
            tokio::try_join!(self.compute(stats_graph), self.compute(area_graph))?;

        let period = format!("{} - {}", window.start, window.end);
        let stats = stats.as_object().ok_or_else(|| {
            tracing::error!(value = %stats, "Regional statistics are not a dictionary");
            VegetationError::Internal
        })?;
        let statistic = |key: &str| stats.get(key).cloned().unwrap_or(Value::Null);
        let ndvi_mean = reduced_value(statistic(MEAN_KEY), &period)?;
        let ndvi_stddev = reduced_value(statistic(STD_DEV_KEY), &period)?;
        let area_m2 = area_m2.as_f64().ok_or_else(|| {
            tracing::error!(value = %area_m2, "Geometry area is not a number");
            VegetationError::Internal
        })?;

        let image_graph = self.snapshot_graph(&bounds, &window, |_, mean| mean);
        let tiles = self
            .render(image_graph, &Visualization::ndvi(NDVI_BAND))
            .await?;

        let status = VegetationStatus::classify(ndvi_mean);
        tracing::info!(
            ndvi_mean,
            ndvi_stddev,
            status = status.as_str(),
            "NDVI snapshot computed"
        );

        Ok(NdviSnapshotReport {
            ndvi_mean,
            ndvi_stddev,
            status,
            bounds,
            area_hectares: area_m2 / 10_000.0,
            window,
            tiles,
        })
    }

    /// GPS position embedded in a photo, if any
    pub fn locate_photo(&self, image: &[u8]) -> Option<GpsCoordinates> {
        geotag::extract_coordinates(image)
    }

    /// Region of interest around a photo's GPS position
    pub fn bounds_for_photo(
        &self,
        image: &[u8],
    ) -> Result<(GpsCoordinates, BoundingBox), VegetationError> {
        let point = self
            .locate_photo(image)
            .ok_or(VegetationError::NoCoordinates)?;
        Ok((
            point,
            BoundingBox::around(point, self.config.photo_half_extent_deg),
        ))
    }

    /// Check an uploaded file name against the configured extensions
    pub fn validate_upload_name(&self, filename: &str) -> Result<(), VegetationError> {
        validation::validate_upload_name(filename, &self.config.allowed_extensions)
    }

    fn resolve_scale(
        &self,
        scale_m: Option<u32>,
        bounds: &BoundingBox,
    ) -> Result<u32, VegetationError> {
        let scale = scale_m.unwrap_or(self.config.default_scale_m);
        validation::validate_scale(scale)?;
        validation::check_pixel_budget(bounds, scale, self.config.max_pixels)?;
        Ok(scale)
    }

    fn scene_query(&self) -> SceneQuery<'_> {
        SceneQuery {
            collection: &self.config.collection,
            max_cloud_cover: self.config.max_cloud_cover,
        }
    }

    fn change_graph(
        &self,
        bounds: &BoundingBox,
        windows: &ChangeWindows,
        scale: u32,
        output: ChangeOutput,
    ) -> Expression {
        let mut builder = ExpressionBuilder::new();
        let area = builder.bind(ndvi::rectangle(bounds));
        let scenes = ndvi::ndvi_collection(&mut builder, self.scene_query(), &area, &windows.overall);

        let result = match output {
            ChangeOutput::StartMean => {
                let start = ndvi::period_mean(&mut builder, &scenes, &windows.start);
                ndvi::region_mean(&mut builder, start, &area, scale, self.config.max_pixels)
            }
            ChangeOutput::EndMean => {
                let end = ndvi::period_mean(&mut builder, &scenes, &windows.end);
                ndvi::region_mean(&mut builder, end, &area, scale, self.config.max_pixels)
            }
            ChangeOutput::StartImage => ndvi::period_mean(&mut builder, &scenes, &windows.start),
            ChangeOutput::EndImage => ndvi::period_mean(&mut builder, &scenes, &windows.end),
            ChangeOutput::Difference => {
                let start = ndvi::period_mean(&mut builder, &scenes, &windows.start);
                let end = ndvi::period_mean(&mut builder, &scenes, &windows.end);
                ndvi::difference(end, start)
            }
        };
        builder.finish(result)
    }

    /// Build a graph over the snapshot's mean image; `output` picks the result node
    fn snapshot_graph(
        &self,
        bounds: &BoundingBox,
        window: &DateWindow,
        output: impl FnOnce(&ValueNode, ValueNode) -> ValueNode,
    ) -> Expression {
        let mut builder = ExpressionBuilder::new();
        let area = builder.bind(ndvi::rectangle(bounds));
        let scenes = ndvi::ndvi_collection(&mut builder, self.scene_query(), &area, window);
        let mean = ndvi::period_mean(&mut builder, &scenes, window);
        let result = output(&area, mean);
        builder.finish(result)
    }

    async fn compute(&self, expression: Expression) -> Result<Value, VegetationError> {
        tracing::debug!(result = %expression.result, nodes = expression.values.len(), "Evaluating expression");
        self.engine
            .compute_value(&expression)
            .await
            .map_err(map_engine_error)
    }

    /// Evaluate a regional mean graph for `period`
    async fn compute_mean(
        &self,
        expression: Expression,
        period: &str,
    ) -> Result<f64, VegetationError> {
        let value = self
            .engine
            .compute_value(&expression)
            .await
            .map_err(|err| {
                if err.is_missing_key() {
                    tracing::warn!(period, error = %err, "Reduction returned no NDVI band");
                    no_imagery(period)
                } else {
                    map_engine_error(err)
                }
            })?;
        reduced_value(value, period)
    }

    async fn render(
        &self,
        expression: Expression,
        visualization: &Visualization,
    ) -> Result<TileLayer, VegetationError> {
        self.engine
            .create_map(&expression, visualization)
            .await
            .map_err(map_engine_error)
    }
}

/// Interpret a regional reduction output; `null` means no scene covered `period`
fn reduced_value(value: Value, period: &str) -> Result<f64, VegetationError> {
    match value {
        Value::Null => {
            tracing::warn!(period, "No imagery available for period");
            Err(no_imagery(period))
        }
        Value::Number(n) => n.as_f64().ok_or(VegetationError::Internal),
        other => {
            tracing::error!(value = %other, "Regional mean is not a number");
            Err(VegetationError::Internal)
        }
    }
}

fn no_imagery(period: &str) -> VegetationError {
    VegetationError::NoImagery {
        period: period.to_string(),
    }
}

fn map_engine_error(err: EarthEngineError) -> VegetationError {
    if err.is_pixel_limit() {
        tracing::warn!(error = %err, "Region exceeds Earth Engine pixel limit");
        return VegetationError::RegionTooLarge {
            details: err.to_string(),
        };
    }
    match err {
        EarthEngineError::Decode(_) => {
            tracing::error!(error = %err, "Malformed Earth Engine response");
            VegetationError::Internal
        }
        other => {
            tracing::error!(error = %other, "Earth Engine request failed");
            VegetationError::Upstream {
                message: other.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reduced_value_values() {
        assert_eq!(reduced_value(json!(0.42), "2015").unwrap(), 0.42);
        assert_eq!(
            reduced_value(Value::Null, "2015"),
            Err(VegetationError::NoImagery {
                period: "2015".to_string()
            })
        );
        assert_eq!(
            reduced_value(json!("NaN"), "2015"),
            Err(VegetationError::Internal)
        );
    }

    #[test]
    fn test_engine_error_mapping() {
        let too_big = EarthEngineError::Api {
            status: 400,
            message: "Too many pixels in the region".to_string(),
        };
        assert!(matches!(
            map_engine_error(too_big),
            VegetationError::RegionTooLarge { .. }
        ));
        assert!(matches!(
            map_engine_error(EarthEngineError::Auth("expired".to_string())),
            VegetationError::Upstream { .. }
        ));
        assert_eq!(
            map_engine_error(EarthEngineError::Decode("missing name".to_string())),
            VegetationError::Internal
        );
    }
}
