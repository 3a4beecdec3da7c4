//! Imagery platform seam
//!
//! The domain only assembles expressions; evaluating them and rendering
//! tiles is done by an implementation of [`EarthEngine`].
//! The REST-backed implementation lives in infra/earth_engine.

use super::expression::Expression;
use crate::contract::TileLayer;
use async_trait::async_trait;
use serde_json::Value;

/// Remote evaluation of Earth Engine expressions
#[async_trait]
pub trait EarthEngine: Send + Sync {
    /// Evaluate an expression and return its JSON value
    async fn compute_value(&self, expression: &Expression) -> Result<Value, EarthEngineError>;

    /// Register an image expression for tiled rendering
    async fn create_map(
        &self,
        expression: &Expression,
        visualization: &Visualization,
    ) -> Result<TileLayer, EarthEngineError>;
}

/// Failures talking to the imagery platform
#[derive(Debug, thiserror::Error)]
pub enum EarthEngineError {
    #[error("Earth Engine returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("failed to obtain an access token: {0}")]
    Auth(String),

    #[error("request to Earth Engine failed: {0}")]
    Transport(String),

    #[error("unexpected Earth Engine response: {0}")]
    Decode(String),
}

impl EarthEngineError {
    /// The platform refused a reduction because it touched too many pixels
    pub fn is_pixel_limit(&self) -> bool {
        match self {
            Self::Api { message, .. } => {
                message.contains("maxPixels") || message.contains("Too many pixels")
            }
            _ => false,
        }
    }

    /// A dictionary lookup failed because the reduced image had no bands,
    /// which is what an empty scene collection produces
    pub fn is_missing_key(&self) -> bool {
        match self {
            Self::Api { message, .. } => message.contains("does not contain key"),
            _ => false,
        }
    }
}

/// Rendering parameters for a single-band image
#[derive(Debug, Clone, PartialEq)]
pub struct Visualization {
    pub band_ids: Vec<String>,
    pub min: f64,
    pub max: f64,
    /// Hex colours without the leading `#`, low to high
    pub palette: Vec<String>,
}

/// Red (bare) to dark green (very dense) over NDVI 0.0 ..= 0.8
pub const NDVI_PALETTE: [&str; 8] = [
    "d73027", "f46d43", "fdae61", "fee08b", "d9ef8b", "a6d96a", "66bd63", "1a9850",
];

/// Red (loss) through white (no change) to green (gain) over -0.3 ..= 0.3
pub const DIFFERENCE_PALETTE: [&str; 7] = [
    "d73027", "f46d43", "fdae61", "ffffff", "a6d96a", "66bd63", "1a9850",
];

impl Visualization {
    pub fn ndvi(band: &str) -> Self {
        Self {
            band_ids: vec![band.to_string()],
            min: 0.0,
            max: 0.8,
            palette: NDVI_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn ndvi_difference(band: &str) -> Self {
        Self {
            band_ids: vec![band.to_string()],
            min: -0.3,
            max: 0.3,
            palette: DIFFERENCE_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}
