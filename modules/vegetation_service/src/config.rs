//! Configuration for vegetation service module

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Vegetation service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Connection to the Earth Engine REST API
    #[serde(default)]
    pub earth_engine: EarthEngineConfig,

    /// Image collection holding the Landsat 8 scenes
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Scenes with a `CLOUD_COVER` at or above this percentage are dropped
    #[serde(default = "default_max_cloud_cover")]
    pub max_cloud_cover: f64,

    /// Pixel size in metres used when a request does not specify one
    #[serde(default = "default_scale_m")]
    pub default_scale_m: u32,

    /// Upper bound on estimated pixels per regional reduction
    #[serde(default = "default_max_pixels")]
    pub max_pixels: u64,

    /// Half side, in degrees, of the box drawn around a photo's GPS position
    #[serde(default = "default_photo_half_extent")]
    pub photo_half_extent_deg: f64,

    /// Accepted upload extensions, lowercase
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,

    /// Maximum multipart body size in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            earth_engine: EarthEngineConfig::default(),
            collection: default_collection(),
            max_cloud_cover: default_max_cloud_cover(),
            default_scale_m: default_scale_m(),
            max_pixels: default_max_pixels(),
            photo_half_extent_deg: default_photo_half_extent(),
            allowed_extensions: default_allowed_extensions(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// Earth Engine endpoint and credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EarthEngineConfig {
    /// API root, without the version segment
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Cloud project the requests are billed to.
    /// Falls back to the service account key's `project_id`.
    #[serde(default)]
    pub project: Option<String>,

    /// Pre-issued OAuth bearer token
    #[serde(default, skip_serializing)]
    pub access_token: Option<String>,

    /// Path to a service account JSON key
    #[serde(default)]
    pub service_account_key: Option<PathBuf>,

    /// Per-request timeout
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for EarthEngineConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            project: None,
            access_token: None,
            service_account_key: None,
            timeout: default_timeout(),
        }
    }
}

fn default_collection() -> String {
    "LANDSAT/LC08/C02/T1_TOA".to_string()
}

fn default_max_cloud_cover() -> f64 {
    20.0
}

fn default_scale_m() -> u32 {
    30
}

fn default_max_pixels() -> u64 {
    10_000_000
}

fn default_photo_half_extent() -> f64 {
    0.05
}

fn default_allowed_extensions() -> Vec<String> {
    ["jpg", "jpeg", "png", "tif", "tiff"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_max_upload_bytes() -> usize {
    16 * 1024 * 1024 // 16MB
}

fn default_base_url() -> String {
    "https://earthengine.googleapis.com".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(120)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_from_empty_document() {
        let cfg: Config = serde_json::from_value(json!({})).unwrap();
        assert_eq!(cfg.collection, "LANDSAT/LC08/C02/T1_TOA");
        assert_eq!(cfg.default_scale_m, 30);
        assert_eq!(cfg.max_pixels, 10_000_000);
        assert_eq!(cfg.max_upload_bytes, 16 * 1024 * 1024);
        assert_eq!(cfg.earth_engine.timeout, Duration::from_secs(120));
        assert_eq!(cfg.earth_engine.base_url, "https://earthengine.googleapis.com");
    }

    #[test]
    fn test_humantime_timeout_and_unknown_fields() {
        let cfg: Config = serde_json::from_value(json!({
            "earth_engine": { "project": "demo", "timeout": "15s" }
        }))
        .unwrap();
        assert_eq!(cfg.earth_engine.project.as_deref(), Some("demo"));
        assert_eq!(cfg.earth_engine.timeout, Duration::from_secs(15));

        let err = serde_json::from_value::<Config>(json!({ "colection": "typo" }));
        assert!(err.is_err());
    }

    #[test]
    fn test_access_token_is_never_serialized() {
        let mut cfg = Config::default();
        cfg.earth_engine.access_token = Some("secret".to_string());
        let value = serde_json::to_value(&cfg).unwrap();
        assert!(value["earth_engine"].get("access_token").is_none());
    }
}
