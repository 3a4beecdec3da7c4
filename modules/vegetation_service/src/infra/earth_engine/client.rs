//! Earth Engine REST client
//!
//! Implements the domain's [`EarthEngine`] seam on top of the v1 REST API:
//! `value:compute` for evaluating expressions and `maps` for tile rendering.

use super::auth::{
    ServiceAccountKey, ServiceAccountTokens, StaticToken, TokenProvider, ACCESS_TOKEN_ENV,
};
use crate::config::EarthEngineConfig;
use crate::contract::TileLayer;
use crate::domain::{EarthEngine, EarthEngineError, Expression, Visualization};
use anyhow::Context;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

#[derive(Serialize)]
struct ComputeValueRequest<'a> {
    expression: &'a Expression,
}

#[derive(Deserialize)]
struct ComputeValueResponse {
    #[serde(default)]
    result: Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateMapRequest<'a> {
    expression: &'a Expression,
    file_format: &'static str,
    band_ids: &'a [String],
    visualization_options: VisualizationOptions<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VisualizationOptions<'a> {
    ranges: [DoubleRange; 1],
    palette_colors: &'a [String],
}

#[derive(Serialize)]
struct DoubleRange {
    min: f64,
    max: f64,
}

#[derive(Deserialize)]
struct CreateMapResponse {
    name: String,
}

/// Google API error envelope
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// [`EarthEngine`] over HTTPS
pub struct RestEarthEngine {
    http: reqwest::Client,
    base_url: String,
    project: String,
    tokens: Arc<dyn TokenProvider>,
}

impl RestEarthEngine {
    /// Create a client against `base_url` (API root without `/v1`)
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        project: impl Into<String>,
        tokens: Arc<dyn TokenProvider>,
    ) -> anyhow::Result<Self> {
        Url::parse(base_url)
            .with_context(|| format!("invalid Earth Engine base URL '{}'", base_url))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            project: project.into(),
            tokens,
        })
    }

    /// Wire credentials, project and timeout from configuration.
    ///
    /// Credentials are taken from, in order: the service account key file,
    /// `access_token`, the `EE_ACCESS_TOKEN` environment variable.
    pub fn from_config(cfg: &EarthEngineConfig) -> anyhow::Result<Self> {
        let http = build_http_client(cfg.timeout)?;

        let (tokens, key_project): (Arc<dyn TokenProvider>, Option<String>) =
            if let Some(path) = &cfg.service_account_key {
                let key = ServiceAccountKey::from_file(path)?;
                let project = key.project_id.clone();
                tracing::info!(client_email = %key.client_email, "Using Earth Engine service account");
                let tokens: Arc<dyn TokenProvider> = Arc::new(ServiceAccountTokens::new(key, http.clone())?);
                (tokens, project)
            } else if let Some(token) = cfg
                .access_token
                .clone()
                .or_else(|| std::env::var(ACCESS_TOKEN_ENV).ok())
            {
                tracing::info!("Using static Earth Engine access token");
                let tokens: Arc<dyn TokenProvider> = Arc::new(StaticToken::new(token));
                (tokens, None)
            } else {
                anyhow::bail!(
                    "no Earth Engine credentials configured: set earth_engine.service_account_key, \
                     earth_engine.access_token or {}",
                    ACCESS_TOKEN_ENV
                );
            };

        let project = cfg
            .project
            .clone()
            .or(key_project)
            .context("earth_engine.project is not set and no project_id was found in the key")?;

        Self::new(http, &cfg.base_url, project, tokens)
    }

    fn project_url(&self, method: &str) -> String {
        format!("{}/v1/projects/{}/{}", self.base_url, self.project, method)
    }

    /// XYZ template for a map resource returned by `maps`
    pub fn tile_url_format(&self, map_name: &str) -> String {
        format!("{}/v1/{}/tiles/{{z}}/{{x}}/{{y}}", self.base_url, map_name)
    }

    async fn post<B, R>(&self, url: &str, body: &B) -> Result<R, EarthEngineError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(|e| EarthEngineError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ErrorEnvelope>(&raw) {
                Ok(envelope) => match envelope.error.status {
                    Some(code) => format!("{} ({})", envelope.error.message, code),
                    None => envelope.error.message,
                },
                Err(_) => raw,
            };
            tracing::debug!(%url, status = status.as_u16(), %message, "Earth Engine call failed");
            return Err(EarthEngineError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<R>()
            .await
            .map_err(|e| EarthEngineError::Decode(e.to_string()))
    }
}

#[async_trait]
impl EarthEngine for RestEarthEngine {
    async fn compute_value(&self, expression: &Expression) -> Result<Value, EarthEngineError> {
        let url = self.project_url("value:compute");
        tracing::debug!(%url, nodes = expression.values.len(), "value:compute");
        let response: ComputeValueResponse = self
            .post(&url, &ComputeValueRequest { expression })
            .await?;
        Ok(response.result)
    }

    async fn create_map(
        &self,
        expression: &Expression,
        visualization: &Visualization,
    ) -> Result<TileLayer, EarthEngineError> {
        let url = self.project_url("maps");
        tracing::debug!(%url, "maps.create");
        let request = CreateMapRequest {
            expression,
            file_format: "AUTO_JPEG_PNG",
            band_ids: &visualization.band_ids,
            visualization_options: VisualizationOptions {
                ranges: [DoubleRange {
                    min: visualization.min,
                    max: visualization.max,
                }],
                palette_colors: &visualization.palette,
            },
        };
        let response: CreateMapResponse = self.post(&url, &request).await?;
        if response.name.is_empty() {
            return Err(EarthEngineError::Decode("map response has an empty name".to_string()));
        }

        Ok(TileLayer {
            url_format: self.tile_url_format(&response.name),
            map_name: response.name,
        })
    }
}

fn build_http_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("failed to build HTTP client")
}
