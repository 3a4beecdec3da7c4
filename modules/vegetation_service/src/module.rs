//! Module declaration and lifecycle

use crate::config::Config;
use crate::contract::VegetationApi;
use crate::domain::{EarthEngine, Service};
use crate::infra::earth_engine::RestEarthEngine;
use anyhow::Result;
use parking_lot::RwLock;
use std::sync::Arc;

/// Vegetation service module
pub struct VegetationServiceModule {
    config: RwLock<Config>,
    service: RwLock<Option<Arc<Service>>>,
}

impl Default for VegetationServiceModule {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl VegetationServiceModule {
    pub fn new(config: Config) -> Self {
        Self {
            config: RwLock::new(config),
            service: RwLock::new(None),
        }
    }

    /// Connect to Earth Engine and build the domain service
    pub fn init(&self) -> Result<()> {
        let cfg = self.config.read().clone();
        let engine = Arc::new(RestEarthEngine::from_config(&cfg.earth_engine)?);
        self.init_with_engine(engine);
        Ok(())
    }

    /// Build the domain service on top of an existing engine
    pub fn init_with_engine(&self, engine: Arc<dyn EarthEngine>) -> Arc<Service> {
        let cfg = self.config.read().clone();
        let service = Arc::new(Service::new(engine, cfg));
        *self.service.write() = Some(service.clone());

        tracing::info!("Vegetation service initialized");
        service
    }

    fn service(&self) -> Result<Arc<Service>> {
        self.service
            .read()
            .as_ref()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Service not initialized"))
    }

    /// In-process client
    pub fn client(&self) -> Result<Arc<dyn VegetationApi>> {
        let client = crate::api::native::NativeClient::new(self.service()?);
        Ok(Arc::new(client))
    }

    /// Mount the REST routes on `router`
    pub fn register_rest(&self, router: axum::Router) -> Result<axum::Router> {
        let service = self.service()?;
        let max_upload_bytes = self.config.read().max_upload_bytes;

        tracing::info!("Registering vegetation service REST routes");
        crate::api::rest::routes::register_routes(router, service, max_upload_bytes)
    }
}
