//! Common test utilities: a scripted Earth Engine and geotagged fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use exif::experimental::Writer;
use exif::{Field, In, Rational, Tag, Value};
use parking_lot::Mutex;
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;
use vegetation_service::config::Config;
use vegetation_service::contract::TileLayer;
use vegetation_service::domain::{EarthEngine, EarthEngineError, Expression, Service, Visualization};

type ComputeFn = dyn Fn(&Expression) -> Result<serde_json::Value, EarthEngineError> + Send + Sync;

/// In-memory [`EarthEngine`] answering from a closure and recording every call
pub struct MockEarthEngine {
    compute: Box<ComputeFn>,
    fail_maps: Option<String>,
    computed: Mutex<Vec<Expression>>,
    rendered: Mutex<Vec<(Expression, Visualization)>>,
}

impl MockEarthEngine {
    pub fn new(
        compute: impl Fn(&Expression) -> Result<serde_json::Value, EarthEngineError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            compute: Box::new(compute),
            fail_maps: None,
            computed: Mutex::new(Vec::new()),
            rendered: Mutex::new(Vec::new()),
        }
    }

    /// Answer change graphs: `start` for the first year, `end` for the second.
    ///
    /// The first year's window ends on `start_year + 1`-01-01, which only
    /// appears in the start graph.
    pub fn change(start_year: i32, start: serde_json::Value, end: serde_json::Value) -> Self {
        let marker = format!("{}-01-01", start_year + 1);
        Self::new(move |expr| {
            if serialized(expr).contains(&marker) {
                Ok(start.clone())
            } else {
                Ok(end.clone())
            }
        })
    }

    /// Answer snapshot graphs: statistics dictionary and area in m²
    pub fn snapshot(mean: f64, std_dev: f64, area_m2: f64) -> Self {
        Self::new(move |expr| {
            let root = expr.result_node().and_then(|n| n.function_name());
            if root == Some("Geometry.area") {
                Ok(json!(area_m2))
            } else {
                Ok(json!({ "NDVI_mean": mean, "NDVI_stdDev": std_dev }))
            }
        })
    }

    pub fn failing_maps(mut self, message: &str) -> Self {
        self.fail_maps = Some(message.to_string());
        self
    }

    pub fn computed(&self) -> Vec<Expression> {
        self.computed.lock().clone()
    }

    pub fn rendered(&self) -> Vec<(Expression, Visualization)> {
        self.rendered.lock().clone()
    }

    pub fn compute_count(&self) -> usize {
        self.computed.lock().len()
    }

    pub fn render_count(&self) -> usize {
        self.rendered.lock().len()
    }
}

#[async_trait]
impl EarthEngine for MockEarthEngine {
    async fn compute_value(
        &self,
        expression: &Expression,
    ) -> Result<serde_json::Value, EarthEngineError> {
        self.computed.lock().push(expression.clone());
        (self.compute)(expression)
    }

    async fn create_map(
        &self,
        expression: &Expression,
        visualization: &Visualization,
    ) -> Result<TileLayer, EarthEngineError> {
        if let Some(message) = &self.fail_maps {
            return Err(EarthEngineError::Api {
                status: 500,
                message: message.clone(),
            });
        }
        let mut rendered = self.rendered.lock();
        rendered.push((expression.clone(), visualization.clone()));
        let map_name = format!("projects/test/maps/map-{}", rendered.len());
        Ok(TileLayer {
            url_format: format!("https://ee.test/v1/{}/tiles/{{z}}/{{x}}/{{y}}", map_name),
            map_name,
        })
    }
}

pub fn serialized(expr: &Expression) -> String {
    serde_json::to_string(expr).unwrap_or_default()
}

pub fn service_with(engine: Arc<MockEarthEngine>) -> Arc<Service> {
    Arc::new(Service::new(engine, Config::default()))
}

// ===== Geotagged fixtures =====

fn dms(value: (u32, u32, u32)) -> Value {
    Value::Rational(vec![
        Rational::from((value.0, 1)),
        Rational::from((value.1, 1)),
        Rational::from((value.2, 100)),
    ])
}

fn ascii(text: &str) -> Value {
    Value::Ascii(vec![text.as_bytes().to_vec()])
}

/// TIFF bytes carrying a GPS position; seconds are given in hundredths
pub fn gps_tiff(lat: (u32, u32, u32), lat_ref: &str, lon: (u32, u32, u32), lon_ref: &str) -> Vec<u8> {
    let fields = [
        Field {
            tag: Tag::GPSLatitudeRef,
            ifd_num: In::PRIMARY,
            value: ascii(lat_ref),
        },
        Field {
            tag: Tag::GPSLatitude,
            ifd_num: In::PRIMARY,
            value: dms(lat),
        },
        Field {
            tag: Tag::GPSLongitudeRef,
            ifd_num: In::PRIMARY,
            value: ascii(lon_ref),
        },
        Field {
            tag: Tag::GPSLongitude,
            ifd_num: In::PRIMARY,
            value: dms(lon),
        },
    ];
    let mut writer = Writer::new();
    for field in &fields {
        writer.push_field(field);
    }
    let mut buf = Cursor::new(Vec::new());
    writer.write(&mut buf, false).unwrap();
    buf.into_inner()
}

/// 39°30'00" N, 96°30'00" W (Konza Prairie)
pub fn konza_photo() -> Vec<u8> {
    gps_tiff((39, 30, 0), "N", (96, 30, 0), "W")
}
