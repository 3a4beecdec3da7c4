//! Domain layer - business logic and services

pub mod expression;
pub mod geotag;
pub mod imagery;
pub mod ndvi;
pub mod service;
pub mod validation;

pub use expression::{Expression, ExpressionBuilder, ValueNode};
pub use imagery::{EarthEngine, EarthEngineError, Visualization};
pub use service::Service;
