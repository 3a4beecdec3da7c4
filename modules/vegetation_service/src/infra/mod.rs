//! Infrastructure adapters

pub mod earth_engine;
