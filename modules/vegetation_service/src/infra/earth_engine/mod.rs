pub mod auth;
pub mod client;

pub use auth::{ServiceAccountKey, ServiceAccountTokens, StaticToken, TokenProvider};
pub use client::RestEarthEngine;
