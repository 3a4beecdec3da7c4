//! HTTP error mapping to RFC-9457 Problem Details

use crate::contract::VegetationError;
use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// RFC-9457 Problem Details for HTTP API errors
#[derive(Debug, Serialize)]
pub struct Problem {
    /// A URI reference that identifies the problem type
    #[serde(rename = "type")]
    pub type_uri: String,

    /// A short, human-readable summary of the problem type
    pub title: String,

    /// The HTTP status code
    pub status: u16,

    /// A human-readable explanation specific to this occurrence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// A URI reference that identifies the specific occurrence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

impl Problem {
    /// Create a new Problem Details response
    pub fn new(status: StatusCode, title: impl Into<String>) -> Self {
        Self {
            type_uri: format!("https://httpstatuses.io/{}", status.as_u16()),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            instance: None,
        }
    }

    /// Add detail message
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Add instance URI
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Json(self)).into_response();
        response.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderValue::from_static("application/problem+json"),
        );
        response
    }
}

/// Map domain errors to HTTP Problem Details
pub fn map_domain_error(error: VegetationError) -> Problem {
    let detail = error.to_string();
    match error {
        VegetationError::Validation { message } => {
            Problem::new(StatusCode::BAD_REQUEST, "Validation Error").with_detail(message)
        }

        VegetationError::UnsupportedFile { .. } => {
            Problem::new(StatusCode::BAD_REQUEST, "Invalid File Type").with_detail(detail)
        }

        VegetationError::NoCoordinates => {
            Problem::new(StatusCode::BAD_REQUEST, "No Coordinates").with_detail(detail)
        }

        VegetationError::RegionTooLarge { .. } => {
            Problem::new(StatusCode::BAD_REQUEST, "Region Too Large").with_detail(detail)
        }

        VegetationError::NoImagery { .. } => {
            Problem::new(StatusCode::NOT_FOUND, "No Imagery").with_detail(detail)
        }

        VegetationError::Upstream { .. } => {
            Problem::new(StatusCode::BAD_GATEWAY, "Imagery Service Error").with_detail(detail)
        }

        VegetationError::Internal => Problem::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
        )
        .with_detail("An unexpected error occurred"),
    }
}

/// Malformed or oversized multipart bodies
pub fn map_multipart_error(error: MultipartError) -> Problem {
    tracing::warn!(error = %error, "Rejected multipart upload");
    Problem::new(error.status(), "Invalid Upload").with_detail(error.body_text())
}

/// Malformed JSON bodies
pub fn map_json_rejection(rejection: JsonRejection) -> Problem {
    tracing::warn!(error = %rejection, "Rejected JSON body");
    Problem::new(rejection.status(), "Invalid Request Body").with_detail(rejection.body_text())
}
