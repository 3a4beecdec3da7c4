//! Contract error types for vegetation service
//!
//! These errors are transport-agnostic and used for inter-module communication.

/// Vegetation service domain errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VegetationError {
    /// Rejected input (coordinates, years, scale, form fields)
    Validation {
        /// Validation error message
        message: String,
    },
    /// Uploaded file has an extension we do not accept
    UnsupportedFile {
        /// Offending file name
        filename: String,
    },
    /// Photo carried no usable GPS metadata and no manual coordinates were given
    NoCoordinates,
    /// No cloud-free scene covered the area during a period
    NoImagery {
        /// Period label, e.g. "2015"
        period: String,
    },
    /// Region would exceed the pixel budget at the requested scale
    RegionTooLarge {
        /// Details about the estimate or remote failure
        details: String,
    },
    /// The imagery platform failed or refused the request
    Upstream {
        /// Message reported by the platform
        message: String,
    },
    /// Internal error
    Internal,
}

impl std::fmt::Display for VegetationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation { message } => {
                write!(f, "Validation error: {}", message)
            }
            Self::UnsupportedFile { filename } => {
                write!(f, "Invalid file type: {}", filename)
            }
            Self::NoCoordinates => {
                write!(
                    f,
                    "No coordinates found in image. Please enter coordinates manually."
                )
            }
            Self::NoImagery { period } => {
                write!(
                    f,
                    "No satellite imagery available for this area and time period ({})",
                    period
                )
            }
            Self::RegionTooLarge { details } => {
                write!(f, "Region too large for analysis: {}", details)
            }
            Self::Upstream { message } => {
                write!(f, "Imagery service error: {}", message)
            }
            Self::Internal => {
                write!(f, "Internal error")
            }
        }
    }
}

impl std::error::Error for VegetationError {}

impl VegetationError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}
