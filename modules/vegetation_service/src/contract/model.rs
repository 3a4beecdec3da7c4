//! Contract models for vegetation service
//!
//! These models are transport-agnostic and used for inter-module communication.
//! NO serde derives - these are pure domain models.

use chrono::NaiveDate;

/// Geographic bounding box in WGS84 degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl BoundingBox {
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// Build a box from the two corners of the upload form.
    ///
    /// `(lat1, long1)` is the north-west corner, `(lat2, long2)` the south-east one.
    pub fn from_corners(lat1: f64, long1: f64, lat2: f64, long2: f64) -> Self {
        Self::new(lat1, lat2, long2, long1)
    }

    /// Square box centred on a point, clamped to the valid coordinate range
    pub fn around(point: GpsCoordinates, half_extent_deg: f64) -> Self {
        Self {
            north: (point.latitude + half_extent_deg).min(90.0),
            south: (point.latitude - half_extent_deg).max(-90.0),
            east: (point.longitude + half_extent_deg).min(180.0),
            west: (point.longitude - half_extent_deg).max(-180.0),
        }
    }

    /// Coordinates in the `[west, south, east, north]` order rectangles expect
    pub fn as_rectangle(&self) -> [f64; 4] {
        [self.west, self.south, self.east, self.north]
    }
}

/// A single GPS fix, decimal degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsCoordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Pair of calendar years to compare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub start_year: i32,
    pub end_year: i32,
}

impl YearRange {
    pub fn new(start_year: i32, end_year: i32) -> Self {
        Self {
            start_year,
            end_year,
        }
    }

    /// `start_year-01-01 .. end_year-12-31`
    pub fn overall_window(&self) -> Option<DateWindow> {
        Some(DateWindow {
            start: NaiveDate::from_ymd_opt(self.start_year, 1, 1)?,
            end: NaiveDate::from_ymd_opt(self.end_year, 12, 31)?,
        })
    }

    /// `start_year-01-01 .. (start_year + 1)-01-01`
    pub fn start_window(&self) -> Option<DateWindow> {
        Some(DateWindow {
            start: NaiveDate::from_ymd_opt(self.start_year, 1, 1)?,
            end: NaiveDate::from_ymd_opt(self.start_year + 1, 1, 1)?,
        })
    }

    /// `(end_year - 1)-12-31 .. end_year-12-31`
    pub fn end_window(&self) -> Option<DateWindow> {
        Some(DateWindow {
            start: NaiveDate::from_ymd_opt(self.end_year - 1, 12, 31)?,
            end: NaiveDate::from_ymd_opt(self.end_year, 12, 31)?,
        })
    }

    /// Human readable form, e.g. "2015 - 2022"
    pub fn label(&self) -> String {
        format!("{} - {}", self.start_year, self.end_year)
    }
}

/// Half-open date interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// The 365 days ending on `today`
    pub fn trailing_year(today: NaiveDate) -> Self {
        Self {
            start: today - chrono::Duration::days(365),
            end: today,
        }
    }
}

/// Qualitative label for an NDVI change between two periods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeCategory {
    SignificantIncrease,
    ModerateIncrease,
    SlightIncrease,
    NoSignificantChange,
    SlightDecrease,
    ModerateDecrease,
    SignificantDecrease,
}

impl ChangeCategory {
    /// Classify `end - start`
    pub fn classify(change: f64) -> Self {
        if change > 0.2 {
            Self::SignificantIncrease
        } else if change > 0.1 {
            Self::ModerateIncrease
        } else if change > 0.05 {
            Self::SlightIncrease
        } else if change.abs() <= 0.05 {
            Self::NoSignificantChange
        } else if change > -0.1 {
            Self::SlightDecrease
        } else if change > -0.2 {
            Self::ModerateDecrease
        } else {
            Self::SignificantDecrease
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SignificantIncrease => "Significant increase",
            Self::ModerateIncrease => "Moderate increase",
            Self::SlightIncrease => "Slight increase",
            Self::NoSignificantChange => "No significant change",
            Self::SlightDecrease => "Slight decrease",
            Self::ModerateDecrease => "Moderate decrease",
            Self::SignificantDecrease => "Significant decrease",
        }
    }
}

/// Vegetation density implied by a mean NDVI value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VegetationStatus {
    NoVegetation,
    VerySparse,
    Sparse,
    Moderate,
    Good,
    VeryGood,
    Dense,
    VeryDense,
}

impl VegetationStatus {
    pub fn classify(ndvi: f64) -> Self {
        match ndvi {
            v if v < 0.1 => Self::NoVegetation,
            v if v < 0.2 => Self::VerySparse,
            v if v < 0.3 => Self::Sparse,
            v if v < 0.4 => Self::Moderate,
            v if v < 0.5 => Self::Good,
            v if v < 0.6 => Self::VeryGood,
            v if v < 0.7 => Self::Dense,
            _ => Self::VeryDense,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoVegetation => "No vegetation",
            Self::VerySparse => "Very sparse",
            Self::Sparse => "Sparse",
            Self::Moderate => "Moderate",
            Self::Good => "Good",
            Self::VeryGood => "Very good",
            Self::Dense => "Dense",
            Self::VeryDense => "Very dense",
        }
    }
}

/// Rendered map overlay served by the imagery platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileLayer {
    /// Resource name of the map, e.g. "projects/p/maps/abc"
    pub map_name: String,
    /// XYZ template containing `{z}`, `{x}` and `{y}`
    pub url_format: String,
}

/// What the caller wants analysed
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub bounds: BoundingBox,
    /// Compare two years; `None` runs a single trailing-year snapshot
    pub years: Option<YearRange>,
    /// Pixel size in metres; `None` uses the configured default
    pub scale_m: Option<u32>,
}

/// Result of comparing two years
#[derive(Debug, Clone, PartialEq)]
pub struct NdviChangeReport {
    pub start_ndvi: f64,
    pub end_ndvi: f64,
    pub ndvi_change: f64,
    pub category: ChangeCategory,
    pub bounds: BoundingBox,
    pub years: YearRange,
    pub start_tiles: TileLayer,
    pub end_tiles: TileLayer,
    pub diff_tiles: TileLayer,
}

/// Result of a single-period analysis
#[derive(Debug, Clone, PartialEq)]
pub struct NdviSnapshotReport {
    pub ndvi_mean: f64,
    pub ndvi_stddev: f64,
    pub status: VegetationStatus,
    pub bounds: BoundingBox,
    pub area_hectares: f64,
    pub window: DateWindow,
    pub tiles: TileLayer,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisReport {
    Change(NdviChangeReport),
    Snapshot(NdviSnapshotReport),
}
