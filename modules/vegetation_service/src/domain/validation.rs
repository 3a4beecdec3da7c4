//! Input validation for analysis requests and uploads

use crate::contract::{BoundingBox, VegetationError, YearRange};

/// First full year of Landsat 8 operations
pub const FIRST_LANDSAT8_YEAR: i32 = 2013;

/// Rough length of one degree, in kilometres
const KM_PER_DEGREE: f64 = 111.0;

/// Validate a bounding box
///
/// Requires finite values, latitudes in [-90, 90], longitudes in [-180, 180],
/// `north > south` and `east > west`.
pub fn validate_bounds(bounds: &BoundingBox) -> Result<(), VegetationError> {
    let values = [bounds.north, bounds.south, bounds.east, bounds.west];
    if values.iter().any(|v| !v.is_finite()) {
        return Err(VegetationError::validation(
            "coordinates must be finite numbers",
        ));
    }

    for (name, lat) in [("north", bounds.north), ("south", bounds.south)] {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(VegetationError::validation(format!(
                "{} latitude {} is outside [-90, 90]",
                name, lat
            )));
        }
    }

    for (name, lon) in [("east", bounds.east), ("west", bounds.west)] {
        if !(-180.0..=180.0).contains(&lon) {
            return Err(VegetationError::validation(format!(
                "{} longitude {} is outside [-180, 180]",
                name, lon
            )));
        }
    }

    if bounds.north <= bounds.south {
        return Err(VegetationError::validation(format!(
            "north ({}) must be greater than south ({})",
            bounds.north, bounds.south
        )));
    }

    if bounds.east <= bounds.west {
        return Err(VegetationError::validation(format!(
            "east ({}) must be greater than west ({})",
            bounds.east, bounds.west
        )));
    }

    Ok(())
}

/// Validate a year pair against the Landsat 8 record
pub fn validate_years(years: YearRange, current_year: i32) -> Result<(), VegetationError> {
    for year in [years.start_year, years.end_year] {
        if !(FIRST_LANDSAT8_YEAR..=current_year).contains(&year) {
            return Err(VegetationError::validation(format!(
                "year {} is outside the Landsat 8 record ({}-{})",
                year, FIRST_LANDSAT8_YEAR, current_year
            )));
        }
    }

    if years.start_year > years.end_year {
        return Err(VegetationError::validation(format!(
            "startYear ({}) must not be after endYear ({})",
            years.start_year, years.end_year
        )));
    }

    Ok(())
}

/// Validate a pixel size in metres
pub fn validate_scale(scale_m: u32) -> Result<(), VegetationError> {
    if scale_m == 0 {
        return Err(VegetationError::validation("scale must be at least 1 metre"));
    }
    Ok(())
}

/// Approximate pixel count of `bounds` at `scale_m`, treating a degree as 111 km
pub fn estimate_pixels(bounds: &BoundingBox, scale_m: u32) -> f64 {
    let height_km = (bounds.north - bounds.south).abs() * KM_PER_DEGREE;
    let width_km = (bounds.east - bounds.west).abs() * KM_PER_DEGREE;
    let area_m2 = height_km * width_km * 1_000_000.0;
    let pixel_m2 = f64::from(scale_m) * f64::from(scale_m);
    area_m2 / pixel_m2
}

/// Reject regions whose estimated pixel count exceeds `max_pixels`
pub fn check_pixel_budget(
    bounds: &BoundingBox,
    scale_m: u32,
    max_pixels: u64,
) -> Result<(), VegetationError> {
    let estimate = estimate_pixels(bounds, scale_m);
    if estimate > max_pixels as f64 {
        return Err(VegetationError::RegionTooLarge {
            details: format!(
                "estimated {:.0} pixels at {}m resolution, max allowed is {}. \
                 Use a smaller region or a larger scale",
                estimate, scale_m, max_pixels
            ),
        });
    }
    Ok(())
}

/// Validate an uploaded file name against the accepted extensions
pub fn validate_upload_name(filename: &str, allowed: &[String]) -> Result<(), VegetationError> {
    if filename.trim().is_empty() {
        return Err(VegetationError::validation("No file selected"));
    }

    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty());

    match extension {
        Some(ext) if allowed.iter().any(|a| a.eq_ignore_ascii_case(&ext)) => Ok(()),
        _ => Err(VegetationError::UnsupportedFile {
            filename: filename.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kansas() -> BoundingBox {
        BoundingBox::new(39.55, 39.45, -96.45, -96.55)
    }

    fn allowed() -> Vec<String> {
        ["jpg", "jpeg", "png", "tif", "tiff"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_valid_bounds() {
        assert!(validate_bounds(&kansas()).is_ok());
        assert!(validate_bounds(&BoundingBox::new(-10.20, -10.30, -56.40, -56.50)).is_ok());
    }

    #[test]
    fn test_invalid_bounds() {
        assert!(validate_bounds(&BoundingBox::new(39.45, 39.55, -96.45, -96.55)).is_err());
        assert!(validate_bounds(&BoundingBox::new(39.55, 39.45, -96.55, -96.45)).is_err());
        assert!(validate_bounds(&BoundingBox::new(91.0, 39.45, -96.45, -96.55)).is_err());
        assert!(validate_bounds(&BoundingBox::new(39.55, 39.45, 181.0, -96.55)).is_err());
        assert!(validate_bounds(&BoundingBox::new(f64::NAN, 39.45, -96.45, -96.55)).is_err());
        assert!(validate_bounds(&BoundingBox::new(1.0, 1.0, 2.0, 1.0)).is_err());
    }

    #[test]
    fn test_years() {
        assert!(validate_years(YearRange::new(2015, 2022), 2024).is_ok());
        assert!(validate_years(YearRange::new(2020, 2020), 2024).is_ok());
        assert!(validate_years(YearRange::new(2022, 2015), 2024).is_err());
        assert!(validate_years(YearRange::new(2010, 2015), 2024).is_err());
        assert!(validate_years(YearRange::new(2015, 2030), 2024).is_err());
    }

    #[test]
    fn test_scale() {
        assert!(validate_scale(30).is_ok());
        assert!(validate_scale(0).is_err());
    }

    #[test]
    fn test_pixel_estimate_for_small_region() {
        // 0.1 x 0.1 degrees ~ 11.1 km x 11.1 km ~ 123.21 km2 ~ 136,900 pixels at 30 m
        let estimate = estimate_pixels(&kansas(), 30);
        assert!((estimate - 136_900.0).abs() < 1.0, "estimate was {}", estimate);
        assert!(check_pixel_budget(&kansas(), 30, 10_000_000).is_ok());
    }

    #[test]
    fn test_pixel_budget_rejects_large_region() {
        let continent = BoundingBox::new(50.0, 25.0, -65.0, -125.0);
        let err = check_pixel_budget(&continent, 30, 10_000_000).unwrap_err();
        assert!(matches!(err, VegetationError::RegionTooLarge { .. }));
        // Finer pixels push a small region over budget
        assert!(check_pixel_budget(&kansas(), 3, 10_000_000).is_err());
        assert!(check_pixel_budget(&kansas(), 1, 10_000_000).is_err());
    }

    #[test]
    fn test_upload_names() {
        assert!(validate_upload_name("field.jpg", &allowed()).is_ok());
        assert!(validate_upload_name("FIELD.JPEG", &allowed()).is_ok());
        assert!(validate_upload_name("scan.v2.tiff", &allowed()).is_ok());

        assert_eq!(
            validate_upload_name("", &allowed()),
            Err(VegetationError::Validation {
                message: "No file selected".to_string()
            })
        );
        assert!(matches!(
            validate_upload_name("notes.txt", &allowed()),
            Err(VegetationError::UnsupportedFile { .. })
        ));
        assert!(matches!(
            validate_upload_name("jpg", &allowed()),
            Err(VegetationError::UnsupportedFile { .. })
        ));
        assert!(matches!(
            validate_upload_name("photo.", &allowed()),
            Err(VegetationError::UnsupportedFile { .. })
        ));
    }
}
