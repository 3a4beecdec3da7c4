//! GPS position from photo metadata

use crate::contract::GpsCoordinates;
use exif::{Exif, In, Reader, Tag, Value};
use std::io::Cursor;

/// Read the GPS fix embedded in an image's EXIF block.
///
/// Returns `None` when the container has no EXIF data, no GPS directory,
/// or a malformed latitude/longitude.
pub fn extract_coordinates(image: &[u8]) -> Option<GpsCoordinates> {
    let exif = match Reader::new().read_from_container(&mut Cursor::new(image)) {
        Ok(exif) => exif,
        Err(err) => {
            tracing::debug!(error = %err, "No EXIF data found in image");
            return None;
        }
    };

    let latitude = signed_degrees(&exif, Tag::GPSLatitude, Tag::GPSLatitudeRef, b'S');
    let longitude = signed_degrees(&exif, Tag::GPSLongitude, Tag::GPSLongitudeRef, b'W');
    let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
        tracing::debug!("No GPS information found in EXIF data");
        return None;
    };

    if latitude.abs() > 90.0 || longitude.abs() > 180.0 {
        tracing::debug!(latitude, longitude, "GPS position out of range");
        return None;
    }

    Some(GpsCoordinates {
        latitude,
        longitude,
    })
}

/// Degrees, minutes and seconds to decimal degrees
pub fn dms_to_decimal(degrees: f64, minutes: f64, seconds: f64) -> f64 {
    degrees + minutes / 60.0 + seconds / 3600.0
}

fn signed_degrees(exif: &Exif, value_tag: Tag, ref_tag: Tag, negative_ref: u8) -> Option<f64> {
    let field = exif.get_field(value_tag, In::PRIMARY)?;
    let [d, m, s] = match &field.value {
        Value::Rational(parts) if parts.len() >= 3 => {
            [parts[0].to_f64(), parts[1].to_f64(), parts[2].to_f64()]
        }
        _ => return None,
    };
    let decimal = dms_to_decimal(d, m, s);
    if !decimal.is_finite() {
        return None;
    }

    let hemisphere = match &exif.get_field(ref_tag, In::PRIMARY)?.value {
        Value::Ascii(lines) => lines.first().and_then(|line| line.first()).copied()?,
        _ => return None,
    };

    if hemisphere.eq_ignore_ascii_case(&negative_ref) {
        Some(-decimal)
    } else {
        Some(decimal)
    }
}
