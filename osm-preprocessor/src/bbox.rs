use crate::error::{PreprocessError, Result};
use common::{BoundingBox, Coordinate};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Square-ish box of half-width `distance_m` around `center`, using an equirectangular
/// approximation on a spherical earth.
pub fn bounding_box(center: Coordinate, distance_m: f64) -> Result<BoundingBox> {
    if !(distance_m > 0.0 && distance_m.is_finite()) {
        return Err(PreprocessError::InvalidInput(format!(
            "distance must be a positive number of metres, got {distance_m}"
        )));
    }
    if !(-90.0..=90.0).contains(&center.lat) {
        return Err(PreprocessError::InvalidInput(format!(
            "latitude out of range: {}",
            center.lat
        )));
    }
    if !(-180.0..=180.0).contains(&center.lon) {
        return Err(PreprocessError::InvalidInput(format!(
            "longitude out of range: {}",
            center.lon
        )));
    }

    let distance_km = distance_m * 0.001;
    let lat = center.lat.to_radians();
    let lon = center.lon.to_radians();

    // Radius of the parallel at this latitude
    let parallel_radius = EARTH_RADIUS_KM * lat.cos();

    let d_lat = distance_km / EARTH_RADIUS_KM;
    let d_lon = distance_km / parallel_radius;

    let bbox = BoundingBox {
        lat_min: (lat - d_lat).to_degrees(),
        lon_min: (lon - d_lon).to_degrees(),
        lat_max: (lat + d_lat).to_degrees(),
        lon_max: (lon + d_lon).to_degrees(),
    };

    // The approximation breaks down once the box reaches over a pole
    if bbox.lat_min < -90.0 || bbox.lat_max > 90.0 {
        return Err(PreprocessError::InvalidInput(format!(
            "area of {distance_m} m around {}, {} extends past a pole",
            center.lat, center.lon
        )));
    }

    Ok(bbox)
}

/// Accepts an externally supplied box, rejecting inverted or degenerate ones.
pub fn checked(bbox: BoundingBox) -> Result<BoundingBox> {
    if bbox.is_valid() {
        Ok(bbox)
    } else {
        Err(PreprocessError::InvalidInput(format!(
            "bounding box must satisfy lat_min < lat_max and lon_min < lon_max: {bbox:?}"
        )))
    }
}
