use common::Coordinate;
use geo::{Distance, Haversine, Point};

/// Great circle distance in metres on a sphere of the GRS80 mean radius (6371.0088 km).
pub fn haversine_m(a: Coordinate, b: Coordinate) -> f64 {
    Haversine.distance(Point::new(a.lon, a.lat), Point::new(b.lon, b.lat))
}
