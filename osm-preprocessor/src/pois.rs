use common::{Poi, Street, INTERSECTION_CAT};
use std::collections::{BTreeMap, HashSet};

/// Intersection nodes of `streets` (one per node id, first occurrence) followed by every
/// amenity as given.
pub fn aggregate_pois(streets: &[Street], amenities: &[Poi]) -> Vec<Poi> {
    let mut seen = HashSet::new();
    let mut pois: Vec<Poi> = streets
        .iter()
        .flat_map(|street| street.nodes.iter())
        .filter(|node| node.is_intersection() && seen.insert(node.id))
        .map(|node| Poi {
            id: node.id,
            lat: node.lat,
            lon: node.lon,
            name: node.name.clone(),
            cat: INTERSECTION_CAT.to_string(),
            tags: BTreeMap::new(),
        })
        .collect();

    pois.extend(amenities.iter().cloned());
    pois
}
