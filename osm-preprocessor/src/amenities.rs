use crate::overpass::{tag, Center, OverpassResponse, Tags};
use common::{BoundingBox, Poi};
use std::collections::BTreeMap;
use tracing::{info, warn};

// Keys the POI record already uses, tags with these keys are never copied over
const RESERVED_KEYS: [&str; 5] = ["id", "lat", "lon", "name", "cat"];

/// Amenity nodes, ways and relations inside `bbox`, in that order. Ways and relations are
/// placed at the center Overpass computed for them.
pub fn extract_amenities(response: &OverpassResponse, bbox: &BoundingBox) -> Vec<Poi> {
    let nodes = response.nodes().map(|node| {
        let center = Center {
            lat: node.lat,
            lon: node.lon,
        };
        ("node", node.id, Some(center), &node.tags)
    });
    let ways = response
        .ways()
        .map(|way| ("way", way.id, way.center, &way.tags));
    let relations = response
        .relations()
        .map(|relation| ("relation", relation.id, relation.center, &relation.tags));

    let mut pois = Vec::new();
    for (kind, id, center, tags) in nodes.chain(ways).chain(relations) {
        if tag(tags, "amenity").is_none() {
            continue;
        }

        let Some(center) = center else {
            warn!("Skipping amenity {kind} {id} without a center");
            continue;
        };

        if !bbox.contains(center.lat, center.lon) {
            continue;
        }

        if let Some(poi) = amenity_poi(id, center, tags) {
            pois.push(poi);
        }
    }

    info!("Extracted {} amenities", pois.len());
    pois
}

fn amenity_poi(id: i64, center: Center, tags: &Tags) -> Option<Poi> {
    let cat = tag(tags, "amenity")?;
    let name = tag(tags, "name");

    let mut extra = BTreeMap::new();
    for (key, value) in tags {
        if value.is_empty() || value == cat || Some(value.as_str()) == name {
            continue;
        }
        if RESERVED_KEYS.contains(&key.as_str()) {
            continue;
        }
        extra.entry(key.clone()).or_insert_with(|| value.clone());
    }

    Some(Poi {
        id,
        lat: center.lat,
        lon: center.lon,
        name: name.map(str::to_string),
        cat: cat.to_string(),
        tags: extra,
    })
}
