use crate::error::{PreprocessError, Result};
use crate::overpass::{tag, OverpassResponse, RawNode, RawWay};
use common::{BoundingBox, Node, Street};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Builds one [`Street`] per way, keeping only the way's nodes that fall inside `bbox`.
///
/// Ways left without any node are dropped. A way that references a node the payload does not
/// contain means the payload is not the `(._;>;)` shape we asked for, which is reported as
/// [`PreprocessError::MalformedPayload`] rather than silently producing fewer streets.
pub fn extract_streets(response: &OverpassResponse, bbox: &BoundingBox) -> Result<Vec<Street>> {
    let nodes: HashMap<i64, &RawNode> = response.nodes().map(|node| (node.id, node)).collect();

    let mut streets = Vec::new();
    let mut dropped = 0;
    for way in response.ways() {
        let mut node_list = Vec::new();
        let mut seen = HashSet::new();

        for node_id in &way.nodes {
            let node = nodes.get(node_id).ok_or_else(|| {
                PreprocessError::MalformedPayload(format!(
                    "way {} references node {} which is not in the payload",
                    way.id, node_id
                ))
            })?;

            if !bbox.contains(node.lat, node.lon) {
                continue;
            }

            // Closed ways repeat their first node, keep it once
            let node = Node::new(node.id, node.lat, node.lon);
            if seen.insert(node.key()) {
                node_list.push(node);
            }
        }

        if node_list.is_empty() {
            dropped += 1;
            continue;
        }

        streets.push(street_from_way(way, node_list));
    }

    info!(
        "Extracted {} streets, {} ways had no node inside the bounding box",
        streets.len(),
        dropped
    );
    Ok(streets)
}

fn street_from_way(way: &RawWay, nodes: Vec<Node>) -> Street {
    let owned = |key: &str| tag(&way.tags, key).map(str::to_string);

    Street {
        street_id: way.id,
        street_name: owned("name"),
        street_type: owned("highway"),
        addr_street: owned("addr:street"),
        surface: owned("surface"),
        oneway: tag(&way.tags, "oneway").and_then(|value| parse_oneway(way.id, value)),
        sidewalk: owned("sidewalk"),
        maxspeed: owned("maxspeed"),
        lanes: tag(&way.tags, "lanes").and_then(|value| parse_lanes(way.id, value)),
        nodes,
    }
}

fn parse_lanes(way_id: i64, value: &str) -> Option<u32> {
    match value.trim().parse() {
        Ok(lanes) => Some(lanes),
        Err(_) => {
            debug!("Ignoring non numeric lanes={value:?} on way {way_id}");
            None
        }
    }
}

/// `-1` means one way against the drawing direction and the time dependent values still
/// restrict travel to one direction at a time, so all of those count as one way.
fn parse_oneway(way_id: i64, value: &str) -> Option<bool> {
    match value.trim() {
        "yes" | "true" | "1" | "-1" | "reversible" | "alternating" => Some(true),
        "no" | "false" | "0" => Some(false),
        other => {
            debug!("Ignoring unknown oneway={other:?} on way {way_id}");
            None
        }
    }
}
