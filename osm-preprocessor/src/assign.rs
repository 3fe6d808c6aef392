use crate::distance::haversine_m;
use common::{Coordinate, Node, Poi, Street};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Node closest to `target` across all streets. Ties keep the node seen first.
pub fn nearest_node(streets: &[Street], target: Coordinate) -> Option<(&Node, f64)> {
    let mut nearest: Option<(&Node, f64)> = None;
    for node in streets.iter().flat_map(|street| street.nodes.iter()) {
        let distance = haversine_m(node.coordinate(), target);
        match nearest {
            Some((_, best)) if distance >= best => {}
            _ => nearest = Some((node, distance)),
        }
    }
    nearest
}

/// Returns a copy of `streets` where each POI id is attached to the `POIs_ID` list of one node.
///
/// Intersection POIs carry the id of the node they were made from and go back to it. Every
/// other POI goes to the nearest node. A node id names one point no matter how many streets
/// pass through it, so each occurrence of the chosen node gets the id.
pub fn assign_pois(streets: &[Street], pois: &[Poi]) -> Vec<Street> {
    let node_ids: HashSet<i64> = streets
        .iter()
        .flat_map(|street| street.nodes.iter().map(|node| node.id))
        .collect();

    let mut assignments: HashMap<i64, Vec<i64>> = HashMap::new();
    let mut assigned = 0;
    for poi in pois {
        let target = if poi.is_intersection() {
            node_ids.get(&poi.id).copied()
        } else {
            nearest_node(streets, poi.coordinate()).map(|(node, _)| node.id)
        };

        let Some(node_id) = target else {
            debug!("No node to hold POI {}", poi.id);
            continue;
        };

        let ids = assignments.entry(node_id).or_default();
        if !ids.contains(&poi.id) {
            ids.push(poi.id);
            assigned += 1;
        }
    }

    info!(
        "Assigned {} POIs to {} nodes",
        assigned,
        assignments.len()
    );

    streets
        .iter()
        .map(|street| {
            let mut street = street.clone();
            for node in street.nodes.iter_mut() {
                if let Some(ids) = assignments.get(&node.id) {
                    for id in ids {
                        node.attach_poi(*id);
                    }
                }
            }
            street
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::INTERSECTION_CAT;
    use std::collections::BTreeMap;

    fn poi(id: i64, lat: f64, lon: f64, cat: &str) -> Poi {
        Poi {
            id,
            lat,
            lon,
            name: None,
            cat: cat.to_string(),
            tags: BTreeMap::new(),
        }
    }

    fn streets() -> Vec<Street> {
        vec![
            Street::new(1, vec![Node::new(1, 0.0, 0.0), Node::new(2, 0.0, 0.001)]),
            Street::new(2, vec![Node::new(2, 0.0, 0.001), Node::new(3, 0.0, 0.002)]),
        ]
    }

    #[test]
    fn poi_on_a_node_goes_to_that_node() {
        let streets = streets();
        let (node, distance) = nearest_node(&streets, Coordinate::new(0.0, 0.002)).unwrap();
        assert_eq!(node.id, 3);
        assert_eq!(distance, 0.0);

        let assigned = assign_pois(&streets, &[poi(100, 0.0, 0.002, "cafe")]);
        assert_eq!(assigned[1].nodes[1].pois_id, Some(vec![100]));
        assert_eq!(assigned[0].nodes[0].pois_id, None);
        assert_eq!(assigned[0].nodes[1].pois_id, None);
    }

    #[test]
    fn tie_goes_to_first_node_seen() {
        let streets = streets();
        // Halfway between node 1 and node 2
        let (node, _) = nearest_node(&streets, Coordinate::new(0.0, 0.0005)).unwrap();
        assert_eq!(node.id, 1);
    }

    #[test]
    fn shared_node_carries_ids_in_every_street() {
        let assigned = assign_pois(
            &streets(),
            &[
                poi(100, 0.0001, 0.001, "bench"),
                poi(101, -0.0001, 0.001, "waste_basket"),
                poi(100, 0.0001, 0.001, "bench"),
            ],
        );

        assert_eq!(assigned[0].nodes[1].pois_id, Some(vec![100, 101]));
        assert_eq!(assigned[1].nodes[0].pois_id, Some(vec![100, 101]));
    }

    #[test]
    fn intersection_poi_assigned_by_id() {
        let assigned = assign_pois(
            &streets(),
            &[
                poi(2, 0.0, 0.001, INTERSECTION_CAT),
                // Far away, but the id decides for intersections
                poi(3, 10.0, 10.0, INTERSECTION_CAT),
                poi(42, 0.0, 0.0, INTERSECTION_CAT),
            ],
        );

        assert_eq!(assigned[0].nodes[1].pois_id, Some(vec![2]));
        assert_eq!(assigned[1].nodes[1].pois_id, Some(vec![3]));
        assert_eq!(assigned[0].nodes[0].pois_id, None);
    }

    #[test]
    fn no_nodes_leaves_pois_unassigned() {
        assert!(assign_pois(&[], &[poi(1, 0.0, 0.0, "cafe")]).is_empty());
        assert!(nearest_node(&[], Coordinate::new(0.0, 0.0)).is_none());
    }
}
