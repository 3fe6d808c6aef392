use crate::intersections::IntersectionRecord;
use common::{NodeKey, Street, INTERSECTION_CAT};
use std::collections::HashSet;

/// Returns a copy of `streets` where every node shared with another street is marked as an
/// intersection and named `"{this street} intersecting {other street}"`.
///
/// When a node is shared with several streets the last matching record names it. Both sides
/// are labelled by name, then highway type, then street id.
pub fn annotate_intersections(streets: &[Street], records: &[IntersectionRecord]) -> Vec<Street> {
    let record_keys: Vec<HashSet<NodeKey>> = records
        .iter()
        .map(|record| record.nodes.iter().map(|node| node.key()).collect())
        .collect();

    streets
        .iter()
        .map(|street| {
            let mut street = street.clone();
            let street_id = street.street_id;
            let this_label = street.display_label();

            for node in street.nodes.iter_mut() {
                let key = node.key();
                let other = records.iter().zip(&record_keys).rev().find(|(record, keys)| {
                    record.street_id != street_id && keys.contains(&key)
                });

                if let Some((record, _)) = other {
                    node.cat = Some(INTERSECTION_CAT.to_string());
                    node.name = Some(format!(
                        "{} intersecting {}",
                        this_label,
                        record.label_or_id()
                    ));
                }
            }

            street
        })
        .collect()
}
