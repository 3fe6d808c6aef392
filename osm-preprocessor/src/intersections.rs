use common::{Node, NodeKey, Street};
use std::collections::{HashMap, HashSet};
use tracing::info;

/// How a street is referred to when it is the other side of an intersection.
#[derive(Clone, Debug, PartialEq)]
pub enum StreetLabel {
    Name(String),
    Type(String),
}

/// All nodes one street shares with any other street.
#[derive(Clone, Debug, PartialEq)]
pub struct IntersectionRecord {
    pub street_id: i64,
    pub label: Option<StreetLabel>,
    pub nodes: Vec<Node>,
}

impl IntersectionRecord {
    /// Name, else highway type, else the bare street id.
    pub fn label_or_id(&self) -> String {
        match &self.label {
            Some(StreetLabel::Name(name)) => name.clone(),
            Some(StreetLabel::Type(street_type)) => street_type.clone(),
            None => self.street_id.to_string(),
        }
    }
}

fn label_of(street: &Street) -> Option<StreetLabel> {
    street
        .street_name
        .clone()
        .map(StreetLabel::Name)
        .or_else(|| street.street_type.clone().map(StreetLabel::Type))
}

struct RecordBuilder {
    record: IntersectionRecord,
    seen: HashSet<NodeKey>,
}

impl RecordBuilder {
    fn extend(&mut self, shared: &[Node]) {
        for node in shared {
            if self.seen.insert(node.key()) {
                self.record.nodes.push(node.clone());
            }
        }
    }
}

/// Compares every pair of streets and returns one record per street that shares at least one
/// node with another street, in the order streets first take part in an intersection.
///
/// Nodes match on id and both coordinates. Each record's node list is free of duplicates and
/// keeps the order in which shared nodes were first found.
pub fn detect_intersections(streets: &[Street]) -> Vec<IntersectionRecord> {
    let keys: Vec<HashSet<NodeKey>> = streets
        .iter()
        .map(|street| street.nodes.iter().map(Node::key).collect())
        .collect();

    let mut builders: Vec<RecordBuilder> = Vec::new();
    let mut by_street: HashMap<i64, usize> = HashMap::new();

    let mut merge = |street: &Street, shared: &[Node]| {
        let idx = *by_street.entry(street.street_id).or_insert_with(|| {
            builders.push(RecordBuilder {
                record: IntersectionRecord {
                    street_id: street.street_id,
                    label: label_of(street),
                    nodes: Vec::new(),
                },
                seen: HashSet::new(),
            });
            builders.len() - 1
        });
        builders[idx].extend(shared);
    };

    for i in 0..streets.len() {
        for j in (i + 1)..streets.len() {
            let shared: Vec<Node> = streets[i]
                .nodes
                .iter()
                .filter(|node| keys[j].contains(&node.key()))
                .cloned()
                .collect();

            if shared.is_empty() {
                continue;
            }

            merge(&streets[i], &shared);
            merge(&streets[j], &shared);
        }
    }

    let records: Vec<IntersectionRecord> = builders.into_iter().map(|b| b.record).collect();
    info!("{} streets take part in an intersection", records.len());
    records
}
