mod client;
mod fetcher;

use common::BoundingBox;
use serde::Deserialize;
use std::{collections::BTreeMap, fmt};

pub use client::*;
pub use fetcher::*;

/// The two query shapes sent to Overpass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryKind {
    /// Ways tagged `highway` together with every node they reference.
    Streets,
    /// Nodes, ways and relations tagged `amenity`, ways and relations reduced to their center.
    Amenities,
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKind::Streets => write!(f, "streets"),
            QueryKind::Amenities => write!(f, "amenities"),
        }
    }
}

pub fn build_query(kind: QueryKind, bbox: &BoundingBox, server_timeout_secs: u32) -> String {
    let bounds = bbox.to_overpass_filter();
    let settings = format!("[out:json][timeout:{server_timeout_secs}];");

    match kind {
        QueryKind::Streets => format!(
            r#"{settings}
way({bounds})[highway];
(._;>;);
out body;"#
        ),
        QueryKind::Amenities => format!(
            r#"{settings}
(
node({bounds})["amenity"];
way({bounds})["amenity"];
rel({bounds})["amenity"];
);
out center;"#
        ),
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct OverpassResponse {
    pub elements: Vec<Element>,
    #[serde(default)]
    pub remark: Option<String>,
}

impl OverpassResponse {
    pub fn empty() -> OverpassResponse {
        OverpassResponse {
            elements: Vec::new(),
            remark: None,
        }
    }

    /// Overpass reports timeouts and memory exhaustion in a remark while still answering 200,
    /// the elements that came with it are partial.
    pub fn runtime_error(&self) -> Option<&str> {
        self.remark
            .as_deref()
            .filter(|remark| remark.contains("runtime error"))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &RawNode> {
        self.elements.iter().filter_map(|elem| match elem {
            Element::Node(node) => Some(node),
            _ => None,
        })
    }

    pub fn ways(&self) -> impl Iterator<Item = &RawWay> {
        self.elements.iter().filter_map(|elem| match elem {
            Element::Way(way) => Some(way),
            _ => None,
        })
    }

    pub fn relations(&self) -> impl Iterator<Item = &RawRelation> {
        self.elements.iter().filter_map(|elem| match elem {
            Element::Relation(relation) => Some(relation),
            _ => None,
        })
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Node(RawNode),
    Way(RawWay),
    Relation(RawRelation),
}

pub type Tags = BTreeMap<String, String>;

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RawNode {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub tags: Tags,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Center {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RawWay {
    pub id: i64,
    #[serde(default)]
    pub nodes: Vec<i64>,
    #[serde(default)]
    pub center: Option<Center>,
    #[serde(default)]
    pub tags: Tags,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RawRelation {
    pub id: i64,
    #[serde(default)]
    pub center: Option<Center>,
    #[serde(default)]
    pub tags: Tags,
}

/// Tag value with empty strings treated as missing.
pub fn tag<'a>(tags: &'a Tags, key: &str) -> Option<&'a str> {
    tags.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bbox() -> BoundingBox {
        BoundingBox {
            lat_min: 45.5,
            lon_min: -73.6,
            lat_max: 45.51,
            lon_max: -73.59,
        }
    }

    #[test]
    fn streets_query_shape() {
        let query = build_query(QueryKind::Streets, &bbox(), 25);
        assert!(query.starts_with("[out:json][timeout:25];"));
        assert!(query.contains("way(45.5,-73.6,45.51,-73.59)[highway];"));
        assert!(query.contains("(._;>;);"));
        assert!(query.ends_with("out body;"));
    }

    #[test]
    fn amenities_query_shape() {
        let query = build_query(QueryKind::Amenities, &bbox(), 25);
        assert!(query.contains(r#"node(45.5,-73.6,45.51,-73.59)["amenity"];"#));
        assert!(query.contains(r#"way(45.5,-73.6,45.51,-73.59)["amenity"];"#));
        assert!(query.contains(r#"rel(45.5,-73.6,45.51,-73.59)["amenity"];"#));
        assert!(query.ends_with("out center;"));
    }

    #[test]
    fn parses_mixed_elements() {
        let response: OverpassResponse = serde_json::from_value(json!({
            "version": 0.6,
            "generator": "Overpass API",
            "elements": [
                {"type": "node", "id": 1, "lat": 45.5, "lon": -73.6},
                {"type": "way", "id": 10, "nodes": [1, 2], "tags": {"highway": "residential"}},
                {"type": "relation", "id": 20, "center": {"lat": 45.505, "lon": -73.595},
                 "members": [], "tags": {"amenity": "school"}}
            ]
        }))
        .unwrap();

        assert_eq!(response.nodes().count(), 1);
        assert_eq!(response.ways().next().unwrap().nodes, vec![1, 2]);
        assert_eq!(
            response.relations().next().unwrap().center,
            Some(Center {
                lat: 45.505,
                lon: -73.595
            })
        );
        assert!(response.runtime_error().is_none());
    }

    #[test]
    fn missing_elements_is_malformed() {
        let parsed = serde_json::from_value::<OverpassResponse>(json!({"remark": "nothing"}));
        assert!(parsed.is_err());
    }

    #[test]
    fn detects_runtime_error_remark() {
        let response: OverpassResponse = serde_json::from_value(json!({
            "elements": [],
            "remark": "runtime error: Query timed out in \"query\" at line 2 after 26 seconds."
        }))
        .unwrap();
        assert!(response.runtime_error().is_some());
    }

    #[test]
    fn empty_tag_is_missing() {
        let mut tags = Tags::new();
        tags.insert("name".to_string(), String::new());
        tags.insert("highway".to_string(), "footway".to_string());
        assert_eq!(tag(&tags, "name"), None);
        assert_eq!(tag(&tags, "highway"), Some("footway"));
        assert_eq!(tag(&tags, "surface"), None);
    }
}
