use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const INTERSECTION_CAT: &str = "intersection";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Coordinate {
        Coordinate { lat, lon }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lon_min: f64,
    pub lat_max: f64,
    pub lon_max: f64,
}

impl BoundingBox {
    /// Both bounds are inclusive.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.lat_min && lat <= self.lat_max && lon >= self.lon_min && lon <= self.lon_max
    }

    pub fn is_valid(&self) -> bool {
        self.lat_min < self.lat_max && self.lon_min < self.lon_max
    }

    /// Overpass QL bbox filter order: south, west, north, east
    pub fn to_overpass_filter(&self) -> String {
        format!(
            "{},{},{},{}",
            self.lat_min, self.lon_min, self.lat_max, self.lon_max
        )
    }
}

/// Identity used when comparing nodes across streets. Two nodes only count as the same point
/// when id and both coordinates agree bit for bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeKey {
    id: i64,
    lat_bits: u64,
    lon_bits: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Node {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        rename = "POIs_ID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub pois_id: Option<Vec<i64>>,
}

impl Node {
    pub fn new(id: i64, lat: f64, lon: f64) -> Node {
        Node {
            id,
            lat,
            lon,
            cat: None,
            name: None,
            pois_id: None,
        }
    }

    pub fn key(&self) -> NodeKey {
        // Adding 0.0 folds -0.0 into 0.0 so both compare equal like they do as floats
        NodeKey {
            id: self.id,
            lat_bits: (self.lat + 0.0).to_bits(),
            lon_bits: (self.lon + 0.0).to_bits(),
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }

    pub fn is_intersection(&self) -> bool {
        self.cat.as_deref() == Some(INTERSECTION_CAT)
    }

    /// Appends a POI id unless the node already references it. Returns whether the id was added.
    pub fn attach_poi(&mut self, poi_id: i64) -> bool {
        let ids = self.pois_id.get_or_insert_with(Vec::new);
        if ids.contains(&poi_id) {
            return false;
        }
        ids.push(poi_id);
        true
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Street {
    pub street_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_type: Option<String>,
    #[serde(
        rename = "addr:street",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub addr_street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oneway: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sidewalk: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxspeed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lanes: Option<u32>,
    pub nodes: Vec<Node>,
}

impl Street {
    pub fn new(street_id: i64, nodes: Vec<Node>) -> Street {
        Street {
            street_id,
            street_name: None,
            street_type: None,
            addr_street: None,
            surface: None,
            oneway: None,
            sidewalk: None,
            maxspeed: None,
            lanes: None,
            nodes,
        }
    }

    /// Human readable reference to the street: its name, else its highway type, else its id.
    pub fn display_label(&self) -> String {
        self.street_name
            .clone()
            .or_else(|| self.street_type.clone())
            .unwrap_or_else(|| self.street_id.to_string())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Poi {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub cat: String,
    #[serde(flatten)]
    pub tags: BTreeMap<String, String>,
}

impl Poi {
    pub fn is_intersection(&self) -> bool {
        self.cat == INTERSECTION_CAT
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Dataset {
    pub bounds: BoundingBox,
    pub points_of_interest: Vec<Poi>,
    pub streets: Vec<Street>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_are_not_serialized() {
        let street = Street::new(7, vec![Node::new(1, 45.0, -73.0)]);
        let value = serde_json::to_value(&street).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), 2);
        assert!(object.contains_key("street_id"));
        assert!(object.contains_key("nodes"));

        let node = object["nodes"][0].as_object().unwrap();
        assert_eq!(node.len(), 3);
    }

    #[test]
    fn false_and_zero_are_values() {
        let mut street = Street::new(7, vec![]);
        street.oneway = Some(false);
        street.lanes = Some(0);
        street.addr_street = Some("Main".to_string());

        let value = serde_json::to_value(&street).unwrap();
        assert_eq!(value["oneway"], serde_json::json!(false));
        assert_eq!(value["lanes"], serde_json::json!(0));
        assert_eq!(value["addr:street"], serde_json::json!("Main"));
    }

    #[test]
    fn node_key_requires_matching_coordinates() {
        let a = Node::new(1, 10.0, 20.0);
        let mut b = a.clone();
        b.name = Some("named".to_string());
        assert_eq!(a.key(), b.key());

        let c = Node::new(1, 10.0, 20.000001);
        assert_ne!(a.key(), c.key());

        let zero = Node::new(2, 0.0, 0.0);
        let negative_zero = Node::new(2, -0.0, 0.0);
        assert_eq!(zero.key(), negative_zero.key());
    }

    #[test]
    fn attach_poi_guards_duplicates() {
        let mut node = Node::new(1, 0.0, 0.0);
        assert!(node.attach_poi(5));
        assert!(!node.attach_poi(5));
        assert!(node.attach_poi(6));
        assert_eq!(node.pois_id, Some(vec![5, 6]));

        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["POIs_ID"], serde_json::json!([5, 6]));
    }

    #[test]
    fn poi_tags_flatten_into_object() {
        let mut tags = BTreeMap::new();
        tags.insert("opening_hours".to_string(), "24/7".to_string());
        let poi = Poi {
            id: 3,
            lat: 1.0,
            lon: 2.0,
            name: None,
            cat: "cafe".to_string(),
            tags,
        };

        let value = serde_json::to_value(&poi).unwrap();
        assert_eq!(value["opening_hours"], serde_json::json!("24/7"));
        assert!(value.get("name").is_none());
        assert!(value.get("tags").is_none());
    }

    #[test]
    fn display_label_precedence() {
        let mut street = Street::new(42, vec![]);
        assert_eq!(street.display_label(), "42");
        street.street_type = Some("residential".to_string());
        assert_eq!(street.display_label(), "residential");
        street.street_name = Some("Rue Sherbrooke".to_string());
        assert_eq!(street.display_label(), "Rue Sherbrooke");
    }

    #[test]
    fn bounding_box_is_inclusive() {
        let bbox = BoundingBox {
            lat_min: 1.0,
            lon_min: 2.0,
            lat_max: 3.0,
            lon_max: 4.0,
        };
        assert!(bbox.contains(1.0, 2.0));
        assert!(bbox.contains(3.0, 4.0));
        assert!(!bbox.contains(3.0000001, 4.0));
        assert_eq!(bbox.to_overpass_filter(), "1,2,3,4");
    }
}
