//! Turns raw Overpass results for a bounding box into an annotated street and point of interest
//! dataset.
//!
//! The stages can be used on their own, every stage takes its input by reference and returns a
//! new value. [`pipeline::preprocess`] wires them together behind a [`pipeline::MapSource`].

pub mod amenities;
pub mod annotate;
pub mod assign;
pub mod bbox;
pub mod distance;
pub mod error;
pub mod intersections;
pub mod overpass;
pub mod pipeline;
pub mod pois;
pub mod rank;
pub mod streets;

pub use error::{PreprocessError, Result};
pub use pipeline::{preprocess, transform, MapSource, Outcome};
