use crate::{
    amenities::extract_amenities,
    annotate::annotate_intersections,
    assign::assign_pois,
    bbox,
    error::Result,
    intersections::detect_intersections,
    overpass::{
        EndpointFailure, FetchOutcome, OverpassFetcher, OverpassResponse, QueryKind, Transport,
    },
    pois::aggregate_pois,
    rank::rank_by_length,
    streets::extract_streets,
};
use common::{BoundingBox, Dataset};
use std::thread;
use tracing::{info, warn};

/// Where raw street and amenity data comes from.
pub trait MapSource: Sync {
    fn fetch(&self, kind: QueryKind, bbox: &BoundingBox) -> FetchOutcome;
}

impl<T: Transport> MapSource for OverpassFetcher<T> {
    fn fetch(&self, kind: QueryKind, bbox: &BoundingBox) -> FetchOutcome {
        OverpassFetcher::fetch(self, kind, bbox)
    }
}

#[derive(Debug)]
pub enum Outcome {
    Ready(Dataset),
    /// Streets were fetched but no endpoint could provide amenities, the dataset only holds
    /// intersections as points of interest.
    Partial {
        dataset: Dataset,
        amenity_failures: Vec<EndpointFailure>,
    },
    /// No endpoint could provide street data for the area.
    Unavailable(Vec<EndpointFailure>),
}

impl Outcome {
    pub fn dataset(&self) -> Option<&Dataset> {
        match self {
            Outcome::Ready(dataset) | Outcome::Partial { dataset, .. } => Some(dataset),
            Outcome::Unavailable(_) => None,
        }
    }
}

/// Fetches streets and amenities for `bounds` and turns them into a [`Dataset`].
///
/// Both fetches run at the same time, the transformation only starts once both are complete.
/// Missing amenity data gives a [`Outcome::Partial`] dataset, missing street data means there
/// is nothing to return.
pub fn preprocess<S: MapSource>(source: &S, bounds: BoundingBox) -> Result<Outcome> {
    let bounds = bbox::checked(bounds)?;

    let (streets, amenities) = thread::scope(|scope| {
        let amenities = scope.spawn(|| source.fetch(QueryKind::Amenities, &bounds));
        let streets = source.fetch(QueryKind::Streets, &bounds);
        let amenities = amenities
            .join()
            .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
        (streets, amenities)
    });

    let streets = match streets {
        FetchOutcome::Fetched(response) => response,
        FetchOutcome::Unavailable(failures) => return Ok(Outcome::Unavailable(failures)),
    };

    match amenities {
        FetchOutcome::Fetched(amenities) => {
            transform(bounds, &streets, &amenities).map(Outcome::Ready)
        }
        FetchOutcome::Unavailable(amenity_failures) => {
            warn!("No amenity data available, continuing with streets only");
            let dataset = transform(bounds, &streets, &OverpassResponse::empty())?;
            Ok(Outcome::Partial {
                dataset,
                amenity_failures,
            })
        }
    }
}

/// Pure part of [`preprocess`]: the same payloads always produce the same dataset.
pub fn transform(
    bounds: BoundingBox,
    streets: &OverpassResponse,
    amenities: &OverpassResponse,
) -> Result<Dataset> {
    let streets = extract_streets(streets, &bounds)?;
    let records = detect_intersections(&streets);
    let streets = annotate_intersections(&streets, &records);

    let amenities = extract_amenities(amenities, &bounds);
    let points_of_interest = aggregate_pois(&streets, &amenities);

    let streets = assign_pois(&streets, &points_of_interest);
    let streets = rank_by_length(streets);

    info!(
        "Prepared {} streets and {} points of interest",
        streets.len(),
        points_of_interest.len()
    );

    Ok(Dataset {
        bounds,
        points_of_interest,
        streets,
    })
}
