mod config;

use anyhow::{Context, Result};
use clap::Parser;
use common::{BoundingBox, Coordinate, Dataset};
use config::Config;
use osm_preprocessor::{
    bbox,
    overpass::{HttpTransport, OverpassFetcher},
    preprocess, Outcome,
};
use serde::Serialize;
use std::{fs::OpenOptions, io::BufWriter, path::PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, allow_negative_numbers = true)]
    lat: f64,
    #[arg(long, allow_negative_numbers = true)]
    lon: f64,
    /// Distance in metres from the center to the edges of the area
    #[arg(short, long)]
    distance: f64,
    /// JSON file with the endpoints and timeouts
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long)]
    www_path: PathBuf,
    #[arg(long)]
    pretty: bool,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "lowercase")]
enum Status {
    Ok,
    /// Streets without amenities
    Partial,
    Unavailable,
}

#[derive(Serialize)]
struct Response<'a> {
    timestamp: i64,
    status: Status,
    bounds: BoundingBox,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a Dataset>,
}

impl<'a> Response<'a> {
    fn new(bounds: BoundingBox, outcome: &'a Outcome) -> Response<'a> {
        let status = match outcome {
            Outcome::Ready(_) => Status::Ok,
            Outcome::Partial { .. } => Status::Partial,
            Outcome::Unavailable(_) => Status::Unavailable,
        };
        Response {
            timestamp: chrono::Utc::now().timestamp(),
            status,
            bounds,
            data: outcome.dataset(),
        }
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;

    let bounds = bbox::bounding_box(Coordinate::new(args.lat, args.lon), args.distance)
        .context("Failed to compute bounding box")?;
    info!("Preprocessing {:?}", bounds);

    let transport = HttpTransport::new(config.request_timeout(), config.max_body_bytes);
    let fetcher = OverpassFetcher::new(config.endpoints, transport, config.server_timeout_secs);

    let outcome = preprocess(&fetcher, bounds).context("Failed to preprocess map data")?;
    match &outcome {
        Outcome::Ready(_) => {}
        Outcome::Partial {
            amenity_failures, ..
        } => warn!(
            "Writing streets without amenities, {} endpoint attempts failed",
            amenity_failures.len()
        ),
        Outcome::Unavailable(failures) => error!(
            "No street data for the area, {} endpoint attempts failed",
            failures.len()
        ),
    }

    let f = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(args.www_path.join("data.json"))
        .context("Failed to open output file")?;
    let writer = BufWriter::new(f);

    let response = Response::new(bounds, &outcome);
    if args.pretty {
        serde_json::to_writer_pretty(writer, &response)
    } else {
        serde_json::to_writer(writer, &response)
    }
    .context("Failed to write output")?;

    Ok(())
}

fn main() -> Result<()> {
    init_logging();
    run(Args::parse())
}
