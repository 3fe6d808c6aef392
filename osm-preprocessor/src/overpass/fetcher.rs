use super::{build_query, EndpointError, OverpassResponse, QueryKind, Transport};
use common::BoundingBox;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

pub const DEFAULT_ENDPOINTS: [&str; 3] = [
    "https://overpass-api.de/api/interpreter",
    "https://overpass.kumi.systems/api/interpreter",
    "https://overpass.private.coffee/api/interpreter",
];

const ENDPOINT_ROLES: [&str; 3] = ["primary", "secondary-1", "secondary-2"];

/// Primary endpoint followed by the two fallbacks, tried in this order.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(transparent)]
pub struct Endpoints([String; 3]);

impl Endpoints {
    pub fn new(primary: &str, secondary_1: &str, secondary_2: &str) -> Endpoints {
        Endpoints([
            primary.to_string(),
            secondary_1.to_string(),
            secondary_2.to_string(),
        ])
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        let [primary, secondary_1, secondary_2] = DEFAULT_ENDPOINTS;
        Endpoints::new(primary, secondary_1, secondary_2)
    }
}

#[derive(Debug)]
pub struct EndpointFailure {
    pub endpoint: String,
    pub error: EndpointError,
}

#[derive(Debug)]
pub enum FetchOutcome {
    Fetched(OverpassResponse),
    /// Every endpoint failed. Not an error for the caller, it means there is no data to work with.
    Unavailable(Vec<EndpointFailure>),
}

pub struct OverpassFetcher<T> {
    endpoints: Endpoints,
    transport: T,
    server_timeout_secs: u32,
}

impl<T: Transport> OverpassFetcher<T> {
    pub fn new(endpoints: Endpoints, transport: T, server_timeout_secs: u32) -> Self {
        OverpassFetcher {
            endpoints,
            transport,
            server_timeout_secs,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Tries each endpoint once, in order, and stops at the first usable answer.
    pub fn fetch(&self, kind: QueryKind, bbox: &BoundingBox) -> FetchOutcome {
        let query = build_query(kind, bbox, self.server_timeout_secs);
        let mut failures = Vec::new();

        for (role, endpoint) in ENDPOINT_ROLES.iter().zip(self.endpoints.iter()) {
            match self.attempt(endpoint, &query) {
                Ok(response) => {
                    info!(
                        "Fetched {} {kind} elements from {role} endpoint {endpoint}",
                        response.elements.len()
                    );
                    return FetchOutcome::Fetched(response);
                }
                Err(err) => {
                    error!("{role} endpoint {endpoint} failed for {kind} query: {err}");
                    failures.push(EndpointFailure {
                        endpoint: endpoint.to_string(),
                        error: err,
                    });
                }
            }
        }

        error!("Unable to get {kind} data, all endpoints failed");
        FetchOutcome::Unavailable(failures)
    }

    fn attempt(&self, endpoint: &str, query: &str) -> Result<OverpassResponse, EndpointError> {
        let body = self.transport.post_query(endpoint, query)?;
        let response: OverpassResponse = serde_json::from_str(&body)?;
        if let Some(remark) = response.runtime_error() {
            return Err(EndpointError::Runtime(remark.to_string()));
        }
        Ok(response)
    }
}
