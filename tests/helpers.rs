// Shared test helpers for fixtures and a scripted geocoder.
//
// This module provides common utilities used across multiple test files to reduce duplication.

#![allow(dead_code)] // Each test crate uses a different subset

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use electorate_geocoder::geocode::{GeocodeCandidate, Geocoder};
use electorate_geocoder::GeocodeError;

/// A square "Sydney" division around (151.2, -33.8) and a square "Canberra"
/// division around (149.1, -35.3).
pub const BOUNDARIES_GEOJSON: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {
            "type": "Feature",
            "properties": { "Elect_div": "SYDNEY" },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[151.0, -34.0], [151.4, -34.0], [151.4, -33.6], [151.0, -33.6], [151.0, -34.0]]]
            }
        },
        {
            "type": "Feature",
            "properties": { "Sortname": "CANBERRA" },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[149.0, -35.5], [149.3, -35.5], [149.3, -35.2], [149.0, -35.2], [149.0, -35.5]]]
            }
        }
    ]
}"#;

/// Writes `contents` to `dir/name` and returns the path.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("Failed to write test file");
    path
}

/// Input CSV with `n` venues named `Club 1..=n` in NSW.
pub fn numbered_clubs_csv(n: usize) -> String {
    let mut csv = String::from("rnd,club,state,amount\n");
    for i in 1..=n {
        csv.push_str(&format!("1,Club {i},NSW,{}\n", i * 1000));
    }
    csv
}

pub fn query_for(venue: &str, state: &str) -> String {
    format!("{venue}, {state}, Australia")
}

pub fn candidate(name: &str, latitude: f64, longitude: f64) -> GeocodeCandidate {
    GeocodeCandidate {
        formatted_address: format!("{name}, Test Street, Australia"),
        latitude,
        longitude,
        name: name.to_string(),
        category_tags: vec!["point_of_interest".into(), "establishment".into()],
    }
}

/// A location inside the Sydney test division.
pub fn sydney_candidate(name: &str) -> GeocodeCandidate {
    candidate(name, -33.8, 151.2)
}

/// Reads a CSV file into header + rows.
pub fn read_csv(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).expect("Failed to open CSV");
    let headers = reader
        .headers()
        .expect("Failed to read headers")
        .iter()
        .map(String::from)
        .collect();
    let rows = reader
        .records()
        .map(|r| r.expect("Bad CSV row").iter().map(String::from).collect())
        .collect();
    (headers, rows)
}

/// Scripted response for one query.
#[derive(Clone)]
pub enum Reply {
    Found(GeocodeCandidate),
    NoCandidate,
    Denied,
    RateLimited,
    Malformed,
    /// Never answers, like a request stuck on the network
    Hang,
}

type CallHook = Box<dyn Fn(usize) + Send + Sync>;

/// Geocoder answering from a fixed table. Unknown queries get `NoCandidate`.
pub struct ScriptedGeocoder {
    replies: HashMap<String, Reply>,
    default_reply: Reply,
    calls: Mutex<Vec<String>>,
    hook: Option<CallHook>,
}

impl ScriptedGeocoder {
    pub fn new() -> Self {
        Self {
            replies: HashMap::new(),
            default_reply: Reply::NoCandidate,
            calls: Mutex::new(Vec::new()),
            hook: None,
        }
    }

    pub fn with(mut self, query: impl Into<String>, reply: Reply) -> Self {
        self.replies.insert(query.into(), reply);
        self
    }

    /// Resolves every unscripted query to a Sydney location named after it.
    pub fn resolving_everything() -> Self {
        Self {
            default_reply: Reply::Found(sydney_candidate("any")),
            ..Self::new()
        }
    }

    /// Runs `hook` with the 1-based call number at the start of every call.
    pub fn on_call(mut self, hook: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Geocoder for ScriptedGeocoder {
    async fn resolve(&self, query: &str) -> Result<GeocodeCandidate, GeocodeError> {
        let call_number = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(query.to_string());
            calls.len()
        };
        if let Some(hook) = &self.hook {
            hook(call_number);
        }

        let reply = self.replies.get(query).unwrap_or(&self.default_reply);
        match reply {
            Reply::Found(candidate) => Ok(candidate.clone()),
            Reply::NoCandidate => Err(GeocodeError::NoCandidate {
                query: query.to_string(),
            }),
            Reply::Denied => Err(GeocodeError::Denied {
                message: "The provided API key is invalid.".into(),
            }),
            Reply::RateLimited => Err(GeocodeError::RateLimitExceeded {
                query: query.to_string(),
                attempts: 6,
            }),
            Reply::Malformed => Err(GeocodeError::MalformedResponse {
                query: query.to_string(),
                status: "UNKNOWN_ERROR".into(),
            }),
            Reply::Hang => std::future::pending().await,
        }
    }
}
