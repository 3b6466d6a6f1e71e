//! Map data loading: fetch a country FeatureCollection once, off the UI thread.

use geojson::feature::Id;
use geojson::{JsonObject, Value};
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use thiserror::Error;
use tracing::{error, info};

/// Country boundaries from the datasets/geo-countries project
pub const DEFAULT_URL: &str =
    "https://raw.githubusercontent.com/datasets/geo-countries/master/data/countries.geojson";

/// Properties tried, in order, for a country code
const CODE_KEYS: [&str; 3] = ["ISO_A3", "ISO3166-1-Alpha-3", "iso_a3"];

/// Properties tried, in order, for a display name
const NAME_KEYS: [&str; 3] = ["name", "ADMIN", "NAME"];

/// One country
#[derive(Clone, Debug)]
pub struct Feature {
    /// Stable key for highlight/hover state. Not guaranteed unique.
    pub id: String,
    pub name: String,
    pub geometry: Option<Value>,
}

impl Feature {
    pub fn from_geojson(feature: geojson::Feature) -> Self {
        let props = feature.properties.as_ref();
        let name = props
            .and_then(|p| first_str(p, &NAME_KEYS))
            .unwrap_or("Unknown")
            .to_string();

        let id = match feature.id {
            Some(Id::String(s)) if !s.is_empty() => s,
            Some(Id::Number(n)) => n.to_string(),
            _ => props
                .and_then(|p| first_str(p, &CODE_KEYS))
                .filter(|code| *code != "-99")
                .map(str::to_string)
                .unwrap_or_else(|| name.clone()),
        };

        Self {
            id,
            name,
            geometry: feature.geometry.map(|g| g.value),
        }
    }
}

fn first_str<'a>(props: &'a JsonObject, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| {
        props
            .get(*key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    })
}

/// Ordered, immutable set of countries
#[derive(Clone, Debug, Default)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl From<geojson::FeatureCollection> for FeatureCollection {
    fn from(fc: geojson::FeatureCollection) -> Self {
        Self {
            features: fc.features.into_iter().map(Feature::from_geojson).collect(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("not a GeoJSON FeatureCollection: {0}")]
    Parse(#[from] simd_json::Error),
    #[error("loader thread exited without a result")]
    Disconnected,
}

/// Parse a GeoJSON FeatureCollection document
pub fn parse_feature_collection(mut body: Vec<u8>) -> Result<FeatureCollection, LoadError> {
    let fc: geojson::FeatureCollection = simd_json::serde::from_slice(&mut body)?;
    Ok(fc.into())
}

/// Where map data comes from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    Remote(String),
    File(PathBuf),
}

impl Source {
    fn fetch(&self) -> Result<FeatureCollection, LoadError> {
        let body = match self {
            Source::Remote(url) => reqwest::blocking::get(url)?
                .error_for_status()?
                .bytes()?
                .to_vec(),
            Source::File(path) => fs::read(path)?,
        };
        parse_feature_collection(body)
    }
}

/// Observable loader state
#[derive(Clone, Debug)]
pub enum LoadState {
    Loading,
    Loaded(Arc<FeatureCollection>),
    Failed,
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }
}

/// One-shot background fetch. Failure is terminal for this loader;
/// recovering means building a new one.
pub struct Loader {
    rx: Option<Receiver<Result<FeatureCollection, LoadError>>>,
    state: LoadState,
}

impl Loader {
    /// Start fetching on a dedicated thread
    pub fn spawn(source: Source) -> Self {
        let (tx, rx) = mpsc::channel();
        let spawned = thread::Builder::new()
            .name("map-loader".into())
            .spawn(move || {
                info!(?source, "fetching map data");
                // Receiver gone means the app was torn down; nothing to report to.
                let _ = tx.send(source.fetch());
            });

        match spawned {
            Ok(_) => Self::from_receiver(rx),
            Err(e) => {
                error!(error = %e, "failed to spawn loader thread");
                Self {
                    rx: None,
                    state: LoadState::Failed,
                }
            }
        }
    }

    /// Wrap an existing result channel
    pub fn from_receiver(rx: Receiver<Result<FeatureCollection, LoadError>>) -> Self {
        Self {
            rx: Some(rx),
            state: LoadState::Loading,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Check for a finished fetch without blocking. Returns true when the
    /// state changed.
    pub fn poll(&mut self) -> bool {
        let Some(rx) = &self.rx else {
            return false;
        };

        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => Err(LoadError::Disconnected),
        };
        self.settle(result);
        true
    }

    /// Block until the fetch settles
    #[cfg(test)]
    pub fn wait(&mut self) -> &LoadState {
        if let Some(rx) = &self.rx {
            let result = rx.recv().unwrap_or(Err(LoadError::Disconnected));
            self.settle(result);
        }
        &self.state
    }

    fn settle(&mut self, result: Result<FeatureCollection, LoadError>) {
        self.rx = None;
        self.state = match result {
            Ok(collection) => {
                info!(features = collection.len(), "map data loaded");
                LoadState::Loaded(Arc::new(collection))
            }
            Err(e) => {
                error!(error = %e, "error loading map data");
                LoadState::Failed
            }
        };
    }
}
