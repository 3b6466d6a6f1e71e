use clap::Parser;
use std::path::PathBuf;

use crate::data::{Source, DEFAULT_URL};

/// Interactive world map: click countries to highlight them
#[derive(Parser, Debug, Clone)]
#[command(name = "world-map", version, about)]
pub struct Config {
    /// GeoJSON FeatureCollection of country boundaries
    #[arg(long, default_value = DEFAULT_URL)]
    pub url: String,

    /// Read the FeatureCollection from a local file instead of the network
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Diagnostics log (the terminal is taken by the map)
    #[arg(long, value_name = "PATH", default_value = "world-map.log")]
    pub log_file: PathBuf,
}

impl Config {
    pub fn source(&self) -> Source {
        match &self.file {
            Some(path) => Source::File(path.clone()),
            None => Source::Remote(self.url.clone()),
        }
    }
}
