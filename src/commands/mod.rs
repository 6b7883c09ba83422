pub mod ask;
pub mod chat;
pub mod doctor;
pub mod ingest;

use anyhow::Result;
use std::path::PathBuf;

use catedra::Config;

/// Load config from an explicit path or the default location
fn load_config(path: &Option<PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}
