//! CLI command implementations.

pub mod params;
pub mod render;

use std::path::Path;

use anyhow::Context;
use grainshift_engine::EngineConfig;

/// Config from `path`, or the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading engine config {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}
