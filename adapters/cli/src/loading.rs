//! Loads engine configuration and maps from disk or the bundled assets.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use crawler_core::{EngineConfig, GridMap};

const BUNDLED_MAPS: &str = include_str!("../assets/dungeon.json");

/// Reads the engine configuration, falling back to defaults without a path.
pub(crate) fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let config = match path {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read engine config at {}", path.display()))?;
            parse_config(&contents)
                .with_context(|| format!("invalid engine config at {}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    Ok(config)
}

fn parse_config(contents: &str) -> Result<EngineConfig> {
    let config: EngineConfig =
        toml::from_str(contents).context("failed to parse engine config toml contents")?;
    config.validate()?;
    Ok(config)
}

/// Loads map `id` from a JSON bundle, using the bundled dungeon without a path.
pub(crate) fn load_grid(path: Option<&Path>, id: &str) -> Result<GridMap> {
    match path {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read map bundle at {}", path.display()))?;
            GridMap::from_bundle_json(&contents, id)
                .with_context(|| format!("failed to load map `{id}` from {}", path.display()))
        }
        None => GridMap::from_bundle_json(BUNDLED_MAPS, id)
            .with_context(|| format!("failed to load bundled map `{id}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = parse_config(
            "ray_count = 160\n\
             [pursuit]\n\
             replan_interval_ms = 250\n",
        )
        .expect("valid config");

        assert_eq!(config.ray_count, 160);
        assert_eq!(config.screen_width, 800);
        assert_eq!(config.pursuit.replan_interval_ms, 250);
        assert_eq!(config.pursuit.engage_tiles, 0.6);
    }

    #[test]
    fn invalid_config_is_rejected() {
        assert!(parse_config("ray_count = 0").is_err());
        assert!(parse_config("fov_degrees = \"wide\"").is_err());
    }

    #[test]
    fn bundled_dungeon_loads() {
        let grid = load_grid(None, "map").expect("bundled map");
        assert_eq!((grid.columns(), grid.rows()), (16, 12));
        assert!(load_grid(None, "missing").is_err());
    }
}
