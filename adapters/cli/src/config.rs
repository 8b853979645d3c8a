use std::{fs, path::Path};

use anyhow::{Context, Result};
use mine_defence_core::SimulationConfig;

/// Command-line values that take precedence over the configuration file.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Overrides {
    pub(crate) seed: Option<u64>,
    pub(crate) width: Option<u32>,
    pub(crate) height: Option<u32>,
}

/// Reads the configuration file, falling back to defaults when none is given.
pub(crate) fn load(path: Option<&Path>, overrides: Overrides) -> Result<SimulationConfig> {
    let mut config = match path {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            parse(&contents)
                .with_context(|| format!("failed to parse config file {}", path.display()))?
        }
        None => SimulationConfig::default(),
    };

    if let Some(seed) = overrides.seed {
        config.seed = seed;
    }
    if let Some(width) = overrides.width {
        config.grid.width = width;
    }
    if let Some(height) = overrides.height {
        config.grid.height = height;
    }

    config
        .validate()
        .context("configuration rejected")?;
    Ok(config)
}

fn parse(contents: &str) -> Result<SimulationConfig> {
    toml::from_str(contents).context("failed to parse simulation config toml contents")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = parse(
            r#"
            seed = 99

            [grid]
            width = 30
            hazard_ratio = 0.2

            [thresholds]
            waves = [0.5]
            "#,
        )
        .expect("valid toml");

        assert_eq!(config.seed, 99);
        assert_eq!(config.grid.width, 30);
        assert_eq!(config.grid.height, 20);
        assert_eq!(config.grid.hazard_ratio, 0.2);
        assert_eq!(config.thresholds.waves, vec![0.5]);
        assert_eq!(config.thresholds.origins, vec![0.20, 0.40, 0.60]);
        assert_eq!(config.waves.base_count, 3);
    }

    #[test]
    fn overrides_take_precedence() {
        let config = load(
            None,
            Overrides {
                seed: Some(4),
                width: Some(12),
                height: None,
            },
        )
        .expect("valid config");

        assert_eq!(config.seed, 4);
        assert_eq!(config.grid.width, 12);
        assert_eq!(config.grid.height, 20);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let error = load(
            None,
            Overrides {
                width: Some(0),
                ..Overrides::default()
            },
        )
        .expect_err("empty grid must fail");
        assert!(format!("{error:#}").contains("grid must have at least one cell"));
    }

    #[test]
    fn unknown_types_fail_to_parse() {
        assert!(parse("seed = \"abc\"").is_err());
    }
}
