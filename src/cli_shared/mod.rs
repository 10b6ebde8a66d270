// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

pub mod cli;
pub mod logger;

use std::path::PathBuf;

use anyhow::Context as _;

use crate::cli_shared::cli::{Config, ConfigPath, find_config_path};

/// Reads the configuration file, if any, then applies the environment overrides.
pub fn read_config(
    config_path_opt: Option<&PathBuf>,
) -> anyhow::Result<(Option<ConfigPath>, Config)> {
    let (path, mut config) = match find_config_path(config_path_opt) {
        Some(path) => {
            let toml = std::fs::read_to_string(path.to_path_buf())
                .with_context(|| format!("couldn't read {}", path.to_path_buf().display()))?;
            let config = toml::from_str(&toml)
                .with_context(|| format!("invalid config file {}", path.to_path_buf().display()))?;
            (Some(path), config)
        }
        None => (None, Config::default()),
    };
    config.apply_env(|key| std::env::var(key).ok())?;
    Ok((path, config))
}
