// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod config;

use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;

pub use config::*;

pub const CONFIG_PATH_ENV: &str = "FOREST_ROSETTA_CONFIG_PATH";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Options shared by every subcommand. They take precedence over the configuration file
/// and the environment.
#[derive(Debug, Default, clap::Args)]
pub struct CliOpts {
    /// A TOML file containing relevant configurations
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Lotus JSON-RPC endpoint, e.g. `http://127.0.0.1:1234/rpc/v1`
    #[arg(long)]
    pub rpc_url: Option<String>,
    /// Address the Rosetta API listens on
    #[arg(long)]
    pub listen: Option<SocketAddr>,
    /// Format of the logs written to stdout
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,
}

impl CliOpts {
    pub fn to_config(&self) -> anyhow::Result<(Config, Option<ConfigPath>)> {
        let (path, mut cfg) = crate::cli_shared::read_config(self.config.as_ref())?;
        if let Some(url) = &self.rpc_url {
            cfg.node.rpc_url = url.clone();
        }
        if let Some(listen) = self.listen {
            cfg.server.listen_address = listen;
        }
        if let Some(format) = self.log_format {
            cfg.log.json = format == LogFormat::Json;
        }
        Ok((cfg, path))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigPath {
    Cli(PathBuf),
    Env(PathBuf),
    Project(PathBuf),
}

impl ConfigPath {
    pub fn to_path_buf(&self) -> &PathBuf {
        match self {
            ConfigPath::Cli(path) | ConfigPath::Env(path) | ConfigPath::Project(path) => path,
        }
    }
}

pub fn find_config_path(config: Option<&PathBuf>) -> Option<ConfigPath> {
    if let Some(s) = config {
        return Some(ConfigPath::Cli(s.to_owned()));
    }
    if let Ok(s) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(s);
        if path.exists() {
            return Some(ConfigPath::Env(path));
        }
        tracing::warn!("{CONFIG_PATH_ENV} points to a missing file {}", path.display());
    }
    if let Some(dir) = ProjectDirs::from("com", "ChainSafe", "Forest-Rosetta") {
        let path = dir.config_dir().join("config.toml");
        if Path::exists(&path) {
            return Some(ConfigPath::Project(path));
        }
    }
    None
}
