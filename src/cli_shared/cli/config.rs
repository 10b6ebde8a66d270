// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::{
    net::{Ipv4Addr, SocketAddr},
    path::PathBuf,
    time::Duration,
};

use anyhow::{Context as _, bail};
use serde::{Deserialize, Serialize};

use crate::node::{DEFAULT_TIMEOUT, DEFAULT_URL};

pub const LOTUS_RPC_URL_ENV: &str = "LOTUS_RPC_URL";
pub const LOTUS_RPC_TOKEN_ENV: &str = "LOTUS_RPC_TOKEN";
pub const ENABLE_LOTUS_V2_APIS_ENV: &str = "ENABLE_LOTUS_V2_APIS";
pub const FORCE_SAFE_F3_FINALITY_ENV: &str = "FORCE_SAFE_F3_FINALITY";
pub const ROSETTA_PORT_ENV: &str = "ROSETTA_PORT";

#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
#[serde(default)]
pub struct NodeConfig {
    pub rpc_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Per-call timeout, in seconds.
    pub timeout: u64,
    pub connect_attempts: usize,
    /// Seconds between connection attempts.
    pub connect_retry_delay: u64,
}

impl NodeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn connect_retry_delay(&self) -> Duration {
        Duration::from_secs(self.connect_retry_delay)
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_URL.into(),
            token: None,
            timeout: DEFAULT_TIMEOUT.as_secs(),
            connect_attempts: 10,
            connect_retry_delay: 5,
        }
    }
}

#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_address: SocketAddr,
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080)),
            cors: true,
        }
    }
}

#[derive(Serialize, Deserialize, PartialEq, Eq, Default, Debug, Clone)]
#[serde(default)]
pub struct FeaturesConfig {
    pub enable_lotus_v2_apis: bool,
    /// Treat requests without a finality tag as asking for the `safe` tipset.
    pub force_safe_f3_finality: bool,
}

#[derive(
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Clone,
    Copy,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Serialize, Deserialize, PartialEq, Eq, Hash, Debug, Clone)]
pub struct LogValue {
    pub module: String,
    pub level: LogLevel,
}

impl LogValue {
    pub fn new(module: &str, level: LogLevel) -> Self {
        Self {
            module: module.to_string(),
            level,
        }
    }
}

#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
#[serde(default)]
pub struct LogConfig {
    /// Log as JSON lines on stdout.
    pub json: bool,
    /// Also log to hourly rotated files in this directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
    pub filters: Vec<LogValue>,
}

impl LogConfig {
    pub(in crate::cli_shared) fn to_filter_string(&self) -> String {
        std::iter::once("info".to_string())
            .chain(
                self.filters
                    .iter()
                    .map(|f| format!("{}={}", f.module, f.level)),
            )
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            json: false,
            log_dir: None,
            filters: vec![
                LogValue::new("axum", LogLevel::Warn),
                LogValue::new("hyper", LogLevel::Warn),
                LogValue::new("jsonrpsee", LogLevel::Warn),
                LogValue::new("tower_http", LogLevel::Info),
            ],
        }
    }
}

#[derive(Serialize, Deserialize, PartialEq, Eq, Default, Debug, Clone)]
#[serde(default)]
pub struct Config {
    pub node: NodeConfig,
    pub server: ServerConfig,
    pub features: FeaturesConfig,
    pub log: LogConfig,
}

impl Config {
    /// Overrides settings from the environment, through `var`.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(url) = var(LOTUS_RPC_URL_ENV) {
            self.node.rpc_url = url;
        }
        if let Some(token) = var(LOTUS_RPC_TOKEN_ENV) {
            self.node.token = Some(token).filter(|it| !it.is_empty());
        }
        if let Some(flag) = var(ENABLE_LOTUS_V2_APIS_ENV) {
            self.features.enable_lotus_v2_apis = parse_flag(ENABLE_LOTUS_V2_APIS_ENV, &flag)?;
        }
        if let Some(flag) = var(FORCE_SAFE_F3_FINALITY_ENV) {
            self.features.force_safe_f3_finality = parse_flag(FORCE_SAFE_F3_FINALITY_ENV, &flag)?;
        }
        if let Some(port) = var(ROSETTA_PORT_ENV) {
            let port = port
                .parse()
                .with_context(|| format!("{ROSETTA_PORT_ENV}: invalid port {port}"))?;
            self.server.listen_address.set_port(port);
        }
        Ok(())
    }
}

fn parse_flag(name: &str, value: &str) -> anyhow::Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => bail!("{name}: expected 1, 0, true or false, got {value}"),
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use quickcheck::Arbitrary;
    use quickcheck_macros::quickcheck;
    use tracing_subscriber::EnvFilter;

    use super::*;

    impl Arbitrary for Config {
        fn arbitrary(g: &mut quickcheck::Gen) -> Self {
            Config {
                node: NodeConfig {
                    rpc_url: String::arbitrary(g),
                    token: Option::arbitrary(g),
                    timeout: u32::arbitrary(g).into(),
                    connect_attempts: u8::arbitrary(g).into(),
                    connect_retry_delay: u32::arbitrary(g).into(),
                },
                server: ServerConfig {
                    listen_address: SocketAddr::from((Ipv4Addr::arbitrary(g), u16::arbitrary(g))),
                    cors: bool::arbitrary(g),
                },
                features: FeaturesConfig {
                    enable_lotus_v2_apis: bool::arbitrary(g),
                    force_safe_f3_finality: bool::arbitrary(g),
                },
                log: LogConfig {
                    json: bool::arbitrary(g),
                    log_dir: None,
                    filters: Default::default(),
                },
            }
        }
    }

    #[quickcheck]
    fn config_all_params_under_section(config: Config) {
        let serialized_config =
            toml::to_string(&config).expect("could not serialize the configuration");
        assert_eq!(
            serialized_config
                .trim_start()
                .chars()
                .next()
                .expect("configuration empty"),
            '['
        );
        let deserialized: Config = toml::from_str(&serialized_config).unwrap();
        assert_eq!(deserialized, config);
    }

    #[test]
    fn default_log_filters() {
        let config = LogConfig::default();
        EnvFilter::builder()
            .parse(config.to_filter_string())
            .unwrap();
    }

    #[test]
    fn sections_are_optional() {
        let config: Config = toml::from_str("[server]\ncors = false\n").unwrap();
        assert_eq!(
            config,
            Config {
                server: ServerConfig {
                    cors: false,
                    ..Default::default()
                },
                ..Default::default()
            }
        );
    }

    #[test]
    fn environment_overrides() {
        let env = HashMap::from([
            (LOTUS_RPC_URL_ENV, "http://lotus:1234/rpc/v1"),
            (LOTUS_RPC_TOKEN_ENV, "secret"),
            (ENABLE_LOTUS_V2_APIS_ENV, "1"),
            (FORCE_SAFE_F3_FINALITY_ENV, "true"),
            (ROSETTA_PORT_ENV, "9090"),
        ]);
        let mut config = Config::default();
        config
            .apply_env(|key| env.get(key).map(|it| it.to_string()))
            .unwrap();
        assert_eq!(config.node.rpc_url, "http://lotus:1234/rpc/v1");
        assert_eq!(config.node.token.as_deref(), Some("secret"));
        assert!(config.features.enable_lotus_v2_apis);
        assert!(config.features.force_safe_f3_finality);
        assert_eq!(config.server.listen_address.to_string(), "0.0.0.0:9090");

        let mut config = Config::default();
        config
            .apply_env(|key| (key == ENABLE_LOTUS_V2_APIS_ENV).then(|| "FALSE".to_string()))
            .unwrap();
        assert!(!config.features.enable_lotus_v2_apis);
        assert!(
            config
                .apply_env(|key| (key == ROSETTA_PORT_ENV).then(|| "http".to_string()))
                .is_err()
        );
        assert!(
            config
                .apply_env(|key| (key == FORCE_SAFE_F3_FINALITY_ENV).then(|| "yes".to_string()))
                .is_err()
        );
    }
}
