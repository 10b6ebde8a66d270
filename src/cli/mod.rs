// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::{ffi::OsString, sync::Arc};

use anyhow::Context as _;
use backon::{ConstantBuilder, Retryable as _};
use clap::Parser;
use tracing::{info, warn};

use crate::{
    actors::{ActorRegistry, actor_version_for},
    cli_shared::{
        cli::{CliOpts, Config, ConfigPath},
        logger,
    },
    node::{ApiInfo, FullNode, LotusClient, TimeoutNode},
    rosetta::{RosettaService, ServiceOptions, server},
    shim::address::CurrentNetwork,
};

/// Rosetta API server for Filecoin, backed by a Lotus-compatible node
#[derive(Debug, Parser)]
#[command(name = env!("CARGO_PKG_NAME"), author = env!("CARGO_PKG_AUTHORS"), version, about = env!("CARGO_PKG_DESCRIPTION"))]
pub struct Cli {
    #[command(flatten)]
    pub opts: CliOpts,
    #[command(subcommand)]
    pub cmd: Option<Subcommand>,
}

#[derive(Debug, clap::Subcommand)]
pub enum Subcommand {
    /// Serve the Rosetta API (the default)
    Run,
    /// Inspect the configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Debug, clap::Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Dump,
}

pub async fn main<ArgT>(args: impl IntoIterator<Item = ArgT>) -> anyhow::Result<()>
where
    ArgT: Into<OsString> + Clone,
{
    let Cli { opts, cmd } = Cli::parse_from(args);
    let (config, path) = opts.to_config().context("Error parsing config")?;

    match cmd.unwrap_or(Subcommand::Run) {
        Subcommand::Config(ConfigCommands::Dump) => {
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        Subcommand::Run => {
            logger::setup_logger(&config.log)?;
            match &path {
                Some(ConfigPath::Cli(path)) => info!("Config loaded: {}", path.display()),
                Some(ConfigPath::Env(path)) => {
                    info!("FOREST_ROSETTA_CONFIG_PATH loaded: {}", path.display())
                }
                Some(ConfigPath::Project(path)) => {
                    info!("Project config loaded: {}", path.display())
                }
                None => info!("Using default config"),
            }
            run(config).await
        }
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    let info = ApiInfo::new(&config.node.rpc_url, config.node.token.clone())?;
    let client = LotusClient::new(
        &info,
        config.features.enable_lotus_v2_apis,
        config.node.timeout(),
    )
    .context("couldn't create the node client")?;
    if config.features.enable_lotus_v2_apis && !client.has_v2() {
        warn!("v2 APIs requested but unavailable, finality tags are disabled");
    }
    let enable_v2 = client.has_v2();
    let node: Arc<dyn FullNode> = Arc::new(TimeoutNode::new(
        Arc::new(client),
        config.node.timeout(),
    ));

    let version = (|| node.version())
        .retry(
            ConstantBuilder::default()
                .with_delay(config.node.connect_retry_delay())
                .with_max_times(config.node.connect_attempts),
        )
        .notify(|e, delay| warn!("node at {info} is unreachable ({e}), retrying in {delay:?}"))
        .await
        .with_context(|| format!("couldn't reach the node at {info}"))?;
    info!(
        "Connected to {info}, node version {}, API version {}",
        version.version, version.api_version
    );

    let network_name = node
        .state_network_name()
        .await
        .context("couldn't get the network name")?;
    CurrentNetwork::set_from_network_name(&network_name);
    info!("Serving network {network_name}");

    let registry = load_registry(node.as_ref()).await;
    let service = Arc::new(RosettaService::new(
        node,
        registry,
        network_name,
        ServiceOptions {
            enable_v2,
            force_safe_f3_finality: config.features.force_safe_f3_finality,
        },
    ));
    server::serve(
        service,
        config.server.listen_address,
        config.server.cors,
        shutdown_signal(),
    )
    .await
}

/// The embedded actor bundles, preceded by the node's current one when it can tell.
async fn load_registry(node: &dyn FullNode) -> ActorRegistry {
    let registry = ActorRegistry::builtin();
    let current = async {
        let head = node.chain_head().await?;
        let network_version = node.state_network_version(head.key()).await?;
        let actor_version = actor_version_for(network_version)
            .with_context(|| format!("no actor bundle for network version {network_version}"))?;
        let codes = node.state_actor_code_cids(network_version).await?;
        anyhow::Ok((actor_version, codes))
    };
    match current.await {
        Ok((version, codes)) => {
            info!("Loaded the actors v{version} manifest from the node");
            registry.with_manifest(version, codes)
        }
        Err(e) => {
            warn!("Couldn't load the actor manifest from the node, using embedded data: {e:#}");
            registry
        }
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down"),
        Err(e) => warn!("couldn't listen for ctrl-c: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        actors::BuiltinActor,
        test_utils::{MockNode, code_of},
    };

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["forest-rosetta"]).unwrap();
        assert!(cli.cmd.is_none());
        let cli = Cli::try_parse_from([
            "forest-rosetta",
            "--listen",
            "127.0.0.1:9000",
            "--log-format",
            "json",
            "config",
            "dump",
        ])
        .unwrap();
        assert!(matches!(
            cli.cmd,
            Some(Subcommand::Config(ConfigCommands::Dump))
        ));
        assert_eq!(
            cli.opts.listen.map(|it| it.to_string()).as_deref(),
            Some("127.0.0.1:9000")
        );
        assert!(Cli::try_parse_from(["forest-rosetta", "--log-format", "xml"]).is_err());
    }

    #[tokio::test]
    async fn registry_asks_the_node() {
        let node = MockNode::with_chain(&[0, 1]);
        let registry = load_registry(&node).await;
        assert_eq!(node.calls("state_actor_code_cids"), 1);
        let account = registry.resolve(&code_of(BuiltinActor::Account)).unwrap();
        assert_eq!(account.actor, BuiltinActor::Account);
    }
}
