// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use anyhow::Context as _;
use tracing_subscriber::{EnvFilter, Registry, prelude::*};

use crate::cli_shared::cli::LogConfig;

pub fn setup_logger(config: &LogConfig) -> anyhow::Result<()> {
    let filter = || -> anyhow::Result<EnvFilter> {
        let directives = config.to_filter_string();
        let def = EnvFilter::try_new(&directives)
            .with_context(|| format!("invalid log filters {directives}"))?;
        Ok(get_env_filter(def))
    };
    let mut layers: Vec<Box<dyn tracing_subscriber::layer::Layer<Registry> + Send + Sync>> =
        Vec::new();

    // console logger
    match config.json {
        true => layers.push(Box::new(
            tracing_subscriber::fmt::Layer::new()
                .json()
                .with_filter(filter()?),
        )),
        false => layers.push(Box::new(
            tracing_subscriber::fmt::Layer::new().with_filter(filter()?),
        )),
    }

    // file logger
    if let Some(log_dir) = &config.log_dir {
        let file_appender = tracing_appender::rolling::hourly(log_dir, "forest-rosetta.log");
        layers.push(Box::new(
            tracing_subscriber::fmt::Layer::new()
                .with_ansi(false)
                .with_writer(file_appender)
                .with_filter(filter()?),
        ));
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .context("couldn't install the logger")
}

/// Returns an [`EnvFilter`] according to the `RUST_LOG` environment variable, or `def`.
fn get_env_filter(def: EnvFilter) -> EnvFilter {
    use std::env::{
        self,
        VarError::{NotPresent, NotUnicode},
    };
    match env::var(EnvFilter::DEFAULT_ENV) {
        Ok(s) => EnvFilter::new(s),
        Err(NotPresent) => def,
        Err(NotUnicode(_)) => EnvFilter::default(),
    }
}
