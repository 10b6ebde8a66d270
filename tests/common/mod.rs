// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use assert_cmd::{Command, cargo::cargo_bin_cmd};

/// The server binary, isolated from the caller's configuration environment.
pub fn rosetta() -> Command {
    let mut cmd = cargo_bin_cmd!("forest-rosetta");
    for var in [
        "FOREST_ROSETTA_CONFIG_PATH",
        "LOTUS_RPC_URL",
        "LOTUS_RPC_TOKEN",
        "ENABLE_LOTUS_V2_APIS",
        "FORCE_SAFE_F3_FINALITY",
        "ROSETTA_PORT",
    ] {
        cmd.env_remove(var);
    }
    cmd
}
