// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use serde::{Deserialize, Serialize};

use crate::{
    blocks::TipsetKey,
    shim::{address::Address, clock::ChainEpoch},
};

/// The subset of a Lotus block header this crate reads.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BlockHeader {
    #[serde(with = "crate::lotus_json")]
    pub miner: Address,
    #[serde(with = "crate::lotus_json")]
    pub parents: TipsetKey,
    pub height: ChainEpoch,
    /// Seconds since the unix epoch.
    pub timestamp: u64,
}
