// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use anyhow::ensure;
use cid::Cid;
use multihash_codetable::{Code, MultihashDigest as _};
use serde::{Deserialize, Serialize};

use crate::{blocks::BlockHeader, lotus_json::lotus_json_with_self, shim::clock::ChainEpoch};

/// An ordered set of block CIDs identifying a tipset. The empty key means "the heaviest
/// tipset" to Lotus.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TipsetKey(Vec<Cid>);

impl TipsetKey {
    pub fn new(cids: Vec<Cid>) -> Self {
        Self(cids)
    }

    pub fn cids(&self) -> &[Cid] {
        &self.0
    }

    pub fn into_cids(self) -> Vec<Cid> {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Concatenated binary CIDs, matching Lotus' `TipSetKey.Bytes()`.
    pub fn bytes(&self) -> Vec<u8> {
        self.0.iter().flat_map(Cid::to_bytes).collect()
    }

    /// Identifier used as the Rosetta block hash: a `DAG-CBOR` `CIDv1` over the Blake2b-256
    /// digest of [`TipsetKey::bytes`], hex encoded.
    pub fn hash_string(&self) -> anyhow::Result<String> {
        ensure!(!self.is_empty(), "cannot hash an empty tipset key");
        let digest = Code::Blake2b256.digest(&self.bytes());
        let cid = Cid::new_v1(fvm_ipld_encoding::DAG_CBOR, digest);
        Ok(hex::encode(cid.to_bytes()))
    }
}

impl From<Vec<Cid>> for TipsetKey {
    fn from(cids: Vec<Cid>) -> Self {
        Self(cids)
    }
}

impl std::fmt::Display for TipsetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.0.iter().map(Cid::to_string).collect::<Vec<_>>().join(", ");
        write!(f, "[{s}]")
    }
}

/// A set of blocks sharing a height and parents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tipset {
    #[serde(with = "crate::lotus_json")]
    cids: TipsetKey,
    blocks: Vec<BlockHeader>,
    height: ChainEpoch,
}

lotus_json_with_self!(Tipset);

impl Tipset {
    pub fn new(cids: TipsetKey, blocks: Vec<BlockHeader>) -> anyhow::Result<Self> {
        ensure!(!blocks.is_empty(), "a tipset needs at least one block");
        ensure!(
            cids.cids().len() == blocks.len(),
            "tipset has {} block CIDs but {} headers",
            cids.cids().len(),
            blocks.len()
        );
        let height = blocks[0].height;
        ensure!(
            blocks.iter().all(|b| b.height == height),
            "tipset blocks disagree on height"
        );
        Ok(Self {
            cids,
            blocks,
            height,
        })
    }

    pub fn key(&self) -> &TipsetKey {
        &self.cids
    }

    pub fn epoch(&self) -> ChainEpoch {
        self.height
    }

    pub fn block_headers(&self) -> &[BlockHeader] {
        &self.blocks
    }

    pub fn parents(&self) -> Option<&TipsetKey> {
        self.blocks.first().map(|b| &b.parents)
    }

    /// Seconds since the unix epoch of the earliest block.
    pub fn min_timestamp(&self) -> u64 {
        self.blocks.iter().map(|b| b.timestamp).min().unwrap_or_default()
    }
}
