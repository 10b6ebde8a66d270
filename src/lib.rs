// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! A [Rosetta API](https://docs.cdp.coinbase.com/mesh/docs/welcome) adapter over a Filecoin full node.
//!
//! The interesting part lives in [`rosetta::operations`], which flattens the node's execution
//! traces into Rosetta operations. Everything else is plumbing around it.

pub mod actors;
pub mod address_cache;
pub mod blocks;
pub mod chain_sync;
pub mod cli;
pub mod cli_shared;
pub mod lotus_json;
pub mod message;
pub mod node;
pub mod rosetta;
pub mod shim;
#[cfg(test)]
mod test_utils;
