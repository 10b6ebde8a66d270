// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! The full-node collaborator: everything this crate knows about the chain comes through
//! [`FullNode`].

mod lotus;
mod timeout;
pub mod types;

use std::collections::HashMap;

use async_trait::async_trait;
use cid::Cid;
use serde::{Deserialize, Serialize};

use crate::{
    blocks::{Tipset, TipsetKey},
    chain_sync::SyncState,
    message::{Message, SignedMessage},
    shim::{address::Address, clock::ChainEpoch, econ::TokenAmount},
};
pub use lotus::{ApiInfo, DEFAULT_TIMEOUT, DEFAULT_URL, LotusClient};
pub use timeout::TimeoutNode;
use types::*;

#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    #[error("{method} timed out after {timeout:?}")]
    Timeout {
        method: &'static str,
        timeout: std::time::Duration,
    },
    #[error(transparent)]
    Rpc(#[from] jsonrpsee::core::ClientError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl NodeError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Finality selector understood by the v2 chain API.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TipsetTag {
    #[default]
    Latest,
    Safe,
    Finalized,
}

#[async_trait]
pub trait FullNode: Send + Sync {
    async fn chain_head(&self) -> Result<Tipset, NodeError>;
    async fn chain_get_genesis(&self) -> Result<Tipset, NodeError>;
    async fn chain_get_tipset(&self, tsk: &TipsetKey) -> Result<Tipset, NodeError>;
    /// The tipset at `epoch`, or the last non-null tipset before it.
    async fn chain_get_tipset_by_height(
        &self,
        epoch: ChainEpoch,
        tsk: &TipsetKey,
    ) -> Result<Tipset, NodeError>;
    /// The tipset at `epoch`, or the first non-null tipset after it.
    async fn chain_get_tipset_after_height(
        &self,
        epoch: ChainEpoch,
        tsk: &TipsetKey,
    ) -> Result<Tipset, NodeError>;
    async fn chain_get_tipset_by_tag(&self, tag: TipsetTag) -> Result<Tipset, NodeError>;
    /// Executes the messages of `tsk` at `epoch` and returns their traces.
    async fn state_compute(
        &self,
        epoch: ChainEpoch,
        tsk: &TipsetKey,
    ) -> Result<ComputeStateOutput, NodeError>;
    /// `None` if no actor lives at `address` in the state of `tsk`.
    async fn state_get_actor(
        &self,
        address: &Address,
        tsk: &TipsetKey,
    ) -> Result<Option<ActorState>, NodeError>;
    async fn state_account_key(
        &self,
        address: &Address,
        tsk: &TipsetKey,
    ) -> Result<Address, NodeError>;
    async fn state_lookup_id(&self, address: &Address, tsk: &TipsetKey)
    -> Result<Address, NodeError>;
    async fn state_lookup_robust_address(
        &self,
        address: &Address,
        tsk: &TipsetKey,
    ) -> Result<Address, NodeError>;
    async fn state_network_name(&self) -> Result<String, NodeError>;
    async fn state_network_version(&self, tsk: &TipsetKey) -> Result<u32, NodeError>;
    async fn state_actor_code_cids(
        &self,
        network_version: u32,
    ) -> Result<HashMap<String, Cid>, NodeError>;
    async fn msig_get_available_balance(
        &self,
        address: &Address,
        tsk: &TipsetKey,
    ) -> Result<TokenAmount, NodeError>;
    async fn msig_get_vesting_schedule(
        &self,
        address: &Address,
        tsk: &TipsetKey,
    ) -> Result<MsigVesting, NodeError>;
    async fn mpool_pending(&self, tsk: &TipsetKey) -> Result<Vec<SignedMessage>, NodeError>;
    async fn mpool_push(&self, message: &SignedMessage) -> Result<Cid, NodeError>;
    async fn mpool_get_nonce(&self, address: &Address) -> Result<u64, NodeError>;
    async fn gas_estimate_gas_limit(
        &self,
        message: &Message,
        tsk: &TipsetKey,
    ) -> Result<u64, NodeError>;
    async fn gas_estimate_gas_premium(
        &self,
        blocks_in_cl: u64,
        sender: &Address,
        gas_limit: u64,
        tsk: &TipsetKey,
    ) -> Result<TokenAmount, NodeError>;
    async fn gas_estimate_fee_cap(
        &self,
        message: &Message,
        max_queue_blocks: i64,
        tsk: &TipsetKey,
    ) -> Result<TokenAmount, NodeError>;
    async fn sync_state(&self) -> Result<SyncState, NodeError>;
    async fn net_peers(&self) -> Result<Vec<AddrInfo>, NodeError>;
    async fn version(&self) -> Result<NodeVersion, NodeError>;
}
