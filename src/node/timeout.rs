// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use cid::Cid;

use super::{FullNode, NodeError, TipsetTag, types::*};
use crate::{
    blocks::{Tipset, TipsetKey},
    chain_sync::SyncState,
    message::{Message, SignedMessage},
    shim::{address::Address, clock::ChainEpoch, econ::TokenAmount},
};

/// Bounds every call to the wrapped node. An elapsed call is abandoned, not cancelled on the
/// node side.
#[derive(Clone)]
pub struct TimeoutNode {
    inner: Arc<dyn FullNode>,
    timeout: Duration,
}

impl TimeoutNode {
    pub fn new(inner: Arc<dyn FullNode>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

macro_rules! bounded {
    ($self:ident . $method:ident ( $($arg:expr),* )) => {
        match tokio::time::timeout($self.timeout, $self.inner.$method($($arg),*)).await {
            Ok(result) => result,
            Err(_elapsed) => {
                tracing::warn!(method = stringify!($method), timeout = ?$self.timeout, "node call timed out");
                Err(NodeError::Timeout {
                    method: stringify!($method),
                    timeout: $self.timeout,
                })
            }
        }
    };
}

#[async_trait]
impl FullNode for TimeoutNode {
    async fn chain_head(&self) -> Result<Tipset, NodeError> {
        bounded!(self.chain_head())
    }

    async fn chain_get_genesis(&self) -> Result<Tipset, NodeError> {
        bounded!(self.chain_get_genesis())
    }

    async fn chain_get_tipset(&self, tsk: &TipsetKey) -> Result<Tipset, NodeError> {
        bounded!(self.chain_get_tipset(tsk))
    }

    async fn chain_get_tipset_by_height(
        &self,
        epoch: ChainEpoch,
        tsk: &TipsetKey,
    ) -> Result<Tipset, NodeError> {
        bounded!(self.chain_get_tipset_by_height(epoch, tsk))
    }

    async fn chain_get_tipset_after_height(
        &self,
        epoch: ChainEpoch,
        tsk: &TipsetKey,
    ) -> Result<Tipset, NodeError> {
        bounded!(self.chain_get_tipset_after_height(epoch, tsk))
    }

    async fn chain_get_tipset_by_tag(&self, tag: TipsetTag) -> Result<Tipset, NodeError> {
        bounded!(self.chain_get_tipset_by_tag(tag))
    }

    async fn state_compute(
        &self,
        epoch: ChainEpoch,
        tsk: &TipsetKey,
    ) -> Result<ComputeStateOutput, NodeError> {
        bounded!(self.state_compute(epoch, tsk))
    }

    async fn state_get_actor(
        &self,
        address: &Address,
        tsk: &TipsetKey,
    ) -> Result<Option<ActorState>, NodeError> {
        bounded!(self.state_get_actor(address, tsk))
    }

    async fn state_account_key(
        &self,
        address: &Address,
        tsk: &TipsetKey,
    ) -> Result<Address, NodeError> {
        bounded!(self.state_account_key(address, tsk))
    }

    async fn state_lookup_id(
        &self,
        address: &Address,
        tsk: &TipsetKey,
    ) -> Result<Address, NodeError> {
        bounded!(self.state_lookup_id(address, tsk))
    }

    async fn state_lookup_robust_address(
        &self,
        address: &Address,
        tsk: &TipsetKey,
    ) -> Result<Address, NodeError> {
        bounded!(self.state_lookup_robust_address(address, tsk))
    }

    async fn state_network_name(&self) -> Result<String, NodeError> {
        bounded!(self.state_network_name())
    }

    async fn state_network_version(&self, tsk: &TipsetKey) -> Result<u32, NodeError> {
        bounded!(self.state_network_version(tsk))
    }

    async fn state_actor_code_cids(
        &self,
        network_version: u32,
    ) -> Result<HashMap<String, Cid>, NodeError> {
        bounded!(self.state_actor_code_cids(network_version))
    }

    async fn msig_get_available_balance(
        &self,
        address: &Address,
        tsk: &TipsetKey,
    ) -> Result<TokenAmount, NodeError> {
        bounded!(self.msig_get_available_balance(address, tsk))
    }

    async fn msig_get_vesting_schedule(
        &self,
        address: &Address,
        tsk: &TipsetKey,
    ) -> Result<MsigVesting, NodeError> {
        bounded!(self.msig_get_vesting_schedule(address, tsk))
    }

    async fn mpool_pending(&self, tsk: &TipsetKey) -> Result<Vec<SignedMessage>, NodeError> {
        bounded!(self.mpool_pending(tsk))
    }

    async fn mpool_push(&self, message: &SignedMessage) -> Result<Cid, NodeError> {
        bounded!(self.mpool_push(message))
    }

    async fn mpool_get_nonce(&self, address: &Address) -> Result<u64, NodeError> {
        bounded!(self.mpool_get_nonce(address))
    }

    async fn gas_estimate_gas_limit(
        &self,
        message: &Message,
        tsk: &TipsetKey,
    ) -> Result<u64, NodeError> {
        bounded!(self.gas_estimate_gas_limit(message, tsk))
    }

    async fn gas_estimate_gas_premium(
        &self,
        blocks_in_cl: u64,
        sender: &Address,
        gas_limit: u64,
        tsk: &TipsetKey,
    ) -> Result<TokenAmount, NodeError> {
        bounded!(self.gas_estimate_gas_premium(blocks_in_cl, sender, gas_limit, tsk))
    }

    async fn gas_estimate_fee_cap(
        &self,
        message: &Message,
        max_queue_blocks: i64,
        tsk: &TipsetKey,
    ) -> Result<TokenAmount, NodeError> {
        bounded!(self.gas_estimate_fee_cap(message, max_queue_blocks, tsk))
    }

    async fn sync_state(&self) -> Result<SyncState, NodeError> {
        bounded!(self.sync_state())
    }

    async fn net_peers(&self) -> Result<Vec<AddrInfo>, NodeError> {
        bounded!(self.net_peers())
    }

    async fn version(&self) -> Result<NodeVersion, NodeError> {
        bounded!(self.version())
    }
}
