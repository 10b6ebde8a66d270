// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! The Rosetta API, answered from a [`FullNode`].
//!
//! Endpoints are plain async methods on [`RosettaService`], one module per API group under
//! [`methods`]. [`server`] routes HTTP requests to them.

mod error;
pub mod methods;
pub mod operations;
pub mod server;
pub mod types;

use std::sync::Arc;

pub use error::{ApiError, ErrorDetails, ErrorKind};

use crate::{
    actors::ActorRegistry,
    address_cache::AddressCache,
    blocks::Tipset,
    chain_sync::SyncStatus,
    node::{FullNode, NodeError, TipsetTag},
};
use types::NetworkIdentifier;

pub const ROSETTA_VERSION: &str = "1.4.1";
pub const BLOCKCHAIN: &str = "Filecoin";
pub const CURRENCY_SYMBOL: &str = "FIL";
pub const CURRENCY_DECIMALS: u32 = 18;
pub const OPERATION_STATUS_OK: &str = "Ok";
pub const OPERATION_STATUS_FAIL: &str = "Fail";
pub const BLOCK_CIDS_KEY: &str = "blockCIDs";
pub const NONCE_KEY: &str = "nonce";
pub const SUB_NETWORK_F3: &str = "f3";
pub const FINALITY_TAG_KEY: &str = "finality_tag";
pub const LOCKED_BALANCE: &str = "LockedBalance";
pub const SPENDABLE_BALANCE: &str = "SpendableBalance";
pub const VESTING_SCHEDULE: &str = "VestingSchedule";

/// Feature switches of the service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ServiceOptions {
    /// Use the v2 chain API for finality-tagged queries, and accept the `f3` sub-network.
    pub enable_v2: bool,
    /// Treat requests without a finality tag as asking for the `safe` tipset.
    pub force_safe_f3_finality: bool,
}

/// Everything the endpoints share.
pub struct RosettaService {
    node: Arc<dyn FullNode>,
    cache: AddressCache,
    network_name: String,
    options: ServiceOptions,
}

impl RosettaService {
    /// `node` should already bound every call, see [`crate::node::TimeoutNode`].
    pub fn new(
        node: Arc<dyn FullNode>,
        registry: ActorRegistry,
        network_name: String,
        options: ServiceOptions,
    ) -> Self {
        Self {
            cache: AddressCache::new(node.clone(), Arc::new(registry)),
            node,
            network_name,
            options,
        }
    }

    pub fn network_name(&self) -> &str {
        &self.network_name
    }

    pub fn options(&self) -> ServiceOptions {
        self.options
    }

    /// Checks the request is meant for this node and returns its network identifier.
    #[track_caller]
    fn validate_network<'a>(
        &self,
        network_identifier: Option<&'a NetworkIdentifier>,
    ) -> Result<&'a NetworkIdentifier, ApiError> {
        let Some(nid) = network_identifier else {
            return Err(ErrorKind::MissingNID.err());
        };
        if nid.blockchain != BLOCKCHAIN {
            return Err(ErrorKind::InvalidBlockchain.with(&nid.blockchain, true));
        }
        if nid.network != self.network_name {
            return Err(ErrorKind::InvalidNetwork.with(&nid.network, true));
        }
        if let Some(sub) = &nid.sub_network_identifier
            && (!self.options.enable_v2 || sub.network != SUB_NETWORK_F3)
        {
            return Err(ErrorKind::InvalidSubnetwork.with(&sub.network, true));
        }
        Ok(nid)
    }

    /// Finality tag selected by the `f3` sub-network metadata.
    fn finality_tag(&self, nid: &NetworkIdentifier) -> Result<TipsetTag, ApiError> {
        if !self.options.enable_v2 {
            return Ok(TipsetTag::Latest);
        }
        let default = match self.options.force_safe_f3_finality {
            true => TipsetTag::Safe,
            false => TipsetTag::Latest,
        };
        let tag = nid
            .sub_network_identifier
            .as_ref()
            .and_then(|it| it.metadata.as_ref())
            .and_then(|it| it.get(FINALITY_TAG_KEY));
        match tag {
            None => Ok(default),
            Some(serde_json::Value::String(tag)) => tag
                .parse()
                .map_err(|_| ErrorKind::InvalidFinalityTag.with(tag, true)),
            Some(other) => Err(ErrorKind::InvalidFinalityTag.with(other, true)),
        }
    }

    /// The chain head as seen with `tag`.
    async fn head(&self, tag: TipsetTag) -> Result<Tipset, NodeError> {
        match tag {
            TipsetTag::Latest => self.node.chain_head().await,
            _ => self.node.chain_get_tipset_by_tag(tag).await,
        }
    }

    /// Sync progress of the node. Errored syncs are reported as such.
    async fn sync_status(&self) -> Result<SyncStatus, ApiError> {
        let state = self
            .node
            .sync_state()
            .await
            .map_err(|e| ErrorKind::UnableToGetSyncStatus.node(e, true))?;
        let status = SyncStatus::evaluate(&state)
            .map_err(|e| ErrorKind::UnableToGetSyncStatus.with(e, true))?;
        if status.is_errored() {
            return Err(ErrorKind::SyncErrored.err());
        }
        Ok(status)
    }

    /// Sync progress, refusing to go on until the node caught up.
    async fn synced(&self) -> Result<SyncStatus, ApiError> {
        let status = self.sync_status().await?;
        if !status.is_synced() {
            return Err(ErrorKind::NodeNotSynced.with(status.stage(), true));
        }
        Ok(status)
    }
}

/// Rosetta block identifier of `tipset`.
#[track_caller]
fn block_identifier(tipset: &Tipset) -> Result<types::BlockIdentifier, ApiError> {
    Ok(types::BlockIdentifier {
        index: tipset.epoch(),
        hash: tipset
            .key()
            .hash_string()
            .map_err(|e| ErrorKind::UnableToBuildTipSetHash.with(e, true))?,
    })
}

/// Milliseconds since the unix epoch of the earliest block of `tipset`.
fn timestamp_millis(tipset: &Tipset) -> i64 {
    i64::try_from(tipset.min_timestamp())
        .unwrap_or(i64::MAX)
        .saturating_mul(1000)
}
