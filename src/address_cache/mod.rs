// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Memoized address lookups.
//!
//! Walking a trace resolves the same handful of addresses over and over, so actor codes and
//! canonical address strings are cached for the lifetime of the process. Addresses never change
//! meaning once assigned on chain, so entries are never evicted.

use std::sync::Arc;

use ahash::HashMap;
use anyhow::Context as _;
use cid::Cid;
use parking_lot::RwLock;

use crate::{
    actors::{ActorRegistry, BuiltinActor},
    blocks::TipsetKey,
    node::FullNode,
    shim::address::Address,
};

const SHARDS: usize = 16;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct CacheEntry {
    code: Option<Cid>,
    pub_key: Option<String>,
}

/// Shared by all requests. Concurrent misses on the same address may both query the node;
/// the answers are identical.
pub struct AddressCache {
    node: Arc<dyn FullNode>,
    registry: Arc<ActorRegistry>,
    shards: Box<[RwLock<HashMap<String, CacheEntry>>]>,
    hasher: ahash::RandomState,
}

impl AddressCache {
    pub fn new(node: Arc<dyn FullNode>, registry: Arc<ActorRegistry>) -> Self {
        Self {
            node,
            registry,
            shards: (0..SHARDS).map(|_| RwLock::default()).collect(),
            hasher: ahash::RandomState::new(),
        }
    }

    pub fn registry(&self) -> &ActorRegistry {
        &self.registry
    }

    fn shard(&self, key: &str) -> &RwLock<HashMap<String, CacheEntry>> {
        let index = self.hasher.hash_one(key) as usize % self.shards.len();
        &self.shards[index]
    }

    fn cached<T>(&self, key: &str, get: impl FnOnce(&CacheEntry) -> Option<T>) -> Option<T> {
        self.shard(key).read().get(key).and_then(get)
    }

    fn store(&self, key: String, update: impl FnOnce(&mut CacheEntry)) {
        update(self.shard(&key).write().entry(key).or_default())
    }

    /// Code CID of the actor at `address`, as of the chain head.
    pub async fn get_actor_code(&self, address: &Address) -> anyhow::Result<Cid> {
        let key = address.to_string();
        if let Some(code) = self.cached(&key, |it| it.code) {
            return Ok(code);
        }
        let actor = self
            .node
            .state_get_actor(address, &TipsetKey::default())
            .await?
            .with_context(|| format!("actor {key} not found"))?;
        self.store(key, |it| it.code = Some(actor.code));
        Ok(actor.code)
    }

    pub async fn get_actor(&self, address: &Address) -> anyhow::Result<Option<BuiltinActor>> {
        let code = self.get_actor_code(address).await?;
        Ok(self.registry.resolve(&code).map(|it| it.actor))
    }

    /// The canonical way to report `address`.
    ///
    /// Multisig and miner actors are reported by their ID address, so the same actor reads the
    /// same whichever address a message used. Every other actor is reported by its robust
    /// address; for accounts that is the key address. Callers don't pick the short or robust
    /// form, it follows from the actor type.
    pub async fn get_pub_key(&self, address: &Address) -> anyhow::Result<String> {
        let key = address.to_string();
        if let Some(pub_key) = self.cached(&key, |it| it.pub_key.clone()) {
            return Ok(pub_key);
        }
        let actor = self.get_actor(address).await?;
        let tsk = TipsetKey::default();
        let resolved = match actor {
            Some(BuiltinActor::Multisig | BuiltinActor::StorageMiner) => match address.is_id() {
                true => *address,
                false => self.node.state_lookup_id(address, &tsk).await?,
            },
            _ if !address.is_id() => *address,
            Some(BuiltinActor::Account) => self.node.state_account_key(address, &tsk).await?,
            _ => self.node.state_lookup_robust_address(address, &tsk).await?,
        };
        let pub_key = resolved.to_string();
        self.store(key, |it| it.pub_key = Some(pub_key.clone()));
        Ok(pub_key)
    }

    /// [`AddressCache::get_pub_key`], falling back to `address` itself on failure.
    pub async fn pub_key_or_raw(&self, address: &Address) -> String {
        match self.get_pub_key(address).await {
            Ok(it) => it,
            Err(e) => {
                tracing::debug!(%address, "couldn't resolve address: {e:#}");
                address.to_string()
            }
        }
    }
}
