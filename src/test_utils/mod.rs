// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Fixtures shared by the unit tests: deterministic CIDs and tipsets, trace builders and an
//! in-memory [`FullNode`].

use std::{collections::BTreeMap, collections::HashMap, time::Duration};

use anyhow::anyhow;
use async_trait::async_trait;
use cid::Cid;
use fvm_shared4::address::Address as Address_latest;
use multihash_codetable::{Code, MultihashDigest as _};
use parking_lot::{Mutex, RwLock};

use crate::{
    actors::BuiltinActor,
    blocks::{BlockHeader, Tipset, TipsetKey},
    chain_sync::{ActiveSync, SyncStage, SyncState},
    message::{Message, SignedMessage},
    node::{FullNode, NodeError, TipsetTag, types::*},
    shim::{
        MethodNum, address::Address, clock::ChainEpoch, econ::TokenAmount, error::ExitCode,
    },
};

pub fn fake_cid(seed: u64) -> Cid {
    Cid::new_v1(
        fvm_ipld_encoding::DAG_CBOR,
        Code::Blake2b256.digest(&seed.to_be_bytes()),
    )
}

/// A single-block tipset at `epoch` whose parent is the tipset at `epoch - 1`.
pub fn tipset_at(epoch: ChainEpoch) -> Tipset {
    tipset_on(epoch, epoch - 1)
}

fn tipset_on(epoch: ChainEpoch, parent: ChainEpoch) -> Tipset {
    let parents = match epoch {
        0 => TipsetKey::default(),
        _ => TipsetKey::from(vec![fake_cid(parent as u64)]),
    };
    Tipset::new(
        TipsetKey::from(vec![fake_cid(epoch as u64)]),
        vec![BlockHeader {
            miner: Address::new_id(1000),
            parents,
            height: epoch,
            timestamp: 1_598_306_400 + 30 * epoch as u64,
        }],
    )
    .expect("valid tipset")
}

/// A robust (`f2`) address derived from `seed`.
pub fn actor_address(seed: u64) -> Address {
    Address_latest::new_actor(&seed.to_be_bytes()).into()
}

/// A BLS key address derived from `seed`.
pub fn key_address(seed: u8) -> Address {
    Address_latest::new_bls(&[seed; fvm_shared4::address::BLS_PUB_LEN])
        .expect("valid key")
        .into()
}

/// An identity-hashed `fil/7/<name>` code, as used before bundles.
pub fn code_of(actor: BuiltinActor) -> Cid {
    let path = format!("fil/7/{}", actor.name());
    Cid::new_v1(
        0x55,
        cid::multihash::Multihash::wrap(0, path.as_bytes()).expect("short digest"),
    )
}

/// A trace node calling `method` on `to`.
pub fn trace(
    from: Address,
    to: Address,
    method: MethodNum,
    value: u64,
    subcalls: Vec<ExecutionTrace>,
) -> ExecutionTrace {
    ExecutionTrace {
        msg: MessageTrace {
            from,
            to,
            value: TokenAmount::from_atto(value),
            method,
            ..Default::default()
        },
        msg_rct: ReturnTrace {
            exit_code: ExitCode::OK,
            r#return: vec![],
            return_codec: 0,
        },
        subcalls,
    }
}

/// Wraps `trace` as the execution of a top-level message.
pub fn invocation(seed: u64, trace: ExecutionTrace, total_cost: u64) -> ApiInvocResult {
    ApiInvocResult {
        msg_cid: fake_cid(seed),
        msg: Message {
            from: trace.msg.from,
            to: trace.msg.to,
            value: trace.msg.value.clone(),
            method: trace.msg.method,
            ..Default::default()
        },
        msg_rct: Some(Receipt {
            exit_code: trace.msg_rct.exit_code,
            r#return: trace.msg_rct.r#return.clone(),
            gas_used: 0,
        }),
        error: String::new(),
        gas_cost: MessageGasCost {
            total_cost: TokenAmount::from_atto(total_cost),
            ..Default::default()
        },
        execution_trace: Some(trace),
    }
}

/// A [`FullNode`] over in-memory state. Tipsets are looked up by height, everything else by
/// address, ignoring the tipset key passed along with the query.
#[derive(Default)]
pub struct MockNode {
    delay: Mutex<Option<Duration>>,
    calls: Mutex<HashMap<&'static str, usize>>,
    chain: RwLock<BTreeMap<ChainEpoch, Tipset>>,
    tags: RwLock<HashMap<TipsetTag, ChainEpoch>>,
    actors: RwLock<HashMap<Address, ActorState>>,
    /// Per state tipset overrides of `actors`.
    actors_at: RwLock<HashMap<(Address, TipsetKey), ActorState>>,
    id_of: RwLock<HashMap<Address, Address>>,
    robust_of: RwLock<HashMap<Address, Address>>,
    msig_available: RwLock<HashMap<Address, TokenAmount>>,
    msig_vesting: RwLock<HashMap<Address, MsigVesting>>,
    traces: RwLock<HashMap<ChainEpoch, Vec<ApiInvocResult>>>,
    mpool: RwLock<Vec<SignedMessage>>,
    pushed: RwLock<Vec<SignedMessage>>,
    nonces: RwLock<HashMap<Address, u64>>,
    sync: RwLock<SyncState>,
    peers: RwLock<Vec<AddrInfo>>,
    last_state_key: RwLock<Option<TipsetKey>>,
    last_compute_key: RwLock<Option<TipsetKey>>,
}

impl MockNode {
    /// A chain with a tipset at each of `heights`, parents chaining over null rounds, synced to
    /// the last one.
    pub fn with_chain(heights: &[ChainEpoch]) -> Self {
        let node = Self::default();
        {
            let mut chain = node.chain.write();
            let mut parent = -1;
            for &height in heights {
                chain.insert(height, tipset_on(height, parent));
                parent = height;
            }
        }
        if let Some(&head) = heights.last() {
            node.set_synced(head);
        }
        node
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub fn calls(&self, method: &str) -> usize {
        self.calls.lock().get(method).copied().unwrap_or_default()
    }

    pub fn tipset(&self, epoch: ChainEpoch) -> Tipset {
        self.chain.read()[&epoch].clone()
    }

    pub fn set_tag(&self, tag: TipsetTag, epoch: ChainEpoch) {
        self.tags.write().insert(tag, epoch);
    }

    pub fn set_synced(&self, height: ChainEpoch) {
        self.set_sync(SyncStage::Complete, height, height);
    }

    pub fn set_sync(&self, stage: SyncStage, height: ChainEpoch, target: ChainEpoch) {
        *self.sync.write() = SyncState {
            active_syncs: vec![ActiveSync {
                worker_id: 1,
                target: Some(tipset_at(target)),
                stage,
                height,
                ..Default::default()
            }],
            vm_applied: 0,
        };
    }

    pub fn add_actor(&self, address: Address, actor: BuiltinActor, balance: u64) {
        self.actors.write().insert(address, actor_state(actor, balance));
    }

    /// Overrides the balance of `address` as seen from the state of the tipset at `epoch`.
    pub fn set_balance_at(&self, address: Address, epoch: ChainEpoch, balance: u64) {
        let key = self.tipset(epoch).key().clone();
        let mut state = self.actors.read()[&address].clone();
        state.balance = TokenAmount::from_atto(balance);
        self.actors_at.write().insert((address, key), state);
    }

    /// Records `id` and `robust` as two addresses of the same actor.
    pub fn link(&self, id: Address, robust: Address) {
        self.id_of.write().insert(robust, id);
        self.robust_of.write().insert(id, robust);
    }

    pub fn set_multisig(&self, address: Address, available: u64, vesting: MsigVesting) {
        self.msig_available
            .write()
            .insert(address, TokenAmount::from_atto(available));
        self.msig_vesting.write().insert(address, vesting);
    }

    pub fn set_traces(&self, epoch: ChainEpoch, traces: Vec<ApiInvocResult>) {
        self.traces.write().insert(epoch, traces);
    }

    pub fn add_pending(&self, message: SignedMessage) {
        self.mpool.write().push(message);
    }

    pub fn pushed(&self) -> Vec<SignedMessage> {
        self.pushed.read().clone()
    }

    pub fn set_nonce(&self, address: Address, nonce: u64) {
        self.nonces.write().insert(address, nonce);
    }

    pub fn add_peer(&self, id: &str) {
        self.peers.write().push(AddrInfo {
            id: id.into(),
            addrs: None,
        });
    }

    /// Tipset key of the state the last `state_get_actor` call read.
    pub fn last_state_key(&self) -> Option<TipsetKey> {
        self.last_state_key.read().clone()
    }

    /// Tipset key whose messages the last `state_compute` call executed.
    pub fn last_compute_key(&self) -> Option<TipsetKey> {
        self.last_compute_key.read().clone()
    }

    async fn enter(&self, method: &'static str) {
        *self.calls.lock().entry(method).or_default() += 1;
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn find(&self, pred: impl Fn(&Tipset) -> bool) -> Result<Tipset, NodeError> {
        self.chain
            .read()
            .values()
            .find(|it| pred(it))
            .cloned()
            .ok_or_else(|| anyhow!("tipset not found").into())
    }

    fn head(&self) -> Result<Tipset, NodeError> {
        self.chain
            .read()
            .values()
            .next_back()
            .cloned()
            .ok_or_else(|| anyhow!("empty chain").into())
    }

    fn lookup(
        map: &RwLock<HashMap<Address, Address>>,
        address: &Address,
    ) -> Result<Address, NodeError> {
        map.read()
            .get(address)
            .copied()
            .ok_or_else(|| anyhow!("actor not found: {address}").into())
    }
}

pub fn actor_state(actor: BuiltinActor, balance: u64) -> ActorState {
    ActorState {
        code: code_of(actor),
        head: Cid::default(),
        nonce: 0,
        balance: TokenAmount::from_atto(balance),
        delegated_address: None,
    }
}

#[async_trait]
impl FullNode for MockNode {
    async fn chain_head(&self) -> Result<Tipset, NodeError> {
        self.enter("chain_head").await;
        self.head()
    }

    async fn chain_get_genesis(&self) -> Result<Tipset, NodeError> {
        self.enter("chain_get_genesis").await;
        self.find(|it| it.epoch() == 0)
    }

    async fn chain_get_tipset(&self, tsk: &TipsetKey) -> Result<Tipset, NodeError> {
        self.enter("chain_get_tipset").await;
        self.find(|it| it.key() == tsk)
    }

    async fn chain_get_tipset_by_height(
        &self,
        epoch: ChainEpoch,
        _: &TipsetKey,
    ) -> Result<Tipset, NodeError> {
        self.enter("chain_get_tipset_by_height").await;
        self.chain
            .read()
            .range(..=epoch)
            .next_back()
            .map(|(_, it)| it.clone())
            .ok_or_else(|| anyhow!("no tipset at or before {epoch}").into())
    }

    async fn chain_get_tipset_after_height(
        &self,
        epoch: ChainEpoch,
        _: &TipsetKey,
    ) -> Result<Tipset, NodeError> {
        self.enter("chain_get_tipset_after_height").await;
        self.chain
            .read()
            .range(epoch..)
            .next()
            .map(|(_, it)| it.clone())
            .ok_or_else(|| anyhow!("no tipset at or after {epoch}").into())
    }

    async fn chain_get_tipset_by_tag(&self, tag: TipsetTag) -> Result<Tipset, NodeError> {
        self.enter("chain_get_tipset_by_tag").await;
        let epoch = self.tags.read().get(&tag).copied();
        match epoch {
            Some(epoch) => self.find(|it| it.epoch() == epoch),
            None => self.head(),
        }
    }

    async fn state_compute(
        &self,
        epoch: ChainEpoch,
        tsk: &TipsetKey,
    ) -> Result<ComputeStateOutput, NodeError> {
        self.enter("state_compute").await;
        *self.last_compute_key.write() = Some(tsk.clone());
        Ok(ComputeStateOutput {
            root: Cid::default(),
            trace: self.traces.read().get(&epoch).cloned().unwrap_or_default(),
        })
    }

    async fn state_get_actor(
        &self,
        address: &Address,
        tsk: &TipsetKey,
    ) -> Result<Option<ActorState>, NodeError> {
        self.enter("state_get_actor").await;
        *self.last_state_key.write() = Some(tsk.clone());
        if let Some(state) = self.actors_at.read().get(&(*address, tsk.clone())) {
            return Ok(Some(state.clone()));
        }
        Ok(self.actors.read().get(address).cloned())
    }

    async fn state_account_key(
        &self,
        address: &Address,
        _: &TipsetKey,
    ) -> Result<Address, NodeError> {
        self.enter("state_account_key").await;
        Self::lookup(&self.robust_of, address)
    }

    async fn state_lookup_id(&self, address: &Address, _: &TipsetKey) -> Result<Address, NodeError> {
        self.enter("state_lookup_id").await;
        Self::lookup(&self.id_of, address)
    }

    async fn state_lookup_robust_address(
        &self,
        address: &Address,
        _: &TipsetKey,
    ) -> Result<Address, NodeError> {
        self.enter("state_lookup_robust_address").await;
        Self::lookup(&self.robust_of, address)
    }

    async fn state_network_name(&self) -> Result<String, NodeError> {
        self.enter("state_network_name").await;
        Ok("calibrationnet".into())
    }

    async fn state_network_version(&self, _: &TipsetKey) -> Result<u32, NodeError> {
        self.enter("state_network_version").await;
        Ok(25)
    }

    async fn state_actor_code_cids(
        &self,
        _: u32,
    ) -> Result<HashMap<String, Cid>, NodeError> {
        self.enter("state_actor_code_cids").await;
        Ok(HashMap::new())
    }

    async fn msig_get_available_balance(
        &self,
        address: &Address,
        _: &TipsetKey,
    ) -> Result<TokenAmount, NodeError> {
        self.enter("msig_get_available_balance").await;
        self.msig_available
            .read()
            .get(address)
            .cloned()
            .ok_or_else(|| anyhow!("not a multisig: {address}").into())
    }

    async fn msig_get_vesting_schedule(
        &self,
        address: &Address,
        _: &TipsetKey,
    ) -> Result<MsigVesting, NodeError> {
        self.enter("msig_get_vesting_schedule").await;
        self.msig_vesting
            .read()
            .get(address)
            .cloned()
            .ok_or_else(|| anyhow!("not a multisig: {address}").into())
    }

    async fn mpool_pending(&self, _: &TipsetKey) -> Result<Vec<SignedMessage>, NodeError> {
        self.enter("mpool_pending").await;
        Ok(self.mpool.read().clone())
    }

    async fn mpool_push(&self, message: &SignedMessage) -> Result<Cid, NodeError> {
        self.enter("mpool_push").await;
        self.pushed.write().push(message.clone());
        Ok(message.cid()?)
    }

    async fn mpool_get_nonce(&self, address: &Address) -> Result<u64, NodeError> {
        self.enter("mpool_get_nonce").await;
        Ok(self.nonces.read().get(address).copied().unwrap_or_default())
    }

    async fn gas_estimate_gas_limit(
        &self,
        _: &Message,
        _: &TipsetKey,
    ) -> Result<u64, NodeError> {
        self.enter("gas_estimate_gas_limit").await;
        Ok(1_000_000)
    }

    async fn gas_estimate_gas_premium(
        &self,
        _: u64,
        _: &Address,
        _: u64,
        _: &TipsetKey,
    ) -> Result<TokenAmount, NodeError> {
        self.enter("gas_estimate_gas_premium").await;
        Ok(TokenAmount::from_atto(100_000))
    }

    async fn gas_estimate_fee_cap(
        &self,
        _: &Message,
        _: i64,
        _: &TipsetKey,
    ) -> Result<TokenAmount, NodeError> {
        self.enter("gas_estimate_fee_cap").await;
        Ok(TokenAmount::from_atto(200_000))
    }

    async fn sync_state(&self) -> Result<SyncState, NodeError> {
        self.enter("sync_state").await;
        Ok(self.sync.read().clone())
    }

    async fn net_peers(&self) -> Result<Vec<AddrInfo>, NodeError> {
        self.enter("net_peers").await;
        Ok(self.peers.read().clone())
    }

    async fn version(&self) -> Result<NodeVersion, NodeError> {
        self.enter("version").await;
        Ok(NodeVersion {
            version: "1.34.0+mock".into(),
            api_version: 0x0002_0300,
            block_delay: 30,
        })
    }
}
