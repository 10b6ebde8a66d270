// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::{collections::HashMap, fmt, str::FromStr, time::Duration};

use anyhow::{Context as _, bail};
use async_trait::async_trait;
use cid::Cid;
use http::{HeaderMap, HeaderValue, header};
use jsonrpsee::{
    core::{ClientError, client::ClientT as _, params::ArrayParams},
    http_client::{HttpClient, HttpClientBuilder},
};
use serde::de::DeserializeOwned;
use url::Url;

use super::{FullNode, NodeError, TipsetTag, types::*};
use crate::{
    blocks::{Tipset, TipsetKey},
    chain_sync::SyncState,
    lotus_json::{HasLotusJson, LotusJson},
    message::{Message, SignedMessage},
    shim::{address::Address, clock::ChainEpoch, econ::TokenAmount},
};

pub const DEFAULT_URL: &str = "http://127.0.0.1:1234/rpc";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Where the node lives and how to authenticate against it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiInfo {
    v1: Url,
    v2: Url,
    pub token: Option<String>,
}

impl ApiInfo {
    /// Accepts a base `/rpc` endpoint, or an explicit `/rpc/v0`, `/rpc/v1` or `/rpc/v2` one,
    /// and derives the other API version from it.
    pub fn new(url: &str, token: Option<String>) -> anyhow::Result<Self> {
        let url = Url::parse(url).with_context(|| format!("invalid node URL {url}"))?;
        let path = url.path().trim_end_matches('/').to_owned();
        let (v1_path, v2_path) = if path.ends_with("/rpc") {
            (format!("{path}/v1"), format!("{path}/v2"))
        } else if let Some(base) = path
            .strip_suffix("/rpc/v0")
            .or_else(|| path.strip_suffix("/rpc/v1"))
            .or_else(|| path.strip_suffix("/rpc/v2"))
        {
            (format!("{base}/rpc/v1"), format!("{base}/rpc/v2"))
        } else {
            bail!(
                "unrecognized RPC endpoint {url}, expected a path ending with /rpc, /rpc/v1 or /rpc/v2"
            )
        };
        let mut v1 = url.clone();
        v1.set_path(&v1_path);
        let mut v2 = url;
        v2.set_path(&v2_path);
        Ok(Self {
            v1,
            v2,
            token: token.filter(|it| !it.is_empty()),
        })
    }

    pub fn v1(&self) -> &Url {
        &self.v1
    }

    pub fn v2(&self) -> &Url {
        &self.v2
    }
}

impl Default for ApiInfo {
    fn default() -> Self {
        Self {
            v1: Url::parse("http://127.0.0.1:1234/rpc/v1").expect("valid URL"),
            v2: Url::parse("http://127.0.0.1:1234/rpc/v2").expect("valid URL"),
            token: None,
        }
    }
}

impl FromStr for ApiInfo {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s, None)
    }
}

impl fmt::Display for ApiInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.v1.fmt(f)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ApiVersion {
    V1,
    V2,
}

/// [`FullNode`] over Lotus' JSON-RPC API.
pub struct LotusClient {
    v1: HttpClient,
    v2: Option<HttpClient>,
}

impl LotusClient {
    pub fn new(info: &ApiInfo, enable_v2: bool, timeout: Duration) -> Result<Self, ClientError> {
        let headers = match &info.token {
            Some(token) => HeaderMap::from_iter([(
                header::AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
                    ClientError::Custom(format!("Invalid authorization token: {e}"))
                })?,
            )]),
            None => HeaderMap::new(),
        };
        let build = |url: &Url| {
            HttpClientBuilder::new()
                .set_headers(headers.clone())
                .request_timeout(timeout)
                .max_response_size(u32::MAX)
                .build(url.as_str())
        };
        let v1 = build(info.v1())?;
        let v2 = match enable_v2 {
            true => match build(info.v2()) {
                Ok(it) => Some(it),
                Err(e) => {
                    tracing::warn!("v2 APIs enabled but the v2 client failed to build: {e}");
                    None
                }
            },
            false => None,
        };
        Ok(Self { v1, v2 })
    }

    pub fn has_v2(&self) -> bool {
        self.v2.is_some()
    }

    async fn call_raw<T: DeserializeOwned>(
        &self,
        api: ApiVersion,
        method: &'static str,
        params: impl HasLotusJson,
    ) -> Result<T, NodeError> {
        let client = match api {
            ApiVersion::V1 => &self.v1,
            ApiVersion::V2 => self
                .v2
                .as_ref()
                .with_context(|| format!("{method} requires the v2 API, which is disabled"))?,
        };
        let params = to_array_params(
            params
                .into_lotus_json_value()
                .context("couldn't serialize parameters")?,
        )?;
        tracing::trace!(method, ?api, "node request");
        Ok(client.request(method, params).await?)
    }

    async fn call<T: HasLotusJson + Clone>(
        &self,
        method: &'static str,
        params: impl HasLotusJson,
    ) -> Result<T, NodeError> {
        self.call_raw::<LotusJson<T>>(ApiVersion::V1, method, params)
            .await
            .map(LotusJson::into_inner)
    }
}

fn to_array_params(value: serde_json::Value) -> anyhow::Result<ArrayParams> {
    let mut params = ArrayParams::new();
    match value {
        serde_json::Value::Null => {}
        serde_json::Value::Array(items) => {
            for item in items {
                params.insert(item)?;
            }
        }
        other => params.insert(other)?,
    }
    Ok(params)
}

fn is_actor_not_found(e: &NodeError) -> bool {
    match e {
        NodeError::Rpc(ClientError::Call(it)) => it.message().contains("actor not found"),
        _ => false,
    }
}

#[async_trait]
impl FullNode for LotusClient {
    async fn chain_head(&self) -> Result<Tipset, NodeError> {
        self.call("Filecoin.ChainHead", ()).await
    }

    async fn chain_get_genesis(&self) -> Result<Tipset, NodeError> {
        self.call("Filecoin.ChainGetGenesis", ()).await
    }

    async fn chain_get_tipset(&self, tsk: &TipsetKey) -> Result<Tipset, NodeError> {
        self.call("Filecoin.ChainGetTipSet", (tsk.clone(),)).await
    }

    async fn chain_get_tipset_by_height(
        &self,
        epoch: ChainEpoch,
        tsk: &TipsetKey,
    ) -> Result<Tipset, NodeError> {
        self.call("Filecoin.ChainGetTipSetByHeight", (epoch, tsk.clone()))
            .await
    }

    async fn chain_get_tipset_after_height(
        &self,
        epoch: ChainEpoch,
        tsk: &TipsetKey,
    ) -> Result<Tipset, NodeError> {
        self.call("Filecoin.ChainGetTipSetAfterHeight", (epoch, tsk.clone()))
            .await
    }

    async fn chain_get_tipset_by_tag(&self, tag: TipsetTag) -> Result<Tipset, NodeError> {
        let selector = serde_json::json!({ "tag": tag });
        self.call_raw::<LotusJson<Tipset>>(ApiVersion::V2, "Filecoin.ChainGetTipSet", (selector,))
            .await
            .map(LotusJson::into_inner)
    }

    async fn state_compute(
        &self,
        epoch: ChainEpoch,
        tsk: &TipsetKey,
    ) -> Result<ComputeStateOutput, NodeError> {
        self.call(
            "Filecoin.StateCompute",
            (epoch, Vec::<Message>::new(), tsk.clone()),
        )
        .await
    }

    async fn state_get_actor(
        &self,
        address: &Address,
        tsk: &TipsetKey,
    ) -> Result<Option<ActorState>, NodeError> {
        match self
            .call::<Option<ActorState>>("Filecoin.StateGetActor", (*address, tsk.clone()))
            .await
        {
            Err(e) if is_actor_not_found(&e) => Ok(None),
            other => other,
        }
    }

    async fn state_account_key(
        &self,
        address: &Address,
        tsk: &TipsetKey,
    ) -> Result<Address, NodeError> {
        self.call("Filecoin.StateAccountKey", (*address, tsk.clone()))
            .await
    }

    async fn state_lookup_id(
        &self,
        address: &Address,
        tsk: &TipsetKey,
    ) -> Result<Address, NodeError> {
        self.call("Filecoin.StateLookupID", (*address, tsk.clone()))
            .await
    }

    async fn state_lookup_robust_address(
        &self,
        address: &Address,
        tsk: &TipsetKey,
    ) -> Result<Address, NodeError> {
        self.call("Filecoin.StateLookupRobustAddress", (*address, tsk.clone()))
            .await
    }

    async fn state_network_name(&self) -> Result<String, NodeError> {
        self.call("Filecoin.StateNetworkName", ()).await
    }

    async fn state_network_version(&self, tsk: &TipsetKey) -> Result<u32, NodeError> {
        self.call("Filecoin.StateNetworkVersion", (tsk.clone(),))
            .await
    }

    async fn state_actor_code_cids(
        &self,
        network_version: u32,
    ) -> Result<HashMap<String, Cid>, NodeError> {
        let codes: HashMap<String, LotusJson<Cid>> = self
            .call_raw(
                ApiVersion::V1,
                "Filecoin.StateActorCodeCIDs",
                (network_version,),
            )
            .await?;
        Ok(codes
            .into_iter()
            .map(|(name, cid)| (name, cid.into_inner()))
            .collect())
    }

    async fn msig_get_available_balance(
        &self,
        address: &Address,
        tsk: &TipsetKey,
    ) -> Result<TokenAmount, NodeError> {
        self.call("Filecoin.MsigGetAvailableBalance", (*address, tsk.clone()))
            .await
    }

    async fn msig_get_vesting_schedule(
        &self,
        address: &Address,
        tsk: &TipsetKey,
    ) -> Result<MsigVesting, NodeError> {
        self.call("Filecoin.MsigGetVestingSchedule", (*address, tsk.clone()))
            .await
    }

    async fn mpool_pending(&self, tsk: &TipsetKey) -> Result<Vec<SignedMessage>, NodeError> {
        self.call("Filecoin.MpoolPending", (tsk.clone(),)).await
    }

    async fn mpool_push(&self, message: &SignedMessage) -> Result<Cid, NodeError> {
        self.call("Filecoin.MpoolPush", (message.clone(),)).await
    }

    async fn mpool_get_nonce(&self, address: &Address) -> Result<u64, NodeError> {
        self.call("Filecoin.MpoolGetNonce", (*address,)).await
    }

    async fn gas_estimate_gas_limit(
        &self,
        message: &Message,
        tsk: &TipsetKey,
    ) -> Result<u64, NodeError> {
        let limit: i64 = self
            .call("Filecoin.GasEstimateGasLimit", (message.clone(), tsk.clone()))
            .await?;
        Ok(u64::try_from(limit).context("node estimated a negative gas limit")?)
    }

    async fn gas_estimate_gas_premium(
        &self,
        blocks_in_cl: u64,
        sender: &Address,
        gas_limit: u64,
        tsk: &TipsetKey,
    ) -> Result<TokenAmount, NodeError> {
        self.call(
            "Filecoin.GasEstimateGasPremium",
            (blocks_in_cl, *sender, gas_limit, tsk.clone()),
        )
        .await
    }

    async fn gas_estimate_fee_cap(
        &self,
        message: &Message,
        max_queue_blocks: i64,
        tsk: &TipsetKey,
    ) -> Result<TokenAmount, NodeError> {
        self.call(
            "Filecoin.GasEstimateFeeCap",
            (message.clone(), max_queue_blocks, tsk.clone()),
        )
        .await
    }

    async fn sync_state(&self) -> Result<SyncState, NodeError> {
        self.call("Filecoin.SyncState", ()).await
    }

    async fn net_peers(&self) -> Result<Vec<AddrInfo>, NodeError> {
        self.call("Filecoin.NetPeers", ()).await
    }

    async fn version(&self) -> Result<NodeVersion, NodeError> {
        self.call("Filecoin.Version", ()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn derives_endpoints() {
        for (given, v1, v2) in [
            (
                "http://node:1234/rpc",
                "http://node:1234/rpc/v1",
                "http://node:1234/rpc/v2",
            ),
            (
                "http://node:1234/rpc/v0",
                "http://node:1234/rpc/v1",
                "http://node:1234/rpc/v2",
            ),
            (
                "https://node/api/rpc/v1/",
                "https://node/api/rpc/v1",
                "https://node/api/rpc/v2",
            ),
            (
                "http://node:1234/rpc/v2",
                "http://node:1234/rpc/v1",
                "http://node:1234/rpc/v2",
            ),
        ] {
            let info = ApiInfo::new(given, None).unwrap();
            assert_eq!(info.v1().as_str(), v1, "{given}");
            assert_eq!(info.v2().as_str(), v2, "{given}");
        }
    }

    #[test]
    fn rejects_unknown_paths() {
        assert!(ApiInfo::new("http://node:1234/api", None).is_err());
        assert!(ApiInfo::new("not a url", None).is_err());
    }

    #[test]
    fn empty_token_is_no_token() {
        let info = ApiInfo::new(DEFAULT_URL, Some(String::new())).unwrap();
        assert_eq!(info.token, None);
        assert_eq!(info, ApiInfo::default());
    }

    #[test]
    fn params_are_positional() {
        let params = (7_i64, TipsetKey::default())
            .into_lotus_json_value()
            .unwrap();
        assert_eq!(params, serde_json::json!([7, []]));
        let params = ().into_lotus_json_value().unwrap();
        assert_eq!(params, serde_json::Value::Null);
        assert!(to_array_params(params).is_ok());
    }
}
