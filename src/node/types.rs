// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use cid::Cid;
use serde::{Deserialize, Serialize};

use crate::{
    lotus_json::lotus_json_with_self,
    message::Message,
    shim::{
        MethodNum, address::Address, clock::ChainEpoch, econ::TokenAmount, error::ExitCode,
    },
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActorState {
    #[serde(with = "crate::lotus_json")]
    pub code: Cid,
    #[serde(with = "crate::lotus_json")]
    pub head: Cid,
    pub nonce: u64,
    #[serde(with = "crate::lotus_json")]
    pub balance: TokenAmount,
    #[serde(with = "crate::lotus_json", default)]
    pub delegated_address: Option<Address>,
}

lotus_json_with_self!(ActorState);

/// Output of `Filecoin.StateCompute`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ComputeStateOutput {
    #[serde(with = "crate::lotus_json")]
    pub root: Cid,
    #[serde(with = "crate::lotus_json")]
    pub trace: Vec<ApiInvocResult>,
}

lotus_json_with_self!(ComputeStateOutput);

/// Execution of one top-level (or implicit) message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiInvocResult {
    #[serde(with = "crate::lotus_json")]
    pub msg_cid: Cid,
    pub msg: Message,
    #[serde(default)]
    pub msg_rct: Option<Receipt>,
    #[serde(default)]
    pub error: String,
    pub gas_cost: MessageGasCost,
    #[serde(default)]
    pub execution_trace: Option<ExecutionTrace>,
}

lotus_json_with_self!(ApiInvocResult);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Receipt {
    pub exit_code: ExitCode,
    #[serde(with = "crate::lotus_json", default)]
    pub r#return: Vec<u8>,
    pub gas_used: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MessageGasCost {
    #[serde(with = "crate::lotus_json", default)]
    pub message: Option<Cid>,
    #[serde(with = "crate::lotus_json")]
    pub gas_used: TokenAmount,
    #[serde(with = "crate::lotus_json")]
    pub base_fee_burn: TokenAmount,
    #[serde(with = "crate::lotus_json")]
    pub over_estimation_burn: TokenAmount,
    #[serde(with = "crate::lotus_json")]
    pub miner_penalty: TokenAmount,
    #[serde(with = "crate::lotus_json")]
    pub miner_tip: TokenAmount,
    #[serde(with = "crate::lotus_json")]
    pub refund: TokenAmount,
    #[serde(with = "crate::lotus_json")]
    pub total_cost: TokenAmount,
}

/// A node of the call tree recorded while executing a message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExecutionTrace {
    pub msg: MessageTrace,
    pub msg_rct: ReturnTrace,
    #[serde(with = "crate::lotus_json", default)]
    pub subcalls: Vec<ExecutionTrace>,
}

lotus_json_with_self!(ExecutionTrace);

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MessageTrace {
    #[serde(with = "crate::lotus_json")]
    pub from: Address,
    #[serde(with = "crate::lotus_json")]
    pub to: Address,
    #[serde(with = "crate::lotus_json")]
    pub value: TokenAmount,
    pub method: MethodNum,
    #[serde(with = "crate::lotus_json", default)]
    pub params: Vec<u8>,
    #[serde(default)]
    pub params_codec: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReturnTrace {
    pub exit_code: ExitCode,
    #[serde(with = "crate::lotus_json", default)]
    pub r#return: Vec<u8>,
    #[serde(default)]
    pub return_codec: u64,
}

/// Vesting parameters of a multisig actor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MsigVesting {
    #[serde(with = "crate::lotus_json")]
    pub initial_balance: TokenAmount,
    pub start_epoch: ChainEpoch,
    pub unlock_duration: ChainEpoch,
}

lotus_json_with_self!(MsigVesting);

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddrInfo {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Addrs", default)]
    pub addrs: Option<Vec<String>>,
}

lotus_json_with_self!(AddrInfo);

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeVersion {
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "APIVersion")]
    pub api_version: u32,
    #[serde(rename = "BlockDelay")]
    pub block_delay: u64,
}

lotus_json_with_self!(NodeVersion);
