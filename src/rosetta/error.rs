// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::{fmt::Display, panic::Location};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator as _;

use crate::node::NodeError;

/// A Rosetta error object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message} (code {code})")]
pub struct ApiError {
    pub code: i32,
    pub message: String,
    pub retriable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub error: String,
}

impl ApiError {
    pub fn kind(&self) -> Option<ErrorKind> {
        ErrorKind::iter().find(|it| it.code() == self.code)
    }

    /// Every error this service may answer with, ordered by code.
    pub fn all() -> Vec<ApiError> {
        ErrorKind::iter().map(ApiError::from).collect()
    }
}

impl From<ErrorKind> for ApiError {
    fn from(kind: ErrorKind) -> Self {
        Self {
            code: kind.code(),
            message: kind.message().into(),
            retriable: kind.retriable(),
            details: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self)).into_response()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::EnumIter, strum::IntoStaticStr)]
pub enum ErrorKind {
    UnableToGetChainID,
    InvalidBlockchain,
    InvalidSubnetwork,
    InvalidNetwork,
    MissingNID,
    UnableToGetLatestBlk,
    UnableToGetGenesisBlk,
    UnableToGetAccount,
    InsufficientQueryInputs,
    InvalidAccountAddress,
    MustSpecifySubAccount,
    UnableToGetBlk,
    NotImplemented,
    UnableToGetTxns,
    UnableToSubmitTx,
    UnableToGetNextNonce,
    MalformedValue,
    UnableToGetNodeStatus,
    UnableToGetTipsetCID,
    UnableToGetPeers,
    UnableToGetBalance,
    UnableToGetTipset,
    UnableToGetParentBlk,
    UnableToGetNodeInfo,
    UnableToGetSyncStatus,
    UnableToGetUnsyncedBlock,
    SyncErrored,
    UnableToBuildTipSetHash,
    UnableToRetrieveNetworkName,
    MalformedTx,
    InvalidHash,
    UnableToGetTxnReceipt,
    MsgsAndReceiptsCountMismatch,
    UnableToEstimateGasPrice,
    InsufficientBalanceForGas,
    LotusCallTimedOut,
    NodeNotSynced,
    AddressNotMultisig,
    UnableToGetVestingSchedule,
    InvalidFinalityTag,
    TxNotFound,
    UnableToGetActorState,
}

impl ErrorKind {
    /// Stable wire code. Declaration order is code order.
    pub fn code(self) -> i32 {
        self as i32 + 1
    }

    pub fn message(self) -> &'static str {
        use ErrorKind::*;
        match self {
            UnableToGetChainID => "unable to get chain ID",
            InvalidBlockchain => "invalid blockchain specified in network identifier",
            InvalidSubnetwork => "invalid sub-network identifier",
            InvalidNetwork => "invalid network specified in network identifier",
            MissingNID => "network identifier is missing",
            UnableToGetLatestBlk => "unable to get latest block",
            UnableToGetGenesisBlk => "unable to get genesis block",
            UnableToGetAccount => "unable to get account",
            InsufficientQueryInputs => "query inputs insufficient",
            InvalidAccountAddress => "invalid account address",
            MustSpecifySubAccount => {
                "a valid subaccount must be specified ('LockedBalance', 'SpendableBalance' or 'VestingSchedule')"
            }
            UnableToGetBlk => "unable to get block",
            NotImplemented => "operation not implemented",
            UnableToGetTxns => "unable to get transactions",
            UnableToSubmitTx => "unable to submit transaction",
            UnableToGetNextNonce => "unable to get next nonce",
            MalformedValue => "malformed value",
            UnableToGetNodeStatus => "unable to get node status",
            UnableToGetTipsetCID => "unable to get tipset CID",
            UnableToGetPeers => "unable to get peer list",
            UnableToGetBalance => "unable to get balance for address",
            UnableToGetTipset => "unable to get tipset",
            UnableToGetParentBlk => "unable to get parent block",
            UnableToGetNodeInfo => "unable to get node information",
            UnableToGetSyncStatus => "unable to get sync status",
            UnableToGetUnsyncedBlock => "requested block not yet synchronized",
            SyncErrored => "error on node sync process",
            UnableToBuildTipSetHash => "error on creating TipSetKey hash",
            UnableToRetrieveNetworkName => "error when querying network name",
            MalformedTx => "malformed transaction",
            InvalidHash => "hash does not match with provided block index",
            UnableToGetTxnReceipt => "unable to get transaction receipt",
            MsgsAndReceiptsCountMismatch => "retrieved Messages count don't match with Receipts count",
            UnableToEstimateGasPrice => "unable to estimate gas price",
            InsufficientBalanceForGas => "insufficient balance for gas",
            LotusCallTimedOut => "Lotus RPC call timed out",
            NodeNotSynced => "node is not synced yet",
            AddressNotMultisig => "sub-accounts are only available for multisig addresses",
            UnableToGetVestingSchedule => "unable to get vesting schedule",
            InvalidFinalityTag => "invalid finality tag",
            TxNotFound => "transaction not found",
            UnableToGetActorState => "unable to get actor state",
        }
    }

    pub fn retriable(self) -> bool {
        use ErrorKind::*;
        matches!(
            self,
            UnableToGetChainID
                | UnableToGetLatestBlk
                | UnableToGetGenesisBlk
                | UnableToGetAccount
                | UnableToGetBlk
                | UnableToGetTxns
                | UnableToGetNextNonce
                | UnableToGetNodeStatus
                | UnableToGetTipsetCID
                | UnableToGetPeers
                | UnableToGetBalance
                | UnableToGetTipset
                | UnableToGetParentBlk
                | UnableToGetNodeInfo
                | UnableToGetSyncStatus
                | UnableToGetUnsyncedBlock
                | SyncErrored
                | UnableToBuildTipSetHash
                | UnableToGetTxnReceipt
                | UnableToEstimateGasPrice
                | LotusCallTimedOut
                | NodeNotSynced
                | UnableToGetVestingSchedule
                | UnableToGetActorState
        )
    }

    /// The bare error, logged at the call site.
    #[track_caller]
    pub fn err(self) -> ApiError {
        log(self, Location::caller(), None);
        self.into()
    }

    /// The error caused by `cause`, logged at the call site. The cause is only sent to the
    /// client when `include_details` is set.
    #[track_caller]
    pub fn with(self, cause: impl Display, include_details: bool) -> ApiError {
        let cause = format!("{cause:#}");
        log(self, Location::caller(), Some(&cause));
        ApiError {
            details: include_details.then_some(ErrorDetails { error: cause }),
            ..self.into()
        }
    }

    /// Like [`ErrorKind::with`], but reports node timeouts as [`ErrorKind::LotusCallTimedOut`].
    #[track_caller]
    pub fn node(self, cause: NodeError, include_details: bool) -> ApiError {
        match cause.is_timeout() {
            true => ErrorKind::LotusCallTimedOut.with(cause, include_details),
            false => self.with(cause, include_details),
        }
    }
}

fn log(kind: ErrorKind, location: &Location<'_>, cause: Option<&str>) {
    let name: &'static str = kind.into();
    tracing::error!(
        code = kind.code(),
        kind = name,
        "{location}: {}{}",
        kind.message(),
        cause.map(|it| format!(": {it}")).unwrap_or_default()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn codes_are_stable() {
        assert_eq!(ErrorKind::UnableToGetChainID.code(), 1);
        assert_eq!(ErrorKind::UnableToGetBalance.code(), 21);
        assert_eq!(ErrorKind::LotusCallTimedOut.code(), 36);
        assert_eq!(ErrorKind::UnableToGetActorState.code(), 42);
        let codes: Vec<_> = ApiError::all().iter().map(|it| it.code).collect();
        assert_eq!(codes, (1..=42).collect::<Vec<_>>());
    }

    #[test]
    fn details_are_optional() {
        let with = ErrorKind::UnableToGetTipset.with("boom", true);
        assert_eq!(with.details.unwrap().error, "boom");
        assert!(with.retriable);
        let without = ErrorKind::UnableToSubmitTx.with("boom", false);
        assert_eq!(without.details, None);
        assert!(!without.retriable);
    }

    #[test]
    fn timeouts_are_reported_as_such() {
        let timeout = NodeError::Timeout {
            method: "Filecoin.ChainHead",
            timeout: std::time::Duration::from_secs(1),
        };
        let err = ErrorKind::UnableToGetLatestBlk.node(timeout, true);
        assert_eq!(err.kind(), Some(ErrorKind::LotusCallTimedOut));
        let other = NodeError::Other(anyhow::anyhow!("nope"));
        let err = ErrorKind::UnableToGetLatestBlk.node(other, true);
        assert_eq!(err.kind(), Some(ErrorKind::UnableToGetLatestBlk));
    }

    #[test]
    fn serializes_without_empty_details() {
        let json = serde_json::to_value(ApiError::from(ErrorKind::MissingNID)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "code": 5,
                "message": "network identifier is missing",
                "retriable": false,
            })
        );
    }
}
