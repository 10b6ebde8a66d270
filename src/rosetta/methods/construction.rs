// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! The parts of the Construction API that need the node. Building and signing messages is
//! left to offline tooling.

use num::BigInt;
use num_traits::Signed as _;

use crate::{
    message::{Message, SignedMessage},
    rosetta::{
        ApiError, ErrorKind, NONCE_KEY, RosettaService,
        types::{
            Amount, ConstructionMetadataRequest, ConstructionMetadataResponse,
            ConstructionRequest, ConstructionSubmitRequest, Metadata, TransactionIdentifier,
            TransactionIdentifierResponse,
        },
    },
    shim::{address::Address, econ::TokenAmount},
};

const SENDER_KEY: &str = "idSender";
const RECEIVER_KEY: &str = "idReceiver";
const VALUE_KEY: &str = "value";
const GAS_LIMIT_KEY: &str = "gasLimit";
const GAS_PREMIUM_KEY: &str = "gasPremium";
const GAS_FEE_CAP_KEY: &str = "gasFeeCap";

/// Blocks the premium estimate aims to be included within.
const GAS_PREMIUM_BLOCKS: u64 = 10;
/// Blocks the fee cap estimate must survive in the queue.
const FEE_CAP_MAX_QUEUE_BLOCKS: i64 = 20;

impl RosettaService {
    /// `/construction/metadata`
    pub async fn construction_metadata(
        &self,
        request: ConstructionMetadataRequest,
    ) -> Result<ConstructionMetadataResponse, ApiError> {
        self.validate_network(request.network_identifier.as_ref())?;
        let options = request.options.unwrap_or_default();
        let Some(sender) = address_option(&options, SENDER_KEY)? else {
            return Err(ErrorKind::InvalidAccountAddress.with("idSender is required", true));
        };
        let receiver = address_option(&options, RECEIVER_KEY)?.unwrap_or(sender);
        let value = value_option(&options)?;
        self.synced().await?;

        let head = self
            .node
            .chain_head()
            .await
            .map_err(|e| ErrorKind::UnableToGetLatestBlk.node(e, true))?;
        let nonce = self
            .node
            .mpool_get_nonce(&sender)
            .await
            .map_err(|e| ErrorKind::UnableToGetNextNonce.node(e, true))?;

        let mut message = Message {
            from: sender,
            to: receiver,
            nonce,
            value: value.clone(),
            ..Default::default()
        };
        message.gas_limit = self
            .node
            .gas_estimate_gas_limit(&message, head.key())
            .await
            .map_err(|e| ErrorKind::UnableToEstimateGasPrice.node(e, true))?;
        message.gas_premium = self
            .node
            .gas_estimate_gas_premium(GAS_PREMIUM_BLOCKS, &sender, message.gas_limit, head.key())
            .await
            .map_err(|e| ErrorKind::UnableToEstimateGasPrice.node(e, true))?;
        message.gas_fee_cap = self
            .node
            .gas_estimate_fee_cap(&message, FEE_CAP_MAX_QUEUE_BLOCKS, head.key())
            .await
            .map_err(|e| ErrorKind::UnableToEstimateGasPrice.node(e, true))?;

        let max_fee = TokenAmount::from_atto(message.gas_fee_cap.atto() * message.gas_limit);
        let balance = self
            .node
            .state_get_actor(&sender, head.key())
            .await
            .map_err(|e| ErrorKind::UnableToGetBalance.node(e, true))?
            .map(|it| it.balance)
            .unwrap_or_default();
        if balance < value.clone() + max_fee.clone() {
            return Err(ErrorKind::InsufficientBalanceForGas.with(
                format!("{sender} holds {balance}, needs {value} plus up to {max_fee} for gas"),
                true,
            ));
        }

        let mut metadata = Metadata::new();
        metadata.insert(NONCE_KEY.into(), nonce.into());
        metadata.insert(GAS_LIMIT_KEY.into(), message.gas_limit.into());
        metadata.insert(
            GAS_PREMIUM_KEY.into(),
            message.gas_premium.atto().to_string().into(),
        );
        metadata.insert(
            GAS_FEE_CAP_KEY.into(),
            message.gas_fee_cap.atto().to_string().into(),
        );
        Ok(ConstructionMetadataResponse {
            metadata,
            suggested_fee: vec![Amount::fil(max_fee.atto().to_string())],
        })
    }

    /// `/construction/submit`
    pub async fn construction_submit(
        &self,
        request: ConstructionSubmitRequest,
    ) -> Result<TransactionIdentifierResponse, ApiError> {
        self.validate_network(request.network_identifier.as_ref())?;
        if request.signed_transaction.is_empty() {
            return Err(ErrorKind::MalformedValue.with("empty signed transaction", true));
        }
        let message: SignedMessage = serde_json::from_str(&request.signed_transaction)
            .map_err(|e| ErrorKind::MalformedTx.with(e, true))?;
        let cid = self
            .node
            .mpool_push(&message)
            .await
            .map_err(|e| ErrorKind::UnableToSubmitTx.node(e, true))?;
        tracing::info!(%cid, "submitted message");
        Ok(TransactionIdentifierResponse {
            transaction_identifier: TransactionIdentifier {
                hash: cid.to_string(),
            },
        })
    }

    /// Construction endpoints that only make sense with keys at hand.
    pub async fn construction_not_implemented(
        &self,
        endpoint: &str,
        request: ConstructionRequest,
    ) -> Result<(), ApiError> {
        self.validate_network(request.network_identifier.as_ref())?;
        Err(ErrorKind::NotImplemented.with(endpoint, true))
    }
}

fn address_option(options: &Metadata, key: &str) -> Result<Option<Address>, ApiError> {
    let Some(value) = options.get(key) else {
        return Ok(None);
    };
    value
        .as_str()
        .and_then(|it| it.parse().ok())
        .map(Some)
        .ok_or_else(|| ErrorKind::InvalidAccountAddress.with(format!("{key}: {value}"), true))
}

fn value_option(options: &Metadata) -> Result<TokenAmount, ApiError> {
    let Some(value) = options.get(VALUE_KEY) else {
        return Ok(TokenAmount::default());
    };
    value
        .as_str()
        .and_then(|it| it.parse::<BigInt>().ok())
        .filter(|it| !it.is_negative())
        .map(TokenAmount::from_atto)
        .ok_or_else(|| ErrorKind::MalformedValue.with(format!("{VALUE_KEY}: {value}"), true))
}
