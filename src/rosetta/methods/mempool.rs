// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use cid::Cid;

use crate::{
    message::SignedMessage,
    rosetta::{
        ApiError, ErrorKind, RosettaService,
        operations::{mempool_operations, method_name},
        types::{
            MempoolResponse, MempoolTransactionRequest, NetworkRequest, Transaction,
            TransactionIdentifier, TransactionResponse,
        },
    },
};

impl RosettaService {
    /// `/mempool`
    pub async fn mempool(&self, request: NetworkRequest) -> Result<MempoolResponse, ApiError> {
        self.validate_network(request.network_identifier.as_ref())?;
        let pending = self.pending().await?;
        let transaction_identifiers = pending
            .iter()
            .map(|it| {
                it.cid()
                    .map(|cid| TransactionIdentifier {
                        hash: cid.to_string(),
                    })
                    .map_err(|e| ErrorKind::UnableToGetTxns.with(e, true))
            })
            .collect::<Result<_, _>>()?;
        Ok(MempoolResponse {
            transaction_identifiers,
        })
    }

    /// `/mempool/transaction`
    pub async fn mempool_transaction(
        &self,
        request: MempoolTransactionRequest,
    ) -> Result<TransactionResponse, ApiError> {
        self.validate_network(request.network_identifier.as_ref())?;
        let wanted: Cid = request
            .transaction_identifier
            .hash
            .parse()
            .map_err(|e| ErrorKind::MalformedValue.with(e, true))?;
        let pending = self.pending().await?;
        // messages whose CID can't be derived can't be the one asked for
        let Some(smsg) = pending
            .into_iter()
            .find(|it| it.cid().is_ok_and(|cid| cid == wanted))
        else {
            return Err(ErrorKind::TxNotFound.with(wanted, true));
        };

        let message = &smsg.message;
        let kind = method_name(&self.cache, &message.to, message.method).await;
        let from = self.cache.pub_key_or_raw(&message.from).await;
        let to = self.cache.pub_key_or_raw(&message.to).await;
        Ok(TransactionResponse {
            transaction: Transaction {
                transaction_identifier: TransactionIdentifier {
                    hash: wanted.to_string(),
                },
                operations: mempool_operations(kind, from, to, &message.value),
            },
        })
    }

    /// Messages pending at the head, once the node is synced.
    async fn pending(&self) -> Result<Vec<SignedMessage>, ApiError> {
        self.ensure_block_synced().await?;
        let head = self
            .node
            .chain_head()
            .await
            .map_err(|e| ErrorKind::UnableToGetLatestBlk.node(e, true))?;
        self.node
            .mpool_pending(head.key())
            .await
            .map_err(|e| ErrorKind::UnableToGetTxns.node(e, true))
    }
}
