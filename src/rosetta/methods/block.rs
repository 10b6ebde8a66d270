// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::{
    blocks::Tipset,
    rosetta::{
        ApiError, BLOCK_CIDS_KEY, ErrorKind, RosettaService, block_identifier,
        operations::build_transactions,
        timestamp_millis,
        types::{
            Block, BlockRequest, BlockResponse, BlockTransactionRequest, Metadata, Transaction,
            TransactionResponse,
        },
    },
    shim::clock::ChainEpoch,
};

impl RosettaService {
    /// `/block`
    pub async fn block(&self, request: BlockRequest) -> Result<BlockResponse, ApiError> {
        self.validate_network(request.network_identifier.as_ref())?;
        let Some(index) = request.block_identifier.index else {
            return Err(ErrorKind::InsufficientQueryInputs.err());
        };
        self.ensure_block_synced().await?;
        let Some(tipset) = self
            .tipset_at(index, request.block_identifier.hash.as_deref())
            .await?
        else {
            return Ok(BlockResponse { block: None });
        };

        let parent = self.parent_of(&tipset).await?;
        let transactions = self.transactions_of(&tipset).await?;
        let mut metadata = Metadata::new();
        metadata.insert(
            BLOCK_CIDS_KEY.into(),
            tipset
                .key()
                .cids()
                .iter()
                .map(|it| it.to_string())
                .collect::<Vec<_>>()
                .into(),
        );
        Ok(BlockResponse {
            block: Some(Block {
                block_identifier: block_identifier(&tipset)?,
                parent_block_identifier: block_identifier(&parent)?,
                timestamp: timestamp_millis(&tipset),
                transactions,
                metadata: Some(metadata),
            }),
        })
    }

    /// `/block/transaction`
    pub async fn block_transaction(
        &self,
        request: BlockTransactionRequest,
    ) -> Result<TransactionResponse, ApiError> {
        self.validate_network(request.network_identifier.as_ref())?;
        self.ensure_block_synced().await?;
        let block = &request.block_identifier;
        let wanted = &request.transaction_identifier.hash;
        let Some(tipset) = self.tipset_at(block.index, Some(block.hash.as_str())).await? else {
            return Err(ErrorKind::TxNotFound.with(wanted, true));
        };
        self.transactions_of(&tipset)
            .await?
            .into_iter()
            .find(|it| it.transaction_identifier.hash == *wanted)
            .map(|transaction| TransactionResponse { transaction })
            .ok_or_else(|| ErrorKind::TxNotFound.with(wanted, true))
    }

    /// Blocks and the mempool are only served by a synced node.
    pub(super) async fn ensure_block_synced(&self) -> Result<(), ApiError> {
        let status = self.sync_status().await?;
        if !status.is_synced() {
            return Err(ErrorKind::UnableToGetUnsyncedBlock.with(status.stage(), true));
        }
        Ok(())
    }

    /// The tipset at `index`, `None` for a null round. A given `hash` must match it.
    async fn tipset_at(
        &self,
        index: ChainEpoch,
        hash: Option<&str>,
    ) -> Result<Option<Tipset>, ApiError> {
        if index < 0 {
            return Err(ErrorKind::MalformedValue.with(index, true));
        }
        let head = self
            .node
            .chain_head()
            .await
            .map_err(|e| ErrorKind::UnableToGetLatestBlk.node(e, true))?;
        if index > head.epoch() {
            return Err(ErrorKind::UnableToGetUnsyncedBlock.with(index, true));
        }
        let tipset = self
            .node
            .chain_get_tipset_by_height(index, head.key())
            .await
            .map_err(|e| ErrorKind::UnableToGetTipset.node(e, true))?;
        if tipset.epoch() != index {
            tracing::debug!(index, "null round");
            return Ok(None);
        }
        if let Some(hash) = hash
            && block_identifier(&tipset)?.hash != hash
        {
            return Err(ErrorKind::InvalidHash.with(hash, true));
        }
        Ok(Some(tipset))
    }

    /// Genesis is its own parent.
    async fn parent_of(&self, tipset: &Tipset) -> Result<Tipset, ApiError> {
        if tipset.epoch() == 0 {
            return Ok(tipset.clone());
        }
        let Some(parents) = tipset.parents().filter(|it| !it.is_empty()) else {
            return Err(ErrorKind::UnableToGetParentBlk.with(tipset.key(), true));
        };
        self.node
            .chain_get_tipset(parents)
            .await
            .map_err(|e| ErrorKind::UnableToGetParentBlk.node(e, true))
    }

    /// The parent tipset's messages, which are executed at `tipset`'s height.
    async fn transactions_of(&self, tipset: &Tipset) -> Result<Vec<Transaction>, ApiError> {
        if tipset.epoch() == 0 {
            return Ok(vec![]);
        }
        let Some(parents) = tipset.parents().filter(|it| !it.is_empty()) else {
            return Err(ErrorKind::UnableToGetParentBlk.with(tipset.key(), true));
        };
        let output = self
            .node
            .state_compute(tipset.epoch(), parents)
            .await
            .map_err(|e| ErrorKind::UnableToGetTxns.node(e, true))?;
        Ok(build_transactions(&self.cache, &output.trace).await)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        actors::BuiltinActor,
        chain_sync::SyncStage,
        rosetta::{
            ServiceOptions,
            tests::{nid, service},
            types::{PartialBlockIdentifier, TransactionIdentifier},
        },
        shim::address::Address,
        test_utils::{MockNode, fake_cid, invocation, key_address, trace},
    };

    const ALICE: Address = Address::new_id(1001);
    const BOB: Address = Address::new_id(1002);

    fn setup(heights: &[ChainEpoch]) -> Arc<MockNode> {
        let node = Arc::new(MockNode::with_chain(heights));
        for (id, seed) in [(ALICE, 1), (BOB, 2)] {
            node.add_actor(id, BuiltinActor::Account, 0);
            node.link(id, key_address(seed));
        }
        node
    }

    fn request(index: Option<ChainEpoch>, hash: Option<String>) -> BlockRequest {
        BlockRequest {
            network_identifier: Some(nid()),
            block_identifier: PartialBlockIdentifier { index, hash },
        }
    }

    #[tokio::test]
    async fn genesis_is_its_own_parent() {
        let node = setup(&[0, 1]);
        let block = service(node.clone(), ServiceOptions::default())
            .block(request(Some(0), None))
            .await
            .unwrap()
            .block
            .unwrap();
        assert_eq!(block.block_identifier, block.parent_block_identifier);
        assert_eq!(block.block_identifier.index, 0);
        assert!(block.transactions.is_empty());
        assert_eq!(node.calls("state_compute"), 0);
    }

    #[tokio::test]
    async fn block_with_transactions() {
        let node = setup(&[0, 1, 2]);
        node.set_traces(
            2,
            vec![
                invocation(10, trace(ALICE, BOB, 0, 100, vec![]), 5),
                invocation(11, trace(ALICE, BOB, 0, 0, vec![]), 5),
            ],
        );
        let hash = node.tipset(2).key().hash_string().unwrap();
        let block = service(node.clone(), ServiceOptions::default())
            .block(request(Some(2), Some(hash.clone())))
            .await
            .unwrap()
            .block
            .unwrap();

        assert_eq!(block.block_identifier.hash, hash);
        assert_eq!(block.parent_block_identifier.index, 1);
        assert_eq!(block.timestamp, (1_598_306_400 + 60) * 1000);
        assert_eq!(
            block.metadata.unwrap()[BLOCK_CIDS_KEY],
            serde_json::json!([fake_cid(2).to_string()])
        );
        assert_eq!(block.transactions.len(), 1);
        let tx = &block.transactions[0];
        assert_eq!(tx.transaction_identifier.hash, fake_cid(10).to_string());
        assert_eq!(tx.operations.len(), 3);
        assert_eq!(node.last_compute_key(), Some(node.tipset(1).key().clone()));
    }

    #[tokio::test]
    async fn executes_parent_messages_across_null_rounds() {
        let node = setup(&[0, 1, 3]);
        node.set_traces(3, vec![invocation(10, trace(ALICE, BOB, 0, 100, vec![]), 5)]);
        let block = service(node.clone(), ServiceOptions::default())
            .block(request(Some(3), None))
            .await
            .unwrap()
            .block
            .unwrap();
        assert_eq!(block.transactions.len(), 1);
        assert_eq!(node.last_compute_key(), Some(node.tipset(1).key().clone()));
        assert_ne!(node.last_compute_key(), Some(node.tipset(3).key().clone()));
    }

    #[tokio::test]
    async fn null_rounds_have_no_block() {
        let node = setup(&[0, 1, 3]);
        let response = service(node, ServiceOptions::default())
            .block(request(Some(2), None))
            .await
            .unwrap();
        assert_eq!(response.block, None);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({ "block": null })
        );
    }

    #[tokio::test]
    async fn parent_skips_null_rounds() {
        let node = setup(&[0, 1, 3]);
        let block = service(node, ServiceOptions::default())
            .block(request(Some(3), None))
            .await
            .unwrap()
            .block
            .unwrap();
        assert_eq!(block.parent_block_identifier.index, 1);
    }

    #[tokio::test]
    async fn block_errors() {
        let node = setup(&[0, 1, 2]);
        let service = service(node.clone(), ServiceOptions::default());
        let kind = async |request: BlockRequest| service.block(request).await.unwrap_err().kind();

        assert_eq!(
            kind(request(None, None)).await,
            Some(ErrorKind::InsufficientQueryInputs)
        );
        assert_eq!(
            kind(request(Some(2), Some("beef".into()))).await,
            Some(ErrorKind::InvalidHash)
        );
        assert_eq!(
            kind(request(Some(-1), None)).await,
            Some(ErrorKind::MalformedValue)
        );
        assert_eq!(
            kind(request(Some(3), None)).await,
            Some(ErrorKind::UnableToGetUnsyncedBlock)
        );
        node.set_sync(SyncStage::Messages, 1, 2);
        assert_eq!(
            kind(request(Some(1), None)).await,
            Some(ErrorKind::UnableToGetUnsyncedBlock)
        );
    }

    #[tokio::test]
    async fn finds_block_transactions() {
        let node = setup(&[0, 1, 2]);
        node.set_traces(2, vec![invocation(10, trace(ALICE, BOB, 0, 100, vec![]), 5)]);
        let service = service(node.clone(), ServiceOptions::default());
        let block_identifier = block_identifier(&node.tipset(2)).unwrap();
        let request = |hash: String| BlockTransactionRequest {
            network_identifier: Some(nid()),
            block_identifier: block_identifier.clone(),
            transaction_identifier: TransactionIdentifier { hash },
        };

        let found = service
            .block_transaction(request(fake_cid(10).to_string()))
            .await
            .unwrap();
        assert_eq!(found.transaction.operations.len(), 3);
        assert_eq!(node.last_compute_key(), Some(node.tipset(1).key().clone()));

        let err = service
            .block_transaction(request(fake_cid(11).to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::TxNotFound));
    }
}
