// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use itertools::Itertools as _;
use serde_json::json;
use strum::IntoEnumIterator as _;

use crate::{
    chain_sync::SyncStage,
    node::TipsetTag,
    rosetta::{
        ApiError, BLOCKCHAIN, ErrorKind, FINALITY_TAG_KEY, OPERATION_STATUS_FAIL,
        OPERATION_STATUS_OK, ROSETTA_VERSION, RosettaService, SUB_NETWORK_F3, block_identifier,
        operations::supported_operations,
        timestamp_millis,
        types::{
            Allow, Metadata, MetadataRequest, NetworkIdentifier, NetworkListResponse,
            NetworkOptionsResponse, NetworkRequest, NetworkStatusResponse, OperationStatus, Peer,
            SubNetworkIdentifier, SyncStatus, Version,
        },
    },
};

impl RosettaService {
    /// `/network/list`
    pub async fn network_list(&self, _: MetadataRequest) -> Result<NetworkListResponse, ApiError> {
        let network = NetworkIdentifier {
            blockchain: BLOCKCHAIN.into(),
            network: self.network_name.clone(),
            sub_network_identifier: None,
        };
        let mut network_identifiers = vec![network.clone()];
        if self.options.enable_v2 {
            let mut metadata = Metadata::new();
            metadata.insert(
                FINALITY_TAG_KEY.into(),
                TipsetTag::iter().join("/").into(),
            );
            network_identifiers.push(NetworkIdentifier {
                sub_network_identifier: Some(SubNetworkIdentifier {
                    network: SUB_NETWORK_F3.into(),
                    metadata: Some(metadata),
                }),
                ..network
            });
        }
        Ok(NetworkListResponse {
            network_identifiers,
        })
    }

    /// `/network/status`
    ///
    /// While the node is syncing nothing past genesis can be trusted, so genesis is reported
    /// as the current block.
    pub async fn network_status(
        &self,
        request: NetworkRequest,
    ) -> Result<NetworkStatusResponse, ApiError> {
        let nid = self.validate_network(request.network_identifier.as_ref())?;
        let tag = self.finality_tag(nid)?;
        let status = self.sync_status().await?;

        let genesis = self
            .node
            .chain_get_genesis()
            .await
            .map_err(|e| ErrorKind::UnableToGetGenesisBlk.node(e, true))?;
        let current = match status.is_synced() {
            true => self
                .head(tag)
                .await
                .map_err(|e| ErrorKind::UnableToGetLatestBlk.node(e, true))?,
            false => genesis.clone(),
        };
        let peers = self
            .node
            .net_peers()
            .await
            .map_err(|e| ErrorKind::UnableToGetPeers.node(e, true))?
            .into_iter()
            .map(|it| Peer { peer_id: it.id })
            .collect();

        let explicit_tag = nid.sub_network_identifier.is_some().then_some(tag);
        Ok(NetworkStatusResponse {
            current_block_identifier: block_identifier(&current)?,
            current_block_timestamp: timestamp_millis(&current),
            genesis_block_identifier: block_identifier(&genesis)?,
            sync_status: SyncStatus {
                current_index: status.current_height(),
                target_index: status.target_height(),
                stage: self.describe_stage(status.stage(), explicit_tag),
                synced: status.is_synced(),
            },
            peers,
        })
    }

    /// `/network/options`
    pub async fn network_options(
        &self,
        request: NetworkRequest,
    ) -> Result<NetworkOptionsResponse, ApiError> {
        self.validate_network(request.network_identifier.as_ref())?;
        let node_version = self
            .node
            .version()
            .await
            .map_err(|e| ErrorKind::UnableToGetNodeInfo.node(e, false))?;

        Ok(NetworkOptionsResponse {
            version: Version {
                rosetta_version: ROSETTA_VERSION.into(),
                node_version: node_version.version,
                middleware_version: env!("CARGO_PKG_VERSION").into(),
                metadata: self.f3_metadata(),
            },
            allow: Allow {
                operation_statuses: vec![
                    OperationStatus {
                        status: OPERATION_STATUS_OK.into(),
                        successful: true,
                    },
                    OperationStatus {
                        status: OPERATION_STATUS_FAIL.into(),
                        successful: false,
                    },
                ],
                operation_types: supported_operations(),
                errors: ApiError::all(),
                historical_balance_lookup: true,
            },
        })
    }

    fn f3_metadata(&self) -> Metadata {
        let metadata = match (self.options.enable_v2, self.options.force_safe_f3_finality) {
            (false, _) => json!({
                "f3_enabled": false,
                "f3_reason": "V2 APIs disabled",
            }),
            (true, false) => json!({
                "f3_enabled": true,
                "f3_supported_finality_tags": TipsetTag::iter().map(|it| it.to_string()).collect_vec(),
                "f3_sub_network": SUB_NETWORK_F3,
            }),
            (true, true) => json!({
                "f3_enabled": true,
                "f3_supported_finality_tags": TipsetTag::iter().map(|it| it.to_string()).collect_vec(),
                "f3_sub_network": SUB_NETWORK_F3,
                "force_f3": true,
                "default_f3_finality_tag": TipsetTag::Safe.to_string(),
            }),
        };
        match metadata {
            serde_json::Value::Object(it) => it,
            _ => Metadata::new(),
        }
    }

    /// Sync stage annotated with the finality settings in effect.
    fn describe_stage(&self, stage: SyncStage, tag: Option<TipsetTag>) -> String {
        if !self.options.enable_v2 {
            return format!("{stage} (F3: disabled)");
        }
        let mut description = format!("{stage} (F3: enabled");
        if let Some(tag) = tag {
            description.push_str(&format!(", finality: {tag}"));
        }
        if self.options.force_safe_f3_finality {
            description.push_str(&format!(
                ", force_f3: true, default_f3_finality: {}",
                TipsetTag::Safe
            ));
        }
        description.push(')');
        description
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        rosetta::{
            ServiceOptions,
            tests::{V2, f3_nid, nid, service},
        },
        test_utils::MockNode,
    };

    fn request(nid: NetworkIdentifier) -> NetworkRequest {
        NetworkRequest {
            network_identifier: Some(nid),
        }
    }

    #[tokio::test]
    async fn lists_f3_only_with_v2() {
        let node = Arc::new(MockNode::default());
        let v1 = service(node.clone(), ServiceOptions::default());
        let list = v1.network_list(MetadataRequest::default()).await.unwrap();
        assert_eq!(list.network_identifiers, vec![nid()]);

        let v2 = service(node, V2);
        let list = v2.network_list(MetadataRequest::default()).await.unwrap();
        assert_eq!(list.network_identifiers.len(), 2);
        assert_eq!(
            list.network_identifiers[1].sub_network_identifier,
            f3_nid(Some("latest/safe/finalized")).sub_network_identifier
        );
    }

    #[tokio::test]
    async fn synced_status_reports_the_head() {
        let node = Arc::new(MockNode::with_chain(&[0, 1, 2, 3]));
        node.add_peer("12D3KooWPeer");
        let status = service(node.clone(), ServiceOptions::default())
            .network_status(request(nid()))
            .await
            .unwrap();
        assert_eq!(status.current_block_identifier.index, 3);
        assert_eq!(
            status.current_block_identifier.hash,
            node.tipset(3).key().hash_string().unwrap()
        );
        assert_eq!(
            status.current_block_timestamp,
            (1_598_306_400 + 90) * 1000
        );
        assert_eq!(status.genesis_block_identifier.index, 0);
        assert_eq!(
            status.sync_status,
            SyncStatus {
                current_index: 3,
                target_index: 3,
                stage: "complete (F3: disabled)".into(),
                synced: true,
            }
        );
        assert_eq!(status.peers, vec![Peer {
            peer_id: "12D3KooWPeer".into()
        }]);
    }

    #[tokio::test]
    async fn syncing_status_reports_genesis() {
        let node = Arc::new(MockNode::with_chain(&[0, 1, 2, 3]));
        node.set_sync(SyncStage::Messages, 2, 3);
        let status = service(node, ServiceOptions::default())
            .network_status(request(nid()))
            .await
            .unwrap();
        assert_eq!(status.current_block_identifier, status.genesis_block_identifier);
        assert!(!status.sync_status.synced);
        assert_eq!(status.sync_status.current_index, 2);
        assert_eq!(status.sync_status.stage, "message sync (F3: disabled)");
    }

    #[tokio::test]
    async fn tagged_status_follows_the_tag() {
        let node = Arc::new(MockNode::with_chain(&[0, 1, 2, 3]));
        node.set_tag(TipsetTag::Finalized, 1);
        let service = service(node, V2);
        let status = service
            .network_status(request(f3_nid(Some("finalized"))))
            .await
            .unwrap();
        assert_eq!(status.current_block_identifier.index, 1);
        assert_eq!(
            status.sync_status.stage,
            "complete (F3: enabled, finality: finalized)"
        );

        let status = service.network_status(request(nid())).await.unwrap();
        assert_eq!(status.current_block_identifier.index, 3);
        assert_eq!(status.sync_status.stage, "complete (F3: enabled)");
    }

    #[tokio::test]
    async fn options_list_every_error() {
        let node = Arc::new(MockNode::default());
        let options = service(node.clone(), ServiceOptions::default())
            .network_options(request(nid()))
            .await
            .unwrap();
        assert_eq!(options.version.rosetta_version, "1.4.1");
        assert_eq!(options.version.node_version, "1.34.0+mock");
        assert_eq!(options.version.metadata["f3_enabled"], false);
        assert_eq!(options.allow.errors.len(), 42);
        assert!(options.allow.historical_balance_lookup);
        assert!(options.allow.operation_types.iter().any(|it| it == "Fee"));

        let forced = service(
            node,
            ServiceOptions {
                force_safe_f3_finality: true,
                ..V2
            },
        )
        .network_options(request(nid()))
        .await
        .unwrap();
        assert_eq!(forced.version.metadata["f3_enabled"], true);
        assert_eq!(forced.version.metadata["default_f3_finality_tag"], "safe");
    }

    #[tokio::test]
    async fn status_requires_a_valid_network() {
        let node = Arc::new(MockNode::with_chain(&[0]));
        let err = service(node, ServiceOptions::default())
            .network_status(NetworkRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::MissingNID));
    }
}
