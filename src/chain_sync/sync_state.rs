// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{blocks::Tipset, lotus_json::lotus_json_with_self, shim::clock::ChainEpoch};

/// Stage of a single sync worker, as reported by the node.
///
/// Variants are declared in order of progress, so the derived ordering ranks how far a worker
/// has come. [`SyncStage::Error`] is terminal and never compared.
#[derive(
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Debug,
    Clone,
    Copy,
    Default,
    strum::Display,
    strum::EnumString,
)]
pub enum SyncStage {
    /// Idle state.
    #[default]
    #[strum(to_string = "idle worker")]
    Idle,
    /// Syncing headers from the heaviest tipset to genesis.
    #[strum(to_string = "header sync")]
    Headers,
    /// Persisting headers on chain from heaviest to genesis.
    #[strum(to_string = "persisting headers")]
    PersistHeaders,
    /// Syncing messages and performing state transitions.
    #[strum(to_string = "message sync")]
    Messages,
    /// Sync completed and the worker is following the chain.
    #[strum(to_string = "complete")]
    Complete,
    /// Error has occurred while syncing.
    #[strum(to_string = "error")]
    Error,
}

impl SyncStage {
    /// Maps Lotus' numeric stage. Lotus reports message fetching as its own stage (6).
    pub fn from_lotus_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => SyncStage::Idle,
            1 => SyncStage::Headers,
            2 => SyncStage::PersistHeaders,
            3 | 6 => SyncStage::Messages,
            4 => SyncStage::Complete,
            5 => SyncStage::Error,
            _ => return None,
        })
    }

    pub fn lotus_code(self) -> u8 {
        match self {
            SyncStage::Idle => 0,
            SyncStage::Headers => 1,
            SyncStage::PersistHeaders => 2,
            SyncStage::Messages => 3,
            SyncStage::Complete => 4,
            SyncStage::Error => 5,
        }
    }
}

impl Serialize for SyncStage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.lotus_code())
    }
}

impl<'de> Deserialize<'de> for SyncStage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u8::deserialize(deserializer)?;
        Self::from_lotus_code(code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown sync stage {code}")))
    }
}

/// One sync worker.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActiveSync {
    #[serde(rename = "WorkerID", default)]
    pub worker_id: u64,
    #[serde(default)]
    pub base: Option<Tipset>,
    #[serde(default)]
    pub target: Option<Tipset>,
    pub stage: SyncStage,
    pub height: ChainEpoch,
    #[serde(default)]
    pub message: String,
}

impl ActiveSync {
    pub fn target_height(&self) -> Option<ChainEpoch> {
        self.target.as_ref().map(Tipset::epoch)
    }
}

/// Output of `Filecoin.SyncState`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SyncState {
    #[serde(with = "crate::lotus_json", default)]
    pub active_syncs: Vec<ActiveSync>,
    #[serde(rename = "VMApplied", default)]
    pub vm_applied: u64,
}

lotus_json_with_self!(ActiveSync, SyncState);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn stage_names_match_lotus() {
        assert_eq!(SyncStage::Messages.to_string(), "message sync");
        assert_eq!("complete".parse::<SyncStage>().unwrap(), SyncStage::Complete);
    }

    #[test]
    fn deserializes_lotus_sync_state() {
        let json = serde_json::json!({
            "ActiveSyncs": [
                {"WorkerID": 1, "Base": null, "Target": null, "Stage": 6, "Height": 0,
                 "Start": "0001-01-01T00:00:00Z", "End": "0001-01-01T00:00:00Z", "Message": ""},
                {"WorkerID": 2, "Base": null, "Target": null, "Stage": 4, "Height": 12}
            ],
            "VMApplied": 3
        });
        let state: SyncState = serde_json::from_value(json).unwrap();
        let stages: Vec<_> = state.active_syncs.iter().map(|it| it.stage).collect();
        assert_eq!(stages, vec![SyncStage::Messages, SyncStage::Complete]);
        assert_eq!(state.active_syncs[1].height, 12);
    }

    #[test]
    fn rejects_unknown_stage() {
        assert!(serde_json::from_value::<SyncStage>(serde_json::json!(42)).is_err());
    }
}
