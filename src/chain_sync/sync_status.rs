// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use itertools::Itertools as _;

use super::{SyncStage, SyncState};
use crate::shim::clock::ChainEpoch;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SyncStatusError {
    #[error("no sync worker has a target, sync status is unknown")]
    NoWorkers,
}

/// Node-wide sync progress folded from the per-worker states.
///
/// Built fresh from every `SyncState` response, never cached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncStatus {
    current_heights: Vec<ChainEpoch>,
    target_heights: Vec<ChainEpoch>,
    stage: SyncStage,
}

impl SyncStatus {
    /// Workers without a target tipset are not syncing anything and are skipped.
    ///
    /// The global stage is [`SyncStage::Error`] if any worker errored, [`SyncStage::Complete`] if
    /// all completed, and the furthest non-complete stage otherwise.
    pub fn evaluate(state: &SyncState) -> Result<Self, SyncStatusError> {
        let workers = state
            .active_syncs
            .iter()
            .filter(|it| it.target.is_some())
            .collect_vec();
        if workers.is_empty() {
            return Err(SyncStatusError::NoWorkers);
        }

        let stages = workers.iter().map(|it| it.stage).collect_vec();
        let stage = if stages.contains(&SyncStage::Error) {
            SyncStage::Error
        } else if stages.iter().all(|it| *it == SyncStage::Complete) {
            SyncStage::Complete
        } else {
            stages
                .iter()
                .copied()
                .filter(|it| *it != SyncStage::Complete)
                .max()
                .unwrap_or_default()
        };

        Ok(Self {
            current_heights: workers.iter().map(|it| it.height).collect(),
            target_heights: workers.iter().filter_map(|it| it.target_height()).collect(),
            stage,
        })
    }

    pub fn stage(&self) -> SyncStage {
        self.stage
    }

    pub fn is_synced(&self) -> bool {
        self.stage == SyncStage::Complete
    }

    pub fn is_errored(&self) -> bool {
        self.stage == SyncStage::Error
    }

    /// Heights are meaningless before message sync starts: `0` until then, `-1` on error.
    pub fn current_height(&self) -> ChainEpoch {
        match self.stage {
            SyncStage::Error => -1,
            SyncStage::Messages | SyncStage::Complete => {
                self.current_heights.iter().copied().max().unwrap_or_default()
            }
            _ => 0,
        }
    }

    pub fn target_height(&self) -> ChainEpoch {
        self.target_heights.iter().copied().max().unwrap_or_default()
    }

    pub fn current_heights(&self) -> &[ChainEpoch] {
        &self.current_heights
    }

    pub fn target_heights(&self) -> &[ChainEpoch] {
        &self.target_heights
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{chain_sync::ActiveSync, test_utils::tipset_at};
    use pretty_assertions::assert_eq;

    fn worker(stage: SyncStage, height: ChainEpoch, target: ChainEpoch) -> ActiveSync {
        ActiveSync {
            target: Some(tipset_at(target)),
            stage,
            height,
            ..Default::default()
        }
    }

    fn evaluate(workers: Vec<ActiveSync>) -> Result<SyncStatus, SyncStatusError> {
        SyncStatus::evaluate(&SyncState {
            active_syncs: workers,
            vm_applied: 0,
        })
    }

    #[test]
    fn all_complete_is_complete() {
        let status = evaluate(vec![
            worker(SyncStage::Complete, 100, 100),
            worker(SyncStage::Complete, 99, 100),
        ])
        .unwrap();
        assert_eq!(status.stage(), SyncStage::Complete);
        assert!(status.is_synced());
        assert_eq!(status.current_height(), 100);
        assert_eq!(status.target_height(), 100);
    }

    #[test]
    fn any_error_is_error() {
        let status = evaluate(vec![
            worker(SyncStage::Complete, 100, 100),
            worker(SyncStage::Error, 50, 100),
        ])
        .unwrap();
        assert!(status.is_errored());
        assert_eq!(status.current_height(), -1);
        assert_eq!(status.target_height(), 100);
    }

    #[test]
    fn furthest_non_complete_stage_wins() {
        let status = evaluate(vec![
            worker(SyncStage::Idle, 0, 10),
            worker(SyncStage::Headers, 0, 20),
        ])
        .unwrap();
        assert_eq!(status.stage(), SyncStage::Headers);
        assert_eq!(status.current_height(), 0);
        assert_eq!(status.target_height(), 20);

        let status = evaluate(vec![
            worker(SyncStage::Complete, 100, 100),
            worker(SyncStage::Messages, 80, 120),
        ])
        .unwrap();
        assert_eq!(status.stage(), SyncStage::Messages);
        assert!(!status.is_synced());
        assert_eq!(status.current_height(), 100);
        assert_eq!(status.target_height(), 120);
    }

    #[test]
    fn no_workers_is_unknown() {
        assert_eq!(evaluate(vec![]), Err(SyncStatusError::NoWorkers));
        let idle = ActiveSync {
            stage: SyncStage::Complete,
            height: 100,
            ..Default::default()
        };
        assert_eq!(evaluate(vec![idle]), Err(SyncStatusError::NoWorkers));
    }
}
