// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod sync_state;
mod sync_status;

pub use sync_state::{ActiveSync, SyncStage, SyncState};
pub use sync_status::{SyncStatus, SyncStatusError};
