// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::*;
use crate::blocks::TipsetKey;
use ::cid::Cid;

/// Unlike other slices, a tipset key is sent as `[]` when empty.
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct TipsetKeyLotusJson(Option<Vec<LotusJson<Cid>>>);

impl HasLotusJson for TipsetKey {
    type LotusJson = TipsetKeyLotusJson;

    #[cfg(test)]
    fn snapshots() -> Vec<(serde_json::Value, Self)> {
        vec![
            (json!([{"/": "baeaaaaa"}]), vec![Cid::default()].into()),
            (json!([]), TipsetKey::default()),
        ]
    }

    fn into_lotus_json(self) -> Self::LotusJson {
        TipsetKeyLotusJson(Some(self.into_cids().into_iter().map(LotusJson).collect()))
    }

    fn from_lotus_json(TipsetKeyLotusJson(cids): Self::LotusJson) -> Self {
        cids.unwrap_or_default()
            .into_iter()
            .map(LotusJson::into_inner)
            .collect::<Vec<_>>()
            .into()
    }
}
