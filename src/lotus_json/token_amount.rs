// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::*;

use crate::shim::econ::TokenAmount;

#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenAmountLotusJson {
    #[serde(with = "stringify")]
    attos: num::BigInt,
}

impl HasLotusJson for TokenAmount {
    type LotusJson = TokenAmountLotusJson;

    #[cfg(test)]
    fn snapshots() -> Vec<(serde_json::Value, Self)> {
        vec![
            (json!("1"), TokenAmount::from_atto(1)),
            (json!("-5000"), TokenAmount::from_atto(-5000)),
        ]
    }

    fn into_lotus_json(self) -> Self::LotusJson {
        TokenAmountLotusJson {
            attos: self.atto().clone(),
        }
    }

    fn from_lotus_json(TokenAmountLotusJson { attos }: Self::LotusJson) -> Self {
        Self::from_atto(attos)
    }
}
