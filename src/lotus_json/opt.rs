// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::*;

impl<T> HasLotusJson for Option<T>
where
    T: HasLotusJson,
{
    type LotusJson = Option<T::LotusJson>;

    #[cfg(test)]
    fn snapshots() -> Vec<(serde_json::Value, Self)> {
        unimplemented!("see the snapshots below")
    }

    fn into_lotus_json(self) -> Self::LotusJson {
        self.map(T::into_lotus_json)
    }

    fn from_lotus_json(lotus_json: Self::LotusJson) -> Self {
        lotus_json.map(T::from_lotus_json)
    }
}

#[test]
fn snapshots() {
    use crate::shim::econ::TokenAmount;

    // `StateGetActor` answers `null` for addresses without an actor
    assert_one_snapshot(json!("1000"), Some(TokenAmount::from_atto(1000)));
    assert_one_snapshot(json!(null), None::<TokenAmount>);
}
