// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Lotus speaks a JSON dialect with its own conventions:
//! - CIDs are `{"/": "bafy..."}`.
//! - Token amounts and big integers are decimal strings.
//! - Bytes are standard base64.
//! - Empty arrays are frequently `null`.
//!
//! Domain types opt into that encoding by implementing [`HasLotusJson`], and are then used in
//! wire structs either through `#[serde(with = "crate::lotus_json")]` or by wrapping them in
//! [`LotusJson`].
//!
//! ```
//! # use forest_rosetta::lotus_json::LotusJson;
//! let cid: LotusJson<cid::Cid> = serde_json::from_str(r#"{"/": "baeaaaaa"}"#).unwrap();
//! assert_eq!(cid.into_inner(), cid::Cid::default());
//! ```

use std::{fmt::Display, str::FromStr};

use derive_more::From;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::DeserializeOwned};
#[cfg(test)]
use serde_json::json;
#[cfg(test)]
use {pretty_assertions::assert_eq, quickcheck::quickcheck};

pub trait HasLotusJson: Sized {
    /// The struct representing JSON. You should `#[derive(Deserialize, Serialize)]` on it.
    type LotusJson: Serialize + DeserializeOwned;
    /// Snapshots of the JSON, and the domain type it should (de)serialize to.
    #[cfg(test)]
    fn snapshots() -> Vec<(serde_json::Value, Self)>;
    fn into_lotus_json(self) -> Self::LotusJson;
    fn from_lotus_json(lotus_json: Self::LotusJson) -> Self;
    fn into_lotus_json_value(self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self.into_lotus_json())
    }
}

macro_rules! decl_and_test {
    ($($mod_name:ident for $domain_ty:ty),* $(,)?) => {
        $(
            mod $mod_name;
        )*
        #[test]
        fn all_snapshots() {
            $(
                assert_all_snapshots::<$domain_ty>();
            )*
        }
    }
}

decl_and_test!(
    address for crate::shim::address::Address,
    cid for ::cid::Cid,
    tipset_keys for crate::blocks::TipsetKey,
    token_amount for crate::shim::econ::TokenAmount,
    vec_u8 for Vec<u8>,
);

mod opt; // can't make snapshots of generic type
mod vec; // can't make snapshots of generic type

pub use vec::*;

#[cfg(test)]
pub fn assert_all_snapshots<T>()
where
    T: HasLotusJson + PartialEq + std::fmt::Debug + Clone,
{
    let snapshots = T::snapshots();
    assert!(!snapshots.is_empty());
    for (lotus_json, val) in snapshots {
        assert_one_snapshot(lotus_json, val);
    }
}

#[cfg(test)]
pub fn assert_one_snapshot<T>(lotus_json: serde_json::Value, val: T)
where
    T: HasLotusJson + PartialEq + std::fmt::Debug + Clone,
{
    // T -> T::LotusJson -> lotus_json
    let serialized = val.clone().into_lotus_json_value().unwrap();
    assert_eq!(
        serialized.to_string(),
        lotus_json.to_string(),
        "snapshot failed for {}",
        std::any::type_name::<T>()
    );

    // lotus_json -> T::LotusJson -> T
    let deserialized = match serde_json::from_value::<T::LotusJson>(lotus_json.clone()) {
        Ok(lotus_json) => T::from_lotus_json(lotus_json),
        Err(e) => panic!(
            "couldn't deserialize a {} from {}: {e}",
            std::any::type_name::<T::LotusJson>(),
            lotus_json
        ),
    };
    assert_eq!(deserialized, val);
}

/// Usage: `#[serde(with = "base64_standard")]`
pub mod base64_standard {
    use super::*;

    use base64::engine::{Engine as _, general_purpose::STANDARD};

    pub fn serialize<S>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        STANDARD.encode(value).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        STANDARD
            .decode(String::deserialize(deserializer)?)
            .map_err(serde::de::Error::custom)
    }
}

/// Usage: `#[serde(with = "stringify")]`
pub mod stringify {
    use super::*;

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}

/// Usage: `#[serde(with = "crate::lotus_json")]`
pub fn serialize<S, T>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: HasLotusJson + Clone,
{
    value.clone().into_lotus_json().serialize(serializer)
}

/// Usage: `#[serde(with = "crate::lotus_json")]`
pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: HasLotusJson,
{
    Ok(T::from_lotus_json(Deserialize::deserialize(deserializer)?))
}

/// A domain struct that is (de) serialized through its lotus JSON representation.
#[derive(Debug, Deserialize, From, Serialize, Clone, PartialEq)]
#[serde(bound = "T: HasLotusJson + Clone", transparent)]
pub struct LotusJson<T>(#[serde(with = "self")] pub T);

impl<T> LotusJson<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

macro_rules! lotus_json_with_self {
    ($($domain_ty:ty),* $(,)?) => {
        $(
            impl $crate::lotus_json::HasLotusJson for $domain_ty {
                type LotusJson = Self;
                #[cfg(test)]
                fn snapshots() -> Vec<(serde_json::Value, Self)> {
                    unimplemented!("tests are trivial for HasLotusJson<LotusJson = Self>")
                }
                fn into_lotus_json(self) -> Self::LotusJson {
                    self
                }
                fn from_lotus_json(lotus_json: Self::LotusJson) -> Self {
                    lotus_json
                }
            }
        )*
    }
}
pub(crate) use lotus_json_with_self;

lotus_json_with_self!(u32, u64, i64, String, bool, (), serde_json::Value);

/// RPC parameters are positional, so tuples of Lotus JSON types are Lotus JSON arrays.
macro_rules! lotus_json_tuple {
    ($($ty:ident . $idx:tt),+) => {
        impl<$($ty: HasLotusJson),+> HasLotusJson for ($($ty,)+) {
            type LotusJson = ($($ty::LotusJson,)+);
            #[cfg(test)]
            fn snapshots() -> Vec<(serde_json::Value, Self)> {
                unimplemented!("covered by the snapshots of the members")
            }
            fn into_lotus_json(self) -> Self::LotusJson {
                ($(self.$idx.into_lotus_json(),)+)
            }
            fn from_lotus_json(lotus_json: Self::LotusJson) -> Self {
                ($($ty::from_lotus_json(lotus_json.$idx),)+)
            }
        }
    };
}

lotus_json_tuple!(A.0);
lotus_json_tuple!(A.0, B.1);
lotus_json_tuple!(A.0, B.1, C.2);
lotus_json_tuple!(A.0, B.1, C.2, D.3);

#[cfg(test)]
quickcheck! {
    fn bytes_survive_the_wire(val: Vec<u8>) -> bool {
        let json = serde_json::to_value(LotusJson(val.clone())).unwrap();
        serde_json::from_value::<LotusJson<Vec<u8>>>(json).unwrap().into_inner() == val
    }

    fn rpc_params_are_arrays(epoch: i64, flag: bool) -> bool {
        (epoch, flag).into_lotus_json_value().unwrap() == json!([epoch, flag])
    }
}

#[test]
fn strings_must_parse() {
    use crate::shim::{address::Address, econ::TokenAmount};

    assert!(serde_json::from_value::<LotusJson<Address>>(json!("not an address")).is_err());
    assert!(serde_json::from_value::<LotusJson<TokenAmount>>(json!("1.5")).is_err());
    assert!(serde_json::from_value::<LotusJson<TokenAmount>>(json!(15)).is_err());
    assert_eq!(
        serde_json::to_value(LotusJson(TokenAmount::from_atto(15))).unwrap(),
        json!("15")
    );
}
