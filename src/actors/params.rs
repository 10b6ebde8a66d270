// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! CBOR parameters and return values of the few methods whose payload matters for value
//! attribution.

use fvm_ipld_encoding::tuple::*;

use crate::shim::address::Address;

/// Return value of `Init::Exec` and `Init::Exec4`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize_tuple, Deserialize_tuple)]
pub struct ExecReturn {
    pub id_address: Address,
    pub robust_address: Address,
}

/// Parameters of `Multisig::SwapSigner`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize_tuple, Deserialize_tuple)]
pub struct SwapSignerParams {
    pub from: Address,
    pub to: Address,
}

pub fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> anyhow::Result<T> {
    Ok(fvm_ipld_encoding::from_slice(bytes)?)
}
