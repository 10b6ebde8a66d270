// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Unsigned and signed messages in their Lotus JSON shape.

use anyhow::Context as _;
use cid::Cid;
use fvm_ipld_encoding::{DAG_CBOR, RawBytes};
use fvm_shared4::crypto::signature::{Signature as Signature_latest, SignatureType};
use multihash_codetable::{Code, MultihashDigest as _};
use serde::{Deserialize, Serialize};

use crate::{
    lotus_json::lotus_json_with_self,
    shim::{MethodNum, address::Address, econ::TokenAmount},
};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Message {
    #[serde(default)]
    pub version: u64,
    #[serde(with = "crate::lotus_json")]
    pub to: Address,
    #[serde(with = "crate::lotus_json")]
    pub from: Address,
    pub nonce: u64,
    #[serde(with = "crate::lotus_json")]
    pub value: TokenAmount,
    pub gas_limit: u64,
    #[serde(with = "crate::lotus_json")]
    pub gas_fee_cap: TokenAmount,
    #[serde(with = "crate::lotus_json")]
    pub gas_premium: TokenAmount,
    pub method: MethodNum,
    #[serde(with = "crate::lotus_json", default)]
    pub params: Vec<u8>,
    #[serde(
        rename = "CID",
        with = "crate::lotus_json",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub cid: Option<Cid>,
}

lotus_json_with_self!(Message);

impl Message {
    fn to_fvm(&self) -> fvm_shared4::message::Message {
        fvm_shared4::message::Message {
            version: self.version,
            from: self.from.into(),
            to: self.to.into(),
            sequence: self.nonce,
            value: self.value.clone(),
            method_num: self.method,
            params: RawBytes::new(self.params.clone()),
            gas_limit: self.gas_limit,
            gas_fee_cap: self.gas_fee_cap.clone(),
            gas_premium: self.gas_premium.clone(),
        }
    }

    /// The CID Lotus assigned, or the one derived from the `DAG-CBOR` encoding.
    pub fn cid(&self) -> anyhow::Result<Cid> {
        match self.cid {
            Some(cid) => Ok(cid),
            None => cbor_blake2b256_cid(&self.to_fvm()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Signature {
    pub r#type: u8,
    #[serde(with = "crate::lotus_json")]
    pub data: Vec<u8>,
}

impl Signature {
    pub const SECP256K1: u8 = 1;
    pub const BLS: u8 = 2;
    pub const DELEGATED: u8 = 3;

    fn to_fvm(&self) -> anyhow::Result<Signature_latest> {
        let sig_type = match self.r#type {
            Self::SECP256K1 => SignatureType::Secp256k1,
            Self::BLS => SignatureType::BLS,
            Self::DELEGATED => anyhow::bail!("delegated signatures have no CID derivation"),
            other => anyhow::bail!("unknown signature type {other}"),
        };
        Ok(Signature_latest {
            sig_type,
            bytes: self.data.clone(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SignedMessage {
    pub message: Message,
    pub signature: Signature,
    #[serde(
        rename = "CID",
        with = "crate::lotus_json",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub cid: Option<Cid>,
}

lotus_json_with_self!(SignedMessage);

impl SignedMessage {
    /// BLS messages are identified by the unsigned message, every other kind by the
    /// message and signature pair.
    pub fn cid(&self) -> anyhow::Result<Cid> {
        if let Some(cid) = self.cid {
            return Ok(cid);
        }
        if self.signature.r#type == Signature::BLS {
            return self.message.cid();
        }
        cbor_blake2b256_cid(&(self.message.to_fvm(), self.signature.to_fvm()?))
    }
}

fn cbor_blake2b256_cid<T: Serialize>(value: &T) -> anyhow::Result<Cid> {
    let bytes = fvm_ipld_encoding::to_vec(value).context("couldn't encode message")?;
    Ok(Cid::new_v1(DAG_CBOR, Code::Blake2b256.digest(&bytes)))
}
