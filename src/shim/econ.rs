// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

pub use fvm_shared4::econ::TokenAmount;

/// Atto-FIL as a signed decimal string, negated when `negative` is set. Zero is always `"0"`.
pub fn atto_string(amount: &TokenAmount, negative: bool) -> String {
    if negative {
        (-amount.atto()).to_string()
    } else {
        amount.atto().to_string()
    }
}
