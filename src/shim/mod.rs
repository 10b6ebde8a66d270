// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Thin wrappers over `fvm_shared` so the rest of the crate has a single place to
//! pick the Filecoin primitive types from.

pub mod address;
pub mod econ;

pub mod clock {
    pub use fvm_shared4::clock::ChainEpoch;
}

pub mod error {
    pub use fvm_shared4::error::ExitCode;
}

pub use fvm_shared4::MethodNum;
