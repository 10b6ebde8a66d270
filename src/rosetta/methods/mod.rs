// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! One module per Rosetta API group. Every endpoint is an async method on
//! [`RosettaService`](super::RosettaService) taking the parsed request.

mod account;
mod block;
mod construction;
mod mempool;
mod network;
