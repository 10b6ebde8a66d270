// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::{fmt, str::FromStr};

use fvm_shared4::address::{
    Address as Address_latest, Error as AddressError, Network, Protocol, set_current_network,
};
use serde::{Deserialize, Serialize};

/// A Filecoin address.
///
/// Parsing accepts both the `f` and `t` prefixes; display uses whatever network was
/// selected with [`CurrentNetwork::set`].
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Address(Address_latest);

impl Address {
    pub const SYSTEM_ACTOR: Address = Address::new_id(0);
    pub const INIT_ACTOR: Address = Address::new_id(1);
    pub const REWARD_ACTOR: Address = Address::new_id(2);
    pub const BURNT_FUNDS_ACTOR: Address = Address::new_id(99);

    pub const fn new_id(id: u64) -> Self {
        Self(Address_latest::new_id(id))
    }

    pub fn is_id(&self) -> bool {
        self.0.protocol() == Protocol::ID
    }

    pub fn protocol(&self) -> Protocol {
        self.0.protocol()
    }

    pub fn from_bytes(bz: &[u8]) -> Result<Self, AddressError> {
        Address_latest::from_bytes(bz).map(Self)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Network::Testnet
            .parse_address(s)
            .or_else(|_| Network::Mainnet.parse_address(s))
            .map(Self)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::ops::Deref for Address {
    type Target = Address_latest;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Address_latest> for Address {
    fn from(other: Address_latest) -> Self {
        Self(other)
    }
}

impl From<Address> for Address_latest {
    fn from(other: Address) -> Self {
        other.0
    }
}

/// The network prefix used when displaying addresses.
pub struct CurrentNetwork;

impl CurrentNetwork {
    /// Lotus reports `mainnet` for the main network, every other name is a test network.
    pub fn set_from_network_name(network_name: &str) {
        Self::set(if network_name == "mainnet" {
            Network::Mainnet
        } else {
            Network::Testnet
        })
    }

    pub fn set(network: Network) {
        set_current_network(network)
    }

    pub fn get() -> Network {
        fvm_shared4::address::current_network()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_either_prefix() {
        let mainnet: Address = "f01234".parse().unwrap();
        let testnet: Address = "t01234".parse().unwrap();
        assert_eq!(mainnet, testnet);
        assert_eq!(mainnet, Address::new_id(1234));
        assert!(mainnet.is_id());
    }

    #[test]
    fn rejects_garbage() {
        assert!("not an address".parse::<Address>().is_err());
        assert!("x01234".parse::<Address>().is_err());
    }
}
