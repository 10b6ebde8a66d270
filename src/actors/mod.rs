// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Maps actor code CIDs to builtin actors and their methods.
//!
//! Codes are resolved by an ordered list of [`CodeResolver`]s: bundle manifests first, newest
//! to oldest, then the `fil/<version>/<name>` identity codes used before bundles existed.

mod methods;
pub mod params;

use std::{collections::BTreeMap, sync::LazyLock};

use ahash::HashMap;
use cid::Cid;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator as _;

pub use methods::{FIRST_EXPORTED_METHOD_NUMBER, Method, methods_of};

use crate::shim::MethodNum;

pub type ActorVersion = u32;

/// Reported for codes and methods the registry doesn't know.
pub const UNKNOWN: &str = "Unknown";

const RAW: u64 = 0x55;
const IDENTITY_HASH: u64 = 0x0;

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BuiltinActor {
    System,
    Init,
    Cron,
    Account,
    StoragePower,
    StorageMiner,
    StorageMarket,
    PaymentChannel,
    Multisig,
    Reward,
    VerifiedRegistry,
    DataCap,
    Evm,
    Eam,
    EthAccount,
    Placeholder,
}

impl BuiltinActor {
    /// Actors that accept any exported method, forwarding value like a plain send.
    pub fn is_account_like(self) -> bool {
        matches!(
            self,
            BuiltinActor::Account | BuiltinActor::EthAccount | BuiltinActor::Placeholder
        )
    }

    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// What a code CID stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActorDescriptor {
    pub code: Cid,
    pub version: ActorVersion,
    pub actor: BuiltinActor,
}

impl ActorDescriptor {
    pub fn methods(&self) -> impl Iterator<Item = &'static Method> + '_ {
        methods_of(self.actor)
            .iter()
            .filter(|it| it.exists_in(self.version))
    }

    pub fn method_name(&self, num: MethodNum) -> Option<&'static str> {
        self.methods().find(|it| it.num == num).map(|it| it.name)
    }
}

#[derive(Debug, Deserialize)]
struct BundleManifest {
    version: ActorVersion,
    #[allow(dead_code)]
    network: String,
    actors: BTreeMap<BuiltinActor, String>,
}

static EMBEDDED_MANIFESTS: LazyLock<Vec<BundleManifest>> = LazyLock::new(|| {
    serde_yaml::from_str(include_str!("actor_codes.yaml")).expect("embedded manifests are valid")
});

#[derive(Clone, Debug)]
enum CodeResolver {
    /// Codes of one or more released bundles.
    Manifest(HashMap<Cid, ActorDescriptor>),
    /// Identity-hashed `fil/<version>/<name>` codes of actors v0 to v7.
    Legacy,
}

impl CodeResolver {
    fn resolve(&self, code: &Cid) -> Option<ActorDescriptor> {
        match self {
            CodeResolver::Manifest(codes) => codes.get(code).copied(),
            CodeResolver::Legacy => resolve_legacy(code),
        }
    }
}

fn resolve_legacy(code: &Cid) -> Option<ActorDescriptor> {
    if code.codec() != RAW || code.hash().code() != IDENTITY_HASH {
        return None;
    }
    let path = std::str::from_utf8(code.hash().digest()).ok()?;
    let mut segments = path.split('/');
    let (Some("fil"), Some(version), Some(name), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return None;
    };
    // there never was a `fil/0/...`, actors v0 went by `fil/1/...`
    let version = match version.parse::<ActorVersion>().ok()? {
        1 => 0,
        n => n,
    };
    Some(ActorDescriptor {
        code: *code,
        version,
        actor: name.parse().ok()?,
    })
}

/// Static after start-up, shared by all requests.
#[derive(Clone, Debug)]
pub struct ActorRegistry {
    resolvers: Vec<CodeResolver>,
}

impl Default for ActorRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ActorRegistry {
    /// Registry of the bundles known at build time.
    pub fn builtin() -> Self {
        let mut codes = HashMap::default();
        for manifest in EMBEDDED_MANIFESTS.iter() {
            for (actor, code) in &manifest.actors {
                let code: Cid = code.parse().expect("embedded manifests are valid");
                codes.entry(code).or_insert(ActorDescriptor {
                    code,
                    version: manifest.version,
                    actor: *actor,
                });
            }
        }
        Self {
            resolvers: vec![CodeResolver::Manifest(codes), CodeResolver::Legacy],
        }
    }

    /// Registers a bundle manifest, as returned by `Filecoin.StateActorCodeCIDs`, ahead of
    /// everything already known. Names of actors this crate doesn't know are skipped.
    pub fn with_manifest(
        mut self,
        version: ActorVersion,
        codes: impl IntoIterator<Item = (String, Cid)>,
    ) -> Self {
        let codes: HashMap<_, _> = codes
            .into_iter()
            .filter_map(|(name, code)| match name.parse::<BuiltinActor>() {
                Ok(actor) => Some((
                    code,
                    ActorDescriptor {
                        code,
                        version,
                        actor,
                    },
                )),
                Err(_) => {
                    tracing::debug!(%name, %code, "skipping unknown actor");
                    None
                }
            })
            .collect();
        self.resolvers.insert(0, CodeResolver::Manifest(codes));
        self
    }

    pub fn resolve(&self, code: &Cid) -> Option<ActorDescriptor> {
        self.resolvers.iter().find_map(|it| it.resolve(code))
    }

    /// The actor's name, or [`UNKNOWN`].
    pub fn resolve_name(&self, code: &Cid) -> &'static str {
        self.resolve(code)
            .map(|it| it.actor.name())
            .unwrap_or(UNKNOWN)
    }

    /// Methods of the newest version of the named actor.
    pub fn method_table(&self, actor_name: &str) -> Option<BTreeMap<MethodNum, &'static str>> {
        let actor = actor_name.parse::<BuiltinActor>().ok()?;
        let newest = self.newest_version();
        Some(
            methods_of(actor)
                .iter()
                .filter(|it| it.exists_in(newest))
                .map(|it| (it.num, it.name))
                .collect(),
        )
    }

    /// Looks `num` up in every table of every actor. Used for exported methods invoked on
    /// account-like actors, which don't declare them.
    pub fn find_method_in_all_actors(&self, num: MethodNum) -> Option<&'static str> {
        BuiltinActor::iter()
            .flat_map(methods_of)
            .find(|it| it.num == num)
            .map(|it| it.name)
    }

    fn newest_version(&self) -> ActorVersion {
        self.resolvers
            .iter()
            .filter_map(|it| match it {
                CodeResolver::Manifest(codes) => codes.values().map(|it| it.version).max(),
                CodeResolver::Legacy => None,
            })
            .max()
            .unwrap_or_default()
    }
}

/// Actors version shipped with a network version. Versions before bundles (nv16) are not
/// served by `StateActorCodeCIDs`.
pub fn actor_version_for(network_version: u32) -> Option<ActorVersion> {
    Some(match network_version {
        16 => 8,
        17 => 9,
        18 => 10,
        19 | 20 => 11,
        21 => 12,
        22 => 13,
        23 => 14,
        24 => 15,
        nv if nv >= 25 => 16,
        _ => return None,
    })
}
