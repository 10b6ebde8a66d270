// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Exported method numbers of the builtin actors.
//!
//! Numbers at or above [`FIRST_EXPORTED_METHOD_NUMBER`] follow FRC-0042 and are callable by
//! anyone, starting with actors v10.

use super::{ActorVersion, BuiltinActor};
use crate::shim::MethodNum;

pub const FIRST_EXPORTED_METHOD_NUMBER: MethodNum = 1 << 24;

/// Actors v10 introduced FRC-0042 exported methods.
const FRC42: ActorVersion = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Method {
    pub num: MethodNum,
    pub name: &'static str,
    since: ActorVersion,
    until: Option<ActorVersion>,
}

impl Method {
    const fn new(num: MethodNum, name: &'static str) -> Self {
        Self {
            num,
            name,
            since: 0,
            until: None,
        }
    }

    const fn since(self, version: ActorVersion) -> Self {
        Self {
            since: version,
            ..self
        }
    }

    const fn until(self, version: ActorVersion) -> Self {
        Self {
            until: Some(version),
            ..self
        }
    }

    pub fn exists_in(&self, version: ActorVersion) -> bool {
        version >= self.since && self.until.is_none_or(|until| version <= until)
    }
}

const SYSTEM: &[Method] = &[Method::new(1, "Constructor")];

const INIT: &[Method] = &[
    Method::new(1, "Constructor"),
    Method::new(2, "Exec"),
    Method::new(3, "Exec4").since(FRC42),
];

const CRON: &[Method] = &[Method::new(1, "Constructor"), Method::new(2, "EpochTick")];

const ACCOUNT: &[Method] = &[
    Method::new(1, "Constructor"),
    Method::new(2, "PubkeyAddress"),
    Method::new(3, "AuthenticateMessage").since(9).until(9),
    Method::new(2643134072, "AuthenticateMessageExported").since(FRC42),
    Method::new(3726118371, "UniversalReceiverHook").since(FRC42),
];

const STORAGE_POWER: &[Method] = &[
    Method::new(1, "Constructor"),
    Method::new(2, "CreateMiner"),
    Method::new(3, "UpdateClaimedPower"),
    Method::new(4, "EnrollCronEvent"),
    Method::new(5, "OnEpochTickEnd"),
    Method::new(6, "UpdatePledgeTotal"),
    Method::new(7, "OnConsensusFault").until(2),
    Method::new(8, "SubmitPoRepForBulkVerify"),
    Method::new(9, "CurrentTotalPower"),
    Method::new(1173380165, "CreateMinerExported").since(FRC42),
];

const STORAGE_MINER: &[Method] = &[
    Method::new(1, "Constructor"),
    Method::new(2, "ControlAddresses"),
    Method::new(3, "ChangeWorkerAddress"),
    Method::new(4, "ChangePeerID"),
    Method::new(5, "SubmitWindowedPoSt"),
    Method::new(6, "PreCommitSector"),
    Method::new(7, "ProveCommitSector"),
    Method::new(8, "ExtendSectorExpiration"),
    Method::new(9, "TerminateSectors"),
    Method::new(10, "DeclareFaults"),
    Method::new(11, "DeclareFaultsRecovered"),
    Method::new(12, "OnDeferredCronEvent"),
    Method::new(13, "CheckSectorProven"),
    Method::new(14, "ApplyRewards"),
    Method::new(15, "ReportConsensusFault"),
    Method::new(16, "WithdrawBalance"),
    Method::new(17, "ConfirmSectorProofsValid"),
    Method::new(18, "ChangeMultiaddrs"),
    Method::new(19, "CompactPartitions"),
    Method::new(20, "CompactSectorNumbers"),
    Method::new(21, "ConfirmUpdateWorkerKey"),
    Method::new(22, "RepayDebt"),
    Method::new(23, "ChangeOwnerAddress"),
    Method::new(24, "DisputeWindowedPoSt").since(3),
    Method::new(25, "PreCommitSectorBatch").since(5),
    Method::new(26, "ProveCommitAggregate").since(5),
    Method::new(27, "ProveReplicaUpdates").since(7),
    Method::new(28, "PreCommitSectorBatch2").since(9),
    Method::new(29, "ProveReplicaUpdates2").since(9),
    Method::new(30, "ChangeBeneficiary").since(9),
    Method::new(31, "GetBeneficiary").since(9),
    Method::new(32, "ExtendSectorExpiration2").since(9),
    Method::new(2280458852, "WithdrawBalanceExported").since(FRC42),
    Method::new(1010589339, "ChangeWorkerAddressExported").since(FRC42),
    Method::new(1716466614, "ChangePeerIDExported").since(FRC42),
    Method::new(1063480576, "ChangeMultiaddrsExported").since(FRC42),
    Method::new(2354970453, "ConfirmChangeWorkerAddressExported").since(FRC42),
    Method::new(3665352697, "RepayDebtExported").since(FRC42),
];

const STORAGE_MARKET: &[Method] = &[
    Method::new(1, "Constructor"),
    Method::new(2, "AddBalance"),
    Method::new(3, "WithdrawBalance"),
    Method::new(4, "PublishStorageDeals"),
    Method::new(5, "VerifyDealsForActivation"),
    Method::new(6, "ActivateDeals"),
    Method::new(7, "OnMinerSectorsTerminate"),
    Method::new(8, "ComputeDataCommitment"),
    Method::new(9, "CronTick"),
    Method::new(822473126, "AddBalanceExported").since(FRC42),
    Method::new(2280458852, "WithdrawBalanceExported").since(FRC42),
    Method::new(2236929350, "PublishStorageDealsExported").since(FRC42),
];

const PAYMENT_CHANNEL: &[Method] = &[
    Method::new(1, "Constructor"),
    Method::new(2, "UpdateChannelState"),
    Method::new(3, "Settle"),
    Method::new(4, "Collect"),
];

const MULTISIG: &[Method] = &[
    Method::new(1, "Constructor"),
    Method::new(2, "Propose"),
    Method::new(3, "Approve"),
    Method::new(4, "Cancel"),
    Method::new(5, "AddSigner"),
    Method::new(6, "RemoveSigner"),
    Method::new(7, "SwapSigner"),
    Method::new(8, "ChangeNumApprovalsThreshold"),
    Method::new(9, "LockBalance").since(2),
    Method::new(3726118371, "UniversalReceiverHook").since(FRC42),
];

const REWARD: &[Method] = &[
    Method::new(1, "Constructor"),
    Method::new(2, "AwardBlockReward"),
    Method::new(3, "ThisEpochReward"),
    Method::new(4, "UpdateNetworkKPI"),
];

const VERIFIED_REGISTRY: &[Method] = &[
    Method::new(1, "Constructor"),
    Method::new(2, "AddVerifier"),
    Method::new(3, "RemoveVerifier"),
    Method::new(4, "AddVerifiedClient"),
    Method::new(5, "UseBytes").until(8),
    Method::new(6, "RestoreBytes").until(8),
    Method::new(7, "RemoveVerifiedClientDataCap"),
    Method::new(8, "RemoveExpiredAllocations").since(9),
    Method::new(9, "ClaimAllocations").since(9),
    Method::new(10, "GetClaims").since(9),
    Method::new(11, "ExtendClaimTerms").since(9),
    Method::new(12, "RemoveExpiredClaims").since(9),
];

const DATACAP: &[Method] = &[
    Method::new(1, "Constructor"),
    Method::new(2, "Mint"),
    Method::new(3, "Destroy"),
];

const EVM: &[Method] = &[
    Method::new(1, "Constructor"),
    Method::new(2, "Resurrect"),
    Method::new(3, "GetBytecode"),
    Method::new(4, "GetBytecodeHash"),
    Method::new(5, "GetStorageAt"),
    Method::new(6, "InvokeContractDelegate"),
    Method::new(3844450837, "InvokeContract"),
];

const EAM: &[Method] = &[
    Method::new(1, "Constructor"),
    Method::new(2, "Create"),
    Method::new(3, "Create2"),
    Method::new(4, "CreateExternal"),
];

const ETH_ACCOUNT: &[Method] = &[Method::new(1, "Constructor")];

const PLACEHOLDER: &[Method] = &[];

/// Every method of `actor` across all versions. Use [`Method::exists_in`] to narrow it down.
pub fn methods_of(actor: BuiltinActor) -> &'static [Method] {
    match actor {
        BuiltinActor::System => SYSTEM,
        BuiltinActor::Init => INIT,
        BuiltinActor::Cron => CRON,
        BuiltinActor::Account => ACCOUNT,
        BuiltinActor::StoragePower => STORAGE_POWER,
        BuiltinActor::StorageMiner => STORAGE_MINER,
        BuiltinActor::StorageMarket => STORAGE_MARKET,
        BuiltinActor::PaymentChannel => PAYMENT_CHANNEL,
        BuiltinActor::Multisig => MULTISIG,
        BuiltinActor::Reward => REWARD,
        BuiltinActor::VerifiedRegistry => VERIFIED_REGISTRY,
        BuiltinActor::DataCap => DATACAP,
        BuiltinActor::Evm => EVM,
        BuiltinActor::Eam => EAM,
        BuiltinActor::EthAccount => ETH_ACCOUNT,
        BuiltinActor::Placeholder => PLACEHOLDER,
    }
}
