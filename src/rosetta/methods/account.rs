// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! `/account/balance`.
//!
//! The node answers state queries as of the parent of the tipset asked about, so the balance
//! at height `H` is read from the state of the tipset at `H + 1`. The chain head has no child
//! yet; queries at the head report its parent instead.

use serde_json::json;

use crate::{
    actors::BuiltinActor,
    blocks::Tipset,
    node::TipsetTag,
    rosetta::{
        ApiError, ErrorKind, LOCKED_BALANCE, RosettaService, SPENDABLE_BALANCE, VESTING_SCHEDULE,
        block_identifier,
        types::{
            AccountBalanceRequest, AccountBalanceResponse, Amount, Metadata,
            PartialBlockIdentifier,
        },
    },
    shim::{address::Address, econ::TokenAmount},
};

/// Balance subdivisions of a multisig.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SubAccount {
    Locked,
    Spendable,
    Vesting,
}

impl SubAccount {
    fn parse(name: &str) -> Option<Self> {
        match name {
            LOCKED_BALANCE => Some(Self::Locked),
            SPENDABLE_BALANCE => Some(Self::Spendable),
            VESTING_SCHEDULE => Some(Self::Vesting),
            _ => None,
        }
    }
}

impl RosettaService {
    /// `/account/balance`
    pub async fn account_balance(
        &self,
        request: AccountBalanceRequest,
    ) -> Result<AccountBalanceResponse, ApiError> {
        let nid = self.validate_network(request.network_identifier.as_ref())?;
        let tag = self.finality_tag(nid)?;
        let account = &request.account_identifier;
        let address: Address = account
            .address
            .parse()
            .map_err(|e| ErrorKind::InvalidAccountAddress.with(e, true))?;
        let sub_account = match &account.sub_account {
            None => None,
            Some(it) => Some(
                SubAccount::parse(&it.address)
                    .ok_or_else(|| ErrorKind::MustSpecifySubAccount.with(&it.address, true))?,
            ),
        };
        self.synced().await?;

        let (reported, state) = self
            .balance_tipsets(tag, request.block_identifier.as_ref())
            .await?;
        let block_identifier = block_identifier(&reported)?;

        let actor = self
            .node
            .state_get_actor(&address, state.key())
            .await
            .map_err(|e| ErrorKind::UnableToGetAccount.node(e, true))?;
        let Some(actor) = actor else {
            if sub_account.is_some() {
                return Err(ErrorKind::AddressNotMultisig.with(&account.address, true));
            }
            return Ok(AccountBalanceResponse {
                block_identifier,
                balances: vec![Amount::fil("0")],
                metadata: None,
            });
        };

        let Some(sub_account) = sub_account else {
            return Ok(AccountBalanceResponse {
                block_identifier,
                balances: vec![Amount::fil(actor.balance.atto().to_string())],
                metadata: None,
            });
        };
        let is_multisig = self
            .cache
            .registry()
            .resolve(&actor.code)
            .is_some_and(|it| it.actor == BuiltinActor::Multisig);
        if !is_multisig {
            return Err(ErrorKind::AddressNotMultisig.with(&account.address, true));
        }

        let mut metadata = None;
        let balance = match sub_account {
            SubAccount::Locked => actor.balance.clone() - self.spendable(&address, &state).await?,
            SubAccount::Spendable => self.spendable(&address, &state).await?,
            SubAccount::Vesting => {
                let vesting = self
                    .node
                    .msig_get_vesting_schedule(&address, state.key())
                    .await
                    .map_err(|e| ErrorKind::UnableToGetVestingSchedule.node(e, true))?;
                let mut md = Metadata::new();
                md.insert(
                    VESTING_SCHEDULE.into(),
                    json!({
                        "StartEpoch": vesting.start_epoch.to_string(),
                        "UnlockDuration": vesting.unlock_duration.to_string(),
                        "InitialBalance": vesting.initial_balance.atto().to_string(),
                    }),
                );
                metadata = Some(md);
                TokenAmount::default()
            }
        };
        Ok(AccountBalanceResponse {
            block_identifier,
            balances: vec![Amount::fil(balance.atto().to_string())],
            metadata,
        })
    }

    async fn spendable(&self, address: &Address, state: &Tipset) -> Result<TokenAmount, ApiError> {
        self.node
            .msig_get_available_balance(address, state.key())
            .await
            .map_err(|e| ErrorKind::UnableToGetBalance.node(e, true))
    }

    /// The tipset to report and the tipset whose state holds the balance at it.
    async fn balance_tipsets(
        &self,
        tag: TipsetTag,
        block: Option<&PartialBlockIdentifier>,
    ) -> Result<(Tipset, Tipset), ApiError> {
        let head = self
            .head(tag)
            .await
            .map_err(|e| ErrorKind::UnableToGetLatestBlk.node(e, true))?;
        let (index, hash) = match block {
            Some(PartialBlockIdentifier {
                index: Some(index),
                hash,
            }) => (*index, hash.as_deref()),
            Some(PartialBlockIdentifier {
                index: None,
                hash: Some(_),
            }) => return Err(ErrorKind::InsufficientQueryInputs.err()),
            _ => return self.head_balance_tipsets(head).await,
        };
        if index < 0 {
            return Err(ErrorKind::MalformedValue.with(index, true));
        }
        if index > head.epoch() {
            return Err(ErrorKind::UnableToGetUnsyncedBlock.with(index, true));
        }

        let requested = self
            .node
            .chain_get_tipset_by_height(index, head.key())
            .await
            .map_err(|e| ErrorKind::UnableToGetTipset.node(e, true))?;
        if let Some(hash) = hash {
            let actual = block_identifier(&requested)?.hash;
            if actual != hash {
                return Err(ErrorKind::InvalidHash.with(hash, true));
            }
        }
        if requested.epoch() == head.epoch() {
            return self.head_balance_tipsets(head).await;
        }
        let child = self
            .node
            .chain_get_tipset_after_height(requested.epoch() + 1, head.key())
            .await
            .map_err(|e| ErrorKind::UnableToGetTipset.node(e, true))?;
        Ok((requested, child))
    }

    async fn head_balance_tipsets(&self, head: Tipset) -> Result<(Tipset, Tipset), ApiError> {
        let Some(parents) = head.parents().filter(|it| !it.is_empty()) else {
            // genesis has no parent state to report
            return Ok((head.clone(), head));
        };
        let parent = self
            .node
            .chain_get_tipset(parents)
            .await
            .map_err(|e| ErrorKind::UnableToGetParentBlk.node(e, true))?;
        Ok((parent, head))
    }
}
