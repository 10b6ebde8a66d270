// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Flattens execution traces into Rosetta operations.
//!
//! Each top-level message becomes one [`Transaction`]. Its call tree is walked depth-first,
//! parents before children, and every call moving value emits a debit followed by a credit
//! linked to it. A single `Fee` debit closes the list. Messages moving no value are left out.

use num_traits::Zero as _;

use super::{
    OPERATION_STATUS_FAIL, OPERATION_STATUS_OK,
    types::{AccountIdentifier, Amount, Operation, OperationIdentifier, Transaction, TransactionIdentifier},
};
use crate::{
    actors::{
        FIRST_EXPORTED_METHOD_NUMBER, UNKNOWN,
        params::{self, ExecReturn, SwapSignerParams},
    },
    address_cache::AddressCache,
    node::types::{ApiInvocResult, ExecutionTrace},
    shim::{
        MethodNum,
        address::Address,
        econ::{TokenAmount, atto_string},
    },
};

pub const SEND: &str = "Send";
pub const FEE: &str = "Fee";
const CONSTRUCTOR: &str = "Constructor";
const EXEC: &str = "Exec";
const PROPOSE: &str = "Propose";
const SWAP_SIGNER: &str = "SwapSigner";

/// Methods debiting the caller and crediting the callee with the message value.
const VALUE_TRANSFERS: &[&str] = &[
    SEND,
    "AddBalance",
    EXEC,
    "AwardBlockReward",
    "ApplyRewards",
    "OnDeferredCronEvent",
    "PreCommitSector",
    "ProveCommitSector",
    "SubmitWindowedPoSt",
];

/// Operation types that may appear in a transaction.
pub fn supported_operations() -> Vec<String> {
    VALUE_TRANSFERS
        .iter()
        .chain(&[PROPOSE, SWAP_SIGNER, FEE])
        .map(|it| it.to_string())
        .collect()
}

/// Name of method `num` of the actor at `to`, [`UNKNOWN`] if it can't be told.
pub async fn method_name(cache: &AddressCache, to: &Address, num: MethodNum) -> &'static str {
    match num {
        0 => return SEND,
        1 => return CONSTRUCTOR,
        _ => {}
    }
    let code = match cache.get_actor_code(to).await {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(%to, num, "couldn't get actor code: {e:#}");
            return UNKNOWN;
        }
    };
    let registry = cache.registry();
    let Some(descriptor) = registry.resolve(&code) else {
        return UNKNOWN;
    };
    if let Some(name) = descriptor.method_name(num) {
        return name;
    }
    // accounts take any exported method, moving value like a send
    if descriptor.actor.is_account_like() && num >= FIRST_EXPORTED_METHOD_NUMBER {
        return registry.find_method_in_all_actors(num).unwrap_or(SEND);
    }
    UNKNOWN
}

/// Transactions of the messages in `trace`, in order.
pub async fn build_transactions(
    cache: &AddressCache,
    trace: &[ApiInvocResult],
) -> Vec<Transaction> {
    let mut transactions = vec![];
    for invocation in trace {
        let operations = build_operations(cache, invocation).await;
        if operations.is_empty() {
            continue;
        }
        transactions.push(Transaction {
            transaction_identifier: TransactionIdentifier {
                hash: invocation.msg_cid.to_string(),
            },
            operations,
        });
    }
    transactions
}

/// Operations of one top-level message, fee included.
pub async fn build_operations(cache: &AddressCache, invocation: &ApiInvocResult) -> Vec<Operation> {
    let Some(root) = &invocation.execution_trace else {
        return vec![];
    };
    let mut operations = Operations::default();
    let mut stack = vec![root];
    while let Some(trace) = stack.pop() {
        visit(cache, trace, &mut operations).await;
        stack.extend(trace.subcalls.iter().rev());
    }
    let total_cost = &invocation.gas_cost.total_cost;
    if !operations.0.is_empty() && !total_cost.is_zero() {
        let from = cache.pub_key_or_raw(&invocation.msg.from).await;
        operations.push(FEE, Some(OPERATION_STATUS_OK), from, atto_string(total_cost, true), None);
    }
    operations.0
}

async fn visit(cache: &AddressCache, trace: &ExecutionTrace, operations: &mut Operations) {
    let msg = &trace.msg;
    let method = method_name(cache, &msg.to, msg.method).await;
    let success = trace.msg_rct.exit_code.is_success();
    let status = match success {
        true => OPERATION_STATUS_OK,
        false => OPERATION_STATUS_FAIL,
    };

    match method {
        PROPOSE => {
            operations
                .transfer(cache, method, status, &msg.from, &msg.to, &TokenAmount::zero())
                .await;
        }
        SWAP_SIGNER => match params::decode::<SwapSignerParams>(&msg.params) {
            Ok(SwapSignerParams { from, to }) => {
                operations
                    .transfer(cache, method, status, &from, &to, &TokenAmount::zero())
                    .await;
            }
            Err(e) => tracing::warn!(to = %msg.to, "couldn't decode SwapSigner params: {e:#}"),
        },
        _ if VALUE_TRANSFERS.contains(&method) && !msg.value.is_zero() => {
            operations
                .transfer(cache, method, status, &msg.from, &msg.to, &msg.value)
                .await;
            if method == EXEC && success {
                // Exec is addressed to the init actor, which forwards the value to the actor it
                // created. The second pair debits the init actor, the sender was debited above.
                match params::decode::<ExecReturn>(&trace.msg_rct.r#return) {
                    Ok(created) => {
                        operations
                            .transfer(
                                cache,
                                method,
                                status,
                                &msg.to,
                                &created.robust_address,
                                &msg.value,
                            )
                            .await;
                    }
                    Err(e) => tracing::warn!(to = %msg.to, "couldn't decode Exec return: {e:#}"),
                }
            }
        }
        _ => {}
    }
}

#[derive(Default)]
struct Operations(Vec<Operation>);

impl Operations {
    fn push(
        &mut self,
        kind: &str,
        status: Option<&str>,
        account: String,
        value: String,
        related: Option<i64>,
    ) {
        let index = self.0.len() as i64;
        self.0.push(Operation {
            operation_identifier: OperationIdentifier { index },
            related_operations: related.map(|index| vec![OperationIdentifier { index }]),
            r#type: kind.into(),
            status: status.map(Into::into),
            account: Some(AccountIdentifier::new(account)),
            amount: Some(Amount::fil(value)),
        });
    }

    /// Pushes a debit of `from` and a credit of `to` linked to it. Skipped when neither
    /// address resolves.
    async fn transfer(
        &mut self,
        cache: &AddressCache,
        kind: &str,
        status: &str,
        from: &Address,
        to: &Address,
        value: &TokenAmount,
    ) {
        let (from_key, to_key) = match (cache.get_pub_key(from).await, cache.get_pub_key(to).await)
        {
            (Err(from_err), Err(to_err)) => {
                tracing::warn!(
                    %from,
                    %to,
                    "skipping {kind} operation, couldn't resolve either address: {from_err:#}, {to_err:#}"
                );
                return;
            }
            (from_key, to_key) => (
                from_key.unwrap_or_else(|_| from.to_string()),
                to_key.unwrap_or_else(|_| to.to_string()),
            ),
        };
        let debit = self.0.len() as i64;
        self.push(kind, Some(status), from_key, atto_string(value, true), None);
        self.push(kind, Some(status), to_key, atto_string(value, false), Some(debit));
    }
}

/// A debit and credit pair for a message still in the mempool. No status, it hasn't run yet.
pub fn mempool_operations(
    kind: &str,
    from: String,
    to: String,
    value: &TokenAmount,
) -> Vec<Operation> {
    let mut operations = Operations::default();
    operations.push(kind, None, from, atto_string(value, true), None);
    operations.push(kind, None, to, atto_string(value, false), Some(0));
    operations.0
}
