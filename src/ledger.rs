// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Ledger
//!
//! In-memory account balances shared by every request for the life of the
//! process.
//!
//! ## Invariants
//!
//! - A balance is never negative (`u64` minor units, debits checked first)
//! - A committed transfer conserves the sum of all balances exactly
//! - No caller ever observes a debit without its matching credit
//!
//! All mutations go through a single mutex. The check-then-mutate sequence
//! of [`Ledger::transfer`] runs entirely under that lock, and the lock is
//! never held across an `.await` or any I/O.
//!
//! Accounts are keyed by name and are independent of identity ids. An
//! unknown account reads as zero and only materializes when credited.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Longest accepted account name, in bytes.
pub const MAX_ACCOUNT_LEN: usize = 128;

/// Smallest float that no longer fits in a `u64` (2^64).
const U64_LIMIT_F64: f64 = 18_446_744_073_709_551_616.0;

/// Ordered snapshot of every account balance.
pub type Balances = BTreeMap<String, u64>;

/// Ledger failures. Every variant leaves balances untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("amount must be a positive whole number of minor units")]
    InvalidAmount,
    #[error("account name must be 1..={} non-blank bytes", MAX_ACCOUNT_LEN)]
    InvalidAccount,
    #[error("insufficient funds")]
    InsufficientFunds { balances: Balances },
    #[error("credit would overflow the destination balance")]
    CreditOverflow,
    #[error("ledger lock poisoned")]
    Unavailable,
}

/// A strictly positive amount in minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    pub fn new(value: u64) -> Result<Self, LedgerError> {
        if value == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        Ok(Amount(value))
    }

    pub fn get(self) -> u64 {
        self.0
    }

    /// Validate an amount taken from a JSON body.
    ///
    /// Accepts integers, integral floats (`30.0`) and numeric strings
    /// (`"30"`). Rejects zero, negatives, fractions, NaN/infinity and
    /// anything outside `u64`.
    pub fn from_json(value: &Value) -> Result<Self, LedgerError> {
        match value {
            Value::Number(n) => {
                if let Some(v) = n.as_u64() {
                    Self::new(v)
                } else if n.is_i64() {
                    Err(LedgerError::InvalidAmount)
                } else {
                    n.as_f64()
                        .ok_or(LedgerError::InvalidAmount)
                        .and_then(Self::from_f64)
                }
            }
            Value::String(s) => {
                let s = s.trim();
                match s.parse::<u64>() {
                    Ok(v) => Self::new(v),
                    Err(_) => s
                        .parse::<f64>()
                        .map_err(|_| LedgerError::InvalidAmount)
                        .and_then(Self::from_f64),
                }
            }
            _ => Err(LedgerError::InvalidAmount),
        }
    }

    fn from_f64(v: f64) -> Result<Self, LedgerError> {
        if !v.is_finite() || v <= 0.0 || v.fract() != 0.0 || v >= U64_LIMIT_F64 {
            return Err(LedgerError::InvalidAmount);
        }
        Self::new(v as u64)
    }
}

/// Result of a committed transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferOutcome {
    /// Balances immediately after the transfer, taken under the same lock.
    pub balances: Balances,
}

fn validate_account(name: &str) -> Result<(), LedgerError> {
    if name.trim().is_empty() || name.len() > MAX_ACCOUNT_LEN {
        return Err(LedgerError::InvalidAccount);
    }
    Ok(())
}

fn snapshot_of(accounts: &HashMap<String, u64>) -> Balances {
    accounts
        .iter()
        .map(|(name, balance)| (name.clone(), *balance))
        .collect()
}

#[derive(Debug, Default)]
pub struct Ledger {
    accounts: Mutex<HashMap<String, u64>>,
}

impl Ledger {
    /// Build a ledger from seed balances. Later duplicates replace earlier ones.
    pub fn with_balances<I, S>(balances: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        Self {
            accounts: Mutex::new(
                balances
                    .into_iter()
                    .map(|(name, balance)| (name.into(), balance))
                    .collect(),
            ),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, u64>>, LedgerError> {
        self.accounts.lock().map_err(|_| LedgerError::Unavailable)
    }

    /// Whether the ledger lock is usable.
    pub fn is_healthy(&self) -> bool {
        !self.accounts.is_poisoned()
    }

    /// Sum of all balances.
    pub fn total(&self) -> Result<u128, LedgerError> {
        let accounts = self.lock()?;
        Ok(accounts.values().map(|&b| u128::from(b)).sum())
    }

    /// Atomically move `amount` from `from` to `to`.
    ///
    /// Either both the debit and the credit are applied, or nothing is.
    /// On insufficient funds the unchanged balances are returned in the
    /// error for caller visibility.
    pub fn transfer(
        &self,
        from: &str,
        to: &str,
        amount: Amount,
    ) -> Result<TransferOutcome, LedgerError> {
        validate_account(from)?;
        validate_account(to)?;

        let mut accounts = self.lock()?;

        let available = accounts.get(from).copied().unwrap_or(0);
        if available < amount.get() {
            let balances = snapshot_of(&accounts);
            drop(accounts);
            tracing::info!(
                from,
                to,
                amount = amount.get(),
                available,
                "transfer rejected: insufficient funds"
            );
            return Err(LedgerError::InsufficientFunds { balances });
        }

        if from != to {
            let credited = accounts
                .get(to)
                .copied()
                .unwrap_or(0)
                .checked_add(amount.get())
                .ok_or(LedgerError::CreditOverflow)?;
            accounts.insert(from.to_string(), available - amount.get());
            accounts.insert(to.to_string(), credited);
        }

        let balances = snapshot_of(&accounts);
        drop(accounts);

        tracing::info!(from, to, amount = amount.get(), "transfer committed");
        Ok(TransferOutcome { balances })
    }
}

#[cfg(test)]
impl Ledger {
    /// Current balance; unknown accounts read as zero.
    pub(crate) fn balance(&self, account: &str) -> Result<u64, LedgerError> {
        let accounts = self.lock()?;
        Ok(accounts.get(account).copied().unwrap_or(0))
    }

    /// Consistent snapshot of all balances.
    pub(crate) fn snapshot(&self) -> Result<Balances, LedgerError> {
        let accounts = self.lock()?;
        Ok(snapshot_of(&accounts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn demo_ledger() -> Ledger {
        Ledger::with_balances([("alice", 100), ("bob", 50)])
    }

    fn amount(v: u64) -> Amount {
        Amount::new(v).unwrap()
    }

    #[test]
    fn transfer_moves_funds() {
        let ledger = demo_ledger();
        let outcome = ledger.transfer("alice", "bob", amount(30)).unwrap();

        assert_eq!(outcome.balances["alice"], 70);
        assert_eq!(outcome.balances["bob"], 80);
        assert_eq!(ledger.total().unwrap(), 150);
    }

    #[test]
    fn insufficient_funds_leaves_balances_unchanged() {
        let ledger = demo_ledger();
        ledger.transfer("alice", "bob", amount(30)).unwrap();

        let err = ledger.transfer("alice", "bob", amount(1000)).unwrap_err();
        let LedgerError::InsufficientFunds { balances } = err else {
            panic!("expected insufficient funds, got {err:?}");
        };
        assert_eq!(balances["alice"], 70);
        assert_eq!(balances["bob"], 80);
        assert_eq!(ledger.snapshot().unwrap(), balances);
    }

    #[test]
    fn exact_balance_can_be_spent() {
        let ledger = demo_ledger();
        let outcome = ledger.transfer("bob", "alice", amount(50)).unwrap();
        assert_eq!(outcome.balances["bob"], 0);
        assert_eq!(outcome.balances["alice"], 150);
    }

    #[test]
    fn unknown_source_is_insufficient_and_not_materialized() {
        let ledger = demo_ledger();
        let err = ledger.transfer("mallory", "bob", amount(1)).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
        assert!(!ledger.snapshot().unwrap().contains_key("mallory"));
        assert_eq!(ledger.balance("mallory").unwrap(), 0);
    }

    #[test]
    fn unknown_destination_is_created_on_credit() {
        let ledger = demo_ledger();
        let outcome = ledger.transfer("alice", "carol", amount(25)).unwrap();
        assert_eq!(outcome.balances["carol"], 25);
        assert_eq!(ledger.total().unwrap(), 150);
    }

    #[test]
    fn self_transfer_is_a_checked_no_op() {
        let ledger = demo_ledger();
        let outcome = ledger.transfer("alice", "alice", amount(100)).unwrap();
        assert_eq!(outcome.balances["alice"], 100);

        let err = ledger.transfer("alice", "alice", amount(101)).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
    }

    #[test]
    fn overflowing_credit_is_rejected_without_debit() {
        let ledger = Ledger::with_balances([("alice", 10), ("whale", u64::MAX)]);
        let err = ledger.transfer("alice", "whale", amount(1)).unwrap_err();
        assert_eq!(err, LedgerError::CreditOverflow);
        assert_eq!(ledger.balance("alice").unwrap(), 10);
        assert_eq!(ledger.balance("whale").unwrap(), u64::MAX);
    }

    #[test]
    fn blank_or_oversized_account_is_invalid() {
        let ledger = demo_ledger();
        assert_eq!(
            ledger.transfer("", "bob", amount(1)),
            Err(LedgerError::InvalidAccount)
        );
        assert_eq!(
            ledger.transfer("alice", "  ", amount(1)),
            Err(LedgerError::InvalidAccount)
        );
        let long = "x".repeat(MAX_ACCOUNT_LEN + 1);
        assert_eq!(
            ledger.transfer("alice", &long, amount(1)),
            Err(LedgerError::InvalidAccount)
        );
    }

    #[test]
    fn amount_parsing_accepts_whole_positive_values() {
        assert_eq!(Amount::from_json(&json!(30)).unwrap().get(), 30);
        assert_eq!(Amount::from_json(&json!(30.0)).unwrap().get(), 30);
        assert_eq!(Amount::from_json(&json!("30")).unwrap().get(), 30);
        assert_eq!(Amount::from_json(&json!(" 12.0 ")).unwrap().get(), 12);
    }

    #[test]
    fn amount_parsing_rejects_invalid_values() {
        for value in [
            json!(0),
            json!(-5),
            json!(10.5),
            json!(-0.0),
            json!(1e30),
            json!("abc"),
            json!("NaN"),
            json!("inf"),
            json!("-3"),
            json!(""),
            json!(null),
            json!(true),
            json!([10]),
            json!({"v": 10}),
        ] {
            assert_eq!(
                Amount::from_json(&value),
                Err(LedgerError::InvalidAmount),
                "value {value} should be rejected"
            );
        }
    }

    #[test]
    fn concurrent_double_spend_lets_exactly_one_through() {
        let ledger = Arc::new(Ledger::with_balances([("alice", 70), ("bob", 80)]));
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    ledger.transfer("alice", "bob", Amount::new(60).unwrap())
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let successes: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        let failures: Vec<_> = results.iter().filter_map(|r| r.as_ref().err()).collect();

        assert_eq!(successes.len(), 1);
        assert_eq!(failures.len(), 1);
        assert_eq!(successes[0].balances["alice"], 10);
        assert_eq!(successes[0].balances["bob"], 140);

        let LedgerError::InsufficientFunds { balances } = failures[0] else {
            panic!("expected insufficient funds, got {:?}", failures[0]);
        };
        assert_eq!(balances["alice"], 10);
        assert_eq!(balances["bob"], 140);
        assert_eq!(ledger.balance("alice").unwrap(), 10);
    }

    #[test]
    fn concurrent_transfers_conserve_total_and_hide_intermediate_state() {
        let accounts = ["a", "b", "c", "d"];
        let ledger = Arc::new(Ledger::with_balances(accounts.iter().map(|a| (*a, 1_000))));
        let expected_total = ledger.total().unwrap();
        let threads = 8;
        let barrier = Arc::new(Barrier::new(threads + 1));

        let observer = {
            let ledger = Arc::clone(&ledger);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..2_000 {
                    let snapshot = ledger.snapshot().unwrap();
                    let total: u128 = snapshot.values().map(|&b| u128::from(b)).sum();
                    assert_eq!(total, expected_total);
                }
            })
        };

        let workers: Vec<_> = (0..threads)
            .map(|t| {
                let ledger = Arc::clone(&ledger);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for i in 0..1_000usize {
                        let from = accounts[(i + t) % accounts.len()];
                        let to = accounts[(i * 3 + t + 1) % accounts.len()];
                        let value = ((i * 7 + t * 13) % 400 + 1) as u64;
                        match ledger.transfer(from, to, Amount::new(value).unwrap()) {
                            Ok(_) | Err(LedgerError::InsufficientFunds { .. }) => {}
                            Err(other) => panic!("unexpected ledger error: {other:?}"),
                        }
                    }
                })
            })
            .collect();

        for worker in workers {
            worker.join().unwrap();
        }
        observer.join().unwrap();

        assert_eq!(ledger.total().unwrap(), expected_total);
        assert_eq!(ledger.snapshot().unwrap().len(), accounts.len());
    }
}
