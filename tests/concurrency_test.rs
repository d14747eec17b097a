// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Concurrent invocation tests.
//!
//! Simulations share no state, so running many of them in parallel must give
//! exactly the results of running them one after another.

use payoff_planner::{
    DebtRecord, LedgerSnapshot, PayoffPolicy, Plan, Simulation, compare, simulate,
};
use rayon::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::thread;

// === Fixtures ===

/// A deterministic ledger that varies with `seed`.
fn make_ledger(seed: u32, debt_count: u32) -> Vec<DebtRecord> {
    (0..debt_count)
        .map(|i| {
            let mix = seed.wrapping_mul(31).wrapping_add(i * 17);
            DebtRecord::new(
                format!("debt-{i}"),
                Decimal::new(i64::from(10_000 + mix % 400_000), 2),
                Decimal::new(i64::from(500 + mix % 5_000), 2),
                Decimal::new(i64::from(mix % 30), 0),
            )
        })
        .collect()
}

fn make_free_cash_flow(seed: u32) -> Decimal {
    Decimal::new(i64::from(seed % 50_000) - 5_000, 2)
}

fn assert_send_sync<T: Send + Sync>() {}

// === Tests ===

#[test]
fn public_types_are_send_and_sync() {
    assert_send_sync::<DebtRecord>();
    assert_send_sync::<LedgerSnapshot>();
    assert_send_sync::<Simulation>();
    assert_send_sync::<Plan>();
}

#[test]
fn parallel_simulations_match_sequential() {
    let inputs: Vec<(Vec<DebtRecord>, Decimal, PayoffPolicy)> = (0..200u32)
        .map(|seed| {
            let policy = PayoffPolicy::ALL[(seed % 2) as usize];
            (make_ledger(seed, 1 + seed % 6), make_free_cash_flow(seed), policy)
        })
        .collect();

    let sequential: Vec<Plan> = inputs
        .iter()
        .map(|(debts, free_cash_flow, policy)| {
            simulate(debts, *free_cash_flow, *policy, 600).unwrap()
        })
        .collect();

    let parallel: Vec<Plan> = inputs
        .par_iter()
        .map(|(debts, free_cash_flow, policy)| {
            simulate(debts, *free_cash_flow, *policy, 600).unwrap()
        })
        .collect();

    assert_eq!(sequential, parallel);
}

#[test]
fn same_ledger_simulated_from_many_threads() {
    let debts = Arc::new(make_ledger(7, 5));
    let expected = simulate(&debts, Decimal::new(25_000, 2), PayoffPolicy::Avalanche, 600).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let debts = Arc::clone(&debts);
            thread::spawn(move || {
                simulate(&debts, Decimal::new(25_000, 2), PayoffPolicy::Avalanche, 600).unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn parallel_comparisons_are_stable() {
    let recommendations: Vec<_> = (0..64u32)
        .into_par_iter()
        .map(|seed| {
            let debts = make_ledger(seed, 4);
            let first = compare(&debts, make_free_cash_flow(seed), 600).unwrap();
            let second = compare(&debts, make_free_cash_flow(seed), 600).unwrap();
            (first.recommended, second.recommended)
        })
        .collect();

    for (first, second) in recommendations {
        assert_eq!(first, second);
    }
}
