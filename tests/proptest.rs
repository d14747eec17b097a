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

//! Property-based tests for the payoff engine.
//!
//! These tests verify invariants that should hold for any valid ledger,
//! free cash flow and policy.

use payoff_planner::{
    DebtId, DebtRecord, LedgerSnapshot, PayoffPolicy, PeriodStatus, Plan, PlanOutcome, order,
    simulate,
};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashMap;

// =============================================================================
// Arbitrary Strategies
// =============================================================================

/// Generate a non-negative amount (0 to 5000 with 2 decimal places).
fn arb_balance() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        1 => Just(Decimal::ZERO),
        9 => (1i64..=500_000i64).prop_map(|cents| Decimal::new(cents, 2)),
    ]
}

fn arb_minimum() -> impl Strategy<Value = Decimal> {
    (0i64..=20_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Annual rates drawn from a small set so ties are common.
fn arb_rate() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        Just(Decimal::ZERO),
        Just(Decimal::new(5, 0)),
        Just(Decimal::new(1299, 2)),
        Just(Decimal::new(24, 0)),
        Just(Decimal::new(36, 0)),
    ]
}

fn arb_debts() -> impl Strategy<Value = Vec<DebtRecord>> {
    prop::collection::vec((arb_balance(), arb_minimum(), arb_rate()), 0..8).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (balance, minimum, rate))| {
                DebtRecord::new(format!("debt-{i}"), balance, minimum, rate)
            })
            .collect()
    })
}

fn arb_free_cash_flow() -> impl Strategy<Value = Decimal> {
    (-50_000i64..=200_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_policy() -> impl Strategy<Value = PayoffPolicy> {
    prop_oneof![Just(PayoffPolicy::Snowball), Just(PayoffPolicy::Avalanche)]
}

// =============================================================================
// Helpers
// =============================================================================

/// Opening snapshot of every period: the initial ledger, then each period's result.
fn openings(plan: &Plan) -> impl Iterator<Item = &LedgerSnapshot> {
    std::iter::once(&plan.initial).chain(plan.periods.iter().map(|p| &p.snapshot))
}

fn rates(debts: &[DebtRecord]) -> HashMap<DebtId, Decimal> {
    debts
        .iter()
        .map(|d| (d.id.clone(), d.interest_rate_annual))
        .collect()
}

// =============================================================================
// Simulation Invariant Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Closing balance = opening balance + interest - payments, every period.
    #[test]
    fn balances_reconcile_every_period(
        debts in arb_debts(),
        free_cash_flow in arb_free_cash_flow(),
        policy in arb_policy(),
    ) {
        let plan = simulate(&debts, free_cash_flow, policy, 120).unwrap();

        for (opening, period) in openings(&plan).zip(&plan.periods) {
            prop_assert_eq!(
                period.total_balance(),
                opening.total_balance() + period.interest_accrued
                    - period.minimums_paid
                    - period.extra_applied
            );
        }
    }

    /// Without interest the total balance never grows.
    #[test]
    fn interest_free_balances_never_increase(
        debts in arb_debts(),
        free_cash_flow in arb_free_cash_flow(),
        policy in arb_policy(),
    ) {
        let debts: Vec<DebtRecord> = debts
            .into_iter()
            .map(|d| DebtRecord { interest_rate_annual: Decimal::ZERO, ..d })
            .collect();
        let plan = simulate(&debts, free_cash_flow, policy, 120).unwrap();

        for (opening, period) in openings(&plan).zip(&plan.periods) {
            prop_assert!(period.total_balance() <= opening.total_balance());
        }
    }

    /// Every period accounts for its whole budget; underfunded ones spend all of it.
    #[test]
    fn payments_respect_monthly_budget(
        debts in arb_debts(),
        free_cash_flow in arb_free_cash_flow(),
        policy in arb_policy(),
    ) {
        let plan = simulate(&debts, free_cash_flow, policy, 120).unwrap();

        for period in &plan.periods {
            prop_assert_eq!(
                period.minimums_paid + period.extra_applied + period.unallocated,
                plan.monthly_budget
            );
            if period.status == PeriodStatus::Underfunded {
                prop_assert_eq!(period.unallocated, Decimal::ZERO);
            }
        }
    }

    /// The total balance can only grow in an underfunded period.
    #[test]
    fn total_balance_grows_only_when_underfunded(
        debts in arb_debts(),
        free_cash_flow in arb_free_cash_flow(),
        policy in arb_policy(),
    ) {
        let plan = simulate(&debts, free_cash_flow, policy, 120).unwrap();

        for (opening, period) in openings(&plan).zip(&plan.periods) {
            if period.total_balance() > opening.total_balance() {
                prop_assert_eq!(period.status, PeriodStatus::Underfunded);
            }
        }
    }

    /// The focus debt leads the payoff order at the allocation step.
    #[test]
    fn focus_follows_policy_order(
        debts in arb_debts(),
        free_cash_flow in arb_free_cash_flow(),
        policy in arb_policy(),
    ) {
        let plan = simulate(&debts, free_cash_flow, policy, 120).unwrap();
        let rates = rates(&debts);

        for period in &plan.periods {
            let Some(focus) = &period.focus else { continue };

            // Balance after minimums = closing balance + extra paid this period.
            let candidates: Vec<DebtRecord> = period
                .snapshot
                .records()
                .iter()
                .map(|record| {
                    let extra = period.payment(&record.id).map(|p| p.extra).unwrap_or_default();
                    DebtRecord { balance: record.balance + extra, ..record.clone() }
                })
                .filter(|record| !record.is_settled())
                .collect();

            let head = candidates
                .iter()
                .min_by(|a, b| policy.compare(a, b))
                .map(|record| &record.id);
            prop_assert_eq!(head, Some(focus));

            if policy == PayoffPolicy::Avalanche {
                let top_rate = candidates.iter().map(|d| rates[&d.id]).max();
                prop_assert_eq!(Some(rates[focus]), top_rate);
            }
        }
    }

    /// A settled debt stays settled.
    #[test]
    fn settled_debts_never_reopen(
        debts in arb_debts(),
        free_cash_flow in arb_free_cash_flow(),
        policy in arb_policy(),
    ) {
        let plan = simulate(&debts, free_cash_flow, policy, 120).unwrap();

        let mut settled: Vec<DebtId> = plan
            .initial
            .records()
            .iter()
            .filter(|d| d.is_settled())
            .map(|d| d.id.clone())
            .collect();
        for period in &plan.periods {
            for id in &settled {
                prop_assert!(period.snapshot.get(id).unwrap().is_settled());
                prop_assert!(period.payment(id).is_none());
            }
            settled.extend(period.settled.iter().cloned());
        }
    }

    /// The outcome agrees with the final snapshot and the cap.
    #[test]
    fn outcome_matches_final_snapshot(
        debts in arb_debts(),
        free_cash_flow in arb_free_cash_flow(),
        policy in arb_policy(),
        max_periods in 1u32..=60,
    ) {
        let plan = simulate(&debts, free_cash_flow, policy, max_periods).unwrap();
        prop_assert!(plan.periods.len() <= max_periods as usize);

        match &plan.outcome {
            PlanOutcome::Completed { periods } => {
                prop_assert_eq!(*periods as usize, plan.periods.len());
                prop_assert!(plan.final_snapshot().is_settled());
            }
            PlanOutcome::Stalled { at_period, unsettled, remaining_balance } => {
                prop_assert_eq!(*at_period, max_periods);
                prop_assert!(!unsettled.is_empty());
                prop_assert_eq!(*remaining_balance, plan.final_snapshot().total_balance());
            }
        }
    }

    /// Identical inputs give identical plans.
    #[test]
    fn simulate_is_deterministic(
        debts in arb_debts(),
        free_cash_flow in arb_free_cash_flow(),
        policy in arb_policy(),
    ) {
        let first = simulate(&debts, free_cash_flow, policy, 60).unwrap();
        let second = simulate(&debts, free_cash_flow, policy, 60).unwrap();
        prop_assert_eq!(first, second);
    }
}

// =============================================================================
// Ordering Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// `order` is stable across calls and returns exactly the unsettled debts, sorted.
    #[test]
    fn order_is_idempotent_and_sorted(
        debts in arb_debts(),
        policy in arb_policy(),
    ) {
        let first = order(&debts, policy);
        let second = order(&debts, policy);
        prop_assert_eq!(&first, &second);

        let unsettled = debts.iter().filter(|d| !d.is_settled()).count();
        prop_assert_eq!(first.len(), unsettled);
        for pair in first.windows(2) {
            prop_assert!(policy.compare(pair[0], pair[1]).is_lt());
        }
    }
}
