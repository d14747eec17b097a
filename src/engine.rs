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

//! Payoff simulation engine.
//!
//! The [`Simulation`] walks a ledger forward one month at a time. Each period:
//!
//! 1. **Interest**: every unsettled debt accrues `rate / 12 / 100` of its
//!    balance, rounded half-up to the ledger scale.
//! 2. **Minimums**: each debt owes `min(minimum_payment, balance)`.
//! 3. **Minimums only**: if nothing is left once the minimums are covered,
//!    they are paid in policy order until the budget runs out. No extra is
//!    applied.
//! 4. **Extra**: otherwise the remaining budget goes to the first debt in
//!    payoff order and cascades down the order as debts settle.
//!
//! A period is [`PeriodStatus::Underfunded`] when it only paid minimums or
//! when its payments did not cover the interest it accrued. Only underfunded
//! periods can increase the total balance.
//!
//! The monthly budget is fixed for the whole plan: free cash flow plus the
//! minimum payments of the debts outstanding at the start. Minimums freed by
//! settled debts therefore roll into the extra payment.
//!
//! # Determinism
//!
//! There is no clock, randomness or shared state. The same inputs always give
//! the same [`Plan`], and independent simulations may run on any thread.

use crate::base::{DEFAULT_SCALE, DebtId, MAX_SCALE, checked_sum};
use crate::debt::DebtRecord;
use crate::error::ValidationError;
use crate::ledger::LedgerSnapshot;
use crate::plan::{Payment, PeriodResult, PeriodStatus, Plan, PlanOutcome};
use crate::policy::{PayoffPolicy, order_indices};
use log::{debug, trace};
use rust_decimal::Decimal;
use serde::Serialize;

/// Lazy month-by-month payoff projection.
///
/// Yields one [`PeriodResult`] per month until every debt is settled, the
/// period cap is reached, or a balance leaves the decimal range. Once
/// exhausted, [`Simulation::outcome`] reports how it ended.
///
/// # Example
///
/// ```
/// use payoff_planner::{DebtRecord, PayoffPolicy, Simulation};
/// use rust_decimal_macros::dec;
///
/// let debts = vec![DebtRecord::new("addi", dec!(300), dec!(100), dec!(0))];
/// let mut simulation = Simulation::new(&debts, dec!(50), PayoffPolicy::Snowball, 12).unwrap();
///
/// let first = simulation.next().unwrap();
/// assert_eq!(first.snapshot.total_balance(), dec!(150));
/// assert!(simulation.outcome().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Simulation {
    policy: PayoffPolicy,
    free_cash_flow: Decimal,
    monthly_budget: Decimal,
    max_periods: u32,
    scale: u32,
    initial: LedgerSnapshot,
    current: Vec<DebtRecord>,
    period: u32,
    /// Set when a balance overflowed the decimal range.
    halted: bool,
}

impl Simulation {
    /// Validates `records` and prepares a simulation at the default scale.
    ///
    /// # Errors
    ///
    /// Any [`ValidationError`] from [`LedgerSnapshot::new`], or
    /// [`ValidationError::InvalidMaxPeriods`] when `max_periods` is zero.
    pub fn new(
        records: &[DebtRecord],
        free_cash_flow: Decimal,
        policy: PayoffPolicy,
        max_periods: u32,
    ) -> Result<Self, ValidationError> {
        let snapshot = LedgerSnapshot::new(records.to_vec())?;
        Self::from_snapshot(snapshot, free_cash_flow, policy, max_periods)
    }

    /// Prepares a simulation over an already validated snapshot.
    pub fn from_snapshot(
        snapshot: LedgerSnapshot,
        free_cash_flow: Decimal,
        policy: PayoffPolicy,
        max_periods: u32,
    ) -> Result<Self, ValidationError> {
        if max_periods == 0 {
            return Err(ValidationError::InvalidMaxPeriods);
        }

        let monthly_budget = free_cash_flow
            .checked_add(snapshot.total_minimum_payments())
            .unwrap_or(Decimal::MAX)
            .max(Decimal::ZERO);

        Ok(Self {
            policy,
            free_cash_flow,
            monthly_budget,
            max_periods,
            scale: DEFAULT_SCALE,
            current: snapshot.records().to_vec(),
            initial: snapshot,
            period: 0,
            halted: false,
        })
    }

    /// Sets the number of minor-unit decimal places interest is rounded to.
    ///
    /// # Errors
    ///
    /// [`ValidationError::UnsupportedScale`] above [`MAX_SCALE`].
    pub fn with_scale(mut self, scale: u32) -> Result<Self, ValidationError> {
        if scale > MAX_SCALE {
            return Err(ValidationError::UnsupportedScale(scale));
        }
        self.scale = scale;
        Ok(self)
    }

    pub fn policy(&self) -> PayoffPolicy {
        self.policy
    }

    pub fn monthly_budget(&self) -> Decimal {
        self.monthly_budget
    }

    /// Terminal state, or `None` while periods remain to be simulated.
    pub fn outcome(&self) -> Option<PlanOutcome> {
        if self.current.iter().all(DebtRecord::is_settled) {
            return Some(PlanOutcome::Completed {
                periods: self.period,
            });
        }
        if self.halted || self.period >= self.max_periods {
            return Some(PlanOutcome::Stalled {
                at_period: self.period,
                unsettled: self
                    .current
                    .iter()
                    .filter(|record| !record.is_settled())
                    .map(|record| record.id.clone())
                    .collect(),
                remaining_balance: checked_total(&self.current).unwrap_or(Decimal::MAX),
            });
        }
        None
    }

    /// Runs the simulation to the end and assembles the [`Plan`].
    pub fn into_plan(mut self) -> Plan {
        let payoff_order = order_indices(self.initial.records(), self.policy)
            .into_iter()
            .map(|index| self.initial.records()[index].id.clone())
            .collect();

        // `next` either advances a period or halts, so the loop always ends.
        let mut periods = Vec::new();
        let outcome = loop {
            if let Some(outcome) = self.outcome() {
                break outcome;
            }
            if let Some(result) = self.next() {
                periods.push(result);
            }
        };

        match &outcome {
            PlanOutcome::Completed { periods } => {
                debug!("{} plan completed after {} periods", self.policy, periods)
            }
            PlanOutcome::Stalled {
                at_period,
                unsettled,
                remaining_balance,
            } => debug!(
                "{} plan stalled at period {} with {} unsettled debts ({} outstanding)",
                self.policy,
                at_period,
                unsettled.len(),
                remaining_balance
            ),
        }

        Plan {
            policy: self.policy,
            free_cash_flow: self.free_cash_flow,
            monthly_budget: self.monthly_budget,
            payoff_order,
            initial: self.initial,
            periods,
            outcome,
        }
    }

    /// Simulates one month. Returns `None` if a balance overflowed.
    fn step(&self) -> Option<(PeriodResult, Vec<DebtRecord>)> {
        let period = self.period + 1;
        let opening_total = checked_total(&self.current);

        let mut interest_accrued = Decimal::ZERO;
        let mut working = Vec::with_capacity(self.current.len());
        for record in &self.current {
            let interest = record.monthly_interest(self.scale)?;
            interest_accrued = interest_accrued.checked_add(interest)?;
            working.push(record.accrued(interest)?);
        }

        let due: Vec<Decimal> = working.iter().map(DebtRecord::minimum_due).collect();
        let total_due = checked_sum(due.iter().copied())?;

        let mut allocation = Allocation::new(self.monthly_budget);
        let mut focus = None;

        // Nothing left once minimums are covered: minimums only, in policy order.
        let minimums_only = self.monthly_budget <= total_due;
        if minimums_only {
            for index in order_indices(&working, self.policy) {
                if allocation.remaining.is_zero() {
                    break;
                }
                let amount = due[index].min(allocation.remaining);
                allocation.pay(&mut working[index], amount, PaymentKind::Minimum);
            }
        } else {
            for (record, amount) in working.iter_mut().zip(due.iter().copied()) {
                allocation.pay(record, amount, PaymentKind::Minimum);
            }

            let payoff_order = order_indices(&working, self.policy);
            focus = payoff_order.first().map(|&index| working[index].id.clone());
            for index in payoff_order {
                if allocation.remaining.is_zero() {
                    break;
                }
                let amount = working[index].balance.min(allocation.remaining);
                allocation.pay(&mut working[index], amount, PaymentKind::Extra);
            }
        }

        // A funded month never lets the total balance grow.
        let status = if minimums_only || allocation.total_paid() < interest_accrued {
            PeriodStatus::Underfunded
        } else {
            PeriodStatus::Funded
        };

        let closing_total = checked_total(&working);
        if let (Some(opening), Some(closing)) = (opening_total, closing_total) {
            debug_assert_eq!(
                closing.checked_add(allocation.total_paid()),
                opening.checked_add(interest_accrued),
                "Invariant violated: balances do not reconcile in period {period}"
            );
        }
        debug_assert!(
            working.iter().all(|record| record.balance >= Decimal::ZERO),
            "Invariant violated: negative balance in period {period}"
        );

        trace!(
            "period {}: {:?}, interest {}, minimums {}, extra {}, balance {:?}",
            period,
            status,
            interest_accrued,
            allocation.minimums_paid,
            allocation.extra_applied,
            closing_total
        );
        for id in &allocation.settled {
            debug!("period {period}: debt '{id}' settled");
        }

        let result = PeriodResult {
            period,
            status,
            snapshot: LedgerSnapshot::from_validated(working.clone()),
            interest_accrued,
            minimums_paid: allocation.minimums_paid,
            extra_applied: allocation.extra_applied,
            unallocated: allocation.remaining,
            focus,
            payments: allocation.payments,
            settled: allocation.settled,
        };
        Some((result, working))
    }
}

impl Iterator for Simulation {
    type Item = PeriodResult;

    fn next(&mut self) -> Option<Self::Item> {
        if self.outcome().is_some() {
            return None;
        }
        match self.step() {
            Some((result, next)) => {
                self.period = result.period;
                self.current = next;
                Some(result)
            }
            None => {
                debug!(
                    "period {}: balance overflow, halting {} simulation",
                    self.period + 1,
                    self.policy
                );
                self.halted = true;
                None
            }
        }
    }
}

/// Sum of balances, or `None` if it leaves the decimal range.
fn checked_total(records: &[DebtRecord]) -> Option<Decimal> {
    checked_sum(records.iter().map(|record| record.balance))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PaymentKind {
    Minimum,
    Extra,
}

/// Running tally of one period's payments.
#[derive(Debug)]
struct Allocation {
    remaining: Decimal,
    minimums_paid: Decimal,
    extra_applied: Decimal,
    payments: Vec<Payment>,
    settled: Vec<DebtId>,
}

impl Allocation {
    fn new(budget: Decimal) -> Self {
        Self {
            remaining: budget,
            minimums_paid: Decimal::ZERO,
            extra_applied: Decimal::ZERO,
            payments: Vec::new(),
            settled: Vec::new(),
        }
    }

    fn total_paid(&self) -> Decimal {
        self.minimums_paid + self.extra_applied
    }

    /// Pays `amount` (already capped at balance and budget) towards `record`.
    fn pay(&mut self, record: &mut DebtRecord, amount: Decimal, kind: PaymentKind) {
        if amount.is_zero() || record.is_settled() {
            return;
        }
        debug_assert!(amount <= self.remaining, "payment exceeds remaining budget");

        *record = record.paid(amount);
        self.remaining -= amount;

        let index = match self.payments.iter().position(|p| p.id == record.id) {
            Some(index) => index,
            None => {
                self.payments.push(Payment {
                    id: record.id.clone(),
                    minimum: Decimal::ZERO,
                    extra: Decimal::ZERO,
                });
                self.payments.len() - 1
            }
        };
        match kind {
            PaymentKind::Minimum => {
                self.minimums_paid += amount;
                self.payments[index].minimum += amount;
            }
            PaymentKind::Extra => {
                self.extra_applied += amount;
                self.payments[index].extra += amount;
            }
        }

        if record.is_settled() {
            self.settled.push(record.id.clone());
        }
    }
}

/// Simulates `records` under `policy` until every debt is settled or
/// `max_periods` months have passed.
///
/// `free_cash_flow` is income minus fixed expenses minus the minimum payments
/// of the outstanding debts. It may be negative, which simply yields
/// underfunded periods.
///
/// # Errors
///
/// [`ValidationError`] for duplicate ids, negative balances, minimum payments
/// or rates, and a zero `max_periods`. Nothing is simulated in that case.
///
/// # Example
///
/// ```
/// use payoff_planner::{DebtRecord, PayoffPolicy, PlanOutcome, simulate};
/// use rust_decimal_macros::dec;
///
/// let debts = vec![
///     DebtRecord::new("a", dec!(100), dec!(0), dec!(0)),
///     DebtRecord::new("b", dec!(50), dec!(0), dec!(0)),
/// ];
/// let plan = simulate(&debts, dec!(100), PayoffPolicy::Snowball, 1200).unwrap();
///
/// assert_eq!(plan.outcome, PlanOutcome::Completed { periods: 2 });
/// assert_eq!(plan.periods[0].settled[0].as_str(), "b");
/// ```
pub fn simulate(
    records: &[DebtRecord],
    free_cash_flow: Decimal,
    policy: PayoffPolicy,
    max_periods: u32,
) -> Result<Plan, ValidationError> {
    Ok(Simulation::new(records, free_cash_flow, policy, max_periods)?.into_plan())
}

/// Both policies run on identical inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comparison {
    pub snowball: Plan,
    pub avalanche: Plan,
    /// The completing plan with the least interest, then the fewest months.
    /// Avalanche wins exact ties. `None` when neither plan completes.
    pub recommended: Option<PayoffPolicy>,
}

impl Comparison {
    pub fn plan(&self, policy: PayoffPolicy) -> &Plan {
        match policy {
            PayoffPolicy::Snowball => &self.snowball,
            PayoffPolicy::Avalanche => &self.avalanche,
        }
    }

    pub fn recommended_plan(&self) -> Option<&Plan> {
        self.recommended.map(|policy| self.plan(policy))
    }

    /// Interest the recommended plan saves over the other one, when both complete.
    pub fn interest_saved(&self) -> Option<Decimal> {
        let recommended = self.recommended?;
        let other = match recommended {
            PayoffPolicy::Snowball => &self.avalanche,
            PayoffPolicy::Avalanche => &self.snowball,
        };
        other
            .is_completed()
            .then(|| other.total_interest() - self.plan(recommended).total_interest())
    }
}

/// Runs [`simulate`] for both policies and recommends one.
pub fn compare(
    records: &[DebtRecord],
    free_cash_flow: Decimal,
    max_periods: u32,
) -> Result<Comparison, ValidationError> {
    let snapshot = LedgerSnapshot::new(records.to_vec())?;
    compare_snapshot(&snapshot, free_cash_flow, max_periods, DEFAULT_SCALE)
}

/// [`compare`] over a validated snapshot at an explicit scale.
pub fn compare_snapshot(
    snapshot: &LedgerSnapshot,
    free_cash_flow: Decimal,
    max_periods: u32,
    scale: u32,
) -> Result<Comparison, ValidationError> {
    let run = |policy: PayoffPolicy| -> Result<Plan, ValidationError> {
        Simulation::from_snapshot(snapshot.clone(), free_cash_flow, policy, max_periods)?
            .with_scale(scale)
            .map(Simulation::into_plan)
    };
    let snowball = run(PayoffPolicy::Snowball)?;
    let avalanche = run(PayoffPolicy::Avalanche)?;
    let recommended = recommend(&snowball, &avalanche);

    Ok(Comparison {
        snowball,
        avalanche,
        recommended,
    })
}

fn recommend(snowball: &Plan, avalanche: &Plan) -> Option<PayoffPolicy> {
    match (snowball.months_to_payoff(), avalanche.months_to_payoff()) {
        (None, None) => None,
        (Some(_), None) => Some(PayoffPolicy::Snowball),
        (None, Some(_)) => Some(PayoffPolicy::Avalanche),
        (Some(snowball_months), Some(avalanche_months)) => {
            let snowball_key = (snowball.total_interest(), snowball_months);
            let avalanche_key = (avalanche.total_interest(), avalanche_months);
            if snowball_key < avalanche_key {
                Some(PayoffPolicy::Snowball)
            } else {
                Some(PayoffPolicy::Avalanche)
            }
        }
    }
}
