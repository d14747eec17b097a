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

//! Simulation output: per-period results and the assembled plan.

use crate::base::{DebtId, saturating_sum};
use crate::ledger::LedgerSnapshot;
use crate::policy::PayoffPolicy;
use rust_decimal::Decimal;
use serde::Serialize;

/// Whether a period's debt budget made progress on the debts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodStatus {
    /// Minimums were covered with money to spare, and payments at least
    /// matched the interest accrued.
    Funded,
    /// Nothing was left after minimums, or payments fell short of the
    /// interest accrued.
    Underfunded,
}

/// Money applied to one debt in one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Payment {
    pub id: DebtId,
    pub minimum: Decimal,
    pub extra: Decimal,
}

impl Payment {
    pub fn total(&self) -> Decimal {
        self.minimum + self.extra
    }
}

/// One simulated month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodResult {
    /// 1-based month number.
    pub period: u32,
    pub status: PeriodStatus,
    /// Balances after interest accrual and payments.
    pub snapshot: LedgerSnapshot,
    pub interest_accrued: Decimal,
    pub minimums_paid: Decimal,
    pub extra_applied: Decimal,
    /// Budget left over once every debt is settled.
    pub unallocated: Decimal,
    /// First debt in payoff order at the allocation step, when extra was available.
    pub focus: Option<DebtId>,
    /// Non-zero payments in allocation order.
    pub payments: Vec<Payment>,
    /// Debts that reached zero this period, in settlement order.
    pub settled: Vec<DebtId>,
}

impl PeriodResult {
    pub fn total_balance(&self) -> Decimal {
        self.snapshot.total_balance()
    }

    pub fn total_paid(&self) -> Decimal {
        self.minimums_paid + self.extra_applied
    }

    pub fn payment(&self, id: &DebtId) -> Option<&Payment> {
        self.payments.iter().find(|payment| &payment.id == id)
    }
}

/// How a plan ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlanOutcome {
    /// Every debt reached zero after `periods` months.
    Completed { periods: u32 },
    /// The period cap was hit, or balances left the representable range,
    /// with debts still outstanding.
    Stalled {
        at_period: u32,
        unsettled: Vec<DebtId>,
        remaining_balance: Decimal,
    },
}

/// When a debt is paid off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settlement {
    pub id: DebtId,
    pub period: u32,
}

/// A full payoff projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub policy: PayoffPolicy,
    pub free_cash_flow: Decimal,
    /// Money available for debt every month: free cash flow plus the
    /// starting minimum payments, floored at zero.
    pub monthly_budget: Decimal,
    /// Payoff order of the starting snapshot.
    pub payoff_order: Vec<DebtId>,
    pub initial: LedgerSnapshot,
    pub periods: Vec<PeriodResult>,
    pub outcome: PlanOutcome,
}

impl Plan {
    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, PlanOutcome::Completed { .. })
    }

    pub fn is_stalled(&self) -> bool {
        matches!(self.outcome, PlanOutcome::Stalled { .. })
    }

    /// Months until every debt is settled, or `None` for a stalled plan.
    pub fn months_to_payoff(&self) -> Option<u32> {
        match self.outcome {
            PlanOutcome::Completed { periods } => Some(periods),
            PlanOutcome::Stalled { .. } => None,
        }
    }

    /// Interest accrued over the whole plan, capped at [`Decimal::MAX`].
    pub fn total_interest(&self) -> Decimal {
        saturating_sum(self.periods.iter().map(|p| p.interest_accrued))
    }

    pub fn total_paid(&self) -> Decimal {
        saturating_sum(self.periods.iter().map(PeriodResult::total_paid))
    }

    /// Balances at the end of the last simulated period.
    pub fn final_snapshot(&self) -> &LedgerSnapshot {
        self.periods
            .last()
            .map(|p| &p.snapshot)
            .unwrap_or(&self.initial)
    }

    /// Month in which `id` was settled.
    pub fn settlement_period(&self, id: &DebtId) -> Option<u32> {
        self.periods
            .iter()
            .find(|p| p.settled.contains(id))
            .map(|p| p.period)
    }

    /// Settlement schedule in the order debts were paid off.
    pub fn settlements(&self) -> Vec<Settlement> {
        self.periods
            .iter()
            .flat_map(|p| {
                p.settled.iter().map(move |id| Settlement {
                    id: id.clone(),
                    period: p.period,
                })
            })
            .collect()
    }

    pub fn underfunded_periods(&self) -> usize {
        self.periods
            .iter()
            .filter(|p| p.status == PeriodStatus::Underfunded)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debt::DebtRecord;
    use rust_decimal_macros::dec;

    fn period(number: u32, balance: Decimal, interest: Decimal, settled: &[&str]) -> PeriodResult {
        PeriodResult {
            period: number,
            status: PeriodStatus::Funded,
            snapshot: LedgerSnapshot::from_validated(vec![DebtRecord::new(
                "card",
                balance,
                dec!(0),
                dec!(12),
            )]),
            interest_accrued: interest,
            minimums_paid: dec!(10),
            extra_applied: dec!(5),
            unallocated: Decimal::ZERO,
            focus: None,
            payments: Vec::new(),
            settled: settled.iter().map(|id| DebtId::new(*id)).collect(),
        }
    }

    fn plan(periods: Vec<PeriodResult>, outcome: PlanOutcome) -> Plan {
        Plan {
            policy: PayoffPolicy::Avalanche,
            free_cash_flow: dec!(5),
            monthly_budget: dec!(15),
            payoff_order: vec![DebtId::new("card")],
            initial: LedgerSnapshot::from_validated(vec![DebtRecord::new(
                "card",
                dec!(30),
                dec!(10),
                dec!(12),
            )]),
            periods,
            outcome,
        }
    }

    #[test]
    fn completed_plan_summaries() {
        let plan = plan(
            vec![
                period(1, dec!(15.30), dec!(0.30), &[]),
                period(2, dec!(0), dec!(0.15), &["card"]),
            ],
            PlanOutcome::Completed { periods: 2 },
        );
        assert!(plan.is_completed());
        assert_eq!(plan.months_to_payoff(), Some(2));
        assert_eq!(plan.total_interest(), dec!(0.45));
        assert_eq!(plan.total_paid(), dec!(30));
        assert_eq!(plan.settlement_period(&DebtId::new("card")), Some(2));
        assert_eq!(
            plan.settlements(),
            vec![Settlement {
                id: DebtId::new("card"),
                period: 2
            }]
        );
        assert_eq!(plan.final_snapshot().total_balance(), Decimal::ZERO);
    }

    #[test]
    fn empty_plan_falls_back_to_initial_snapshot() {
        let plan = plan(Vec::new(), PlanOutcome::Completed { periods: 0 });
        assert_eq!(plan.final_snapshot().total_balance(), dec!(30));
        assert_eq!(plan.total_interest(), Decimal::ZERO);
    }

    #[test]
    fn stalled_plan_has_no_payoff_month() {
        let plan = plan(
            vec![period(1, dec!(30.30), dec!(0.30), &[])],
            PlanOutcome::Stalled {
                at_period: 1,
                unsettled: vec![DebtId::new("card")],
                remaining_balance: dec!(30.30),
            },
        );
        assert!(plan.is_stalled());
        assert_eq!(plan.months_to_payoff(), None);
        assert_eq!(plan.settlement_period(&DebtId::new("card")), None);
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(PlanOutcome::Completed { periods: 7 }).unwrap();
        assert_eq!(json["status"], "completed");
        assert_eq!(json["periods"], 7);

        let json = serde_json::to_value(PlanOutcome::Stalled {
            at_period: 12,
            unsettled: vec![DebtId::new("loan")],
            remaining_balance: dec!(1425.77),
        })
        .unwrap();
        assert_eq!(json["status"], "stalled");
        assert_eq!(json["unsettled"][0], "loan");
        assert_eq!(json["remaining_balance"], "1425.77");
    }
}
