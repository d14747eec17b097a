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

//! # Payoff Planner
//!
//! This library simulates debt repayment plans month by month using the
//! snowball (smallest balance first) or avalanche (highest rate first) method.
//!
//! ## Core Components
//!
//! - [`DebtRecord`]: One outstanding obligation
//! - [`LedgerSnapshot`]: Validated debts at a point in time
//! - [`PayoffPolicy`] and [`order`]: Which debt receives extra money first
//! - [`Simulation`] and [`simulate`]: Lazy month-by-month projection into a [`Plan`]
//! - [`compare`]: Runs both policies and recommends one
//! - [`Budget`]: Derives free cash flow from income and expenses
//! - [`parse_amount`]: Normalizes human-entered currency strings
//!
//! ## Example
//!
//! ```
//! use payoff_planner::{DebtId, DebtRecord, PayoffPolicy, simulate};
//! use rust_decimal_macros::dec;
//!
//! let debts = vec![
//!     DebtRecord::new("A", dec!(100), dec!(0), dec!(0)),
//!     DebtRecord::new("B", dec!(50), dec!(0), dec!(0)),
//!     DebtRecord::new("C", dec!(200), dec!(0), dec!(0)),
//! ];
//!
//! let plan = simulate(&debts, dec!(200), PayoffPolicy::Snowball, 1200).unwrap();
//!
//! // 200 settles B (50) and A (100), the remaining 50 goes to C.
//! let first = &plan.periods[0];
//! assert_eq!(first.settled, vec![DebtId::new("B"), DebtId::new("A")]);
//! assert_eq!(first.snapshot.get(&DebtId::new("C")).unwrap().balance, dec!(150));
//! assert_eq!(plan.months_to_payoff(), Some(2));
//! ```
//!
//! ## Thread Safety
//!
//! Simulations share no state. Every call is pure and may run concurrently
//! with any other.

mod amount;
mod base;
mod budget;
mod debt;
mod engine;
pub mod error;
mod ledger;
mod plan;
mod policy;

pub use amount::parse_amount;
pub use base::{DEFAULT_SCALE, DebtId, MAX_SCALE};
pub use budget::{Budget, CashFlow};
pub use debt::DebtRecord;
pub use engine::{Comparison, Simulation, compare, compare_snapshot, simulate};
pub use error::{AmountError, ValidationError};
pub use ledger::LedgerSnapshot;
pub use plan::{Payment, PeriodResult, PeriodStatus, Plan, PlanOutcome, Settlement};
pub use policy::{PayoffPolicy, order};
