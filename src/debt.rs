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

//! Debt records.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use payoff_planner::DebtRecord;
//!
//! let card = DebtRecord::new("visa", dec!(1000.00), dec!(35.00), dec!(24));
//! assert!(!card.is_settled());
//! assert_eq!(card.monthly_interest(2), Some(dec!(20.00)));
//! ```

use crate::base::{DebtId, round_half_up};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// `12 months * 100 percent`
const MONTHLY_RATE_DIVISOR: Decimal = dec!(1200);

/// One outstanding obligation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtRecord {
    pub id: DebtId,
    pub balance: Decimal,
    /// Due every period regardless of strategy.
    pub minimum_payment: Decimal,
    /// Percentage, `24` means 24% per year.
    #[serde(default)]
    pub interest_rate_annual: Decimal,
}

impl DebtRecord {
    pub fn new(
        id: impl Into<DebtId>,
        balance: Decimal,
        minimum_payment: Decimal,
        interest_rate_annual: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            balance,
            minimum_payment,
            interest_rate_annual,
        }
    }

    /// A record with zero balance takes no further part in allocation.
    pub fn is_settled(&self) -> bool {
        self.balance.is_zero()
    }

    /// One month of interest on the current balance, rounded half-up to `scale`.
    ///
    /// Returns `None` if the computation leaves the decimal range.
    pub fn monthly_interest(&self, scale: u32) -> Option<Decimal> {
        if self.is_settled() || self.interest_rate_annual.is_zero() {
            return Some(Decimal::ZERO);
        }
        let raw = self
            .balance
            .checked_mul(self.interest_rate_annual)?
            .checked_div(MONTHLY_RATE_DIVISOR)?;
        Some(round_half_up(raw, scale))
    }

    /// The minimum actually owed this period: never more than the balance.
    pub fn minimum_due(&self) -> Decimal {
        self.minimum_payment.min(self.balance)
    }

    /// Returns a copy with `amount` removed from the balance.
    ///
    /// Payments are capped by the caller, so the balance never goes below zero.
    pub(crate) fn paid(&self, amount: Decimal) -> Self {
        debug_assert!(
            amount <= self.balance,
            "Invariant violated: payment {} exceeds balance {} of {}",
            amount,
            self.balance,
            self.id
        );
        Self {
            balance: self.balance - amount,
            ..self.clone()
        }
    }

    /// Returns a copy with `interest` added to the balance.
    pub(crate) fn accrued(&self, interest: Decimal) -> Option<Self> {
        Some(Self {
            balance: self.balance.checked_add(interest)?,
            ..self.clone()
        })
    }
}
