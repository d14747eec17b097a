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

//! Monthly budget and free cash flow.
//!
//! Turns the figures a household enters (income, fixed costs, discretionary
//! spend) into the free cash flow the engine allocates. A share of the
//! surplus can be kept aside as a personal allowance so the plan stays
//! livable; it is never applied to debt.

use crate::base::{DEFAULT_SCALE, round_half_up};
use crate::error::ValidationError;
use crate::ledger::LedgerSnapshot;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

const ONE_HUNDRED: Decimal = dec!(100);

/// Monthly household figures.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Budget {
    /// Net monthly income.
    pub income: Decimal,
    /// Rent, food, utilities.
    pub fixed_expenses: Decimal,
    /// Small variable spending.
    #[serde(default)]
    pub discretionary_expenses: Decimal,
    /// Percentage of the surplus after minimums kept for personal spending.
    #[serde(default)]
    pub allowance_percent: Decimal,
}

/// Breakdown of where a month's income goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CashFlow {
    pub income: Decimal,
    pub fixed_expenses: Decimal,
    pub discretionary_expenses: Decimal,
    pub minimum_payments: Decimal,
    pub allowance: Decimal,
    /// What is left for extra principal; negative when minimums are not covered.
    pub free_cash_flow: Decimal,
}

impl Budget {
    pub fn new(income: Decimal, fixed_expenses: Decimal) -> Self {
        Self {
            income,
            fixed_expenses,
            ..Self::default()
        }
    }

    pub fn with_discretionary(mut self, amount: Decimal) -> Self {
        self.discretionary_expenses = amount;
        self
    }

    pub fn with_allowance_percent(mut self, percent: Decimal) -> Self {
        self.allowance_percent = percent;
        self
    }

    /// Computes free cash flow against the minimums of `ledger`, rounding the
    /// allowance to cents.
    pub fn cash_flow(&self, ledger: &LedgerSnapshot) -> Result<CashFlow, ValidationError> {
        self.cash_flow_with_scale(ledger, DEFAULT_SCALE)
    }

    /// # Errors
    ///
    /// - [`ValidationError::NegativeBudgetAmount`] - An amount is below zero.
    /// - [`ValidationError::InvalidAllowance`] - Allowance outside `0..=100`.
    /// - [`ValidationError::BudgetOutOfRange`] - Expenses exceed the decimal range.
    pub fn cash_flow_with_scale(
        &self,
        ledger: &LedgerSnapshot,
        scale: u32,
    ) -> Result<CashFlow, ValidationError> {
        self.validate()?;

        let minimum_payments = ledger.total_minimum_payments();
        let surplus = [self.fixed_expenses, self.discretionary_expenses, minimum_payments]
            .into_iter()
            .try_fold(self.income, Decimal::checked_sub)
            .ok_or(ValidationError::BudgetOutOfRange)?;
        // The share is at most one, so the allowance never exceeds the surplus.
        let allowance = if surplus > Decimal::ZERO {
            let share = self.allowance_percent / ONE_HUNDRED;
            let allowance = surplus
                .checked_mul(share)
                .ok_or(ValidationError::BudgetOutOfRange)?;
            round_half_up(allowance, scale).min(surplus)
        } else {
            Decimal::ZERO
        };

        Ok(CashFlow {
            income: self.income,
            fixed_expenses: self.fixed_expenses,
            discretionary_expenses: self.discretionary_expenses,
            minimum_payments,
            allowance,
            free_cash_flow: surplus - allowance,
        })
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let amounts = [
            ("income", self.income),
            ("fixed_expenses", self.fixed_expenses),
            ("discretionary_expenses", self.discretionary_expenses),
        ];
        if let Some(&(field, _)) = amounts.iter().find(|(_, amount)| *amount < Decimal::ZERO) {
            return Err(ValidationError::NegativeBudgetAmount { field });
        }
        if self.allowance_percent < Decimal::ZERO || self.allowance_percent > ONE_HUNDRED {
            return Err(ValidationError::InvalidAllowance);
        }
        Ok(())
    }
}
