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

//! Error types for ledger validation and amount parsing.

use crate::base::DebtId;
use thiserror::Error;

/// Malformed simulation input.
///
/// Validation is all-or-nothing: the first offending record is reported and
/// no period is simulated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Two records share the same id
    #[error("duplicate debt id '{id}'")]
    DuplicateId { id: DebtId },

    /// Balance is below zero
    #[error("debt '{id}': balance must not be negative")]
    NegativeBalance { id: DebtId },

    /// Minimum payment is below zero
    #[error("debt '{id}': minimum_payment must not be negative")]
    NegativeMinimumPayment { id: DebtId },

    /// Annual interest rate is below zero
    #[error("debt '{id}': interest_rate_annual must not be negative")]
    NegativeInterestRate { id: DebtId },

    /// Period cap is zero
    #[error("max_periods must be positive")]
    InvalidMaxPeriods,

    /// Minor-unit scale is out of range
    #[error("unsupported scale {0} (at most {max})", max = crate::base::MAX_SCALE)]
    UnsupportedScale(u32),

    /// A budget amount is below zero
    #[error("budget: {field} must not be negative")]
    NegativeBudgetAmount { field: &'static str },

    /// Allowance percentage is outside 0..=100
    #[error("budget: allowance_percent must be between 0 and 100")]
    InvalidAllowance,

    /// Budget arithmetic left the decimal range
    #[error("budget: amounts are too large")]
    BudgetOutOfRange,
}

impl ValidationError {
    /// The debt the error refers to, if it is about a single record.
    pub fn debt_id(&self) -> Option<&DebtId> {
        match self {
            Self::DuplicateId { id }
            | Self::NegativeBalance { id }
            | Self::NegativeMinimumPayment { id }
            | Self::NegativeInterestRate { id } => Some(id),
            _ => None,
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::DuplicateId { .. } => "id",
            Self::NegativeBalance { .. } => "balance",
            Self::NegativeMinimumPayment { .. } => "minimum_payment",
            Self::NegativeInterestRate { .. } => "interest_rate_annual",
            Self::InvalidMaxPeriods => "max_periods",
            Self::UnsupportedScale(_) => "scale",
            Self::NegativeBudgetAmount { field } => field,
            Self::InvalidAllowance => "allowance_percent",
            Self::BudgetOutOfRange => "budget",
        }
    }
}

/// Failure to normalize a human-entered amount.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// Nothing left after stripping symbols and whitespace
    #[error("empty amount")]
    Empty,

    /// Not a number in any supported notation
    #[error("invalid amount '{0}'")]
    Invalid(String),
}
