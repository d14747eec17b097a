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

//! Core identifier and money types shared across the engine.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default number of minor-unit decimal places (cents).
pub const DEFAULT_SCALE: u32 = 2;

/// Largest supported minor-unit scale.
pub const MAX_SCALE: u32 = 8;

/// Unique identifier for a debt within a ledger.
///
/// Wraps the caller-facing name (`"addi"`, `"visa"`, ...). Ordering is
/// lexicographic and is the final tie-break of every payoff policy.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct DebtId(pub String);

impl DebtId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DebtId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DebtId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DebtId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Rounds an amount half-up (away from zero) to `scale` decimal places.
pub(crate) fn round_half_up(amount: Decimal, scale: u32) -> Decimal {
    amount.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
}

/// Sum of `amounts`, or `None` if it leaves the decimal range.
pub(crate) fn checked_sum(amounts: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    amounts.into_iter().try_fold(Decimal::ZERO, Decimal::checked_add)
}

/// Sum of non-negative `amounts`, capped at [`Decimal::MAX`].
pub(crate) fn saturating_sum(amounts: impl IntoIterator<Item = Decimal>) -> Decimal {
    checked_sum(amounts).unwrap_or(Decimal::MAX)
}
