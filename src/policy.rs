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

//! Payoff ordering policies.
//!
//! Both policies pick which debt receives the extra payment first:
//!
//! | Policy | Order |
//! |--------|-------|
//! | Snowball | Ascending balance |
//! | Avalanche | Descending annual interest rate |
//!
//! Ties are always broken by ascending debt id, so the ordering is total and
//! reproducible.

use crate::debt::DebtRecord;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayoffPolicy {
    Snowball,
    Avalanche,
}

impl PayoffPolicy {
    pub const ALL: [PayoffPolicy; 2] = [PayoffPolicy::Snowball, PayoffPolicy::Avalanche];

    /// Compares two unsettled records; `Less` means `a` is paid first.
    pub fn compare(&self, a: &DebtRecord, b: &DebtRecord) -> Ordering {
        let primary = match self {
            Self::Snowball => a.balance.cmp(&b.balance),
            Self::Avalanche => b.interest_rate_annual.cmp(&a.interest_rate_annual),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

impl fmt::Display for PayoffPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Snowball => write!(f, "snowball"),
            Self::Avalanche => write!(f, "avalanche"),
        }
    }
}

impl FromStr for PayoffPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "snowball" | "bola-de-nieve" | "bola de nieve" => Ok(Self::Snowball),
            "avalanche" | "avalancha" => Ok(Self::Avalanche),
            other => Err(format!("unknown payoff policy '{other}' (expected snowball or avalanche)")),
        }
    }
}

/// Returns the unsettled records in payoff order.
///
/// Settled records (zero balance) are dropped. The input is left untouched.
///
/// # Example
///
/// ```
/// use payoff_planner::{DebtRecord, PayoffPolicy, order};
/// use rust_decimal_macros::dec;
///
/// let debts = vec![
///     DebtRecord::new("car", dec!(9000), dec!(250), dec!(9)),
///     DebtRecord::new("visa", dec!(1200), dec!(40), dec!(28)),
///     DebtRecord::new("addi", dec!(0), dec!(0), dec!(0)),
/// ];
///
/// let ids: Vec<_> = order(&debts, PayoffPolicy::Snowball)
///     .iter()
///     .map(|d| d.id.as_str())
///     .collect();
/// assert_eq!(ids, ["visa", "car"]);
/// ```
pub fn order(records: &[DebtRecord], policy: PayoffPolicy) -> Vec<&DebtRecord> {
    order_indices(records, policy)
        .into_iter()
        .map(|index| &records[index])
        .collect()
}

/// Index form of [`order`], used by the simulation to address its working snapshot.
pub(crate) fn order_indices(records: &[DebtRecord], policy: PayoffPolicy) -> Vec<usize> {
    let mut indices: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| !record.is_settled())
        .map(|(index, _)| index)
        .collect();
    indices.sort_by(|&a, &b| policy.compare(&records[a], &records[b]));
    indices
}
