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

//! Validated debt snapshots.

use crate::base::{DebtId, saturating_sum};
use crate::debt::DebtRecord;
use crate::error::ValidationError;
use crate::policy::{PayoffPolicy, order};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;

/// Debt records at a point in time, in caller order.
///
/// # Invariants
///
/// - Ids are unique.
/// - Balances, minimum payments and interest rates are non-negative.
///
/// The simulation never edits a snapshot; each period yields a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LedgerSnapshot {
    records: Vec<DebtRecord>,
}

impl LedgerSnapshot {
    /// Validates `records` and wraps them.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::DuplicateId`] - Two records share an id.
    /// - [`ValidationError::NegativeBalance`] - A balance is below zero.
    /// - [`ValidationError::NegativeMinimumPayment`] - A minimum payment is below zero.
    /// - [`ValidationError::NegativeInterestRate`] - An annual rate is below zero.
    pub fn new(records: Vec<DebtRecord>) -> Result<Self, ValidationError> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(&record.id) {
                return Err(ValidationError::DuplicateId {
                    id: record.id.clone(),
                });
            }
            if record.balance < Decimal::ZERO {
                return Err(ValidationError::NegativeBalance {
                    id: record.id.clone(),
                });
            }
            if record.minimum_payment < Decimal::ZERO {
                return Err(ValidationError::NegativeMinimumPayment {
                    id: record.id.clone(),
                });
            }
            if record.interest_rate_annual < Decimal::ZERO {
                return Err(ValidationError::NegativeInterestRate {
                    id: record.id.clone(),
                });
            }
        }
        Ok(Self { records })
    }

    /// Builds a snapshot from records already known to be valid.
    pub(crate) fn from_validated(records: Vec<DebtRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[DebtRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &DebtId) -> Option<&DebtRecord> {
        self.records.iter().find(|record| &record.id == id)
    }

    /// Sum of all balances, capped at [`Decimal::MAX`].
    pub fn total_balance(&self) -> Decimal {
        saturating_sum(self.records.iter().map(|record| record.balance))
    }

    /// Sum of minimum payments of the records still outstanding, capped at
    /// [`Decimal::MAX`].
    pub fn total_minimum_payments(&self) -> Decimal {
        saturating_sum(self.unsettled().map(|record| record.minimum_payment))
    }

    pub fn unsettled(&self) -> impl Iterator<Item = &DebtRecord> {
        self.records.iter().filter(|record| !record.is_settled())
    }

    /// True when every balance is zero (vacuously true for an empty ledger).
    pub fn is_settled(&self) -> bool {
        self.records.iter().all(DebtRecord::is_settled)
    }

    /// Unsettled records in payoff order for `policy`.
    pub fn order(&self, policy: PayoffPolicy) -> Vec<&DebtRecord> {
        order(&self.records, policy)
    }

    pub fn into_records(self) -> Vec<DebtRecord> {
        self.records
    }
}
