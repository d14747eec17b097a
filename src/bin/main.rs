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

use clap::{Parser, ValueEnum};
use csv::{ReaderBuilder, Trim, Writer};
use log::{info, warn};
use payoff_planner::{
    Budget, Comparison, DEFAULT_SCALE, DebtId, DebtRecord, LedgerSnapshot, PayoffPolicy,
    PeriodStatus, Plan, PlanOutcome, Simulation, ValidationError, compare_snapshot, parse_amount,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;
use thiserror::Error;

/// Payoff Planner - Simulate debt payoff plans
///
/// Reads debts from a CSV file and writes a month-by-month payoff schedule
/// to stdout using the snowball or avalanche method.
#[derive(Parser, Debug)]
#[command(name = "payoff-planner")]
#[command(about = "Simulates snowball and avalanche debt payoff plans", long_about = None)]
struct Args {
    /// Path to CSV file with debts
    ///
    /// Expected format: id,balance,minimum_payment,interest_rate
    /// Example: cargo run -- debts.csv --income 3000000 --fixed-expenses 658000
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Which debt receives extra payments first
    #[arg(long, default_value = "avalanche", conflicts_with = "compare")]
    policy: PayoffPolicy,

    /// Simulate both policies and recommend one
    #[arg(long)]
    compare: bool,

    /// Monthly money left after expenses and minimum payments
    #[arg(long, value_parser = parse_amount, allow_hyphen_values = true, conflicts_with = "income")]
    free_cash_flow: Option<Decimal>,

    /// Net monthly income
    #[arg(long, value_parser = parse_amount, required_unless_present = "free_cash_flow")]
    income: Option<Decimal>,

    /// Rent, food, utilities
    #[arg(long, value_parser = parse_amount, default_value = "0")]
    fixed_expenses: Decimal,

    /// Small variable spending
    #[arg(long, value_parser = parse_amount, default_value = "0")]
    discretionary: Decimal,

    /// Share of the surplus kept for personal spending (0-100)
    #[arg(long, value_parser = parse_amount, default_value = "0")]
    allowance_percent: Decimal,

    /// Give up after this many months
    #[arg(long, default_value_t = 1200)]
    max_periods: u32,

    /// Decimal places of the currency's minor unit (0 for COP)
    #[arg(long, default_value_t = DEFAULT_SCALE)]
    scale: u32,

    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("error writing output: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // Parse command line arguments
    let args = Args::parse();

    // Open input file
    let file = match File::open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening file '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };

    // Load and validate debts
    let snapshot = match read_debts(BufReader::new(file)) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            eprintln!("Error loading debts: {}", e);
            process::exit(1);
        }
    };

    // Simulate and write results to stdout
    if let Err(e) = run(&args, snapshot, std::io::stdout().lock()) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Raw CSV record matching the input format.
///
/// Fields: `id, balance, minimum_payment, interest_rate`
#[derive(Debug, Deserialize)]
struct CsvRecord {
    id: String,
    balance: String,
    minimum_payment: String,
    #[serde(default, alias = "interest_rate_annual")]
    interest_rate: Option<String>,
}

impl CsvRecord {
    /// Converts the CSV record into a DebtRecord.
    ///
    /// Returns `None` for an empty id or amounts that do not parse.
    fn into_debt(self) -> Option<DebtRecord> {
        if self.id.is_empty() {
            return None;
        }
        let interest_rate = match self.interest_rate.as_deref() {
            None | Some("") => Decimal::ZERO,
            Some(rate) => parse_amount(rate.trim_end_matches('%')).ok()?,
        };
        Some(DebtRecord::new(
            self.id,
            parse_amount(&self.balance).ok()?,
            parse_amount(&self.minimum_payment).ok()?,
            interest_rate,
        ))
    }
}

/// Read debts from a CSV reader.
///
/// Malformed rows are skipped with a warning. The remaining records are
/// validated together; a duplicate id or a negative amount rejects the file.
///
/// # CSV Format
///
/// ```csv
/// id,balance,minimum_payment,interest_rate
/// addi,"$450.000",150000,0
/// visa,1200000,90000,28%
/// ```
///
/// # Errors
///
/// Returns a CSV error if the reader fails, or a validation error.
fn read_debts<R: Read>(reader: R) -> Result<LedgerSnapshot, CliError> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All) // Handle whitespace in fields like " visa "
        .flexible(true) // Allow a missing interest_rate field
        .has_headers(true)
        .from_reader(reader);

    let mut records = Vec::new();
    for (line, result) in rdr.deserialize::<CsvRecord>().enumerate() {
        match result {
            Ok(record) => {
                let Some(debt) = record.into_debt() else {
                    warn!("Skipping invalid debt record on row {}", line + 1);
                    continue;
                };
                records.push(debt);
            }
            Err(e) => {
                warn!("Skipping malformed row: {}", e);
                continue;
            }
        }
    }

    Ok(LedgerSnapshot::new(records)?)
}

/// Resolves free cash flow from the explicit flag or the budget flags.
fn free_cash_flow(args: &Args, snapshot: &LedgerSnapshot) -> Result<Decimal, ValidationError> {
    if let Some(free_cash_flow) = args.free_cash_flow {
        return Ok(free_cash_flow);
    }

    let flow = Budget::new(args.income.unwrap_or(Decimal::ZERO), args.fixed_expenses)
        .with_discretionary(args.discretionary)
        .with_allowance_percent(args.allowance_percent)
        .cash_flow_with_scale(snapshot, args.scale)?;
    info!(
        "income {} - fixed {} - discretionary {} - minimums {} - allowance {} = free cash flow {}",
        flow.income,
        flow.fixed_expenses,
        flow.discretionary_expenses,
        flow.minimum_payments,
        flow.allowance,
        flow.free_cash_flow
    );
    Ok(flow.free_cash_flow)
}

fn run<W: Write>(args: &Args, snapshot: LedgerSnapshot, writer: W) -> Result<(), CliError> {
    let free_cash_flow = free_cash_flow(args, &snapshot)?;

    if args.compare {
        let comparison = compare_snapshot(&snapshot, free_cash_flow, args.max_periods, args.scale)?;
        match comparison.recommended {
            Some(policy) => info!("recommended policy: {}", policy),
            None => warn!("neither policy pays off the debts within {} months", args.max_periods),
        }
        match args.format {
            OutputFormat::Csv => write_comparison(&comparison, writer)?,
            OutputFormat::Json => serde_json::to_writer_pretty(writer, &comparison)?,
        }
    } else {
        let plan = Simulation::from_snapshot(snapshot, free_cash_flow, args.policy, args.max_periods)?
            .with_scale(args.scale)?
            .into_plan();
        log_outcome(&plan);
        match args.format {
            OutputFormat::Csv => write_schedule(&plan, writer)?,
            OutputFormat::Json => serde_json::to_writer_pretty(writer, &plan)?,
        }
    }

    Ok(())
}

fn log_outcome(plan: &Plan) {
    match &plan.outcome {
        PlanOutcome::Completed { periods } => info!(
            "{} plan: debt free after {} months, {} interest",
            plan.policy,
            periods,
            plan.total_interest()
        ),
        PlanOutcome::Stalled {
            at_period,
            unsettled,
            remaining_balance,
        } => warn!(
            "{} plan stalled after {} months: {} debts unsettled, {} outstanding",
            plan.policy,
            at_period,
            unsettled.len(),
            remaining_balance
        ),
    }
}

/// One debt in one month of the schedule.
#[derive(Debug, Serialize)]
struct ScheduleRow<'a> {
    period: u32,
    status: PeriodStatus,
    debt: &'a DebtId,
    interest: Decimal,
    minimum: Decimal,
    extra: Decimal,
    balance: Decimal,
    settled: bool,
}

/// Write the payoff schedule to a CSV writer.
///
/// One row per debt that was outstanding at the start of the month.
///
/// # CSV Format
///
/// ```csv
/// period,status,debt,interest,minimum,extra,balance,settled
/// 1,funded,B,0,0,50,0,true
/// 1,funded,A,0,0,100,0,true
/// ```
fn write_schedule<W: Write>(plan: &Plan, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    let mut previous = &plan.initial;
    for period in &plan.periods {
        for record in period.snapshot.records() {
            let Some(opening) = previous.get(&record.id) else {
                continue;
            };
            if opening.is_settled() {
                continue;
            }
            let (minimum, extra) = period
                .payment(&record.id)
                .map(|p| (p.minimum, p.extra))
                .unwrap_or_default();
            wtr.serialize(ScheduleRow {
                period: period.period,
                status: period.status,
                debt: &record.id,
                interest: record.balance + minimum + extra - opening.balance,
                minimum,
                extra,
                balance: record.balance,
                settled: period.settled.contains(&record.id),
            })?;
        }
        previous = &period.snapshot;
    }

    // Flush to ensure all data is written
    wtr.flush()?;
    Ok(())
}

/// Side-by-side summary of both policies.
#[derive(Debug, Serialize)]
struct ComparisonRow {
    policy: PayoffPolicy,
    months: Option<u32>,
    total_interest: Decimal,
    total_paid: Decimal,
    stalled: bool,
    recommended: bool,
}

fn write_comparison<W: Write>(comparison: &Comparison, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    for policy in PayoffPolicy::ALL {
        let plan = comparison.plan(policy);
        wtr.serialize(ComparisonRow {
            policy,
            months: plan.months_to_payoff(),
            total_interest: plan.total_interest(),
            total_paid: plan.total_paid(),
            stalled: plan.is_stalled(),
            recommended: comparison.recommended == Some(policy),
        })?;
    }

    wtr.flush()?;
    Ok(())
}
