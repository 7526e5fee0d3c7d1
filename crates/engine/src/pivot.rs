//! Category x year pivot aggregation.
//!
//! A pure function from (records, category metadata) to a pivoted grid
//! with row/column/grand totals and an income/expense/net summary. No
//! I/O, no internal state; the same inputs always produce the same
//! output with the same key order.

use std::collections::BTreeMap;
use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::classify::CategoryKind;
use crate::{categories, records};

/// Echo of one source record, joined to its category name.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecordRef {
    pub id: Uuid,
    pub category: String,
    pub year: i32,
    pub amount: f64,
}

/// Income/expense/net figures per year and in total.
///
/// Debt-kind amounts contribute to none of these. Signs are accumulated
/// as given, never normalized.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FinancialSummary {
    pub income_by_year: BTreeMap<i32, f64>,
    pub expenses_by_year: BTreeMap<i32, f64>,
    pub net_by_year: BTreeMap<i32, f64>,
    pub total_income: f64,
    pub total_expenses: f64,
    pub total_net: f64,
}

/// The derived pivot. Recomputed on every read, never persisted.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PivotedCashflow {
    pub by_category: BTreeMap<String, BTreeMap<i32, f64>>,
    pub by_year: BTreeMap<i32, BTreeMap<String, f64>>,
    /// Distinct years, ascending.
    pub years: Vec<i32>,
    /// Distinct category names, lexicographic.
    pub category_names: Vec<String>,
    pub category_kinds: BTreeMap<String, CategoryKind>,
    pub row_totals: BTreeMap<String, f64>,
    pub column_totals: BTreeMap<i32, f64>,
    pub grand_total: f64,
    pub summary: FinancialSummary,
    pub records: Vec<RecordRef>,
}

/// Build the pivot for one source file's records.
///
/// Records whose category id has no entry in `categories` are skipped:
/// defensive against stale references, logged but never fatal.
pub fn compute(records: &[records::Model], categories: &[categories::Model]) -> PivotedCashflow {
    let by_id: HashMap<Uuid, &categories::Model> = categories
        .iter()
        .map(|category| (category.id, category))
        .collect();

    let mut by_category: BTreeMap<String, BTreeMap<i32, f64>> = BTreeMap::new();
    let mut by_year: BTreeMap<i32, BTreeMap<String, f64>> = BTreeMap::new();
    let mut category_kinds: BTreeMap<String, CategoryKind> = BTreeMap::new();
    let mut summary = FinancialSummary::default();
    let mut echoes = Vec::with_capacity(records.len());

    for record in records {
        let Some(category) = by_id.get(&record.category_id) else {
            tracing::warn!(
                record = %record.id,
                category = %record.category_id,
                "record references unknown category, skipping"
            );
            continue;
        };

        let name = category.name.clone();
        *by_category
            .entry(name.clone())
            .or_default()
            .entry(record.year)
            .or_default() += record.amount;
        *by_year
            .entry(record.year)
            .or_default()
            .entry(name.clone())
            .or_default() += record.amount;

        let kind = CategoryKind::try_from(category.kind.as_str()).ok();
        if let Some(kind) = kind {
            category_kinds.entry(name.clone()).or_insert(kind);
        }
        match kind {
            Some(CategoryKind::Income) => {
                *summary.income_by_year.entry(record.year).or_default() += record.amount;
                summary.total_income += record.amount;
            }
            Some(CategoryKind::Expense) => {
                *summary.expenses_by_year.entry(record.year).or_default() += record.amount;
                summary.total_expenses += record.amount;
            }
            // Debt and anything unrecognized stay out of the summary.
            Some(CategoryKind::Debt) | None => {}
        }

        echoes.push(RecordRef {
            id: record.id,
            category: name,
            year: record.year,
            amount: record.amount,
        });
    }

    let years: Vec<i32> = by_year.keys().copied().collect();
    let category_names: Vec<String> = by_category.keys().cloned().collect();

    for year in &years {
        summary.income_by_year.entry(*year).or_default();
        summary.expenses_by_year.entry(*year).or_default();
        let income = summary.income_by_year[year];
        let expenses = summary.expenses_by_year[year];
        summary.net_by_year.insert(*year, income - expenses);
    }
    summary.total_net = summary.total_income - summary.total_expenses;

    let row_totals: BTreeMap<String, f64> = by_category
        .iter()
        .map(|(name, cells)| (name.clone(), cells.values().sum()))
        .collect();
    let column_totals: BTreeMap<i32, f64> = by_year
        .iter()
        .map(|(year, cells)| (*year, cells.values().sum()))
        .collect();
    let grand_total = row_totals.values().sum();

    PivotedCashflow {
        by_category,
        by_year,
        years,
        category_names,
        category_kinds,
        row_totals,
        column_totals,
        grand_total,
        summary,
        records: echoes,
    }
}
