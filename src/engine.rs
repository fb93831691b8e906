// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Budget and category aggregation over a ledger snapshot.
//!
//! Everything here is a pure function of its inputs: no I/O, no shared
//! state, and no error paths. Sparse data degrades to zero or `None`.
//! Sums saturate at `Decimal::MAX`/`Decimal::MIN` instead of overflowing.

use std::collections::HashMap;

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Budget, Category, Snapshot, Transaction, TransactionType};

/// Label used for transactions without a category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Slices with a share at or below this are shown only in a legend.
pub const LABEL_SHARE_THRESHOLD: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// Half-open `[start, end)` interval of the calendar month containing `now`.
pub fn month_bounds(now: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    let first = now.date().with_day(1).unwrap_or(now.date());
    let start = first.and_time(chrono::NaiveTime::MIN);
    let end = start
        .checked_add_months(Months::new(1))
        .unwrap_or(NaiveDateTime::MAX);
    (start, end)
}

/// Same as [`month_bounds`] for a `YYYY-MM` anchor expressed as its first day.
pub fn month_bounds_of(first_day: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    month_bounds(first_day.and_time(chrono::NaiveTime::MIN))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetProgress {
    pub category: String,
    pub ceiling: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
    /// Always within `[0, 1]`.
    pub progress: Decimal,
    pub is_over_budget: bool,
}

impl BudgetProgress {
    pub fn has_budget(&self) -> bool {
        self.ceiling > Decimal::ZERO
    }
}

/// Sum of `|amount|` over expenses in `category` dated within `[start, end)`.
pub fn spent_in_period(
    transactions: &[Transaction],
    category: &Category,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Decimal {
    transactions
        .iter()
        .filter(|tx| tx.kind == TransactionType::Expense)
        .filter(|tx| tx.category_name() == Some(category.name.as_str()))
        .filter(|tx| tx.date >= start && tx.date < end)
        .fold(Decimal::ZERO, |acc, tx| acc.saturating_add(tx.amount.abs()))
}

/// Picks the budget for `category` that applies to the month starting on `month_start`.
///
/// A budget whose period covers the month wins. Otherwise the most recent
/// budget that started before the month carries forward.
pub fn find_budget<'a>(
    budgets: &'a [Budget],
    category: &Category,
    month_start: NaiveDate,
) -> Option<&'a Budget> {
    let linked = || budgets.iter().filter(|b| b.category_id == category.id);
    linked().find(|b| b.covers(month_start)).or_else(|| {
        linked()
            .filter(|b| b.period_start <= month_start)
            .max_by_key(|b| b.period_start)
    })
}

pub fn budget_progress(
    transactions: &[Transaction],
    budgets: &[Budget],
    category: &Category,
    now: NaiveDateTime,
) -> BudgetProgress {
    let (start, end) = month_bounds(now);
    let spent = spent_in_period(transactions, category, start, end);
    let ceiling = find_budget(budgets, category, start.date())
        .map(|b| b.amount)
        .unwrap_or(Decimal::ZERO);

    let remaining = ceiling.saturating_sub(spent);
    let progress = if ceiling > Decimal::ZERO {
        // a quotient too large to represent is far past the ceiling
        spent
            .checked_div(ceiling)
            .unwrap_or(Decimal::ONE)
            .clamp(Decimal::ZERO, Decimal::ONE)
    } else {
        Decimal::ZERO
    };

    BudgetProgress {
        category: category.name.clone(),
        ceiling,
        spent,
        remaining,
        progress,
        is_over_budget: ceiling > Decimal::ZERO && remaining < Decimal::ZERO,
    }
}

/// Budget progress for every category, in snapshot order.
pub fn budget_overview(snapshot: &Snapshot, now: NaiveDateTime) -> Vec<BudgetProgress> {
    snapshot
        .categories
        .iter()
        .map(|c| budget_progress(&snapshot.transactions, &snapshot.budgets, c, now))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slice {
    pub category: String,
    pub color_hex: Option<String>,
    pub total: Decimal,
    /// `total / grand_total`, absent when the grand total is not positive.
    /// Signed income slices can push it outside `[0, 1]`.
    pub share: Option<Decimal>,
}

impl Slice {
    pub fn shows_label(&self) -> bool {
        self.share.is_some_and(|s| s > LABEL_SHARE_THRESHOLD)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryBreakdown {
    pub slices: Vec<Slice>,
    pub grand_total: Decimal,
}

impl CategoryBreakdown {
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }
}

fn contribution(tx: &Transaction) -> Decimal {
    match tx.kind {
        TransactionType::Expense => tx.amount.abs(),
        TransactionType::Income => tx.amount,
    }
}

/// Groups transactions by category name for a pie-style breakdown.
///
/// `None` keeps every transaction in one summation; see [`analytics`] for
/// the split view.
pub fn breakdown_by_category(
    transactions: &[Transaction],
    filter: Option<TransactionType>,
) -> CategoryBreakdown {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut slices: Vec<Slice> = Vec::new();

    for tx in transactions
        .iter()
        .filter(|tx| filter.is_none_or(|kind| tx.kind == kind))
    {
        let name = tx.category_name().unwrap_or(UNCATEGORIZED);
        let i = *index.entry(name).or_insert_with(|| {
            slices.push(Slice {
                category: name.to_string(),
                color_hex: None,
                total: Decimal::ZERO,
                share: None,
            });
            slices.len() - 1
        });
        let slice = &mut slices[i];
        slice.total = slice.total.saturating_add(contribution(tx));
        if let Some(cat) = &tx.category {
            slice.color_hex = Some(cat.color_hex.clone());
        }
    }

    slices.retain(|s| !s.total.is_zero());
    slices.sort_by(|a, b| b.total.cmp(&a.total));

    let grand_total = slices
        .iter()
        .fold(Decimal::ZERO, |acc, s| acc.saturating_add(s.total));
    if grand_total > Decimal::ZERO {
        for slice in &mut slices {
            let share = slice.total.checked_div(grand_total).unwrap_or(
                if slice.total.is_sign_negative() {
                    Decimal::MIN
                } else {
                    Decimal::MAX
                },
            );
            slice.share = Some(share);
        }
    }

    CategoryBreakdown {
        slices,
        grand_total,
    }
}

/// Expense and income breakdowns kept apart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Analytics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expense: Option<CategoryBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub income: Option<CategoryBreakdown>,
}

pub fn analytics(transactions: &[Transaction], filter: Option<TransactionType>) -> Analytics {
    let side = |kind| Some(breakdown_by_category(transactions, Some(kind)));
    match filter {
        Some(TransactionType::Expense) => Analytics {
            expense: side(TransactionType::Expense),
            income: None,
        },
        Some(TransactionType::Income) => Analytics {
            expense: None,
            income: side(TransactionType::Income),
        },
        None => Analytics {
            expense: side(TransactionType::Expense),
            income: side(TransactionType::Income),
        },
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CashFlow {
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
}

/// Income and expense totals, optionally limited to `[start, end)`.
pub fn cash_flow(
    transactions: &[Transaction],
    window: Option<(NaiveDateTime, NaiveDateTime)>,
) -> CashFlow {
    let mut flow = CashFlow::default();
    for tx in transactions {
        if let Some((start, end)) = window {
            if tx.date < start || tx.date >= end {
                continue;
            }
        }
        match tx.kind {
            TransactionType::Income => flow.income = flow.income.saturating_add(tx.amount),
            TransactionType::Expense => {
                flow.expense = flow.expense.saturating_add(tx.amount.abs())
            }
        }
    }
    flow.net = flow.income.saturating_sub(flow.expense);
    flow
}
