// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::LedgerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Expense,
    Income,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Expense => "expense",
            TransactionType::Income => "income",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "expense" => Ok(TransactionType::Expense),
            "income" => Ok(TransactionType::Income),
            other => Err(LedgerError::InvalidType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub color_hex: String,
}

impl Category {
    pub fn new(name: impl Into<String>, color_hex: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            color_hex: color_hex.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub amount: Decimal,
    /// Local wall-clock time of the transaction.
    pub date: NaiveDateTime,
    pub note: String,
    pub kind: TransactionType,
    pub category: Option<Category>,
    pub tags: Vec<Tag>,
    pub is_recurring: bool,
    /// Stored and displayed, never interpreted.
    pub recurrence_rule: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(amount: Decimal, date: NaiveDateTime, kind: TransactionType) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            amount,
            date,
            note: String::new(),
            kind,
            category: None,
            tags: Vec::new(),
            is_recurring: false,
            recurrence_rule: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_category(mut self, category: &Category) -> Self {
        self.category = Some(category.clone());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: Uuid,
    pub category_id: Uuid,
    /// Label copied from the category name; renames migrate it.
    pub name: String,
    pub amount: Decimal,
    pub period_start: NaiveDate,
    /// Exclusive.
    pub period_end: NaiveDate,
}

impl Budget {
    pub fn new(
        category: &Category,
        amount: Decimal,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            category_id: category.id,
            name: category.name.clone(),
            amount,
            period_start,
            period_end,
        }
    }

    pub fn covers(&self, day: NaiveDate) -> bool {
        self.period_start <= day && day < self.period_end
    }
}

/// Consistent copy of the ledger handed to the aggregation engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub transactions: Vec<Transaction>,
    pub categories: Vec<Category>,
    pub budgets: Vec<Budget>,
    pub tags: Vec<Tag>,
}
