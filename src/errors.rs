// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Failures raised by the ledger store and input parsing.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Category '{0}' not found")]
    CategoryNotFound(String),
    #[error("Tag '{0}' not found")]
    TagNotFound(String),
    #[error("Transaction '{0}' not found")]
    TransactionNotFound(String),
    #[error("No budget for '{0}' in {1}")]
    BudgetNotFound(String, String),
    #[error("Name must not be empty")]
    EmptyName,
    #[error("'{0}' already exists")]
    DuplicateName(String),
    #[error("Invalid amount '{0}'")]
    InvalidAmount(String),
    #[error("Invalid date '{0}', expected YYYY-MM-DD or YYYY-MM-DD HH:MM[:SS]")]
    InvalidDate(String),
    #[error("Invalid month '{0}', expected YYYY-MM")]
    InvalidMonth(String),
    #[error("Invalid color '{0}', expected #RRGGBB or #RRGGBBAA")]
    InvalidColor(String),
    #[error("Invalid transaction type '{0}', expected expense|income")]
    InvalidType(String),
    #[error("Invalid id '{0}'")]
    InvalidId(String),
    #[error("Corrupt value in {table}.{column}: '{value}'")]
    Corrupt {
        table: &'static str,
        column: &'static str,
        value: String,
    },
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type LedgerResult<T> = Result<T, LedgerError>;
