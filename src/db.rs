// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, params};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::errors::LedgerResult;
use crate::models::Category;
use crate::utils::{get_setting, set_setting};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Ledgerlens", "ledgerlens"));

const SEEDED_KEY: &str = "defaults_seeded";

pub const DEFAULT_CATEGORIES: [(&str, &str); 4] = [
    ("Food", "#FF9500"),
    ("Rent", "#FF3B30"),
    ("Transport", "#34C759"),
    ("Salary", "#0A84FF"),
];

/// Resolves the database file, creating parent directories as needed.
pub fn db_path(override_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = override_path {
        if let Some(parent) = p.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        return Ok(p.to_path_buf());
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("ledgerlens.sqlite"))
}

pub fn open_or_init(path: &Path) -> Result<Connection> {
    let conn =
        Connection::open(path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    seed_defaults_if_needed(&conn)?;
    debug!(path = %path.display(), "database ready");
    Ok(conn)
}

/// In-memory store with schema applied but nothing seeded.
pub fn open_in_memory() -> LedgerResult<Connection> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> LedgerResult<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS categories(
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        color_hex TEXT NOT NULL DEFAULT '#999999'
    );

    CREATE TABLE IF NOT EXISTS tags(
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    );

    CREATE TABLE IF NOT EXISTS transactions(
        id TEXT PRIMARY KEY,
        amount TEXT NOT NULL,
        date TEXT NOT NULL,
        note TEXT NOT NULL DEFAULT '',
        type TEXT NOT NULL CHECK(type IN ('expense','income')),
        category_id TEXT,
        is_recurring INTEGER NOT NULL DEFAULT 0,
        recurrence_rule TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE SET NULL
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);

    CREATE TABLE IF NOT EXISTS transaction_tags(
        transaction_id TEXT NOT NULL,
        tag_id TEXT NOT NULL,
        PRIMARY KEY(transaction_id, tag_id),
        FOREIGN KEY(transaction_id) REFERENCES transactions(id) ON DELETE CASCADE,
        FOREIGN KEY(tag_id) REFERENCES tags(id) ON DELETE CASCADE
    );

    -- periods are half-open: [period_start, period_end)
    CREATE TABLE IF NOT EXISTS budgets(
        id TEXT PRIMARY KEY,
        category_id TEXT NOT NULL,
        name TEXT NOT NULL,
        amount TEXT NOT NULL,
        period_start TEXT NOT NULL,
        period_end TEXT NOT NULL,
        UNIQUE(category_id, period_start),
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE CASCADE
    );
    "#,
    )?;
    Ok(())
}

/// Inserts the default categories once per fresh (or reset) store.
///
/// Returns true when categories were inserted.
pub fn seed_defaults_if_needed(conn: &Connection) -> LedgerResult<bool> {
    if get_setting(conn, SEEDED_KEY)?.as_deref() == Some("1") {
        return Ok(false);
    }
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM categories", [], |r| r.get(0))?;
    let seeded = count == 0;
    if seeded {
        for (name, hex) in DEFAULT_CATEGORIES {
            let cat = Category::new(name, hex);
            conn.execute(
                "INSERT INTO categories(id, name, color_hex) VALUES (?1, ?2, ?3)",
                params![cat.id.to_string(), cat.name, cat.color_hex],
            )?;
        }
        info!(count = DEFAULT_CATEGORIES.len(), "seeded default categories");
    }
    set_setting(conn, SEEDED_KEY, "1")?;
    Ok(seeded)
}

/// Erases every transaction, budget, category, and tag, and re-arms seeding.
pub fn reset_all(conn: &mut Connection) -> LedgerResult<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(
        r#"
        DELETE FROM transaction_tags;
        DELETE FROM transactions;
        DELETE FROM budgets;
        DELETE FROM categories;
        DELETE FROM tags;
        "#,
    )?;
    tx.execute("DELETE FROM settings WHERE key=?1", params![SEEDED_KEY])?;
    tx.commit()?;
    info!("all ledger data erased");
    Ok(())
}
