// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Typed access to the SQLite ledger.
//!
//! Multi-table mutations run inside one SQL transaction so a category
//! delete or rename is never half-applied.

use std::collections::HashMap;

use chrono::{DateTime, Months, NaiveDate, NaiveDateTime, Utc};
use rusqlite::{Connection, ErrorCode, OptionalExtension, params, params_from_iter};
use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

use crate::engine::month_bounds_of;
use crate::errors::{LedgerError, LedgerResult};
use crate::models::{Budget, Category, Snapshot, Tag, Transaction, TransactionType};
use crate::utils::month_label;

const SQL_DATETIME: &str = "%Y-%m-%d %H:%M:%S";

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == ErrorCode::ConstraintViolation
                && err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn parse_uuid(table: &'static str, column: &'static str, s: &str) -> LedgerResult<Uuid> {
    Uuid::parse_str(s).map_err(|_| LedgerError::Corrupt {
        table,
        column,
        value: s.to_string(),
    })
}

fn parse_amount(table: &'static str, column: &'static str, s: &str) -> LedgerResult<Decimal> {
    s.parse::<Decimal>().map_err(|_| LedgerError::Corrupt {
        table,
        column,
        value: s.to_string(),
    })
}

fn clean_name(name: &str) -> LedgerResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LedgerError::EmptyName);
    }
    Ok(name)
}

// ── Categories ───────────────────────────────────────────────

pub fn list_categories(conn: &Connection) -> LedgerResult<Vec<Category>> {
    let mut stmt = conn.prepare("SELECT id, name, color_hex FROM categories ORDER BY rowid")?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (id, name, color_hex) = row?;
        out.push(Category {
            id: parse_uuid("categories", "id", &id)?,
            name,
            color_hex,
        });
    }
    Ok(out)
}

pub fn category_by_name(conn: &Connection, name: &str) -> LedgerResult<Category> {
    let name = name.trim();
    let row = conn
        .query_row(
            "SELECT id, name, color_hex FROM categories WHERE name=?1",
            params![name],
            |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                ))
            },
        )
        .optional()?;
    let (id, name_db, color_hex) =
        row.ok_or_else(|| LedgerError::CategoryNotFound(name.to_string()))?;
    Ok(Category {
        id: parse_uuid("categories", "id", &id)?,
        name: name_db,
        color_hex,
    })
}

pub fn add_category(conn: &Connection, name: &str, color_hex: &str) -> LedgerResult<Category> {
    let cat = Category::new(clean_name(name)?, color_hex);
    conn.execute(
        "INSERT INTO categories(id, name, color_hex) VALUES (?1, ?2, ?3)",
        params![cat.id.to_string(), cat.name, cat.color_hex],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            LedgerError::DuplicateName(cat.name.clone())
        } else {
            e.into()
        }
    })?;
    info!(category = %cat.name, color = %cat.color_hex, "category added");
    Ok(cat)
}

/// Deletes a category. Its transactions become uncategorized and its budgets go with it.
///
/// Returns how many transactions were detached.
pub fn delete_category(conn: &mut Connection, name: &str) -> LedgerResult<usize> {
    let cat = category_by_name(conn, name)?;
    let tx = conn.transaction()?;
    let detached = tx.execute(
        "UPDATE transactions SET category_id=NULL WHERE category_id=?1",
        params![cat.id.to_string()],
    )?;
    tx.execute(
        "DELETE FROM budgets WHERE category_id=?1",
        params![cat.id.to_string()],
    )?;
    tx.execute(
        "DELETE FROM categories WHERE id=?1",
        params![cat.id.to_string()],
    )?;
    tx.commit()?;
    info!(category = %cat.name, detached, "category deleted");
    Ok(detached)
}

/// Renames a category and migrates the labels of its budgets.
pub fn rename_category(conn: &mut Connection, from: &str, to: &str) -> LedgerResult<Category> {
    let mut cat = category_by_name(conn, from)?;
    let to = clean_name(to)?.to_string();
    let tx = conn.transaction()?;
    tx.execute(
        "UPDATE categories SET name=?1 WHERE id=?2",
        params![to, cat.id.to_string()],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            LedgerError::DuplicateName(to.clone())
        } else {
            e.into()
        }
    })?;
    let migrated = tx.execute(
        "UPDATE budgets SET name=?1 WHERE category_id=?2",
        params![to, cat.id.to_string()],
    )?;
    tx.commit()?;
    info!(from = %cat.name, to = %to, budgets = migrated, "category renamed");
    cat.name = to;
    Ok(cat)
}

// ── Tags ─────────────────────────────────────────────────────

pub fn list_tags(conn: &Connection) -> LedgerResult<Vec<Tag>> {
    let mut stmt = conn.prepare("SELECT id, name FROM tags ORDER BY name")?;
    let rows = stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?;
    let mut out = Vec::new();
    for row in rows {
        let (id, name) = row?;
        out.push(Tag {
            id: parse_uuid("tags", "id", &id)?,
            name,
        });
    }
    Ok(out)
}

pub fn add_tag(conn: &Connection, name: &str) -> LedgerResult<Tag> {
    let tag = Tag::new(clean_name(name)?);
    conn.execute(
        "INSERT INTO tags(id, name) VALUES (?1, ?2)",
        params![tag.id.to_string(), tag.name],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            LedgerError::DuplicateName(tag.name.clone())
        } else {
            e.into()
        }
    })?;
    info!(tag = %tag.name, "tag added");
    Ok(tag)
}

pub fn tag_or_create(conn: &Connection, name: &str) -> LedgerResult<Tag> {
    let name = clean_name(name)?;
    let existing = conn
        .query_row(
            "SELECT id FROM tags WHERE name=?1",
            params![name],
            |r| r.get::<_, String>(0),
        )
        .optional()?;
    match existing {
        Some(id) => Ok(Tag {
            id: parse_uuid("tags", "id", &id)?,
            name: name.to_string(),
        }),
        None => add_tag(conn, name),
    }
}

pub fn delete_tag(conn: &Connection, name: &str) -> LedgerResult<()> {
    let name = name.trim();
    let n = conn.execute("DELETE FROM tags WHERE name=?1", params![name])?;
    if n == 0 {
        return Err(LedgerError::TagNotFound(name.to_string()));
    }
    info!(tag = %name, "tag deleted");
    Ok(())
}

// ── Transactions ─────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// First day of the month to keep.
    pub month: Option<NaiveDate>,
    pub category: Option<String>,
    pub kind: Option<TransactionType>,
    pub limit: Option<usize>,
}

pub fn insert_transaction(conn: &mut Connection, t: &Transaction) -> LedgerResult<()> {
    let tx = conn.transaction()?;
    write_transaction(&tx, t)?;
    tx.commit()?;
    info!(id = %t.id, amount = %t.amount, kind = %t.kind, "transaction recorded");
    Ok(())
}

/// Records `t` with the tags named in `tag_names`, creating missing ones.
///
/// New tags and the transaction commit together.
pub fn insert_transaction_with_tags(
    conn: &mut Connection,
    mut t: Transaction,
    tag_names: &[String],
) -> LedgerResult<Transaction> {
    let tx = conn.transaction()?;
    for name in tag_names {
        let tag = tag_or_create(&tx, name)?;
        if !t.tags.iter().any(|existing| existing.id == tag.id) {
            t.tags.push(tag);
        }
    }
    write_transaction(&tx, &t)?;
    tx.commit()?;
    info!(id = %t.id, amount = %t.amount, kind = %t.kind, tags = t.tags.len(), "transaction recorded");
    Ok(t)
}

fn write_transaction(tx: &Connection, t: &Transaction) -> LedgerResult<()> {
    tx.execute(
        "INSERT INTO transactions(id, amount, date, note, type, category_id, is_recurring, recurrence_rule, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            t.id.to_string(),
            t.amount.to_string(),
            t.date,
            t.note,
            t.kind.as_str(),
            t.category.as_ref().map(|c| c.id.to_string()),
            t.is_recurring,
            t.recurrence_rule,
            t.created_at,
            t.updated_at,
        ],
    )?;
    for tag in &t.tags {
        tx.execute(
            "INSERT OR IGNORE INTO transaction_tags(transaction_id, tag_id) VALUES (?1, ?2)",
            params![t.id.to_string(), tag.id.to_string()],
        )?;
    }
    Ok(())
}

pub fn delete_transaction(conn: &Connection, id: Uuid) -> LedgerResult<()> {
    let n = conn.execute(
        "DELETE FROM transactions WHERE id=?1",
        params![id.to_string()],
    )?;
    if n == 0 {
        return Err(LedgerError::TransactionNotFound(id.to_string()));
    }
    info!(%id, "transaction deleted");
    Ok(())
}

struct RawTransaction {
    id: String,
    amount: String,
    date: NaiveDateTime,
    note: String,
    kind: String,
    category: Option<(String, String, String)>,
    is_recurring: bool,
    recurrence_rule: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn tags_by_transaction(conn: &Connection) -> LedgerResult<HashMap<String, Vec<Tag>>> {
    let mut stmt = conn.prepare(
        "SELECT tt.transaction_id, t.id, t.name
         FROM transaction_tags tt JOIN tags t ON t.id=tt.tag_id
         ORDER BY t.name",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
        ))
    })?;
    let mut map: HashMap<String, Vec<Tag>> = HashMap::new();
    for row in rows {
        let (tx_id, tag_id, name) = row?;
        map.entry(tx_id).or_default().push(Tag {
            id: parse_uuid("tags", "id", &tag_id)?,
            name,
        });
    }
    Ok(map)
}

/// Transactions matching `filter`, newest first.
pub fn query_transactions(
    conn: &Connection,
    filter: &TransactionFilter,
) -> LedgerResult<Vec<Transaction>> {
    let mut sql = String::from(
        "SELECT t.id, t.amount, t.date, t.note, t.type, c.id, c.name, c.color_hex,
                t.is_recurring, t.recurrence_rule, t.created_at, t.updated_at
         FROM transactions t LEFT JOIN categories c ON t.category_id=c.id
         WHERE 1=1",
    );
    let mut params_vec: Vec<String> = Vec::new();

    if let Some(month) = filter.month {
        let (start, end) = month_bounds_of(month);
        sql.push_str(" AND t.date>=? AND t.date<?");
        params_vec.push(start.format(SQL_DATETIME).to_string());
        params_vec.push(end.format(SQL_DATETIME).to_string());
    }
    if let Some(cat) = &filter.category {
        sql.push_str(" AND c.name=?");
        params_vec.push(cat.trim().to_string());
    }
    if let Some(kind) = filter.kind {
        sql.push_str(" AND t.type=?");
        params_vec.push(kind.as_str().to_string());
    }
    sql.push_str(" ORDER BY t.date DESC, t.rowid DESC");
    if let Some(limit) = filter.limit {
        sql.push_str(&format!(" LIMIT {}", limit));
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(params_vec.iter()), |r| {
        let cat_id: Option<String> = r.get(5)?;
        let category = match cat_id {
            Some(id) => Some((id, r.get::<_, String>(6)?, r.get::<_, String>(7)?)),
            None => None,
        };
        Ok(RawTransaction {
            id: r.get(0)?,
            amount: r.get(1)?,
            date: r.get(2)?,
            note: r.get(3)?,
            kind: r.get(4)?,
            category,
            is_recurring: r.get(8)?,
            recurrence_rule: r.get(9)?,
            created_at: r.get(10)?,
            updated_at: r.get(11)?,
        })
    })?;

    let mut tags = tags_by_transaction(conn)?;
    let mut out = Vec::new();
    for row in rows {
        let raw = row?;
        let category = match raw.category {
            Some((id, name, color_hex)) => Some(Category {
                id: parse_uuid("categories", "id", &id)?,
                name,
                color_hex,
            }),
            None => None,
        };
        let kind = raw.kind.parse::<TransactionType>().map_err(|_| LedgerError::Corrupt {
            table: "transactions",
            column: "type",
            value: raw.kind.clone(),
        })?;
        out.push(Transaction {
            id: parse_uuid("transactions", "id", &raw.id)?,
            amount: parse_amount("transactions", "amount", &raw.amount)?,
            date: raw.date,
            note: raw.note,
            kind,
            category,
            tags: tags.remove(&raw.id).unwrap_or_default(),
            is_recurring: raw.is_recurring,
            recurrence_rule: raw.recurrence_rule,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
        });
    }
    Ok(out)
}

pub fn load_transactions(conn: &Connection) -> LedgerResult<Vec<Transaction>> {
    query_transactions(conn, &TransactionFilter::default())
}

// ── Budgets ──────────────────────────────────────────────────

fn next_month(first_day: NaiveDate) -> NaiveDate {
    first_day
        .checked_add_months(Months::new(1))
        .unwrap_or(NaiveDate::MAX)
}

/// Sets the ceiling of `category` for the month starting on `month_start`.
pub fn set_budget(
    conn: &Connection,
    category: &Category,
    amount: Decimal,
    month_start: NaiveDate,
) -> LedgerResult<Budget> {
    let budget = Budget::new(category, amount, month_start, next_month(month_start));
    conn.execute(
        "INSERT INTO budgets(id, category_id, name, amount, period_start, period_end)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(category_id, period_start) DO UPDATE SET amount=excluded.amount, name=excluded.name",
        params![
            budget.id.to_string(),
            budget.category_id.to_string(),
            budget.name,
            budget.amount.to_string(),
            budget.period_start,
            budget.period_end,
        ],
    )?;
    let id: String = conn.query_row(
        "SELECT id FROM budgets WHERE category_id=?1 AND period_start=?2",
        params![budget.category_id.to_string(), budget.period_start],
        |r| r.get(0),
    )?;
    info!(category = %category.name, month = %month_label(month_start), amount = %amount, "budget set");
    Ok(Budget {
        id: parse_uuid("budgets", "id", &id)?,
        ..budget
    })
}

pub fn delete_budget(
    conn: &Connection,
    category: &Category,
    month_start: NaiveDate,
) -> LedgerResult<()> {
    let n = conn.execute(
        "DELETE FROM budgets WHERE category_id=?1 AND period_start=?2",
        params![category.id.to_string(), month_start],
    )?;
    if n == 0 {
        return Err(LedgerError::BudgetNotFound(
            category.name.clone(),
            month_label(month_start),
        ));
    }
    info!(category = %category.name, month = %month_label(month_start), "budget removed");
    Ok(())
}

/// All budgets, most recent period first.
pub fn list_budgets(conn: &Connection) -> LedgerResult<Vec<Budget>> {
    let mut stmt = conn.prepare(
        "SELECT id, category_id, name, amount, period_start, period_end
         FROM budgets ORDER BY period_start DESC, name",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, NaiveDate>(4)?,
            r.get::<_, NaiveDate>(5)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (id, category_id, name, amount, period_start, period_end) = row?;
        out.push(Budget {
            id: parse_uuid("budgets", "id", &id)?,
            category_id: parse_uuid("budgets", "category_id", &category_id)?,
            name,
            amount: parse_amount("budgets", "amount", &amount)?,
            period_start,
            period_end,
        });
    }
    Ok(out)
}

// ── Snapshot ─────────────────────────────────────────────────

/// Reads the whole ledger in one SQL transaction.
pub fn load_snapshot(conn: &Connection) -> LedgerResult<Snapshot> {
    let tx = conn.unchecked_transaction()?;
    let snapshot = Snapshot {
        transactions: load_transactions(&tx)?,
        categories: list_categories(&tx)?,
        budgets: list_budgets(&tx)?,
        tags: list_tags(&tx)?,
    };
    tx.finish()?;

    debug!(
        transactions = snapshot.transactions.len(),
        categories = snapshot.categories.len(),
        budgets = snapshot.budgets.len(),
        tags = snapshot.tags.len(),
        "snapshot loaded"
    );
    Ok(snapshot)
}
