// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use tracing::warn;

/// Collects `[issue, detail]` rows describing data problems.
pub fn find_issues(conn: &Connection) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();

    // 1) Recurrence flag and rule out of step
    let mut stmt = conn.prepare(
        "SELECT id, is_recurring, recurrence_rule FROM transactions
         WHERE (is_recurring=1 AND (recurrence_rule IS NULL OR trim(recurrence_rule)=''))
            OR (is_recurring=0 AND recurrence_rule IS NOT NULL AND trim(recurrence_rule)!='')
         ORDER BY date",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let id: String = r.get(0)?;
        let recurring: bool = r.get(1)?;
        let issue = if recurring {
            "recurring_without_rule"
        } else {
            "rule_without_recurring"
        };
        rows.push(vec![issue.into(), id]);
    }

    // 2) Stored amounts that no longer parse
    for (table, sql) in [
        ("transactions", "SELECT id, amount FROM transactions"),
        ("budgets", "SELECT id, amount FROM budgets"),
    ] {
        let mut stmt = conn.prepare(sql)?;
        let mut cur = stmt.query([])?;
        while let Some(r) = cur.next()? {
            let id: String = r.get(0)?;
            let amount: String = r.get(1)?;
            if amount.parse::<Decimal>().is_err() {
                rows.push(vec![
                    "malformed_amount".into(),
                    format!("{} {} '{}'", table, id, amount),
                ]);
            }
        }
    }

    // 3) Budgets whose periods overlap for the same category
    let mut stmt = conn.prepare(
        "SELECT a.name, a.period_start, b.period_start FROM budgets a
         JOIN budgets b ON a.category_id=b.category_id AND a.id<b.id
         WHERE a.period_start<b.period_end AND b.period_start<a.period_end",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let name: String = r.get(0)?;
        let a: String = r.get(1)?;
        let b: String = r.get(2)?;
        rows.push(vec![
            "overlapping_budgets".into(),
            format!("{} ({} / {})", name, a, b),
        ]);
    }

    // 4) Category names that differ only by case
    let mut stmt = conn.prepare(
        "SELECT group_concat(name, ', ') FROM categories
         GROUP BY lower(name) HAVING COUNT(*) > 1",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let names: String = r.get(0)?;
        rows.push(vec!["similar_category_names".into(), names]);
    }

    Ok(rows)
}

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = find_issues(conn)?;
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        warn!(issues = rows.len(), "doctor found data issues");
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
