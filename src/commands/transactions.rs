// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::UNCATEGORIZED;
use crate::errors::LedgerError;
use crate::models::{Transaction, TransactionType};
use crate::store::{self, TransactionFilter};
use crate::utils::{
    maybe_print_json, parse_date, parse_decimal, parse_month, pretty_table, required,
};
use anyhow::Result;
use chrono::Local;
use rusqlite::Connection;
use serde::Serialize;
use uuid::Uuid;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let raw = required(sub, "id")?.trim();
            let id = Uuid::parse_str(raw).map_err(|_| LedgerError::InvalidId(raw.to_string()))?;
            store::delete_transaction(conn, id)?;
            println!("Removed transaction {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let amount = parse_decimal(required(sub, "amount")?)?;
    let kind = sub
        .get_one::<String>("type")
        .map(|s| s.parse::<TransactionType>())
        .transpose()?
        .unwrap_or(TransactionType::Expense);
    let date = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => Local::now().naive_local(),
    };

    let mut tx = Transaction::new(amount, date, kind);
    if let Some(note) = sub.get_one::<String>("note") {
        tx.note = note.trim().to_string();
    }
    if let Some(cat) = sub.get_one::<String>("category") {
        tx.category = Some(store::category_by_name(conn, cat)?);
    }
    let tag_names: Vec<String> = sub
        .get_many::<String>("tag")
        .map(|tags| tags.cloned().collect())
        .unwrap_or_default();
    tx.is_recurring = sub.get_flag("recurring");
    tx.recurrence_rule = sub
        .get_one::<String>("rule")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let tx = store::insert_transaction_with_tags(conn, tx, &tag_names)?;
    println!(
        "Recorded {} {} on {} ({})",
        tx.kind,
        tx.amount,
        tx.date.format("%Y-%m-%d"),
        tx.category_name().unwrap_or(UNCATEGORIZED)
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.date.clone(),
                    r.kind.clone(),
                    r.amount.clone(),
                    r.category.clone(),
                    r.tags.join(", "),
                    r.note.clone(),
                    r.id.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Type", "Amount", "Category", "Tags", "Note", "ID"],
                rows,
            )
        );
    }
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: String,
    pub date: String,
    pub kind: String,
    pub amount: String,
    pub category: String,
    pub tags: Vec<String>,
    pub note: String,
    pub recurring: bool,
    pub recurrence_rule: Option<String>,
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let filter = TransactionFilter {
        month: sub
            .get_one::<String>("month")
            .map(|m| parse_month(m))
            .transpose()?,
        category: sub.get_one::<String>("category").cloned(),
        kind: sub
            .get_one::<String>("type")
            .map(|s| s.parse::<TransactionType>())
            .transpose()?,
        limit: sub.get_one::<usize>("limit").copied(),
    };

    let rows = store::query_transactions(conn, &filter)?
        .into_iter()
        .map(|t| TransactionRow {
            id: t.id.to_string(),
            date: t.date.format("%Y-%m-%d").to_string(),
            kind: t.kind.to_string(),
            amount: t.amount.to_string(),
            category: t
                .category
                .map(|c| c.name)
                .unwrap_or_else(|| UNCATEGORIZED.to_string()),
            tags: t.tags.into_iter().map(|tag| tag.name).collect(),
            note: t.note,
            recurring: t.is_recurring,
            recurrence_rule: t.recurrence_rule,
        })
        .collect();
    Ok(rows)
}
