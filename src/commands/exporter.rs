// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::UNCATEGORIZED;
use crate::store;
use crate::utils::required;
use anyhow::{Result, bail};
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(conn, sub),
        _ => Ok(()),
    }
}

fn export_transactions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = required(sub, "format")?.to_lowercase();
    let out = required(sub, "out")?;
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }

    // oldest first, unlike the listing
    let mut txs = store::load_transactions(conn)?;
    txs.reverse();

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "id", "date", "type", "amount", "category", "tags", "note", "recurring",
                "recurrence_rule",
            ])?;
            for t in txs {
                let tags: Vec<String> = t.tags.into_iter().map(|tag| tag.name).collect();
                wtr.write_record([
                    t.id.to_string(),
                    t.date.format("%Y-%m-%d %H:%M:%S").to_string(),
                    t.kind.to_string(),
                    t.amount.to_string(),
                    t.category
                        .map(|c| c.name)
                        .unwrap_or_else(|| UNCATEGORIZED.to_string()),
                    tags.join(";"),
                    t.note,
                    t.is_recurring.to_string(),
                    t.recurrence_rule.unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        _ => {
            let items: Vec<_> = txs
                .into_iter()
                .map(|t| {
                    let tags: Vec<String> = t.tags.into_iter().map(|tag| tag.name).collect();
                    json!({
                        "id": t.id.to_string(),
                        "date": t.date.format("%Y-%m-%d %H:%M:%S").to_string(),
                        "type": t.kind,
                        "amount": t.amount.to_string(),
                        "category": t.category.map(|c| c.name),
                        "tags": tags,
                        "note": t.note,
                        "recurring": t.is_recurring,
                        "recurrence_rule": t.recurrence_rule,
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
    }
    println!("Exported transactions to {}", out);
    Ok(())
}
