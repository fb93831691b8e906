// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::{self, Analytics, CashFlow, CategoryBreakdown};
use crate::models::{Transaction, TransactionType};
use crate::store::{self, TransactionFilter};
use crate::utils::{fmt_money, fmt_percent, maybe_print_json, parse_month, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("breakdown", sub)) => breakdown(conn, sub)?,
        Some(("cashflow", sub)) => cashflow(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn transactions_for(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<Transaction>> {
    let filter = TransactionFilter {
        month: sub
            .get_one::<String>("month")
            .map(|m| parse_month(m))
            .transpose()?,
        ..TransactionFilter::default()
    };
    Ok(store::query_transactions(conn, &filter)?)
}

pub fn breakdown_report(conn: &Connection, sub: &clap::ArgMatches) -> Result<Analytics> {
    let kind = sub
        .get_one::<String>("type")
        .map(|s| s.parse::<TransactionType>())
        .transpose()?;
    let txs = transactions_for(conn, sub)?;
    Ok(engine::analytics(&txs, kind))
}

fn print_breakdown(title: &str, b: &CategoryBreakdown) {
    println!("{}", title);
    if b.is_empty() {
        println!("No data. Add some transactions to see analytics.");
        return;
    }
    let data = b
        .slices
        .iter()
        .map(|s| {
            let label = match &s.share {
                Some(share) if s.shows_label() => fmt_percent(share),
                _ => String::new(),
            };
            vec![
                s.category.clone(),
                s.color_hex.clone().unwrap_or_default(),
                fmt_money(&s.total),
                label,
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Category", "Color", "Total", "Share"], data)
    );
    println!("Total: {}", fmt_money(&b.grand_total));
}

fn breakdown(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let report = breakdown_report(conn, sub)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        return Ok(());
    }
    if let Some(b) = &report.expense {
        print_breakdown("Expenses by category", b);
    }
    if let Some(b) = &report.income {
        print_breakdown("Income by category", b);
    }
    Ok(())
}

pub fn cashflow_report(conn: &Connection, sub: &clap::ArgMatches) -> Result<CashFlow> {
    let window = sub
        .get_one::<String>("month")
        .map(|m| parse_month(m))
        .transpose()?
        .map(engine::month_bounds_of);
    let txs = store::load_transactions(conn)?;
    Ok(engine::cash_flow(&txs, window))
}

fn cashflow(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let flow = cashflow_report(conn, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &flow)? {
        let data = vec![vec![
            fmt_money(&flow.income),
            fmt_money(&flow.expense),
            fmt_money(&flow.net),
        ]];
        println!(
            "{}",
            pretty_table(&["Total Income", "Total Expenses", "Net"], data)
        );
    }
    Ok(())
}
