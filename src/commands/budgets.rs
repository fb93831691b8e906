// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::{self, BudgetProgress};
use crate::store;
use crate::utils::{
    current_month, fmt_money, fmt_percent, maybe_print_json, month_label, parse_date,
    parse_decimal, parse_month, pretty_table, required,
};
use anyhow::Result;
use chrono::{Local, NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use tracing::warn;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        Some(("status", sub)) => status(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn month_or_current(sub: &clap::ArgMatches) -> Result<NaiveDate> {
    Ok(match sub.get_one::<String>("month") {
        Some(m) => parse_month(m)?,
        None => current_month(),
    })
}

fn set(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let month = month_or_current(sub)?;
    let cat = store::category_by_name(conn, required(sub, "category")?)?;
    let amount = parse_decimal(required(sub, "amount")?)?;
    store::set_budget(conn, &cat, amount, month)?;
    println!("Budget set for {} / {} = {}", month_label(month), cat.name, amount);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let budgets = store::list_budgets(conn)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &budgets)? {
        let data = budgets
            .into_iter()
            .map(|b| vec![month_label(b.period_start), b.name, fmt_money(&b.amount)])
            .collect();
        println!("{}", pretty_table(&["Month", "Category", "Budget"], data));
    }
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let month = month_or_current(sub)?;
    let cat = store::category_by_name(conn, required(sub, "category")?)?;
    store::delete_budget(conn, &cat, month)?;
    println!("Removed budget for {} / {}", month_label(month), cat.name);
    Ok(())
}

/// Computes progress rows for every category at `now`.
pub fn status_rows(conn: &Connection, now: NaiveDateTime) -> Result<Vec<BudgetProgress>> {
    let snapshot = store::load_snapshot(conn)?;
    let (start, _) = engine::month_bounds(now);
    for cat in &snapshot.categories {
        if let Some(b) = engine::find_budget(&snapshot.budgets, cat, start.date()) {
            if !b.covers(start.date()) {
                warn!(
                    category = %cat.name,
                    from = %month_label(b.period_start),
                    "no budget for this month, carrying forward"
                );
            }
        }
    }
    Ok(engine::budget_overview(&snapshot, now))
}

fn status(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let now = match sub.get_one::<String>("as_of") {
        Some(d) => parse_date(d)?,
        None => Local::now().naive_local(),
    };
    let rows = status_rows(conn, now)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &rows)? {
        return Ok(());
    }
    let data = rows
        .iter()
        .map(|p| {
            let (budget, remaining) = if p.has_budget() {
                let label = if p.remaining >= rust_decimal::Decimal::ZERO {
                    format!("Remaining: {}", fmt_money(&p.remaining))
                } else {
                    format!("Over: {}", fmt_money(&-p.remaining))
                };
                (fmt_money(&p.ceiling), label)
            } else {
                ("No budget".to_string(), String::new())
            };
            vec![
                p.category.clone(),
                budget,
                fmt_money(&p.spent),
                remaining,
                fmt_percent(&p.progress),
            ]
        })
        .collect();
    println!("Budgets for {}", month_label(engine::month_bounds(now).0.date()));
    println!(
        "{}",
        pretty_table(&["Category", "Budget", "Spent", "Remaining", "Progress"], data)
    );
    Ok(())
}
