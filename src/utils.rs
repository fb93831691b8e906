// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;

use crate::errors::{LedgerError, LedgerResult};

static COLOR_HEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#?(?:[0-9A-Fa-f]{6}|[0-9A-Fa-f]{8})$").expect("static color pattern")
});

pub const DEFAULT_COLOR: &str = "#999999";

pub fn parse_date(s: &str) -> LedgerResult<NaiveDateTime> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(d.and_time(NaiveTime::MIN));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    Err(LedgerError::InvalidDate(s.to_string()))
}

/// Parses `YYYY-MM` into the first day of that month.
pub fn parse_month(s: &str) -> LedgerResult<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
        .map_err(|_| LedgerError::InvalidMonth(s.to_string()))
}

pub fn current_month() -> NaiveDate {
    let today = Local::now().date_naive();
    today.with_day(1).unwrap_or(today)
}

pub fn month_label(first_day: NaiveDate) -> String {
    first_day.format("%Y-%m").to_string()
}

pub fn parse_decimal(s: &str) -> LedgerResult<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .map_err(|_| LedgerError::InvalidAmount(s.to_string()))
}

/// Normalizes a color to upper-case `#RRGGBB[AA]`.
pub fn parse_color(s: &str) -> LedgerResult<String> {
    let s = s.trim();
    if !COLOR_HEX.is_match(s) {
        return Err(LedgerError::InvalidColor(s.to_string()));
    }
    Ok(format!("#{}", s.trim_start_matches('#').to_uppercase()))
}

pub fn fmt_money(d: &Decimal) -> String {
    format!("{:.2}", d.round_dp(2))
}

pub fn fmt_percent(share: &Decimal) -> String {
    match share.checked_mul(Decimal::ONE_HUNDRED) {
        Some(pct) => format!("{:.0}%", pct.round()),
        None if share.is_sign_negative() => "-∞%".to_string(),
        None => "∞%".to_string(),
    }
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn get_setting(conn: &Connection, key: &str) -> LedgerResult<Option<String>> {
    let v = conn
        .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> LedgerResult<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // Arrays stream one element per line.
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

/// Fetches an argument clap has already marked as required.
pub fn required<'a>(m: &'a clap::ArgMatches, id: &str) -> Result<&'a str> {
    m.get_one::<String>(id)
        .map(|s| s.as_str())
        .ok_or_else(|| anyhow::anyhow!("Missing required argument '--{}'", id))
}
