// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use ledgerlens::commands::{categories, reports, reset, tags};
use ledgerlens::models::{Transaction, TransactionType};
use ledgerlens::{cli, db, logging, store};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn setup() -> Connection {
    let conn = db::open_in_memory().unwrap();
    db::seed_defaults_if_needed(&conn).unwrap();
    conn
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn matches(args: &[&str]) -> clap::ArgMatches {
    let mut argv = vec!["ledgerlens"];
    argv.extend_from_slice(args);
    cli::build_cli().get_matches_from(argv)
}

fn record(conn: &mut Connection, amount: &str, kind: TransactionType, date: &str, category: &str) {
    let when = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap();
    let cat = store::category_by_name(conn, category).unwrap();
    let tx = Transaction::new(dec(amount), when, kind).with_category(&cat);
    store::insert_transaction(conn, &tx).unwrap();
}

#[test]
fn category_add_normalizes_color() {
    let mut conn = setup();
    let m = matches(&["category", "add", "--name", "Pets", "--color", "a1b2c3"]);
    if let Some(("category", cat_m)) = m.subcommand() {
        categories::handle(&mut conn, cat_m).unwrap();
    } else {
        panic!("no category subcommand");
    }
    assert_eq!(store::category_by_name(&conn, "Pets").unwrap().color_hex, "#A1B2C3");

    let m = matches(&["category", "add", "--name", "Gifts"]);
    if let Some(("category", cat_m)) = m.subcommand() {
        categories::handle(&mut conn, cat_m).unwrap();
    }
    assert_eq!(store::category_by_name(&conn, "Gifts").unwrap().color_hex, "#999999");
}

#[test]
fn category_add_rejects_invalid_color() {
    let mut conn = setup();
    let m = matches(&["category", "add", "--name", "Pets", "--color", "#12345"]);
    if let Some(("category", cat_m)) = m.subcommand() {
        let err = categories::handle(&mut conn, cat_m).unwrap_err();
        assert!(err.to_string().contains("Invalid color"));
    } else {
        panic!("no category subcommand");
    }
    assert!(store::category_by_name(&conn, "Pets").is_err());
}

#[test]
fn category_rm_and_rename_via_cli() {
    let mut conn = setup();
    let m = matches(&["category", "rename", "--from", "Transport", "--to", "Travel"]);
    if let Some(("category", cat_m)) = m.subcommand() {
        categories::handle(&mut conn, cat_m).unwrap();
    }
    let m = matches(&["category", "rm", "--name", "Travel"]);
    if let Some(("category", cat_m)) = m.subcommand() {
        categories::handle(&mut conn, cat_m).unwrap();
        assert!(categories::handle(&mut conn, cat_m).is_err());
    }
    let names: Vec<String> = store::list_categories(&conn)
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, ["Food", "Rent", "Salary"]);
}

#[test]
fn tag_add_and_rm_via_cli() {
    let conn = setup();
    let m = matches(&["tag", "add", "--name", "holiday"]);
    if let Some(("tag", tag_m)) = m.subcommand() {
        tags::handle(&conn, tag_m).unwrap();
        assert!(tags::handle(&conn, tag_m).is_err());
    }
    let m = matches(&["tag", "rm", "--name", "holiday"]);
    if let Some(("tag", tag_m)) = m.subcommand() {
        tags::handle(&conn, tag_m).unwrap();
        assert!(tags::handle(&conn, tag_m).is_err());
    }
    assert!(store::list_tags(&conn).unwrap().is_empty());
}

#[test]
fn breakdown_report_splits_by_type_and_month() {
    let mut conn = setup();
    record(&mut conn, "60", TransactionType::Expense, "2025-08-02", "Rent");
    record(&mut conn, "40", TransactionType::Expense, "2025-08-03", "Food");
    record(&mut conn, "2000", TransactionType::Income, "2025-08-01", "Salary");
    record(&mut conn, "500", TransactionType::Expense, "2025-07-31", "Food");

    let m = matches(&["report", "breakdown", "--month", "2025-08"]);
    let Some(("report", report_m)) = m.subcommand() else {
        panic!("no report subcommand");
    };
    let Some(("breakdown", sub)) = report_m.subcommand() else {
        panic!("no breakdown subcommand");
    };
    let report = reports::breakdown_report(&conn, sub).unwrap();
    let expense = report.expense.unwrap();
    assert_eq!(expense.grand_total, dec("100"));
    assert_eq!(expense.slices[0].category, "Rent");
    assert_eq!(expense.slices[0].share, Some(dec("0.6")));
    let income = report.income.unwrap();
    assert_eq!(income.grand_total, dec("2000"));

    let m = matches(&["report", "breakdown", "--type", "income"]);
    let Some(("report", report_m)) = m.subcommand() else {
        panic!("no report subcommand");
    };
    let Some(("breakdown", sub)) = report_m.subcommand() else {
        panic!("no breakdown subcommand");
    };
    let report = reports::breakdown_report(&conn, sub).unwrap();
    assert!(report.expense.is_none());
    assert_eq!(report.income.unwrap().slices.len(), 1);
    reports::handle(&conn, report_m).unwrap();
}

#[test]
fn cashflow_report_respects_month() {
    let mut conn = setup();
    record(&mut conn, "2000", TransactionType::Income, "2025-08-01", "Salary");
    record(&mut conn, "-300", TransactionType::Expense, "2025-08-05", "Food");
    record(&mut conn, "50", TransactionType::Expense, "2025-09-01", "Food");

    let m = matches(&["report", "cashflow", "--month", "2025-08"]);
    let Some(("report", report_m)) = m.subcommand() else {
        panic!("no report subcommand");
    };
    let Some(("cashflow", sub)) = report_m.subcommand() else {
        panic!("no cashflow subcommand");
    };
    let flow = reports::cashflow_report(&conn, sub).unwrap();
    assert_eq!(flow.income, dec("2000"));
    assert_eq!(flow.expense, dec("300"));
    assert_eq!(flow.net, dec("1700"));

    let m = matches(&["report", "cashflow"]);
    let Some(("report", report_m)) = m.subcommand() else {
        panic!("no report subcommand");
    };
    let Some(("cashflow", sub)) = report_m.subcommand() else {
        panic!("no cashflow subcommand");
    };
    let flow = reports::cashflow_report(&conn, sub).unwrap();
    assert_eq!(flow.expense, dec("350"));
}

#[test]
fn reset_requires_confirmation() {
    let mut conn = setup();
    record(&mut conn, "5", TransactionType::Expense, "2025-08-05", "Food");

    let m = matches(&["reset"]);
    if let Some(("reset", reset_m)) = m.subcommand() {
        assert!(reset::handle(&mut conn, reset_m).is_err());
    }
    assert_eq!(store::load_transactions(&conn).unwrap().len(), 1);

    let m = matches(&["reset", "--yes"]);
    if let Some(("reset", reset_m)) = m.subcommand() {
        reset::handle(&mut conn, reset_m).unwrap();
    }
    assert!(store::load_transactions(&conn).unwrap().is_empty());
    assert!(store::list_categories(&conn).unwrap().is_empty());
}

#[test]
fn verbosity_maps_to_levels() {
    assert_eq!(logging::level_for(0), "warn");
    assert_eq!(logging::level_for(1), "info");
    assert_eq!(logging::level_for(2), "debug");
    assert_eq!(logging::level_for(5), "debug");
}

#[test]
fn global_flags_parse_anywhere() {
    let m = matches(&["budget", "status", "-vv", "--db", "/tmp/ledger.sqlite"]);
    assert_eq!(m.get_count("verbose"), 2);
    assert_eq!(
        m.get_one::<String>("db").map(String::as_str),
        Some("/tmp/ledger.sqlite")
    );
}
