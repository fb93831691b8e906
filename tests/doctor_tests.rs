// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use ledgerlens::models::{Transaction, TransactionType};
use ledgerlens::{commands::doctor, db, store};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;

fn setup() -> Connection {
    let conn = db::open_in_memory().unwrap();
    db::seed_defaults_if_needed(&conn).unwrap();
    conn
}

fn issues_named<'a>(rows: &'a [Vec<String>], issue: &str) -> Vec<&'a str> {
    rows.iter()
        .filter(|r| r[0] == issue)
        .map(|r| r[1].as_str())
        .collect()
}

#[test]
fn clean_ledger_has_no_issues() {
    let mut conn = setup();
    let food = store::category_by_name(&conn, "Food").unwrap();
    let when = NaiveDate::from_ymd_opt(2025, 8, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let mut tx = Transaction::new(Decimal::TEN, when, TransactionType::Expense).with_category(&food);
    tx.is_recurring = true;
    tx.recurrence_rule = Some("FREQ=MONTHLY".into());
    store::insert_transaction(&mut conn, &tx).unwrap();
    store::set_budget(&conn, &food, Decimal::ONE_HUNDRED, when.date()).unwrap();

    assert!(doctor::find_issues(&conn).unwrap().is_empty());
    doctor::handle(&conn).unwrap();
}

#[test]
fn flags_recurrence_mismatches() {
    let mut conn = setup();
    let when = NaiveDate::from_ymd_opt(2025, 8, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let mut flag_only = Transaction::new(Decimal::ONE, when, TransactionType::Expense);
    flag_only.is_recurring = true;
    let mut rule_only = Transaction::new(Decimal::ONE, when, TransactionType::Expense);
    rule_only.recurrence_rule = Some("FREQ=WEEKLY".into());
    store::insert_transaction(&mut conn, &flag_only).unwrap();
    store::insert_transaction(&mut conn, &rule_only).unwrap();

    let rows = doctor::find_issues(&conn).unwrap();
    let flag_only_id = flag_only.id.to_string();
    let rule_only_id = rule_only.id.to_string();
    assert_eq!(issues_named(&rows, "recurring_without_rule"), [flag_only_id.as_str()]);
    assert_eq!(issues_named(&rows, "rule_without_recurring"), [rule_only_id.as_str()]);
}

#[test]
fn flags_malformed_amounts_and_overlaps() {
    let conn = setup();
    let food = store::category_by_name(&conn, "Food").unwrap();
    let aug = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
    store::set_budget(&conn, &food, Decimal::ONE_HUNDRED, aug).unwrap();
    conn.execute(
        "INSERT INTO budgets(id, category_id, name, amount, period_start, period_end)
         VALUES ('b-mid', ?1, 'Food', 'lots', '2025-08-15', '2025-09-15')",
        params![food.id.to_string()],
    )
    .unwrap();

    let rows = doctor::find_issues(&conn).unwrap();
    assert_eq!(issues_named(&rows, "malformed_amount"), ["budgets b-mid 'lots'"]);
    let overlaps = issues_named(&rows, "overlapping_budgets");
    assert_eq!(overlaps.len(), 1);
    assert!(overlaps[0].starts_with("Food ("));
}

#[test]
fn flags_names_differing_only_by_case() {
    let conn = setup();
    store::add_category(&conn, "food", "#000000").unwrap();
    let rows = doctor::find_issues(&conn).unwrap();
    let similar = issues_named(&rows, "similar_category_names");
    assert_eq!(similar.len(), 1);
    assert!(similar[0].contains("Food"));
    assert!(similar[0].contains("food"));
    doctor::handle(&conn).unwrap();
}
