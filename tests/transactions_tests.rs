// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use ledgerlens::{cli, commands::transactions, db, store};
use rusqlite::Connection;

fn setup() -> Connection {
    let conn = db::open_in_memory().unwrap();
    db::seed_defaults_if_needed(&conn).unwrap();
    conn
}

fn add(conn: &mut Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["ledgerlens", "tx", "add"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        transactions::handle(conn, tx_m)
    } else {
        panic!("no tx subcommand");
    }
}

fn list(conn: &Connection, args: &[&str]) -> Vec<transactions::TransactionRow> {
    let mut argv = vec!["ledgerlens", "tx", "list"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        if let Some(("list", list_m)) = tx_m.subcommand() {
            transactions::query_rows(conn, list_m).unwrap()
        } else {
            panic!("no list subcommand");
        }
    } else {
        panic!("no tx subcommand");
    }
}

fn seed_three(conn: &mut Connection) {
    for d in ["2025-01-01", "2025-01-02", "2025-01-03"] {
        add(conn, &["--amount", "10", "--date", d, "--category", "Food"]).unwrap();
    }
}

#[test]
fn list_limit_respected() {
    let mut conn = setup();
    seed_three(&mut conn);
    let rows = list(&conn, &["--limit", "2"]);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].date, "2025-01-03");
    assert_eq!(rows[1].date, "2025-01-02");
}

#[test]
fn add_records_tags_note_and_recurrence() {
    let mut conn = setup();
    add(
        &mut conn,
        &[
            "--amount", "-4.20", "--date", "2025-02-14 08:15", "--category", "Transport",
            "--tag", "commute", "--tag", "work", "--tag", "commute", "--note", " bus ",
            "--recurring", "--rule", "FREQ=DAILY",
        ],
    )
    .unwrap();

    let rows = list(&conn, &[]);
    assert_eq!(rows.len(), 1);
    let r = &rows[0];
    assert_eq!(r.date, "2025-02-14");
    assert_eq!(r.kind, "expense");
    assert_eq!(r.amount, "-4.20");
    assert_eq!(r.category, "Transport");
    assert_eq!(r.tags, ["commute", "work"]);
    assert_eq!(r.note, "bus");
    assert!(r.recurring);
    assert_eq!(r.recurrence_rule.as_deref(), Some("FREQ=DAILY"));

    let tags: Vec<String> = store::list_tags(&conn)
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(tags, ["commute", "work"]);
}

#[test]
fn add_without_category_is_uncategorized() {
    let mut conn = setup();
    add(&mut conn, &["--amount", "1500", "--type", "income", "--date", "2025-03-01"]).unwrap();
    let rows = list(&conn, &[]);
    assert_eq!(rows[0].category, "Uncategorized");
    assert_eq!(rows[0].kind, "income");
}

#[test]
fn add_rejects_bad_input_without_writing() {
    let mut conn = setup();
    assert!(add(&mut conn, &["--amount", "abc"]).is_err());
    assert!(add(&mut conn, &["--amount", "5", "--date", "yesterday"]).is_err());
    assert!(add(&mut conn, &["--amount", "5", "--category", "Pets"]).is_err());
    assert!(list(&conn, &[]).is_empty());
}

#[test]
fn list_filters_by_month_type_and_category() {
    let mut conn = setup();
    seed_three(&mut conn);
    add(&mut conn, &["--amount", "3000", "--type", "income", "--date", "2025-01-31", "--category", "Salary"]).unwrap();
    add(&mut conn, &["--amount", "7", "--date", "2025-02-01", "--category", "Food"]).unwrap();

    assert_eq!(list(&conn, &["--month", "2025-01"]).len(), 4);
    assert_eq!(list(&conn, &["--month", "2025-02"]).len(), 1);

    let income = list(&conn, &["--type", "income"]);
    assert_eq!(income.len(), 1);
    assert_eq!(income[0].category, "Salary");

    let food_jan = list(&conn, &["--month", "2025-01", "--category", "Food"]);
    assert_eq!(food_jan.len(), 3);
    assert!(food_jan.iter().all(|r| r.kind == "expense"));
}

#[test]
fn rm_deletes_by_id() {
    let mut conn = setup();
    seed_three(&mut conn);
    let id = list(&conn, &[])[0].id.clone();

    let matches = cli::build_cli().get_matches_from(["ledgerlens", "tx", "rm", "--id", &id]);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        transactions::handle(&mut conn, tx_m).unwrap();
        assert!(transactions::handle(&mut conn, tx_m).is_err());
    } else {
        panic!("no tx subcommand");
    }
    let rows = list(&conn, &[]);
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.id != id));

    let matches =
        cli::build_cli().get_matches_from(["ledgerlens", "tx", "rm", "--id", "not-a-uuid"]);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        assert!(transactions::handle(&mut conn, tx_m).is_err());
    }
}
