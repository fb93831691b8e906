// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .conflicts_with("jsonl")
            .help("Print pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print one JSON object per line"),
    )
}

fn type_arg() -> Arg {
    Arg::new("type")
        .long("type")
        .value_parser(["expense", "income"])
        .help("Transaction type")
}

fn month_arg() -> Arg {
    Arg::new("month").long("month").help("Month as YYYY-MM")
}

pub fn build_cli() -> Command {
    Command::new("ledgerlens")
        .version(crate_version!())
        .about("Personal ledger with monthly budgets and category analytics")
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .env("LEDGERLENS_DB")
                .help("Path to the SQLite database"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count)
                .help("Increase log verbosity (-v info, -vv debug)"),
        )
        .subcommand(Command::new("init").about("Create the database and seed default categories"))
        .subcommand(
            Command::new("category")
                .about("Manage categories")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(
                            Arg::new("color")
                                .long("color")
                                .help("Display color as #RRGGBB"),
                        ),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(Command::new("rm").arg(Arg::new("name").long("name").required(true)))
                .subcommand(
                    Command::new("rename")
                        .arg(Arg::new("from").long("from").required(true))
                        .arg(Arg::new("to").long("to").required(true)),
                ),
        )
        .subcommand(
            Command::new("tag")
                .about("Manage tags")
                .subcommand(Command::new("add").arg(Arg::new("name").long("name").required(true)))
                .subcommand(json_flags(Command::new("list")))
                .subcommand(Command::new("rm").arg(Arg::new("name").long("name").required(true))),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and inspect transactions")
                .subcommand(
                    Command::new("add")
                        .arg(
                            Arg::new("amount")
                                .long("amount")
                                .required(true)
                                .allow_hyphen_values(true),
                        )
                        .arg(type_arg().default_value("expense"))
                        .arg(
                            Arg::new("date")
                                .long("date")
                                .help("YYYY-MM-DD or YYYY-MM-DD HH:MM[:SS], defaults to now"),
                        )
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("tag").long("tag").action(ArgAction::Append))
                        .arg(Arg::new("note").long("note"))
                        .arg(
                            Arg::new("recurring")
                                .long("recurring")
                                .action(ArgAction::SetTrue),
                        )
                        .arg(
                            Arg::new("rule")
                                .long("rule")
                                .help("Free-form recurrence rule, stored as-is"),
                        ),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(month_arg())
                        .arg(Arg::new("category").long("category"))
                        .arg(type_arg())
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                ))
                .subcommand(Command::new("rm").arg(Arg::new("id").long("id").required(true))),
        )
        .subcommand(
            Command::new("budget")
                .about("Monthly budgets per category")
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(month_arg()),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(
                    Command::new("rm")
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(month_arg()),
                )
                .subcommand(json_flags(
                    Command::new("status").arg(
                        Arg::new("as_of")
                            .long("as-of")
                            .help("Reference date, defaults to now"),
                    ),
                )),
        )
        .subcommand(
            Command::new("report")
                .about("Analytics")
                .subcommand(json_flags(
                    Command::new("breakdown").arg(type_arg()).arg(month_arg()),
                ))
                .subcommand(json_flags(Command::new("cashflow").arg(month_arg()))),
        )
        .subcommand(
            Command::new("export").about("Export data").subcommand(
                Command::new("transactions")
                    .arg(Arg::new("format").long("format").required(true))
                    .arg(Arg::new("out").long("out").required(true)),
            ),
        )
        .subcommand(Command::new("doctor").about("Check the ledger for data issues"))
        .subcommand(
            Command::new("reset")
                .about("Erase all transactions, budgets, categories, and tags")
                .arg(
                    Arg::new("yes")
                        .long("yes")
                        .action(ArgAction::SetTrue)
                        .help("Confirm the erase"),
                ),
        )
}
