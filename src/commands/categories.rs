// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store;
use crate::utils::{DEFAULT_COLOR, maybe_print_json, parse_color, pretty_table, required};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = required(sub, "name")?;
            let color = match sub.get_one::<String>("color") {
                Some(c) if !c.trim().is_empty() => parse_color(c)?,
                _ => DEFAULT_COLOR.to_string(),
            };
            let cat = store::add_category(conn, name, &color)?;
            println!("Added category '{}' ({})", cat.name, cat.color_hex);
        }
        Some(("list", sub)) => {
            let cats = store::list_categories(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &cats)? {
                let data = cats
                    .into_iter()
                    .map(|c| vec![c.name, c.color_hex])
                    .collect();
                println!("{}", pretty_table(&["Category", "Color"], data));
            }
        }
        Some(("rm", sub)) => {
            let name = required(sub, "name")?;
            let detached = store::delete_category(conn, name)?;
            println!(
                "Removed category '{}' ({} transaction(s) now uncategorized)",
                name.trim(),
                detached
            );
        }
        Some(("rename", sub)) => {
            let from = required(sub, "from")?;
            let to = required(sub, "to")?;
            let cat = store::rename_category(conn, from, to)?;
            println!("Renamed category '{}' -> '{}'", from.trim(), cat.name);
        }
        _ => {}
    }
    Ok(())
}
