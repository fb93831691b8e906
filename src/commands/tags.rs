// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store;
use crate::utils::{maybe_print_json, pretty_table, required};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let tag = store::add_tag(conn, required(sub, "name")?)?;
            println!("Added tag '{}'", tag.name);
        }
        Some(("list", sub)) => {
            let tags = store::list_tags(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &tags)? {
                let data = tags.into_iter().map(|t| vec![t.name]).collect();
                println!("{}", pretty_table(&["Tag"], data));
            }
        }
        Some(("rm", sub)) => {
            let name = required(sub, "name")?;
            store::delete_tag(conn, name)?;
            println!("Removed tag '{}'", name.trim());
        }
        _ => {}
    }
    Ok(())
}
