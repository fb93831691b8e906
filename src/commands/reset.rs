// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db;
use anyhow::{Result, bail};
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    if !m.get_flag("yes") {
        bail!(
            "This permanently deletes all transactions, budgets, categories, and tags. Re-run with --yes to confirm."
        );
    }
    db::reset_all(conn)?;
    println!("All data erased. Default categories return on next start.");
    Ok(())
}
