// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store;
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            let id = store::create_owner(conn, name)?;
            println!("Added owner '{}' (id {})", name, id);
        }
        Some(("list", _)) => {
            let data = store::list_owners(conn)?
                .into_iter()
                .map(|o| vec![o.id.to_string(), o.name])
                .collect();
            println!("{}", pretty_table(&["ID", "Name"], data));
        }
        _ => {}
    }
    Ok(())
}
