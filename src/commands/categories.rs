// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store::OwnerStore;
use crate::utils::{maybe_print_json, opt_arg, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, owner: i64, m: &clap::ArgMatches) -> Result<()> {
    let store = OwnerStore::new(conn, owner);
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            let description = opt_arg(sub, "description");
            store.add_category(name, description.as_deref())?;
            println!("Added category '{}'", name);
        }
        Some(("list", sub)) => {
            let categories = store.list_categories(sub.get_flag("all"))?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &categories)? {
                let data = categories
                    .into_iter()
                    .map(|c| vec![c.id.to_string(), c.name, c.description.unwrap_or_default()])
                    .collect();
                println!("{}", pretty_table(&["ID", "Category", "Description"], data));
            }
        }
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            let id = store.category_id(name)?;
            store.deactivate_category(id)?;
            println!("Removed category '{}'", name);
        }
        _ => {}
    }
    Ok(())
}
