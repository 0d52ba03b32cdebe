// Copyright (c) 2025 Soumyadip Sarkar.
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
            let tax_id = opt_arg(sub, "tax_id");
            let email = opt_arg(sub, "email");
            store.add_client(name, tax_id.as_deref(), email.as_deref())?;
            println!("Added client '{}'", name);
        }
        Some(("list", sub)) => {
            let clients = store.list_clients(sub.get_flag("all"))?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &clients)? {
                let data = clients
                    .into_iter()
                    .map(|c| {
                        vec![
                            c.id.to_string(),
                            c.name,
                            c.tax_id.unwrap_or_default(),
                            c.email.unwrap_or_default(),
                            if c.active { "yes".into() } else { "no".into() },
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["ID", "Name", "Tax ID", "Email", "Active"], data)
                );
            }
        }
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            let id = store.client_id(name)?;
            store.deactivate_client(id)?;
            println!("Removed client '{}'", name);
        }
        _ => {}
    }
    Ok(())
}
