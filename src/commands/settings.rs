// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{self, KNOWN_KEYS};
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => {
            let mut data = Vec::new();
            for key in KNOWN_KEYS {
                let value = config::get_setting(conn, key)?.unwrap_or_else(|| "(unset)".into());
                data.push(vec![key.to_string(), value]);
            }
            data.push(vec![
                "database".into(),
                crate::db::db_path()?.display().to_string(),
            ]);
            println!("{}", pretty_table(&["Setting", "Value"], data));
        }
        Some(("set", sub)) => {
            let key = sub.get_one::<String>("key").unwrap().trim();
            let value = sub.get_one::<String>("value").unwrap();
            config::set_setting(conn, key, value)?;
            println!("Set {} = {}", key, value.trim());
        }
        _ => {}
    }
    Ok(())
}
