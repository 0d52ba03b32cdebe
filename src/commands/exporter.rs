// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store::{EntryFilter, OwnerStore};
use crate::utils::opt_arg;
use anyhow::{Result, anyhow};
use rusqlite::Connection;
use serde_json::json;
use std::collections::HashMap;

pub fn handle(conn: &Connection, owner: i64, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("entries", sub)) => export_entries(&OwnerStore::new(conn, owner), sub),
        _ => Ok(()),
    }
}

fn export_entries(store: &OwnerStore<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().trim().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap().trim();
    if fmt != "csv" && fmt != "json" {
        return Err(anyhow!("Unknown format: {} (use csv|json)", fmt));
    }

    let filter = EntryFilter {
        fiscal_year: sub.get_one::<i32>("year").copied(),
        client_id: opt_arg(sub, "client")
            .map(|c| store.client_id(&c))
            .transpose()?,
        category_id: opt_arg(sub, "category")
            .map(|c| store.category_id(&c))
            .transpose()?,
        ..Default::default()
    };
    let entries = store.list_entries(&filter)?;
    let names: HashMap<i64, String> = store
        .list_assets(&crate::store::AssetFilter {
            include_inactive: true,
            ..Default::default()
        })?
        .into_iter()
        .map(|a| (a.id, a.name))
        .collect();

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "asset_id",
                "asset",
                "fiscal_year",
                "period_month",
                "method",
                "opening_value",
                "charge",
                "closing_value",
                "automatic",
                "notes",
            ])?;
            for e in &entries {
                wtr.write_record([
                    e.asset_id.to_string(),
                    names.get(&e.asset_id).cloned().unwrap_or_default(),
                    e.fiscal_year.to_string(),
                    e.period_month.to_string(),
                    e.method.to_string(),
                    e.opening_value.to_string(),
                    e.charge.to_string(),
                    e.closing_value.to_string(),
                    e.automatic.to_string(),
                    e.notes.clone().unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        _ => {
            let items: Vec<_> = entries
                .iter()
                .map(|e| {
                    json!({
                        "asset_id": e.asset_id,
                        "asset": names.get(&e.asset_id),
                        "fiscal_year": e.fiscal_year,
                        "period_month": e.period_month,
                        "method": e.method,
                        "opening_value": e.opening_value,
                        "charge": e.charge,
                        "closing_value": e.closing_value,
                        "automatic": e.automatic,
                        "notes": e.notes,
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
    }
    println!("Exported {} entries to {}", entries.len(), out);
    Ok(())
}
