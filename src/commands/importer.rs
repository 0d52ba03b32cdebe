// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{AssetStatus, NewAsset};
use crate::store::OwnerStore;
use crate::utils::{parse_date, parse_decimal};
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::collections::{HashMap, hash_map::Entry};

pub fn handle(conn: &mut Connection, owner: i64, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("assets", sub)) => {
            let path = sub.get_one::<String>("path").unwrap().trim();
            let count = import_assets(conn, owner, path)?;
            println!("Imported {} asset(s) from {}", count, path);
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Columns: name, category, client, acquisition_value, acquisition_date,
/// residual_value, serial_number, status. The last three may be empty.
/// Every row lands or none does.
pub fn import_assets(conn: &mut Connection, owner: i64, path: &str) -> Result<usize> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path))?;

    let tx = conn.transaction()?;
    let mut count = 0;
    {
        let store = OwnerStore::new(&tx, owner);
        let mut category_cache: HashMap<String, i64> = HashMap::new();
        let mut client_cache: HashMap<String, i64> = HashMap::new();

        for (line, result) in rdr.records().enumerate() {
            let rec = result?;
            let row = line + 2;
            let field = |i: usize| rec.get(i).unwrap_or("").trim().to_string();
            let name = field(0);
            let category = field(1);
            let client = field(2);
            let value_raw = field(3);
            let date_raw = field(4);
            let residual_raw = field(5);
            let serial = field(6);
            let status_raw = field(7);

            let category_id = match category_cache.entry(category.clone()) {
                Entry::Occupied(e) => *e.get(),
                Entry::Vacant(e) => *e.insert(
                    store
                        .category_id(&category)
                        .with_context(|| format!("row {}", row))?,
                ),
            };
            let client_id = match client_cache.entry(client.clone()) {
                Entry::Occupied(e) => *e.get(),
                Entry::Vacant(e) => *e.insert(
                    store
                        .client_id(&client)
                        .with_context(|| format!("row {}", row))?,
                ),
            };
            let acquisition_value = parse_decimal(&value_raw)
                .with_context(|| format!("row {}: acquisition value", row))?;
            let acquisition_date =
                parse_date(&date_raw).with_context(|| format!("row {}: acquisition date", row))?;
            let residual_value = if residual_raw.is_empty() {
                Decimal::ZERO
            } else {
                parse_decimal(&residual_raw)
                    .with_context(|| format!("row {}: residual value", row))?
            };
            let status = if status_raw.is_empty() {
                AssetStatus::InUse
            } else {
                status_raw
                    .parse::<AssetStatus>()
                    .with_context(|| format!("row {}: status", row))?
            };

            store
                .add_asset(&NewAsset {
                    name,
                    category_id,
                    client_id,
                    acquisition_value,
                    residual_value,
                    acquisition_date,
                    serial_number: Some(serial).filter(|s| !s.is_empty()),
                    status,
                })
                .with_context(|| format!("row {}", row))?;
            count += 1;
        }
    }
    tx.commit()?;
    tracing::info!(count, path, "assets imported");
    Ok(count)
}
