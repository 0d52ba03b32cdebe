// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{AssetStatus, NewAsset};
use crate::store::{AssetFilter, OwnerStore};
use crate::utils::{fmt_money, maybe_print_json, opt_arg, parse_date, parse_decimal, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::collections::HashMap;

pub fn handle(conn: &Connection, owner: i64, m: &clap::ArgMatches) -> Result<()> {
    let store = OwnerStore::new(conn, owner);
    match m.subcommand() {
        Some(("add", sub)) => add(&store, sub)?,
        Some(("list", sub)) => list(&store, sub)?,
        Some(("status", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let status: AssetStatus = sub.get_one::<String>("status").unwrap().parse()?;
            store.set_asset_status(id, status)?;
            println!("Asset {} is now {}", id, status);
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            store.deactivate_asset(id)?;
            println!("Removed asset {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn add(store: &OwnerStore<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap().trim().to_string();
    let category_id = store.category_id(sub.get_one::<String>("category").unwrap())?;
    let client_id = store.client_id(sub.get_one::<String>("client").unwrap())?;
    let acquisition_value = parse_decimal(sub.get_one::<String>("value").unwrap())?;
    let residual_value = match sub.get_one::<String>("residual") {
        Some(raw) => parse_decimal(raw)?,
        None => Decimal::ZERO,
    };
    let acquisition_date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let status = match opt_arg(sub, "status") {
        Some(s) => s.parse()?,
        None => AssetStatus::InUse,
    };
    let id = store.add_asset(&NewAsset {
        name: name.clone(),
        category_id,
        client_id,
        acquisition_value,
        residual_value,
        acquisition_date,
        serial_number: opt_arg(sub, "serial"),
        status,
    })?;
    println!(
        "Added asset {} '{}' ({} acquired {})",
        id, name, acquisition_value, acquisition_date
    );
    Ok(())
}

fn list(store: &OwnerStore<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let filter = AssetFilter {
        category_id: opt_arg(sub, "category")
            .map(|c| store.category_id(&c))
            .transpose()?,
        client_id: opt_arg(sub, "client")
            .map(|c| store.client_id(&c))
            .transpose()?,
        status: opt_arg(sub, "status").map(|s| s.parse()).transpose()?,
        include_inactive: sub.get_flag("all"),
        ..Default::default()
    };
    let assets = store.list_assets(&filter)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &assets)? {
        return Ok(());
    }
    let categories: HashMap<i64, String> = store
        .list_categories(true)?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();
    let clients: HashMap<i64, String> = store
        .list_clients(true)?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();
    let data = assets
        .into_iter()
        .map(|a| {
            vec![
                a.id.to_string(),
                a.name,
                categories.get(&a.category_id).cloned().unwrap_or_default(),
                clients.get(&a.client_id).cloned().unwrap_or_default(),
                fmt_money(&a.acquisition_value),
                a.acquisition_date.to_string(),
                a.serial_number.unwrap_or_default(),
                a.status.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Name", "Category", "Client", "Value", "Acquired", "Serial", "Status"],
            data
        )
    );
    Ok(())
}
