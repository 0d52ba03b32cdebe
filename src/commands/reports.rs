// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::reports::{self, GroupTotal, Grouping};
use crate::store::OwnerStore;
use crate::utils::{fmt_money, maybe_print_json, opt_arg, parse_date, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, owner: i64, m: &clap::ArgMatches) -> Result<()> {
    let store = OwnerStore::new(conn, owner);
    match m.subcommand() {
        Some(("dashboard", sub)) => dashboard(&store, sub)?,
        Some(("by-category", sub)) => grouped(&store, sub, Grouping::Category, "Category")?,
        Some(("by-client", sub)) => grouped(&store, sub, Grouping::Client, "Client")?,
        Some(("by-method", sub)) => grouped(&store, sub, Grouping::Method, "Method")?,
        Some(("by-month", sub)) => grouped(&store, sub, Grouping::Month, "Period")?,
        Some(("nearing-end", sub)) => nearing_end(&store, sub)?,
        Some(("unposted", sub)) => unposted(&store, sub)?,
        _ => {}
    }
    Ok(())
}

fn dashboard(store: &OwnerStore<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let year = *sub.get_one::<i32>("year").unwrap();
    let d = reports::dashboard(store, year)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &d)? {
        return Ok(());
    }
    let data = vec![
        vec!["Active assets".into(), d.asset_count.to_string()],
        vec!["Acquisition total".into(), fmt_money(&d.acquisition_total)],
        vec![format!("Charge {}", year), fmt_money(&d.year_charge)],
        vec!["Net book value".into(), fmt_money(&d.net_book_value)],
        vec!["Posted".into(), d.entries_posted.to_string()],
        vec!["Not posted".into(), d.assets_without_entry.to_string()],
    ];
    println!("{}", pretty_table(&["Dashboard", &year.to_string()], data));
    Ok(())
}

fn grouped(
    store: &OwnerStore<'_>,
    sub: &clap::ArgMatches,
    grouping: Grouping,
    header: &str,
) -> Result<()> {
    let year = *sub.get_one::<i32>("year").unwrap();
    let totals: Vec<GroupTotal> = reports::grouped_totals(store, year, grouping)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &totals)? {
        return Ok(());
    }
    let data = totals
        .into_iter()
        .map(|g| {
            vec![
                g.label,
                g.entries.to_string(),
                fmt_money(&g.total_charge),
                fmt_money(&g.closing_total),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&[header, "Entries", "Charge", "Closing"], data)
    );
    Ok(())
}

fn nearing_end(store: &OwnerStore<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let today = match opt_arg(sub, "today") {
        Some(s) => parse_date(&s)?,
        None => chrono::Local::now().date_naive(),
    };
    let months = *sub.get_one::<u32>("months").unwrap_or(&12);
    let rows = reports::nearing_full_depreciation(store, today, months)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &rows)? {
        return Ok(());
    }
    let data = rows
        .into_iter()
        .map(|n| {
            vec![
                n.asset_id.to_string(),
                n.name,
                n.acquisition_date.to_string(),
                n.useful_life_years.to_string(),
                n.end_date.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Asset", "Name", "Acquired", "Life", "Fully depreciated"], data)
    );
    Ok(())
}

fn unposted(store: &OwnerStore<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let year = sub.get_one::<i32>("year").copied();
    let assets = reports::assets_without_entries(store, year)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &assets)? {
        return Ok(());
    }
    let data = assets
        .into_iter()
        .map(|a| vec![a.id.to_string(), a.name, a.acquisition_date.to_string()])
        .collect();
    println!("{}", pretty_table(&["Asset", "Name", "Acquired"], data));
    Ok(())
}
