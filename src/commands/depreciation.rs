// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::declining_basis;
use crate::engine::scheduler::{BatchMode, BatchRequest, CalculationResponse, calculate_batch, preview_entry};
use crate::models::Entry;
use crate::store::{EntryFilter, OwnerStore};
use crate::utils::{fmt_money, maybe_print_json, opt_arg, parse_decimal, pretty_table};
use anyhow::{Result, anyhow};
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, owner: i64, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("calculate", sub)) => calculate(conn, owner, sub)?,
        Some(("preview", sub)) => preview(conn, owner, sub)?,
        Some(("list", sub)) => list(&OwnerStore::new(conn, owner), sub)?,
        Some(("adjust", sub)) => {
            let store = OwnerStore::new(conn, owner);
            let id = *sub.get_one::<i64>("id").unwrap();
            let charge = parse_decimal(sub.get_one::<String>("charge").unwrap())?;
            let notes = opt_arg(sub, "notes");
            let entry = store.adjust_entry(id, charge, notes.as_deref())?;
            tracing::info!(entry_id = id, charge = %entry.charge, "entry adjusted by hand");
            println!(
                "Entry {} adjusted: charge {} closing {}",
                entry.id,
                fmt_money(&entry.charge),
                fmt_money(&entry.closing_value)
            );
        }
        _ => {}
    }
    Ok(())
}

pub fn build_request(
    store: &OwnerStore<'_>,
    sub: &clap::ArgMatches,
) -> Result<BatchRequest> {
    let mode: BatchMode = sub
        .get_one::<String>("mode")
        .map(|s| s.parse())
        .transpose()?
        .unwrap_or_default();
    Ok(BatchRequest {
        fiscal_year: *sub.get_one::<i32>("year").unwrap(),
        month: sub.get_one::<u32>("month").copied(),
        asset_id: sub.get_one::<i64>("asset").copied(),
        client_id: opt_arg(sub, "client")
            .map(|c| store.client_id(&c))
            .transpose()?,
        category_id: opt_arg(sub, "category")
            .map(|c| store.category_id(&c))
            .transpose()?,
        mode,
    })
}

fn calculate(conn: &mut Connection, owner: i64, sub: &clap::ArgMatches) -> Result<()> {
    let request = build_request(&OwnerStore::new(conn, owner), sub)?;
    let basis = declining_basis(conn)?;
    let response = calculate_batch(conn, owner, &request, basis)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &response)? {
        return Ok(());
    }
    match response {
        CalculationResponse::Completed {
            entries,
            failures,
            message,
            ..
        } => {
            println!("{}", message);
            if !entries.is_empty() {
                println!("{}", entries_table(&entries));
            }
            if !failures.is_empty() {
                let data = failures
                    .into_iter()
                    .map(|f| vec![f.asset_id.to_string(), f.asset_name, f.reason])
                    .collect();
                println!("{}", pretty_table(&["Asset", "Name", "Error"], data));
            }
            Ok(())
        }
        CalculationResponse::Failed { error, .. } => Err(anyhow!(error)),
    }
}

fn preview(conn: &Connection, owner: i64, sub: &clap::ArgMatches) -> Result<()> {
    let asset_id = *sub.get_one::<i64>("asset").unwrap();
    let year = *sub.get_one::<i32>("year").unwrap();
    let computed = preview_entry(conn, owner, asset_id, year, declining_basis(conn)?)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &computed)? {
        return Ok(());
    }
    let d = &computed.diagnostics;
    let data = vec![
        vec!["Method".into(), computed.method.to_string()],
        vec!["Parameters from".into(), d.parameter_year.to_string()],
        vec!["Opening".into(), fmt_money(&computed.opening_value)],
        vec!["Fiscal residual".into(), fmt_money(&d.fiscal_residual)],
        vec!["Amortizable base".into(), fmt_money(&d.amortizable_base)],
        vec!["Charge".into(), fmt_money(&computed.charge)],
        vec!["Closing".into(), fmt_money(&computed.closing_value)],
    ];
    println!("{}", pretty_table(&["Asset", &asset_id.to_string()], data));
    Ok(())
}

fn list(store: &OwnerStore<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let filter = EntryFilter {
        fiscal_year: sub.get_one::<i32>("year").copied(),
        asset_id: sub.get_one::<i64>("asset").copied(),
        client_id: opt_arg(sub, "client")
            .map(|c| store.client_id(&c))
            .transpose()?,
        category_id: opt_arg(sub, "category")
            .map(|c| store.category_id(&c))
            .transpose()?,
    };
    let entries = store.list_entries(&filter)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &entries)? {
        println!("{}", entries_table(&entries));
    }
    Ok(())
}

fn entries_table(entries: &[Entry]) -> comfy_table::Table {
    let data = entries
        .iter()
        .map(|e| {
            vec![
                e.id.to_string(),
                e.asset_id.to_string(),
                format!("{}-{:02}", e.fiscal_year, e.period_month),
                e.method.to_string(),
                fmt_money(&e.opening_value),
                fmt_money(&e.charge),
                fmt_money(&e.closing_value),
                if e.automatic { "auto".into() } else { "manual".into() },
                e.notes.clone().unwrap_or_default(),
            ]
        })
        .collect();
    pretty_table(
        &[
            "ID", "Asset", "Period", "Method", "Opening", "Charge", "Closing", "Source", "Notes",
        ],
        data,
    )
}
