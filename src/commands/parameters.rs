// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::{copy_year, resolve};
use crate::models::{NewParameterSet, ParameterSet, ParameterUpdate};
use crate::store::OwnerStore;
use crate::utils::{maybe_print_json, opt_arg, parse_decimal, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::collections::HashMap;

pub fn handle(conn: &mut Connection, owner: i64, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(&OwnerStore::new(conn, owner), sub)?,
        Some(("update", sub)) => update(&OwnerStore::new(conn, owner), sub)?,
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            OwnerStore::new(conn, owner).deactivate_parameters(id)?;
            println!("Removed parameter set {}", id);
        }
        Some(("list", sub)) => list(&OwnerStore::new(conn, owner), sub)?,
        Some(("resolve", sub)) => {
            let store = OwnerStore::new(conn, owner);
            let category_id = store.category_id(sub.get_one::<String>("category").unwrap())?;
            let year = *sub.get_one::<i32>("year").unwrap();
            let params = resolve(&store, category_id, year)?;
            print_sets(&store, sub, vec![params])?;
        }
        Some(("copy-year", sub)) => {
            let from = *sub.get_one::<i32>("from").unwrap();
            let to = *sub.get_one::<i32>("to").unwrap();
            let factor = match sub.get_one::<String>("factor") {
                Some(raw) => parse_decimal(raw)?,
                None => Decimal::ONE,
            };
            let summary = copy_year(conn, owner, from, to, factor)?;
            println!(
                "Copied {} parameter set(s) from {} to {}",
                summary.copied_count, summary.source_year, summary.destination_year
            );
        }
        _ => {}
    }
    Ok(())
}

fn add(store: &OwnerStore<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let category = sub.get_one::<String>("category").unwrap();
    let new = NewParameterSet {
        category_id: store.category_id(category)?,
        fiscal_year: *sub.get_one::<i32>("year").unwrap(),
        useful_life_years: *sub.get_one::<i32>("life").unwrap(),
        method: sub.get_one::<String>("method").unwrap().parse()?,
        residual_percentage: parse_decimal(sub.get_one::<String>("residual").unwrap())?,
        annual_rate: match sub.get_one::<String>("rate") {
            Some(raw) => parse_decimal(raw)?,
            None => Decimal::ZERO,
        },
        adjustment_coefficient: match sub.get_one::<String>("coefficient") {
            Some(raw) => parse_decimal(raw)?,
            None => Decimal::ONE,
        },
    };
    let id = store.add_parameters(&new)?;
    println!(
        "Added parameter set {} for '{}' in {} ({})",
        id,
        category.trim(),
        new.fiscal_year,
        new.method
    );
    Ok(())
}

fn update(store: &OwnerStore<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let decimal = |key: &str| -> Result<Option<Decimal>> {
        opt_arg(sub, key).map(|raw| parse_decimal(&raw)).transpose()
    };
    let update = ParameterUpdate {
        useful_life_years: sub.get_one::<i32>("life").copied(),
        method: opt_arg(sub, "method").map(|m| m.parse()).transpose()?,
        residual_percentage: decimal("residual")?,
        annual_rate: decimal("rate")?,
        adjustment_coefficient: decimal("coefficient")?,
    };
    let updated = store.update_parameters(id, &update)?;
    println!(
        "Updated parameter set {} ({} years, {})",
        updated.id, updated.useful_life_years, updated.method
    );
    Ok(())
}

fn list(store: &OwnerStore<'_>, sub: &clap::ArgMatches) -> Result<()> {
    let year = sub.get_one::<i32>("year").copied();
    let category_id = opt_arg(sub, "category")
        .map(|c| store.category_id(&c))
        .transpose()?;
    let sets = store.list_parameters(year, category_id, sub.get_flag("all"))?;
    print_sets(store, sub, sets)
}

fn print_sets(
    store: &OwnerStore<'_>,
    sub: &clap::ArgMatches,
    sets: Vec<ParameterSet>,
) -> Result<()> {
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &sets)? {
        return Ok(());
    }
    let names: HashMap<i64, String> = store
        .list_categories(true)?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();
    let data = sets
        .into_iter()
        .map(|p| {
            vec![
                p.id.to_string(),
                names.get(&p.category_id).cloned().unwrap_or_default(),
                p.fiscal_year.to_string(),
                p.useful_life_years.to_string(),
                p.method.to_string(),
                p.residual_percentage.to_string(),
                p.annual_rate.to_string(),
                p.adjustment_coefficient.to_string(),
                if p.active { "yes".into() } else { "no".into() },
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &[
                "ID", "Category", "Year", "Life", "Method", "Residual", "Rate", "Coef", "Active"
            ],
            data
        )
    );
    Ok(())
}
