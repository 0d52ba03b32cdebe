// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Read-only projections over stored depreciation entries for dashboards
//! and exports. Nothing here recomputes depreciation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::engine::resolve;
use crate::error::{DepreloError, Result};
use crate::models::{Asset, Entry};
use crate::store::{AssetFilter, EntryFilter, OwnerStore};
use crate::utils::add_months;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotal {
    pub label: String,
    pub entries: usize,
    pub total_charge: Decimal,
    pub closing_total: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    Category,
    Client,
    Method,
    Month,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub fiscal_year: i32,
    pub asset_count: usize,
    pub acquisition_total: Decimal,
    pub year_charge: Decimal,
    pub net_book_value: Decimal,
    pub entries_posted: usize,
    pub assets_without_entry: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct NearingEnd {
    pub asset_id: i64,
    pub name: String,
    pub acquisition_date: NaiveDate,
    pub useful_life_years: i32,
    pub end_date: NaiveDate,
}

fn year_entries(store: &OwnerStore<'_>, fiscal_year: i32) -> Result<Vec<Entry>> {
    store.list_entries(&EntryFilter {
        fiscal_year: Some(fiscal_year),
        ..Default::default()
    })
}

fn assets_by_id(store: &OwnerStore<'_>) -> Result<HashMap<i64, Asset>> {
    let all = store.list_assets(&AssetFilter {
        include_inactive: true,
        ..Default::default()
    })?;
    Ok(all.into_iter().map(|a| (a.id, a)).collect())
}

/// Totals of one fiscal year's entries, grouped and sorted by label.
pub fn grouped_totals(
    store: &OwnerStore<'_>,
    fiscal_year: i32,
    grouping: Grouping,
) -> Result<Vec<GroupTotal>> {
    let entries = year_entries(store, fiscal_year)?;
    let assets = assets_by_id(store)?;
    let names: HashMap<i64, String> = match grouping {
        Grouping::Category => store
            .list_categories(true)?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect(),
        Grouping::Client => store
            .list_clients(true)?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect(),
        Grouping::Method | Grouping::Month => HashMap::new(),
    };

    let mut groups: BTreeMap<String, GroupTotal> = BTreeMap::new();
    for e in &entries {
        let asset = assets
            .get(&e.asset_id)
            .ok_or_else(|| DepreloError::NotFound(format!("asset {}", e.asset_id)))?;
        let label = match grouping {
            Grouping::Category => names
                .get(&asset.category_id)
                .cloned()
                .unwrap_or_else(|| format!("#{}", asset.category_id)),
            Grouping::Client => names
                .get(&asset.client_id)
                .cloned()
                .unwrap_or_else(|| format!("#{}", asset.client_id)),
            Grouping::Method => e.method.to_string(),
            Grouping::Month => format!("{}-{:02}", e.fiscal_year, e.period_month),
        };
        let g = groups.entry(label.clone()).or_insert(GroupTotal {
            label,
            entries: 0,
            total_charge: Decimal::ZERO,
            closing_total: Decimal::ZERO,
        });
        g.entries += 1;
        g.total_charge += e.charge;
        g.closing_total += e.closing_value;
    }
    Ok(groups.into_values().collect())
}

pub fn by_category(store: &OwnerStore<'_>, fiscal_year: i32) -> Result<Vec<GroupTotal>> {
    grouped_totals(store, fiscal_year, Grouping::Category)
}

pub fn by_client(store: &OwnerStore<'_>, fiscal_year: i32) -> Result<Vec<GroupTotal>> {
    grouped_totals(store, fiscal_year, Grouping::Client)
}

pub fn by_method(store: &OwnerStore<'_>, fiscal_year: i32) -> Result<Vec<GroupTotal>> {
    grouped_totals(store, fiscal_year, Grouping::Method)
}

pub fn by_month(store: &OwnerStore<'_>, fiscal_year: i32) -> Result<Vec<GroupTotal>> {
    grouped_totals(store, fiscal_year, Grouping::Month)
}

/// Headline figures for active assets as of `fiscal_year`; entries of
/// deactivated assets are left out of every figure. Net book value
/// takes each asset's latest closing value at or before the year, or its
/// acquisition value when nothing has been posted yet.
pub fn dashboard(store: &OwnerStore<'_>, fiscal_year: i32) -> Result<Dashboard> {
    let assets = store.candidate_assets(&AssetFilter::default())?;
    let all_entries = store.list_entries(&EntryFilter::default())?;

    let active: HashSet<i64> = assets.iter().map(|a| a.id).collect();

    let mut latest: HashMap<i64, &Entry> = HashMap::new();
    let mut year_charge = Decimal::ZERO;
    let mut posted: HashSet<i64> = HashSet::new();
    for e in all_entries
        .iter()
        .filter(|e| e.fiscal_year <= fiscal_year && active.contains(&e.asset_id))
    {
        if e.fiscal_year == fiscal_year {
            year_charge += e.charge;
            posted.insert(e.asset_id);
        }
        let slot = latest.entry(e.asset_id).or_insert(e);
        if e.fiscal_year > slot.fiscal_year {
            *slot = e;
        }
    }

    let mut acquisition_total = Decimal::ZERO;
    let mut net_book_value = Decimal::ZERO;
    let mut entries_posted = 0;
    for a in &assets {
        acquisition_total += a.acquisition_value;
        net_book_value += latest
            .get(&a.id)
            .map(|e| e.closing_value)
            .unwrap_or(a.acquisition_value);
        if posted.contains(&a.id) {
            entries_posted += 1;
        }
    }

    Ok(Dashboard {
        fiscal_year,
        asset_count: assets.len(),
        acquisition_total,
        year_charge,
        net_book_value,
        entries_posted,
        assets_without_entry: assets.len() - entries_posted,
    })
}

/// Active assets whose useful life (from the parameters in force for
/// `today`'s year) ends between `today` and `horizon_months` later. Assets
/// without resolvable parameters are left out.
pub fn nearing_full_depreciation(
    store: &OwnerStore<'_>,
    today: NaiveDate,
    horizon_months: u32,
) -> Result<Vec<NearingEnd>> {
    use chrono::Datelike;

    let limit = add_months(today, horizon_months);
    let mut out = Vec::new();
    for asset in store.candidate_assets(&AssetFilter::default())? {
        let params = match resolve(store, asset.category_id, today.year()) {
            Ok(p) => p,
            Err(DepreloError::MissingParameters { .. }) => continue,
            Err(e) => return Err(e),
        };
        let life_months = u32::try_from(params.useful_life_years.max(0))
            .unwrap_or(0)
            .saturating_mul(12);
        let end_date = add_months(asset.acquisition_date, life_months);
        if end_date >= today && end_date <= limit {
            out.push(NearingEnd {
                asset_id: asset.id,
                name: asset.name,
                acquisition_date: asset.acquisition_date,
                useful_life_years: params.useful_life_years,
                end_date,
            });
        }
    }
    out.sort_by_key(|n| n.end_date);
    Ok(out)
}

/// Active assets with no entry at all, or none for `fiscal_year` if given.
pub fn assets_without_entries(
    store: &OwnerStore<'_>,
    fiscal_year: Option<i32>,
) -> Result<Vec<Asset>> {
    let posted: HashSet<i64> = store
        .list_entries(&EntryFilter {
            fiscal_year,
            ..Default::default()
        })?
        .into_iter()
        .map(|e| e.asset_id)
        .collect();
    Ok(store
        .candidate_assets(&AssetFilter::default())?
        .into_iter()
        .filter(|a| !posted.contains(&a.id))
        .collect())
}
