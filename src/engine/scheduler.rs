// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::Utc;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::calculator::{CLOSING_MONTH, compute_entry, compute_from_opening};
use super::resolver::resolve;
use crate::config::DecliningBasis;
use crate::error::{DepreloError, Result};
use crate::models::{Asset, ComputedEntry, Entry, OpeningBasis};
use crate::store::{AssetFilter, OwnerStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchMode {
    /// Skip assets that already have an entry for the year.
    #[default]
    Automatic,
    /// Replace any existing entry for the year.
    Recalculate,
}

impl fmt::Display for BatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BatchMode::Automatic => "automatic",
            BatchMode::Recalculate => "recalculate",
        })
    }
}

impl FromStr for BatchMode {
    type Err = DepreloError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "automatic" | "auto" => Ok(BatchMode::Automatic),
            "recalculate" | "recalc" => Ok(BatchMode::Recalculate),
            other => Err(DepreloError::validation(format!(
                "unknown mode '{}' (use automatic|recalculate)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    pub fiscal_year: i32,
    pub month: Option<u32>,
    pub asset_id: Option<i64>,
    pub client_id: Option<i64>,
    pub category_id: Option<i64>,
    pub mode: BatchMode,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetFailure {
    pub asset_id: i64,
    pub asset_name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub processed: usize,
    pub skipped: usize,
    pub failures: Vec<AssetFailure>,
    pub entries: Vec<Entry>,
    pub message: String,
}

impl BatchOutcome {
    pub fn error_count(&self) -> usize {
        self.failures.len()
    }
}

/// Result shape handed back to the caller of a calculation trigger.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CalculationResponse {
    #[serde(rename_all = "camelCase")]
    Completed {
        success: bool,
        processed_count: usize,
        skipped_count: usize,
        error_count: usize,
        entries: Vec<Entry>,
        failures: Vec<AssetFailure>,
        message: String,
    },
    Failed {
        success: bool,
        error: String,
    },
}

impl CalculationResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, CalculationResponse::Completed { .. })
    }
}

enum AssetResult {
    Created(Box<Entry>),
    Skipped,
}

fn validate_request(store: &OwnerStore<'_>, request: &BatchRequest) -> Result<()> {
    crate::store::validate_fiscal_year(request.fiscal_year)?;
    if let Some(month) = request.month {
        if !(1..=12).contains(&month) {
            return Err(DepreloError::validation(format!(
                "month {} is out of range (1-12)",
                month
            )));
        }
    }
    // unknown ids for this owner are bad filters, not an empty selection
    if let Some(id) = request.asset_id {
        store.asset(id).map_err(not_found_as_validation)?;
    }
    if let Some(id) = request.client_id {
        store.client(id).map_err(not_found_as_validation)?;
    }
    if let Some(id) = request.category_id {
        store.category(id).map_err(not_found_as_validation)?;
    }
    Ok(())
}

fn not_found_as_validation(e: DepreloError) -> DepreloError {
    match e {
        DepreloError::NotFound(what) => DepreloError::validation(format!("unknown {}", what)),
        other => other,
    }
}

/// Rejects an asset whose category or client is owned by someone else.
pub fn check_integrity(store: &OwnerStore<'_>, asset: &Asset) -> Result<()> {
    let (category_owner, client_owner) = store.asset_owner_links(asset.id)?;
    if category_owner != Some(store.owner_id()) {
        return Err(DepreloError::Integrity(format!(
            "asset {} references category {} outside its owner",
            asset.id, asset.category_id
        )));
    }
    if client_owner != Some(store.owner_id()) {
        return Err(DepreloError::Integrity(format!(
            "asset {} references client {} outside its owner",
            asset.id, asset.client_id
        )));
    }
    Ok(())
}

/// Resolves parameters and computes one asset's entry without storing it.
fn compute_for(
    store: &OwnerStore<'_>,
    asset: &Asset,
    fiscal_year: i32,
    basis: DecliningBasis,
) -> Result<ComputedEntry> {
    check_integrity(store, asset)?;
    let params = resolve(store, asset.category_id, fiscal_year)?;
    match basis {
        DecliningBasis::Reset => compute_entry(asset, &params, fiscal_year),
        DecliningBasis::Chain => match store.closing_before(asset.id, fiscal_year)? {
            Some(opening) => compute_from_opening(
                asset,
                &params,
                fiscal_year,
                opening,
                OpeningBasis::PriorClosing,
            ),
            None => compute_entry(asset, &params, fiscal_year),
        },
    }
}

fn process_asset(
    store: &OwnerStore<'_>,
    asset: &Asset,
    request: &BatchRequest,
    basis: DecliningBasis,
) -> Result<AssetResult> {
    match request.mode {
        BatchMode::Automatic => {
            if store.entry_exists(asset.id, request.fiscal_year)? {
                return Ok(AssetResult::Skipped);
            }
        }
        BatchMode::Recalculate => {
            store.delete_entries(asset.id, request.fiscal_year)?;
        }
    }
    let mut computed = compute_for(store, asset, request.fiscal_year, basis)?;
    computed.period_month = request.month.unwrap_or(CLOSING_MONTH);
    let entry = store.insert_entry(&computed, Utc::now())?;
    Ok(AssetResult::Created(Box::new(entry)))
}

/// Runs depreciation for every active asset of the owner matching the
/// request's filters. Each asset is handled in its own transaction; assets
/// that fail for configuration or integrity reasons are rolled back,
/// recorded and skipped. Database failures abort the batch.
#[tracing::instrument(skip(conn, request), fields(fiscal_year = request.fiscal_year, mode = %request.mode))]
pub fn run_batch(
    conn: &mut Connection,
    owner_id: i64,
    request: &BatchRequest,
    basis: DecliningBasis,
) -> Result<BatchOutcome> {
    let candidates = {
        let store = OwnerStore::new(conn, owner_id);
        validate_request(&store, request)?;
        store.candidate_keys(&AssetFilter {
            asset_id: request.asset_id,
            client_id: request.client_id,
            category_id: request.category_id,
            ..Default::default()
        })?
    };
    if candidates.is_empty() {
        return Err(DepreloError::validation("no assets found matching filters"));
    }

    let mut processed = 0;
    let mut skipped = 0;
    let mut failures = Vec::new();
    let mut entries = Vec::new();

    for (asset_id, asset_name) in &candidates {
        let tx = conn.transaction()?;
        let result = {
            let store = OwnerStore::new(&tx, owner_id);
            store
                .asset(*asset_id)
                .and_then(|asset| process_asset(&store, &asset, request, basis))
        };
        match result {
            Ok(AssetResult::Created(entry)) => {
                tx.commit()?;
                processed += 1;
                entries.push(*entry);
            }
            Ok(AssetResult::Skipped) => {
                tx.rollback()?;
                tracing::debug!(asset_id = *asset_id, "entry already present, skipping");
                skipped += 1;
            }
            Err(e) if e.is_per_asset() => {
                tx.rollback()?;
                tracing::warn!(asset_id = *asset_id, error = %e, "asset not depreciated");
                failures.push(AssetFailure {
                    asset_id: *asset_id,
                    asset_name: asset_name.clone(),
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }

    let message = format!(
        "Depreciation for {}: {} processed, {} skipped, {} error(s)",
        request.fiscal_year,
        processed,
        skipped,
        failures.len()
    );
    tracing::info!(processed, skipped, errors = failures.len(), "batch finished");
    Ok(BatchOutcome {
        processed,
        skipped,
        failures,
        entries,
        message,
    })
}

/// Trigger entrypoint. Validation failures come back as a failed response;
/// database errors are returned to the caller untouched.
pub fn calculate_batch(
    conn: &mut Connection,
    owner_id: i64,
    request: &BatchRequest,
    basis: DecliningBasis,
) -> Result<CalculationResponse> {
    match run_batch(conn, owner_id, request, basis) {
        Ok(outcome) => Ok(CalculationResponse::Completed {
            success: true,
            processed_count: outcome.processed,
            skipped_count: outcome.skipped,
            error_count: outcome.error_count(),
            entries: outcome.entries,
            failures: outcome.failures,
            message: outcome.message,
        }),
        Err(DepreloError::Database(e)) => Err(DepreloError::Database(e)),
        Err(e) => Ok(CalculationResponse::Failed {
            success: false,
            error: e.to_string(),
        }),
    }
}

/// Computes a single asset's entry for `fiscal_year` without storing it.
pub fn preview_entry(
    conn: &Connection,
    owner_id: i64,
    asset_id: i64,
    fiscal_year: i32,
    basis: DecliningBasis,
) -> Result<ComputedEntry> {
    crate::store::validate_fiscal_year(fiscal_year)?;
    let store = OwnerStore::new(conn, owner_id);
    let asset = store.asset(asset_id)?;
    compute_for(&store, &asset, fiscal_year, basis)
}
