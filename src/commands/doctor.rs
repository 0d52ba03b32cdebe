// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::scheduler::check_integrity;
use crate::error::DepreloError;
use crate::store::{AssetFilter, EntryFilter, OwnerStore};
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, owner: i64) -> Result<()> {
    let rows = findings(&OwnerStore::new(conn, owner))?;
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        let data = rows.into_iter().map(|(k, d)| vec![k, d]).collect();
        println!("{}", pretty_table(&["Issue", "Detail"], data));
    }
    Ok(())
}

/// (issue, detail) pairs for everything that looks wrong in the owner's data.
pub fn findings(store: &OwnerStore<'_>) -> Result<Vec<(String, String)>> {
    let mut rows = Vec::new();

    // 1) Assets linked across owners, and assets that cannot be depreciated
    let assets = store.list_assets(&AssetFilter {
        include_inactive: true,
        ..Default::default()
    })?;
    for a in &assets {
        match check_integrity(store, a) {
            Ok(()) => {}
            Err(DepreloError::Integrity(msg)) => rows.push(("cross_owner_link".into(), msg)),
            Err(e) => return Err(e.into()),
        }
        if a.active && a.acquisition_value <= Decimal::ZERO {
            rows.push((
                "non_positive_value".into(),
                format!("asset {} '{}' = {}", a.id, a.name, a.acquisition_value),
            ));
        }
    }

    // 2) Categories in use that have never had parameters
    for c in store.list_categories(false)? {
        if store.list_parameters(None, Some(c.id), false)?.is_empty() {
            rows.push(("category_without_parameters".into(), c.name));
        }
    }

    // 3) Entries that do not balance or sit under their floor
    for e in store.list_entries(&EntryFilter::default())? {
        if e.opening_value - e.charge != e.closing_value {
            rows.push((
                "unbalanced_entry".into(),
                format!(
                    "entry {} ({} - {} != {})",
                    e.id, e.opening_value, e.charge, e.closing_value
                ),
            ));
        }
        if e.closing_value < e.diagnostics.fiscal_residual
            && e.opening_value >= e.diagnostics.fiscal_residual
        {
            rows.push((
                "below_residual".into(),
                format!(
                    "entry {} closes at {} under {}",
                    e.id, e.closing_value, e.diagnostics.fiscal_residual
                ),
            ));
        }
    }

    Ok(rows)
}
