// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{DepreloError, Result};
use crate::models::NewParameterSet;
use crate::store::{OwnerStore, validate_fiscal_year};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CopySummary {
    pub source_year: i32,
    pub destination_year: i32,
    pub copied_count: usize,
}

/// Duplicates every active parameter set of `source_year` into
/// `destination_year`, multiplying each adjustment coefficient by
/// `coefficient_factor`. All or nothing: a destination year that already
/// has active parameters is rejected before anything is written.
#[tracing::instrument(skip(conn))]
pub fn copy_year(
    conn: &mut Connection,
    owner_id: i64,
    source_year: i32,
    destination_year: i32,
    coefficient_factor: Decimal,
) -> Result<CopySummary> {
    validate_fiscal_year(source_year)?;
    validate_fiscal_year(destination_year)?;
    if source_year == destination_year {
        return Err(DepreloError::validation(
            "source and destination years must differ",
        ));
    }
    if coefficient_factor <= Decimal::ZERO {
        return Err(DepreloError::validation(format!(
            "coefficient factor must be positive (got {})",
            coefficient_factor
        )));
    }

    let tx = conn.transaction()?;
    let copied_count = {
        let store = OwnerStore::new(&tx, owner_id);
        let existing = store.active_parameter_count(destination_year)?;
        if existing > 0 {
            return Err(DepreloError::validation(format!(
                "fiscal year {} already has {} active parameter set(s)",
                destination_year, existing
            )));
        }
        let source = store.parameters_for_year(source_year)?;
        if source.is_empty() {
            return Err(DepreloError::validation(format!(
                "fiscal year {} has no active parameters to copy",
                source_year
            )));
        }
        for p in &source {
            let coefficient = p
                .adjustment_coefficient
                .checked_mul(coefficient_factor)
                .ok_or_else(|| {
                    DepreloError::validation(format!(
                        "coefficient factor {} overflows parameter set {}",
                        coefficient_factor, p.id
                    ))
                })?;
            store.insert_parameters(&NewParameterSet {
                category_id: p.category_id,
                fiscal_year: destination_year,
                useful_life_years: p.useful_life_years,
                method: p.method,
                residual_percentage: p.residual_percentage,
                annual_rate: p.annual_rate,
                adjustment_coefficient: coefficient,
            })?;
        }
        source.len()
    };
    tx.commit()?;

    tracing::info!(copied_count, "parameters copied");
    Ok(CopySummary {
        source_year,
        destination_year,
        copied_count,
    })
}
