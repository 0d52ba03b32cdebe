// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Single-period depreciation. One call covers one fiscal year and is posted
//! at the fiscal-year close.
//!
//! The fiscal residual is always `acquisition_value * residual_percentage`
//! from the parameter set; the asset's own residual value plays no part.
//! The charge is rounded to cents, then clamped so the closing value never
//! drops below the fiscal residual, and finally re-derived as
//! `opening - closing` so the entry balances exactly.

use rust_decimal::Decimal;

use crate::error::{DepreloError, Result};
use crate::models::{
    Asset, ComputedEntry, DepreciationMethod, EntryDiagnostics, OpeningBasis, ParameterSet,
};

pub const CLOSING_MONTH: u32 = 12;

fn acceleration_factor() -> Decimal {
    Decimal::new(15, 1)
}

/// Computes the entry for `fiscal_year` starting from the full acquisition
/// value.
pub fn compute_entry(
    asset: &Asset,
    params: &ParameterSet,
    fiscal_year: i32,
) -> Result<ComputedEntry> {
    compute_from_opening(
        asset,
        params,
        fiscal_year,
        asset.acquisition_value,
        OpeningBasis::Acquisition,
    )
}

/// Computes the entry for `fiscal_year` starting from `opening`.
pub fn compute_from_opening(
    asset: &Asset,
    params: &ParameterSet,
    fiscal_year: i32,
    opening: Decimal,
    basis: OpeningBasis,
) -> Result<ComputedEntry> {
    check_inputs(asset, params)?;

    let fiscal_residual = mul(asset.acquisition_value, params.residual_percentage)?;
    let amortizable_base = asset.acquisition_value - fiscal_residual;

    let raw_charge = match params.method {
        DepreciationMethod::Linear => {
            let per_year = amortizable_base
                .checked_div(Decimal::from(params.useful_life_years))
                .ok_or_else(|| overflow(asset))?;
            mul(per_year, params.adjustment_coefficient)?
        }
        DepreciationMethod::Declining => mul(
            mul(opening, params.annual_rate)?,
            params.adjustment_coefficient,
        )?,
        DepreciationMethod::Accelerated => mul(
            mul(opening, mul(params.annual_rate, acceleration_factor())?)?,
            params.adjustment_coefficient,
        )?,
    };

    let closing_value = if opening <= fiscal_residual {
        // already at (or under) the floor: nothing left to depreciate
        opening
    } else {
        (opening - raw_charge.round_dp(2)).max(fiscal_residual)
    };
    let charge = opening - closing_value;

    Ok(ComputedEntry {
        asset_id: asset.id,
        fiscal_year,
        period_month: CLOSING_MONTH,
        opening_value: opening,
        charge,
        closing_value,
        method: params.method,
        automatic: true,
        diagnostics: EntryDiagnostics {
            parameter_set_id: params.id,
            parameter_year: params.fiscal_year,
            useful_life_years: params.useful_life_years,
            residual_percentage: params.residual_percentage,
            annual_rate: params.annual_rate,
            adjustment_coefficient: params.adjustment_coefficient,
            fiscal_residual,
            amortizable_base,
            raw_charge,
            opening_basis: basis,
        },
    })
}

fn check_inputs(asset: &Asset, params: &ParameterSet) -> Result<()> {
    if asset.acquisition_value <= Decimal::ZERO {
        return Err(DepreloError::configuration(format!(
            "asset {} has a non-positive acquisition value ({})",
            asset.id, asset.acquisition_value
        )));
    }
    if params.useful_life_years <= 0 {
        return Err(DepreloError::configuration(format!(
            "parameter set {} has a useful life of {} years",
            params.id, params.useful_life_years
        )));
    }
    if params.residual_percentage < Decimal::ZERO || params.residual_percentage > Decimal::ONE {
        return Err(DepreloError::configuration(format!(
            "parameter set {} has residual percentage {} outside 0..1",
            params.id, params.residual_percentage
        )));
    }
    if params.annual_rate < Decimal::ZERO || params.annual_rate > Decimal::ONE {
        return Err(DepreloError::configuration(format!(
            "parameter set {} has annual rate {} outside 0..1",
            params.id, params.annual_rate
        )));
    }
    if params.adjustment_coefficient < Decimal::ZERO {
        return Err(DepreloError::configuration(format!(
            "parameter set {} has a negative adjustment coefficient ({})",
            params.id, params.adjustment_coefficient
        )));
    }
    Ok(())
}

fn mul(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_mul(b).ok_or_else(|| {
        DepreloError::configuration(format!("arithmetic overflow computing {} x {}", a, b))
    })
}

fn overflow(asset: &Asset) -> DepreloError {
    DepreloError::configuration(format!(
        "arithmetic overflow computing depreciation for asset {}",
        asset.id
    ))
}

