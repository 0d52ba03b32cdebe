// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DepreloError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Owner {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub tax_id: Option<String>,
    pub email: Option<String>,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    InUse,
    Maintenance,
    OutOfService,
    Sold,
    Retired,
}

impl AssetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::InUse => "in_use",
            AssetStatus::Maintenance => "maintenance",
            AssetStatus::OutOfService => "out_of_service",
            AssetStatus::Sold => "sold",
            AssetStatus::Retired => "retired",
        }
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetStatus {
    type Err = DepreloError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "in_use" | "en_uso" => Ok(AssetStatus::InUse),
            "maintenance" | "mantenimiento" => Ok(AssetStatus::Maintenance),
            "out_of_service" | "fuera_de_servicio" => Ok(AssetStatus::OutOfService),
            "sold" | "vendido" => Ok(AssetStatus::Sold),
            "retired" | "dado_de_baja" => Ok(AssetStatus::Retired),
            other => Err(DepreloError::validation(format!(
                "unknown asset status '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub category_id: i64,
    pub client_id: i64,
    pub acquisition_value: Decimal,
    /// Informational only; the calculator uses the fiscal residual.
    pub residual_value: Decimal,
    pub acquisition_date: NaiveDate,
    pub serial_number: Option<String>,
    pub status: AssetStatus,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct NewAsset {
    pub name: String,
    pub category_id: i64,
    pub client_id: i64,
    pub acquisition_value: Decimal,
    pub residual_value: Decimal,
    pub acquisition_date: NaiveDate,
    pub serial_number: Option<String>,
    pub status: AssetStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepreciationMethod {
    Linear,
    Declining,
    Accelerated,
}

impl DepreciationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DepreciationMethod::Linear => "linear",
            DepreciationMethod::Declining => "declining",
            DepreciationMethod::Accelerated => "accelerated",
        }
    }
}

impl fmt::Display for DepreciationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DepreciationMethod {
    type Err = DepreloError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "linear" | "lineal" | "straight_line" => Ok(DepreciationMethod::Linear),
            "declining" | "decreciente" => Ok(DepreciationMethod::Declining),
            "accelerated" | "acelerada" | "acelerado" => Ok(DepreciationMethod::Accelerated),
            other => Err(DepreloError::validation(format!(
                "unknown depreciation method '{}' (use linear|declining|accelerated)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSet {
    pub id: i64,
    pub owner_id: i64,
    pub category_id: i64,
    pub fiscal_year: i32,
    pub useful_life_years: i32,
    pub method: DepreciationMethod,
    /// Fraction of acquisition value, 0..=1.
    pub residual_percentage: Decimal,
    /// Fraction, 0..=1. Ignored by the linear method.
    pub annual_rate: Decimal,
    pub adjustment_coefficient: Decimal,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct NewParameterSet {
    pub category_id: i64,
    pub fiscal_year: i32,
    pub useful_life_years: i32,
    pub method: DepreciationMethod,
    pub residual_percentage: Decimal,
    pub annual_rate: Decimal,
    pub adjustment_coefficient: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct ParameterUpdate {
    pub useful_life_years: Option<i32>,
    pub method: Option<DepreciationMethod>,
    pub residual_percentage: Option<Decimal>,
    pub annual_rate: Option<Decimal>,
    pub adjustment_coefficient: Option<Decimal>,
}

impl ParameterUpdate {
    pub fn is_empty(&self) -> bool {
        self.useful_life_years.is_none()
            && self.method.is_none()
            && self.residual_percentage.is_none()
            && self.annual_rate.is_none()
            && self.adjustment_coefficient.is_none()
    }
}

/// Where a computation took its opening value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpeningBasis {
    Acquisition,
    PriorClosing,
}

/// Inputs and intermediates kept with every entry for auditing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryDiagnostics {
    pub parameter_set_id: i64,
    pub parameter_year: i32,
    pub useful_life_years: i32,
    pub residual_percentage: Decimal,
    pub annual_rate: Decimal,
    pub adjustment_coefficient: Decimal,
    pub fiscal_residual: Decimal,
    pub amortizable_base: Decimal,
    pub raw_charge: Decimal,
    pub opening_basis: OpeningBasis,
}

/// Calculator output for one asset and fiscal year, before it is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedEntry {
    pub asset_id: i64,
    pub fiscal_year: i32,
    pub period_month: u32,
    pub opening_value: Decimal,
    pub charge: Decimal,
    pub closing_value: Decimal,
    pub method: DepreciationMethod,
    pub automatic: bool,
    pub diagnostics: EntryDiagnostics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub owner_id: i64,
    pub asset_id: i64,
    pub fiscal_year: i32,
    pub period_month: u32,
    pub opening_value: Decimal,
    pub charge: Decimal,
    pub closing_value: Decimal,
    pub method: DepreciationMethod,
    pub automatic: bool,
    pub notes: Option<String>,
    pub diagnostics: EntryDiagnostics,
    pub computed_at: DateTime<Utc>,
}
