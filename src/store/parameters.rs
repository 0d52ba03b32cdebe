// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::types::Value;
use rusqlite::{OptionalExtension, Row, params};
use rust_decimal::Decimal;

use super::{OwnerStore, bool_from_sql};
use crate::error::{DepreloError, Result};
use crate::models::{NewParameterSet, ParameterSet, ParameterUpdate};
use crate::utils::stored_decimal;

const PARAMETER_COLUMNS: &str = "id, owner_id, category_id, fiscal_year, useful_life_years, \
     method, residual_percentage, annual_rate, adjustment_coefficient, active";

struct ParameterRow {
    id: i64,
    owner_id: i64,
    category_id: i64,
    fiscal_year: i32,
    useful_life_years: i32,
    method: String,
    residual_percentage: String,
    annual_rate: String,
    adjustment_coefficient: String,
    active: i64,
}

impl ParameterRow {
    fn read(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: r.get(0)?,
            owner_id: r.get(1)?,
            category_id: r.get(2)?,
            fiscal_year: r.get(3)?,
            useful_life_years: r.get(4)?,
            method: r.get(5)?,
            residual_percentage: r.get(6)?,
            annual_rate: r.get(7)?,
            adjustment_coefficient: r.get(8)?,
            active: r.get(9)?,
        })
    }

    fn into_parameters(self) -> Result<ParameterSet> {
        Ok(ParameterSet {
            id: self.id,
            owner_id: self.owner_id,
            category_id: self.category_id,
            fiscal_year: self.fiscal_year,
            useful_life_years: self.useful_life_years,
            method: self.method.parse()?,
            residual_percentage: stored_decimal("residual percentage", &self.residual_percentage)?,
            annual_rate: stored_decimal("annual rate", &self.annual_rate)?,
            adjustment_coefficient: stored_decimal(
                "adjustment coefficient",
                &self.adjustment_coefficient,
            )?,
            active: bool_from_sql(self.active),
        })
    }
}

fn collect(rows: impl Iterator<Item = rusqlite::Result<ParameterRow>>) -> Result<Vec<ParameterSet>> {
    let mut out = Vec::new();
    for row in rows {
        out.push(row?.into_parameters()?);
    }
    Ok(out)
}

pub fn validate_fiscal_year(year: i32) -> Result<()> {
    if !(1900..=2200).contains(&year) {
        return Err(DepreloError::validation(format!(
            "fiscal year {} is out of range (1900-2200)",
            year
        )));
    }
    Ok(())
}

fn validate_values(
    useful_life_years: i32,
    residual_percentage: Decimal,
    annual_rate: Decimal,
    adjustment_coefficient: Decimal,
) -> Result<()> {
    if useful_life_years <= 0 {
        return Err(DepreloError::validation(format!(
            "useful life must be at least one year (got {})",
            useful_life_years
        )));
    }
    for (label, v) in [
        ("residual percentage", residual_percentage),
        ("annual rate", annual_rate),
    ] {
        if v < Decimal::ZERO || v > Decimal::ONE {
            return Err(DepreloError::validation(format!(
                "{} must be a fraction between 0 and 1 (got {})",
                label, v
            )));
        }
    }
    if adjustment_coefficient <= Decimal::ZERO {
        return Err(DepreloError::validation(format!(
            "adjustment coefficient must be positive (got {})",
            adjustment_coefficient
        )));
    }
    Ok(())
}

impl OwnerStore<'_> {
    pub fn add_parameters(&self, new: &NewParameterSet) -> Result<i64> {
        validate_fiscal_year(new.fiscal_year)?;
        validate_values(
            new.useful_life_years,
            new.residual_percentage,
            new.annual_rate,
            new.adjustment_coefficient,
        )?;
        let category = self.category(new.category_id)?;
        if !category.active {
            return Err(DepreloError::validation(format!(
                "category '{}' is inactive",
                category.name
            )));
        }
        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM fiscal_parameters
                 WHERE owner_id=?1 AND category_id=?2 AND fiscal_year=?3 AND active=1",
                params![self.owner_id, new.category_id, new.fiscal_year],
                |r| r.get(0),
            )
            .optional()?;
        if existing.is_some() {
            return Err(DepreloError::validation(format!(
                "parameters for category '{}' in {} already exist",
                category.name, new.fiscal_year
            )));
        }
        self.insert_parameters(new)
    }

    /// Raw insert; callers have already validated.
    pub(crate) fn insert_parameters(&self, new: &NewParameterSet) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO fiscal_parameters(owner_id, category_id, fiscal_year, useful_life_years,
                 method, residual_percentage, annual_rate, adjustment_coefficient)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8)",
            params![
                self.owner_id,
                new.category_id,
                new.fiscal_year,
                new.useful_life_years,
                new.method.as_str(),
                new.residual_percentage.to_string(),
                new.annual_rate.to_string(),
                new.adjustment_coefficient.to_string()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn update_parameters(&self, id: i64, update: &ParameterUpdate) -> Result<ParameterSet> {
        if update.is_empty() {
            return Err(DepreloError::validation("nothing to update"));
        }
        let mut current = self.parameter_set(id)?;
        if !current.active {
            return Err(DepreloError::validation(format!(
                "parameter set {} is inactive",
                id
            )));
        }
        if let Some(v) = update.useful_life_years {
            current.useful_life_years = v;
        }
        if let Some(v) = update.method {
            current.method = v;
        }
        if let Some(v) = update.residual_percentage {
            current.residual_percentage = v;
        }
        if let Some(v) = update.annual_rate {
            current.annual_rate = v;
        }
        if let Some(v) = update.adjustment_coefficient {
            current.adjustment_coefficient = v;
        }
        validate_values(
            current.useful_life_years,
            current.residual_percentage,
            current.annual_rate,
            current.adjustment_coefficient,
        )?;
        self.conn.execute(
            "UPDATE fiscal_parameters
             SET useful_life_years=?3, method=?4, residual_percentage=?5, annual_rate=?6,
                 adjustment_coefficient=?7
             WHERE owner_id=?1 AND id=?2",
            params![
                self.owner_id,
                id,
                current.useful_life_years,
                current.method.as_str(),
                current.residual_percentage.to_string(),
                current.annual_rate.to_string(),
                current.adjustment_coefficient.to_string()
            ],
        )?;
        Ok(current)
    }

    pub fn deactivate_parameters(&self, id: i64) -> Result<()> {
        let n = self.conn.execute(
            "UPDATE fiscal_parameters SET active=0 WHERE owner_id=?1 AND id=?2",
            params![self.owner_id, id],
        )?;
        if n == 0 {
            return Err(DepreloError::NotFound(format!("parameter set {}", id)));
        }
        Ok(())
    }

    pub fn parameter_set(&self, id: i64) -> Result<ParameterSet> {
        let sql =
            format!("SELECT {PARAMETER_COLUMNS} FROM fiscal_parameters WHERE owner_id=?1 AND id=?2");
        self.conn
            .query_row(&sql, params![self.owner_id, id], ParameterRow::read)
            .optional()?
            .ok_or_else(|| DepreloError::NotFound(format!("parameter set {}", id)))?
            .into_parameters()
    }

    pub fn list_parameters(
        &self,
        fiscal_year: Option<i32>,
        category_id: Option<i64>,
        include_inactive: bool,
    ) -> Result<Vec<ParameterSet>> {
        let mut sql = format!("SELECT {PARAMETER_COLUMNS} FROM fiscal_parameters WHERE owner_id=?");
        let mut args: Vec<Value> = vec![Value::Integer(self.owner_id)];
        if !include_inactive {
            sql.push_str(" AND active=1");
        }
        if let Some(year) = fiscal_year {
            sql.push_str(" AND fiscal_year=?");
            args.push(Value::Integer(year.into()));
        }
        if let Some(cat) = category_id {
            sql.push_str(" AND category_id=?");
            args.push(Value::Integer(cat));
        }
        sql.push_str(" ORDER BY fiscal_year DESC, category_id");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(args), ParameterRow::read)?;
        collect(rows)
    }

    pub fn parameters_for_year(&self, fiscal_year: i32) -> Result<Vec<ParameterSet>> {
        self.list_parameters(Some(fiscal_year), None, false)
    }

    pub fn active_parameter_count(&self, fiscal_year: i32) -> Result<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM fiscal_parameters WHERE owner_id=?1 AND fiscal_year=?2 AND active=1",
            params![self.owner_id, fiscal_year],
            |r| r.get(0),
        )?)
    }

    /// Active set with the greatest fiscal year not after `fiscal_year`.
    pub fn latest_parameters_at_or_before(
        &self,
        category_id: i64,
        fiscal_year: i32,
    ) -> Result<Option<ParameterSet>> {
        let sql = format!(
            "SELECT {PARAMETER_COLUMNS} FROM fiscal_parameters
             WHERE owner_id=?1 AND category_id=?2 AND fiscal_year<=?3 AND active=1
             ORDER BY fiscal_year DESC LIMIT 1"
        );
        let row = self
            .conn
            .query_row(
                &sql,
                params![self.owner_id, category_id, fiscal_year],
                ParameterRow::read,
            )
            .optional()?;
        row.map(ParameterRow::into_parameters).transpose()
    }
}
