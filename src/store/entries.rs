// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{OptionalExtension, Row, params};
use rust_decimal::Decimal;

use super::{OwnerStore, bool_from_sql};
use crate::error::{DepreloError, Result};
use crate::models::{ComputedEntry, Entry, EntryDiagnostics};
use crate::utils::stored_decimal;

const ENTRY_COLUMNS: &str = "e.id, e.owner_id, e.asset_id, e.fiscal_year, e.period_month, \
     e.opening_value, e.charge, e.closing_value, e.method, e.automatic, e.notes, e.diagnostics, \
     e.computed_at";

#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    pub fiscal_year: Option<i32>,
    pub asset_id: Option<i64>,
    pub client_id: Option<i64>,
    pub category_id: Option<i64>,
}

struct EntryRow {
    id: i64,
    owner_id: i64,
    asset_id: i64,
    fiscal_year: i32,
    period_month: u32,
    opening_value: String,
    charge: String,
    closing_value: String,
    method: String,
    automatic: i64,
    notes: Option<String>,
    diagnostics: String,
    computed_at: DateTime<Utc>,
}

impl EntryRow {
    fn read(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: r.get(0)?,
            owner_id: r.get(1)?,
            asset_id: r.get(2)?,
            fiscal_year: r.get(3)?,
            period_month: r.get(4)?,
            opening_value: r.get(5)?,
            charge: r.get(6)?,
            closing_value: r.get(7)?,
            method: r.get(8)?,
            automatic: r.get(9)?,
            notes: r.get(10)?,
            diagnostics: r.get(11)?,
            computed_at: r.get(12)?,
        })
    }

    fn into_entry(self) -> Result<Entry> {
        let diagnostics: EntryDiagnostics =
            serde_json::from_str(&self.diagnostics).map_err(|e| {
                DepreloError::configuration(format!(
                    "invalid diagnostics on entry {}: {}",
                    self.id, e
                ))
            })?;
        Ok(Entry {
            id: self.id,
            owner_id: self.owner_id,
            asset_id: self.asset_id,
            fiscal_year: self.fiscal_year,
            period_month: self.period_month,
            opening_value: stored_decimal("opening value", &self.opening_value)?,
            charge: stored_decimal("charge", &self.charge)?,
            closing_value: stored_decimal("closing value", &self.closing_value)?,
            method: self.method.parse()?,
            automatic: bool_from_sql(self.automatic),
            notes: self.notes,
            diagnostics,
            computed_at: self.computed_at,
        })
    }
}

impl OwnerStore<'_> {
    pub fn entry_exists(&self, asset_id: i64, fiscal_year: i32) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM depreciation_entries WHERE owner_id=?1 AND asset_id=?2 AND fiscal_year=?3",
                params![self.owner_id, asset_id, fiscal_year],
                |r| r.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    pub fn delete_entries(&self, asset_id: i64, fiscal_year: i32) -> Result<usize> {
        Ok(self.conn.execute(
            "DELETE FROM depreciation_entries WHERE owner_id=?1 AND asset_id=?2 AND fiscal_year=?3",
            params![self.owner_id, asset_id, fiscal_year],
        )?)
    }

    pub fn insert_entry(&self, computed: &ComputedEntry, computed_at: DateTime<Utc>) -> Result<Entry> {
        let diagnostics = serde_json::to_string(&computed.diagnostics).map_err(|e| {
            DepreloError::configuration(format!("cannot encode diagnostics: {}", e))
        })?;
        self.conn.execute(
            "INSERT INTO depreciation_entries(owner_id, asset_id, fiscal_year, period_month,
                 opening_value, charge, closing_value, method, automatic, diagnostics, computed_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11)",
            params![
                self.owner_id,
                computed.asset_id,
                computed.fiscal_year,
                computed.period_month,
                computed.opening_value.to_string(),
                computed.charge.to_string(),
                computed.closing_value.to_string(),
                computed.method.as_str(),
                computed.automatic,
                diagnostics,
                computed_at
            ],
        )?;
        self.entry(self.conn.last_insert_rowid())
    }

    pub fn entry(&self, id: i64) -> Result<Entry> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM depreciation_entries e WHERE e.owner_id=?1 AND e.id=?2"
        );
        self.conn
            .query_row(&sql, params![self.owner_id, id], EntryRow::read)
            .optional()?
            .ok_or_else(|| DepreloError::NotFound(format!("entry {}", id)))?
            .into_entry()
    }

    pub fn list_entries(&self, filter: &EntryFilter) -> Result<Vec<Entry>> {
        let mut sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM depreciation_entries e
             JOIN assets a ON a.id = e.asset_id AND a.owner_id = e.owner_id
             WHERE e.owner_id=?"
        );
        let mut args: Vec<Value> = vec![Value::Integer(self.owner_id)];
        if let Some(year) = filter.fiscal_year {
            sql.push_str(" AND e.fiscal_year=?");
            args.push(Value::Integer(year.into()));
        }
        if let Some(id) = filter.asset_id {
            sql.push_str(" AND e.asset_id=?");
            args.push(Value::Integer(id));
        }
        if let Some(id) = filter.client_id {
            sql.push_str(" AND a.client_id=?");
            args.push(Value::Integer(id));
        }
        if let Some(id) = filter.category_id {
            sql.push_str(" AND a.category_id=?");
            args.push(Value::Integer(id));
        }
        sql.push_str(" ORDER BY e.fiscal_year, e.asset_id");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(args), EntryRow::read)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?.into_entry()?);
        }
        Ok(out)
    }

    /// Closing value of the latest entry for an earlier fiscal year.
    pub fn closing_before(&self, asset_id: i64, fiscal_year: i32) -> Result<Option<Decimal>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT closing_value FROM depreciation_entries
                 WHERE owner_id=?1 AND asset_id=?2 AND fiscal_year<?3
                 ORDER BY fiscal_year DESC LIMIT 1",
                params![self.owner_id, asset_id, fiscal_year],
                |r| r.get(0),
            )
            .optional()?;
        raw.map(|s| stored_decimal("closing value", &s)).transpose()
    }

    /// Replaces an entry's charge by hand. The entry stops counting as
    /// automatic; the closing value follows the new charge and may not drop
    /// under the fiscal residual, or under the opening value when the entry
    /// already opened below it.
    pub fn adjust_entry(&self, id: i64, charge: Decimal, notes: Option<&str>) -> Result<Entry> {
        let entry = self.entry(id)?;
        if charge < Decimal::ZERO {
            return Err(DepreloError::validation(format!(
                "charge must not be negative (got {})",
                charge
            )));
        }
        let closing = entry.opening_value - charge;
        // an entry that opened under its floor may keep its opening value
        let floor = entry.opening_value.min(entry.diagnostics.fiscal_residual);
        if closing < floor {
            return Err(DepreloError::validation(format!(
                "charge {} would take the closing value {} below the floor {}",
                charge, closing, floor
            )));
        }
        self.conn.execute(
            "UPDATE depreciation_entries
             SET charge=?3, closing_value=?4, automatic=0, notes=COALESCE(?5, notes)
             WHERE owner_id=?1 AND id=?2",
            params![
                self.owner_id,
                id,
                charge.to_string(),
                closing.to_string(),
                notes
            ],
        )?;
        self.entry(id)
    }
}
