// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{OptionalExtension, Row, params};
use rust_decimal::Decimal;

use super::{OwnerStore, bool_from_sql};
use crate::error::{DepreloError, Result};
use crate::models::{Asset, AssetStatus, NewAsset};
use crate::utils::stored_decimal;

const ASSET_COLUMNS: &str = "id, owner_id, name, category_id, client_id, acquisition_value, \
     residual_value, acquisition_date, serial_number, status, active";

/// Optional filters intersected on top of the owner scope.
#[derive(Debug, Clone, Default)]
pub struct AssetFilter {
    pub asset_id: Option<i64>,
    pub client_id: Option<i64>,
    pub category_id: Option<i64>,
    pub status: Option<AssetStatus>,
    pub include_inactive: bool,
}

struct AssetRow {
    id: i64,
    owner_id: i64,
    name: String,
    category_id: i64,
    client_id: i64,
    acquisition_value: String,
    residual_value: String,
    acquisition_date: NaiveDate,
    serial_number: Option<String>,
    status: String,
    active: i64,
}

impl AssetRow {
    fn read(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: r.get(0)?,
            owner_id: r.get(1)?,
            name: r.get(2)?,
            category_id: r.get(3)?,
            client_id: r.get(4)?,
            acquisition_value: r.get(5)?,
            residual_value: r.get(6)?,
            acquisition_date: r.get(7)?,
            serial_number: r.get(8)?,
            status: r.get(9)?,
            active: r.get(10)?,
        })
    }

    fn into_asset(self) -> Result<Asset> {
        Ok(Asset {
            id: self.id,
            owner_id: self.owner_id,
            name: self.name,
            category_id: self.category_id,
            client_id: self.client_id,
            acquisition_value: stored_decimal("acquisition value", &self.acquisition_value)?,
            residual_value: stored_decimal("residual value", &self.residual_value)?,
            acquisition_date: self.acquisition_date,
            serial_number: self.serial_number,
            status: self.status.parse()?,
            active: bool_from_sql(self.active),
        })
    }
}

impl OwnerStore<'_> {
    pub fn add_asset(&self, new: &NewAsset) -> Result<i64> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(DepreloError::validation("asset name must not be empty"));
        }
        if new.acquisition_value < Decimal::ZERO {
            return Err(DepreloError::validation(format!(
                "acquisition value must not be negative (got {})",
                new.acquisition_value
            )));
        }
        if new.residual_value < Decimal::ZERO {
            return Err(DepreloError::validation(format!(
                "residual value must not be negative (got {})",
                new.residual_value
            )));
        }
        let category = self.category(new.category_id)?;
        if !category.active {
            return Err(DepreloError::validation(format!(
                "category '{}' is inactive",
                category.name
            )));
        }
        let client = self.client(new.client_id)?;
        if !client.active {
            return Err(DepreloError::validation(format!(
                "client '{}' is inactive",
                client.name
            )));
        }
        let serial = new
            .serial_number
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        if let Some(serial) = serial {
            let taken: Option<i64> = self
                .conn
                .query_row(
                    "SELECT id FROM assets WHERE owner_id=?1 AND serial_number=?2",
                    params![self.owner_id, serial],
                    |r| r.get(0),
                )
                .optional()?;
            if taken.is_some() {
                return Err(DepreloError::validation(format!(
                    "serial number '{}' is already registered",
                    serial
                )));
            }
        }
        self.conn.execute(
            "INSERT INTO assets(owner_id, name, category_id, client_id, acquisition_value,
                                residual_value, acquisition_date, serial_number, status)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9)",
            params![
                self.owner_id,
                name,
                new.category_id,
                new.client_id,
                new.acquisition_value.to_string(),
                new.residual_value.to_string(),
                new.acquisition_date,
                serial,
                new.status.as_str()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn asset(&self, id: i64) -> Result<Asset> {
        let sql = format!("SELECT {ASSET_COLUMNS} FROM assets WHERE owner_id=?1 AND id=?2");
        let row = self
            .conn
            .query_row(&sql, params![self.owner_id, id], AssetRow::read)
            .optional()?
            .ok_or_else(|| DepreloError::NotFound(format!("asset {}", id)))?;
        row.into_asset()
    }

    fn filtered(&self, columns: &str, filter: &AssetFilter) -> (String, Vec<Value>) {
        let mut sql = format!("SELECT {columns} FROM assets WHERE owner_id=?");
        let mut args: Vec<Value> = vec![Value::Integer(self.owner_id)];
        if !filter.include_inactive {
            sql.push_str(" AND active=1");
        }
        if let Some(id) = filter.asset_id {
            sql.push_str(" AND id=?");
            args.push(Value::Integer(id));
        }
        if let Some(id) = filter.client_id {
            sql.push_str(" AND client_id=?");
            args.push(Value::Integer(id));
        }
        if let Some(id) = filter.category_id {
            sql.push_str(" AND category_id=?");
            args.push(Value::Integer(id));
        }
        if let Some(status) = filter.status {
            sql.push_str(" AND status=?");
            args.push(Value::Text(status.as_str().to_string()));
        }
        sql.push_str(" ORDER BY id");
        (sql, args)
    }

    pub fn list_assets(&self, filter: &AssetFilter) -> Result<Vec<Asset>> {
        let (sql, args) = self.filtered(ASSET_COLUMNS, filter);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(args), AssetRow::read)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?.into_asset()?);
        }
        Ok(out)
    }

    /// Active assets matching every given filter; the batch candidate set.
    pub fn candidate_assets(&self, filter: &AssetFilter) -> Result<Vec<Asset>> {
        let filter = AssetFilter {
            include_inactive: false,
            ..filter.clone()
        };
        self.list_assets(&filter)
    }

    /// `(id, name)` of the batch candidate set. Stored amounts are not
    /// parsed here; each asset is loaded on its own with [`Self::asset`].
    pub fn candidate_keys(&self, filter: &AssetFilter) -> Result<Vec<(i64, String)>> {
        let filter = AssetFilter {
            include_inactive: false,
            ..filter.clone()
        };
        let (sql, args) = self.filtered("id, name", &filter);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(args), |r| {
            Ok((r.get(0)?, r.get(1)?))
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Owners of the asset's category and client as stored, without the
    /// owner filter on the joined rows.
    pub fn asset_owner_links(&self, asset_id: i64) -> Result<(Option<i64>, Option<i64>)> {
        self.conn
            .query_row(
                "SELECT c.owner_id, cl.owner_id
                 FROM assets a
                 LEFT JOIN categories c ON c.id = a.category_id
                 LEFT JOIN clients cl ON cl.id = a.client_id
                 WHERE a.owner_id=?1 AND a.id=?2",
                params![self.owner_id, asset_id],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()?
            .ok_or_else(|| DepreloError::NotFound(format!("asset {}", asset_id)))
    }

    pub fn set_asset_status(&self, id: i64, status: AssetStatus) -> Result<()> {
        let n = self.conn.execute(
            "UPDATE assets SET status=?3 WHERE owner_id=?1 AND id=?2",
            params![self.owner_id, id, status.as_str()],
        )?;
        if n == 0 {
            return Err(DepreloError::NotFound(format!("asset {}", id)));
        }
        Ok(())
    }

    pub fn deactivate_asset(&self, id: i64) -> Result<()> {
        let n = self.conn.execute(
            "UPDATE assets SET active=0 WHERE owner_id=?1 AND id=?2",
            params![self.owner_id, id],
        )?;
        if n == 0 {
            return Err(DepreloError::NotFound(format!("asset {}", id)));
        }
        Ok(())
    }
}
