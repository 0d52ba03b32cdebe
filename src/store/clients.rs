// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{OptionalExtension, Row, params};

use super::{OwnerStore, bool_from_sql};
use crate::error::{DepreloError, Result};
use crate::models::Client;

const CLIENT_COLUMNS: &str = "id, owner_id, name, tax_id, email, active";

fn client_from_row(r: &Row<'_>) -> rusqlite::Result<Client> {
    Ok(Client {
        id: r.get(0)?,
        owner_id: r.get(1)?,
        name: r.get(2)?,
        tax_id: r.get(3)?,
        email: r.get(4)?,
        active: bool_from_sql(r.get(5)?),
    })
}

impl OwnerStore<'_> {
    pub fn add_client(&self, name: &str, tax_id: Option<&str>, email: Option<&str>) -> Result<i64> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DepreloError::validation("client name must not be empty"));
        }
        if self.find_client_id(name)?.is_some() {
            return Err(DepreloError::validation(format!(
                "client '{}' already exists",
                name
            )));
        }
        self.conn.execute(
            "INSERT INTO clients(owner_id, name, tax_id, email) VALUES (?1,?2,?3,?4)",
            params![self.owner_id, name, tax_id, email],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn list_clients(&self, include_inactive: bool) -> Result<Vec<Client>> {
        let sql = format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE owner_id=?1 AND (active=1 OR ?2) ORDER BY name"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![self.owner_id, include_inactive], client_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn client(&self, id: i64) -> Result<Client> {
        let sql = format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE owner_id=?1 AND id=?2");
        self.conn
            .query_row(&sql, params![self.owner_id, id], client_from_row)
            .optional()?
            .ok_or_else(|| DepreloError::NotFound(format!("client {}", id)))
    }

    fn find_client_id(&self, name: &str) -> Result<Option<i64>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id FROM clients WHERE owner_id=?1 AND name=?2 AND active=1",
                params![self.owner_id, name.trim()],
                |r| r.get(0),
            )
            .optional()?)
    }

    pub fn client_id(&self, name: &str) -> Result<i64> {
        self.find_client_id(name)?
            .ok_or_else(|| DepreloError::NotFound(format!("client '{}'", name.trim())))
    }

    /// Soft-deletes a client that no active asset references.
    pub fn deactivate_client(&self, id: i64) -> Result<()> {
        let client = self.client(id)?;
        let in_use: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM assets WHERE owner_id=?1 AND client_id=?2 AND active=1",
            params![self.owner_id, id],
            |r| r.get(0),
        )?;
        if in_use > 0 {
            return Err(DepreloError::validation(format!(
                "client '{}' still has {} active asset(s)",
                client.name, in_use
            )));
        }
        self.conn.execute(
            "UPDATE clients SET active=0 WHERE owner_id=?1 AND id=?2",
            params![self.owner_id, id],
        )?;
        Ok(())
    }
}
