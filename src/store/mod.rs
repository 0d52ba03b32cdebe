// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Owner-scoped data access. Every query issued through [`OwnerStore`]
//! filters on its owner id; nothing else in the crate touches the entity
//! tables directly.

mod assets;
mod categories;
mod clients;
mod entries;
mod parameters;

pub use assets::AssetFilter;
pub use entries::EntryFilter;
pub use parameters::validate_fiscal_year;

use rusqlite::{Connection, OptionalExtension, params};

use crate::error::{DepreloError, Result};
use crate::models::Owner;

#[derive(Clone, Copy)]
pub struct OwnerStore<'c> {
    conn: &'c Connection,
    owner_id: i64,
}

impl<'c> OwnerStore<'c> {
    pub fn new(conn: &'c Connection, owner_id: i64) -> Self {
        Self { conn, owner_id }
    }

    pub fn owner_id(&self) -> i64 {
        self.owner_id
    }
}

pub fn create_owner(conn: &Connection, name: &str) -> Result<i64> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DepreloError::validation("owner name must not be empty"));
    }
    let exists: Option<i64> = conn
        .query_row("SELECT id FROM owners WHERE name=?1", params![name], |r| {
            r.get(0)
        })
        .optional()?;
    if exists.is_some() {
        return Err(DepreloError::validation(format!(
            "owner '{}' already exists",
            name
        )));
    }
    conn.execute("INSERT INTO owners(name) VALUES (?1)", params![name])?;
    Ok(conn.last_insert_rowid())
}

pub fn list_owners(conn: &Connection) -> Result<Vec<Owner>> {
    let mut stmt = conn.prepare("SELECT id, name FROM owners ORDER BY id")?;
    let rows = stmt.query_map([], |r| {
        Ok(Owner {
            id: r.get(0)?,
            name: r.get(1)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn owner_exists(conn: &Connection, owner_id: i64) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT id FROM owners WHERE id=?1",
            params![owner_id],
            |r| r.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

pub(crate) fn bool_from_sql(v: i64) -> bool {
    v != 0
}
