// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{OptionalExtension, Row, params};

use super::{OwnerStore, bool_from_sql};
use crate::error::{DepreloError, Result};
use crate::models::Category;

fn category_from_row(r: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: r.get(0)?,
        owner_id: r.get(1)?,
        name: r.get(2)?,
        description: r.get(3)?,
        active: bool_from_sql(r.get(4)?),
    })
}

impl OwnerStore<'_> {
    pub fn add_category(&self, name: &str, description: Option<&str>) -> Result<i64> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DepreloError::validation("category name must not be empty"));
        }
        if self.find_category_id(name)?.is_some() {
            return Err(DepreloError::validation(format!(
                "category '{}' already exists",
                name
            )));
        }
        self.conn.execute(
            "INSERT INTO categories(owner_id, name, description) VALUES (?1,?2,?3)",
            params![self.owner_id, name, description],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn list_categories(&self, include_inactive: bool) -> Result<Vec<Category>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, owner_id, name, description, active FROM categories
             WHERE owner_id=?1 AND (active=1 OR ?2) ORDER BY name",
        )?;
        let rows = stmt.query_map(params![self.owner_id, include_inactive], category_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn category(&self, id: i64) -> Result<Category> {
        self.conn
            .query_row(
                "SELECT id, owner_id, name, description, active FROM categories
                 WHERE owner_id=?1 AND id=?2",
                params![self.owner_id, id],
                category_from_row,
            )
            .optional()?
            .ok_or_else(|| DepreloError::NotFound(format!("category {}", id)))
    }

    fn find_category_id(&self, name: &str) -> Result<Option<i64>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id FROM categories WHERE owner_id=?1 AND name=?2 AND active=1",
                params![self.owner_id, name.trim()],
                |r| r.get(0),
            )
            .optional()?)
    }

    pub fn category_id(&self, name: &str) -> Result<i64> {
        self.find_category_id(name)?
            .ok_or_else(|| DepreloError::NotFound(format!("category '{}'", name.trim())))
    }

    /// Soft-deletes a category that no active asset references.
    pub fn deactivate_category(&self, id: i64) -> Result<()> {
        let category = self.category(id)?;
        let in_use: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM assets WHERE owner_id=?1 AND category_id=?2 AND active=1",
            params![self.owner_id, id],
            |r| r.get(0),
        )?;
        if in_use > 0 {
            return Err(DepreloError::validation(format!(
                "category '{}' still has {} active asset(s)",
                category.name, in_use
            )));
        }
        self.conn.execute(
            "UPDATE categories SET active=0 WHERE owner_id=?1 AND id=?2",
            params![self.owner_id, id],
        )?;
        Ok(())
    }
}
