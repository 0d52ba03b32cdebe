// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Persistent settings stored in the `settings` table, plus owner selection.

use anyhow::{Context, Result, anyhow};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_OWNER_KEY: &str = "default_owner";
pub const DECLINING_BASIS_KEY: &str = "declining_basis";

pub const KNOWN_KEYS: [&str; 2] = [DEFAULT_OWNER_KEY, DECLINING_BASIS_KEY];

/// Opening value used for each single-year computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecliningBasis {
    /// Every year starts again from the acquisition value.
    #[default]
    Reset,
    /// A year opens at the closing value of the latest earlier entry.
    Chain,
}

impl DecliningBasis {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecliningBasis::Reset => "reset",
            DecliningBasis::Chain => "chain",
        }
    }
}

impl fmt::Display for DecliningBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecliningBasis {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "reset" => Ok(DecliningBasis::Reset),
            "chain" => Ok(DecliningBasis::Chain),
            other => Err(anyhow!(
                "Invalid declining basis '{}' (use reset|chain)",
                other
            )),
        }
    }
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    if !KNOWN_KEYS.contains(&key) {
        return Err(anyhow!(
            "Unknown setting '{}' (known: {})",
            key,
            KNOWN_KEYS.join(", ")
        ));
    }
    match key {
        DECLINING_BASIS_KEY => {
            value.parse::<DecliningBasis>()?;
        }
        DEFAULT_OWNER_KEY => {
            value
                .trim()
                .parse::<i64>()
                .with_context(|| format!("Invalid owner id '{}'", value))?;
        }
        _ => {}
    }
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value.trim()],
    )?;
    Ok(())
}

pub fn declining_basis(conn: &Connection) -> Result<DecliningBasis> {
    match get_setting(conn, DECLINING_BASIS_KEY)? {
        Some(v) => v.parse(),
        None => Ok(DecliningBasis::default()),
    }
}

/// Owner for this invocation: `--owner` / `DEPRELO_OWNER`, else the
/// `default_owner` setting. The owner must exist.
pub fn resolve_owner(conn: &Connection, matches: &clap::ArgMatches) -> Result<i64> {
    let owner = match matches.get_one::<i64>("owner") {
        Some(id) => *id,
        None => {
            let stored = get_setting(conn, DEFAULT_OWNER_KEY)?.ok_or_else(|| {
                anyhow!("No owner selected; pass --owner or run `deprelo config set default_owner <ID>`")
            })?;
            stored
                .parse::<i64>()
                .with_context(|| format!("Invalid default_owner setting '{}'", stored))?
        }
    };
    if !crate::store::owner_exists(conn, owner)? {
        return Err(anyhow!("Owner {} not found", owner));
    }
    Ok(owner)
}
