// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.deprelo", "Deprelo", "deprelo"));

pub const DB_ENV: &str = "DEPRELO_DB";

pub fn db_path() -> Result<PathBuf> {
    if let Some(p) = std::env::var_os(DB_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(p));
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("deprelo.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    open_at(&path)
}

pub fn open_at(path: &Path) -> Result<Connection> {
    let conn =
        Connection::open(path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    tracing::debug!(path = %path.display(), "database ready");
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("Open in-memory DB")?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS owners(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS clients(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        owner_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        tax_id TEXT,
        email TEXT,
        active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(owner_id) REFERENCES owners(id) ON DELETE CASCADE
    );
    CREATE UNIQUE INDEX IF NOT EXISTS ux_clients_owner_name
        ON clients(owner_id, name) WHERE active = 1;

    CREATE TABLE IF NOT EXISTS categories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        owner_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        description TEXT,
        active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(owner_id) REFERENCES owners(id) ON DELETE CASCADE
    );
    CREATE UNIQUE INDEX IF NOT EXISTS ux_categories_owner_name
        ON categories(owner_id, name) WHERE active = 1;

    CREATE TABLE IF NOT EXISTS assets(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        owner_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        category_id INTEGER NOT NULL,
        client_id INTEGER NOT NULL,
        acquisition_value TEXT NOT NULL,
        residual_value TEXT NOT NULL DEFAULT '0',
        acquisition_date TEXT NOT NULL,
        serial_number TEXT,
        status TEXT NOT NULL DEFAULT 'in_use'
            CHECK(status IN ('in_use','maintenance','out_of_service','sold','retired')),
        active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(owner_id) REFERENCES owners(id) ON DELETE CASCADE,
        FOREIGN KEY(category_id) REFERENCES categories(id),
        FOREIGN KEY(client_id) REFERENCES clients(id)
    );
    CREATE UNIQUE INDEX IF NOT EXISTS ux_assets_owner_serial
        ON assets(owner_id, serial_number) WHERE serial_number IS NOT NULL;
    CREATE INDEX IF NOT EXISTS idx_assets_owner ON assets(owner_id, active);

    -- one active parameter set per (owner, category, fiscal year)
    CREATE TABLE IF NOT EXISTS fiscal_parameters(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        owner_id INTEGER NOT NULL,
        category_id INTEGER NOT NULL,
        fiscal_year INTEGER NOT NULL,
        useful_life_years INTEGER NOT NULL,
        method TEXT NOT NULL CHECK(method IN ('linear','declining','accelerated')),
        residual_percentage TEXT NOT NULL,
        annual_rate TEXT NOT NULL DEFAULT '0',
        adjustment_coefficient TEXT NOT NULL DEFAULT '1',
        active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(owner_id) REFERENCES owners(id) ON DELETE CASCADE,
        FOREIGN KEY(category_id) REFERENCES categories(id)
    );
    CREATE UNIQUE INDEX IF NOT EXISTS ux_fiscal_parameters_active
        ON fiscal_parameters(owner_id, category_id, fiscal_year) WHERE active = 1;

    CREATE TABLE IF NOT EXISTS depreciation_entries(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        owner_id INTEGER NOT NULL,
        asset_id INTEGER NOT NULL,
        fiscal_year INTEGER NOT NULL,
        period_month INTEGER NOT NULL DEFAULT 12,
        opening_value TEXT NOT NULL,
        charge TEXT NOT NULL,
        closing_value TEXT NOT NULL,
        method TEXT NOT NULL,
        automatic INTEGER NOT NULL DEFAULT 1,
        notes TEXT,
        diagnostics TEXT NOT NULL,
        computed_at TEXT NOT NULL,
        UNIQUE(asset_id, fiscal_year),
        FOREIGN KEY(owner_id) REFERENCES owners(id) ON DELETE CASCADE,
        FOREIGN KEY(asset_id) REFERENCES assets(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_entries_owner_year
        ON depreciation_entries(owner_id, fiscal_year);
    "#,
    )?;
    Ok(())
}
