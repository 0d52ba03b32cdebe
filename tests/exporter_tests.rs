// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use deprelo::config::DecliningBasis;
use deprelo::db;
use deprelo::engine::{BatchRequest, run_batch};
use deprelo::models::{AssetStatus, DepreciationMethod, NewAsset, NewParameterSet};
use deprelo::store::{OwnerStore, create_owner};
use deprelo::{cli, commands::exporter};
use rusqlite::Connection;
use rust_decimal::Decimal;
use tempfile::tempdir;

fn setup() -> (Connection, i64) {
    let mut conn = db::open_in_memory().unwrap();
    let owner = create_owner(&conn, "Acme").unwrap();
    {
        let store = OwnerStore::new(&conn, owner);
        let category_id = store.add_category("Machinery", None).unwrap();
        let client_id = store.add_client("Northwind", None, None).unwrap();
        store
            .add_parameters(&NewParameterSet {
                category_id,
                fiscal_year: 2024,
                useful_life_years: 5,
                method: DepreciationMethod::Linear,
                residual_percentage: "0.1".parse().unwrap(),
                annual_rate: Decimal::ZERO,
                adjustment_coefficient: Decimal::ONE,
            })
            .unwrap();
        store
            .add_asset(&NewAsset {
                name: "Lathe".into(),
                category_id,
                client_id,
                acquisition_value: "1000".parse().unwrap(),
                residual_value: Decimal::ZERO,
                acquisition_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                serial_number: None,
                status: AssetStatus::InUse,
            })
            .unwrap();
    }
    run_batch(
        &mut conn,
        owner,
        &BatchRequest {
            fiscal_year: 2024,
            ..Default::default()
        },
        DecliningBasis::Reset,
    )
    .unwrap();
    (conn, owner)
}

#[test]
fn exporter_writes_json_entries() {
    let (conn, owner) = setup();
    let dir = tempdir().unwrap();
    let out = dir.path().join("entries.json");
    let out_str = out.to_str().unwrap();

    let matches = cli::build_cli().get_matches_from([
        "deprelo", "export", "entries", "--format", "json", "--out", out_str, "--year", "2024",
    ]);
    let (_, sub) = matches.subcommand().unwrap();
    exporter::handle(&conn, owner, sub).unwrap();

    let body = std::fs::read_to_string(&out).unwrap();
    let items: serde_json::Value = serde_json::from_str(&body).unwrap();
    let arr = items.as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["asset"], "Lathe");
    assert_eq!(arr[0]["fiscal_year"], 2024);
    assert_eq!(arr[0]["method"], "linear");
    assert_eq!(arr[0]["automatic"], true);
}

#[test]
fn exporter_writes_csv_with_header() {
    let (conn, owner) = setup();
    let dir = tempdir().unwrap();
    let out = dir.path().join("entries.csv");
    let out_str = out.to_str().unwrap();

    let matches = cli::build_cli().get_matches_from([
        "deprelo", "export", "entries", "--format", " CSV ", "--out", out_str,
    ]);
    let (_, sub) = matches.subcommand().unwrap();
    exporter::handle(&conn, owner, sub).unwrap();

    let mut rdr = csv::Reader::from_path(&out).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[0], "asset_id");
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][1], "Lathe");
    assert_eq!(rows[0][6].parse::<Decimal>().unwrap(), "180".parse().unwrap());
}

#[test]
fn exporter_rejects_unknown_format_before_writing() {
    let (conn, owner) = setup();
    let dir = tempdir().unwrap();
    let out = dir.path().join("entries.xml");
    let out_str = out.to_str().unwrap();

    let matches = cli::build_cli().get_matches_from([
        "deprelo", "export", "entries", "--format", "xml", "--out", out_str,
    ]);
    let (_, sub) = matches.subcommand().unwrap();
    let err = exporter::handle(&conn, owner, sub).unwrap_err();
    assert!(err.to_string().contains("Unknown format"));
    assert!(!out.exists());
}

#[test]
fn exporter_scopes_to_owner() {
    let (conn, _) = setup();
    let other = create_owner(&conn, "Globex").unwrap();
    let dir = tempdir().unwrap();
    let out = dir.path().join("entries.json");
    let out_str = out.to_str().unwrap();

    let matches = cli::build_cli().get_matches_from([
        "deprelo", "export", "entries", "--format", "json", "--out", out_str,
    ]);
    let (_, sub) = matches.subcommand().unwrap();
    exporter::handle(&conn, other, sub).unwrap();

    let items: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert!(items.as_array().unwrap().is_empty());
}
