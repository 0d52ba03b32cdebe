// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use deprelo::config::DecliningBasis;
use deprelo::db;
use deprelo::engine::{
    BatchMode, BatchRequest, CalculationResponse, calculate_batch, preview_entry, run_batch,
};
use deprelo::error::DepreloError;
use deprelo::models::{AssetStatus, DepreciationMethod, NewAsset, NewParameterSet};
use deprelo::store::{EntryFilter, OwnerStore, create_owner};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;

struct Fixture {
    conn: Connection,
    owner: i64,
    machinery: i64,
    vehicles: i64,
    client: i64,
}

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn setup() -> Fixture {
    let conn = db::open_in_memory().unwrap();
    let owner = create_owner(&conn, "Acme").unwrap();
    let store = OwnerStore::new(&conn, owner);
    let machinery = store.add_category("Machinery", None).unwrap();
    let vehicles = store.add_category("Vehicles", None).unwrap();
    let client = store.add_client("Northwind", None, None).unwrap();
    store
        .add_parameters(&NewParameterSet {
            category_id: machinery,
            fiscal_year: 2024,
            useful_life_years: 5,
            method: DepreciationMethod::Linear,
            residual_percentage: d("0.1"),
            annual_rate: Decimal::ZERO,
            adjustment_coefficient: Decimal::ONE,
        })
        .unwrap();
    Fixture {
        conn,
        owner,
        machinery,
        vehicles,
        client,
    }
}

fn add_asset(f: &Fixture, name: &str, category_id: i64, value: &str) -> i64 {
    OwnerStore::new(&f.conn, f.owner)
        .add_asset(&NewAsset {
            name: name.into(),
            category_id,
            client_id: f.client,
            acquisition_value: d(value),
            residual_value: Decimal::ZERO,
            acquisition_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            serial_number: None,
            status: AssetStatus::InUse,
        })
        .unwrap()
}

fn request(year: i32, mode: BatchMode) -> BatchRequest {
    BatchRequest {
        fiscal_year: year,
        mode,
        ..Default::default()
    }
}

fn year_entries(f: &Fixture, year: i32) -> Vec<deprelo::models::Entry> {
    OwnerStore::new(&f.conn, f.owner)
        .list_entries(&EntryFilter {
            fiscal_year: Some(year),
            ..Default::default()
        })
        .unwrap()
}

#[test]
fn automatic_mode_is_idempotent() {
    let mut f = setup();
    add_asset(&f, "Lathe", f.machinery, "1000");
    add_asset(&f, "Press", f.machinery, "2000");

    let req = request(2024, BatchMode::Automatic);
    let first = run_batch(&mut f.conn, f.owner, &req, DecliningBasis::Reset).unwrap();
    assert_eq!(first.processed, 2);
    assert_eq!(first.skipped, 0);
    assert_eq!(first.error_count(), 0);
    assert_eq!(first.entries[0].charge, d("180"));
    assert_eq!(first.entries[1].charge, d("360"));

    let second = run_batch(&mut f.conn, f.owner, &req, DecliningBasis::Reset).unwrap();
    assert_eq!(second.processed, 0);
    assert_eq!(second.skipped, 2);
    assert!(second.entries.is_empty());
    assert_eq!(year_entries(&f, 2024).len(), 2);
}

#[test]
fn recalculate_replaces_existing_entry() {
    let mut f = setup();
    let lathe = add_asset(&f, "Lathe", f.machinery, "1000");
    run_batch(
        &mut f.conn,
        f.owner,
        &request(2024, BatchMode::Automatic),
        DecliningBasis::Reset,
    )
    .unwrap();

    // new coefficient for the year, then recalc
    let store = OwnerStore::new(&f.conn, f.owner);
    let set = store.parameters_for_year(2024).unwrap().remove(0);
    store
        .update_parameters(
            set.id,
            &deprelo::models::ParameterUpdate {
                adjustment_coefficient: Some(d("0.5")),
                ..Default::default()
            },
        )
        .unwrap();

    let out = run_batch(
        &mut f.conn,
        f.owner,
        &request(2024, BatchMode::Recalculate),
        DecliningBasis::Reset,
    )
    .unwrap();
    assert_eq!(out.processed, 1);
    let entries = year_entries(&f, 2024);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].asset_id, lathe);
    assert_eq!(entries[0].charge, d("90"));
}

#[test]
fn asset_without_parameters_is_recorded_and_batch_continues() {
    let mut f = setup();
    add_asset(&f, "Lathe", f.machinery, "1000");
    let truck = add_asset(&f, "Truck", f.vehicles, "5000");

    let out = run_batch(
        &mut f.conn,
        f.owner,
        &request(2024, BatchMode::Automatic),
        DecliningBasis::Reset,
    )
    .unwrap();
    assert_eq!(out.processed, 1);
    assert_eq!(out.error_count(), 1);
    assert_eq!(out.failures[0].asset_id, truck);
    assert_eq!(out.failures[0].asset_name, "Truck");
    assert!(out.failures[0].reason.contains("no fiscal parameters"));
    assert!(out.message.contains("1 processed"));
    assert!(out.message.contains("1 error(s)"));
}

#[test]
fn recalculate_failure_keeps_previous_entry() {
    let mut f = setup();
    add_asset(&f, "Lathe", f.machinery, "1000");
    run_batch(
        &mut f.conn,
        f.owner,
        &request(2024, BatchMode::Automatic),
        DecliningBasis::Reset,
    )
    .unwrap();

    let store = OwnerStore::new(&f.conn, f.owner);
    let set = store.parameters_for_year(2024).unwrap().remove(0);
    store.deactivate_parameters(set.id).unwrap();

    let out = run_batch(
        &mut f.conn,
        f.owner,
        &request(2024, BatchMode::Recalculate),
        DecliningBasis::Reset,
    )
    .unwrap();
    assert_eq!(out.processed, 0);
    assert_eq!(out.error_count(), 1);
    let entries = year_entries(&f, 2024);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].charge, d("180"));
}

#[test]
fn no_matching_assets_is_a_validation_error() {
    let mut f = setup();
    let err = run_batch(
        &mut f.conn,
        f.owner,
        &request(2024, BatchMode::Automatic),
        DecliningBasis::Reset,
    )
    .unwrap_err();
    assert!(matches!(err, DepreloError::Validation(_)));
    assert!(err.to_string().contains("no assets found"));
}

#[test]
fn calculate_batch_reports_failure_without_raising() {
    let mut f = setup();
    let resp = calculate_batch(
        &mut f.conn,
        f.owner,
        &request(2024, BatchMode::Automatic),
        DecliningBasis::Reset,
    )
    .unwrap();
    assert!(!resp.is_success());
    let json = serde_json::to_value(&resp).unwrap();
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("no assets found"));
}

#[test]
fn calculate_batch_serializes_camel_case_counts() {
    let mut f = setup();
    add_asset(&f, "Lathe", f.machinery, "1000");
    let resp = calculate_batch(
        &mut f.conn,
        f.owner,
        &request(2024, BatchMode::Automatic),
        DecliningBasis::Reset,
    )
    .unwrap();
    assert!(matches!(resp, CalculationResponse::Completed { .. }));
    let json = serde_json::to_value(&resp).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["processedCount"], 1);
    assert_eq!(json["skippedCount"], 0);
    assert_eq!(json["errorCount"], 0);
}

#[test]
fn month_out_of_range_is_rejected() {
    let mut f = setup();
    add_asset(&f, "Lathe", f.machinery, "1000");
    let req = BatchRequest {
        fiscal_year: 2024,
        month: Some(13),
        ..Default::default()
    };
    let err = run_batch(&mut f.conn, f.owner, &req, DecliningBasis::Reset).unwrap_err();
    assert!(matches!(err, DepreloError::Validation(_)));
}

#[test]
fn requested_month_is_stored() {
    let mut f = setup();
    add_asset(&f, "Lathe", f.machinery, "1000");
    let req = BatchRequest {
        fiscal_year: 2024,
        month: Some(6),
        ..Default::default()
    };
    let out = run_batch(&mut f.conn, f.owner, &req, DecliningBasis::Reset).unwrap();
    assert_eq!(out.entries[0].period_month, 6);
}

#[test]
fn filters_narrow_the_candidate_set() {
    let mut f = setup();
    let lathe = add_asset(&f, "Lathe", f.machinery, "1000");
    add_asset(&f, "Truck", f.vehicles, "5000");

    let req = BatchRequest {
        fiscal_year: 2024,
        category_id: Some(f.machinery),
        ..Default::default()
    };
    let out = run_batch(&mut f.conn, f.owner, &req, DecliningBasis::Reset).unwrap();
    assert_eq!(out.processed, 1);
    assert_eq!(out.error_count(), 0);
    assert_eq!(out.entries[0].asset_id, lathe);

    let unknown = BatchRequest {
        fiscal_year: 2024,
        client_id: Some(9999),
        ..Default::default()
    };
    let err = run_batch(&mut f.conn, f.owner, &unknown, DecliningBasis::Reset).unwrap_err();
    assert!(matches!(err, DepreloError::Validation(_)));
}

#[test]
fn inactive_assets_are_not_candidates() {
    let mut f = setup();
    add_asset(&f, "Lathe", f.machinery, "1000");
    let press = add_asset(&f, "Press", f.machinery, "2000");
    OwnerStore::new(&f.conn, f.owner)
        .deactivate_asset(press)
        .unwrap();

    let out = run_batch(
        &mut f.conn,
        f.owner,
        &request(2024, BatchMode::Automatic),
        DecliningBasis::Reset,
    )
    .unwrap();
    assert_eq!(out.processed, 1);
    assert!(out.entries.iter().all(|e| e.asset_id != press));
}

#[test]
fn chain_basis_opens_from_prior_closing() {
    let mut f = setup();
    let store = OwnerStore::new(&f.conn, f.owner);
    let tools = store.add_category("Tools", None).unwrap();
    store
        .add_parameters(&NewParameterSet {
            category_id: tools,
            fiscal_year: 2024,
            useful_life_years: 5,
            method: DepreciationMethod::Declining,
            residual_percentage: d("0.1"),
            annual_rate: d("0.2"),
            adjustment_coefficient: Decimal::ONE,
        })
        .unwrap();
    let drill = add_asset(&f, "Drill", tools, "1000");

    let y1 = BatchRequest {
        fiscal_year: 2024,
        asset_id: Some(drill),
        ..Default::default()
    };
    let first = run_batch(&mut f.conn, f.owner, &y1, DecliningBasis::Chain).unwrap();
    assert_eq!(first.entries[0].closing_value, d("800"));

    let chained = preview_entry(&f.conn, f.owner, drill, 2025, DecliningBasis::Chain).unwrap();
    assert_eq!(chained.opening_value, d("800"));
    assert_eq!(chained.charge, d("160"));
    assert_eq!(chained.closing_value, d("640"));

    let reset = preview_entry(&f.conn, f.owner, drill, 2025, DecliningBasis::Reset).unwrap();
    assert_eq!(reset.opening_value, d("1000"));
    assert_eq!(reset.charge, d("200"));
}

#[test]
fn cross_owner_category_is_an_integrity_failure() {
    let mut f = setup();
    add_asset(&f, "Lathe", f.machinery, "1000");
    let press = add_asset(&f, "Press", f.machinery, "2000");

    let other = create_owner(&f.conn, "Globex").unwrap();
    let foreign = OwnerStore::new(&f.conn, other)
        .add_category("Machinery", None)
        .unwrap();
    f.conn
        .execute(
            "UPDATE assets SET category_id=?1 WHERE id=?2",
            params![foreign, press],
        )
        .unwrap();

    let out = run_batch(
        &mut f.conn,
        f.owner,
        &request(2024, BatchMode::Automatic),
        DecliningBasis::Reset,
    )
    .unwrap();
    assert_eq!(out.processed, 1);
    assert_eq!(out.error_count(), 1);
    assert_eq!(out.failures[0].asset_id, press);
    assert!(out.failures[0].reason.contains("integrity"));
    assert!(
        !OwnerStore::new(&f.conn, f.owner)
            .entry_exists(press, 2024)
            .unwrap()
    );
}

#[test]
fn unreadable_stored_amount_fails_only_that_asset() {
    let mut f = setup();
    let lathe = add_asset(&f, "Lathe", f.machinery, "1000");
    let press = add_asset(&f, "Press", f.machinery, "2000");
    f.conn
        .execute(
            "UPDATE assets SET acquisition_value='n/a' WHERE id=?1",
            params![press],
        )
        .unwrap();

    let out = run_batch(
        &mut f.conn,
        f.owner,
        &request(2024, BatchMode::Automatic),
        DecliningBasis::Reset,
    )
    .unwrap();
    assert_eq!(out.processed, 1);
    assert_eq!(out.entries[0].asset_id, lathe);
    assert_eq!(out.error_count(), 1);
    assert_eq!(out.failures[0].asset_id, press);
    assert_eq!(out.failures[0].asset_name, "Press");
    assert!(out.failures[0].reason.contains("acquisition value"));
    assert_eq!(year_entries(&f, 2024).len(), 1);
}

#[test]
fn batch_never_touches_other_owners() {
    let mut f = setup();
    add_asset(&f, "Lathe", f.machinery, "1000");

    let other = create_owner(&f.conn, "Globex").unwrap();
    let err = run_batch(
        &mut f.conn,
        other,
        &request(2024, BatchMode::Automatic),
        DecliningBasis::Reset,
    )
    .unwrap_err();
    assert!(matches!(err, DepreloError::Validation(_)));
    assert!(year_entries(&f, 2024).is_empty());
}
