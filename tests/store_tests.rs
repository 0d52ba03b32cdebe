// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use deprelo::commands::doctor;
use deprelo::config::DecliningBasis;
use deprelo::db;
use deprelo::engine::{BatchRequest, run_batch};
use deprelo::error::DepreloError;
use deprelo::models::{AssetStatus, DepreciationMethod, NewAsset, NewParameterSet};
use deprelo::store::{AssetFilter, EntryFilter, OwnerStore, create_owner, list_owners};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn setup() -> (Connection, i64) {
    let conn = db::open_in_memory().unwrap();
    let owner = create_owner(&conn, "Acme").unwrap();
    let store = OwnerStore::new(&conn, owner);
    store.add_category("Machinery", Some("Shop floor")).unwrap();
    store
        .add_client("Northwind", Some("B-123"), Some("ops@northwind.test"))
        .unwrap();
    (conn, owner)
}

fn new_asset(store: &OwnerStore<'_>, name: &str, serial: Option<&str>) -> NewAsset {
    NewAsset {
        name: name.into(),
        category_id: store.category_id("Machinery").unwrap(),
        client_id: store.client_id("Northwind").unwrap(),
        acquisition_value: d("1000"),
        residual_value: d("50"),
        acquisition_date: NaiveDate::from_ymd_opt(2023, 6, 30).unwrap(),
        serial_number: serial.map(str::to_string),
        status: AssetStatus::InUse,
    }
}

#[test]
fn owners_are_unique_by_name() {
    let (conn, _) = setup();
    assert!(create_owner(&conn, " Acme ").is_err());
    create_owner(&conn, "Globex").unwrap();
    assert_eq!(list_owners(&conn).unwrap().len(), 2);
}

#[test]
fn lookups_are_scoped_to_owner() {
    let (conn, owner) = setup();
    let store = OwnerStore::new(&conn, owner);
    let lathe = store.add_asset(&new_asset(&store, "Lathe", None)).unwrap();

    let other = OwnerStore::new(&conn, create_owner(&conn, "Globex").unwrap());
    assert!(matches!(other.asset(lathe), Err(DepreloError::NotFound(_))));
    assert!(other.category_id("Machinery").is_err());
    assert!(other.list_assets(&AssetFilter::default()).unwrap().is_empty());

    // same names are fine under another owner
    other.add_category("Machinery", None).unwrap();
    other.add_client("Northwind", None, None).unwrap();
}

#[test]
fn serial_numbers_are_unique_per_owner() {
    let (conn, owner) = setup();
    let store = OwnerStore::new(&conn, owner);
    store
        .add_asset(&new_asset(&store, "Lathe", Some("SN-1")))
        .unwrap();
    let err = store
        .add_asset(&new_asset(&store, "Lathe 2", Some("SN-1")))
        .unwrap_err();
    assert!(err.to_string().contains("SN-1"));
    // blank serials do not collide
    store.add_asset(&new_asset(&store, "A", Some("  "))).unwrap();
    store.add_asset(&new_asset(&store, "B", None)).unwrap();
}

#[test]
fn asset_validation_rejects_bad_rows() {
    let (conn, owner) = setup();
    let store = OwnerStore::new(&conn, owner);

    let mut negative = new_asset(&store, "Lathe", None);
    negative.acquisition_value = d("-1");
    assert!(store.add_asset(&negative).is_err());

    assert!(store.add_asset(&new_asset(&store, "  ", None)).is_err());

    let mut foreign = new_asset(&store, "Lathe", None);
    foreign.category_id = 9999;
    assert!(matches!(
        store.add_asset(&foreign),
        Err(DepreloError::NotFound(_))
    ));
}

#[test]
fn soft_delete_is_refused_while_assets_reference_it() {
    let (conn, owner) = setup();
    let store = OwnerStore::new(&conn, owner);
    let lathe = store.add_asset(&new_asset(&store, "Lathe", None)).unwrap();
    let category = store.category_id("Machinery").unwrap();
    let client = store.client_id("Northwind").unwrap();

    assert!(store.deactivate_category(category).is_err());
    assert!(store.deactivate_client(client).is_err());

    store.deactivate_asset(lathe).unwrap();
    store.deactivate_category(category).unwrap();
    store.deactivate_client(client).unwrap();

    assert!(store.list_categories(false).unwrap().is_empty());
    assert_eq!(store.list_categories(true).unwrap().len(), 1);
    assert!(store.list_clients(false).unwrap().is_empty());
    // the asset row is still there
    assert!(!store.asset(lathe).unwrap().active);
}

#[test]
fn status_changes_are_persisted() {
    let (conn, owner) = setup();
    let store = OwnerStore::new(&conn, owner);
    let lathe = store.add_asset(&new_asset(&store, "Lathe", None)).unwrap();
    store
        .set_asset_status(lathe, "mantenimiento".parse().unwrap())
        .unwrap();
    assert_eq!(store.asset(lathe).unwrap().status, AssetStatus::Maintenance);

    let listed = store
        .list_assets(&AssetFilter {
            status: Some(AssetStatus::Maintenance),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert!("scrapped".parse::<AssetStatus>().is_err());
}

fn posted_entry(conn: &mut Connection, owner: i64) -> i64 {
    let store = OwnerStore::new(conn, owner);
    let category_id = store.category_id("Machinery").unwrap();
    store
        .add_parameters(&NewParameterSet {
            category_id,
            fiscal_year: 2024,
            useful_life_years: 5,
            method: DepreciationMethod::Linear,
            residual_percentage: d("0.1"),
            annual_rate: Decimal::ZERO,
            adjustment_coefficient: Decimal::ONE,
        })
        .unwrap();
    store.add_asset(&new_asset(&store, "Lathe", None)).unwrap();
    let out = run_batch(
        conn,
        owner,
        &BatchRequest {
            fiscal_year: 2024,
            ..Default::default()
        },
        DecliningBasis::Reset,
    )
    .unwrap();
    out.entries[0].id
}

#[test]
fn adjust_entry_marks_manual_and_keeps_balance() {
    let (mut conn, owner) = setup();
    let id = posted_entry(&mut conn, owner);
    let store = OwnerStore::new(&conn, owner);

    let adjusted = store.adjust_entry(id, d("150"), Some("partial year")).unwrap();
    assert!(!adjusted.automatic);
    assert_eq!(adjusted.charge, d("150"));
    assert_eq!(adjusted.closing_value, d("850"));
    assert_eq!(adjusted.notes.as_deref(), Some("partial year"));

    // floor is 100 on a 1000 opening
    assert!(store.adjust_entry(id, d("950"), None).is_err());
    assert!(store.adjust_entry(id, d("-1"), None).is_err());
    assert_eq!(store.entry(id).unwrap().charge, d("150"));
}

#[test]
fn adjust_entry_accepts_entry_opened_under_its_floor() {
    let (mut conn, owner) = setup();
    {
        let store = OwnerStore::new(&conn, owner);
        let category_id = store.category_id("Machinery").unwrap();
        for (year, residual) in [(2024, "0.1"), (2025, "0.5")] {
            store
                .add_parameters(&NewParameterSet {
                    category_id,
                    fiscal_year: year,
                    useful_life_years: 5,
                    method: DepreciationMethod::Declining,
                    residual_percentage: d(residual),
                    annual_rate: d("0.9"),
                    adjustment_coefficient: Decimal::ONE,
                })
                .unwrap();
        }
        store.add_asset(&new_asset(&store, "Lathe", None)).unwrap();
    }
    for year in [2024, 2025] {
        run_batch(
            &mut conn,
            owner,
            &BatchRequest {
                fiscal_year: year,
                ..Default::default()
            },
            DecliningBasis::Chain,
        )
        .unwrap();
    }

    let store = OwnerStore::new(&conn, owner);
    let entry = store
        .list_entries(&EntryFilter {
            fiscal_year: Some(2025),
            ..Default::default()
        })
        .unwrap()
        .remove(0);
    assert_eq!(entry.opening_value, d("100"));
    assert_eq!(entry.charge, Decimal::ZERO);
    assert_eq!(entry.diagnostics.fiscal_residual, d("500"));

    let adjusted = store
        .adjust_entry(entry.id, Decimal::ZERO, Some("reviewed"))
        .unwrap();
    assert_eq!(adjusted.closing_value, d("100"));
    assert_eq!(adjusted.notes.as_deref(), Some("reviewed"));
    assert!(store.adjust_entry(entry.id, d("1"), None).is_err());
}

#[test]
fn entries_survive_json_diagnostics_round_trip() {
    let (mut conn, owner) = setup();
    let id = posted_entry(&mut conn, owner);
    let entry = OwnerStore::new(&conn, owner).entry(id).unwrap();
    assert_eq!(entry.diagnostics.fiscal_residual, d("100"));
    assert_eq!(entry.diagnostics.useful_life_years, 5);
    assert_eq!(entry.method, DepreciationMethod::Linear);
}

#[test]
fn doctor_is_quiet_on_clean_data() {
    let (mut conn, owner) = setup();
    posted_entry(&mut conn, owner);
    let rows = doctor::findings(&OwnerStore::new(&conn, owner)).unwrap();
    assert!(rows.is_empty(), "unexpected findings: {:?}", rows);
}

#[test]
fn doctor_flags_broken_rows() {
    let (mut conn, owner) = setup();
    let id = posted_entry(&mut conn, owner);
    let store = OwnerStore::new(&conn, owner);
    store.add_category("Vehicles", None).unwrap();
    conn.execute(
        "UPDATE depreciation_entries SET charge='1' WHERE id=?1",
        params![id],
    )
    .unwrap();

    let rows = doctor::findings(&OwnerStore::new(&conn, owner)).unwrap();
    let kinds: Vec<&str> = rows.iter().map(|(k, _)| k.as_str()).collect();
    assert!(kinds.contains(&"unbalanced_entry"));
    assert!(kinds.contains(&"category_without_parameters"));
}
