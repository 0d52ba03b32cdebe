// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use deprelo::db;
use deprelo::models::AssetStatus;
use deprelo::store::{AssetFilter, OwnerStore, create_owner};
use deprelo::{cli, commands::importer};
use rusqlite::Connection;
use std::io::Write;
use tempfile::NamedTempFile;

fn base_conn() -> (Connection, i64) {
    let conn = db::open_in_memory().unwrap();
    let owner = create_owner(&conn, "Acme").unwrap();
    let store = OwnerStore::new(&conn, owner);
    store.add_category("Machinery", None).unwrap();
    store.add_client("Northwind", None, None).unwrap();
    (conn, owner)
}

fn csv_file(body: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", body).unwrap();
    file.flush().unwrap();
    file
}

const HEADER: &str =
    "name,category,client,acquisition_value,acquisition_date,residual_value,serial_number,status\n";

#[test]
fn importer_trims_cli_path_argument() {
    let (mut conn, owner) = base_conn();
    let file = csv_file(&format!(
        "{HEADER}Lathe,Machinery,Northwind,1000,2024-01-15,,SN-1,\n\
         Press, Machinery ,Northwind,2500.50,2024-02-01,100,,mantenimiento\n"
    ));

    let path = file.path().to_str().unwrap().to_string();
    let padded = format!("  {}  ", path);
    let matches =
        cli::build_cli().get_matches_from(["deprelo", "import", "assets", "--path", &padded]);
    let (_, sub) = matches.subcommand().unwrap();
    importer::handle(&mut conn, owner, sub).unwrap();

    let assets = OwnerStore::new(&conn, owner)
        .list_assets(&AssetFilter::default())
        .unwrap();
    assert_eq!(assets.len(), 2);
    assert_eq!(assets[0].serial_number.as_deref(), Some("SN-1"));
    assert_eq!(assets[0].status, AssetStatus::InUse);
    assert_eq!(assets[1].acquisition_value, "2500.50".parse().unwrap());
    assert_eq!(assets[1].status, AssetStatus::Maintenance);
}

#[test]
fn importer_rolls_back_on_bad_row() {
    let (mut conn, owner) = base_conn();
    let file = csv_file(&format!(
        "{HEADER}Lathe,Machinery,Northwind,1000,2024-01-15,,,\n\
         Ghost,Nope,Northwind,10,2024-01-15,,,\n"
    ));

    let err = importer::import_assets(&mut conn, owner, file.path().to_str().unwrap())
        .unwrap_err();
    assert!(format!("{:#}", err).contains("row 3"));
    assert!(
        OwnerStore::new(&conn, owner)
            .list_assets(&AssetFilter::default())
            .unwrap()
            .is_empty()
    );
}

#[test]
fn importer_rejects_bad_date() {
    let (mut conn, owner) = base_conn();
    let file = csv_file(&format!(
        "{HEADER}Lathe,Machinery,Northwind,1000,15/01/2024,,,\n"
    ));
    assert!(importer::import_assets(&mut conn, owner, file.path().to_str().unwrap()).is_err());
}
