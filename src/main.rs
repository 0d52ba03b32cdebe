// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use deprelo::{cli, commands, config, db, logging};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();
    logging::init(matches.get_flag("verbose"));

    let mut conn = db::open_or_init()?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path()?.display());
        }
        Some(("config", sub)) => commands::settings::handle(&conn, sub)?,
        Some(("owner", sub)) => commands::owners::handle(&conn, sub)?,
        Some((name, sub)) => {
            let owner = config::resolve_owner(&conn, &matches)?;
            match name {
                "client" => commands::clients::handle(&conn, owner, sub)?,
                "category" => commands::categories::handle(&conn, owner, sub)?,
                "asset" => commands::assets::handle(&conn, owner, sub)?,
                "params" => commands::parameters::handle(&mut conn, owner, sub)?,
                "depreciation" => commands::depreciation::handle(&mut conn, owner, sub)?,
                "report" => commands::reports::handle(&conn, owner, sub)?,
                "export" => commands::exporter::handle(&conn, owner, sub)?,
                "import" => commands::importer::handle(&mut conn, owner, sub)?,
                "doctor" => commands::doctor::handle(&conn, owner)?,
                _ => {
                    cli::build_cli().print_help()?;
                    println!();
                }
            }
        }
        None => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
