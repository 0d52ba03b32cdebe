// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print as JSON lines"),
    )
}

fn required(id: &'static str, help: &'static str) -> Arg {
    Arg::new(id).long(id).required(true).help(help)
}

fn optional(id: &'static str, help: &'static str) -> Arg {
    Arg::new(id).long(id).help(help)
}

fn year_arg(required: bool) -> Arg {
    Arg::new("year")
        .long("year")
        .required(required)
        .value_parser(value_parser!(i32))
        .help("Fiscal year")
}

fn id_arg(id: &'static str, help: &'static str) -> Arg {
    Arg::new(id)
        .long(id)
        .required(true)
        .value_parser(value_parser!(i64))
        .help(help)
}

fn all_flag() -> Arg {
    Arg::new("all")
        .long("all")
        .action(ArgAction::SetTrue)
        .help("Include soft-deleted rows")
}

pub fn build_cli() -> Command {
    Command::new("deprelo")
        .about("Fixed-asset depreciation: parameters, batch calculation and reports")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("owner")
                .long("owner")
                .global(true)
                .env("DEPRELO_OWNER")
                .value_parser(value_parser!(i64))
                .help("Owner (tenant) id every command is scoped to"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Debug logging (DEPRELO_LOG overrides)"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("config")
                .about("Persistent settings")
                .subcommand(Command::new("show"))
                .subcommand(
                    Command::new("set")
                        .arg(required("key", "default_owner | declining_basis"))
                        .arg(required("value", "New value")),
                ),
        )
        .subcommand(
            Command::new("owner")
                .about("Tenants")
                .subcommand(Command::new("add").arg(required("name", "Owner name")))
                .subcommand(Command::new("list")),
        )
        .subcommand(
            Command::new("client")
                .about("Clients owning assets")
                .subcommand(
                    Command::new("add")
                        .arg(required("name", "Client name"))
                        .arg(optional("tax_id", "Tax identifier").long("tax-id"))
                        .arg(optional("email", "Contact email")),
                )
                .subcommand(json_flags(Command::new("list").arg(all_flag())))
                .subcommand(Command::new("rm").arg(required("name", "Client name"))),
        )
        .subcommand(
            Command::new("category")
                .about("Asset categories")
                .subcommand(
                    Command::new("add")
                        .arg(required("name", "Category name"))
                        .arg(optional("description", "Free text")),
                )
                .subcommand(json_flags(Command::new("list").arg(all_flag())))
                .subcommand(Command::new("rm").arg(required("name", "Category name"))),
        )
        .subcommand(
            Command::new("asset")
                .about("Fixed assets")
                .subcommand(
                    Command::new("add")
                        .arg(required("name", "Display name"))
                        .arg(required("category", "Category name"))
                        .arg(required("client", "Client name"))
                        .arg(required("value", "Acquisition value"))
                        .arg(optional("residual", "Residual value (informational)"))
                        .arg(required("date", "Acquisition date YYYY-MM-DD"))
                        .arg(optional("serial", "Serial number, unique per owner"))
                        .arg(optional(
                            "status",
                            "in_use | maintenance | out_of_service | sold | retired",
                        )),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(optional("category", "Category name"))
                        .arg(optional("client", "Client name"))
                        .arg(optional("status", "Lifecycle status"))
                        .arg(all_flag()),
                ))
                .subcommand(
                    Command::new("status")
                        .arg(id_arg("id", "Asset id"))
                        .arg(required("status", "New lifecycle status")),
                )
                .subcommand(Command::new("rm").arg(id_arg("id", "Asset id"))),
        )
        .subcommand(
            Command::new("params")
                .about("Fiscal parameter sets per category and year")
                .subcommand(
                    Command::new("add")
                        .arg(required("category", "Category name"))
                        .arg(year_arg(true))
                        .arg(
                            required("life", "Useful life in years")
                                .value_parser(value_parser!(i32)),
                        )
                        .arg(required("method", "linear | declining | accelerated"))
                        .arg(required("residual", "Residual fraction of acquisition value"))
                        .arg(optional("rate", "Annual rate fraction (non-linear methods)"))
                        .arg(optional("coefficient", "Adjustment coefficient (default 1)")),
                )
                .subcommand(
                    Command::new("update")
                        .arg(id_arg("id", "Parameter set id"))
                        .arg(optional("life", "Useful life in years").value_parser(value_parser!(i32)))
                        .arg(optional("method", "linear | declining | accelerated"))
                        .arg(optional("residual", "Residual fraction"))
                        .arg(optional("rate", "Annual rate fraction"))
                        .arg(optional("coefficient", "Adjustment coefficient")),
                )
                .subcommand(Command::new("rm").arg(id_arg("id", "Parameter set id")))
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(year_arg(false))
                        .arg(optional("category", "Category name"))
                        .arg(all_flag()),
                ))
                .subcommand(json_flags(
                    Command::new("resolve")
                        .arg(required("category", "Category name"))
                        .arg(year_arg(true)),
                ))
                .subcommand(
                    Command::new("copy-year")
                        .arg(
                            required("from", "Source fiscal year")
                                .value_parser(value_parser!(i32)),
                        )
                        .arg(
                            required("to", "Destination fiscal year")
                                .value_parser(value_parser!(i32)),
                        )
                        .arg(optional("factor", "Multiplier for adjustment coefficients (default 1)")),
                ),
        )
        .subcommand(
            Command::new("depreciation")
                .about("Calculate and review depreciation entries")
                .subcommand(json_flags(
                    Command::new("calculate")
                        .arg(year_arg(true))
                        .arg(optional("month", "Posting month 1-12 (default 12)").value_parser(value_parser!(u32)))
                        .arg(optional("asset", "Asset id").value_parser(value_parser!(i64)))
                        .arg(optional("client", "Client name"))
                        .arg(optional("category", "Category name"))
                        .arg(
                            optional("mode", "automatic | recalculate")
                                .default_value("automatic"),
                        ),
                ))
                .subcommand(json_flags(
                    Command::new("preview")
                        .arg(id_arg("asset", "Asset id"))
                        .arg(year_arg(true)),
                ))
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(year_arg(false))
                        .arg(optional("asset", "Asset id").value_parser(value_parser!(i64)))
                        .arg(optional("client", "Client name"))
                        .arg(optional("category", "Category name")),
                ))
                .subcommand(
                    Command::new("adjust")
                        .arg(id_arg("id", "Entry id"))
                        .arg(required("charge", "Replacement charge"))
                        .arg(optional("notes", "Reason for the adjustment")),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Dashboards over posted entries")
                .subcommand(json_flags(Command::new("dashboard").arg(year_arg(true))))
                .subcommand(json_flags(Command::new("by-category").arg(year_arg(true))))
                .subcommand(json_flags(Command::new("by-client").arg(year_arg(true))))
                .subcommand(json_flags(Command::new("by-method").arg(year_arg(true))))
                .subcommand(json_flags(Command::new("by-month").arg(year_arg(true))))
                .subcommand(json_flags(
                    Command::new("nearing-end")
                        .arg(optional("today", "Reference date YYYY-MM-DD (default today)"))
                        .arg(
                            optional("months", "Horizon in months")
                                .value_parser(value_parser!(u32))
                                .default_value("12"),
                        ),
                ))
                .subcommand(json_flags(Command::new("unposted").arg(year_arg(false)))),
        )
        .subcommand(
            Command::new("export").about("Write entries to a file").subcommand(
                Command::new("entries")
                    .arg(required("format", "csv | json"))
                    .arg(required("out", "Output path"))
                    .arg(year_arg(false))
                    .arg(optional("client", "Client name"))
                    .arg(optional("category", "Category name")),
            ),
        )
        .subcommand(
            Command::new("import")
                .about("Load assets from CSV")
                .subcommand(Command::new("assets").arg(required("path", "CSV file"))),
        )
        .subcommand(Command::new("doctor").about("Integrity checks"))
}
