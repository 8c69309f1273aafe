// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_args(cmd: Command) -> Command {
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
            .help("Print one JSON object per line"),
    )
}

fn page_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("limit")
            .long("limit")
            .value_parser(value_parser!(usize))
            .help("Rows per page"),
    )
    .arg(
        Arg::new("offset")
            .long("offset")
            .value_parser(value_parser!(usize))
            .help("Rows to skip"),
    )
}

fn id_arg(help: &'static str) -> Arg {
    Arg::new("id")
        .long("id")
        .required(true)
        .value_parser(value_parser!(i64))
        .help(help)
}

fn text(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help)
}

pub fn build_cli() -> Command {
    Command::new("moneyboard")
        .about("Personal finance, recurring bills, investments and movie watch-list")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand(Command::new("init").about("Create the local database and config dirs"))
        .subcommand(
            Command::new("login")
                .about("Sign in (hosted backend) or set the local user")
                .arg(text("email", "Account e-mail").required(true))
                .arg(text("password", "Account password")),
        )
        .subcommand(Command::new("logout").about("Sign out and forget the session"))
        .subcommand(Command::new("whoami").about("Show the signed-in user"))
        .subcommand(
            Command::new("theme")
                .about("Display theme")
                .subcommand(
                    Command::new("set").arg(
                        Arg::new("theme")
                            .required(true)
                            .value_parser(["light", "dark"]),
                    ),
                )
                .subcommand(Command::new("show")),
        )
        .subcommand(
            Command::new("config")
                .about("Configuration")
                .subcommand(Command::new("show").about("Effective config, secrets masked"))
                .subcommand(Command::new("path").about("Where config.toml is read from")),
        )
        .subcommand(
            Command::new("nature")
                .about("Income/expense natures")
                .subcommand(json_args(Command::new("list"))),
        )
        .subcommand(
            Command::new("type")
                .about("Types under a nature")
                .subcommand(
                    Command::new("add")
                        .arg(
                            Arg::new("nature")
                                .long("nature")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(text("name", "Type name").required(true))
                        .arg(text("color", "Display color, #RRGGBB").required(true))
                        .arg(text("icon", "Icon name"))
                        .arg(
                            Arg::new("order")
                                .long("order")
                                .value_parser(value_parser!(i64))
                                .help("Sort position; appended last when omitted"),
                        ),
                )
                .subcommand(json_args(Command::new("list")))
                .subcommand(Command::new("rm").arg(id_arg("Type id"))),
        )
        .subcommand(
            Command::new("class")
                .about("Classes under a type")
                .subcommand(
                    Command::new("add")
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(text("name", "Class name").required(true)),
                )
                .subcommand(json_args(Command::new("list").arg(
                    Arg::new("type").long("type").value_parser(value_parser!(i64)),
                )))
                .subcommand(Command::new("rm").arg(id_arg("Class id"))),
        )
        .subcommand(
            Command::new("tx")
                .about("Ledger transactions")
                .subcommand(
                    Command::new("add")
                        .arg(
                            Arg::new("class")
                                .long("class")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(text("value", "Signed amount").required(true).allow_hyphen_values(true))
                        .arg(text("description", "What it was"))
                        .arg(text("date", "YYYY-MM-DD, defaults to now")),
                )
                .subcommand(json_args(page_args(
                    Command::new("list")
                        .arg(Arg::new("class").long("class").value_parser(value_parser!(i64)))
                        .arg(text("month", "YYYY-MM")),
                )))
                .subcommand(
                    Command::new("edit")
                        .arg(id_arg("Transaction id"))
                        .arg(Arg::new("class").long("class").value_parser(value_parser!(i64)))
                        .arg(text("value", "Signed amount").allow_hyphen_values(true))
                        .arg(text("description", "What it was"))
                        .arg(text("date", "YYYY-MM-DD")),
                )
                .subcommand(Command::new("rm").arg(id_arg("Transaction id"))),
        )
        .subcommand(
            Command::new("recurring")
                .about("Recurring bills and installment plans")
                .subcommand(
                    Command::new("add")
                        .arg(
                            Arg::new("class")
                                .long("class")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(text("value", "Signed amount per occurrence").required(true).allow_hyphen_values(true))
                        .arg(text("description", "What it is"))
                        .arg(
                            Arg::new("frequency")
                                .long("frequency")
                                .default_value("monthly")
                                .value_parser(["daily", "weekly", "monthly", "yearly"]),
                        )
                        .arg(text("start", "YYYY-MM-DD, defaults to today"))
                        .arg(text("until", "Last installment date, YYYY-MM-DD")),
                )
                .subcommand(json_args(Command::new("list").arg(
                    Arg::new("all")
                        .long("all")
                        .action(ArgAction::SetTrue)
                        .help("Include removed templates"),
                )))
                .subcommand(json_args(
                    Command::new("installments").arg(id_arg("Recurring id")),
                ))
                .subcommand(
                    Command::new("toggle")
                        .about("Mark an installment paid, or unpaid again")
                        .arg(id_arg("Recurring id"))
                        .arg(
                            Arg::new("parcel")
                                .long("parcel")
                                .required(true)
                                .value_parser(value_parser!(u32)),
                        ),
                )
                .subcommand(Command::new("rm").arg(id_arg("Recurring id"))),
        )
        .subcommand(
            Command::new("movie")
                .about("Movie watch-list")
                .subcommand(json_args(
                    Command::new("search").arg(Arg::new("title").required(true)),
                ))
                .subcommand(json_args(
                    Command::new("lookup").arg(Arg::new("id").required(true)),
                ))
                .subcommand(Command::new("add").arg(Arg::new("id").required(true)))
                .subcommand(json_args(page_args(Command::new("list").arg(
                    Arg::new("status")
                        .long("status")
                        .value_parser(["to-watch", "watched"]),
                ))))
                .subcommand(
                    Command::new("watch")
                        .arg(Arg::new("id").required(true))
                        .arg(text("date", "YYYY-MM-DD, defaults to today")),
                )
                .subcommand(
                    Command::new("rate")
                        .arg(Arg::new("id").required(true))
                        .arg(
                            Arg::new("rating")
                                .required(true)
                                .value_parser(value_parser!(u8)),
                        ),
                )
                .subcommand(Command::new("rm").arg(Arg::new("id").required(true))),
        )
        .subcommand(
            Command::new("invest")
                .about("Investment movements and rentability")
                .subcommand(
                    Command::new("type-add")
                        .arg(text("name", "Investment type").required(true))
                        .arg(text("color", "#RRGGBB").required(true)),
                )
                .subcommand(json_args(Command::new("types")))
                .subcommand(
                    Command::new("broker-add").arg(text("name", "Broker name").required(true)),
                )
                .subcommand(json_args(Command::new("brokers")))
                .subcommand(
                    Command::new("add")
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(Arg::new("broker").long("broker").value_parser(value_parser!(i64)))
                        .arg(
                            Arg::new("nature")
                                .long("nature")
                                .required(true)
                                .value_parser(["contribution", "withdrawal", "yield"]),
                        )
                        .arg(text("value", "Amount, always positive").required(true))
                        .arg(text("date", "YYYY-MM-DD, defaults to today"))
                        .arg(text("description", "Note")),
                )
                .subcommand(json_args(page_args(Command::new("list").arg(
                    Arg::new("type").long("type").value_parser(value_parser!(i64)),
                ))))
                .subcommand(Command::new("rm").arg(id_arg("Movement id")))
                .subcommand(json_args(Command::new("summary")))
                .subcommand(json_args(
                    Command::new("rentability")
                        .arg(text("from", "YYYY-MM-DD").required(true))
                        .arg(text("to", "YYYY-MM-DD, defaults to today"))
                        .arg(Arg::new("type").long("type").value_parser(value_parser!(i64))),
                )),
        )
        .subcommand(
            Command::new("report")
                .about("Totals and shares")
                .subcommand(json_args(Command::new("by-month").arg(
                    Arg::new("year").long("year").value_parser(value_parser!(i32)),
                )))
                .subcommand(json_args(
                    Command::new("by-class").arg(text("month", "YYYY-MM")),
                ))
                .subcommand(json_args(Command::new("by-nature").arg(
                    Arg::new("year").long("year").value_parser(value_parser!(i32)),
                ))),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand(
                    Command::new("transactions")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("csv")
                                .value_parser(["csv", "json"]),
                        )
                        .arg(text("out", "Output file").required(true))
                        .arg(text("month", "YYYY-MM")),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn negative_values_parse() {
        let m = build_cli()
            .try_get_matches_from(["moneyboard", "tx", "add", "--class", "3", "--value", "-12.50"])
            .unwrap();
        let (_, tx) = m.subcommand().unwrap();
        let (_, add) = tx.subcommand().unwrap();
        assert_eq!(add.get_one::<String>("value").unwrap(), "-12.50");
        assert_eq!(add.get_one::<i64>("class"), Some(&3));
    }
}
