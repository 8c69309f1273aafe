// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{TimeZone, Utc};
use moneyboard::models::{NewClass, NewTransaction, TransactionPatch};
use moneyboard::store::{
    ClassRepository, SqliteStore, TransactionRepository, TypeRepository, create_type,
};
use moneyboard::{cli, commands::transactions};
use rust_decimal::Decimal;
use std::str::FromStr;

fn setup() -> (SqliteStore, i64) {
    let store = SqliteStore::open_in_memory().unwrap();
    let ty = create_type(&store, 2, "Casa", "#aa0000", None, None).unwrap();
    let class = store
        .insert_class(&NewClass {
            type_id: ty.id,
            name: "Aluguel".into(),
        })
        .unwrap();
    for (m, d) in [(1, 3), (1, 20), (2, 1)] {
        store
            .insert_transaction(&NewTransaction {
                class_id: class.id,
                value: Decimal::from(-10),
                description: format!("rent {}-{}", m, d),
                created_at: Utc.with_ymd_and_hms(2025, m, d, 8, 0, 0).unwrap(),
            })
            .unwrap();
    }
    (store, class.id)
}

fn list_matches(args: &[&str]) -> clap::ArgMatches {
    let mut argv = vec!["moneyboard", "tx", "list"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    let (_, tx_m) = matches.subcommand().unwrap();
    let (_, list_m) = tx_m.subcommand().unwrap();
    list_m.clone()
}

#[test]
fn list_limit_respected_newest_first() {
    let (store, _) = setup();
    let rows = transactions::query_rows(&store, &list_matches(&["--limit", "2"]))
        .unwrap()
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].description, "rent 2-1");
    assert_eq!(rows[1].description, "rent 1-20");
}

#[test]
fn list_offset_pages_through() {
    let (store, _) = setup();
    let rows = transactions::query_rows(&store, &list_matches(&["--limit", "2", "--offset", "2"]))
        .unwrap()
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].description, "rent 1-3");
}

#[test]
fn month_filter_keeps_only_that_month() {
    let (store, _) = setup();
    let rows = transactions::query_rows(&store, &list_matches(&["--month", "2025-01"]))
        .unwrap()
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|t| t.description.starts_with("rent 1-")));
}

#[test]
fn bad_month_is_rejected() {
    let (store, _) = setup();
    assert!(transactions::query_rows(&store, &list_matches(&["--month", "2025-13"])).is_err());
}

#[test]
fn edit_changes_only_given_fields() {
    let (store, class_id) = setup();
    let first = store
        .list_transactions(&Default::default())
        .unwrap()
        .pop()
        .unwrap();
    let patch = TransactionPatch {
        value: Some(Decimal::from_str("-12.34").unwrap()),
        ..TransactionPatch::default()
    };
    let updated = store.update_transaction(first.id, &patch).unwrap();
    assert_eq!(updated.value, Decimal::from_str("-12.34").unwrap());
    assert_eq!(updated.description, first.description);
    assert_eq!(updated.class_id, class_id);
    assert_eq!(updated.created_at, first.created_at);
}

#[test]
fn add_without_description_is_refused() {
    let (store, class_id) = setup();
    let class = class_id.to_string();
    let matches = cli::build_cli().get_matches_from([
        "moneyboard", "tx", "add", "--class", &class, "--value", "-5",
    ]);
    let (_, tx_m) = matches.subcommand().unwrap();
    let err = transactions::handle(&store, tx_m).unwrap_err();
    assert!(err.to_string().contains("description"));
    assert_eq!(store.list_transactions(&Default::default()).unwrap().len(), 3);
}

#[test]
fn types_append_after_the_last_order() {
    let store = SqliteStore::open_in_memory().unwrap();
    let first = create_type(&store, 1, "Salário", "#00aa00", None, None).unwrap();
    assert_eq!(first.order, 1);
    create_type(&store, 2, "Lazer", "#0000aa", None, Some(7)).unwrap();
    let next = create_type(&store, 2, "Mercado", "#aaaa00", Some("cart".into()), None).unwrap();
    assert_eq!(next.order, 8);
    let names: Vec<String> = store.list_types().unwrap().into_iter().map(|t| t.name).collect();
    assert_eq!(names, ["Salário", "Lazer", "Mercado"]);
}
