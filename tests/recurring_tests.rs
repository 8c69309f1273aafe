// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeSet;

use chrono::{NaiveDate, TimeZone, Utc};
use moneyboard::error::{ToggleError, ValidationError};
use moneyboard::models::{Frequency, NewClass, NewRecurringTransaction};
use moneyboard::parcels::{ParcelBoard, Transition};
use moneyboard::store::{
    ClassRepository, RecurringRepository, SqliteStore, TransactionRepository, create_type,
};
use moneyboard::{cli, commands::recurring};
use rust_decimal::Decimal;

fn setup(validity: Option<NaiveDate>) -> (SqliteStore, i64) {
    let store = SqliteStore::open_in_memory().unwrap();
    let ty = create_type(&store, 2, "Casa", "#aa0000", None, None).unwrap();
    let class = store
        .insert_class(&NewClass {
            type_id: ty.id,
            name: "Móveis".into(),
        })
        .unwrap();
    let r = store
        .insert_recurring(&NewRecurringTransaction {
            class_id: class.id,
            value: Decimal::from(-250),
            description: "Sofá".into(),
            frequency: Frequency::Monthly,
            created_at: Utc.with_ymd_and_hms(2024, 11, 15, 0, 0, 0).unwrap(),
            validity,
        })
        .unwrap();
    (store, r.id)
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn paying_a_parcel_persists_and_writes_one_ledger_entry() {
    let (store, id) = setup(Some(ymd(2025, 2, 15)));
    let mut board = ParcelBoard::load(&store.list_recurring(false).unwrap());
    let now = Utc.with_ymd_and_hms(2025, 1, 10, 9, 0, 0).unwrap();

    let out = board.toggle(&store, id, 2, now).unwrap();
    assert_eq!(out.transition, Transition::Paid);
    assert_eq!(out.installment.label, "Dezembro/2024");

    let saved = store.get_recurring(id).unwrap().unwrap();
    assert_eq!(saved.paid_parcels, BTreeSet::from([2]));
    let ledger = store.list_transactions(&Default::default()).unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].description, "Sofá (Dezembro/2024)");
    assert_eq!(ledger[0].value, Decimal::from(-250));
    assert_eq!(ledger[0].created_at, now);
}

#[test]
fn unpaying_keeps_the_ledger_entry() {
    let (store, id) = setup(Some(ymd(2025, 2, 15)));
    let mut board = ParcelBoard::load(&store.list_recurring(false).unwrap());
    let now = Utc::now();
    board.toggle(&store, id, 1, now).unwrap();
    let out = board.toggle(&store, id, 1, now).unwrap();
    assert_eq!(out.transition, Transition::Unpaid);
    assert!(out.ledger.is_none());
    assert!(store.get_recurring(id).unwrap().unwrap().paid_parcels.is_empty());
    assert_eq!(store.list_transactions(&Default::default()).unwrap().len(), 1);
}

#[test]
fn rejected_write_restores_the_previous_paid_set() {
    let (store, id) = setup(Some(ymd(2025, 2, 15)));
    let mut board = ParcelBoard::load(&store.list_recurring(false).unwrap());
    board.toggle(&store, id, 1, Utc::now()).unwrap();
    store
        .connection()
        .execute_batch(
            "CREATE TRIGGER lock_parcels BEFORE UPDATE OF paid_parcels ON recurring_transaction
             BEGIN SELECT RAISE(ABORT, 'parcels are locked'); END;",
        )
        .unwrap();

    let err = board.toggle(&store, id, 3, Utc::now()).unwrap_err();
    assert!(matches!(err, ToggleError::Persist(_)));
    assert_eq!(board.paid(id), Some(&BTreeSet::from([1])));
    assert_eq!(
        store.get_recurring(id).unwrap().unwrap().paid_parcels,
        BTreeSet::from([1])
    );
    assert_eq!(store.list_transactions(&Default::default()).unwrap().len(), 1);
}

#[test]
fn parcel_outside_the_plan_is_refused() {
    let (store, id) = setup(Some(ymd(2025, 2, 15)));
    let mut board = ParcelBoard::default();
    let err = board.toggle(&store, id, 5, Utc::now()).unwrap_err();
    assert!(matches!(
        err,
        ToggleError::Invalid(ValidationError::ParcelOutOfRange { number: 5, count: 4 })
    ));
    assert!(store.list_transactions(&Default::default()).unwrap().is_empty());
}

#[test]
fn open_ended_template_has_no_parcels() {
    let (store, id) = setup(None);
    let mut board = ParcelBoard::default();
    let err = board.toggle(&store, id, 1, Utc::now()).unwrap_err();
    assert!(matches!(err, ToggleError::Invalid(ValidationError::NotAPlan)));
    assert_eq!(
        recurring::progress(&store.get_recurring(id).unwrap().unwrap()),
        "-"
    );
}

#[test]
fn toggle_command_marks_paid() {
    let (store, id) = setup(Some(ymd(2025, 2, 15)));
    let id_arg = id.to_string();
    let matches = cli::build_cli().get_matches_from([
        "moneyboard", "recurring", "toggle", "--id", &id_arg, "--parcel", "4",
    ]);
    let (_, rec_m) = matches.subcommand().unwrap();
    recurring::handle(&store, rec_m).unwrap();
    let saved = store.get_recurring(id).unwrap().unwrap();
    assert_eq!(saved.paid_parcels, BTreeSet::from([4]));
    assert_eq!(recurring::progress(&saved), "1/4");
}

#[test]
fn removed_templates_are_hidden_but_kept() {
    let (store, id) = setup(Some(ymd(2025, 2, 15)));
    store.deactivate_recurring(id).unwrap();
    assert!(store.list_recurring(false).unwrap().is_empty());
    let all = store.list_recurring(true).unwrap();
    assert_eq!(all.len(), 1);
    assert!(!all[0].status);
}

#[test]
fn toggling_a_removed_template_is_refused() {
    let (store, id) = setup(Some(ymd(2025, 2, 15)));
    let mut board = ParcelBoard::load(&store.list_recurring(false).unwrap());
    store.deactivate_recurring(id).unwrap();

    let err = board.toggle(&store, id, 1, Utc::now()).unwrap_err();
    assert!(matches!(err, ToggleError::Lookup(_)));
    assert!(store.list_transactions(&Default::default()).unwrap().is_empty());
    assert!(store.get_recurring(id).unwrap().unwrap().paid_parcels.is_empty());
}
