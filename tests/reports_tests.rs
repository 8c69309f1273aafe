// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{TimeZone, Utc};
use moneyboard::commands::reports;
use moneyboard::models::{NewClass, NewTransaction};
use moneyboard::store::{
    ClassRepository, ReportRepository, SqliteStore, TransactionRepository, create_type,
};
use rust_decimal::Decimal;
use std::str::FromStr;

fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Salary under Receita, groceries and rent under Despesa, across two
/// years.
fn seeded() -> SqliteStore {
    let store = SqliteStore::open_in_memory().unwrap();
    let income = create_type(&store, 1, "Trabalho", "#00aa00", None, None).unwrap();
    let home = create_type(&store, 2, "Casa", "#aa0000", None, None).unwrap();
    let salary = store
        .insert_class(&NewClass { type_id: income.id, name: "Salário".into() })
        .unwrap();
    let food = store
        .insert_class(&NewClass { type_id: home.id, name: "Mercado".into() })
        .unwrap();
    let rent = store
        .insert_class(&NewClass { type_id: home.id, name: "Aluguel".into() })
        .unwrap();
    let rows = [
        (salary.id, "5000", 2024, 12, 5),
        (salary.id, "5000", 2025, 1, 5),
        (food.id, "-300.10", 2025, 1, 7),
        (food.id, "-99.90", 2025, 1, 21),
        (rent.id, "-1600", 2025, 1, 10),
        (rent.id, "-1600", 2025, 2, 10),
    ];
    for (class_id, value, y, m, day) in rows {
        store
            .insert_transaction(&NewTransaction {
                class_id,
                value: d(value),
                description: "seed".into(),
                created_at: Utc.with_ymd_and_hms(y, m, day, 12, 0, 0).unwrap(),
            })
            .unwrap();
    }
    store
}

#[test]
fn value_by_nature_month_sums_in_decimal() {
    let store = seeded();
    let rows = store.value_by_nature_month(Some(2025)).unwrap();
    let jan_expense = rows
        .iter()
        .find(|r| r.nature == "Despesa" && r.month == 1)
        .unwrap();
    assert_eq!(jan_expense.value, d("-2000.00"));
    assert_eq!(jan_expense.year, 2025);
    assert!(rows.iter().all(|r| r.year == 2025));
    assert_eq!(rows.len(), 3);
}

#[test]
fn value_by_nature_month_without_year_spans_all() {
    let store = seeded();
    let rows = store.value_by_nature_month(None).unwrap();
    assert!(rows.iter().any(|r| r.year == 2024 && r.nature == "Receita"));
    assert_eq!(rows.len(), 4);
}

#[test]
fn class_shares_for_one_month() {
    let store = seeded();
    let shares = reports::class_shares(&store, Some((2025, 1))).unwrap();
    let names: Vec<&str> = shares.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Salário", "Mercado", "Aluguel"]);
    let food = shares.iter().find(|s| s.name == "Mercado").unwrap();
    assert_eq!(food.value, d("-400.00"));
    assert_eq!(food.percent, d("-13.33"));
}

#[test]
fn nature_shares_add_up_months() {
    let store = seeded();
    let rows = store.value_by_nature_month(Some(2025)).unwrap();
    let shares = reports::nature_shares(&rows);
    assert_eq!(shares.len(), 2);
    assert_eq!(shares[0].name, "Receita");
    assert_eq!(shares[0].value, d("5000"));
    assert_eq!(shares[1].name, "Despesa");
    assert_eq!(shares[1].value, d("-3600.00"));
}
