// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Grouping and totals over one loaded page of rows. Always a full
//! recomputation; results come back in key order regardless of input order.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{InvestmentMovement, Transaction};

pub fn group_sum<T, K, F, G>(items: &[T], key: F, value: G) -> BTreeMap<K, Decimal>
where
    K: Ord,
    F: Fn(&T) -> K,
    G: Fn(&T) -> Decimal,
{
    let mut out = BTreeMap::new();
    for item in items {
        *out.entry(key(item)).or_insert(Decimal::ZERO) += value(item);
    }
    out
}

pub fn month_key(d: NaiveDate) -> String {
    format!("{:04}-{:02}", d.year(), d.month())
}

pub fn sum_by_month(txs: &[Transaction]) -> BTreeMap<String, Decimal> {
    group_sum(txs, |t| month_key(t.created_at.date_naive()), |t| t.value)
}

pub fn sum_by_class(txs: &[Transaction]) -> BTreeMap<i64, Decimal> {
    group_sum(txs, |t| t.class_id, |t| t.value)
}

/// Net invested value per investment type, withdrawals counted negative.
pub fn sum_by_investment_type(movements: &[InvestmentMovement]) -> BTreeMap<i64, Decimal> {
    group_sum(
        movements,
        |m| m.investment_type_id,
        |m| m.value * m.nature.sign(),
    )
}

/// Share of the total per key, in percent with two decimals. A zero total
/// gives every key 0.
pub fn percentages<K: Ord + Clone>(sums: &BTreeMap<K, Decimal>) -> BTreeMap<K, Decimal> {
    let total: Decimal = sums.values().copied().sum();
    sums.iter()
        .map(|(k, v)| {
            let pct = if total.is_zero() {
                Decimal::ZERO
            } else {
                (*v / total * Decimal::ONE_HUNDRED).round_dp(2)
            };
            (k.clone(), pct)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share {
    pub id: i64,
    pub name: String,
    pub value: Decimal,
    pub percent: Decimal,
}

/// Totals with their share of the whole, labelled through `name`. Keys with
/// no known name show as `#id`.
pub fn shares<F>(sums: &BTreeMap<i64, Decimal>, name: F) -> Vec<Share>
where
    F: Fn(i64) -> Option<String>,
{
    let pct = percentages(sums);
    sums.iter()
        .map(|(id, value)| Share {
            id: *id,
            name: name(*id).unwrap_or_else(|| format!("#{}", id)),
            value: *value,
            percent: pct[id],
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalancePoint {
    pub movement_id: i64,
    pub date: NaiveDate,
    pub delta: Decimal,
    pub balance: Decimal,
}

/// Cumulative invested balance after each movement, oldest first.
pub fn running_balance(movements: &[InvestmentMovement]) -> Vec<BalancePoint> {
    let mut sorted: Vec<&InvestmentMovement> = movements.iter().collect();
    sorted.sort_by_key(|m| (m.date, m.id));
    let mut balance = Decimal::ZERO;
    sorted
        .into_iter()
        .map(|m| {
            let delta = m.value * m.nature.sign();
            balance += delta;
            BalancePoint {
                movement_id: m.id,
                date: m.date,
                delta,
                balance,
            }
        })
        .collect()
}

/// Balance after every movement dated on or before `at`.
pub fn balance_at(movements: &[InvestmentMovement], at: NaiveDate) -> Decimal {
    movements
        .iter()
        .filter(|m| m.date <= at)
        .map(|m| m.value * m.nature.sign())
        .sum()
}
