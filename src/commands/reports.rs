// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;

use super::json_flags;
use crate::aggregate::{Share, group_sum, shares, sum_by_class};
use crate::models::NatureMonthTotal;
use crate::store::{Store, TransactionFilter};
use crate::utils::{
    fmt_money, maybe_print_json, month_bounds, or_toast, parse_month, pretty_table,
};
use anyhow::Result;

pub fn handle(store: &dyn Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("by-month", sub)) => by_month(store, sub)?,
        Some(("by-class", sub)) => by_class(store, sub)?,
        Some(("by-nature", sub)) => by_nature(store, sub)?,
        _ => {}
    }
    Ok(())
}

fn by_month(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let (json, jsonl) = json_flags(sub);
    let year = sub.get_one::<i32>("year").copied();
    let data = or_toast("value by month", store.value_by_nature_month(year));
    if !maybe_print_json(json, jsonl, &data)? {
        let rows = data
            .into_iter()
            .map(|r| {
                vec![
                    format!("{:04}-{:02}", r.year, r.month),
                    r.nature,
                    fmt_money(&r.value),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Month", "Nature", "Value"], rows));
    }
    Ok(())
}

/// Spend or income per class, with each class's share of the total.
pub fn class_shares(store: &dyn Store, month: Option<(i32, u32)>) -> Result<Vec<Share>> {
    let mut filter = TransactionFilter::default();
    if let Some((y, m)) = month {
        let (from, until) = month_bounds(y, m)?;
        filter.from = Some(from);
        filter.until = Some(until);
    }
    let txs = or_toast("list transactions", store.list_transactions(&filter));
    let names: HashMap<i64, String> = or_toast("list classes", store.list_classes(None))
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();
    Ok(shares(&sum_by_class(&txs), |id| names.get(&id).cloned()))
}

/// Totals per nature across the loaded months.
pub fn nature_shares(rows: &[NatureMonthTotal]) -> Vec<Share> {
    let names: HashMap<i64, &str> = rows
        .iter()
        .map(|r| (r.nature_id, r.nature.as_str()))
        .collect();
    let sums = group_sum(rows, |r| r.nature_id, |r| r.value);
    shares(&sums, |id| names.get(&id).map(|n| n.to_string()))
}

fn print_shares(label: &str, data: Vec<Share>) {
    let rows = data
        .into_iter()
        .map(|s| vec![s.name, fmt_money(&s.value), format!("{}%", s.percent)])
        .collect();
    println!("{}", pretty_table(&[label, "Total", "Share"], rows));
}

fn by_class(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let (json, jsonl) = json_flags(sub);
    let month = sub
        .get_one::<String>("month")
        .map(|s| parse_month(s))
        .transpose()?;
    let data = class_shares(store, month)?;
    if !maybe_print_json(json, jsonl, &data)? {
        print_shares("Class", data);
    }
    Ok(())
}

fn by_nature(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let (json, jsonl) = json_flags(sub);
    let year = sub.get_one::<i32>("year").copied();
    let rows = or_toast("value by month", store.value_by_nature_month(year));
    let data = nature_shares(&rows);
    if !maybe_print_json(json, jsonl, &data)? {
        print_shares("Nature", data);
    }
    Ok(())
}
