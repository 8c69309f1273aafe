// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{json_flags, page_from};
use crate::models::{NewTransaction, Transaction, TransactionPatch};
use crate::store::{Store, StoreResult, TransactionFilter};
use crate::utils::{
    fmt_money, maybe_print_json, month_bounds, or_toast, parse_date, parse_decimal, parse_month,
    pretty_table, require, start_of_day,
};
use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};

pub fn handle(store: &dyn Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, sub)?,
        Some(("list", sub)) => list(store, sub)?,
        Some(("edit", sub)) => edit(store, sub)?,
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            store.delete_transaction(id)?;
            println!("Removed transaction {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn timestamp_arg(sub: &clap::ArgMatches) -> Result<Option<DateTime<Utc>>> {
    match sub.get_one::<String>("date") {
        Some(raw) => Ok(Some(start_of_day(parse_date(raw)?))),
        None => Ok(None),
    }
}

fn add(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let class_id = *sub.get_one::<i64>("class").unwrap();
    let value = parse_decimal(require("value", sub.get_one::<String>("value"))?)?;
    let description = require("description", sub.get_one::<String>("description"))?;
    let created_at = timestamp_arg(sub)?.unwrap_or_else(Utc::now);

    let tx = store.insert_transaction(&NewTransaction {
        class_id,
        value,
        description: description.to_string(),
        created_at,
    })?;
    println!(
        "Recorded {} '{}' on {} (id {})",
        fmt_money(&tx.value),
        tx.description,
        tx.created_at.date_naive(),
        tx.id
    );
    Ok(())
}

fn edit(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let patch = TransactionPatch {
        class_id: sub.get_one::<i64>("class").copied(),
        value: sub
            .get_one::<String>("value")
            .map(|v| parse_decimal(v))
            .transpose()?,
        description: sub
            .get_one::<String>("description")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        created_at: timestamp_arg(sub)?,
    };
    if patch.is_empty() {
        return Err(anyhow!("Nothing to change for transaction {}", id));
    }
    let tx = store.update_transaction(id, &patch)?;
    println!(
        "Updated transaction {}: {} '{}'",
        tx.id,
        fmt_money(&tx.value),
        tx.description
    );
    Ok(())
}

pub fn filter_from(sub: &clap::ArgMatches) -> Result<TransactionFilter> {
    let mut filter = TransactionFilter {
        class_id: sub.try_get_one::<i64>("class").ok().flatten().copied(),
        page: page_from_if_present(sub),
        ..TransactionFilter::default()
    };
    if let Some(month) = sub.get_one::<String>("month") {
        let (y, m) = parse_month(month)?;
        let (from, until) = month_bounds(y, m)?;
        filter.from = Some(from);
        filter.until = Some(until);
    }
    Ok(filter)
}

fn page_from_if_present(sub: &clap::ArgMatches) -> crate::store::Page {
    if sub.try_get_one::<usize>("limit").is_ok() {
        page_from(sub)
    } else {
        crate::store::Page::default()
    }
}

pub fn query_rows(store: &dyn Store, sub: &clap::ArgMatches) -> Result<StoreResult<Vec<Transaction>>> {
    let filter = filter_from(sub)?;
    Ok(store.list_transactions(&filter))
}

fn list(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let (json, jsonl) = json_flags(sub);
    let data = or_toast("list transactions", query_rows(store, sub)?);
    if !maybe_print_json(json, jsonl, &data)? {
        let rows = data
            .into_iter()
            .map(|t| {
                vec![
                    t.id.to_string(),
                    t.created_at.date_naive().to_string(),
                    t.class_id.to_string(),
                    t.description,
                    fmt_money(&t.value),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Date", "Class", "Description", "Value"], rows)
        );
    }
    Ok(())
}
