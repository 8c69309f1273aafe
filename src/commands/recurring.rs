// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::json_flags;
use crate::models::{Frequency, NewRecurringTransaction, RecurringTransaction};
use crate::parcels::{ParcelBoard, Transition};
use crate::store::Store;
use crate::utils::{
    fmt_money, maybe_print_json, or_toast, parse_date, parse_decimal, pretty_table, require,
    start_of_day,
};
use anyhow::{Result, anyhow};
use chrono::Utc;
use serde::Serialize;

pub fn handle(store: &dyn Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, sub)?,
        Some(("list", sub)) => list(store, sub)?,
        Some(("installments", sub)) => installments(store, sub)?,
        Some(("toggle", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let number = *sub.get_one::<u32>("parcel").unwrap();
            let templates = or_toast("list recurring", store.list_recurring(false));
            let mut board = ParcelBoard::load(&templates);
            let outcome = board.toggle(store, id, number, Utc::now())?;
            match outcome.transition {
                Transition::Paid => println!(
                    "Parcel {} ({}) marked paid{}",
                    outcome.installment.number,
                    outcome.installment.label,
                    outcome
                        .ledger
                        .map(|t| format!(", ledger entry {}", t.id))
                        .unwrap_or_default()
                ),
                Transition::Unpaid => println!(
                    "Parcel {} ({}) marked unpaid",
                    outcome.installment.number, outcome.installment.label
                ),
            }
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            store.deactivate_recurring(id)?;
            println!("Removed recurring {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn add(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let class_id = *sub.get_one::<i64>("class").unwrap();
    let value = parse_decimal(require("value", sub.get_one::<String>("value"))?)?;
    let description = require("description", sub.get_one::<String>("description"))?;
    let frequency = sub
        .get_one::<String>("frequency")
        .map(|s| s.parse::<Frequency>())
        .transpose()?
        .unwrap_or(Frequency::Monthly);
    let start = match sub.get_one::<String>("start") {
        Some(s) => start_of_day(parse_date(s)?),
        None => Utc::now(),
    };
    let validity = sub
        .get_one::<String>("until")
        .map(|s| parse_date(s))
        .transpose()?;
    if let Some(end) = validity {
        if end < start.date_naive() {
            return Err(anyhow!(
                "Last installment {} is before the start {}",
                end,
                start.date_naive()
            ));
        }
    }

    let r = store.insert_recurring(&NewRecurringTransaction {
        class_id,
        value,
        description: description.to_string(),
        frequency,
        created_at: start,
        validity,
    })?;
    match r.plan() {
        Ok(plan) => println!(
            "Added recurring '{}' (id {}), {} installments of {}",
            r.description,
            r.id,
            plan.len(),
            fmt_money(&r.value)
        ),
        Err(_) => println!(
            "Added recurring '{}' (id {}), {} {}",
            r.description,
            r.id,
            r.frequency,
            fmt_money(&r.value)
        ),
    }
    Ok(())
}

/// Paid count over plan length, or `-` for open-ended templates.
pub fn progress(r: &RecurringTransaction) -> String {
    match r.plan() {
        Ok(plan) => {
            let paid = r.paid_parcels.iter().filter(|n| plan.contains(**n)).count();
            format!("{}/{}", paid, plan.len())
        }
        Err(_) => "-".to_string(),
    }
}

fn list(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let (json, jsonl) = json_flags(sub);
    let all = sub.get_flag("all");
    let data = or_toast("list recurring", store.list_recurring(all));
    if !maybe_print_json(json, jsonl, &data)? {
        let rows = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.class_id.to_string(),
                    r.description.clone(),
                    r.frequency.to_string(),
                    fmt_money(&r.value),
                    r.validity.map(|d| d.to_string()).unwrap_or_default(),
                    progress(r),
                    if r.status { "active" } else { "removed" }.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Class", "Description", "Every", "Value", "Until", "Paid", "Status"],
                rows
            )
        );
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct InstallmentRow {
    number: u32,
    label: String,
    due: chrono::NaiveDate,
    paid: bool,
}

fn installments(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let (json, jsonl) = json_flags(sub);
    let id = *sub.get_one::<i64>("id").unwrap();
    let r = store
        .get_recurring(id)?
        .ok_or_else(|| anyhow!("Recurring {} not found", id))?;
    let plan = r.plan()?;
    let data: Vec<InstallmentRow> = plan
        .iter()
        .map(|i| InstallmentRow {
            paid: r.paid_parcels.contains(&i.number),
            number: i.number,
            label: i.label,
            due: i.due,
        })
        .collect();
    if !maybe_print_json(json, jsonl, &data)? {
        let rows = data
            .into_iter()
            .map(|i| {
                vec![
                    i.number.to_string(),
                    i.label,
                    i.due.to_string(),
                    if i.paid { "yes" } else { "" }.to_string(),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["#", "Month", "Due", "Paid"], rows));
    }
    Ok(())
}
