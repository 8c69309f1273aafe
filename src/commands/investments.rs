// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;

use super::{json_flags, page_from};
use crate::aggregate::{running_balance, shares, sum_by_investment_type};
use crate::error::ValidationError;
use crate::models::{MovementNature, NewInvestmentMovement};
use crate::rentability::period_rentability;
use crate::store::{Page, Store};
use crate::utils::{
    fmt_money, maybe_print_json, or_toast, parse_date, parse_decimal, pretty_table, require,
    validate_color,
};
use anyhow::{Result, anyhow};
use chrono::Utc;
use serde::Serialize;

pub fn handle(store: &dyn Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("type-add", sub)) => {
            let name = require("name", sub.get_one::<String>("name"))?;
            let color = validate_color(require("color", sub.get_one::<String>("color"))?)?;
            let t = store.insert_investment_type(name, &color)?;
            println!("Added investment type '{}' (id {})", t.name, t.id);
        }
        Some(("types", sub)) => {
            let (json, jsonl) = json_flags(sub);
            let types = or_toast("list investment types", store.list_investment_types());
            if !maybe_print_json(json, jsonl, &types)? {
                let rows = types
                    .into_iter()
                    .map(|t| vec![t.id.to_string(), t.name, t.color])
                    .collect();
                println!("{}", pretty_table(&["ID", "Type", "Color"], rows));
            }
        }
        Some(("broker-add", sub)) => {
            let name = require("name", sub.get_one::<String>("name"))?;
            let b = store.insert_broker(name)?;
            println!("Added broker '{}' (id {})", b.name, b.id);
        }
        Some(("brokers", sub)) => {
            let (json, jsonl) = json_flags(sub);
            let brokers = or_toast("list brokers", store.list_brokers());
            if !maybe_print_json(json, jsonl, &brokers)? {
                let rows = brokers
                    .into_iter()
                    .map(|b| vec![b.id.to_string(), b.name])
                    .collect();
                println!("{}", pretty_table(&["ID", "Broker"], rows));
            }
        }
        Some(("add", sub)) => add(store, sub)?,
        Some(("list", sub)) => list(store, sub)?,
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            store.delete_movement(id)?;
            println!("Removed movement {}", id);
        }
        Some(("summary", sub)) => {
            let (json, jsonl) = json_flags(sub);
            let movements = or_toast(
                "list movements",
                store.list_movements(None, &Page::default()),
            );
            let names = type_names(store);
            let data = shares(&sum_by_investment_type(&movements), |id| {
                names.get(&id).cloned()
            });
            if !maybe_print_json(json, jsonl, &data)? {
                let rows = data
                    .into_iter()
                    .map(|s| vec![s.name, fmt_money(&s.value), format!("{}%", s.percent)])
                    .collect();
                println!("{}", pretty_table(&["Type", "Invested", "Share"], rows));
            }
        }
        Some(("rentability", sub)) => {
            let (json, jsonl) = json_flags(sub);
            let from = parse_date(require("from", sub.get_one::<String>("from"))?)?;
            let to = match sub.get_one::<String>("to") {
                Some(s) => parse_date(s)?,
                None => Utc::now().date_naive(),
            };
            if to < from {
                return Err(anyhow!("Period ends before it starts: {} > {}", from, to));
            }
            let type_id = sub.get_one::<i64>("type").copied();
            let movements = store.list_movements(type_id, &Page::default())?;
            let r = period_rentability(&movements, from, to);
            if !maybe_print_json(json, jsonl, &r)? {
                let rows = vec![
                    vec!["Initial".into(), fmt_money(&r.initial)],
                    vec!["Contributions".into(), fmt_money(&r.contributions)],
                    vec!["Withdrawals".into(), fmt_money(&r.withdrawals)],
                    vec!["Final".into(), fmt_money(&r.final_value)],
                    vec![
                        "Rentability".into(),
                        r.rentability
                            .map(|p| format!("{}%", p))
                            .unwrap_or_else(|| "n/a".into()),
                    ],
                ];
                println!("{} .. {}", r.from, r.to);
                println!("{}", pretty_table(&["", "Value"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}

fn type_names(store: &dyn Store) -> HashMap<i64, String> {
    or_toast("list investment types", store.list_investment_types())
        .into_iter()
        .map(|t| (t.id, t.name))
        .collect()
}

fn add(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let investment_type_id = *sub.get_one::<i64>("type").unwrap();
    let nature: MovementNature = require("nature", sub.get_one::<String>("nature"))?.parse()?;
    let raw = require("value", sub.get_one::<String>("value"))?;
    let value = parse_decimal(raw)?;
    if value <= rust_decimal::Decimal::ZERO {
        return Err(ValidationError::InvalidValue(raw.to_string()).into());
    }
    let date = match sub.get_one::<String>("date") {
        Some(s) => parse_date(s)?,
        None => Utc::now().date_naive(),
    };
    let description = sub
        .get_one::<String>("description")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let mv = store.insert_movement(&NewInvestmentMovement {
        investment_type_id,
        broker_id: sub.get_one::<i64>("broker").copied(),
        nature,
        value,
        date,
        description,
    })?;
    println!(
        "Recorded {} of {} on {} (id {})",
        mv.nature.as_str(),
        fmt_money(&mv.value),
        mv.date,
        mv.id
    );
    Ok(())
}

#[derive(Debug, Serialize)]
struct MovementRow {
    id: i64,
    date: chrono::NaiveDate,
    investment_type: String,
    nature: MovementNature,
    value: rust_decimal::Decimal,
    balance: rust_decimal::Decimal,
    description: Option<String>,
}

fn list(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let (json, jsonl) = json_flags(sub);
    let type_id = sub.get_one::<i64>("type").copied();
    let movements = or_toast("list movements", store.list_movements(type_id, &page_from(sub)));
    let names = type_names(store);
    let by_id: HashMap<i64, _> = movements.iter().map(|m| (m.id, m)).collect();
    let data: Vec<MovementRow> = running_balance(&movements)
        .into_iter()
        .filter_map(|p| {
            let m = by_id.get(&p.movement_id)?;
            Some(MovementRow {
                id: m.id,
                date: m.date,
                investment_type: names
                    .get(&m.investment_type_id)
                    .cloned()
                    .unwrap_or_else(|| format!("#{}", m.investment_type_id)),
                nature: m.nature,
                value: m.value,
                balance: p.balance,
                description: m.description.clone(),
            })
        })
        .collect();
    if !maybe_print_json(json, jsonl, &data)? {
        let rows = data
            .into_iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.to_string(),
                    r.investment_type,
                    r.nature.as_str().to_string(),
                    fmt_money(&r.value),
                    fmt_money(&r.balance),
                    r.description.unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Type", "Nature", "Value", "Balance", "Note"],
                rows
            )
        );
    }
    Ok(())
}
