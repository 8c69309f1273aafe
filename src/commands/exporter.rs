// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;

use super::transactions::filter_from;
use crate::store::Store;
use crate::utils::fmt_ts;
use anyhow::{Context, Result, anyhow};
use serde_json::json;
use tracing::info;

pub fn handle(store: &dyn Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(store, sub),
        _ => Ok(()),
    }
}

fn export_transactions(store: &dyn Store, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    let txs = store
        .list_transactions(&filter_from(sub)?)
        .context("Load transactions for export")?;
    let classes: HashMap<i64, String> = store
        .list_classes(None)?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();
    let class_name = |id: i64| classes.get(&id).cloned().unwrap_or_default();

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record(["id", "date", "class", "description", "value"])?;
            for t in &txs {
                wtr.write_record([
                    t.id.to_string(),
                    fmt_ts(&t.created_at),
                    class_name(t.class_id),
                    t.description.clone(),
                    t.value.to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let items: Vec<_> = txs
                .iter()
                .map(|t| {
                    json!({
                        "id": t.id,
                        "date": fmt_ts(&t.created_at),
                        "class": class_name(t.class_id),
                        "description": t.description,
                        "value": t.value.to_string(),
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        other => return Err(anyhow!("Unknown format: {} (use csv|json)", other)),
    }
    info!(count = txs.len(), out = %out, "exported transactions");
    println!("Exported {} transactions to {}", txs.len(), out);
    Ok(())
}
