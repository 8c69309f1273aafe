// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::json_flags;
use crate::store::{Store, create_type};
use crate::utils::{maybe_print_json, or_toast, pretty_table, require, validate_color};
use anyhow::Result;

pub fn handle(store: &dyn Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let nature_id = *sub.get_one::<i64>("nature").unwrap();
            let name = require("name", sub.get_one::<String>("name"))?;
            let color = validate_color(require("color", sub.get_one::<String>("color"))?)?;
            let icon = sub
                .get_one::<String>("icon")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());
            let order = sub.get_one::<i64>("order").copied();
            let t = create_type(store, nature_id, name, &color, icon, order)?;
            println!("Added type '{}' (id {}, order {})", t.name, t.id, t.order);
        }
        Some(("list", sub)) => {
            let (json, jsonl) = json_flags(sub);
            let types = or_toast("list types", store.list_types());
            if !maybe_print_json(json, jsonl, &types)? {
                let rows = types
                    .into_iter()
                    .map(|t| {
                        vec![
                            t.order.to_string(),
                            t.id.to_string(),
                            t.nature_id.to_string(),
                            t.name,
                            t.color,
                            t.icon.unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Order", "ID", "Nature", "Name", "Color", "Icon"], rows)
                );
            }
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            store.delete_type(id)?;
            println!("Removed type {}", id);
        }
        _ => {}
    }
    Ok(())
}
