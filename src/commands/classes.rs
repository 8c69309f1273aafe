// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::json_flags;
use crate::models::NewClass;
use crate::store::Store;
use crate::utils::{maybe_print_json, or_toast, pretty_table, require};
use anyhow::Result;

pub fn handle(store: &dyn Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let type_id = *sub.get_one::<i64>("type").unwrap();
            let name = require("name", sub.get_one::<String>("name"))?;
            let c = store.insert_class(&NewClass {
                type_id,
                name: name.to_string(),
            })?;
            println!("Added class '{}' (id {})", c.name, c.id);
        }
        Some(("list", sub)) => {
            let (json, jsonl) = json_flags(sub);
            let type_id = sub.get_one::<i64>("type").copied();
            let classes = or_toast("list classes", store.list_classes(type_id));
            if !maybe_print_json(json, jsonl, &classes)? {
                let rows = classes
                    .into_iter()
                    .map(|c| vec![c.id.to_string(), c.type_id.to_string(), c.name])
                    .collect();
                println!("{}", pretty_table(&["ID", "Type", "Class"], rows));
            }
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            store.delete_class(id)?;
            println!("Removed class {}", id);
        }
        _ => {}
    }
    Ok(())
}
