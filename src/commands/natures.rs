// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::json_flags;
use crate::store::Store;
use crate::utils::{maybe_print_json, or_toast, pretty_table};
use anyhow::Result;

pub fn handle(store: &dyn Store, m: &clap::ArgMatches) -> Result<()> {
    if let Some(("list", sub)) = m.subcommand() {
        let (json, jsonl) = json_flags(sub);
        let natures = or_toast("list natures", store.list_natures());
        if !maybe_print_json(json, jsonl, &natures)? {
            let rows = natures
                .into_iter()
                .map(|n| vec![n.id.to_string(), n.name])
                .collect();
            println!("{}", pretty_table(&["ID", "Nature"], rows));
        }
    }
    Ok(())
}
