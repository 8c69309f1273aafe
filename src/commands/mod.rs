// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod auth;
pub mod classes;
pub mod exporter;
pub mod investments;
pub mod movies;
pub mod natures;
pub mod recurring;
pub mod reports;
pub mod transactions;
pub mod types;

use crate::store::Page;

pub(crate) fn page_from(sub: &clap::ArgMatches) -> Page {
    Page {
        limit: sub.get_one::<usize>("limit").copied(),
        offset: sub.get_one::<usize>("offset").copied().unwrap_or(0),
    }
}

pub(crate) fn json_flags(sub: &clap::ArgMatches) -> (bool, bool) {
    (sub.get_flag("json"), sub.get_flag("jsonl"))
}
