// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Commands that run without a signed-in user: session, theme and config.

use std::path::Path;

use crate::config::Config;
use crate::session::{AppContext, Theme, login};
use crate::store::Backend;
use crate::utils::fmt_ts;
use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};

pub fn sign_in(
    cfg: &Config,
    ctx: &mut AppContext,
    session_file: &Path,
    m: &clap::ArgMatches,
) -> Result<()> {
    let email = m.get_one::<String>("email").unwrap();
    let password = m.get_one::<String>("password").map(|s| s.as_str());
    let backend = cfg.open_backend(None)?;
    let session = login(&backend, email, password, Utc::now())?;
    println!("Signed in as {} ({})", session.email, backend.name());
    ctx.sign_in(session);
    ctx.save(session_file)
}

pub fn sign_out(cfg: &Config, ctx: &mut AppContext, session_file: &Path) -> Result<()> {
    let Some(prev) = ctx.sign_out() else {
        println!("Not signed in");
        return AppContext::teardown(session_file);
    };
    if let Ok(Backend::Postgrest(store)) = cfg.open_backend(prev.access_token.clone()) {
        if let Err(e) = store.sign_out() {
            // The local session is dropped regardless.
            warn!(error = %e, "remote sign-out failed");
        }
    }
    AppContext::teardown(session_file)?;
    info!(email = %prev.email, "signed out");
    println!("Signed out {}", prev.email);
    Ok(())
}

pub fn whoami(ctx: &AppContext) -> Result<()> {
    let user = ctx.user()?;
    println!(
        "{} (id {}, since {})",
        user.email,
        user.user_id,
        fmt_ts(&user.signed_in_at)
    );
    Ok(())
}

pub fn theme(ctx: &mut AppContext, session_file: &Path, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => {
            let theme: Theme = sub.get_one::<String>("theme").unwrap().parse()?;
            ctx.theme = theme;
            ctx.save(session_file)?;
            println!("Theme set to {:?}", theme);
        }
        _ => println!("{:?}", ctx.theme),
    }
    Ok(())
}

pub fn config(cfg: &Config, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("path", _)) => println!("{}", Config::path()?.display()),
        _ => print!("{}", toml::to_string_pretty(&cfg.redacted())?),
    }
    Ok(())
}
