// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing::debug;

use moneyboard::config::Config;
use moneyboard::session::AppContext;
use moneyboard::{cli, commands, db, logging};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let cfg = Config::load()?;
    logging::init(&cfg.log_level);
    debug!(backend = ?cfg.backend, "config loaded");

    let session_file = AppContext::file_in(&db::data_dir()?);
    let mut ctx = AppContext::load(&session_file)?;

    match matches.subcommand() {
        Some(("init", _)) => {
            let path = cfg.db_path()?;
            db::open_or_init(&path)?;
            println!("Database initialized at {}", path.display());
            println!("Config is read from {}", Config::path()?.display());
            return Ok(());
        }
        Some(("login", sub)) => return commands::auth::sign_in(&cfg, &mut ctx, &session_file, sub),
        Some(("logout", _)) => return commands::auth::sign_out(&cfg, &mut ctx, &session_file),
        Some(("whoami", _)) => return commands::auth::whoami(&ctx),
        Some(("theme", sub)) => return commands::auth::theme(&mut ctx, &session_file, sub),
        Some(("config", sub)) => return commands::auth::config(&cfg, sub),
        None => {
            cli::build_cli().print_help()?;
            println!();
            return Ok(());
        }
        _ => {}
    }

    // Everything below reads or writes user data.
    ctx.user()?;
    let backend = cfg.open_backend(ctx.access_token())?;
    let store = backend.store();

    match matches.subcommand() {
        Some(("nature", sub)) => commands::natures::handle(store, sub)?,
        Some(("type", sub)) => commands::types::handle(store, sub)?,
        Some(("class", sub)) => commands::classes::handle(store, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(store, sub)?,
        Some(("recurring", sub)) => commands::recurring::handle(store, sub)?,
        Some(("movie", sub)) => commands::movies::handle(store, &cfg, sub)?,
        Some(("invest", sub)) => commands::investments::handle(store, sub)?,
        Some(("report", sub)) => commands::reports::handle(store, sub)?,
        Some(("export", sub)) => commands::exporter::handle(store, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
