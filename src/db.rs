// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Moneyboard", "moneyboard"));

pub fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")
}

pub fn data_dir() -> Result<PathBuf> {
    let proj = project_dirs()?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.to_path_buf())
}

pub fn db_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("moneyboard.sqlite"))
}

pub fn open_or_init(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Create DB dir {}", parent.display()))?;
    }
    let mut conn =
        Connection::open(path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&mut conn)?;
    debug!(path = %path.display(), "sqlite store ready");
    Ok(conn)
}

pub fn init_schema(conn: &mut Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS nature(
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    );
    INSERT OR IGNORE INTO nature(id, name) VALUES (1, 'Receita'), (2, 'Despesa');

    CREATE TABLE IF NOT EXISTS type(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        nature_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        color TEXT NOT NULL,
        icon TEXT,
        "order" INTEGER NOT NULL,
        FOREIGN KEY(nature_id) REFERENCES nature(id)
    );

    CREATE TABLE IF NOT EXISTS class(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        type_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        FOREIGN KEY(type_id) REFERENCES type(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS "transaction"(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        class_id INTEGER NOT NULL,
        value TEXT NOT NULL,
        description TEXT NOT NULL,
        created_at TEXT NOT NULL,
        FOREIGN KEY(class_id) REFERENCES class(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_transaction_created_at ON "transaction"(created_at);

    CREATE TABLE IF NOT EXISTS recurring_transaction(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        class_id INTEGER NOT NULL,
        value TEXT NOT NULL,
        description TEXT NOT NULL,
        frequency TEXT NOT NULL CHECK(frequency IN ('daily','weekly','monthly','yearly')),
        created_at TEXT NOT NULL,
        validity TEXT,
        status INTEGER NOT NULL DEFAULT 1,
        paid_parcels TEXT NOT NULL DEFAULT '[]',
        FOREIGN KEY(class_id) REFERENCES class(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS movie(
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        year TEXT,
        poster TEXT,
        genre TEXT,
        status TEXT NOT NULL CHECK(status IN ('to_watch','watched')),
        rating INTEGER,
        watched_dates TEXT NOT NULL DEFAULT '[]'
    );

    CREATE TABLE IF NOT EXISTS investment_type(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        color TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS broker(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE
    );

    CREATE TABLE IF NOT EXISTS investment_movement(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        investment_type_id INTEGER NOT NULL,
        broker_id INTEGER,
        nature TEXT NOT NULL CHECK(nature IN ('contribution','withdrawal','yield')),
        value TEXT NOT NULL,
        date TEXT NOT NULL,
        description TEXT,
        FOREIGN KEY(investment_type_id) REFERENCES investment_type(id) ON DELETE CASCADE,
        FOREIGN KEY(broker_id) REFERENCES broker(id) ON DELETE SET NULL
    );
    CREATE INDEX IF NOT EXISTS idx_investment_movement_date ON investment_movement(date);
    "#,
    )?;
    Ok(())
}
