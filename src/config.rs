// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! `config.toml` in the platform config dir, overridden by `MONEYBOARD_*`
//! environment variables.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalogue::CatalogueClient;
use crate::db;
use crate::store::{Backend, PostgrestStore, SqliteStore};

pub const ENV_PREFIX: &str = "MONEYBOARD_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Sqlite,
    Postgrest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendKind,
    pub postgrest_url: Option<String>,
    pub api_key: Option<String>,
    pub catalogue_url: String,
    pub catalogue_key: Option<String>,
    pub db_path: Option<PathBuf>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::Sqlite,
            postgrest_url: None,
            api_key: None,
            catalogue_url: "https://www.omdbapi.com/".to_string(),
            catalogue_key: None,
            db_path: None,
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        Ok(db::project_dirs()?.config_dir().join("config.toml"))
    }

    pub fn from_toml(s: &str) -> Result<Self> {
        toml::from_str(s).context("Invalid config.toml")
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        let mut cfg = if path.exists() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("Read config at {}", path.display()))?;
            Self::from_toml(&raw)?
        } else {
            Self::default()
        };
        cfg.apply_env(std::env::vars())?;
        Ok(cfg)
    }

    pub fn apply_env<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            debug!(name, "config override from environment");
            match name {
                "BACKEND" => {
                    self.backend = match value.trim().to_lowercase().as_str() {
                        "sqlite" => BackendKind::Sqlite,
                        "postgrest" => BackendKind::Postgrest,
                        other => return Err(anyhow!("Unknown backend '{}'", other)),
                    }
                }
                "POSTGREST_URL" => self.postgrest_url = Some(value),
                "API_KEY" => self.api_key = Some(value),
                "CATALOGUE_URL" => self.catalogue_url = value,
                "CATALOGUE_KEY" => self.catalogue_key = Some(value),
                "DB_PATH" => self.db_path = Some(PathBuf::from(value)),
                "LOG_LEVEL" => self.log_level = value,
                _ => {}
            }
        }
        Ok(())
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.db_path {
            Some(p) => Ok(p.clone()),
            None => db::db_path(),
        }
    }

    pub fn open_backend(&self, access_token: Option<String>) -> Result<Backend> {
        match self.backend {
            BackendKind::Sqlite => Ok(Backend::Sqlite(SqliteStore::open(&self.db_path()?)?)),
            BackendKind::Postgrest => {
                let url = self
                    .postgrest_url
                    .as_deref()
                    .context("backend = \"postgrest\" needs postgrest_url")?;
                let key = self
                    .api_key
                    .as_deref()
                    .context("backend = \"postgrest\" needs api_key")?;
                Ok(Backend::Postgrest(
                    PostgrestStore::new(url, key)?.with_access_token(access_token),
                ))
            }
        }
    }

    pub fn catalogue(&self) -> Result<CatalogueClient> {
        let key = self
            .catalogue_key
            .as_deref()
            .context("Movie lookups need catalogue_key in config.toml or MONEYBOARD_CATALOGUE_KEY")?;
        Ok(CatalogueClient::new(&self.catalogue_url, key)?)
    }

    /// Copy safe to print: secrets are masked.
    pub fn redacted(&self) -> Self {
        let mask = |v: &Option<String>| v.as_ref().map(|_| "********".to_string());
        Self {
            api_key: mask(&self.api_key),
            catalogue_key: mask(&self.catalogue_key),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn toml_fills_missing_fields_with_defaults() {
        let cfg = Config::from_toml(
            r#"
            backend = "postgrest"
            postgrest_url = "https://abc.supabase.co"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.backend, BackendKind::Postgrest);
        assert_eq!(cfg.log_level, "warn");
        assert_eq!(cfg.catalogue_url, "https://www.omdbapi.com/");
    }

    #[test]
    fn env_overrides_file_values() {
        let mut cfg = Config::default();
        cfg.apply_env(vars(&[
            ("MONEYBOARD_BACKEND", "PostgREST"),
            ("MONEYBOARD_API_KEY", "anon"),
            ("MONEYBOARD_DB_PATH", "/tmp/x.sqlite"),
            ("HOME", "/root"),
        ]))
        .unwrap();
        assert_eq!(cfg.backend, BackendKind::Postgrest);
        assert_eq!(cfg.api_key.as_deref(), Some("anon"));
        assert_eq!(cfg.db_path().unwrap(), PathBuf::from("/tmp/x.sqlite"));
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let mut cfg = Config::default();
        assert!(cfg.apply_env(vars(&[("MONEYBOARD_BACKEND", "mongo")])).is_err());
    }

    #[test]
    fn postgrest_without_url_fails_to_open() {
        let cfg = Config {
            backend: BackendKind::Postgrest,
            ..Config::default()
        };
        let err = cfg.open_backend(None).err().unwrap();
        assert!(err.to_string().contains("postgrest_url"));
    }

    #[test]
    fn redacted_masks_secrets() {
        let cfg = Config {
            api_key: Some("secret".into()),
            ..Config::default()
        };
        let shown = cfg.redacted();
        assert_eq!(shown.api_key.as_deref(), Some("********"));
        assert_eq!(shown.catalogue_key, None);
    }
}
