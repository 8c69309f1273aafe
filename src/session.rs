// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Signed-in user and display theme, kept in `session.json` next to the
//! local database. Loaded at startup, rewritten on login or theme change,
//! deleted on logout.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{SessionError, ValidationError};
use crate::store::Backend;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl FromStr for Theme {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(ValidationError::InvalidValue(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub access_token: Option<String>,
    pub signed_in_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppContext {
    pub session: Option<Session>,
    #[serde(default)]
    pub theme: Theme,
}

impl AppContext {
    pub fn file_in(dir: &Path) -> PathBuf {
        dir.join("session.json")
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Read session at {}", path.display()))?;
        let ctx = serde_json::from_str(&raw)
            .with_context(|| format!("Corrupt session file {}", path.display()))?;
        Ok(ctx)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("Write session at {}", path.display()))?;
        debug!(path = %path.display(), "session saved");
        Ok(())
    }

    pub fn user(&self) -> Result<&Session, SessionError> {
        self.session.as_ref().ok_or(SessionError::NotSignedIn)
    }

    pub fn access_token(&self) -> Option<String> {
        self.session.as_ref().and_then(|s| s.access_token.clone())
    }

    pub fn sign_in(&mut self, session: Session) {
        info!(email = %session.email, "signed in");
        self.session = Some(session);
    }

    /// Drops the user and the theme; the caller removes the file.
    pub fn sign_out(&mut self) -> Option<Session> {
        let prev = self.session.take();
        self.theme = Theme::default();
        prev
    }

    pub fn teardown(path: &Path) -> Result<()> {
        if path.exists() {
            fs::remove_file(path)
                .with_context(|| format!("Remove session at {}", path.display()))?;
        }
        Ok(())
    }
}

/// Authenticate against the configured backend. The local backend has no
/// accounts and only records who is using it.
pub fn login(
    backend: &Backend,
    email: &str,
    password: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Session, SessionError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(SessionError::Auth("missing e-mail".into()));
    }
    match backend {
        Backend::Postgrest(store) => {
            let password = password
                .filter(|p| !p.is_empty())
                .ok_or_else(|| SessionError::Auth("missing password".into()))?;
            let grant = store
                .sign_in(email, password)
                .map_err(|e| SessionError::Auth(e.message()))?;
            Ok(Session {
                user_id: grant.user.id,
                email: grant.user.email.unwrap_or_else(|| email.to_string()),
                access_token: Some(grant.access_token),
                signed_in_at: now,
            })
        }
        Backend::Sqlite(_) => Ok(Session {
            user_id: format!("local:{}", email),
            email: email.to_string(),
            access_token: None,
            signed_in_at: now,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn guard_requires_a_session() {
        let ctx = AppContext::default();
        assert!(matches!(ctx.user(), Err(SessionError::NotSignedIn)));
    }

    #[test]
    fn local_login_round_trips_through_file() {
        let dir = tempdir().unwrap();
        let path = AppContext::file_in(dir.path());
        let backend = Backend::Sqlite(SqliteStore::open_in_memory().unwrap());

        let mut ctx = AppContext::load(&path).unwrap();
        ctx.sign_in(login(&backend, " ana@example.com ", None, now()).unwrap());
        ctx.theme = Theme::Dark;
        ctx.save(&path).unwrap();

        let loaded = AppContext::load(&path).unwrap();
        assert_eq!(loaded.user().unwrap().email, "ana@example.com");
        assert_eq!(loaded.theme, Theme::Dark);
        assert_eq!(loaded.access_token(), None);
    }

    #[test]
    fn sign_out_tears_everything_down() {
        let dir = tempdir().unwrap();
        let path = AppContext::file_in(dir.path());
        let backend = Backend::Sqlite(SqliteStore::open_in_memory().unwrap());
        let mut ctx = AppContext {
            session: Some(login(&backend, "a@b.c", None, now()).unwrap()),
            theme: Theme::Dark,
        };
        ctx.save(&path).unwrap();

        assert!(ctx.sign_out().is_some());
        assert_eq!(ctx.theme, Theme::Light);
        AppContext::teardown(&path).unwrap();
        assert!(!path.exists());
        assert_eq!(AppContext::load(&path).unwrap(), AppContext::default());
    }

    #[test]
    fn blank_email_is_refused() {
        let backend = Backend::Sqlite(SqliteStore::open_in_memory().unwrap());
        assert!(matches!(
            login(&backend, "  ", None, now()),
            Err(SessionError::Auth(_))
        ));
    }
}
