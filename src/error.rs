// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Failure of a call against the row store, local or hosted.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("could not decode {0}")]
    Decode(String),
    #[error("{table} row {id} not found")]
    NotFound { table: &'static str, id: String },
}

impl BackendError {
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Client-side validation; blocks the command before anything is sent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("invalid value '{0}'")]
    InvalidValue(String),
    #[error("invalid color '{0}', expected #RRGGBB")]
    InvalidColor(String),
    #[error("invalid rating {0}, expected 0 to 10")]
    InvalidRating(u8),
    #[error("invalid catalogue id '{0}'")]
    InvalidCatalogueId(String),
    #[error("installment {number} is outside 1..={count}")]
    ParcelOutOfRange { number: u32, count: usize },
    #[error("recurring transaction has no validity date, it is not an installment plan")]
    NotAPlan,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("not signed in, run `moneyboard login` first")]
    NotSignedIn,
    #[error("authentication failed: {0}")]
    Auth(String),
}

/// Everything the parcel toggle can fail with.
#[derive(Debug, Error)]
pub enum ToggleError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("could not save paid installments: {0}")]
    Persist(#[source] BackendError),
    #[error("installment saved but ledger entry failed: {0}")]
    Ledger(#[source] BackendError),
    #[error(transparent)]
    Lookup(BackendError),
}
