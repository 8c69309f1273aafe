// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nature {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionType {
    pub id: i64,
    pub nature_id: i64,
    pub name: String,
    pub color: String,
    pub icon: Option<String>,
    pub order: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewTransactionType {
    pub nature_id: i64,
    pub name: String,
    pub color: String,
    pub icon: Option<String>,
    pub order: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Class {
    pub id: i64,
    pub type_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewClass {
    pub type_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub class_id: i64,
    pub value: Decimal,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTransaction {
    pub class_id: i64,
    pub value: Decimal,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TransactionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        self.class_id.is_none()
            && self.value.is_none()
            && self.description.is_none()
            && self.created_at.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }
}

impl FromStr for Frequency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            other => Err(ValidationError::InvalidValue(other.to_string())),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringTransaction {
    pub id: i64,
    pub class_id: i64,
    pub value: Decimal,
    pub description: String,
    pub frequency: Frequency,
    pub created_at: DateTime<Utc>,
    pub validity: Option<NaiveDate>,
    /// `false` once the template has been removed.
    pub status: bool,
    #[serde(default)]
    pub paid_parcels: BTreeSet<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewRecurringTransaction {
    pub class_id: i64,
    pub value: Decimal,
    pub description: String,
    pub frequency: Frequency,
    pub created_at: DateTime<Utc>,
    pub validity: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchStatus {
    ToWatch,
    Watched,
}

impl WatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WatchStatus::ToWatch => "to_watch",
            WatchStatus::Watched => "watched",
        }
    }
}

impl FromStr for WatchStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "to_watch" => Ok(WatchStatus::ToWatch),
            "watched" => Ok(WatchStatus::Watched),
            other => Err(ValidationError::InvalidValue(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    /// Catalogue identifier, e.g. `tt0111161`.
    pub id: String,
    pub title: String,
    pub year: Option<String>,
    pub poster: Option<String>,
    pub genre: Option<String>,
    pub status: WatchStatus,
    pub rating: Option<u8>,
    #[serde(default)]
    pub watched_dates: Vec<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentType {
    pub id: i64,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Broker {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementNature {
    Contribution,
    Withdrawal,
    Yield,
}

impl MovementNature {
    /// Direction in which a movement moves the invested balance.
    pub fn sign(&self) -> Decimal {
        match self {
            MovementNature::Contribution | MovementNature::Yield => Decimal::ONE,
            MovementNature::Withdrawal => Decimal::NEGATIVE_ONE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MovementNature::Contribution => "contribution",
            MovementNature::Withdrawal => "withdrawal",
            MovementNature::Yield => "yield",
        }
    }
}

impl FromStr for MovementNature {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "contribution" | "deposit" => Ok(MovementNature::Contribution),
            "withdrawal" => Ok(MovementNature::Withdrawal),
            "yield" => Ok(MovementNature::Yield),
            other => Err(ValidationError::InvalidValue(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentMovement {
    pub id: i64,
    pub investment_type_id: i64,
    pub broker_id: Option<i64>,
    pub nature: MovementNature,
    pub value: Decimal,
    pub date: NaiveDate,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewInvestmentMovement {
    pub investment_type_id: i64,
    pub broker_id: Option<i64>,
    pub nature: MovementNature,
    pub value: Decimal,
    pub date: NaiveDate,
    pub description: Option<String>,
}

/// Row of the `vw_value_by_nature_year_month` view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NatureMonthTotal {
    pub nature_id: i64,
    pub nature: String,
    pub year: i32,
    pub month: u32,
    pub value: Decimal,
}
