// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Typed repositories over the row store. Each entity gets its own trait
//! with one method per operation; `Store` bundles them so commands can take
//! a single `&dyn Store` whichever backend is configured.

pub mod postgrest;
pub mod query;
pub mod sqlite;

use std::collections::BTreeSet;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::BackendError;
use crate::models::{
    Broker, Class, InvestmentMovement, InvestmentType, Movie, Nature, NatureMonthTotal,
    NewClass, NewInvestmentMovement, NewRecurringTransaction, NewTransaction,
    NewTransactionType, RecurringTransaction, Transaction, TransactionPatch, TransactionType,
    WatchStatus,
};

pub use postgrest::PostgrestStore;
pub use sqlite::SqliteStore;

pub type StoreResult<T> = Result<T, BackendError>;

/// One loaded page of rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub limit: Option<usize>,
    pub offset: usize,
}

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub class_id: Option<i64>,
    /// Inclusive lower and exclusive upper bound on `created_at`.
    pub from: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
    pub page: Page,
}

pub trait NatureRepository {
    fn list_natures(&self) -> StoreResult<Vec<Nature>>;
}

pub trait TypeRepository {
    fn list_types(&self) -> StoreResult<Vec<TransactionType>>;
    fn max_type_order(&self) -> StoreResult<Option<i64>>;
    fn insert_type(&self, new: &NewTransactionType) -> StoreResult<TransactionType>;
    fn delete_type(&self, id: i64) -> StoreResult<()>;
}

pub trait ClassRepository {
    fn list_classes(&self, type_id: Option<i64>) -> StoreResult<Vec<Class>>;
    fn insert_class(&self, new: &NewClass) -> StoreResult<Class>;
    fn delete_class(&self, id: i64) -> StoreResult<()>;
}

pub trait TransactionRepository {
    fn list_transactions(&self, filter: &TransactionFilter) -> StoreResult<Vec<Transaction>>;
    fn get_transaction(&self, id: i64) -> StoreResult<Option<Transaction>>;
    fn insert_transaction(&self, new: &NewTransaction) -> StoreResult<Transaction>;
    fn update_transaction(&self, id: i64, patch: &TransactionPatch) -> StoreResult<Transaction>;
    fn delete_transaction(&self, id: i64) -> StoreResult<()>;
}

pub trait RecurringRepository {
    fn list_recurring(&self, include_inactive: bool) -> StoreResult<Vec<RecurringTransaction>>;
    fn get_recurring(&self, id: i64) -> StoreResult<Option<RecurringTransaction>>;
    fn insert_recurring(&self, new: &NewRecurringTransaction) -> StoreResult<RecurringTransaction>;
    fn set_paid_parcels(&self, id: i64, paid: &BTreeSet<u32>) -> StoreResult<()>;
    /// Soft delete: flips `status` to false.
    fn deactivate_recurring(&self, id: i64) -> StoreResult<()>;
}

pub trait MovieRepository {
    fn list_movies(&self, status: Option<WatchStatus>, page: &Page) -> StoreResult<Vec<Movie>>;
    fn get_movie(&self, id: &str) -> StoreResult<Option<Movie>>;
    fn insert_movie(&self, movie: &Movie) -> StoreResult<Movie>;
    fn update_movie(&self, movie: &Movie) -> StoreResult<()>;
    fn delete_movie(&self, id: &str) -> StoreResult<()>;
}

pub trait InvestmentRepository {
    fn list_investment_types(&self) -> StoreResult<Vec<InvestmentType>>;
    fn insert_investment_type(&self, name: &str, color: &str) -> StoreResult<InvestmentType>;
    fn list_brokers(&self) -> StoreResult<Vec<Broker>>;
    fn insert_broker(&self, name: &str) -> StoreResult<Broker>;
    fn list_movements(
        &self,
        investment_type_id: Option<i64>,
        page: &Page,
    ) -> StoreResult<Vec<InvestmentMovement>>;
    fn insert_movement(&self, new: &NewInvestmentMovement) -> StoreResult<InvestmentMovement>;
    fn delete_movement(&self, id: i64) -> StoreResult<()>;
}

pub trait ReportRepository {
    fn value_by_nature_month(&self, year: Option<i32>) -> StoreResult<Vec<NatureMonthTotal>>;
}

pub trait Store:
    NatureRepository
    + TypeRepository
    + ClassRepository
    + TransactionRepository
    + RecurringRepository
    + MovieRepository
    + InvestmentRepository
    + ReportRepository
{
}

impl<T> Store for T where
    T: NatureRepository
        + TypeRepository
        + ClassRepository
        + TransactionRepository
        + RecurringRepository
        + MovieRepository
        + InvestmentRepository
        + ReportRepository
{
}

/// Create a type, appending it after the current last one when no order
/// is given. Reads the max then inserts, without a transaction.
pub fn create_type<S: TypeRepository + ?Sized>(
    store: &S,
    nature_id: i64,
    name: &str,
    color: &str,
    icon: Option<String>,
    order: Option<i64>,
) -> StoreResult<TransactionType> {
    let order = match order {
        Some(o) => o,
        None => store.max_type_order()?.map_or(1, |max| max + 1),
    };
    debug!(name, order, "inserting type");
    store.insert_type(&NewTransactionType {
        nature_id,
        name: name.to_string(),
        color: color.to_string(),
        icon,
        order,
    })
}

/// The backend selected by configuration.
pub enum Backend {
    Sqlite(SqliteStore),
    Postgrest(PostgrestStore),
}

impl Backend {
    pub fn store(&self) -> &dyn Store {
        match self {
            Backend::Sqlite(s) => s,
            Backend::Postgrest(s) => s,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Backend::Sqlite(_) => "sqlite",
            Backend::Postgrest(_) => "postgrest",
        }
    }
}
