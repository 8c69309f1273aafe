// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Hosted backend: a PostgREST endpoint (`/rest/v1/<table>`) plus its auth
//! service (`/auth/v1`). Every call is a single blocking request; errors
//! come back as a JSON body with a `message`.

use std::collections::BTreeSet;

use reqwest::Method;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, trace};

use super::query::{Order, Query, Table};
use super::{
    ClassRepository, InvestmentRepository, MovieRepository, NatureRepository, Page,
    RecurringRepository, ReportRepository, StoreResult, TransactionFilter,
    TransactionRepository, TypeRepository,
};
use crate::error::BackendError;
use crate::models::{
    Broker, Class, InvestmentMovement, InvestmentType, Movie, Nature, NatureMonthTotal,
    NewClass, NewInvestmentMovement, NewRecurringTransaction, NewTransaction,
    NewTransactionType, RecurringTransaction, Transaction, TransactionPatch, TransactionType,
    WatchStatus,
};
use crate::utils::{fmt_ts, http_client, start_of_day};

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
}

/// Tokens and user returned by a password sign-in.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthGrant {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: AuthUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
}

pub struct PostgrestStore {
    client: Client,
    base_url: String,
    api_key: String,
    access_token: Option<String>,
}

impl PostgrestStore {
    pub fn new(base_url: &str, api_key: &str) -> StoreResult<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            access_token: None,
        })
    }

    pub fn with_access_token(mut self, token: Option<String>) -> Self {
        self.access_token = token;
        self
    }

    pub fn rest_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.base_url, table.as_str())
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.api_key);
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(bearer)
    }

    fn check(resp: Response) -> StoreResult<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().unwrap_or_default();
        Err(BackendError::Api {
            status: status.as_u16(),
            message: api_message(&body)
                .unwrap_or_else(|| format!("{} {}", status.as_u16(), body.trim())),
        })
    }

    pub fn select<T: DeserializeOwned>(&self, query: &Query) -> StoreResult<Vec<T>> {
        let url = self.rest_url(query.table());
        trace!(%url, params = ?query.params(), "select");
        let resp = self
            .request(Method::GET, &url)
            .query(&query.params())
            .send()?;
        Ok(Self::check(resp)?.json()?)
    }

    pub fn select_one<T: DeserializeOwned>(&self, query: Query) -> StoreResult<Option<T>> {
        let mut rows = self.select::<T>(&query.range(0, 1))?;
        Ok(rows.pop())
    }

    pub fn insert<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        table: Table,
        body: &B,
    ) -> StoreResult<T> {
        let url = self.rest_url(table);
        debug!(table = table.as_str(), "insert");
        let resp = self
            .request(Method::POST, &url)
            .header("Prefer", "return=representation")
            .json(body)
            .send()?;
        let mut rows: Vec<T> = Self::check(resp)?.json()?;
        rows.pop()
            .ok_or_else(|| BackendError::Decode(format!("empty insert reply from {}", table.as_str())))
    }

    pub fn update<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        query: &Query,
        body: &B,
    ) -> StoreResult<Vec<T>> {
        let url = self.rest_url(query.table());
        debug!(table = query.table().as_str(), "update");
        let resp = self
            .request(Method::PATCH, &url)
            .query(&query.filter_params())
            .header("Prefer", "return=representation")
            .json(body)
            .send()?;
        Ok(Self::check(resp)?.json()?)
    }

    pub fn delete(&self, query: &Query, id: impl ToString) -> StoreResult<()> {
        let url = self.rest_url(query.table());
        debug!(table = query.table().as_str(), "delete");
        let resp = self
            .request(Method::DELETE, &url)
            .query(&query.filter_params())
            .header("Prefer", "return=representation")
            .send()?;
        let rows: Vec<serde_json::Value> = Self::check(resp)?.json()?;
        expect_deleted(&rows, query.table(), id)
    }

    fn update_expecting_row<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        query: &Query,
        body: &B,
        id: impl ToString,
    ) -> StoreResult<T> {
        let mut rows = self.update::<B, T>(query, body)?;
        rows.pop().ok_or_else(|| BackendError::NotFound {
            table: query.table().as_str(),
            id: id.to_string(),
        })
    }

    pub fn sign_in(&self, email: &str, password: &str) -> StoreResult<AuthGrant> {
        let resp = self
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.api_key)
            .json(&json!({ "email": email, "password": password }))
            .send()?;
        Ok(Self::check(resp)?.json()?)
    }

    pub fn sign_out(&self) -> StoreResult<()> {
        if self.access_token.is_none() {
            return Ok(());
        }
        let resp = self.request(Method::POST, &self.auth_url("logout")).send()?;
        Self::check(resp)?;
        Ok(())
    }
}

/// A delete that matched nothing comes back as an empty array.
pub fn expect_deleted<T>(rows: &[T], table: Table, id: impl ToString) -> StoreResult<()> {
    if rows.is_empty() {
        Err(BackendError::NotFound {
            table: table.as_str(),
            id: id.to_string(),
        })
    } else {
        Ok(())
    }
}

/// Pull the human message out of a PostgREST or auth error body.
pub fn api_message(body: &str) -> Option<String> {
    let parsed: ApiErrorBody = serde_json::from_str(body).ok()?;
    parsed.message.or(parsed.msg).or(parsed.error_description)
}

impl NatureRepository for PostgrestStore {
    fn list_natures(&self) -> StoreResult<Vec<Nature>> {
        self.select(&Query::from(Table::Nature).order("id", Order::Asc))
    }
}

impl TypeRepository for PostgrestStore {
    fn list_types(&self) -> StoreResult<Vec<TransactionType>> {
        self.select(
            &Query::from(Table::Type)
                .order("order", Order::Asc)
                .order("id", Order::Asc),
        )
    }

    fn max_type_order(&self) -> StoreResult<Option<i64>> {
        #[derive(Deserialize)]
        struct OrderOnly {
            order: i64,
        }
        let top: Option<OrderOnly> = self.select_one(
            Query::from(Table::Type)
                .select("order")
                .order("order", Order::Desc),
        )?;
        Ok(top.map(|t| t.order))
    }

    fn insert_type(&self, new: &NewTransactionType) -> StoreResult<TransactionType> {
        self.insert(Table::Type, new)
    }

    fn delete_type(&self, id: i64) -> StoreResult<()> {
        self.delete(&Query::from(Table::Type).eq("id", id), id)
    }
}

impl ClassRepository for PostgrestStore {
    fn list_classes(&self, type_id: Option<i64>) -> StoreResult<Vec<Class>> {
        let mut q = Query::from(Table::Class).order("name", Order::Asc);
        if let Some(t) = type_id {
            q = q.eq("type_id", t);
        }
        self.select(&q)
    }

    fn insert_class(&self, new: &NewClass) -> StoreResult<Class> {
        self.insert(Table::Class, new)
    }

    fn delete_class(&self, id: i64) -> StoreResult<()> {
        self.delete(&Query::from(Table::Class).eq("id", id), id)
    }
}

impl TransactionRepository for PostgrestStore {
    fn list_transactions(&self, filter: &TransactionFilter) -> StoreResult<Vec<Transaction>> {
        let mut q = Query::from(Table::Transaction);
        if let Some(class_id) = filter.class_id {
            q = q.eq("class_id", class_id);
        }
        if let Some(from) = filter.from {
            q = q.gte("created_at", fmt_ts(&start_of_day(from)));
        }
        if let Some(until) = filter.until {
            q = q.lt("created_at", fmt_ts(&start_of_day(until)));
        }
        let q = q
            .order("created_at", Order::Desc)
            .order("id", Order::Desc)
            .page(&filter.page);
        self.select(&q)
    }

    fn get_transaction(&self, id: i64) -> StoreResult<Option<Transaction>> {
        self.select_one(Query::from(Table::Transaction).eq("id", id))
    }

    fn insert_transaction(&self, new: &NewTransaction) -> StoreResult<Transaction> {
        self.insert(Table::Transaction, new)
    }

    fn update_transaction(&self, id: i64, patch: &TransactionPatch) -> StoreResult<Transaction> {
        self.update_expecting_row(&Query::from(Table::Transaction).eq("id", id), patch, id)
    }

    fn delete_transaction(&self, id: i64) -> StoreResult<()> {
        self.delete(&Query::from(Table::Transaction).eq("id", id), id)
    }
}

impl RecurringRepository for PostgrestStore {
    fn list_recurring(&self, include_inactive: bool) -> StoreResult<Vec<RecurringTransaction>> {
        let mut q = Query::from(Table::RecurringTransaction);
        if !include_inactive {
            q = q.is("status", true);
        }
        self.select(&q.order("created_at", Order::Asc).order("id", Order::Asc))
    }

    fn get_recurring(&self, id: i64) -> StoreResult<Option<RecurringTransaction>> {
        self.select_one(Query::from(Table::RecurringTransaction).eq("id", id))
    }

    fn insert_recurring(&self, new: &NewRecurringTransaction) -> StoreResult<RecurringTransaction> {
        self.insert(Table::RecurringTransaction, new)
    }

    fn set_paid_parcels(&self, id: i64, paid: &BTreeSet<u32>) -> StoreResult<()> {
        let _: RecurringTransaction = self.update_expecting_row(
            &Query::from(Table::RecurringTransaction).eq("id", id),
            &json!({ "paid_parcels": paid }),
            id,
        )?;
        Ok(())
    }

    fn deactivate_recurring(&self, id: i64) -> StoreResult<()> {
        let _: RecurringTransaction = self.update_expecting_row(
            &Query::from(Table::RecurringTransaction).eq("id", id),
            &json!({ "status": false }),
            id,
        )?;
        Ok(())
    }
}

impl MovieRepository for PostgrestStore {
    fn list_movies(&self, status: Option<WatchStatus>, page: &Page) -> StoreResult<Vec<Movie>> {
        let mut q = Query::from(Table::Movie);
        if let Some(s) = status {
            q = q.eq("status", s.as_str());
        }
        self.select(&q.order("title", Order::Asc).page(page))
    }

    fn get_movie(&self, id: &str) -> StoreResult<Option<Movie>> {
        self.select_one(Query::from(Table::Movie).eq("id", id))
    }

    fn insert_movie(&self, movie: &Movie) -> StoreResult<Movie> {
        self.insert(Table::Movie, movie)
    }

    fn update_movie(&self, movie: &Movie) -> StoreResult<()> {
        let body = json!({
            "status": movie.status,
            "rating": movie.rating,
            "watched_dates": movie.watched_dates,
        });
        let _: Movie =
            self.update_expecting_row(&Query::from(Table::Movie).eq("id", &movie.id), &body, &movie.id)?;
        Ok(())
    }

    fn delete_movie(&self, id: &str) -> StoreResult<()> {
        self.delete(&Query::from(Table::Movie).eq("id", id), id)
    }
}

impl InvestmentRepository for PostgrestStore {
    fn list_investment_types(&self) -> StoreResult<Vec<InvestmentType>> {
        self.select(&Query::from(Table::InvestmentType).order("name", Order::Asc))
    }

    fn insert_investment_type(&self, name: &str, color: &str) -> StoreResult<InvestmentType> {
        self.insert(
            Table::InvestmentType,
            &json!({ "name": name, "color": color }),
        )
    }

    fn list_brokers(&self) -> StoreResult<Vec<Broker>> {
        self.select(&Query::from(Table::Broker).order("name", Order::Asc))
    }

    fn insert_broker(&self, name: &str) -> StoreResult<Broker> {
        self.insert(Table::Broker, &json!({ "name": name }))
    }

    fn list_movements(
        &self,
        investment_type_id: Option<i64>,
        page: &Page,
    ) -> StoreResult<Vec<InvestmentMovement>> {
        let mut q = Query::from(Table::InvestmentMovement);
        if let Some(t) = investment_type_id {
            q = q.eq("investment_type_id", t);
        }
        self.select(
            &q.order("date", Order::Asc)
                .order("id", Order::Asc)
                .page(page),
        )
    }

    fn insert_movement(&self, new: &NewInvestmentMovement) -> StoreResult<InvestmentMovement> {
        self.insert(Table::InvestmentMovement, new)
    }

    fn delete_movement(&self, id: i64) -> StoreResult<()> {
        self.delete(&Query::from(Table::InvestmentMovement).eq("id", id), id)
    }
}

impl ReportRepository for PostgrestStore {
    fn value_by_nature_month(&self, year: Option<i32>) -> StoreResult<Vec<NatureMonthTotal>> {
        let mut q = Query::from(Table::ValueByNatureYearMonth);
        if let Some(y) = year {
            q = q.eq("year", y);
        }
        self.select(
            &q.order("year", Order::Asc)
                .order("month", Order::Asc)
                .order("nature_id", Order::Asc),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_message_prefers_postgrest_message() {
        let body = r#"{"code":"23503","details":"Key is not present","hint":null,"message":"insert or update on table \"transaction\" violates foreign key constraint"}"#;
        assert_eq!(
            api_message(body).as_deref(),
            Some("insert or update on table \"transaction\" violates foreign key constraint")
        );
    }

    #[test]
    fn api_message_reads_auth_errors() {
        assert_eq!(
            api_message(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#)
                .as_deref(),
            Some("Invalid login credentials")
        );
        assert_eq!(
            api_message(r#"{"code":400,"msg":"Email not confirmed"}"#).as_deref(),
            Some("Email not confirmed")
        );
        assert_eq!(api_message("<html>bad gateway</html>"), None);
    }

    #[test]
    fn delete_matching_nothing_is_not_found() {
        let none: Vec<serde_json::Value> = serde_json::from_str("[]").unwrap();
        let err = expect_deleted(&none, Table::Transaction, 999).unwrap_err();
        assert_eq!(err.to_string(), "transaction row 999 not found");

        let one: Vec<serde_json::Value> = serde_json::from_str(r#"[{"id":7}]"#).unwrap();
        assert!(expect_deleted(&one, Table::Transaction, 7).is_ok());
    }

    #[test]
    fn urls_are_built_from_trimmed_base() {
        let store = PostgrestStore::new("https://example.supabase.co/", "anon").unwrap();
        assert_eq!(
            store.rest_url(Table::RecurringTransaction),
            "https://example.supabase.co/rest/v1/recurring_transaction"
        );
        assert_eq!(
            store.auth_url("token"),
            "https://example.supabase.co/auth/v1/token"
        );
    }

    #[test]
    fn recurring_rows_decode_from_json() {
        let row = r#"{"id":3,"class_id":2,"value":-89.9,"description":"Internet",
            "frequency":"monthly","created_at":"2024-01-05T13:22:10.123456+00:00",
            "validity":"2024-12-05","status":true,"paid_parcels":[2,1]}"#;
        let rt: RecurringTransaction = serde_json::from_str(row).unwrap();
        assert_eq!(rt.paid_parcels, [1, 2].into_iter().collect());
        assert_eq!(rt.plan().unwrap().len(), 12);
    }
}
