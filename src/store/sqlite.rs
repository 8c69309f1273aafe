// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Local backend: the same repositories over an embedded SQLite file.
//! Money is stored as decimal text, timestamps as RFC 3339 text and the
//! array columns (`paid_parcels`, `watched_dates`) as JSON text.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter, types::Value};
use rust_decimal::Decimal;

use super::{
    ClassRepository, InvestmentRepository, MovieRepository, NatureRepository, Page,
    RecurringRepository, ReportRepository, StoreResult, TransactionFilter,
    TransactionRepository, TypeRepository,
};
use crate::aggregate::group_sum;
use crate::db;
use crate::error::BackendError;
use crate::models::{
    Broker, Class, Frequency, InvestmentMovement, InvestmentType, MovementNature, Movie, Nature,
    NatureMonthTotal, NewClass, NewInvestmentMovement, NewRecurringTransaction, NewTransaction,
    NewTransactionType, RecurringTransaction, Transaction, TransactionPatch, TransactionType,
    WatchStatus,
};
use crate::utils::{fmt_ts, parse_ts, start_of_day};

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        Ok(Self {
            conn: db::open_or_init(path)?,
        })
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        let mut conn = Connection::open_in_memory()?;
        db::init_schema(&mut conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn expect_changed(&self, n: usize, table: &'static str, id: impl ToString) -> StoreResult<()> {
        if n == 0 {
            Err(BackendError::NotFound {
                table,
                id: id.to_string(),
            })
        } else {
            Ok(())
        }
    }
}

fn dec(s: &str) -> StoreResult<Decimal> {
    s.parse::<Decimal>()
        .map_err(|_| BackendError::Decode(format!("decimal '{}'", s)))
}

fn ts(s: &str) -> StoreResult<DateTime<Utc>> {
    parse_ts(s).ok_or_else(|| BackendError::Decode(format!("timestamp '{}'", s)))
}

fn date(s: &str) -> StoreResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| BackendError::Decode(format!("date '{}'", s)))
}

fn json_col<T: serde::de::DeserializeOwned>(s: &str, what: &str) -> StoreResult<T> {
    serde_json::from_str(s).map_err(|e| BackendError::Decode(format!("{} '{}': {}", what, s, e)))
}

fn to_json<T: serde::Serialize>(v: &T) -> StoreResult<String> {
    serde_json::to_string(v).map_err(|e| BackendError::Decode(e.to_string()))
}

type TransactionRow = (i64, i64, String, String, String);

fn transaction_row(r: &Row<'_>) -> rusqlite::Result<TransactionRow> {
    Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?))
}

fn transaction_from((id, class_id, value, description, created_at): TransactionRow) -> StoreResult<Transaction> {
    Ok(Transaction {
        id,
        class_id,
        value: dec(&value)?,
        description,
        created_at: ts(&created_at)?,
    })
}

type RecurringRow = (
    i64,
    i64,
    String,
    String,
    String,
    String,
    Option<String>,
    bool,
    String,
);

fn recurring_row(r: &Row<'_>) -> rusqlite::Result<RecurringRow> {
    Ok((
        r.get(0)?,
        r.get(1)?,
        r.get(2)?,
        r.get(3)?,
        r.get(4)?,
        r.get(5)?,
        r.get(6)?,
        r.get(7)?,
        r.get(8)?,
    ))
}

fn recurring_from(row: RecurringRow) -> StoreResult<RecurringTransaction> {
    let (id, class_id, value, description, frequency, created_at, validity, status, paid) = row;
    Ok(RecurringTransaction {
        id,
        class_id,
        value: dec(&value)?,
        description,
        frequency: frequency
            .parse::<Frequency>()
            .map_err(|_| BackendError::Decode(format!("frequency '{}'", frequency)))?,
        created_at: ts(&created_at)?,
        validity: validity.as_deref().map(date).transpose()?,
        status,
        paid_parcels: json_col(&paid, "paid_parcels")?,
    })
}

type MovieRow = (
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    String,
    Option<u8>,
    String,
);

fn movie_row(r: &Row<'_>) -> rusqlite::Result<MovieRow> {
    Ok((
        r.get(0)?,
        r.get(1)?,
        r.get(2)?,
        r.get(3)?,
        r.get(4)?,
        r.get(5)?,
        r.get(6)?,
        r.get(7)?,
    ))
}

fn movie_from(row: MovieRow) -> StoreResult<Movie> {
    let (id, title, year, poster, genre, status, rating, watched) = row;
    Ok(Movie {
        id,
        title,
        year,
        poster,
        genre,
        status: status
            .parse::<WatchStatus>()
            .map_err(|_| BackendError::Decode(format!("watch status '{}'", status)))?,
        rating,
        watched_dates: json_col(&watched, "watched_dates")?,
    })
}

type MovementRow = (i64, i64, Option<i64>, String, String, String, Option<String>);

fn movement_row(r: &Row<'_>) -> rusqlite::Result<MovementRow> {
    Ok((
        r.get(0)?,
        r.get(1)?,
        r.get(2)?,
        r.get(3)?,
        r.get(4)?,
        r.get(5)?,
        r.get(6)?,
    ))
}

fn movement_from(row: MovementRow) -> StoreResult<InvestmentMovement> {
    let (id, investment_type_id, broker_id, nature, value, d, description) = row;
    Ok(InvestmentMovement {
        id,
        investment_type_id,
        broker_id,
        nature: nature
            .parse::<MovementNature>()
            .map_err(|_| BackendError::Decode(format!("movement nature '{}'", nature)))?,
        value: dec(&value)?,
        date: date(&d)?,
        description,
    })
}

fn push_page(sql: &mut String, args: &mut Vec<Value>, page: &Page) {
    if let Some(limit) = page.limit {
        sql.push_str(" LIMIT ? OFFSET ?");
        args.push(Value::Integer(limit as i64));
        args.push(Value::Integer(page.offset as i64));
    } else if page.offset > 0 {
        sql.push_str(" LIMIT -1 OFFSET ?");
        args.push(Value::Integer(page.offset as i64));
    }
}

const TRANSACTION_COLS: &str = "id, class_id, value, description, created_at";
const RECURRING_COLS: &str =
    "id, class_id, value, description, frequency, created_at, validity, status, paid_parcels";
const MOVIE_COLS: &str = "id, title, year, poster, genre, status, rating, watched_dates";
const MOVEMENT_COLS: &str = "id, investment_type_id, broker_id, nature, value, date, description";

impl NatureRepository for SqliteStore {
    fn list_natures(&self) -> StoreResult<Vec<Nature>> {
        let mut stmt = self.conn.prepare("SELECT id, name FROM nature ORDER BY id")?;
        let rows = stmt.query_map([], |r| {
            Ok(Nature {
                id: r.get(0)?,
                name: r.get(1)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

impl TypeRepository for SqliteStore {
    fn list_types(&self) -> StoreResult<Vec<TransactionType>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT id, nature_id, name, color, icon, "order" FROM type ORDER BY "order", id"#,
        )?;
        let rows = stmt.query_map([], |r| {
            Ok(TransactionType {
                id: r.get(0)?,
                nature_id: r.get(1)?,
                name: r.get(2)?,
                color: r.get(3)?,
                icon: r.get(4)?,
                order: r.get(5)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn max_type_order(&self) -> StoreResult<Option<i64>> {
        let max: Option<i64> = self
            .conn
            .query_row(r#"SELECT MAX("order") FROM type"#, [], |r| r.get(0))?;
        Ok(max)
    }

    fn insert_type(&self, new: &NewTransactionType) -> StoreResult<TransactionType> {
        self.conn.execute(
            r#"INSERT INTO type(nature_id, name, color, icon, "order") VALUES (?1,?2,?3,?4,?5)"#,
            params![new.nature_id, new.name, new.color, new.icon, new.order],
        )?;
        Ok(TransactionType {
            id: self.conn.last_insert_rowid(),
            nature_id: new.nature_id,
            name: new.name.clone(),
            color: new.color.clone(),
            icon: new.icon.clone(),
            order: new.order,
        })
    }

    fn delete_type(&self, id: i64) -> StoreResult<()> {
        let n = self.conn.execute("DELETE FROM type WHERE id=?1", params![id])?;
        self.expect_changed(n, "type", id)
    }
}

impl ClassRepository for SqliteStore {
    fn list_classes(&self, type_id: Option<i64>) -> StoreResult<Vec<Class>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, type_id, name FROM class WHERE (?1 IS NULL OR type_id=?1) ORDER BY name",
        )?;
        let rows = stmt.query_map(params![type_id], |r| {
            Ok(Class {
                id: r.get(0)?,
                type_id: r.get(1)?,
                name: r.get(2)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn insert_class(&self, new: &NewClass) -> StoreResult<Class> {
        self.conn.execute(
            "INSERT INTO class(type_id, name) VALUES (?1,?2)",
            params![new.type_id, new.name],
        )?;
        Ok(Class {
            id: self.conn.last_insert_rowid(),
            type_id: new.type_id,
            name: new.name.clone(),
        })
    }

    fn delete_class(&self, id: i64) -> StoreResult<()> {
        let n = self.conn.execute("DELETE FROM class WHERE id=?1", params![id])?;
        self.expect_changed(n, "class", id)
    }
}

impl TransactionRepository for SqliteStore {
    fn list_transactions(&self, filter: &TransactionFilter) -> StoreResult<Vec<Transaction>> {
        let mut sql = format!(r#"SELECT {} FROM "transaction" WHERE 1=1"#, TRANSACTION_COLS);
        let mut args: Vec<Value> = Vec::new();
        if let Some(class_id) = filter.class_id {
            sql.push_str(" AND class_id=?");
            args.push(Value::Integer(class_id));
        }
        if let Some(from) = filter.from {
            sql.push_str(" AND created_at>=?");
            args.push(Value::Text(fmt_ts(&start_of_day(from))));
        }
        if let Some(until) = filter.until {
            sql.push_str(" AND created_at<?");
            args.push(Value::Text(fmt_ts(&start_of_day(until))));
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC");
        push_page(&mut sql, &mut args, &filter.page);

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args), transaction_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(transaction_from(row?)?);
        }
        Ok(out)
    }

    fn get_transaction(&self, id: i64) -> StoreResult<Option<Transaction>> {
        let row = self
            .conn
            .query_row(
                &format!(r#"SELECT {} FROM "transaction" WHERE id=?1"#, TRANSACTION_COLS),
                params![id],
                transaction_row,
            )
            .optional()?;
        row.map(transaction_from).transpose()
    }

    fn insert_transaction(&self, new: &NewTransaction) -> StoreResult<Transaction> {
        self.conn.execute(
            r#"INSERT INTO "transaction"(class_id, value, description, created_at) VALUES (?1,?2,?3,?4)"#,
            params![
                new.class_id,
                new.value.to_string(),
                new.description,
                fmt_ts(&new.created_at)
            ],
        )?;
        Ok(Transaction {
            id: self.conn.last_insert_rowid(),
            class_id: new.class_id,
            value: new.value,
            description: new.description.clone(),
            created_at: new.created_at,
        })
    }

    fn update_transaction(&self, id: i64, patch: &TransactionPatch) -> StoreResult<Transaction> {
        let current = self
            .get_transaction(id)?
            .ok_or_else(|| BackendError::NotFound {
                table: "transaction",
                id: id.to_string(),
            })?;
        let next = Transaction {
            id,
            class_id: patch.class_id.unwrap_or(current.class_id),
            value: patch.value.unwrap_or(current.value),
            description: patch
                .description
                .clone()
                .unwrap_or(current.description),
            created_at: patch.created_at.unwrap_or(current.created_at),
        };
        self.conn.execute(
            r#"UPDATE "transaction" SET class_id=?1, value=?2, description=?3, created_at=?4 WHERE id=?5"#,
            params![
                next.class_id,
                next.value.to_string(),
                next.description,
                fmt_ts(&next.created_at),
                id
            ],
        )?;
        Ok(next)
    }

    fn delete_transaction(&self, id: i64) -> StoreResult<()> {
        let n = self
            .conn
            .execute(r#"DELETE FROM "transaction" WHERE id=?1"#, params![id])?;
        self.expect_changed(n, "transaction", id)
    }
}

impl RecurringRepository for SqliteStore {
    fn list_recurring(&self, include_inactive: bool) -> StoreResult<Vec<RecurringTransaction>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM recurring_transaction WHERE (?1 OR status=1) ORDER BY created_at, id",
            RECURRING_COLS
        ))?;
        let rows = stmt.query_map(params![include_inactive], recurring_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(recurring_from(row?)?);
        }
        Ok(out)
    }

    fn get_recurring(&self, id: i64) -> StoreResult<Option<RecurringTransaction>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM recurring_transaction WHERE id=?1", RECURRING_COLS),
                params![id],
                recurring_row,
            )
            .optional()?;
        row.map(recurring_from).transpose()
    }

    fn insert_recurring(&self, new: &NewRecurringTransaction) -> StoreResult<RecurringTransaction> {
        self.conn.execute(
            "INSERT INTO recurring_transaction(class_id, value, description, frequency, created_at, validity)
             VALUES (?1,?2,?3,?4,?5,?6)",
            params![
                new.class_id,
                new.value.to_string(),
                new.description,
                new.frequency.as_str(),
                fmt_ts(&new.created_at),
                new.validity.map(|d| d.to_string())
            ],
        )?;
        Ok(RecurringTransaction {
            id: self.conn.last_insert_rowid(),
            class_id: new.class_id,
            value: new.value,
            description: new.description.clone(),
            frequency: new.frequency,
            created_at: new.created_at,
            validity: new.validity,
            status: true,
            paid_parcels: BTreeSet::new(),
        })
    }

    fn set_paid_parcels(&self, id: i64, paid: &BTreeSet<u32>) -> StoreResult<()> {
        let n = self.conn.execute(
            "UPDATE recurring_transaction SET paid_parcels=?1 WHERE id=?2",
            params![to_json(paid)?, id],
        )?;
        self.expect_changed(n, "recurring_transaction", id)
    }

    fn deactivate_recurring(&self, id: i64) -> StoreResult<()> {
        let n = self.conn.execute(
            "UPDATE recurring_transaction SET status=0 WHERE id=?1",
            params![id],
        )?;
        self.expect_changed(n, "recurring_transaction", id)
    }
}

impl MovieRepository for SqliteStore {
    fn list_movies(&self, status: Option<WatchStatus>, page: &Page) -> StoreResult<Vec<Movie>> {
        let mut sql = format!("SELECT {} FROM movie WHERE 1=1", MOVIE_COLS);
        let mut args: Vec<Value> = Vec::new();
        if let Some(s) = status {
            sql.push_str(" AND status=?");
            args.push(Value::Text(s.as_str().to_string()));
        }
        sql.push_str(" ORDER BY title");
        push_page(&mut sql, &mut args, page);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args), movie_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(movie_from(row?)?);
        }
        Ok(out)
    }

    fn get_movie(&self, id: &str) -> StoreResult<Option<Movie>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM movie WHERE id=?1", MOVIE_COLS),
                params![id],
                movie_row,
            )
            .optional()?;
        row.map(movie_from).transpose()
    }

    fn insert_movie(&self, movie: &Movie) -> StoreResult<Movie> {
        self.conn.execute(
            "INSERT INTO movie(id, title, year, poster, genre, status, rating, watched_dates)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8)",
            params![
                movie.id,
                movie.title,
                movie.year,
                movie.poster,
                movie.genre,
                movie.status.as_str(),
                movie.rating,
                to_json(&movie.watched_dates)?
            ],
        )?;
        Ok(movie.clone())
    }

    fn update_movie(&self, movie: &Movie) -> StoreResult<()> {
        let n = self.conn.execute(
            "UPDATE movie SET status=?1, rating=?2, watched_dates=?3 WHERE id=?4",
            params![
                movie.status.as_str(),
                movie.rating,
                to_json(&movie.watched_dates)?,
                movie.id
            ],
        )?;
        self.expect_changed(n, "movie", &movie.id)
    }

    fn delete_movie(&self, id: &str) -> StoreResult<()> {
        let n = self.conn.execute("DELETE FROM movie WHERE id=?1", params![id])?;
        self.expect_changed(n, "movie", id)
    }
}

impl InvestmentRepository for SqliteStore {
    fn list_investment_types(&self) -> StoreResult<Vec<InvestmentType>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, color FROM investment_type ORDER BY name")?;
        let rows = stmt.query_map([], |r| {
            Ok(InvestmentType {
                id: r.get(0)?,
                name: r.get(1)?,
                color: r.get(2)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn insert_investment_type(&self, name: &str, color: &str) -> StoreResult<InvestmentType> {
        self.conn.execute(
            "INSERT INTO investment_type(name, color) VALUES (?1,?2)",
            params![name, color],
        )?;
        Ok(InvestmentType {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            color: color.to_string(),
        })
    }

    fn list_brokers(&self) -> StoreResult<Vec<Broker>> {
        let mut stmt = self.conn.prepare("SELECT id, name FROM broker ORDER BY name")?;
        let rows = stmt.query_map([], |r| {
            Ok(Broker {
                id: r.get(0)?,
                name: r.get(1)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn insert_broker(&self, name: &str) -> StoreResult<Broker> {
        self.conn
            .execute("INSERT INTO broker(name) VALUES (?1)", params![name])?;
        Ok(Broker {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    fn list_movements(
        &self,
        investment_type_id: Option<i64>,
        page: &Page,
    ) -> StoreResult<Vec<InvestmentMovement>> {
        let mut sql = format!("SELECT {} FROM investment_movement WHERE 1=1", MOVEMENT_COLS);
        let mut args: Vec<Value> = Vec::new();
        if let Some(t) = investment_type_id {
            sql.push_str(" AND investment_type_id=?");
            args.push(Value::Integer(t));
        }
        sql.push_str(" ORDER BY date, id");
        push_page(&mut sql, &mut args, page);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args), movement_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(movement_from(row?)?);
        }
        Ok(out)
    }

    fn insert_movement(&self, new: &NewInvestmentMovement) -> StoreResult<InvestmentMovement> {
        self.conn.execute(
            "INSERT INTO investment_movement(investment_type_id, broker_id, nature, value, date, description)
             VALUES (?1,?2,?3,?4,?5,?6)",
            params![
                new.investment_type_id,
                new.broker_id,
                new.nature.as_str(),
                new.value.to_string(),
                new.date.to_string(),
                new.description
            ],
        )?;
        Ok(InvestmentMovement {
            id: self.conn.last_insert_rowid(),
            investment_type_id: new.investment_type_id,
            broker_id: new.broker_id,
            nature: new.nature,
            value: new.value,
            date: new.date,
            description: new.description.clone(),
        })
    }

    fn delete_movement(&self, id: i64) -> StoreResult<()> {
        let n = self
            .conn
            .execute("DELETE FROM investment_movement WHERE id=?1", params![id])?;
        self.expect_changed(n, "investment_movement", id)
    }
}

impl ReportRepository for SqliteStore {
    /// The hosted backend serves this from a view; locally the sums are done
    /// in decimal after the join so no precision is lost to SQLite REAL.
    fn value_by_nature_month(&self, year: Option<i32>) -> StoreResult<Vec<NatureMonthTotal>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT n.id, n.name, t.created_at, t.value
               FROM "transaction" t
               JOIN class c ON t.class_id=c.id
               JOIN type ty ON c.type_id=ty.id
               JOIN nature n ON ty.nature_id=n.id"#,
        )?;
        let rows = stmt.query_map([], |r| {
            Ok((
                r.get::<_, i64>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, String>(2)?,
                r.get::<_, String>(3)?,
            ))
        })?;
        let mut items = Vec::new();
        for row in rows {
            let (nature_id, nature, created_at, value) = row?;
            let at = ts(&created_at)?;
            if year.is_some_and(|y| y != at.year()) {
                continue;
            }
            items.push(((at.year(), at.month(), nature_id, nature), dec(&value)?));
        }
        let sums = group_sum(&items, |(k, _)| k.clone(), |(_, v)| *v);
        Ok(sums
            .into_iter()
            .map(|((year, month, nature_id, nature), value)| NatureMonthTotal {
                nature_id,
                nature,
                year,
                month,
                value,
            })
            .collect())
    }
}
