// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt::Display;

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, NaiveDate, SecondsFormat, Utc};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use tracing::error;

use crate::error::ValidationError;

const UA: &str = concat!("moneyboard/", env!("CARGO_PKG_VERSION"));

static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("valid color pattern"));

pub fn http_client() -> reqwest::Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(15))
        .user_agent(UA)
        .build()
}

pub fn parse_date(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(s.trim().to_string()))
}

/// `YYYY-MM` to `(year, month)`.
pub fn parse_month(s: &str) -> Result<(i32, u32)> {
    let d = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))?;
    Ok((d.year(), d.month()))
}

/// First day of the month and first day of the following month.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .with_context(|| format!("Invalid month {}-{:02}", year, month))?;
    let (ny, nm) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let end = NaiveDate::from_ymd_opt(ny, nm, 1)
        .with_context(|| format!("Invalid month {}-{:02}", ny, nm))?;
    Ok((start, end))
}

pub fn parse_decimal(s: &str) -> Result<Decimal, ValidationError> {
    s.trim()
        .parse::<Decimal>()
        .map_err(|_| ValidationError::InvalidValue(s.trim().to_string()))
}

pub fn require<'a>(field: &'static str, v: Option<&'a String>) -> Result<&'a str, ValidationError> {
    match v.map(|s| s.trim()) {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(ValidationError::MissingField(field)),
    }
}

pub fn validate_color(s: &str) -> Result<String, ValidationError> {
    let s = s.trim();
    if HEX_COLOR.is_match(s) {
        Ok(s.to_lowercase())
    } else {
        Err(ValidationError::InvalidColor(s.to_string()))
    }
}

/// Timestamps are stored as RFC 3339 with a `Z` suffix so they sort as text.
pub fn fmt_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn parse_ts(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

pub fn start_of_day(d: NaiveDate) -> DateTime<Utc> {
    d.and_time(chrono::NaiveTime::MIN).and_utc()
}

pub fn fmt_money(d: &Decimal) -> String {
    format!("{:.2}", d.round_dp(2))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

/// Failed reads show the message and fall back to an empty view.
pub fn or_toast<T: Default, E: Display>(what: &str, res: Result<T, E>) -> T {
    match res {
        Ok(v) => v,
        Err(e) => {
            error!(what, error = %e, "backend call failed");
            eprintln!("error: {}", e);
            T::default()
        }
    }
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_is_normalised_and_checked() {
        assert_eq!(validate_color(" #A1B2C3 ").unwrap(), "#a1b2c3");
        assert!(matches!(
            validate_color("red"),
            Err(ValidationError::InvalidColor(_))
        ));
    }

    #[test]
    fn december_bounds_roll_into_next_year() {
        let (start, end) = month_bounds(2024, 12).unwrap();
        assert_eq!(start.to_string(), "2024-12-01");
        assert_eq!(end.to_string(), "2025-01-01");
    }

    #[test]
    fn timestamps_sort_as_text() {
        let a = parse_ts("2024-01-02T09:00:00+03:00").unwrap();
        assert_eq!(fmt_ts(&a), "2024-01-02T06:00:00Z");
        assert!(fmt_ts(&a) < fmt_ts(&start_of_day(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap())));
    }

    #[test]
    fn require_rejects_blank() {
        let blank = String::from("   ");
        assert_eq!(
            require("description", Some(&blank)),
            Err(ValidationError::MissingField("description"))
        );
        assert_eq!(require("description", None), Err(ValidationError::MissingField("description")));
    }

    #[test]
    fn or_toast_falls_back_to_default() {
        let v: Vec<i32> = or_toast("list", Err::<Vec<i32>, _>("boom"));
        assert!(v.is_empty());
    }
}
