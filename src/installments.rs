// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Monthly installment plans derived from a recurring template's creation
//! date and validity end date.

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;
use thiserror::Error;

use crate::error::ValidationError;
use crate::models::RecurringTransaction;

pub const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// Returned instead of a plan when the template has no validity date.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("no validity date, not an installment plan")]
pub struct NotAPlan;

impl From<NotAPlan> for ValidationError {
    fn from(_: NotAPlan) -> Self {
        ValidationError::NotAPlan
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Installment {
    /// 1-based position in the plan.
    pub number: u32,
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub due: NaiveDate,
}

/// A finite run of calendar months. Cheap to copy; every call to
/// [`InstallmentPlan::iter`] starts from the first installment again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallmentPlan {
    start: NaiveDate,
    count: u32,
}

pub fn installments(
    created_at: NaiveDate,
    validity: Option<NaiveDate>,
) -> Result<InstallmentPlan, NotAPlan> {
    let end = validity.ok_or(NotAPlan)?;
    let span = month_index(end) - month_index(created_at) + 1;
    Ok(InstallmentPlan {
        start: created_at,
        count: span.max(0) as u32,
    })
}

impl RecurringTransaction {
    /// Months are counted from the UTC calendar date of `created_at`.
    pub fn plan(&self) -> Result<InstallmentPlan, NotAPlan> {
        installments(self.created_at.date_naive(), self.validity)
    }
}

pub fn month_label(year: i32, month: u32) -> String {
    let idx = (month.clamp(1, 12) - 1) as usize;
    format!("{}/{}", MONTH_NAMES[idx], year)
}

fn month_index(d: NaiveDate) -> i64 {
    d.year() as i64 * 12 + d.month0() as i64
}

impl InstallmentPlan {
    pub fn len(&self) -> usize {
        self.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn contains(&self, number: u32) -> bool {
        number >= 1 && number <= self.count
    }

    pub fn get(&self, number: u32) -> Option<Installment> {
        if !self.contains(number) {
            return None;
        }
        let idx = month_index(self.start) + (number - 1) as i64;
        let year = idx.div_euclid(12) as i32;
        let month = idx.rem_euclid(12) as u32 + 1;
        let due = self
            .start
            .checked_add_months(Months::new(number - 1))
            .unwrap_or(NaiveDate::MAX);
        Some(Installment {
            number,
            year,
            month,
            label: month_label(year, month),
            due,
        })
    }

    pub fn iter(&self) -> Installments {
        Installments {
            plan: *self,
            next: 1,
        }
    }
}

impl IntoIterator for &InstallmentPlan {
    type Item = Installment;
    type IntoIter = Installments;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone)]
pub struct Installments {
    plan: InstallmentPlan,
    next: u32,
}

impl Iterator for Installments {
    type Item = Installment;

    fn next(&mut self) -> Option<Installment> {
        let item = self.plan.get(self.next)?;
        self.next += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.plan.count + 1).saturating_sub(self.next) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Installments {}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn three_months_inclusive() {
        let plan = installments(d(2024, 1, 15), Some(d(2024, 3, 15))).unwrap();
        let labels: Vec<String> = plan.iter().map(|i| i.label).collect();
        assert_eq!(labels, ["Janeiro/2024", "Fevereiro/2024", "Março/2024"]);
        assert_eq!(plan.len(), 3);
    }

    #[test]
    fn counts_month_boundaries_not_thirty_day_steps() {
        // 2024-01-31 -> 2024-02-01 is two days but two calendar months.
        let plan = installments(d(2024, 1, 31), Some(d(2024, 2, 1))).unwrap();
        assert_eq!(plan.len(), 2);
        let due: Vec<NaiveDate> = plan.iter().map(|i| i.due).collect();
        assert_eq!(due, [d(2024, 1, 31), d(2024, 2, 29)]);
    }

    #[test]
    fn spans_year_end() {
        let plan = installments(d(2023, 11, 2), Some(d(2024, 2, 1))).unwrap();
        let last = plan.iter().last().unwrap();
        assert_eq!(last.number, 4);
        assert_eq!(last.label, "Fevereiro/2024");
    }

    #[test]
    fn validity_before_creation_is_empty() {
        let plan = installments(d(2024, 5, 1), Some(d(2024, 4, 30))).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.iter().count(), 0);
        assert!(!plan.contains(1));
    }

    #[test]
    fn template_plan_starts_in_the_utc_month() {
        use crate::models::Frequency;
        use chrono::{TimeZone, Utc};
        use rust_decimal::Decimal;

        let mut r = RecurringTransaction {
            id: 1,
            class_id: 1,
            value: Decimal::from(-100),
            description: "Aluguel".into(),
            frequency: Frequency::Monthly,
            created_at: Utc.with_ymd_and_hms(2024, 1, 31, 23, 30, 0).unwrap(),
            validity: Some(d(2024, 3, 31)),
            status: true,
            paid_parcels: Default::default(),
        };
        let first = r.plan().unwrap().iter().next().unwrap();
        assert_eq!(first.label, "Janeiro/2024");
        assert_eq!(r.plan().unwrap().len(), 3);

        // Still Jan 31 in UTC-3, but February in UTC.
        r.created_at = Utc.with_ymd_and_hms(2024, 2, 1, 1, 30, 0).unwrap();
        let first = r.plan().unwrap().iter().next().unwrap();
        assert_eq!(first.label, "Fevereiro/2024");
        assert_eq!(r.plan().unwrap().len(), 2);
    }

    #[test]
    fn missing_validity_is_not_a_plan() {
        assert_eq!(installments(d(2024, 5, 1), None), Err(NotAPlan));
    }

    #[test]
    fn iteration_restarts_and_is_exact_sized() {
        let plan = installments(d(2024, 1, 1), Some(d(2024, 12, 1))).unwrap();
        let mut it = plan.iter();
        it.next();
        assert_eq!(it.len(), 11);
        assert_eq!(plan.iter().next().unwrap().number, 1);
        assert_eq!((&plan).into_iter().count(), 12);
    }
}
