// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::aggregate::balance_at;
use crate::models::{InvestmentMovement, MovementNature};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodRentability {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub initial: Decimal,
    pub contributions: Decimal,
    pub withdrawals: Decimal,
    pub final_value: Decimal,
    /// Percent, `None` when nothing was invested.
    pub rentability: Option<Decimal>,
}

/// Return over a period in percent: gain net of money moved in and out,
/// relative to what was at work.
pub fn rentability(
    initial: Decimal,
    final_value: Decimal,
    contributions: Decimal,
    withdrawals: Decimal,
) -> Option<Decimal> {
    let base = initial + contributions;
    if base.is_zero() {
        return None;
    }
    let gain = final_value - initial - contributions + withdrawals;
    Some((gain / base * Decimal::ONE_HUNDRED).round_dp(2))
}

pub fn period_rentability(
    movements: &[InvestmentMovement],
    from: NaiveDate,
    to: NaiveDate,
) -> PeriodRentability {
    let initial = match from.checked_sub_signed(Duration::days(1)) {
        Some(before) => balance_at(movements, before),
        None => Decimal::ZERO,
    };
    let in_period = movements.iter().filter(|m| m.date >= from && m.date <= to);
    let mut contributions = Decimal::ZERO;
    let mut withdrawals = Decimal::ZERO;
    for m in in_period {
        match m.nature {
            MovementNature::Contribution => contributions += m.value,
            MovementNature::Withdrawal => withdrawals += m.value,
            MovementNature::Yield => {}
        }
    }
    let final_value = balance_at(movements, to);
    PeriodRentability {
        from,
        to,
        initial,
        contributions,
        withdrawals,
        final_value,
        rentability: rentability(initial, final_value, contributions, withdrawals),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(nature: MovementNature, value: i64, d: &str) -> InvestmentMovement {
        InvestmentMovement {
            id: 0,
            investment_type_id: 1,
            broker_id: None,
            nature,
            value: Decimal::from(value),
            date: NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap(),
            description: None,
        }
    }

    #[test]
    fn plain_growth() {
        let r = rentability(
            Decimal::from(1000),
            Decimal::from(1100),
            Decimal::ZERO,
            Decimal::ZERO,
        );
        assert_eq!(r, Some(Decimal::from(10)));
    }

    #[test]
    fn contributions_are_not_gains() {
        // 1000 at start, +500 contributed, worth 1560 at the end: 60 on 1500.
        let r = rentability(
            Decimal::from(1000),
            Decimal::from(1560),
            Decimal::from(500),
            Decimal::ZERO,
        );
        assert_eq!(r, Some(Decimal::from(4)));
    }

    #[test]
    fn nothing_invested_has_no_rentability() {
        assert_eq!(
            rentability(Decimal::ZERO, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
            None
        );
    }

    #[test]
    fn period_splits_history() {
        let moves = vec![
            mv(MovementNature::Contribution, 1000, "2023-12-01"),
            mv(MovementNature::Contribution, 500, "2024-01-10"),
            mv(MovementNature::Yield, 60, "2024-01-31"),
            mv(MovementNature::Withdrawal, 100, "2024-01-20"),
            mv(MovementNature::Yield, 999, "2024-02-15"),
        ];
        let p = period_rentability(
            &moves,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        );
        assert_eq!(p.initial, Decimal::from(1000));
        assert_eq!(p.contributions, Decimal::from(500));
        assert_eq!(p.withdrawals, Decimal::from(100));
        assert_eq!(p.final_value, Decimal::from(1460));
        // gain = 1460 - 1000 - 500 + 100 = 60 on 1500
        assert_eq!(p.rentability, Some(Decimal::from(4)));
    }
}
