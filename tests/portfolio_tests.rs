// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use moneyboard::aggregate::{shares, sum_by_investment_type};
use moneyboard::commands::movies::{mark_watched, rate};
use moneyboard::error::ValidationError;
use moneyboard::models::{MovementNature, Movie, NewInvestmentMovement, WatchStatus};
use moneyboard::rentability::period_rentability;
use moneyboard::store::{InvestmentRepository, MovieRepository, Page, SqliteStore};
use rust_decimal::Decimal;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn movement(
    store: &SqliteStore,
    type_id: i64,
    nature: MovementNature,
    value: i64,
    date: NaiveDate,
) {
    store
        .insert_movement(&NewInvestmentMovement {
            investment_type_id: type_id,
            broker_id: None,
            nature,
            value: Decimal::from(value),
            date,
            description: None,
        })
        .unwrap();
}

#[test]
fn rentability_over_stored_movements() {
    let store = SqliteStore::open_in_memory().unwrap();
    let cdb = store.insert_investment_type("CDB", "#123456").unwrap();
    let stocks = store.insert_investment_type("Ações", "#654321").unwrap();
    movement(&store, cdb.id, MovementNature::Contribution, 1000, ymd(2024, 12, 1));
    movement(&store, cdb.id, MovementNature::Contribution, 500, ymd(2025, 1, 10));
    movement(&store, cdb.id, MovementNature::Yield, 30, ymd(2025, 1, 31));
    movement(&store, cdb.id, MovementNature::Withdrawal, 100, ymd(2025, 2, 1));
    movement(&store, stocks.id, MovementNature::Contribution, 999, ymd(2025, 1, 5));

    let cdb_moves = store.list_movements(Some(cdb.id), &Page::default()).unwrap();
    assert_eq!(cdb_moves.len(), 4);
    let r = period_rentability(&cdb_moves, ymd(2025, 1, 1), ymd(2025, 2, 28));
    assert_eq!(r.initial, Decimal::from(1000));
    assert_eq!(r.contributions, Decimal::from(500));
    assert_eq!(r.withdrawals, Decimal::from(100));
    assert_eq!(r.final_value, Decimal::from(1430));
    // (1430 - 1000 - 500 + 100) / 1500
    assert_eq!(r.rentability, Some(Decimal::from(2)));
}

#[test]
fn summary_names_each_investment_type() {
    let store = SqliteStore::open_in_memory().unwrap();
    let cdb = store.insert_investment_type("CDB", "#123456").unwrap();
    let stocks = store.insert_investment_type("Ações", "#654321").unwrap();
    movement(&store, cdb.id, MovementNature::Contribution, 300, ymd(2025, 1, 1));
    movement(&store, stocks.id, MovementNature::Contribution, 100, ymd(2025, 1, 1));

    let all = store.list_movements(None, &Page::default()).unwrap();
    let types = store.list_investment_types().unwrap();
    let out = shares(&sum_by_investment_type(&all), |id| {
        types.iter().find(|t| t.id == id).map(|t| t.name.clone())
    });
    assert_eq!(out[0].name, "CDB");
    assert_eq!(out[0].percent, Decimal::from(75));
    assert_eq!(out[1].name, "Ações");
}

#[test]
fn watching_and_rating_a_movie_round_trips() {
    let store = SqliteStore::open_in_memory().unwrap();
    let mut movie = store
        .insert_movie(&Movie {
            id: "tt0111161".into(),
            title: "The Shawshank Redemption".into(),
            year: Some("1994".into()),
            poster: None,
            genre: Some("Drama".into()),
            status: WatchStatus::ToWatch,
            rating: None,
            watched_dates: Vec::new(),
        })
        .unwrap();

    mark_watched(&mut movie, ymd(2025, 3, 2));
    mark_watched(&mut movie, ymd(2025, 1, 9));
    mark_watched(&mut movie, ymd(2025, 3, 2));
    rate(&mut movie, 9).unwrap();
    assert_eq!(rate(&mut movie, 11), Err(ValidationError::InvalidRating(11)));
    store.update_movie(&movie).unwrap();

    let saved = store.get_movie("tt0111161").unwrap().unwrap();
    assert_eq!(saved.status, WatchStatus::Watched);
    assert_eq!(saved.rating, Some(9));
    assert_eq!(saved.watched_dates, [ymd(2025, 1, 9), ymd(2025, 3, 2)]);
    assert_eq!(
        store
            .list_movies(Some(WatchStatus::ToWatch), &Page::default())
            .unwrap()
            .len(),
        0
    );
}

#[test]
fn watching_orders_dates_stored_out_of_order() {
    let mut movie = Movie {
        id: "tt0068646".into(),
        title: "The Godfather".into(),
        year: Some("1972".into()),
        poster: None,
        genre: None,
        status: WatchStatus::ToWatch,
        rating: None,
        watched_dates: vec![ymd(2025, 5, 1), ymd(2024, 2, 3), ymd(2025, 5, 1)],
    };
    mark_watched(&mut movie, ymd(2024, 8, 20));
    mark_watched(&mut movie, ymd(2024, 2, 3));
    assert_eq!(
        movie.watched_dates,
        [ymd(2024, 2, 3), ymd(2024, 8, 20), ymd(2025, 5, 1)]
    );
    assert_eq!(movie.status, WatchStatus::Watched);
}
