// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{json_flags, page_from};
use crate::catalogue::validate_id;
use crate::config::Config;
use crate::error::ValidationError;
use crate::models::{Movie, WatchStatus};
use crate::store::Store;
use crate::utils::{maybe_print_json, or_toast, parse_date, pretty_table};
use anyhow::{Result, anyhow};
use chrono::{NaiveDate, Utc};
use tracing::info;

pub const MAX_RATING: u8 = 10;

pub fn handle(store: &dyn Store, cfg: &Config, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("search", sub)) => {
            let (json, jsonl) = json_flags(sub);
            let title = sub.get_one::<String>("title").unwrap();
            let hits = cfg.catalogue()?.search(title);
            if !maybe_print_json(json, jsonl, &hits)? {
                let rows = hits
                    .into_iter()
                    .map(|h| vec![h.id, h.title, h.year.unwrap_or_default()])
                    .collect();
                println!("{}", pretty_table(&["ID", "Title", "Year"], rows));
            }
        }
        Some(("lookup", sub)) => {
            let (json, jsonl) = json_flags(sub);
            let id = validate_id(sub.get_one::<String>("id").unwrap())?;
            match cfg.catalogue()?.lookup(&id) {
                Some(entry) => {
                    if !maybe_print_json(json, jsonl, &entry)? {
                        let field = |v: &Option<String>| v.clone().unwrap_or_default();
                        let rows = vec![
                            vec!["Title".into(), entry.title.clone()],
                            vec!["Year".into(), field(&entry.year)],
                            vec!["Genre".into(), field(&entry.genre)],
                            vec!["Actors".into(), field(&entry.actors)],
                            vec!["Plot".into(), field(&entry.plot)],
                            vec!["Rating".into(), field(&entry.rating)],
                        ];
                        println!("{}", pretty_table(&["Field", "Value"], rows));
                    }
                }
                None => println!("No catalogue entry for {}", id),
            }
        }
        Some(("add", sub)) => {
            let id = validate_id(sub.get_one::<String>("id").unwrap())?;
            if store.get_movie(&id)?.is_some() {
                return Err(anyhow!("{} is already on the list", id));
            }
            let entry = cfg
                .catalogue()?
                .lookup(&id)
                .ok_or_else(|| anyhow!("No catalogue entry for {}", id))?;
            let movie = store.insert_movie(&entry.into_movie())?;
            info!(id = %movie.id, "movie added");
            println!("Added '{}' ({})", movie.title, movie.id);
        }
        Some(("list", sub)) => {
            let (json, jsonl) = json_flags(sub);
            let status = sub
                .get_one::<String>("status")
                .map(|s| s.parse::<WatchStatus>())
                .transpose()?;
            let movies = or_toast("list movies", store.list_movies(status, &page_from(sub)));
            if !maybe_print_json(json, jsonl, &movies)? {
                let rows = movies
                    .into_iter()
                    .map(|m| {
                        vec![
                            m.id,
                            m.title,
                            m.year.unwrap_or_default(),
                            m.status.as_str().replace('_', " "),
                            m.rating.map(|r| r.to_string()).unwrap_or_default(),
                            m.watched_dates
                                .last()
                                .map(|d| d.to_string())
                                .unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["ID", "Title", "Year", "Status", "Rating", "Last seen"], rows)
                );
            }
        }
        Some(("watch", sub)) => {
            let mut movie = find(store, sub)?;
            let date = match sub.get_one::<String>("date") {
                Some(d) => parse_date(d)?,
                None => Utc::now().date_naive(),
            };
            mark_watched(&mut movie, date);
            store.update_movie(&movie)?;
            println!(
                "Watched '{}' on {} ({} times)",
                movie.title,
                date,
                movie.watched_dates.len()
            );
        }
        Some(("rate", sub)) => {
            let mut movie = find(store, sub)?;
            let rating = *sub.get_one::<u8>("rating").unwrap();
            rate(&mut movie, rating)?;
            store.update_movie(&movie)?;
            println!("Rated '{}' {}/{}", movie.title, rating, MAX_RATING);
        }
        Some(("rm", sub)) => {
            let id = validate_id(sub.get_one::<String>("id").unwrap())?;
            store.delete_movie(&id)?;
            println!("Removed {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn find(store: &dyn Store, sub: &clap::ArgMatches) -> Result<Movie> {
    let id = validate_id(sub.get_one::<String>("id").unwrap())?;
    store
        .get_movie(&id)?
        .ok_or_else(|| anyhow!("{} is not on the list", id))
}

/// Records a viewing. Dates end up sorted; the same day is kept once.
pub fn mark_watched(movie: &mut Movie, date: NaiveDate) {
    movie.watched_dates.push(date);
    movie.watched_dates.sort_unstable();
    movie.watched_dates.dedup();
    movie.status = WatchStatus::Watched;
}

pub fn rate(movie: &mut Movie, rating: u8) -> Result<(), ValidationError> {
    if rating > MAX_RATING {
        return Err(ValidationError::InvalidRating(rating));
    }
    movie.rating = Some(rating);
    Ok(())
}
