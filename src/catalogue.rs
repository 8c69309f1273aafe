// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Movie catalogue lookups (OMDb-style API). A miss is reported by the API
//! as `"Response": "False"` with a 200 status. Transport and decode failures
//! are logged and treated the same as a miss.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ValidationError;
use crate::models::{Movie, WatchStatus};
use crate::utils::http_client;

static CATALOGUE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^tt\d{7,}$").expect("valid catalogue id pattern"));

pub fn validate_id(id: &str) -> Result<String, ValidationError> {
    let id = id.trim();
    if CATALOGUE_ID.is_match(id) {
        Ok(id.to_string())
    } else {
        Err(ValidationError::InvalidCatalogueId(id.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogueEntry {
    pub id: String,
    pub title: String,
    pub year: Option<String>,
    pub poster: Option<String>,
    pub genre: Option<String>,
    pub actors: Option<String>,
    pub plot: Option<String>,
    pub rating: Option<String>,
}

impl CatalogueEntry {
    pub fn into_movie(self) -> Movie {
        Movie {
            id: self.id,
            title: self.title,
            year: self.year,
            poster: self.poster,
            genre: self.genre,
            status: WatchStatus::ToWatch,
            rating: None,
            watched_dates: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub title: String,
    pub year: Option<String>,
    pub poster: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TitleBody {
    response: String,
    title: Option<String>,
    year: Option<String>,
    poster: Option<String>,
    genre: Option<String>,
    actors: Option<String>,
    plot: Option<String>,
    #[serde(rename = "imdbRating")]
    imdb_rating: Option<String>,
    #[serde(rename = "imdbID")]
    imdb_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SearchBody {
    response: String,
    #[serde(default)]
    search: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SearchItem {
    title: String,
    year: Option<String>,
    poster: Option<String>,
    #[serde(rename = "imdbID")]
    imdb_id: String,
}

/// The API fills unknown fields with "N/A".
fn known(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.is_empty() && s != "N/A")
}

fn found(response: &str) -> bool {
    response.eq_ignore_ascii_case("true")
}

pub fn decode_title(body: &str) -> Option<CatalogueEntry> {
    let parsed: TitleBody = match serde_json::from_str(body) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "undecodable catalogue reply");
            return None;
        }
    };
    if !found(&parsed.response) {
        return None;
    }
    Some(CatalogueEntry {
        id: parsed.imdb_id?,
        title: parsed.title?,
        year: known(parsed.year),
        poster: known(parsed.poster),
        genre: known(parsed.genre),
        actors: known(parsed.actors),
        plot: known(parsed.plot),
        rating: known(parsed.imdb_rating),
    })
}

pub fn decode_search(body: &str) -> Vec<SearchHit> {
    let parsed: SearchBody = match serde_json::from_str(body) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "undecodable catalogue search reply");
            return Vec::new();
        }
    };
    if !found(&parsed.response) {
        return Vec::new();
    }
    parsed
        .search
        .into_iter()
        .map(|item| SearchHit {
            id: item.imdb_id,
            title: item.title,
            year: known(item.year),
            poster: known(item.poster),
        })
        .collect()
}

pub struct CatalogueClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl CatalogueClient {
    pub fn new(base_url: &str, api_key: &str) -> reqwest::Result<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn fetch(&self, params: &[(&str, &str)]) -> Option<String> {
        let result = self
            .client
            .get(&self.base_url)
            .query(&[("apikey", self.api_key.as_str())])
            .query(params)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text());
        match result {
            Ok(body) => Some(body),
            Err(e) => {
                warn!(error = %e, "catalogue request failed");
                None
            }
        }
    }

    pub fn lookup(&self, id: &str) -> Option<CatalogueEntry> {
        debug!(id, "catalogue lookup");
        let body = self.fetch(&[("i", id), ("plot", "short")])?;
        decode_title(&body)
    }

    pub fn search(&self, title: &str) -> Vec<SearchHit> {
        debug!(title, "catalogue search");
        match self.fetch(&[("s", title), ("type", "movie")]) {
            Some(body) => decode_search(&body),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_reply_is_mapped_and_na_dropped() {
        let body = r#"{"Title":"The Shawshank Redemption","Year":"1994","Genre":"Drama",
            "Actors":"Tim Robbins, Morgan Freeman","Plot":"Two imprisoned men bond.",
            "Poster":"N/A","imdbRating":"9.3","imdbID":"tt0111161","Response":"True"}"#;
        let entry = decode_title(body).unwrap();
        assert_eq!(entry.id, "tt0111161");
        assert_eq!(entry.year.as_deref(), Some("1994"));
        assert_eq!(entry.poster, None);
        assert_eq!(entry.rating.as_deref(), Some("9.3"));
        let movie = entry.into_movie();
        assert_eq!(movie.status, WatchStatus::ToWatch);
        assert!(movie.watched_dates.is_empty());
    }

    #[test]
    fn not_found_flag_is_a_miss() {
        assert_eq!(
            decode_title(r#"{"Response":"False","Error":"Incorrect IMDb ID."}"#),
            None
        );
        assert!(decode_search(r#"{"Response":"False","Error":"Movie not found!"}"#).is_empty());
    }

    #[test]
    fn garbage_is_a_miss() {
        assert_eq!(decode_title("<html>"), None);
        assert!(decode_search("").is_empty());
    }

    #[test]
    fn search_hits_keep_order() {
        let body = r#"{"Search":[
            {"Title":"Alien","Year":"1979","imdbID":"tt0078748","Type":"movie","Poster":"N/A"},
            {"Title":"Aliens","Year":"1986","imdbID":"tt0090605","Type":"movie","Poster":"https://img/x.jpg"}
        ],"totalResults":"2","Response":"True"}"#;
        let hits = decode_search(body);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "tt0078748");
        assert_eq!(hits[1].poster.as_deref(), Some("https://img/x.jpg"));
    }

    #[test]
    fn ids_are_checked() {
        assert_eq!(validate_id(" tt0111161 ").unwrap(), "tt0111161");
        assert!(validate_id("0111161").is_err());
    }
}
