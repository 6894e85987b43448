//! Wire representation of catalog search responses
//!
//! The catalog nests rating, votes, genres, and poster under their own
//! objects, and every field can be absent. Decoding is lenient: a document
//! without an id cannot be listed and is skipped, everything else degrades to
//! `None`/empty.

use marquee_core::{CatalogPage, MovieId, MovieSummary};
use serde::Deserialize;
use tracing::debug;
use url::Url;

#[derive(Debug, Deserialize)]
pub(crate) struct SearchEnvelope {
    #[serde(default)]
    pub docs: Vec<MovieDoc>,

    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MovieDoc {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub rating: Option<RatingDoc>,
    #[serde(rename = "movieLength")]
    pub movie_length: Option<u32>,
    pub votes: Option<VotesDoc>,
    #[serde(default)]
    pub genres: Option<Vec<GenreDoc>>,
    pub poster: Option<PosterDoc>,
    pub year: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RatingDoc {
    pub kp: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VotesDoc {
    pub kp: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenreDoc {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PosterDoc {
    pub url: Option<String>,
}

impl SearchEnvelope {
    pub(crate) fn into_page(self) -> CatalogPage {
        let mut movies = Vec::with_capacity(self.docs.len());
        for doc in self.docs {
            match doc.into_summary() {
                Some(movie) => movies.push(movie),
                None => debug!("skipping catalog entry without an id"),
            }
        }
        CatalogPage {
            movies,
            total: self.total,
        }
    }
}

impl MovieDoc {
    fn into_summary(self) -> Option<MovieSummary> {
        let id = MovieId(self.id?);
        Some(MovieSummary {
            id,
            title: self.name.unwrap_or_default(),
            rating_value: self.rating.and_then(|r| r.kp),
            duration_minutes: self.movie_length,
            vote_count: self.votes.and_then(|v| v.kp),
            genre_names: self
                .genres
                .unwrap_or_default()
                .into_iter()
                .filter_map(|g| g.name)
                .collect(),
            poster_url: self
                .poster
                .and_then(|p| p.url)
                .and_then(|u| Url::parse(&u).ok()),
            year: self.year,
        })
    }
}
