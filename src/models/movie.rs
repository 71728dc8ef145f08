use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A movie as served by the remote API.
///
/// Wire keys are capitalized (`Title`, `Year`, `DVD`, ...) with the camelCase
/// exceptions of `imdbRating`, `imdbVotes` and `imdbID`. `Rationales` is only
/// present on recommendation responses. Identity is the IMDB id alone, so two
/// fetches of the same title compare equal even if metadata drifted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Movie {
    pub title: String,
    pub year: String,
    pub rated: String,
    pub released: String,
    pub runtime: String,
    pub genre: String,
    pub director: String,
    pub writer: String,
    pub actors: String,
    pub plot: String,
    pub language: String,
    pub country: String,
    pub awards: String,
    pub poster: String,
    pub ratings: Vec<SourceRating>,
    pub metascore: String,
    #[serde(rename = "imdbRating")]
    pub imdb_rating: String,
    #[serde(rename = "imdbVotes")]
    pub imdb_votes: String,
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "DVD")]
    pub dvd: String,
    pub box_office: String,
    pub production: String,
    pub website: String,
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationales: Option<Vec<String>>,
}

impl PartialEq for Movie {
    fn eq(&self, other: &Self) -> bool {
        self.imdb_id == other.imdb_id
    }
}

impl Eq for Movie {}

impl Hash for Movie {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.imdb_id.hash(state);
    }
}

/// A third-party review score attached to a movie (e.g. Rotten Tomatoes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SourceRating {
    pub source: String,
    pub value: String,
}
