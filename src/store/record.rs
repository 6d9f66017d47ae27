use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::genre;

/// A field that could not be turned into its typed value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error("missing required field `{0}`")]
    Missing(&'static str),
    #[error("field `{field}` is not a valid number: {value:?}")]
    NotANumber { field: &'static str, value: String },
    #[error("field `{field}` out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

/// One song entry of the dataset. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackRecord {
    /// Only some dataset revisions carry a track title.
    pub track_name: Option<String>,
    pub track_popularity: u8,
    pub track_duration_ms: u64,
    pub artist_name: String,
    pub artist_popularity: u8,
    pub artist_followers: u64,
    /// Free-text list as stored in the source, e.g. `['pop', 'rap']`.
    pub artist_genres: Option<String>,
}

impl TrackRecord {
    pub fn primary_genre(&self) -> String {
        genre::primary_genre(self.artist_genres.as_deref())
    }

    pub fn genres(&self) -> Vec<String> {
        genre::parse_genres(self.artist_genres.as_deref())
    }

    pub fn has_genre(&self, g: &str) -> bool {
        genre::has_genre(self.artist_genres.as_deref(), g)
    }

    pub fn duration_minutes(&self) -> f64 {
        self.track_duration_ms as f64 / 60_000.0
    }
}

/// Row exactly as read from the CSV: everything optional text, so a bad
/// cell costs one row instead of the whole file.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawRow {
    #[serde(default)]
    pub track_name: Option<String>,
    pub track_popularity: Option<String>,
    pub track_duration_ms: Option<String>,
    pub artist_name: Option<String>,
    pub artist_popularity: Option<String>,
    pub artist_followers: Option<String>,
    #[serde(default)]
    pub artist_genres: Option<String>,
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Parse a numeric cell. Accepts integer or float text ("72", "72.0", "1.2e8").
fn number(field: &'static str, raw: Option<&str>) -> Result<f64, FieldError> {
    let text = raw.map(str::trim).filter(|s| !s.is_empty()).ok_or(FieldError::Missing(field))?;
    let v: f64 = text.parse().map_err(|_| FieldError::NotANumber {
        field,
        value: text.to_string(),
    })?;
    if !v.is_finite() {
        return Err(FieldError::NotANumber { field, value: text.to_string() });
    }
    Ok(v)
}

fn popularity(field: &'static str, raw: Option<&str>) -> Result<u8, FieldError> {
    let v = number(field, raw)?;
    if !(0.0..=100.0).contains(&v) {
        return Err(FieldError::OutOfRange { field, value: v });
    }
    Ok(v.round() as u8)
}

fn count(field: &'static str, raw: Option<&str>) -> Result<u64, FieldError> {
    let v = number(field, raw)?;
    if v < 0.0 {
        return Err(FieldError::OutOfRange { field, value: v });
    }
    Ok(v.round() as u64)
}

impl TryFrom<RawRow> for TrackRecord {
    type Error = FieldError;

    fn try_from(raw: RawRow) -> Result<Self, Self::Error> {
        let track_duration_ms = count("track_duration_ms", raw.track_duration_ms.as_deref())?;
        if track_duration_ms == 0 {
            return Err(FieldError::OutOfRange { field: "track_duration_ms", value: 0.0 });
        }

        Ok(TrackRecord {
            track_popularity: popularity("track_popularity", raw.track_popularity.as_deref())?,
            track_duration_ms,
            artist_popularity: popularity("artist_popularity", raw.artist_popularity.as_deref())?,
            artist_followers: count("artist_followers", raw.artist_followers.as_deref())?,
            artist_name: non_blank(raw.artist_name).ok_or(FieldError::Missing("artist_name"))?,
            track_name: non_blank(raw.track_name),
            // Genre text is never rejected; the normalizer handles anything
            artist_genres: raw.artist_genres,
        })
    }
}
