pub mod record;

use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::aggregate;
pub use record::{FieldError, TrackRecord};
use record::RawRow;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read CSV from {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("no usable rows in {path} ({skipped} skipped)")]
    Empty { path: PathBuf, skipped: usize },
}

pub type Result<T> = std::result::Result<T, LoadError>;

/// Counts from one load.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: usize,
}

/// The loaded dataset. Read-only after construction; views borrow it freely.
#[derive(Debug, Clone, Default)]
pub struct RowStore {
    tracks: Vec<TrackRecord>,
}

impl RowStore {
    pub fn from_records(tracks: Vec<TrackRecord>) -> Self {
        Self { tracks }
    }

    /// Load a headered CSV file.
    pub fn load(path: &Path) -> Result<(Self, LoadReport)> {
        let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let (store, report) = Self::from_reader(file, path)?;
        log::info!(
            "Loaded {} tracks from {} ({} skipped)",
            report.loaded,
            path.display(),
            report.skipped
        );
        Ok((store, report))
    }

    /// Read rows from any reader. `origin` is only used in error messages.
    ///
    /// Rows are read as raw bytes and decoded one at a time, so a row with a
    /// bad encoding is skipped like any other malformed row. Only failures of
    /// the underlying reader are fatal.
    pub fn from_reader<R: Read>(reader: R, origin: &Path) -> Result<(Self, LoadReport)> {
        let csv_error = |source| LoadError::Csv {
            path: origin.to_path_buf(),
            source,
        };

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .flexible(true)
            .from_reader(reader);
        let headers = rdr.byte_headers().map_err(csv_error)?.clone();

        let mut tracks = Vec::new();
        let mut report = LoadReport::default();
        let mut record = csv::ByteRecord::new();

        while rdr.read_byte_record(&mut record).map_err(csv_error)? {
            let line = record.position().map_or(0, |p| p.line());
            let parsed = record
                .deserialize::<RawRow>(Some(&headers))
                .map_err(|e| e.to_string())
                .and_then(|raw| TrackRecord::try_from(raw).map_err(|e| e.to_string()));
            match parsed {
                Ok(t) => tracks.push(t),
                Err(e) => {
                    log::warn!("{}: skipping line {}: {}", origin.display(), line, e);
                    report.skipped += 1;
                }
            }
        }

        report.loaded = tracks.len();
        if tracks.is_empty() {
            return Err(LoadError::Empty {
                path: origin.to_path_buf(),
                skipped: report.skipped,
            });
        }

        Ok((Self { tracks }, report))
    }

    pub fn tracks(&self) -> &[TrackRecord] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Distinct artist names in first-appearance order.
    pub fn artists(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.tracks
            .iter()
            .map(|t| t.artist_name.as_str())
            .filter(|name| seen.insert(*name))
            .collect()
    }

    /// Primary genres with their track counts, most common first.
    pub fn primary_genres(&self) -> Vec<(String, usize)> {
        aggregate::count_by(&self.tracks, TrackRecord::primary_genre)
    }
}
