//! Parallel-coordinates profile: a sample of tracks across popularity and
//! reach axes, tiered by popularity percentile, plus the median line.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::aggregate::{Result, median, quantile};
use crate::config::DashboardConfig;
use crate::scale::{LinearScale, LogScale};
use crate::selection::SelectionState;
use crate::store::TrackRecord;

use super::filter_rows;

/// Follower axis bounds; counts outside are pinned to the ends.
const FOLLOWER_DOMAIN: (f64, f64) = (1e5, 2e8);

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    TrackPopularity,
    ArtistPopularity,
    ArtistFollowers,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::TrackPopularity, Axis::ArtistPopularity, Axis::ArtistFollowers];

    pub fn label(&self) -> &'static str {
        match self {
            Self::TrackPopularity => "Track Popularity",
            Self::ArtistPopularity => "Artist Popularity",
            Self::ArtistFollowers => "Artist Followers",
        }
    }

    pub fn value(&self, t: &TrackRecord) -> f64 {
        match self {
            Self::TrackPopularity => t.track_popularity as f64,
            Self::ArtistPopularity => t.artist_popularity as f64,
            Self::ArtistFollowers => t.artist_followers as f64,
        }
    }

    /// Position on the axis in `[0, 1]`, 0 at the bottom.
    pub fn position(&self, v: f64) -> f64 {
        match self {
            Self::TrackPopularity | Self::ArtistPopularity => {
                LinearScale::new((0.0, 100.0), (0.0, 1.0)).clamped().apply(v)
            }
            Self::ArtistFollowers => LogScale::new(FOLLOWER_DOMAIN, (0.0, 1.0)).apply(v),
        }
    }
}

/// Popularity tier of one line, by the sample's own percentiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PopularityTier {
    Base,
    /// At or above the 75th percentile.
    High,
    /// At or above the 90th percentile.
    Top,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileLine {
    pub artist: String,
    pub values: [f64; 3],
    pub positions: [f64; 3],
    pub tier: PopularityTier,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileView {
    pub axes: [Axis; 3],
    pub lines: Vec<ProfileLine>,
    pub p75: f64,
    pub p90: f64,
    pub median: [f64; 3],
    pub median_positions: [f64; 3],
}

fn sample<'a>(rows: Vec<&'a TrackRecord>, size: usize, seed: u64) -> Vec<&'a TrackRecord> {
    if rows.len() <= size {
        return rows;
    }
    let mut rng = StdRng::seed_from_u64(seed);
    rows.choose_multiple(&mut rng, size).copied().collect()
}

pub fn derive(rows: &[TrackRecord], selection: &SelectionState, config: &DashboardConfig) -> Result<ProfileView> {
    let sampled = sample(filter_rows(rows, selection), config.profile_sample_size, config.sample_seed);

    let popularity: Vec<f64> = sampled.iter().map(|t| t.track_popularity as f64).collect();
    let p75 = quantile(&popularity, 0.75)?;
    let p90 = quantile(&popularity, 0.9)?;

    let mut median_values = [0.0; 3];
    for (i, axis) in Axis::ALL.iter().enumerate() {
        let values: Vec<f64> = sampled.iter().map(|t| axis.value(t)).collect();
        median_values[i] = median(&values)?;
    }

    let lines = sampled
        .iter()
        .map(|t| {
            let values = Axis::ALL.map(|a| a.value(t));
            let positions = Axis::ALL.map(|a| a.position(a.value(t)));
            let pop = t.track_popularity as f64;
            let tier = if pop >= p90 {
                PopularityTier::Top
            } else if pop >= p75 {
                PopularityTier::High
            } else {
                PopularityTier::Base
            };
            ProfileLine { artist: t.artist_name.clone(), values, positions, tier }
        })
        .collect();

    let mut median_positions = [0.0; 3];
    for (i, axis) in Axis::ALL.iter().enumerate() {
        median_positions[i] = axis.position(median_values[i]);
    }

    Ok(ProfileView {
        axes: Axis::ALL,
        lines,
        p75,
        p90,
        median: median_values,
        median_positions,
    })
}
