//! Top-N bar chart whose grouping follows the clicked node.

use serde::Serialize;

use crate::aggregate::{AggregateError, Result, top_by_metric, top_rows};
use crate::config::DashboardConfig;
use crate::selection::SelectionState;
use crate::store::TrackRecord;

use super::filter_rows;

/// Follower thresholds of the bar colour scale.
const FOLLOWER_THRESHOLDS: [f64; 4] = [100_000_000.0, 110_000_000.0, 120_000_000.0, 130_000_000.0];

/// Colour band of a bar. Follower rankings are banded by count; popularity
/// bars are always `Base`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowerBand {
    Base,
    Under100M,
    From100M,
    From110M,
    From120M,
    From130M,
}

impl FollowerBand {
    pub fn of(followers: f64) -> Self {
        match FOLLOWER_THRESHOLDS.iter().filter(|&&t| followers >= t).count() {
            0 => Self::Under100M,
            1 => Self::From100M,
            2 => Self::From110M,
            3 => Self::From120M,
            _ => Self::From130M,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Self::Base => "#69b3a2",
            Self::Under100M => "#deebf7",
            Self::From100M => "#9eb8d1",
            Self::From110M => "#6d9eba",
            Self::From120M => "#3f7dba",
            Self::From130M => "#12538c",
        }
    }
}

/// Which ranking the node selection asked for.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RankingMode {
    TopArtists,
    TopArtistsInGenre { genre: String },
    TopTracksOfArtist { artist: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    pub band: FollowerBand,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingView {
    pub mode: RankingMode,
    pub bars: Vec<Bar>,
    /// Largest value, for the x axis domain.
    pub max_value: f64,
}

fn follower_bar((label, value): (String, f64)) -> Bar {
    Bar {
        display: format!("{:.1}M", value / 1_000_000.0),
        band: FollowerBand::of(value),
        label,
        value,
    }
}

fn popularity_bar((label, value): (String, f64)) -> Bar {
    Bar {
        display: format!("{value:.0}"),
        band: FollowerBand::Base,
        label,
        value,
    }
}

pub fn derive(rows: &[TrackRecord], selection: &SelectionState, config: &DashboardConfig) -> Result<RankingView> {
    let filtered = filter_rows(rows, selection);
    let n = config.top_n;

    let (mode, bars): (RankingMode, Vec<Bar>) = if let Some(artist) = selection.selected_artist() {
        // One bar per track; unnamed tracks are labelled by their position
        // in the artist's rows so they never merge
        let bars: Vec<Bar> = top_rows(&filtered, |t| t.track_popularity as f64, n)
            .into_iter()
            .map(|(i, t)| {
                let label = t.track_name.clone().unwrap_or_else(|| format!("Track {}", i + 1));
                popularity_bar((label, t.track_popularity as f64))
            })
            .collect();
        (RankingMode::TopTracksOfArtist { artist: artist.to_string() }, bars)
    } else {
        let ranked = top_by_metric(&filtered, |t| t.artist_name.clone(), |t| t.artist_followers as f64, n);
        let mode = match selection.selected_genre_node() {
            Some(genre) => RankingMode::TopArtistsInGenre { genre: genre.to_string() },
            None => RankingMode::TopArtists,
        };
        (mode, ranked.into_iter().map(follower_bar).collect())
    };

    if bars.is_empty() {
        return Err(AggregateError::EmptyInput { what: "ranking" });
    }

    let max_value = bars.iter().map(|b| b.value).fold(f64::MIN, f64::max);
    Ok(RankingView { mode, bars, max_value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::NodeKind;
    use crate::views::fixtures::{rows, track};

    fn labels(view: &RankingView) -> Vec<&str> {
        view.bars.iter().map(|b| b.label.as_str()).collect()
    }

    #[test]
    fn test_idle_ranks_artists_by_mean_followers() {
        let view = derive(&rows(), &SelectionState::new(), &DashboardConfig::default()).unwrap();
        assert_eq!(view.mode, RankingMode::TopArtists);
        assert_eq!(
            labels(&view),
            vec!["Ed Sheeran", "Taylor Swift", "Drake", "Kendrick Lamar", "Nobody"]
        );
        assert_eq!(view.bars[0].display, "115.0M");
        assert_eq!(view.bars[0].band, FollowerBand::From110M);
        assert_eq!(view.max_value, 115_000_000.0);
    }

    #[test]
    fn test_scenario_mean_followers() {
        let rows = vec![
            track("a1", "A", 50, 1000, 100, ""),
            track("a2", "A", 50, 1000, 200, ""),
            track("b1", "B", 50, 1000, 50, ""),
            track("a3", "A", 50, 1000, 300, ""),
            track("b2", "B", 50, 1000, 60, ""),
        ];
        let config = DashboardConfig { top_n: 2, ..DashboardConfig::default() };
        let view = derive(&rows, &SelectionState::new(), &config).unwrap();
        let got: Vec<_> = view.bars.iter().map(|b| (b.label.as_str(), b.value)).collect();
        assert_eq!(got, vec![("A", 200.0), ("B", 55.0)]);
    }

    #[test]
    fn test_artist_selection_ranks_tracks_by_popularity() {
        let mut s = SelectionState::new();
        s.click("Taylor Swift", NodeKind::Artist);
        let view = derive(&rows(), &s, &DashboardConfig::default()).unwrap();
        assert_eq!(view.mode, RankingMode::TopTracksOfArtist { artist: "Taylor Swift".into() });
        assert_eq!(labels(&view), vec!["Cruel Summer", "Anti-Hero"]);
        assert_eq!(view.bars[0].display, "95");
        assert_eq!(view.bars[0].band, FollowerBand::Base);
    }

    #[test]
    fn test_unnamed_tracks_get_their_own_bars() {
        let rows: Vec<TrackRecord> = [90, 10, 50]
            .into_iter()
            .map(|pop| TrackRecord { track_name: None, ..track("", "A", pop, 200_000, 1_000, "['pop']") })
            .collect();
        let mut s = SelectionState::new();
        s.click("A", NodeKind::Artist);
        let view = derive(&rows, &s, &DashboardConfig::default()).unwrap();
        let got: Vec<_> = view.bars.iter().map(|b| (b.label.as_str(), b.value)).collect();
        assert_eq!(got, vec![("Track 1", 90.0), ("Track 3", 50.0), ("Track 2", 10.0)]);
    }

    #[test]
    fn test_same_title_tracks_are_not_averaged() {
        let rows = vec![
            track("Intro", "A", 80, 200_000, 1_000, ""),
            track("Intro", "A", 20, 200_000, 1_000, ""),
        ];
        let mut s = SelectionState::new();
        s.click("A", NodeKind::Artist);
        let view = derive(&rows, &s, &DashboardConfig::default()).unwrap();
        let values: Vec<f64> = view.bars.iter().map(|b| b.value).collect();
        assert_eq!(values, vec![80.0, 20.0]);
    }

    #[test]
    fn test_genre_selection_ranks_artists_within_genre() {
        let mut s = SelectionState::new();
        s.click("rap", NodeKind::Genre);
        let view = derive(&rows(), &s, &DashboardConfig::default()).unwrap();
        assert_eq!(view.mode, RankingMode::TopArtistsInGenre { genre: "rap".into() });
        assert_eq!(labels(&view), vec!["Drake", "Kendrick Lamar"]);
    }

    #[test]
    fn test_top_n_truncates() {
        let config = DashboardConfig { top_n: 2, ..DashboardConfig::default() };
        let view = derive(&rows(), &SelectionState::new(), &config).unwrap();
        assert_eq!(view.bars.len(), 2);
    }

    #[test]
    fn test_no_rows_is_empty_input() {
        let mut s = SelectionState::new();
        s.click("Nobody Else", NodeKind::Artist);
        assert_eq!(
            derive(&rows(), &s, &DashboardConfig::default()),
            Err(AggregateError::EmptyInput { what: "ranking" })
        );
    }

    #[test]
    fn test_follower_bands() {
        assert_eq!(FollowerBand::of(99_999_999.0), FollowerBand::Under100M);
        assert_eq!(FollowerBand::of(100_000_000.0), FollowerBand::From100M);
        assert_eq!(FollowerBand::of(125_000_000.0), FollowerBand::From120M);
        assert_eq!(FollowerBand::of(200_000_000.0), FollowerBand::From130M);
        assert_eq!(FollowerBand::From130M.color(), "#12538c");
        assert_ne!(FollowerBand::Base.color(), FollowerBand::Under100M.color());
    }
}
