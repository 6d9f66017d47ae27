//! Track duration vs. popularity, hex-binned for density.

use serde::Serialize;

use crate::aggregate::{AggregateError, Result};
use crate::config::DashboardConfig;
use crate::hexbin::HexBinner;
use crate::scale::LinearScale;
use crate::selection::SelectionState;
use crate::store::TrackRecord;

use super::filter_rows;

/// One occupied cell with its colour weight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityBin {
    pub x: f64,
    pub y: f64,
    pub count: usize,
    /// `count / max_count` over this view, in `(0, 1]`.
    pub density: f64,
}

impl DensityBin {
    pub fn tooltip(&self) -> String {
        format!("Tracks in bin: {}", self.count)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionView {
    pub radius: f64,
    /// Corner offsets for drawing a cell; matches the bucketing grid.
    pub hexagon: [(f64, f64); 6],
    pub x_scale: LinearScale,
    pub y_scale: LinearScale,
    pub bins: Vec<DensityBin>,
    pub max_count: usize,
    pub total: usize,
}

/// Map each row to its canvas position: duration (minutes, clamped) on x,
/// track popularity on y.
pub fn positions(rows: &[&TrackRecord], config: &DashboardConfig) -> (LinearScale, LinearScale, Vec<(f64, f64)>) {
    let x = LinearScale::new((0.0, config.max_duration_minutes), config.canvas.x_range()).clamped();
    let y = LinearScale::new((0.0, 100.0), config.canvas.y_range());
    let points = rows
        .iter()
        .map(|t| (x.apply(t.duration_minutes()), y.apply(t.track_popularity as f64)))
        .collect();
    (x, y, points)
}

pub fn derive(rows: &[TrackRecord], selection: &SelectionState, config: &DashboardConfig) -> Result<DistributionView> {
    let binner = HexBinner::new(config.hex_radius)?;
    let filtered = filter_rows(rows, selection);
    if filtered.is_empty() {
        return Err(AggregateError::EmptyInput { what: "distribution" });
    }

    let (x_scale, y_scale, points) = positions(&filtered, config);
    let bins = binner.bin(&points);
    // Non-empty input always yields at least one bin
    let max_count = bins.iter().map(|b| b.len()).max().unwrap_or(1);

    let bins = bins
        .into_iter()
        .map(|b| DensityBin {
            x: b.x,
            y: b.y,
            count: b.len(),
            density: b.len() as f64 / max_count as f64,
        })
        .collect();

    Ok(DistributionView {
        radius: binner.radius(),
        hexagon: binner.hexagon(),
        x_scale,
        y_scale,
        bins,
        max_count,
        total: filtered.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::NodeKind;
    use crate::views::fixtures::{rows, track};

    #[test]
    fn test_bins_conserve_rows() {
        let rows = rows();
        let view = derive(&rows, &SelectionState::new(), &DashboardConfig::default()).unwrap();
        assert_eq!(view.total, rows.len());
        assert_eq!(view.bins.iter().map(|b| b.count).sum::<usize>(), rows.len());
    }

    #[test]
    fn test_density_normalized_by_max_bin() {
        let rows = vec![
            track("a", "A", 50, 180_000, 1, "['pop']"),
            track("b", "A", 50, 180_000, 1, "['pop']"),
            track("c", "A", 50, 180_000, 1, "['pop']"),
            track("d", "B", 5, 400_000, 1, "['pop']"),
        ];
        let view = derive(&rows, &SelectionState::new(), &DashboardConfig::default()).unwrap();
        assert_eq!(view.max_count, 3);
        assert_eq!(view.bins.len(), 2);
        assert_eq!(view.bins[0].density, 1.0);
        assert!((view.bins[1].density - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(view.bins[0].tooltip(), "Tracks in bin: 3");
    }

    #[test]
    fn test_long_tracks_clamped_to_right_edge() {
        let config = DashboardConfig::default();
        let rows = vec![track("epic", "A", 0, 30 * 60_000, 1, "")];
        let refs: Vec<&TrackRecord> = rows.iter().collect();
        let (_, _, points) = positions(&refs, &config);
        assert_eq!(points[0], (870.0, 210.0));
    }

    #[test]
    fn test_filtered_to_nothing_is_empty_input() {
        let rows = rows();
        let mut s = SelectionState::new();
        s.click("Nobody", NodeKind::Artist);
        s.set_genre(Some("pop"));
        assert_eq!(
            derive(&rows, &s, &DashboardConfig::default()),
            Err(AggregateError::EmptyInput { what: "distribution" })
        );
    }

    #[test]
    fn test_bad_radius_is_reported() {
        let config = DashboardConfig { hex_radius: 0.0, ..DashboardConfig::default() };
        assert!(matches!(
            derive(&rows(), &SelectionState::new(), &config),
            Err(AggregateError::InvalidParameter(_))
        ));
    }
}
