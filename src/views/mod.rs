//! View derivers: pure functions from (rows, selection, config) to the
//! plain data a renderer draws. Nothing here touches a canvas.

pub mod distribution;
pub mod profile;
pub mod ranking;
pub mod relationship;

use serde::Serialize;

use crate::aggregate::AggregateError;
use crate::selection::SelectionState;
use crate::store::TrackRecord;

pub use distribution::DistributionView;
pub use profile::ProfileView;
pub use ranking::RankingView;
pub use relationship::RelationshipView;

/// What a renderer gets for one view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "view", rename_all = "snake_case")]
pub enum ViewState<T> {
    Ready(T),
    /// Nothing survived the filters; draw a "no data" placeholder.
    NoData,
    /// The dataset never loaded; draw a "failed to load" message.
    Failed(String),
}

impl<T> ViewState<T> {
    /// Fold a deriver result: empty input becomes the placeholder, any
    /// other aggregate error is shown as a failure.
    pub fn from_result(result: Result<T, AggregateError>) -> Self {
        match result {
            Ok(v) => Self::Ready(v),
            Err(AggregateError::EmptyInput { what }) => {
                log::debug!("no data for {what}");
                Self::NoData
            }
            Err(e) => Self::Failed(e.to_string()),
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(v) => Some(v),
            _ => None,
        }
    }
}

/// Rows passing the cross-filter: the genre filter (primary genre) AND the
/// node selection (that artist's rows, or rows listing that genre).
pub fn filter_rows<'a>(rows: &'a [TrackRecord], selection: &SelectionState) -> Vec<&'a TrackRecord> {
    rows.iter()
        .filter(|t| match &selection.genre {
            Some(g) => t.primary_genre() == *g,
            None => true,
        })
        .filter(|t| match selection.selected_artist() {
            Some(a) => t.artist_name == a,
            None => true,
        })
        .filter(|t| match selection.selected_genre_node() {
            Some(g) => t.has_genre(g),
            None => true,
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::fixtures::rows;
    use super::*;
    use crate::selection::NodeKind;

    #[test]
    fn test_filter_rows_idle_keeps_everything() {
        let rows = rows();
        assert_eq!(filter_rows(&rows, &SelectionState::new()).len(), rows.len());
    }

    #[test]
    fn test_filter_by_primary_genre() {
        let rows = rows();
        let mut s = SelectionState::new();
        s.set_genre(Some("pop"));
        let names: Vec<_> = filter_rows(&rows, &s).iter().map(|t| t.artist_name.as_str()).collect();
        assert_eq!(names, vec!["Taylor Swift", "Ed Sheeran", "Taylor Swift"]);

        s.set_genre(Some("other"));
        assert_eq!(filter_rows(&rows, &s)[0].artist_name, "Nobody");
    }

    #[test]
    fn test_genre_node_matches_any_listed_genre() {
        let rows = rows();
        let mut s = SelectionState::new();
        s.click("rap", NodeKind::Genre);
        // Drake's primary genre is canadian hip hop, but rap is listed
        assert_eq!(filter_rows(&rows, &s).len(), 3);
    }

    #[test]
    fn test_filters_compose_with_and() {
        let rows = rows();
        let mut s = SelectionState::new();
        s.click("Drake", NodeKind::Artist);
        s.set_genre(Some("pop"));
        assert!(filter_rows(&rows, &s).is_empty());

        s.set_genre(Some("canadian hip hop"));
        assert_eq!(filter_rows(&rows, &s).len(), 2);
    }

    #[test]
    fn test_view_state_from_result() {
        let ok: ViewState<u8> = ViewState::from_result(Ok(3));
        assert_eq!(ok.ready(), Some(&3));
        let empty: ViewState<u8> =
            ViewState::from_result(Err(AggregateError::EmptyInput { what: "mean" }));
        assert_eq!(empty, ViewState::NoData);
        let bad: ViewState<u8> =
            ViewState::from_result(Err(AggregateError::InvalidParameter("radius".into())));
        assert!(matches!(bad, ViewState::Failed(_)));
    }
}
