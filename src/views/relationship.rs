//! Bipartite artist → genre graph for the arc diagram.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use crate::aggregate::{AggregateError, Result, top_by_metric};
use crate::config::DashboardConfig;
use crate::selection::{NodeKind, Selection, SelectionState};
use crate::store::TrackRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub artist: String,
    pub genre: String,
    /// Touches the clicked node.
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationshipView {
    /// Left column, ranked by mean followers.
    pub artists: Vec<String>,
    /// Right column, alphabetical.
    pub genres: Vec<String>,
    pub links: Vec<Link>,
}

impl RelationshipView {
    pub fn has_highlight(&self) -> bool {
        self.links.iter().any(|l| l.highlighted)
    }
}

/// The artist set is always the overall top-N; the selection only decides
/// which links are highlighted.
pub fn derive(rows: &[TrackRecord], selection: &SelectionState, config: &DashboardConfig) -> Result<RelationshipView> {
    let artists: Vec<String> = top_by_metric(rows, |t| t.artist_name.clone(), |t| t.artist_followers as f64, config.top_n)
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    if artists.is_empty() {
        return Err(AggregateError::EmptyInput { what: "relationship" });
    }

    // One link per distinct (artist, genre); artists keep their rank order,
    // genres keep the order rows list them
    let mut seen: HashSet<(&str, String)> = HashSet::new();
    let mut pairs: Vec<(&str, String)> = Vec::new();
    for artist in &artists {
        for t in rows.iter().filter(|t| t.artist_name == *artist) {
            for g in t.genres() {
                let key = (artist.as_str(), g);
                if seen.insert(key.clone()) {
                    pairs.push(key);
                }
            }
        }
    }

    let genres: Vec<String> = pairs
        .iter()
        .map(|(_, g)| g.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let links = pairs
        .into_iter()
        .map(|(artist, genre)| {
            let highlighted = match &selection.node {
                Selection::NodeSelected { node, kind: NodeKind::Artist } => node == artist,
                Selection::NodeSelected { node, kind: NodeKind::Genre } => *node == genre,
                Selection::Idle => false,
            };
            Link { artist: artist.to_string(), genre, highlighted }
        })
        .collect();

    Ok(RelationshipView { artists, genres, links })
}
