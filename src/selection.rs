use std::fmt;

use serde::{Deserialize, Serialize};

/// What kind of node a click landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Artist,
    Genre,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Artist => write!(f, "artist"),
            Self::Genre => write!(f, "genre"),
        }
    }
}

/// The clicked-node dimension of the cross-filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Selection {
    #[default]
    Idle,
    NodeSelected { node: String, kind: NodeKind },
}

/// What a transition did, for logging and for callers that care.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Selected,
    Replaced,
    Cleared,
    GenreChanged,
    Unchanged,
}

/// Shared cross-filter state: a node selection plus an independent genre filter.
/// Both dimensions compose with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionState {
    pub genre: Option<String>,
    pub node: Selection,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Click on a node. Re-clicking the active node toggles it off; clicking
    /// any other node replaces the selection without passing through idle.
    pub fn click(&mut self, node: &str, kind: NodeKind) -> Transition {
        let transition = match &self.node {
            Selection::NodeSelected { node: active, kind: active_kind }
                if active == node && *active_kind == kind =>
            {
                self.node = Selection::Idle;
                Transition::Cleared
            }
            Selection::NodeSelected { .. } => {
                self.node = Selection::NodeSelected { node: node.to_string(), kind };
                Transition::Replaced
            }
            Selection::Idle => {
                self.node = Selection::NodeSelected { node: node.to_string(), kind };
                Transition::Selected
            }
        };
        log::debug!("click {kind} {node:?}: {transition:?}");
        transition
    }

    /// Set or clear the genre filter. Blank genres clear it.
    pub fn set_genre(&mut self, genre: Option<&str>) -> Transition {
        let genre = genre.map(str::trim).filter(|g| !g.is_empty()).map(String::from);
        if genre == self.genre {
            return Transition::Unchanged;
        }
        log::debug!("genre filter {:?} -> {:?}", self.genre, genre);
        self.genre = genre;
        Transition::GenreChanged
    }

    /// Drop both the node selection and the genre filter.
    pub fn clear(&mut self) -> Transition {
        if self.is_empty() {
            return Transition::Unchanged;
        }
        *self = Self::default();
        Transition::Cleared
    }

    pub fn is_empty(&self) -> bool {
        self.genre.is_none() && self.node == Selection::Idle
    }

    pub fn selected_artist(&self) -> Option<&str> {
        match &self.node {
            Selection::NodeSelected { node, kind: NodeKind::Artist } => Some(node.as_str()),
            _ => None,
        }
    }

    pub fn selected_genre_node(&self) -> Option<&str> {
        match &self.node {
            Selection::NodeSelected { node, kind: NodeKind::Genre } => Some(node.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_off_on_reclick() {
        let mut s = SelectionState::new();
        assert_eq!(s.click("Drake", NodeKind::Artist), Transition::Selected);
        assert_eq!(
            s.node,
            Selection::NodeSelected { node: "Drake".into(), kind: NodeKind::Artist }
        );
        assert_eq!(s.click("Drake", NodeKind::Artist), Transition::Cleared);
        assert_eq!(s.node, Selection::Idle);
    }

    #[test]
    fn test_click_other_node_replaces_directly() {
        let mut s = SelectionState::new();
        s.click("Drake", NodeKind::Artist);
        assert_eq!(s.click("pop", NodeKind::Genre), Transition::Replaced);
        assert_eq!(s.selected_genre_node(), Some("pop"));
        assert_eq!(s.selected_artist(), None);
        assert_eq!(s.click("Taylor Swift", NodeKind::Artist), Transition::Replaced);
        assert_eq!(s.selected_artist(), Some("Taylor Swift"));
    }

    #[test]
    fn test_same_name_different_kind_is_a_different_node() {
        let mut s = SelectionState::new();
        s.click("pop", NodeKind::Genre);
        assert_eq!(s.click("pop", NodeKind::Artist), Transition::Replaced);
        assert_eq!(s.selected_artist(), Some("pop"));
    }

    #[test]
    fn test_genre_filter_is_orthogonal() {
        let mut s = SelectionState::new();
        s.click("Drake", NodeKind::Artist);
        assert_eq!(s.set_genre(Some("rap")), Transition::GenreChanged);
        assert_eq!(s.selected_artist(), Some("Drake"));
        assert_eq!(s.set_genre(Some("rap")), Transition::Unchanged);

        // Toggling the node leaves the genre filter alone
        s.click("Drake", NodeKind::Artist);
        assert_eq!(s.genre.as_deref(), Some("rap"));

        assert_eq!(s.set_genre(Some("  ")), Transition::GenreChanged);
        assert_eq!(s.genre, None);
    }

    #[test]
    fn test_clear() {
        let mut s = SelectionState::new();
        assert_eq!(s.clear(), Transition::Unchanged);
        s.click("Drake", NodeKind::Artist);
        s.set_genre(Some("rap"));
        assert_eq!(s.clear(), Transition::Cleared);
        assert!(s.is_empty());
    }
}
