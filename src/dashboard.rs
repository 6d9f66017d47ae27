//! Owns the dataset and the one piece of mutable state, and re-derives every
//! view after each transition.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use crate::config::DashboardConfig;
use crate::selection::{NodeKind, SelectionState, Transition};
use crate::store::{self, LoadReport, RowStore};
use crate::views::{
    self, DistributionView, ProfileView, RankingView, RelationshipView, ViewState,
};

/// User interaction raised by the rendering layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Click { node: String, kind: NodeKind },
    FilterGenre(Option<String>),
    Clear,
}

/// Every view derived from one consistent selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub selection: SelectionState,
    pub distribution: ViewState<DistributionView>,
    pub ranking: ViewState<RankingView>,
    pub relationship: ViewState<RelationshipView>,
    pub profile: ViewState<ProfileView>,
}

impl Snapshot {
    /// Derive all views for one selection.
    pub fn derive(store: &RowStore, selection: &SelectionState, config: &DashboardConfig) -> Self {
        let rows = store.tracks();
        Self {
            selection: selection.clone(),
            distribution: ViewState::from_result(views::distribution::derive(rows, selection, config)),
            ranking: ViewState::from_result(views::ranking::derive(rows, selection, config)),
            relationship: ViewState::from_result(views::relationship::derive(rows, selection, config)),
            profile: ViewState::from_result(views::profile::derive(rows, selection, config)),
        }
    }

    /// The "failed to load" state for every view.
    pub fn failed(err: &store::LoadError) -> Self {
        let msg = format!("Failed to load data: {err}");
        Self {
            selection: SelectionState::default(),
            distribution: ViewState::Failed(msg.clone()),
            ranking: ViewState::Failed(msg.clone()),
            relationship: ViewState::Failed(msg.clone()),
            profile: ViewState::Failed(msg),
        }
    }
}

type Subscriber = Arc<dyn Fn(&Snapshot) + Send + Sync>;

/// Snapshots waiting to be delivered, in transition order.
#[derive(Default)]
struct Outbox {
    queue: VecDeque<Snapshot>,
    delivering: bool,
}

/// Hands the delivery role back if a subscriber panics mid-delivery.
struct DeliveryGuard<'a>(&'a Mutex<Outbox>);

impl Drop for DeliveryGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.lock().unwrap_or_else(PoisonError::into_inner).delivering = false;
        }
    }
}

pub struct Dashboard {
    store: Arc<RowStore>,
    config: DashboardConfig,
    // Transition, derivation and enqueueing happen under this one lock, so no
    // snapshot sees a half-applied selection and the outbox is in transition order
    selection: Mutex<SelectionState>,
    subscribers: Mutex<Vec<Subscriber>>,
    outbox: Mutex<Outbox>,
}

impl Dashboard {
    pub fn new(store: Arc<RowStore>, config: DashboardConfig) -> Self {
        Self {
            store,
            config,
            selection: Mutex::new(SelectionState::default()),
            subscribers: Mutex::new(Vec::new()),
            outbox: Mutex::new(Outbox::default()),
        }
    }

    /// Load the tracks file and build a dashboard over it.
    pub fn load(path: &Path, config: DashboardConfig) -> store::Result<(Self, LoadReport)> {
        let (store, report) = RowStore::load(path)?;
        Ok((Self::new(Arc::new(store), config), report))
    }

    pub fn store(&self) -> &Arc<RowStore> {
        &self.store
    }

    /// Register an observer that receives every snapshot produced by `dispatch`.
    ///
    /// Observers run with no dashboard lock held, so they may call `dispatch`
    /// or `subscribe` themselves. Snapshots are delivered one at a time in the
    /// order their transitions were applied; a dispatch made from inside an
    /// observer is delivered after the current snapshot.
    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(&Snapshot) + Send + Sync + 'static,
    {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(callback));
    }

    /// Current selection, copied out.
    pub fn selection(&self) -> SelectionState {
        self.selection.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Derive all views for the current selection without changing it.
    pub fn snapshot(&self) -> Snapshot {
        let state = self.selection.lock().unwrap_or_else(PoisonError::into_inner);
        Snapshot::derive(&self.store, &state, &self.config)
    }

    /// Apply one event, re-derive every view and notify subscribers.
    pub fn dispatch(&self, event: Event) -> Snapshot {
        let (transition, snapshot) = {
            let mut state = self.selection.lock().unwrap_or_else(PoisonError::into_inner);
            let transition = match &event {
                Event::Click { node, kind } => state.click(node, *kind),
                Event::FilterGenre(genre) => state.set_genre(genre.as_deref()),
                Event::Clear => state.clear(),
            };
            let snapshot = Snapshot::derive(&self.store, &state, &self.config);
            self.outbox
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .queue
                .push_back(snapshot.clone());
            (transition, snapshot)
        };

        if transition != Transition::Unchanged {
            log::info!("{event:?} -> {transition:?}");
        }

        self.deliver();
        snapshot
    }

    /// Drain the outbox unless another caller is already draining it.
    fn deliver(&self) {
        {
            let mut outbox = self.outbox.lock().unwrap_or_else(PoisonError::into_inner);
            if outbox.delivering {
                return;
            }
            outbox.delivering = true;
        }
        let _guard = DeliveryGuard(&self.outbox);

        loop {
            let next = {
                let mut outbox = self.outbox.lock().unwrap_or_else(PoisonError::into_inner);
                match outbox.queue.pop_front() {
                    Some(snapshot) => snapshot,
                    None => {
                        outbox.delivering = false;
                        return;
                    }
                }
            };
            let subscribers = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner).clone();
            for notify in &subscribers {
                notify(&next);
            }
        }
    }

    /// Primary genres by track count, for the genre filter control.
    pub fn genre_options(&self) -> Vec<(String, usize)> {
        self.store.primary_genres()
    }
}
