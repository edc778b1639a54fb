//! Folds the event log into per-item state.
//!
//! Two passes share one overwrite rule: `fold_snapshot` rebuilds the board as
//! it stood just before the period, `fold_period` replays the period on top of
//! it and keeps the replayed events as each item's visible timeline. Both
//! expect events already ordered by `(created_at, seq)` and do not re-sort.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::models::board_event::{BoardColumn, BoardEvent, ItemKey, Transition};

/// Reduced state keyed by item identity. Ordered so repeated runs over the
/// same log produce identical output.
pub type ItemStates = BTreeMap<ItemKey, ItemHistory>;

/// Where an item sits after its latest folded event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    OnBoard(BoardColumn),
    /// Off the board; keeps the column it was removed from, when known.
    Removed { last_column: Option<BoardColumn> },
}

impl Placement {
    fn after(transition: &Transition) -> Self {
        match *transition {
            Transition::Added { new_column } | Transition::Moved { new_column, .. } => {
                Placement::OnBoard(new_column)
            }
            Transition::Removed { previous_column } => Placement::Removed {
                last_column: previous_column,
            },
        }
    }

    pub fn final_column(&self) -> Option<BoardColumn> {
        match *self {
            Placement::OnBoard(column) => Some(column),
            Placement::Removed { last_column } => last_column,
        }
    }

    pub fn is_removed(&self) -> bool {
        matches!(self, Placement::Removed { .. })
    }
}

#[derive(Serialize)]
struct PlacementFields {
    final_column: Option<BoardColumn>,
    removed: bool,
}

impl Serialize for Placement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PlacementFields {
            final_column: self.final_column(),
            removed: self.is_removed(),
        }
        .serialize(serializer)
    }
}

/// One item's reconstructed history for a single query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemHistory {
    #[serde(flatten)]
    pub key: ItemKey,
    pub title: String,
    #[serde(flatten)]
    pub placement: Placement,
    /// In-period events only, oldest first.
    pub movements: Vec<BoardEvent>,
    pub first_seen_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

impl ItemHistory {
    fn seed(event: &BoardEvent) -> Self {
        ItemHistory {
            key: event.item,
            title: event.title().unwrap_or_default().to_string(),
            placement: Placement::after(&event.transition),
            movements: Vec::new(),
            first_seen_at: event.created_at,
            last_activity_at: event.created_at,
        }
    }

    fn apply(&mut self, event: &BoardEvent) {
        if let Some(title) = event.title() {
            self.title = title.to_string();
        }
        self.last_activity_at = event.created_at;
        self.placement = Placement::after(&event.transition);
    }
}

/// State of every item still on the board at the instant before the period.
/// Items whose last pre-period event removed them are dropped, not carried
/// forward as removed.
pub fn fold_snapshot(events: &[BoardEvent]) -> ItemStates {
    let mut states = ItemStates::new();
    for event in events {
        states
            .entry(event.item)
            .or_insert_with(|| ItemHistory::seed(event))
            .apply(event);
    }
    states.retain(|_, item| !item.placement.is_removed());
    states
}

/// Replays in-period events over the snapshot. Items first seen here get
/// `first_seen_at` from their first in-period event; snapshot survivors keep
/// theirs.
pub fn fold_period(mut states: ItemStates, events: &[BoardEvent]) -> ItemStates {
    for event in events {
        let item = states
            .entry(event.item)
            .or_insert_with(|| ItemHistory::seed(event));
        item.movements.push(event.clone());
        item.apply(event);
    }
    states
}
