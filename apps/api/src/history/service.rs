//! The fetch, validate, reduce and group pipeline behind the history view.

use chrono::FixedOffset;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::history::grouping::{group_by_column, BoardHistory};
use crate::history::period::Period;
use crate::history::reducer::{fold_period, fold_snapshot};
use crate::history::store::{EventLogStore, EventWindow};
use crate::models::board_event::{BoardEvent, BoardEventRow, ItemType};

/// A stored event that failed validation and was left out of the fold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuarantinedEvent {
    pub event_id: Uuid,
    pub item_id: Uuid,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryReport {
    #[serde(flatten)]
    pub board: BoardHistory,
    pub quarantined: Vec<QuarantinedEvent>,
}

/// Rebuilds `board_id` as of the end of `period`.
///
/// Both event sets are fetched concurrently and either failure fails the
/// whole call; there is no partial result and no retry. Read-only, so a
/// repeat call over an unchanged log returns the same report.
pub async fn load_board_history(
    store: &dyn EventLogStore,
    board_id: &str,
    period: &Period,
    offset: FixedOffset,
    item_type: Option<ItemType>,
) -> Result<HistoryReport, AppError> {
    let (start, until) = period.utc_window(offset).ok_or_else(|| {
        AppError::Validation(format!("period {} cannot be resolved", period.label()))
    })?;

    let snapshot_window = EventWindow::Before(start);
    let period_window = EventWindow::Within(start, until);
    let (before_rows, period_rows) = tokio::try_join!(
        store.fetch_events(board_id, snapshot_window),
        store.fetch_events(board_id, period_window),
    )?;
    debug_assert!(before_rows.iter().all(|r| snapshot_window.contains(r.created_at)));
    debug_assert!(period_rows.iter().all(|r| period_window.contains(r.created_at)));
    debug!(
        "Board {board_id} {} ({}): {} snapshot events, {} period events",
        period.label(),
        item_type.map_or("all items", |t| t.as_str()),
        before_rows.len(),
        period_rows.len()
    );

    let mut quarantined = Vec::new();
    let before = validate_rows(board_id, before_rows, item_type, &mut quarantined);
    let during = validate_rows(board_id, period_rows, item_type, &mut quarantined);

    let states = fold_period(fold_snapshot(&before), &during);
    Ok(HistoryReport {
        board: group_by_column(states),
        quarantined,
    })
}

fn validate_rows(
    board_id: &str,
    rows: Vec<BoardEventRow>,
    item_type: Option<ItemType>,
    quarantined: &mut Vec<QuarantinedEvent>,
) -> Vec<BoardEvent> {
    let mut events = Vec::with_capacity(rows.len());
    for row in rows {
        let (event_id, item_id) = (row.id, row.item_id);
        match BoardEvent::try_from(row) {
            Ok(event) => {
                if item_type.map_or(true, |t| t == event.item.item_type) {
                    events.push(event);
                }
            }
            Err(e) => {
                warn!("Quarantined event {event_id} on board {board_id}: {e}");
                quarantined.push(QuarantinedEvent {
                    event_id,
                    item_id,
                    reason: e.to_string(),
                });
            }
        }
    }
    events
}
