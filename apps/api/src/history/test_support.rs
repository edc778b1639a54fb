//! Event fixtures shared by the history tests.

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::models::board_event::{
    BoardColumn, BoardEvent, BoardEventRow, ItemKey, ItemType, Transition,
};

pub const BOARD: &str = "gabinete-vereador";

pub fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

pub fn key(n: u128, item_type: ItemType) -> ItemKey {
    ItemKey {
        item_id: Uuid::from_u128(n),
        item_type,
    }
}

pub fn added(to: BoardColumn) -> Transition {
    Transition::Added { new_column: to }
}

pub fn moved(from: BoardColumn, to: BoardColumn) -> Transition {
    Transition::Moved {
        previous_column: Some(from),
        new_column: to,
    }
}

pub fn removed(from: BoardColumn) -> Transition {
    Transition::Removed {
        previous_column: Some(from),
    }
}

pub fn event(
    seq: i64,
    item: ItemKey,
    title: &str,
    transition: Transition,
    created_at: DateTime<Utc>,
) -> BoardEvent {
    BoardEvent {
        id: Uuid::from_u128(1_000_000 + seq as u128),
        seq,
        item,
        board_id: BOARD.to_string(),
        item_title: Some(title.to_string()),
        transition,
        actor_id: None,
        created_at,
    }
}

/// The stored form of `event`, for feeding an `EventLogStore`.
pub fn row(event: &BoardEvent) -> BoardEventRow {
    let (action, previous_column, new_column) = match event.transition {
        Transition::Added { new_column } => ("added", None, Some(new_column)),
        Transition::Moved {
            previous_column,
            new_column,
        } => ("moved", previous_column, Some(new_column)),
        Transition::Removed { previous_column } => ("removed", previous_column, None),
    };
    BoardEventRow {
        id: event.id,
        seq: event.seq,
        item_id: event.item.item_id,
        item_type: event.item.item_type.as_str().to_string(),
        board_id: event.board_id.clone(),
        item_title: event.item_title.clone(),
        previous_column: previous_column.map(|c| c.as_str().to_string()),
        new_column: new_column.map(|c| c.as_str().to_string()),
        action: action.to_string(),
        actor_id: event.actor_id,
        created_at: event.created_at,
    }
}
