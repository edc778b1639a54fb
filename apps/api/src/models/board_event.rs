use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// One row of the append-only `kanban_history` table, exactly as stored.
/// Tags are plain text here; `BoardEvent::try_from` closes them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BoardEventRow {
    pub id: Uuid,
    /// Monotonic insertion sequence, the tie-break for equal `created_at`.
    pub seq: i64,
    pub item_id: Uuid,
    pub item_type: String,
    pub board_id: String,
    pub item_title: Option<String>,
    pub previous_column: Option<String>,
    pub new_column: Option<String>,
    pub action: String,
    pub actor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Aggregate row backing the board selector.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BoardRow {
    pub board_id: String,
    pub event_count: i64,
    pub last_activity_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Request,
    Task,
    Route,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Request => "request",
            ItemType::Task => "task",
            ItemType::Route => "route",
        }
    }
}

impl FromStr for ItemType {
    type Err = MalformedEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "request" => Ok(ItemType::Request),
            "task" => Ok(ItemType::Task),
            "route" => Ok(ItemType::Route),
            other => Err(MalformedEvent::UnknownItemType(other.to_string())),
        }
    }
}

/// The fixed lifecycle stages of every board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardColumn {
    AFazer,
    EmProgresso,
    Feito,
}

impl BoardColumn {
    /// Display order on the board.
    pub const ALL: [BoardColumn; 3] = [
        BoardColumn::AFazer,
        BoardColumn::EmProgresso,
        BoardColumn::Feito,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BoardColumn::AFazer => "a_fazer",
            BoardColumn::EmProgresso => "em_progresso",
            BoardColumn::Feito => "feito",
        }
    }

    /// Index into `ALL`.
    pub fn position(&self) -> usize {
        match self {
            BoardColumn::AFazer => 0,
            BoardColumn::EmProgresso => 1,
            BoardColumn::Feito => 2,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            BoardColumn::AFazer => "A Fazer",
            BoardColumn::EmProgresso => "Em Progresso",
            BoardColumn::Feito => "Feito",
        }
    }
}

impl FromStr for BoardColumn {
    type Err = MalformedEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "a_fazer" => Ok(BoardColumn::AFazer),
            "em_progresso" => Ok(BoardColumn::EmProgresso),
            "feito" => Ok(BoardColumn::Feito),
            other => Err(MalformedEvent::UnknownColumn(other.to_string())),
        }
    }
}

/// Identity of a board item across its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemKey {
    pub item_id: Uuid,
    pub item_type: ItemType,
}

/// What happened to the item. Replaces the free-form `action` tag and
/// the nullable column pair with the combinations that can actually occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Transition {
    Added {
        new_column: BoardColumn,
    },
    Moved {
        previous_column: Option<BoardColumn>,
        new_column: BoardColumn,
    },
    Removed {
        previous_column: Option<BoardColumn>,
    },
}

/// A validated board-mutation event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardEvent {
    pub id: Uuid,
    pub seq: i64,
    #[serde(flatten)]
    pub item: ItemKey,
    pub board_id: String,
    pub item_title: Option<String>,
    #[serde(flatten)]
    pub transition: Transition,
    pub actor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl BoardEvent {
    /// The event's title as stored, if it carries a non-blank one.
    pub fn title(&self) -> Option<&str> {
        self.item_title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedEvent {
    #[error("unknown action '{0}'")]
    UnknownAction(String),

    #[error("unknown item type '{0}'")]
    UnknownItemType(String),

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("'{0}' event has no new_column")]
    MissingNewColumn(&'static str),
}

fn parse_column(raw: Option<&str>) -> Result<Option<BoardColumn>, MalformedEvent> {
    raw.map(str::parse).transpose()
}

/// The column an item left only feeds the timeline, never its placement, so
/// a retired or renamed column there reads as unknown instead of rejecting
/// the event.
fn parse_previous_column(row: &BoardEventRow) -> Option<BoardColumn> {
    let raw = row.previous_column.as_deref()?;
    match raw.parse() {
        Ok(column) => Some(column),
        Err(e) => {
            debug!("Event {} previous_column ignored: {e}", row.id);
            None
        }
    }
}

impl TryFrom<BoardEventRow> for BoardEvent {
    type Error = MalformedEvent;

    fn try_from(row: BoardEventRow) -> Result<Self, Self::Error> {
        let item_type: ItemType = row.item_type.parse()?;
        let previous_column = parse_previous_column(&row);
        let new_column = parse_column(row.new_column.as_deref())?;

        let transition = match row.action.as_str() {
            "added" => Transition::Added {
                new_column: new_column.ok_or(MalformedEvent::MissingNewColumn("added"))?,
            },
            "moved" => Transition::Moved {
                previous_column,
                new_column: new_column.ok_or(MalformedEvent::MissingNewColumn("moved"))?,
            },
            "removed" => Transition::Removed { previous_column },
            other => return Err(MalformedEvent::UnknownAction(other.to_string())),
        };

        Ok(BoardEvent {
            id: row.id,
            seq: row.seq,
            item: ItemKey {
                item_id: row.item_id,
                item_type,
            },
            board_id: row.board_id,
            item_title: row.item_title,
            transition,
            actor_id: row.actor_id,
            created_at: row.created_at,
        })
    }
}
