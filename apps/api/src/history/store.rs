//! Read access to the append-only `kanban_history` event log.
//!
//! The log is written elsewhere (every board mutation appends a row); this
//! service only ever reads it. Callers hold the store as
//! `Arc<dyn EventLogStore>` so the history pipeline can run against any
//! backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::board_event::{BoardEventRow, BoardRow};

/// Time filter for one event fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventWindow {
    /// `created_at < start`: everything needed for the snapshot.
    Before(DateTime<Utc>),
    /// `start <= created_at < until`: the period itself.
    Within(DateTime<Utc>, DateTime<Utc>),
}

impl EventWindow {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        match *self {
            EventWindow::Before(start) => at < start,
            EventWindow::Within(start, until) => start <= at && at < until,
        }
    }
}

#[async_trait]
pub trait EventLogStore: Send + Sync {
    /// Events of one board inside `window`, ordered by `created_at` and then
    /// by insertion sequence.
    async fn fetch_events(
        &self,
        board_id: &str,
        window: EventWindow,
    ) -> Result<Vec<BoardEventRow>, AppError>;

    /// Every board that has at least one event, most recently active first.
    async fn list_boards(&self) -> Result<Vec<BoardRow>, AppError>;
}

/// PostgreSQL-backed event log.
pub struct PgEventLogStore {
    pool: PgPool,
}

impl PgEventLogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventLogStore for PgEventLogStore {
    async fn fetch_events(
        &self,
        board_id: &str,
        window: EventWindow,
    ) -> Result<Vec<BoardEventRow>, AppError> {
        let rows = match window {
            EventWindow::Before(start) => {
                sqlx::query_as::<_, BoardEventRow>(
                    r#"
                    SELECT id, seq, item_id, item_type, board_id, item_title,
                           previous_column, new_column, action, actor_id, created_at
                    FROM kanban_history
                    WHERE board_id = $1 AND created_at < $2
                    ORDER BY created_at ASC, seq ASC
                    "#,
                )
                .bind(board_id)
                .bind(start)
                .fetch_all(&self.pool)
                .await?
            }
            EventWindow::Within(start, until) => {
                sqlx::query_as::<_, BoardEventRow>(
                    r#"
                    SELECT id, seq, item_id, item_type, board_id, item_title,
                           previous_column, new_column, action, actor_id, created_at
                    FROM kanban_history
                    WHERE board_id = $1 AND created_at >= $2 AND created_at < $3
                    ORDER BY created_at ASC, seq ASC
                    "#,
                )
                .bind(board_id)
                .bind(start)
                .bind(until)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows)
    }

    async fn list_boards(&self) -> Result<Vec<BoardRow>, AppError> {
        Ok(sqlx::query_as::<_, BoardRow>(
            r#"
            SELECT board_id, COUNT(*) AS event_count, MAX(created_at) AS last_activity_at
            FROM kanban_history
            GROUP BY board_id
            ORDER BY last_activity_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?)
    }
}

#[cfg(test)]
pub mod memory {
    //! In-memory event log for tests.

    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Default)]
    pub struct MemoryEventLog {
        rows: Vec<BoardEventRow>,
        fail_window: Option<fn(&EventWindow) -> bool>,
        pub fetches: AtomicUsize,
    }

    impl MemoryEventLog {
        pub fn new(mut rows: Vec<BoardEventRow>) -> Self {
            rows.sort_by_key(|r| (r.created_at, r.seq));
            Self {
                rows,
                ..Default::default()
            }
        }

        /// Makes every fetch whose window matches `predicate` fail.
        pub fn failing_when(mut self, predicate: fn(&EventWindow) -> bool) -> Self {
            self.fail_window = Some(predicate);
            self
        }
    }

    #[async_trait]
    impl EventLogStore for MemoryEventLog {
        async fn fetch_events(
            &self,
            board_id: &str,
            window: EventWindow,
        ) -> Result<Vec<BoardEventRow>, AppError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail_window.is_some_and(|fails| fails(&window)) {
                return Err(AppError::Internal(anyhow::anyhow!(
                    "event log unavailable"
                )));
            }
            Ok(self
                .rows
                .iter()
                .filter(|r| r.board_id == board_id && window.contains(r.created_at))
                .cloned()
                .collect())
        }

        async fn list_boards(&self) -> Result<Vec<BoardRow>, AppError> {
            let mut boards: BTreeMap<&str, BoardRow> = BTreeMap::new();
            for row in &self.rows {
                let board = boards.entry(row.board_id.as_str()).or_insert_with(|| BoardRow {
                    board_id: row.board_id.clone(),
                    event_count: 0,
                    last_activity_at: row.created_at,
                });
                board.event_count += 1;
                board.last_activity_at = board.last_activity_at.max(row.created_at);
            }
            let mut boards: Vec<_> = boards.into_values().collect();
            boards.sort_by(|a, b| b.last_activity_at.cmp(&a.last_activity_at));
            Ok(boards)
        }
    }
}
