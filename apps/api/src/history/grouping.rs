use serde::Serialize;

use crate::history::reducer::{ItemHistory, ItemStates, Placement};
use crate::models::board_event::{BoardColumn, Transition};

pub const REMOVED_BUCKET_ID: &str = "removed";
const REMOVED_BUCKET_TITLE: &str = "Removidos";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnBucket {
    pub id: &'static str,
    pub title: &'static str,
    pub items: Vec<ItemHistory>,
}

impl ColumnBucket {
    fn new(id: &'static str, title: &'static str) -> Self {
        Self {
            id,
            title,
            items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HistorySummary {
    /// Items on the board at the end of the period.
    pub on_board: usize,
    /// Items that ended the period removed.
    pub removed: usize,
    /// Events inside the period, across all items.
    pub movements: usize,
    pub added_events: usize,
    pub moved_events: usize,
    pub removed_events: usize,
}

/// The board at the end of the period: one bucket per column in display
/// order, then the removed bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardHistory {
    pub columns: Vec<ColumnBucket>,
    pub summary: HistorySummary,
    pub is_empty: bool,
}

impl BoardHistory {
    #[cfg(test)]
    pub fn bucket(&self, id: &str) -> Option<&ColumnBucket> {
        self.columns.iter().find(|b| b.id == id)
    }
}

pub fn group_by_column(states: ItemStates) -> BoardHistory {
    let mut columns: Vec<ColumnBucket> = BoardColumn::ALL
        .iter()
        .map(|c| ColumnBucket::new(c.as_str(), c.title()))
        .collect();
    let mut removed = ColumnBucket::new(REMOVED_BUCKET_ID, REMOVED_BUCKET_TITLE);
    let mut summary = HistorySummary::default();

    for item in states.into_values() {
        for movement in &item.movements {
            match movement.transition {
                Transition::Added { .. } => summary.added_events += 1,
                Transition::Moved { .. } => summary.moved_events += 1,
                Transition::Removed { .. } => summary.removed_events += 1,
            }
        }
        summary.movements += item.movements.len();

        match item.placement {
            Placement::Removed { .. } => {
                summary.removed += 1;
                removed.items.push(item);
            }
            Placement::OnBoard(column) => {
                summary.on_board += 1;
                columns[column.position()].items.push(item);
            }
        }
    }

    columns.push(removed);
    BoardHistory {
        columns,
        is_empty: summary.on_board == 0 && summary.removed == 0,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::reducer::{fold_period, fold_snapshot};
    use crate::history::test_support::*;
    use crate::models::board_event::{BoardColumn::*, ItemType};

    fn bucket_len(history: &BoardHistory, id: &str) -> usize {
        history.bucket(id).map(|b| b.items.len()).unwrap()
    }

    #[test]
    fn test_four_buckets_in_display_order() {
        let history = group_by_column(ItemStates::new());
        let ids: Vec<_> = history.columns.iter().map(|b| b.id).collect();
        assert_eq!(ids, ["a_fazer", "em_progresso", "feito", "removed"]);
        assert!(history.is_empty);
        assert_eq!(history.summary, HistorySummary::default());
    }

    #[test]
    fn test_removed_wins_over_last_column() {
        let y = key(1, ItemType::Task);
        let during = vec![event(1, y, "Ofício", removed(Feito), utc(2025, 6, 5, 9))];
        let history = group_by_column(fold_period(ItemStates::new(), &during));
        assert_eq!(bucket_len(&history, "removed"), 1);
        assert_eq!(bucket_len(&history, "feito"), 0);
        assert_eq!(history.summary.removed, 1);
        assert_eq!(history.summary.removed_events, 1);
        assert!(!history.is_empty);
    }

    #[test]
    fn test_every_item_lands_in_exactly_one_bucket() {
        let before = vec![
            event(1, key(1, ItemType::Request), "A", added(AFazer), utc(2025, 5, 1, 8)),
            event(2, key(2, ItemType::Task), "B", added(EmProgresso), utc(2025, 5, 1, 9)),
            event(3, key(3, ItemType::Route), "C", added(Feito), utc(2025, 5, 1, 10)),
            event(4, key(4, ItemType::Request), "D", added(AFazer), utc(2025, 5, 1, 11)),
            event(5, key(4, ItemType::Request), "D", removed(AFazer), utc(2025, 5, 2, 11)),
        ];
        let during = vec![
            event(6, key(1, ItemType::Request), "A", moved(AFazer, Feito), utc(2025, 6, 3, 8)),
            event(7, key(2, ItemType::Task), "B", removed(EmProgresso), utc(2025, 6, 3, 9)),
            event(8, key(5, ItemType::Task), "E", added(AFazer), utc(2025, 6, 4, 9)),
        ];
        let states = fold_period(fold_snapshot(&before), &during);
        let total = states.len();
        let history = group_by_column(states);

        let bucketed: usize = history.columns.iter().map(|b| b.items.len()).sum();
        assert_eq!(bucketed, total);
        assert_eq!(total, 4);
        assert_eq!(bucket_len(&history, "a_fazer"), 1);
        assert_eq!(bucket_len(&history, "em_progresso"), 0);
        assert_eq!(bucket_len(&history, "feito"), 2);
        assert_eq!(bucket_len(&history, "removed"), 1);
        assert_eq!(
            history.summary,
            HistorySummary {
                on_board: 3,
                removed: 1,
                movements: 3,
                added_events: 1,
                moved_events: 1,
                removed_events: 1,
            }
        );
    }
}
