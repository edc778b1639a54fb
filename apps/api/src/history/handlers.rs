use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::history::period::{Granularity, Period};
use crate::history::service::{load_board_history, HistoryReport};
use crate::models::board_event::{BoardRow, ItemType};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    #[serde(default)]
    pub granularity: Granularity,
    /// Any date inside the wanted period; defaults to today on the board's clock.
    pub reference: Option<NaiveDate>,
    /// Periods to move from `reference`, negative for the past.
    #[serde(default)]
    pub offset: i32,
    pub item_type: Option<ItemType>,
}

#[derive(Debug, Serialize)]
pub struct PeriodView {
    pub granularity: Granularity,
    pub reference: NaiveDate,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub label: String,
}

impl From<&Period> for PeriodView {
    fn from(period: &Period) -> Self {
        Self {
            granularity: period.granularity,
            reference: period.reference,
            start: period.start,
            end: period.end,
            label: period.label(),
        }
    }
}

/// References to request for the neighbouring periods and for today.
#[derive(Debug, Serialize)]
pub struct Navigation {
    pub previous: Option<NaiveDate>,
    pub next: Option<NaiveDate>,
    pub today: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct BoardHistoryResponse {
    pub board_id: String,
    pub period: PeriodView,
    pub navigation: Navigation,
    #[serde(flatten)]
    pub report: HistoryReport,
}

/// GET /api/v1/boards
pub async fn handle_list_boards(
    State(state): State<AppState>,
) -> Result<Json<Vec<BoardRow>>, AppError> {
    Ok(Json(state.store.list_boards().await?))
}

/// GET /api/v1/boards/:board_id/history
pub async fn handle_board_history(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> Result<Json<BoardHistoryResponse>, AppError> {
    let Query(params) = params?;
    let offset = state.config.board_offset()?;
    let out_of_range = || AppError::Validation("Requested period is out of range".to_string());

    let today = Period::today(Utc::now(), offset, params.granularity).ok_or_else(out_of_range)?;
    let base = match params.reference {
        Some(reference) => Period::containing(reference, params.granularity),
        None => Some(today),
    }
    .ok_or_else(out_of_range)?;
    let period = base.advance(params.offset).ok_or_else(out_of_range)?;

    let report = load_board_history(
        state.store.as_ref(),
        &board_id,
        &period,
        offset,
        params.item_type,
    )
    .await?;

    Ok(Json(BoardHistoryResponse {
        navigation: Navigation {
            previous: period.advance(-1).map(|p| p.reference),
            next: period.advance(1).map(|p| p.reference),
            today: today.reference,
        },
        period: PeriodView::from(&period),
        board_id,
        report,
    }))
}
