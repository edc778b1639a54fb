//! Reporting periods: a calendar week (Monday to Sunday) or a calendar month,
//! resolved in the board's local wall clock.

use chrono::{
    DateTime, Datelike, Days, Duration, FixedOffset, Months, NaiveDate, NaiveDateTime, NaiveTime,
    TimeZone, Utc,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    #[default]
    Week,
    Month,
}

/// Indexed by `month0()`.
pub const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// An inclusive `[start, end]` range in local time, plus the reference date
/// it was derived from (navigation shifts the reference, not the bounds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    pub granularity: Granularity,
    pub reference: NaiveDate,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Period {
    /// The week or month containing `reference`. `None` only at the edges of
    /// the representable calendar.
    pub fn containing(reference: NaiveDate, granularity: Granularity) -> Option<Self> {
        let (first_day, next_first_day) = match granularity {
            Granularity::Week => {
                // Sunday is day 7 of the week that started on the previous Monday.
                let back = reference.weekday().num_days_from_monday();
                let monday = reference.checked_sub_days(Days::new(u64::from(back)))?;
                (monday, monday.checked_add_days(Days::new(7))?)
            }
            Granularity::Month => {
                let first = reference.with_day(1)?;
                (first, first.checked_add_months(Months::new(1))?)
            }
        };

        let start = first_day.and_time(NaiveTime::MIN);
        let end = next_first_day
            .and_time(NaiveTime::MIN)
            .checked_sub_signed(Duration::milliseconds(1))?;

        Some(Period {
            granularity,
            reference,
            start,
            end,
        })
    }

    /// The period containing "now" as seen on the board's wall clock.
    pub fn today(now: DateTime<Utc>, offset: FixedOffset, granularity: Granularity) -> Option<Self> {
        Self::containing(now.with_timezone(&offset).date_naive(), granularity)
    }

    /// Moves `n` periods forward (negative `n` moves back). Month steps keep
    /// the day of month where it exists and clamp to the month's end otherwise.
    pub fn advance(&self, n: i32) -> Option<Self> {
        let steps = n.unsigned_abs();
        let reference = match self.granularity {
            Granularity::Week => {
                let days = Days::new(u64::from(steps) * 7);
                if n >= 0 {
                    self.reference.checked_add_days(days)?
                } else {
                    self.reference.checked_sub_days(days)?
                }
            }
            Granularity::Month => {
                let months = Months::new(steps);
                if n >= 0 {
                    self.reference.checked_add_months(months)?
                } else {
                    self.reference.checked_sub_months(months)?
                }
            }
        };
        Self::containing(reference, self.granularity)
    }

    pub fn label(&self) -> String {
        match self.granularity {
            Granularity::Week => format!(
                "{:02}/{:02} — {:02}/{:02}",
                self.start.day(),
                self.start.month(),
                self.end.day(),
                self.end.month()
            ),
            Granularity::Month => format!(
                "{} {}",
                MONTH_NAMES[self.start.month0() as usize],
                self.start.year()
            ),
        }
    }

    /// UTC instants `[start, until)` for querying the event log. `until` is
    /// the next period's start, so sub-millisecond timestamps after the
    /// displayed `end` still fall in exactly one period.
    pub fn utc_window(&self, offset: FixedOffset) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let until = self.end.checked_add_signed(Duration::milliseconds(1))?;
        let start = offset.from_local_datetime(&self.start).single()?;
        let until = offset.from_local_datetime(&until).single()?;
        Some((start.with_timezone(&Utc), until.with_timezone(&Utc)))
    }
}
