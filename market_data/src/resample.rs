//! Calendar-day reindexing

use crate::{DailyOhlcv, DataError, OhlcvData, Result};
use chrono::{Days, NaiveDate};

/// Reindex bars onto every calendar day from the first to the last date
///
/// Days without a session (weekends, holidays) carry `None`. Input must be
/// sorted with strictly increasing dates.
pub fn to_calendar_daily(bars: &[DailyOhlcv]) -> Result<Vec<(NaiveDate, Option<OhlcvData>)>> {
    let (first, last) = match (bars.first(), bars.last()) {
        (Some(f), Some(l)) => (f.date, l.date),
        _ => return Ok(Vec::new()),
    };
    if let Some(pair) = bars.windows(2).find(|w| w[0].date >= w[1].date) {
        return Err(DataError::InvalidData(format!(
            "Dates must be strictly increasing, found {} before {}",
            pair[0].date, pair[1].date
        )));
    }

    let span = (last - first).num_days() as usize + 1;
    let mut calendar = Vec::with_capacity(span);
    let mut sessions = bars.iter().peekable();
    let mut day = first;
    loop {
        let session = match sessions.peek() {
            Some(bar) if bar.date == day => sessions.next().map(|b| b.data),
            _ => None,
        };
        calendar.push((day, session));
        if day == last {
            break;
        }
        day = day
            .checked_add_days(Days::new(1))
            .ok_or_else(|| DataError::InvalidData(format!("Date overflow after {}", day)))?;
    }
    Ok(calendar)
}

/// Propagate the last seen value forward over gaps
///
/// Leading gaps stay `None`.
pub fn forward_fill<T: Clone>(values: &[Option<T>]) -> Vec<Option<T>> {
    let mut last: Option<T> = None;
    values
        .iter()
        .map(|v| {
            if v.is_some() {
                last = v.clone();
            }
            last.clone()
        })
        .collect()
}
