//! CSV input and output of daily bars
//!
//! Columns are located by header name, case-insensitively, so files exported
//! by different tools load the same way. `Open` and `Volume` are optional; a
//! missing open falls back to the close and a missing volume to zero.

use crate::{sort_and_validate, DailyOhlcv, DataError, Result};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use log::{debug, warn};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

struct Columns {
    date: usize,
    open: Option<usize>,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require =
            |name: &str| find(name).ok_or_else(|| DataError::MissingColumn(name.to_string()));

        Ok(Self {
            date: require("Date")?,
            open: find("Open"),
            high: require("High")?,
            low: require("Low")?,
            close: require("Close")?,
            volume: find("Volume"),
        })
    }
}

/// Parse `YYYY-MM-DD`, ignoring any trailing time or offset
fn parse_date(raw: &str, row: usize) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    let day = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| DataError::Parse {
        row,
        message: format!("invalid date '{}': {}", raw, e),
    })
}

/// Parse a numeric field; empty and `null` cells are missing values
fn parse_number(raw: Option<&str>, name: &str, row: usize) -> Result<Option<f64>> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(s) if s.eq_ignore_ascii_case("null") || s.eq_ignore_ascii_case("nan") => {
            return Ok(None)
        }
        Some(s) => s,
    };
    raw.parse::<f64>().map(Some).map_err(|e| DataError::Parse {
        row,
        message: format!("invalid {} '{}': {}", name, raw, e),
    })
}

/// Read daily bars from any CSV source
///
/// Rows with a missing high, low or close are skipped. The result is sorted
/// by date; repeated dates are an error.
pub fn read_daily_csv<R: Read>(reader: R) -> Result<Vec<DailyOhlcv>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);
    let columns = Columns::locate(rdr.headers()?)?;

    let mut bars = Vec::new();
    let mut skipped = 0usize;
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        // 1-based, counting the header line
        let row = i + 2;

        let date = parse_date(record.get(columns.date).unwrap_or(""), row)?;
        let high = parse_number(record.get(columns.high), "High", row)?;
        let low = parse_number(record.get(columns.low), "Low", row)?;
        let close = parse_number(record.get(columns.close), "Close", row)?;

        let (high, low, close) = match (high, low, close) {
            (Some(h), Some(l), Some(c)) => (h, l, c),
            _ => {
                skipped += 1;
                continue;
            }
        };
        let open = match columns.open {
            Some(idx) => parse_number(record.get(idx), "Open", row)?.unwrap_or(close),
            None => close,
        };
        let volume = match columns.volume {
            Some(idx) => parse_number(record.get(idx), "Volume", row)?
                .filter(|v| *v >= 0.0)
                .map(|v| v.round() as u64)
                .unwrap_or(0),
            None => 0,
        };

        bars.push(DailyOhlcv::new(date, open, high, low, close, volume));
    }

    if skipped > 0 {
        warn!("Skipped {} rows with missing prices", skipped);
    }
    if bars.is_empty() {
        return Err(DataError::InvalidData("CSV contains no price rows".to_string()));
    }

    sort_and_validate(&mut bars)?;
    debug!(
        "Loaded {} bars from {} to {}",
        bars.len(),
        bars[0].date,
        bars[bars.len() - 1].date
    );
    Ok(bars)
}

/// Load daily bars from a CSV file
pub fn load_daily_csv<P: AsRef<Path>>(path: P) -> Result<Vec<DailyOhlcv>> {
    let file = File::open(path.as_ref())?;
    read_daily_csv(file)
}

/// Write bars with the header `Date,Open,High,Low,Close,Volume`
pub fn write_daily_csv<W: Write>(writer: W, bars: &[DailyOhlcv]) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record(["Date", "Open", "High", "Low", "Close", "Volume"])?;
    for bar in bars {
        wtr.write_record(&[
            bar.date.format("%Y-%m-%d").to_string(),
            bar.data.open.to_string(),
            bar.data.high.to_string(),
            bar.data.low.to_string(),
            bar.data.close.to_string(),
            bar.data.volume.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_minimal_columns_in_any_order() {
        let csv = "close,low,Date,HIGH\n11,9,2020-01-03,12\n10,8,2020-01-02,11\n";
        let bars = read_daily_csv(csv.as_bytes()).unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2020, 1, 2).unwrap());
        assert_eq!(bars[0].data.open, 10.0);
        assert_eq!(bars[0].data.volume, 0);
        assert_eq!(bars[1].average_price(), 10.5);
    }

    #[test]
    fn test_date_with_time_suffix() {
        let csv = "Date,Open,High,Low,Close,Volume\n\
                   2021-06-01 00:00:00-04:00,1,2,0.5,1.5,100\n";
        let bars = read_daily_csv(csv.as_bytes()).unwrap();
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2021, 6, 1).unwrap());
        assert_eq!(bars[0].data.volume, 100);
    }

    #[test]
    fn test_missing_prices_skipped() {
        let csv = "Date,High,Low,Close\n2020-01-02,11,9,10\n2020-01-03,,9,null\n";
        let bars = read_daily_csv(csv.as_bytes()).unwrap();
        assert_eq!(bars.len(), 1);
    }

    #[test]
    fn test_bad_values_report_row() {
        let csv = "Date,High,Low,Close\n2020-01-02,11,9,10\n2020-01-03,abc,9,10\n";
        match read_daily_csv(csv.as_bytes()) {
            Err(DataError::Parse { row, .. }) => assert_eq!(row, 3),
            other => panic!("expected parse error, got {:?}", other),
        }

        let csv = "Date,High,Low,Close\n01/02/2020,11,9,10\n";
        assert!(matches!(
            read_daily_csv(csv.as_bytes()),
            Err(DataError::Parse { row: 2, .. })
        ));
    }

    #[test]
    fn test_write_then_read() {
        let bars = vec![DailyOhlcv::new(
            NaiveDate::from_ymd_opt(2022, 3, 4).unwrap(),
            10.0,
            12.5,
            9.25,
            11.0,
            4200,
        )];
        let mut buffer = Vec::new();
        write_daily_csv(&mut buffer, &bars).unwrap();

        let text = String::from_utf8(buffer.clone()).unwrap();
        assert!(text.starts_with("Date,Open,High,Low,Close,Volume"));
        assert_eq!(read_daily_csv(buffer.as_slice()).unwrap(), bars);
    }
}
