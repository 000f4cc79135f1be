//! Yahoo Finance chart API client
//!
//! Fetches the full daily history of a symbol in one blocking request.

use crate::{sort_and_validate, DailyOhlcv, DataError, Result};
use chrono::DateTime;
use log::{debug, info};
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
    symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteColumns>,
}

#[derive(Debug, Deserialize)]
struct QuoteColumns {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

/// Yahoo Finance client
#[derive(Debug, Clone)]
pub struct YahooFinance {
    base_url: String,
}

impl Default for YahooFinance {
    fn default() -> Self {
        Self::new()
    }
}

impl YahooFinance {
    /// Client for the public chart endpoint
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Client for another host serving the same chart API
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn history_url(&self, symbol: &str) -> String {
        format!(
            "{}/{}?range=max&interval=1d&events=history",
            self.base_url.trim_end_matches('/'),
            symbol
        )
    }

    /// Fetch the complete daily history of `symbol`
    pub fn fetch_daily_max(&self, symbol: &str) -> Result<Vec<DailyOhlcv>> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(DataError::InvalidData("Empty ticker symbol".to_string()));
        }

        let url = self.history_url(symbol);
        info!("Fetching daily history for {}", symbol);
        debug!("GET {}", url);

        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()?;
        let response = client.get(&url).send()?;
        let status_error = response.error_for_status_ref().err();
        let body = response.text()?;

        if let Some(err) = status_error {
            // Unknown symbols come back as 404 with an error payload
            return match parse_chart_response(&body, symbol) {
                Err(api @ DataError::Api { .. }) => Err(api),
                _ => Err(err.into()),
            };
        }
        parse_chart_response(&body, symbol)
    }
}

fn value_at<T: Copy>(column: &[Option<T>], i: usize) -> Option<T> {
    column.get(i).copied().flatten()
}

/// Turn a chart API payload into sorted daily bars
///
/// Rows where any price is null are skipped. When the payload carries the
/// same session twice (a live bar next to the closed one), the later row wins.
pub fn parse_chart_response(json: &str, symbol: &str) -> Result<Vec<DailyOhlcv>> {
    let response: ChartResponse = serde_json::from_str(json)?;

    if let Some(error) = response.chart.error {
        return Err(DataError::Api {
            code: error.code,
            description: error.description,
        });
    }

    let data = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| DataError::NoData(symbol.to_string()))?;
    let quote = data
        .indicators
        .quote
        .first()
        .ok_or_else(|| DataError::NoData(symbol.to_string()))?;
    let offset = data.meta.as_ref().map_or(0, |m| m.gmtoffset);
    if let Some(reported) = data.meta.as_ref().and_then(|m| m.symbol.as_deref()) {
        debug!("Chart payload for {}", reported);
    }

    let mut bars: Vec<DailyOhlcv> = Vec::with_capacity(data.timestamp.len());
    for (i, &ts) in data.timestamp.iter().enumerate() {
        let (open, high, low, close) = match (
            value_at(&quote.open, i),
            value_at(&quote.high, i),
            value_at(&quote.low, i),
            value_at(&quote.close, i),
        ) {
            (Some(o), Some(h), Some(l), Some(c)) => (o, h, l, c),
            _ => continue,
        };
        let volume = value_at(&quote.volume, i).unwrap_or(0);

        let date = DateTime::from_timestamp(ts + offset, 0)
            .ok_or_else(|| DataError::InvalidData(format!("Timestamp {} out of range", ts)))?
            .date_naive();

        let bar = DailyOhlcv::new(date, open, high, low, close, volume);
        match bars.last_mut() {
            Some(last) if last.date == date => *last = bar,
            _ => bars.push(bar),
        }
    }

    if bars.is_empty() {
        return Err(DataError::NoData(symbol.to_string()));
    }

    sort_and_validate(&mut bars)?;
    info!("Received {} daily bars for {}", bars.len(), symbol);
    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const PAYLOAD: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"symbol": "TSLA", "gmtoffset": -14400},
                "timestamp": [1704205800, 1704292200, 1704378600, 1704378660],
                "indicators": {
                    "quote": [{
                        "open":   [250.08, null,   236.86, 236.90],
                        "high":   [251.25, 245.68, 242.70, 242.80],
                        "low":    [244.41, 236.32, 237.73, 237.70],
                        "close":  [248.42, 238.45, 237.93, 238.00],
                        "volume": [104654200, 121082600, null, 1000]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn test_parse_skips_nulls_and_keeps_latest_duplicate() {
        let bars = parse_chart_response(PAYLOAD, "TSLA").unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bars[0].data.volume, 104654200);
        assert_eq!(bars[1].date, NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
        assert_eq!(bars[1].data.close, 238.00);
    }

    #[test]
    fn test_api_error_surfaced() {
        let payload = r#"{"chart": {"result": null, "error": {
            "code": "Not Found", "description": "No data found, symbol may be delisted"}}}"#;
        match parse_chart_response(payload, "NOPE") {
            Err(DataError::Api { code, .. }) => assert_eq!(code, "Not Found"),
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_and_malformed_payloads() {
        let empty = r#"{"chart": {"result": [], "error": null}}"#;
        assert!(matches!(
            parse_chart_response(empty, "X"),
            Err(DataError::NoData(_))
        ));
        assert!(matches!(
            parse_chart_response("not json", "X"),
            Err(DataError::Json(_))
        ));
    }

    #[test]
    fn test_history_url() {
        let client = YahooFinance::with_base_url("http://localhost:8080/chart/");
        assert_eq!(
            client.history_url("AAPL"),
            "http://localhost:8080/chart/AAPL?range=max&interval=1d&events=history"
        );
        assert!(client.fetch_daily_max("  ").is_err());
    }

    /// Answer a single request on a local port with a canned response
    fn serve_once(status_line: &'static str, body: &'static str) -> String {
        use std::io::{Read, Write};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{}/chart/", addr)
    }

    #[test]
    fn test_rate_limit_is_http_error() {
        let base = serve_once("429 Too Many Requests", "Too Many Requests");
        let client = YahooFinance::with_base_url(base);

        match client.fetch_daily_max("AAPL") {
            Err(DataError::Http(e)) => {
                assert_eq!(e.status().map(|s| s.as_u16()), Some(429));
            }
            other => panic!("expected an HTTP error, got {:?}", other),
        }
    }

    #[test]
    fn test_not_found_keeps_api_description() {
        let base = serve_once(
            "404 Not Found",
            r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#,
        );
        let client = YahooFinance::with_base_url(base);

        match client.fetch_daily_max("NOPE") {
            Err(DataError::Api { code, .. }) => assert_eq!(code, "Not Found"),
            other => panic!("expected an API error, got {:?}", other),
        }
    }
}
