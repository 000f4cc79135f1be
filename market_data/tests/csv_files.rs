use chrono::NaiveDate;
use market_data::generator::generate_daily_data;
use market_data::{load_daily_csv, to_calendar_daily, write_daily_csv, DataError};
use std::fs::File;
use std::io::Write;
use tempfile::tempdir;

#[test]
fn loads_file_written_by_another_tool() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("TSLA.csv");
    let mut file = File::create(&path).unwrap();
    writeln!(file, "Date,Open,High,Low,Close,Adj Close,Volume").unwrap();
    writeln!(file, "2020-01-03,88.1,90.8,87.38,88.6,88.6,88892500").unwrap();
    writeln!(file, "2020-01-02,84.9,86.14,84.34,86.05,86.05,47660500").unwrap();
    drop(file);

    let bars = load_daily_csv(&path).unwrap();
    assert_eq!(bars.len(), 2);
    assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2020, 1, 2).unwrap());
    assert_eq!(bars[1].data.volume, 88892500);
    assert!((bars[0].average_price() - 85.24).abs() < 1e-9);
}

#[test]
fn missing_required_column_is_reported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("no_high.csv");
    std::fs::write(&path, "Date,Low,Close\n2020-01-02,1,2\n").unwrap();

    match load_daily_csv(&path) {
        Err(DataError::MissingColumn(name)) => assert_eq!(name, "High"),
        other => panic!("expected missing column, got {:?}", other),
    }
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    assert!(matches!(
        load_daily_csv(dir.path().join("absent.csv")),
        Err(DataError::Io(_))
    ));
}

#[test]
fn generated_series_survives_file_and_calendar_round() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("synthetic.csv");
    let bars = generate_daily_data(20, 100.0, 0.001, 0.02, 11);
    write_daily_csv(File::create(&path).unwrap(), &bars).unwrap();

    let loaded = load_daily_csv(&path).unwrap();
    assert_eq!(loaded.len(), bars.len());
    assert_eq!(loaded[0].date, bars[0].date);

    // 20 weekdays from Friday 2015-01-02 end on Thursday 2015-01-29
    let calendar = to_calendar_daily(&loaded).unwrap();
    assert_eq!(calendar.len(), 28);
    assert_eq!(calendar.iter().filter(|(_, s)| s.is_some()).count(), 20);
}
