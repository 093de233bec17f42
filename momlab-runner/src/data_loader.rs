//! CSV bar ingestion — the validation boundary in front of the engine.
//!
//! The engine assumes a clean, chronologically ordered series; this loader
//! is where that assumption is earned. Required columns are
//! `date,open,high,low,close,volume`; every other numeric column is carried
//! into the bar's indicator map under its lowercased header, so a file can
//! ship exactly the indicators its strategy needs (including `ml_prob` from
//! an external scorer). Violations fail loudly with the offending row.

use chrono::NaiveDate;
use momlab_core::domain::Bar;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

const REQUIRED: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

/// Errors from the ingestion boundary.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open bar file: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column '{0}'")]
    MissingColumn(String),

    #[error("row {row}: invalid value '{value}' in column '{column}'")]
    Invalid {
        row: usize,
        column: String,
        value: String,
    },

    #[error("row {row} ({date}): bar dates must be strictly increasing")]
    OutOfOrder { row: usize, date: NaiveDate },

    #[error("row {row} ({date}): non-finite value in column '{column}'")]
    NonFinite {
        row: usize,
        date: NaiveDate,
        column: String,
    },

    #[error("row {row} ({date}): OHLC sanity check failed")]
    InsaneBar { row: usize, date: NaiveDate },
}

/// Load bars from a CSV file. An empty file (header only) is a valid empty
/// series, not an error.
pub fn load_bars(path: impl AsRef<Path>) -> Result<Vec<Bar>, LoadError> {
    load_bars_from_reader(File::open(path)?)
}

/// Load bars from any reader. See the module docs for the expected schema.
pub fn load_bars_from_reader<R: Read>(reader: R) -> Result<Vec<Bar>, LoadError> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_ascii_lowercase())
        .collect();

    let column = |name: &str| -> Result<usize, LoadError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
    };
    let date_col = column("date")?;
    let open_col = column("open")?;
    let high_col = column("high")?;
    let low_col = column("low")?;
    let close_col = column("close")?;
    let volume_col = column("volume")?;

    // Everything beyond the OHLCV schema is an indicator column.
    let indicator_cols: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !REQUIRED.contains(&h.as_str()))
        .map(|(i, h)| (i, h.clone()))
        .collect();

    let mut bars: Vec<Bar> = Vec::new();
    for (record_index, record) in csv_reader.records().enumerate() {
        let record = record?;
        let row = record_index + 2; // 1-based, after the header line

        let field = |col: usize| record.get(col).unwrap_or("").trim();
        let parse_f64 = |col: usize, name: &str| -> Result<f64, LoadError> {
            field(col).parse::<f64>().map_err(|_| LoadError::Invalid {
                row,
                column: name.to_string(),
                value: field(col).to_string(),
            })
        };

        let date = NaiveDate::parse_from_str(field(date_col), "%Y-%m-%d").map_err(|_| {
            LoadError::Invalid {
                row,
                column: "date".to_string(),
                value: field(date_col).to_string(),
            }
        })?;
        if let Some(last) = bars.last() {
            if date <= last.date {
                return Err(LoadError::OutOfOrder { row, date });
            }
        }

        let open = parse_f64(open_col, "open")?;
        let high = parse_f64(high_col, "high")?;
        let low = parse_f64(low_col, "low")?;
        let close = parse_f64(close_col, "close")?;
        // Providers frequently ship volume as a float; accept and truncate.
        let volume = parse_f64(volume_col, "volume")? as u64;

        let mut indicators = HashMap::with_capacity(indicator_cols.len());
        for (col, name) in &indicator_cols {
            let value = parse_f64(*col, name)?;
            if !value.is_finite() {
                return Err(LoadError::NonFinite {
                    row,
                    date,
                    column: name.clone(),
                });
            }
            indicators.insert(name.clone(), value);
        }

        let bar = Bar {
            date,
            open,
            high,
            low,
            close,
            volume,
            indicators,
        };
        if !bar.is_sane() {
            return Err(LoadError::InsaneBar { row, date });
        }
        bars.push(bar);
    }

    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use momlab_core::domain::bar::indicator;

    const HEADER: &str = "date,open,high,low,close,volume,stoch_k,rsi,macd,macd_signal,atr";

    fn load(body: &str) -> Result<Vec<Bar>, LoadError> {
        let csv = format!("{HEADER}\n{body}");
        load_bars_from_reader(csv.as_bytes())
    }

    #[test]
    fn loads_bars_with_indicators() {
        let bars = load(
            "2024-01-02,100,101,99,100.5,1000,55,52,0.5,0.4,1.5\n\
             2024-01-03,100.5,102,100,101.5,1100,58,54,0.6,0.45,1.4",
        )
        .unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, 100.5);
        assert_eq!(bars[0].indicator(indicator::STOCH_K), Ok(55.0));
        assert_eq!(bars[1].indicator(indicator::ATR), Ok(1.4));
    }

    #[test]
    fn unknown_numeric_columns_become_indicators() {
        let csv = "date,open,high,low,close,volume,ml_prob\n\
                   2024-01-02,100,101,99,100.5,1000,0.73";
        let bars = load_bars_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(bars[0].indicator(indicator::ML_PROB), Ok(0.73));
    }

    #[test]
    fn header_only_is_an_empty_series() {
        let bars = load_bars_from_reader(HEADER.as_bytes()).unwrap();
        assert!(bars.is_empty());
    }

    #[test]
    fn rejects_missing_required_column() {
        let csv = "date,open,high,low,close\n2024-01-02,100,101,99,100.5";
        let err = load_bars_from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(c) if c == "volume"));
    }

    #[test]
    fn rejects_out_of_order_dates() {
        let err = load(
            "2024-01-03,100,101,99,100.5,1000,55,52,0.5,0.4,1.5\n\
             2024-01-02,100,101,99,100.5,1000,55,52,0.5,0.4,1.5",
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::OutOfOrder { row: 3, .. }));
    }

    #[test]
    fn rejects_duplicate_dates() {
        let err = load(
            "2024-01-02,100,101,99,100.5,1000,55,52,0.5,0.4,1.5\n\
             2024-01-02,100,101,99,100.5,1000,55,52,0.5,0.4,1.5",
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::OutOfOrder { .. }));
    }

    #[test]
    fn rejects_non_finite_indicator() {
        let err = load("2024-01-02,100,101,99,100.5,1000,NaN,52,0.5,0.4,1.5").unwrap_err();
        assert!(matches!(
            err,
            LoadError::NonFinite { row: 2, ref column, .. } if column == "stoch_k"
        ));
    }

    #[test]
    fn rejects_insane_ohlc() {
        // High below low.
        let err = load("2024-01-02,100,98,99,100.5,1000,55,52,0.5,0.4,1.5").unwrap_err();
        assert!(matches!(err, LoadError::InsaneBar { row: 2, .. }));
    }

    #[test]
    fn rejects_garbage_values() {
        let err = load("2024-01-02,abc,101,99,100.5,1000,55,52,0.5,0.4,1.5").unwrap_err();
        assert!(matches!(err, LoadError::Invalid { ref column, .. } if column == "open"));
    }
}
