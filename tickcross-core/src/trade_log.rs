//! Append-only CSV trade history.
//!
//! One row per closed trade: `Date/Time,Trade Type,Amount,P/L,Balance`.
//! The header is written only when the file is created, so restarts keep
//! appending to the same history.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::ClosedTrade;
use crate::sink::TradeLogSink;

pub const HEADER: [&str; 5] = ["Date/Time", "Trade Type", "Amount", "P/L", "Balance"];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum TradeLogError {
    #[error("trade log I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("trade log CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub struct CsvTradeLog {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl CsvTradeLog {
    /// Open `path` for appending, creating it (and its parent dir) with a header if new.
    pub fn open(path: &Path) -> Result<Self, TradeLogError> {
        let io_err = |source| TradeLogError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let is_new = !path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(io_err)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if is_new {
            writer.write_record(HEADER)?;
            writer.flush().map_err(io_err)?;
        }

        Ok(Self {
            path: path.to_path_buf(),
            writer,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TradeLogSink for CsvTradeLog {
    fn record(&mut self, trade: &ClosedTrade) -> Result<(), TradeLogError> {
        self.writer.write_record([
            trade.closed_at.format(TIMESTAMP_FORMAT).to_string(),
            trade.trade_type().to_string(),
            format!("{:.2}", trade.stake),
            format!("{:.2}", trade.pnl),
            format!("{:.2}", trade.balance),
        ])?;
        self.writer.flush().map_err(|source| TradeLogError::Io {
            path: self.path.clone(),
            source,
        })
    }
}
