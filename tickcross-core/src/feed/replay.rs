//! CSV replay feed.
//!
//! Columns: `kind,timestamp,price,pnl,balance`
//! - `kind`: `tick`, `result`, `connected` or `disconnect`
//! - `timestamp`: RFC 3339
//! - `price` required for ticks, `pnl` for results, `balance` for connects
//! - `pnl` and `balance` must be finite
//!
//! A malformed row yields `FeedError::Parse` and the next call moves on to the
//! following row.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{FeedError, FeedEvent, FeedSource};
use crate::domain::{PriceTick, TradeResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ReplayKind {
    Tick,
    Result,
    Connected,
    Disconnect,
}

#[derive(Debug, Deserialize)]
struct ReplayRow {
    kind: ReplayKind,
    timestamp: DateTime<Utc>,
    price: Option<f64>,
    pnl: Option<f64>,
    balance: Option<f64>,
}

pub struct ReplayFeed<R: Read> {
    rows: csv::DeserializeRecordsIntoIter<R, ReplayRow>,
    instrument: String,
    row: u64,
}

impl ReplayFeed<File> {
    pub fn open(path: &Path, instrument: impl Into<String>) -> Result<Self, FeedError> {
        let file = File::open(path)
            .map_err(|e| FeedError::Io(format!("failed to open {}: {e}", path.display())))?;
        Ok(Self::from_reader(file, instrument))
    }
}

impl<R: Read> ReplayFeed<R> {
    /// Ticks are stamped with `instrument`; the file carries one instrument only.
    pub fn from_reader(reader: R, instrument: impl Into<String>) -> Self {
        let rows = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader)
            .into_deserialize();
        Self {
            rows,
            instrument: instrument.into(),
            row: 0,
        }
    }

    fn to_event(&self, row: ReplayRow) -> Result<FeedEvent, FeedError> {
        let missing = |field: &str| FeedError::Parse {
            row: self.row,
            message: format!("{field} is required for this kind"),
        };
        let finite = |field: &str, value: f64| {
            if value.is_finite() {
                Ok(value)
            } else {
                Err(FeedError::Parse {
                    row: self.row,
                    message: format!("{field} must be finite, got {value}"),
                })
            }
        };

        match row.kind {
            ReplayKind::Tick => {
                let price = row.price.ok_or_else(|| missing("price"))?;
                Ok(FeedEvent::Tick(PriceTick::new(
                    self.instrument.clone(),
                    price,
                    row.timestamp,
                )))
            }
            ReplayKind::Result => {
                let pnl = finite("pnl", row.pnl.ok_or_else(|| missing("pnl"))?)?;
                Ok(FeedEvent::TradeResult(TradeResult {
                    pnl,
                    closed_at: row.timestamp,
                }))
            }
            ReplayKind::Connected => {
                let balance = finite("balance", row.balance.ok_or_else(|| missing("balance"))?)?;
                Ok(FeedEvent::Connected {
                    balance,
                    at: row.timestamp,
                })
            }
            ReplayKind::Disconnect => Ok(FeedEvent::Disconnected {
                reason: "replay disconnect".to_string(),
                at: row.timestamp,
            }),
        }
    }
}

impl<R: Read> FeedSource for ReplayFeed<R> {
    fn next_event(&mut self) -> Result<Option<FeedEvent>, FeedError> {
        let next = match self.rows.next() {
            None => return Ok(None),
            Some(next) => next,
        };
        self.row += 1;

        match next {
            Ok(row) => self.to_event(row).map(Some),
            Err(e) if e.is_io_error() => Err(FeedError::Io(e.to_string())),
            Err(e) => Err(FeedError::Parse {
                row: self.row,
                message: e.to_string(),
            }),
        }
    }
}
