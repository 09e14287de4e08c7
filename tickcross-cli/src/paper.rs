//! Paper order sink: logs every admitted intent instead of sending it.

use tickcross_core::sink::{OrderSink, SinkError};
use tickcross_core::TradeIntent;
use tracing::info;

#[derive(Debug, Default)]
pub struct PaperSink {
    submitted: u64,
}

impl PaperSink {
    pub fn submitted(&self) -> u64 {
        self.submitted
    }
}

impl OrderSink for PaperSink {
    fn submit(&mut self, intent: &TradeIntent) -> Result<(), SinkError> {
        self.submitted += 1;
        info!(
            instrument = %intent.instrument,
            contract = intent.contract_type(),
            stake = intent.stake,
            currency = %intent.currency,
            duration = %intent.duration,
            "paper order"
        );
        Ok(())
    }
}
