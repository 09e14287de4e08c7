//! End-to-end session scenarios driven through `SessionController`.

use std::collections::VecDeque;
use std::path::PathBuf;

use chrono::{DateTime, Duration, TimeZone, Utc};
use tickcross_core::config::BotConfig;
use tickcross_core::domain::{ClosedTrade, Direction, PriceTick, TradeIntent, TradeResult};
use tickcross_core::feed::{FeedEvent, ReplayFeed, VecFeed};
use tickcross_core::session::{Flow, RunEnd};
use tickcross_core::sink::{OrderSink, SinkError, TradeLogSink};
use tickcross_core::trade_log::TradeLogError;
use tickcross_core::{SessionConfig, SessionController, SessionOutcome, SignalState};

type TestController = SessionController<Vec<TradeIntent>, Vec<ClosedTrade>>;

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

fn config(short: usize, long: usize, max_trades: u32, cooldown_secs: u64) -> SessionConfig {
    let mut bot = BotConfig::default();
    bot.sma.short_period = short;
    bot.sma.long_period = long;
    bot.risk.max_trades = max_trades;
    bot.risk.cooldown_secs = cooldown_secs;
    bot.session_config()
}

fn controller(config: SessionConfig) -> TestController {
    SessionController::new(config, Vec::new(), Vec::new())
}

/// One tick per second starting at `start_sec`.
fn ticks(prices: &[f64], start_sec: i64) -> Vec<FeedEvent> {
    prices
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            FeedEvent::Tick(PriceTick::new(
                "R_75",
                p,
                base() + Duration::seconds(start_sec + i as i64),
            ))
        })
        .collect()
}

fn result(pnl: f64, at_sec: i64) -> FeedEvent {
    FeedEvent::TradeResult(TradeResult {
        pnl,
        closed_at: base() + Duration::seconds(at_sec),
    })
}

fn disconnect(at_sec: i64) -> FeedEvent {
    FeedEvent::Disconnected {
        reason: "socket closed".into(),
        at: base() + Duration::seconds(at_sec),
    }
}

#[test]
fn rising_prices_admit_one_long() {
    let mut ctl = controller(config(2, 4, 10, 60));
    let mut feed = VecFeed::new(ticks(&[1.0, 1.0, 1.0, 1.0, 2.0, 3.0, 4.0, 5.0], 0));

    let summary = ctl.run(&mut feed);

    assert_eq!(summary.end, RunEnd::FeedExhausted);
    assert_eq!(summary.ticks_processed, 8);
    assert_eq!(summary.signals, 1);
    assert_eq!(summary.admitted, 1);
    assert_eq!(ctl.sink().len(), 1);
    assert_eq!(ctl.sink()[0].direction, Direction::Long);
    assert_eq!(ctl.sink()[0].contract_type(), "RISE");
    assert_eq!(ctl.session().signal_state(), SignalState::Long);
}

#[test]
fn equal_periods_never_signal() {
    let mut ctl = controller(config(5, 5, 10, 60));
    let prices = [10.0, 10.0, 10.0, 10.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0];
    let summary = ctl.run(&mut VecFeed::new(ticks(&prices, 0)));

    assert_eq!(summary.signals, 0);
    assert!(ctl.sink().is_empty());
    assert_eq!(ctl.session().signal_state(), SignalState::Neutral);
}

#[test]
fn rising_then_flat_fires_exactly_once() {
    let mut prices: Vec<f64> = (1..=10).map(f64::from).collect();
    prices.extend(std::iter::repeat(10.0).take(20));

    let mut ctl = controller(config(2, 4, 10, 0));
    let summary = ctl.run(&mut VecFeed::new(ticks(&prices, 0)));

    assert_eq!(summary.signals, 1);
    assert_eq!(summary.admitted, 1);
}

#[test]
fn cooldown_rejection_consumes_the_signal() {
    // Long at t=4, Short at t=8 (inside a 60s cooldown), then keeps falling.
    let prices = [1.0, 1.0, 1.0, 1.0, 2.0, 3.0, 4.0, 5.0, 1.0, 0.5, 0.25, 0.1];
    let mut ctl = controller(config(2, 4, 10, 60));
    let summary = ctl.run(&mut VecFeed::new(ticks(&prices, 0)));

    assert_eq!(summary.signals, 2);
    assert_eq!(summary.admitted, 1);
    assert_eq!(summary.rejected_cooldown, 1);
    assert_eq!(ctl.session().signal_state(), SignalState::Short);
    assert_eq!(ctl.session().stats().trade_count, 1);
}

#[test]
fn halt_keeps_recording_results_and_ends_on_disconnect() {
    let mut events = ticks(&[1.0, 1.0, 1.0, 1.0, 2.0, 3.0, 4.0, 5.0, 1.0], 0);
    events.push(result(0.95, 60));
    events.push(disconnect(61));
    // Never reached: the run ends at the disconnect.
    events.extend(ticks(&[1.0, 1.0, 1.0, 1.0, 2.0], 120));

    let mut ctl = controller(config(2, 4, 1, 0));
    let mut feed = VecFeed::new(events);
    let summary = ctl.run(&mut feed);

    assert_eq!(summary.admitted, 1);
    assert_eq!(summary.rejected_stopped, 1);
    assert_eq!(summary.results_recorded, 1);
    assert_eq!(summary.final_outcome, SessionOutcome::StoppedMaxTrades);
    assert_eq!(summary.end, RunEnd::DisconnectedAfterHalt);
    assert_eq!(summary.sessions_started, 1);
    assert_eq!(feed.remaining(), 5);

    let log = ctl.trade_log();
    assert_eq!(log.len(), 1);
    assert!(log[0].matched);
    assert_eq!(log[0].direction, Some(Direction::Long));
}

#[test]
fn disconnect_resets_everything() {
    let mut ctl = controller(config(2, 4, 10, 60));
    ctl.handle_event(FeedEvent::Connected {
        balance: 1000.0,
        at: base(),
    });
    for event in ticks(&[1.0, 1.0, 1.0, 1.0, 2.0], 0) {
        ctl.handle_event(event);
    }
    ctl.handle_event(result(-1.0, 60));
    assert_eq!(ctl.session().stats().trade_count, 1);
    assert_eq!(ctl.session().stats().realized_pnl, -1.0);

    assert_eq!(ctl.handle_event(disconnect(61)), Flow::Continue);

    let session = ctl.session();
    assert_eq!(ctl.sessions_started(), 2);
    assert_eq!(session.id(), 2);
    assert_eq!(session.stats().trade_count, 0);
    assert_eq!(session.stats().realized_pnl, 0.0);
    assert_eq!(session.stats().last_trade_at, None);
    assert_eq!(session.signal_state(), SignalState::Neutral);
    assert!(session.tracker().is_empty());
    assert_eq!(session.outcome(), SessionOutcome::Running);

    let snap = ctl.live_stats().snapshot();
    assert_eq!(snap.session_id, 2);
    assert_eq!(snap.trade_count, 0);
    assert_eq!(snap.pnl, 0.0);
}

#[test]
fn new_session_after_reset_can_trade_immediately() {
    // The cooldown from the old session does not carry over.
    let mut events = ticks(&[1.0, 1.0, 1.0, 1.0, 2.0], 0);
    events.push(disconnect(5));
    events.extend(ticks(&[1.0, 1.0, 1.0, 1.0, 2.0], 6));

    let mut ctl = controller(config(2, 4, 10, 60));
    let summary = ctl.run(&mut VecFeed::new(events));

    assert_eq!(summary.sessions_started, 2);
    assert_eq!(summary.admitted, 2);
    assert_eq!(summary.rejected_cooldown, 0);
}

#[test]
fn stop_loss_from_results_halts_on_next_signal() {
    let mut events = vec![result(-6.0, 0), result(-4.5, 1)];
    events.extend(ticks(&[1.0, 1.0, 1.0, 1.0, 2.0], 2));

    let mut ctl = controller(config(2, 4, 10, 0));
    let summary = ctl.run(&mut VecFeed::new(events));

    assert_eq!(summary.unmatched_results, 2);
    assert_eq!(summary.admitted, 0);
    assert_eq!(summary.rejected_stopped, 1);
    assert_eq!(summary.final_outcome, SessionOutcome::StoppedStopLoss);
    assert!(ctl.sink().is_empty());
    assert!(ctl.trade_log().iter().all(|t| !t.matched));
}

#[test]
fn live_stats_track_the_session() {
    let mut ctl = controller(config(2, 4, 10, 60));
    let live = ctl.live_stats();
    ctl.handle_event(FeedEvent::Connected {
        balance: 50.0,
        at: base(),
    });
    for event in ticks(&[1.0, 1.0, 1.0, 1.0, 2.0], 0) {
        ctl.handle_event(event);
    }
    ctl.handle_event(result(0.9, 60));

    let snap = live.snapshot();
    assert_eq!(snap.session_id, 1);
    assert_eq!(snap.trade_count, 1);
    assert!((snap.pnl - 0.9).abs() < 1e-10);
    assert!((snap.balance - 50.9).abs() < 1e-10);
    assert_eq!(snap.outcome, SessionOutcome::Running);
}

#[test]
fn replay_feed_runs_end_to_end() {
    let csv = "\
kind,timestamp,price,pnl,balance
connected,2024-03-01T12:00:00Z,,,100.0
tick,2024-03-01T12:00:01Z,1.0,,
tick,2024-03-01T12:00:02Z,1.0,,
tick,2024-03-01T12:00:03Z,oops,,
tick,2024-03-01T12:00:04Z,1.0,,
tick,2024-03-01T12:00:05Z,1.0,,
tick,2024-03-01T12:00:06Z,2.0,,
result,2024-03-01T12:01:06Z,,0.95,
";
    let mut feed = ReplayFeed::from_reader(csv.as_bytes(), "R_75");
    let mut ctl = controller(config(2, 4, 10, 60));
    let summary = ctl.run(&mut feed);

    assert_eq!(summary.feed_errors, 1);
    assert_eq!(summary.admitted, 1);
    assert_eq!(summary.results_recorded, 1);
    assert!((summary.final_balance - 100.95).abs() < 1e-10);
    assert_eq!(summary.end, RunEnd::FeedExhausted);
}

// ── Failing collaborators ────────────────────────────────────────────

/// Fails one submission per queued error, then places everything.
#[derive(Default)]
struct FlakySink {
    failures: VecDeque<SinkError>,
    placed: Vec<TradeIntent>,
}

impl FlakySink {
    fn failing(failures: impl IntoIterator<Item = SinkError>) -> Self {
        Self {
            failures: failures.into_iter().collect(),
            placed: Vec::new(),
        }
    }
}

impl OrderSink for FlakySink {
    fn submit(&mut self, intent: &TradeIntent) -> Result<(), SinkError> {
        if let Some(err) = self.failures.pop_front() {
            return Err(err);
        }
        self.placed.push(intent.clone());
        Ok(())
    }
}

/// Trade log whose disk is always full.
#[derive(Default)]
struct BrokenLog {
    attempts: usize,
}

impl TradeLogSink for BrokenLog {
    fn record(&mut self, _trade: &ClosedTrade) -> Result<(), TradeLogError> {
        self.attempts += 1;
        Err(TradeLogError::Io {
            path: PathBuf::from("trade_history.csv"),
            source: std::io::Error::other("disk full"),
        })
    }
}

/// Long at t=4, Short at t=8 with short=2, long=4.
const LONG_THEN_SHORT: [f64; 9] = [1.0, 1.0, 1.0, 1.0, 2.0, 3.0, 4.0, 5.0, 1.0];

#[test]
fn failed_submission_is_not_paired_with_later_results() {
    let mut events = ticks(&LONG_THEN_SHORT, 0);
    events.push(result(-1.0, 70));

    let sink = FlakySink::failing([SinkError::Unavailable("socket closed".into())]);
    let mut ctl = SessionController::new(config(2, 4, 10, 0), sink, Vec::<ClosedTrade>::new());
    let summary = ctl.run(&mut VecFeed::new(events));

    assert_eq!(summary.admitted, 2);
    assert_eq!(summary.submit_failures, 1);
    assert_eq!(ctl.sink().placed.len(), 1);
    assert_eq!(ctl.sink().placed[0].direction, Direction::Short);

    let log = ctl.trade_log();
    assert_eq!(log.len(), 1);
    assert!(log[0].matched);
    assert_eq!(log[0].direction, Some(Direction::Short));
    assert_eq!(log[0].trade_type(), "FALL");
    assert_eq!(ctl.session().governor().open_trades(), 0);

    // The failed attempt still counts toward limits.
    assert_eq!(ctl.session().stats().trade_count, 2);
}

#[test]
fn rejected_orders_keep_the_session_running() {
    let mut events = ticks(&LONG_THEN_SHORT, 0);
    events.push(result(0.5, 70));

    let sink = FlakySink::failing([
        SinkError::Rejected("market closed".into()),
        SinkError::Rejected("market closed".into()),
    ]);
    let mut ctl = SessionController::new(config(2, 4, 10, 0), sink, Vec::<ClosedTrade>::new());
    let summary = ctl.run(&mut VecFeed::new(events));

    assert_eq!(summary.end, RunEnd::FeedExhausted);
    assert_eq!(summary.final_outcome, SessionOutcome::Running);
    assert_eq!(summary.signals, 2);
    assert_eq!(summary.submit_failures, 2);
    assert!(ctl.sink().placed.is_empty());
    assert_eq!(ctl.session().governor().open_trades(), 0);

    // Nothing was placed, so the result pairs with nothing.
    assert_eq!(summary.unmatched_results, 1);
    assert_eq!(summary.final_pnl, 0.5);
}

#[test]
fn trade_log_failure_does_not_stop_the_session() {
    let mut events = ticks(&LONG_THEN_SHORT, 0);
    events.push(result(1.25, 70));
    events.push(result(-0.5, 71));
    events.extend(ticks(&[0.5, 0.25], 72));

    let mut ctl = SessionController::new(
        config(2, 4, 10, 0),
        Vec::<TradeIntent>::new(),
        BrokenLog::default(),
    );
    let summary = ctl.run(&mut VecFeed::new(events));

    assert_eq!(summary.end, RunEnd::FeedExhausted);
    assert_eq!(summary.ticks_processed, 11);
    assert_eq!(summary.results_recorded, 2);
    assert_eq!(summary.trade_log_failures, 2);
    assert_eq!(ctl.trade_log().attempts, 2);
    assert!((summary.final_pnl - 0.75).abs() < 1e-10);
    assert_eq!(ctl.session().governor().open_trades(), 0);
}

#[test]
fn non_finite_result_is_dropped_and_stops_stay_armed() {
    let mut events = vec![
        result(-50.0, 0),
        result(f64::NAN, 1),
        result(f64::INFINITY, 2),
    ];
    events.extend(ticks(&[1.0, 1.0, 1.0, 1.0, 2.0], 3));

    let mut ctl = controller(config(2, 4, 10, 0));
    let summary = ctl.run(&mut VecFeed::new(events));

    assert_eq!(summary.results_recorded, 1);
    assert_eq!(summary.results_dropped, 2);
    assert_eq!(summary.final_pnl, -50.0);
    assert_eq!(summary.admitted, 0);
    assert_eq!(summary.final_outcome, SessionOutcome::StoppedStopLoss);
    assert_eq!(ctl.trade_log().len(), 1);
}

#[test]
fn replayed_nan_result_is_a_feed_error() {
    let csv = "\
kind,timestamp,price,pnl,balance
result,2024-03-01T12:00:00Z,,-50.0,
result,2024-03-01T12:00:01Z,,NaN,
tick,2024-03-01T12:00:02Z,1.0,,
tick,2024-03-01T12:00:03Z,1.0,,
tick,2024-03-01T12:00:04Z,1.0,,
tick,2024-03-01T12:00:05Z,1.0,,
tick,2024-03-01T12:00:06Z,2.0,,
";
    let mut feed = ReplayFeed::from_reader(csv.as_bytes(), "R_75");
    let mut ctl = controller(config(2, 4, 10, 60));
    let summary = ctl.run(&mut feed);

    assert_eq!(summary.feed_errors, 1);
    assert_eq!(summary.final_pnl, -50.0);
    assert_eq!(summary.admitted, 0);
    assert_eq!(summary.final_outcome, SessionOutcome::StoppedStopLoss);
}
