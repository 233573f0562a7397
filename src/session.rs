use chrono::{DateTime, Local};
use std::time::Instant;

use crate::detect;
use crate::input::InputKind;
use crate::records::RecordSet;
use crate::time_series::ChartPoint;

/// Bounded history length.
pub const MAX_HISTORY: usize = 50;
/// Events closer together than this are treated as switch bounce and dropped.
pub const DEBOUNCE_THRESHOLD_MS: u128 = 10;

const COUNTDOWN_STEP_MS: u128 = 1000;
const COUNTDOWN_GO_HOLD_MS: u128 = 500;
const COUNTDOWN_TOTAL_MS: u128 = 3 * COUNTDOWN_STEP_MS + COUNTDOWN_GO_HOLD_MS;

/// One recorded occurrence, immutable once accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct InputEvent {
    pub sequence_number: u64,
    pub kind: InputKind,
    pub label: String,
    pub interval_ms: u64,
    pub captured_at: DateTime<Local>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimerPhase {
    Idle,
    CountingDown { started: Instant },
    Running,
    Complete,
}

/// Messages the shell feeds into the session; everything else is internal.
#[derive(Debug, Clone)]
pub enum SessionMsg {
    InputOccurred { kind: InputKind, label: String },
    TimerTick,
    ResetRequested,
}

/// What a message did, so the shell can play feedback or persist records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    InputAccepted,
    CountdownStarted,
    SessionCompleted { new_record: bool },
}

/// The active test: recorder, timer state machine, and chart series.
///
/// All time-dependent operations take an explicit `Instant` so tests can
/// drive the countdown and timer with simulated time.
#[derive(Debug)]
pub struct Session {
    pub duration_secs: u64,
    pub phase: TimerPhase,
    pub current_kind: Option<InputKind>,
    pub current_label: Option<String>,
    pub current_count: u64,
    pub total_count: u64,
    pub left_count: u64,
    pub right_count: u64,
    pub key_count: u64,
    pub started_at: Option<Instant>,
    pub last_accepted_at: Option<Instant>,
    pub current_cps: f64,
    pub remaining_secs: f64,
    /// Most-recent-first.
    pub history: Vec<InputEvent>,
    pub chart: Vec<ChartPoint>,
    pub macro_warning: bool,
    pub records: RecordSet,
    next_sequence: u64,
    pending: Option<(InputKind, String)>,
    /// Forces the next accepted event to carry a zero interval (session
    /// start or input switch) while debounce still sees the previous event.
    interval_reset: bool,
}

impl Session {
    pub fn new(duration_secs: u64, records: RecordSet) -> Self {
        Self {
            duration_secs,
            phase: TimerPhase::Idle,
            current_kind: None,
            current_label: None,
            current_count: 0,
            total_count: 0,
            left_count: 0,
            right_count: 0,
            key_count: 0,
            started_at: None,
            last_accepted_at: None,
            current_cps: 0.0,
            remaining_secs: duration_secs as f64,
            history: Vec::new(),
            chart: Vec::new(),
            macro_warning: false,
            records,
            next_sequence: 0,
            pending: None,
            interval_reset: true,
        }
    }

    pub fn handle(&mut self, msg: SessionMsg, now: Instant) -> Effect {
        match msg {
            SessionMsg::InputOccurred { kind, label } => self.on_input(kind, label, now),
            SessionMsg::TimerTick => self.on_tick(now),
            SessionMsg::ResetRequested => {
                self.reset();
                Effect::None
            }
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, TimerPhase::Running)
    }

    pub fn is_counting_down(&self) -> bool {
        matches!(self.phase, TimerPhase::CountingDown { .. })
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.phase, TimerPhase::Complete)
    }

    /// Duration selection is only honored while nothing is in flight.
    pub fn set_duration(&mut self, secs: u64) -> bool {
        if self.is_active() || self.is_counting_down() {
            return false;
        }
        self.duration_secs = secs;
        self.remaining_secs = secs as f64;
        true
    }

    pub fn elapsed_secs(&self, now: Instant) -> f64 {
        self.started_at
            .map(|s| now.duration_since(s).as_secs_f64())
            .unwrap_or(0.0)
    }

    /// The 3-2-1-GO caption for the overlay, while counting down.
    pub fn countdown_caption(&self, now: Instant) -> Option<&'static str> {
        let TimerPhase::CountingDown { started } = self.phase else {
            return None;
        };
        let elapsed = now.duration_since(started).as_millis();
        let caption = match elapsed / COUNTDOWN_STEP_MS {
            0 => "3",
            1 => "2",
            2 => "1",
            _ => "GO!",
        };
        Some(caption)
    }

    fn on_input(&mut self, kind: InputKind, label: String, now: Instant) -> Effect {
        match self.phase {
            TimerPhase::CountingDown { .. } => Effect::None,
            TimerPhase::Idle | TimerPhase::Complete => {
                if self.duration_secs > 0 {
                    // The triggering input is recorded once the countdown ends
                    self.phase = TimerPhase::CountingDown { started: now };
                    self.pending = Some((kind, label));
                    Effect::CountdownStarted
                } else {
                    self.phase = TimerPhase::Running;
                    self.started_at = Some(now);
                    self.switch_input(kind, label.clone(), now);
                    self.accept(kind, label, now)
                }
            }
            TimerPhase::Running => {
                let switched = self.current_kind != Some(kind)
                    || self.current_label.as_deref() != Some(label.as_str());
                if switched {
                    self.switch_input(kind, label.clone(), now);
                }
                self.accept(kind, label, now)
            }
        }
    }

    fn switch_input(&mut self, kind: InputKind, label: String, now: Instant) {
        self.current_kind = Some(kind);
        self.current_label = Some(label);
        self.current_count = 0;
        self.interval_reset = true;

        // Free mode restarts the clock and the chart on a switch; a timed
        // session keeps its clock.
        if self.duration_secs == 0 {
            self.started_at = Some(now);
            self.chart.clear();
        }
    }

    fn accept(&mut self, kind: InputKind, label: String, now: Instant) -> Effect {
        if let Some(last) = self.last_accepted_at {
            if now.duration_since(last).as_millis() < DEBOUNCE_THRESHOLD_MS {
                return Effect::None;
            }
        }

        let interval_ms = if self.interval_reset {
            0
        } else {
            self.last_accepted_at
                .map(|last| now.duration_since(last).as_millis() as u64)
                .unwrap_or(0)
        };
        self.interval_reset = false;

        self.next_sequence += 1;
        self.history.insert(
            0,
            InputEvent {
                sequence_number: self.next_sequence,
                kind,
                label,
                interval_ms,
                captured_at: Local::now(),
            },
        );
        self.history.truncate(MAX_HISTORY);

        self.current_count += 1;
        self.total_count += 1;
        match kind {
            InputKind::LeftClick => self.left_count += 1,
            InputKind::RightClick => self.right_count += 1,
            InputKind::KeyPress => self.key_count += 1,
        }
        self.last_accepted_at = Some(now);

        if self.duration_secs == 0 {
            self.refresh_rate(now);
        }

        let intervals: Vec<u64> = self.history.iter().map(|e| e.interval_ms).collect();
        if let Some(warn) = detect::evaluate(&intervals) {
            self.macro_warning = warn;
        }

        Effect::InputAccepted
    }

    fn on_tick(&mut self, now: Instant) -> Effect {
        match self.phase {
            TimerPhase::CountingDown { started } => {
                if now.duration_since(started).as_millis() >= COUNTDOWN_TOTAL_MS {
                    self.phase = TimerPhase::Running;
                    self.started_at = Some(now);
                    self.chart.clear();
                    self.current_cps = 0.0;
                    self.remaining_secs = self.duration_secs as f64;
                    if let Some((kind, label)) = self.pending.take() {
                        self.current_kind = Some(kind);
                        self.current_label = Some(label.clone());
                        self.current_count = 0;
                        self.interval_reset = true;
                        return self.accept(kind, label, now);
                    }
                }
                Effect::None
            }
            TimerPhase::Running if self.duration_secs > 0 => {
                let elapsed = self.elapsed_secs(now);
                self.remaining_secs = (self.duration_secs as f64 - elapsed).max(0.0);
                if elapsed > 0.0 {
                    self.refresh_rate(now);
                }

                if self.remaining_secs <= 0.0 {
                    self.phase = TimerPhase::Complete;
                    let new_record = self.records.apply_result(
                        self.current_cps,
                        self.duration_secs,
                        self.current_count,
                    );
                    return Effect::SessionCompleted { new_record };
                }
                Effect::None
            }
            _ => Effect::None,
        }
    }

    fn refresh_rate(&mut self, now: Instant) {
        let elapsed = self.elapsed_secs(now);
        if elapsed <= 0.0 {
            return;
        }
        self.current_cps = self.current_count as f64 / elapsed;

        // ~0.5s sampling resolution
        if (elapsed * 2.0).floor() as usize > self.chart.len() {
            self.chart.push(ChartPoint::new(elapsed, self.current_cps));
        }
    }

    /// Clears the test but never the records.
    pub fn reset(&mut self) {
        self.phase = TimerPhase::Idle;
        self.current_kind = None;
        self.current_label = None;
        self.current_count = 0;
        self.total_count = 0;
        self.left_count = 0;
        self.right_count = 0;
        self.key_count = 0;
        self.started_at = None;
        self.last_accepted_at = None;
        self.current_cps = 0.0;
        self.remaining_secs = self.duration_secs as f64;
        self.history.clear();
        self.chart.clear();
        self.macro_warning = false;
        self.next_sequence = 0;
        self.pending = None;
        self.interval_reset = true;
    }

    /// Mean interval over the history window for a click kind, whole ms.
    pub fn avg_click_interval_ms(&self, kind: InputKind) -> u64 {
        let times: Vec<f64> = self
            .history
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.interval_ms as f64)
            .collect();
        crate::util::mean(&times)
            .map(|m| m.round() as u64)
            .unwrap_or(0)
    }

    /// Mean nonzero interval for the currently measured key, whole ms.
    pub fn avg_key_interval_ms(&self) -> u64 {
        let times: Vec<f64> = self
            .history
            .iter()
            .filter(|e| {
                e.kind == InputKind::KeyPress
                    && Some(e.label.as_str()) == self.current_label.as_deref()
                    && e.interval_ms > 0
            })
            .map(|e| e.interval_ms as f64)
            .collect();
        crate::util::mean(&times)
            .map(|m| m.round() as u64)
            .unwrap_or(0)
    }
}
