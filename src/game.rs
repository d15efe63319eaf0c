use crate::board::{Coordinate, CoordinateBoard, Perspective};
use crate::config::SessionDuration;
use crate::error::Result;
use crate::history::{HistoryEntry, HistoryFile, HistoryLog};
use crate::session::{SessionStats, SessionSummary};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::time::{Duration, Instant};

/// Time source for response timing and history timestamps
pub trait Clock {
    /// Monotonic time since an arbitrary origin
    fn now(&self) -> Duration;

    fn wall_time(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock that only moves when told to. Wall time advances in step.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<Duration>,
    wall_origin: NaiveDateTime,
}

impl ManualClock {
    pub fn new(wall_origin: NaiveDateTime) -> Self {
        Self {
            now: Cell::new(Duration::ZERO),
            wall_origin,
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn wall_time(&self) -> NaiveDateTime {
        let offset =
            chrono::Duration::from_std(self.now.get()).unwrap_or_else(|_| chrono::Duration::zero());
        self.wall_origin + offset
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Idle,
    Active,
}

/// What happens to a session stopped before its timer ran out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbandonPolicy {
    /// Drop the session, history is untouched
    #[default]
    Discard,
    /// Keep the partial session as if time had run out
    Record,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No session running
    Idle,
    Running { remaining_secs: u64 },
    Finished(HistoryEntry),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// Nothing to click at (no session or no target)
    Ignored,
    Correct {
        response_time: f64,
        next: Coordinate,
    },
    Wrong,
}

/// Everything the render layer needs, copied out so it can't mutate the game
#[derive(Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    pub state: GameState,
    pub target: Option<String>,
    pub remaining_secs: u64,
    pub duration_secs: u64,
    pub perspective: Perspective,
    pub summary: SessionSummary,
}

/// Owns the board, the running session and the history.
///
/// Driven entirely from outside: the runtime delivers one tick per second
/// and the UI delivers clicks already mapped to grid squares.
#[derive(Debug)]
pub struct GameController<C: Clock = SystemClock> {
    board: CoordinateBoard,
    stats: SessionStats,
    history: HistoryLog,
    state: GameState,
    duration: SessionDuration,
    remaining_secs: u64,
    target_notation: Option<String>,
    last_target_at: Option<Duration>,
    abandon_policy: AbandonPolicy,
    clock: C,
}

impl GameController<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock::new())
    }
}

impl Default for GameController<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> GameController<C> {
    pub fn with_clock(clock: C) -> Self {
        Self::with_board(CoordinateBoard::new(), clock)
    }

    pub fn with_board(board: CoordinateBoard, clock: C) -> Self {
        Self {
            board,
            stats: SessionStats::new(),
            history: HistoryLog::new(),
            state: GameState::Idle,
            duration: SessionDuration::default(),
            remaining_secs: 0,
            target_notation: None,
            last_target_at: None,
            abandon_policy: AbandonPolicy::default(),
            clock,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn board(&self) -> &CoordinateBoard {
        &self.board
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == GameState::Active
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn target_notation(&self) -> Option<&str> {
        self.target_notation.as_deref()
    }

    pub fn abandon_policy(&self) -> AbandonPolicy {
        self.abandon_policy
    }

    pub fn set_abandon_policy(&mut self, policy: AbandonPolicy) {
        self.abandon_policy = policy;
    }

    pub fn set_perspective(&mut self, perspective: Perspective) {
        self.board.set_perspective(perspective);
    }

    pub fn flip_perspective(&mut self) {
        self.board.flip_perspective();
        tracing::debug!(perspective = %self.board.perspective(), "flipped board");
    }

    /// Starts a fresh session. A session already in progress is thrown away.
    pub fn start(&mut self, duration: SessionDuration) -> Coordinate {
        if self.is_active() {
            tracing::info!("restarting while a session was active, discarding it");
        }

        self.stats.reset();
        self.duration = duration;
        self.remaining_secs = duration.secs();
        self.state = GameState::Active;

        let coord = self.next_target();
        tracing::info!(
            duration_secs = duration.secs(),
            target = %coord.notation,
            "session started"
        );
        coord
    }

    /// One second of countdown.
    pub fn on_tick(&mut self) -> TickOutcome {
        if !self.is_active() {
            return TickOutcome::Idle;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return TickOutcome::Running {
                remaining_secs: self.remaining_secs,
            };
        }

        match self.finalize() {
            Some(entry) => TickOutcome::Finished(entry),
            None => TickOutcome::Idle,
        }
    }

    pub fn handle_click(&mut self, col: usize, row: usize) -> ClickOutcome {
        if !self.is_active() || self.board.target().is_none() {
            return ClickOutcome::Ignored;
        }

        if self.board.validate_click(col, row) {
            let now = self.clock.now();
            let response_time = self
                .last_target_at
                .map(|t| now.saturating_sub(t).as_secs_f64())
                .unwrap_or(0.0);
            self.stats.record_attempt(true, response_time);

            let next = self.next_target();
            tracing::debug!(response_time, next = %next.notation, "correct click");
            ClickOutcome::Correct {
                response_time,
                next,
            }
        } else {
            self.stats.record_attempt(false, 0.0);
            tracing::debug!(col, row, "wrong click");
            ClickOutcome::Wrong
        }
    }

    /// Ends the running session and records it. `None` when nothing was running.
    pub fn finalize(&mut self) -> Option<HistoryEntry> {
        if !self.is_active() {
            return None;
        }

        self.stop();
        let summary = self.stats.summary();
        let entry = HistoryEntry::from_summary(&summary, self.clock.wall_time());
        self.history.push(entry);

        tracing::info!(
            score = summary.score,
            correct = summary.correct,
            wrong = summary.wrong,
            "session finished"
        );
        Some(entry)
    }

    /// Stops a session before its timer expires, following the abandon policy.
    pub fn abandon(&mut self) -> Option<HistoryEntry> {
        if !self.is_active() {
            return None;
        }

        match self.abandon_policy {
            AbandonPolicy::Record => self.finalize(),
            AbandonPolicy::Discard => {
                tracing::info!(
                    remaining_secs = self.remaining_secs,
                    "session abandoned, not recorded"
                );
                self.stop();
                None
            }
        }
    }

    pub fn summary(&self) -> SessionSummary {
        self.stats.summary()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            state: self.state,
            target: self.target_notation.clone(),
            remaining_secs: self.remaining_secs,
            duration_secs: self.duration.secs(),
            perspective: self.board.perspective(),
            summary: self.stats.summary(),
        }
    }

    /// Replaces the whole history with the file's contents. On error the
    /// current history is left as it was.
    pub fn load_history(&mut self, file: &HistoryFile) -> Result<Option<NaiveDateTime>> {
        let loaded = file.load()?;
        self.history = loaded.log;
        Ok(loaded.saved_at)
    }

    pub fn save_history(&self, file: &HistoryFile) -> Result<()> {
        file.save(&self.history, self.clock.wall_time())
    }

    pub fn unload_history(&mut self) {
        tracing::info!(sessions = self.history.len(), "history unloaded");
        self.history.clear();
    }

    fn next_target(&mut self) -> Coordinate {
        let coord = self.board.generate_coordinate();
        self.target_notation = Some(coord.notation.clone());
        self.last_target_at = Some(self.clock.now());
        coord
    }

    fn stop(&mut self) {
        self.state = GameState::Idle;
        self.remaining_secs = 0;
        self.board.clear_target();
        self.target_notation = None;
        self.last_target_at = None;
    }
}
