/// Points for every correctly located square
pub const POINTS_PER_CORRECT: u32 = 100;
/// Deducted for every wrong square
pub const PENALTY_PER_WRONG: u32 = 50;
/// Speed bonus at a 0s average; shrinks by 100 per second of average response
pub const SPEED_BONUS_MAX: f64 = 500.0;

/// Running counters for one timed session.
///
/// Only correct attempts feed the timing aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStats {
    correct_count: u32,
    wrong_count: u32,
    total_response_time: f64,
    fastest_response: f64,
    slowest_response: f64,
}

impl Default for SessionStats {
    fn default() -> Self {
        Self {
            correct_count: 0,
            wrong_count: 0,
            total_response_time: 0.0,
            fastest_response: f64::INFINITY,
            slowest_response: 0.0,
        }
    }
}

/// Read-only view of a session, as shown in the stats panel and stored in history
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSummary {
    pub score: i64,
    pub correct: u32,
    pub wrong: u32,
    pub accuracy_pct: f64,
    pub avg_response_time: f64,
    pub fastest_response: f64,
    pub slowest_response: f64,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// `response_time` is in seconds and ignored for wrong attempts.
    pub fn record_attempt(&mut self, correct: bool, response_time: f64) {
        if correct {
            let response_time = response_time.max(0.0);
            self.correct_count += 1;
            self.total_response_time += response_time;
            self.fastest_response = self.fastest_response.min(response_time);
            self.slowest_response = self.slowest_response.max(response_time);
        } else {
            self.wrong_count += 1;
        }
    }

    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    pub fn wrong_count(&self) -> u32 {
        self.wrong_count
    }

    pub fn total_attempts(&self) -> u32 {
        self.correct_count + self.wrong_count
    }

    pub fn total_response_time(&self) -> f64 {
        self.total_response_time
    }

    /// `None` until the first correct attempt
    pub fn fastest_response(&self) -> Option<f64> {
        self.fastest_response
            .is_finite()
            .then_some(self.fastest_response)
    }

    pub fn slowest_response(&self) -> f64 {
        self.slowest_response
    }

    pub fn accuracy_pct(&self) -> f64 {
        match self.total_attempts() {
            0 => 0.0,
            total => self.correct_count as f64 / total as f64 * 100.0,
        }
    }

    pub fn avg_response_time(&self) -> f64 {
        match self.correct_count {
            0 => 0.0,
            n => self.total_response_time / n as f64,
        }
    }

    /// Zero without a correct attempt. Otherwise uncapped below, so heavy
    /// penalties can push the score negative.
    pub fn calculate_score(&self) -> i64 {
        if self.correct_count == 0 {
            return 0;
        }

        let base = (self.correct_count * POINTS_PER_CORRECT) as f64;
        let accuracy = self.correct_count as f64 / self.total_attempts() as f64;
        let accuracy_bonus = base * accuracy;
        let speed_bonus = (SPEED_BONUS_MAX - self.avg_response_time() * 100.0).max(0.0);
        let penalty = (self.wrong_count * PENALTY_PER_WRONG) as f64;

        (base + accuracy_bonus + speed_bonus - penalty).floor() as i64
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            score: self.calculate_score(),
            correct: self.correct_count,
            wrong: self.wrong_count,
            accuracy_pct: self.accuracy_pct(),
            avg_response_time: self.avg_response_time(),
            fastest_response: self.fastest_response().unwrap_or(0.0),
            slowest_response: self.slowest_response,
        }
    }
}
