use std::time::{Duration, Instant};

use crate::game::GamePhase;

/// Per-session round timer and counter.
///
/// Round time only accumulates while the engine is `Running`.
#[derive(Debug, Clone)]
pub struct SessionMetrics {
    accumulated: Duration,
    running_since: Option<Instant>,
    last_phase: GamePhase,
    pub rounds_played: u32,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self {
            accumulated: Duration::ZERO,
            running_since: None,
            last_phase: GamePhase::Idle,
            rounds_played: 0,
        }
    }

    /// Feed the engine phase seen in the latest snapshot
    pub fn observe(&mut self, phase: GamePhase, now: Instant) {
        if phase == self.last_phase {
            return;
        }

        if let Some(since) = self.running_since.take() {
            self.accumulated += now.saturating_duration_since(since);
        }

        match phase {
            GamePhase::Running => self.running_since = Some(now),
            GamePhase::Idle => self.accumulated = Duration::ZERO,
            GamePhase::Over => self.rounds_played += 1,
            GamePhase::Paused => {}
        }

        self.last_phase = phase;
    }

    pub fn round_time(&self, now: Instant) -> Duration {
        let running = self
            .running_since
            .map(|since| now.saturating_duration_since(since))
            .unwrap_or_default();
        self.accumulated + running
    }

    pub fn format_time(&self, now: Instant) -> String {
        let total_secs = self.round_time(now).as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

impl Default for SessionMetrics {
    fn default() -> Self {
        Self::new()
    }
}
