//! Round configuration and published state types

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::motion::{Direction, PlayBounds};
use crate::consts::*;

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for `start`
    Idle,
    /// Target moving, taps count
    Running,
    /// Round over, score submitted
    Ended,
}

/// How a round ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RoundMode {
    /// Fixed movement tick; the countdown ends the round
    #[default]
    Countdown,
    /// No countdown. Each tap shortens the movement tick instead of
    /// lengthening the step; the round ends on `finish`.
    Endless,
}

/// Tuning for one round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub bounds: PlayBounds,
    pub start_pos: Vec2,
    pub start_direction: Direction,
    pub initial_speed: f32,
    pub score_increment: u32,
    pub speed_increment: f32,
    pub round_seconds: u32,
    pub move_period_ms: u64,
    pub countdown_period_ms: u64,
    pub mode: RoundMode,
    /// When set, each round draws its start direction from this seed
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            bounds: PlayBounds::default(),
            start_pos: Vec2::new(TARGET_START_X, TARGET_START_Y),
            start_direction: Direction::default(),
            initial_speed: START_SPEED,
            score_increment: SCORE_INCREMENT,
            speed_increment: SPEED_INCREMENT,
            round_seconds: ROUND_SECONDS,
            move_period_ms: MOVE_PERIOD_MS,
            countdown_period_ms: COUNTDOWN_PERIOD_MS,
            mode: RoundMode::Countdown,
            seed: None,
        }
    }
}

/// Read-only view of a session for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: GamePhase,
    pub position: Vec2,
    pub score: u32,
    pub countdown: u32,
    pub speed: f32,
}

/// Things that happened since the last drain, for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    Started,
    /// Target hit a wall on the given axes
    Bounced { x: bool, y: bool },
    /// Countdown decremented to the given value
    Tick { remaining: u32 },
    Tapped { score: u32, speed: f32 },
    /// Round over with the submitted score
    Ended { score: u32 },
    Abandoned,
}
