//! Chase Tap - a timed reflex game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (target motion, scheduler, round lifecycle)
//! - `highscores`: Best-score-per-player leaderboard backed by SQLite
//! - `persistence`: Database handle and schema
//! - `platform`: Wall-clock to simulation time conversion
//! - `settings`: Round tuning and preferences (JSON)

pub mod error;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;

pub use error::{ScoreError, ScoreResult, SettingsError};
pub use highscores::{ScoreEntry, ScoreStore, Scoreboard, SubmitOutcome};
pub use settings::Settings;
pub use sim::{GamePhase, GameSession, ScoreSink, SessionConfig, SessionSnapshot};

/// Game configuration constants
pub mod consts {
    /// Movement tick period (20 Hz)
    pub const MOVE_PERIOD_MS: u64 = 50;
    /// Countdown tick period
    pub const COUNTDOWN_PERIOD_MS: u64 = 1000;
    /// Fixed displacement step per movement tick (speed is pixels per tick)
    pub const MOVE_DT: f32 = 1.0;

    /// Round length in seconds
    pub const ROUND_SECONDS: u32 = 30;

    /// Play area defaults (portrait phone screen)
    pub const PLAY_WIDTH: f32 = 390.0;
    pub const PLAY_HEIGHT: f32 = 844.0;

    /// Target defaults
    pub const TARGET_WIDTH: f32 = 100.0;
    pub const TARGET_HEIGHT: f32 = 80.0;
    pub const TARGET_START_X: f32 = 100.0;
    pub const TARGET_START_Y: f32 = 100.0;

    /// Initial target speed (pixels per movement tick)
    pub const START_SPEED: f32 = 2.0;
    /// Speed added per successful tap
    pub const SPEED_INCREMENT: f32 = 1.5;
    /// Points per successful tap
    pub const SCORE_INCREMENT: u32 = 1;
}
