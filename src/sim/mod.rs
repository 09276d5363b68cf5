//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Virtual time only (the caller advances the scheduler)
//! - Seeded RNG only
//! - No rendering, storage or platform dependencies

pub mod motion;
pub mod schedule;
pub mod session;
pub mod state;

pub use motion::{Bounce, Direction, MotionEngine, PlayBounds, Sign};
pub use schedule::{Scheduler, TaskHandle};
pub use session::{GameSession, ScoreSink};
pub use state::{GamePhase, RoundMode, SessionConfig, SessionEvent, SessionSnapshot};
