//! Round lifecycle: start, movement and countdown ticks, taps, end
//!
//! A session is driven from a single thread. The caller forwards taps and
//! advances virtual time; the session's scheduler decides which ticks fire.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::motion::{Direction, MotionEngine, Sign};
use super::schedule::{Scheduler, TaskHandle};
use super::state::{GamePhase, RoundMode, SessionConfig, SessionEvent, SessionSnapshot};
use crate::consts::MOVE_DT;

/// Receives the final score when a round ends
pub trait ScoreSink {
    fn submit_score(&mut self, name: &str, score: u32);
}

impl<S: ScoreSink + ?Sized> ScoreSink for &mut S {
    fn submit_score(&mut self, name: &str, score: u32) {
        (**self).submit_score(name, score);
    }
}

/// A missing sink drops the result (e.g. the scoreboard failed to open)
impl<S: ScoreSink> ScoreSink for Option<S> {
    fn submit_score(&mut self, name: &str, score: u32) {
        match self {
            Some(sink) => sink.submit_score(name, score),
            None => log::warn!("Scoreboard unavailable, {}'s score of {} not saved", name, score),
        }
    }
}

/// In-memory record of submissions
impl ScoreSink for Vec<(String, u32)> {
    fn submit_score(&mut self, name: &str, score: u32) {
        self.push((name.to_string(), score));
    }
}

/// One player's round
pub struct GameSession<S: ScoreSink> {
    player: String,
    config: SessionConfig,
    sink: S,
    phase: GamePhase,
    score: u32,
    countdown: u32,
    engine: MotionEngine,
    scheduler: Scheduler,
    movement_task: Option<TaskHandle>,
    countdown_task: Option<TaskHandle>,
    rng: Option<Pcg32>,
    events: Vec<SessionEvent>,
}

impl<S: ScoreSink> GameSession<S> {
    pub fn new(player: impl Into<String>, mut config: SessionConfig, sink: S) -> Self {
        // Taps never slow the target down
        if config.speed_increment < 0.0 {
            log::warn!("speed_increment {} clamped to 0", config.speed_increment);
            config.speed_increment = 0.0;
        }
        let rng = config.seed.map(Pcg32::seed_from_u64);
        let engine = MotionEngine::new(
            config.bounds,
            config.start_pos,
            config.start_direction,
            config.initial_speed,
        );
        Self {
            player: player.into(),
            countdown: config.round_seconds,
            config,
            sink,
            phase: GamePhase::Idle,
            score: 0,
            engine,
            scheduler: Scheduler::new(),
            movement_task: None,
            countdown_task: None,
            rng,
            events: Vec::new(),
        }
    }

    /// Idle -> Running. Returns false (and does nothing) in any other phase.
    pub fn start(&mut self) -> bool {
        if self.phase != GamePhase::Idle {
            log::debug!("start ignored in {:?}", self.phase);
            return false;
        }

        self.reset_round();
        self.phase = GamePhase::Running;
        self.movement_task = Some(self.scheduler.schedule_every(self.config.move_period_ms));
        if self.config.mode == RoundMode::Countdown {
            self.countdown_task =
                Some(self.scheduler.schedule_every(self.config.countdown_period_ms));
        }
        self.events.push(SessionEvent::Started);
        log::info!(
            "Round started for {} ({:?}, {}s)",
            self.player,
            self.config.mode,
            self.config.round_seconds
        );

        if self.config.mode == RoundMode::Countdown && self.countdown == 0 {
            self.finish_round();
        }
        true
    }

    /// Drop the current round (if any) and start a fresh one for the same player
    pub fn restart(&mut self) -> bool {
        self.cancel_tasks();
        self.phase = GamePhase::Idle;
        self.start()
    }

    /// Leave a running round without submitting; back to Idle
    pub fn abandon(&mut self) -> bool {
        if self.phase != GamePhase::Running {
            return false;
        }
        self.cancel_tasks();
        self.reset_round();
        self.phase = GamePhase::Idle;
        self.events.push(SessionEvent::Abandoned);
        log::info!("Round abandoned by {}", self.player);
        true
    }

    /// End an endless round now and submit its score.
    /// Countdown rounds only end when the clock runs out.
    pub fn finish(&mut self) -> bool {
        if self.phase != GamePhase::Running || self.config.mode != RoundMode::Endless {
            return false;
        }
        self.finish_round();
        true
    }

    /// Register a tap on the target. Ignored unless running.
    pub fn on_tap(&mut self) -> bool {
        if self.phase != GamePhase::Running {
            return false;
        }

        self.score = self.score.saturating_add(self.config.score_increment);
        self.engine.accelerate(self.config.speed_increment);

        if self.config.mode == RoundMode::Endless {
            if let Some(task) = self.movement_task {
                let period = self.endless_period_ms();
                self.scheduler.reschedule(task, period);
            }
        }

        self.events.push(SessionEvent::Tapped {
            score: self.score,
            speed: self.engine.speed,
        });
        log::debug!("tap: score={} speed={}", self.score, self.engine.speed);
        true
    }

    /// Advance virtual time, firing every tick that falls due
    pub fn advance(&mut self, elapsed_ms: u64) {
        let until = self.scheduler.now_ms().saturating_add(elapsed_ms);
        while let Some(task) = self.scheduler.pop_due(until) {
            if Some(task) == self.movement_task {
                self.movement_tick();
            } else if Some(task) == self.countdown_task {
                self.countdown_tick();
            }
        }
        self.scheduler.advance_to(until);
    }

    fn movement_tick(&mut self) {
        let dt = match self.config.mode {
            RoundMode::Countdown => MOVE_DT,
            // Constant distance per tick; speed shows up as a shorter period
            RoundMode::Endless if self.config.initial_speed > 0.0 && self.engine.speed > 0.0 => {
                self.config.initial_speed / self.engine.speed
            }
            RoundMode::Endless => MOVE_DT,
        };

        let bounce = self.engine.step(dt);
        if bounce.any() {
            self.events.push(SessionEvent::Bounced {
                x: bounce.x,
                y: bounce.y,
            });
        }
    }

    fn countdown_tick(&mut self) {
        self.countdown = self.countdown.saturating_sub(1);
        self.events.push(SessionEvent::Tick {
            remaining: self.countdown,
        });
        if self.countdown == 0 {
            self.finish_round();
        }
    }

    /// Cancel both ticks, then hand the score over exactly once
    fn finish_round(&mut self) {
        self.cancel_tasks();
        self.phase = GamePhase::Ended;
        self.events.push(SessionEvent::Ended { score: self.score });
        log::info!("Round over for {}: score {}", self.player, self.score);
        self.sink.submit_score(&self.player, self.score);
    }

    fn cancel_tasks(&mut self) {
        let handles: Vec<TaskHandle> = [self.movement_task.take(), self.countdown_task.take()]
            .into_iter()
            .flatten()
            .collect();
        self.scheduler.cancel_all(&handles);
    }

    fn reset_round(&mut self) {
        let direction = match self.rng.as_mut() {
            Some(rng) => Direction::new(random_sign(rng), random_sign(rng)),
            None => self.config.start_direction,
        };
        self.engine = MotionEngine::new(
            self.config.bounds,
            self.config.start_pos,
            direction,
            self.config.initial_speed,
        );
        self.score = 0;
        self.countdown = self.config.round_seconds;
    }

    fn endless_period_ms(&self) -> u64 {
        let base = self.config.move_period_ms;
        let initial = self.config.initial_speed;
        let speed = self.engine.speed;
        if initial <= 0.0 || speed <= initial {
            return base;
        }
        ((base as f32 * initial / speed).round() as u64).max(1)
    }

    pub fn current_state(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            position: self.engine.pos,
            score: self.score,
            countdown: self.countdown,
            speed: self.engine.speed,
        }
    }

    /// Take the events recorded since the last call
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    pub fn speed(&self) -> f32 {
        self.engine.speed
    }

    pub fn position(&self) -> Vec2 {
        self.engine.pos
    }

    pub fn direction(&self) -> Direction {
        self.engine.direction
    }

    pub fn player(&self) -> &str {
        &self.player
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current movement tick period (varies only in endless mode)
    pub fn move_period_ms(&self) -> Option<u64> {
        self.movement_task
            .and_then(|task| self.scheduler.period_ms(task))
    }

    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

fn random_sign(rng: &mut Pcg32) -> Sign {
    if rng.random_bool(0.5) {
        Sign::Positive
    } else {
        Sign::Negative
    }
}
