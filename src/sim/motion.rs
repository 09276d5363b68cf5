//! Target motion with elastic wall reflection
//!
//! Position is the target's top-left corner. Direction carries only the
//! sign per axis; magnitude lives in `speed`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Sign of one velocity axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sign {
    Negative,
    Positive,
}

impl Sign {
    #[inline]
    pub fn as_f32(self) -> f32 {
        match self {
            Sign::Negative => -1.0,
            Sign::Positive => 1.0,
        }
    }

    #[inline]
    pub fn flipped(self) -> Self {
        match self {
            Sign::Negative => Sign::Positive,
            Sign::Positive => Sign::Negative,
        }
    }
}

/// Unit heading, one sign per axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Direction {
    pub x: Sign,
    pub y: Sign,
}

impl Direction {
    pub const fn new(x: Sign, y: Sign) -> Self {
        Self { x, y }
    }

    pub fn as_vec2(self) -> Vec2 {
        Vec2::new(self.x.as_f32(), self.y.as_f32())
    }
}

impl Default for Direction {
    /// Down and to the right in screen coordinates
    fn default() -> Self {
        Self::new(Sign::Positive, Sign::Positive)
    }
}

/// Play area plus the size of the target moving inside it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayBounds {
    pub width: f32,
    pub height: f32,
    pub target_width: f32,
    pub target_height: f32,
}

impl Default for PlayBounds {
    fn default() -> Self {
        Self {
            width: PLAY_WIDTH,
            height: PLAY_HEIGHT,
            target_width: TARGET_WIDTH,
            target_height: TARGET_HEIGHT,
        }
    }
}

impl PlayBounds {
    pub fn new(width: f32, height: f32, target_width: f32, target_height: f32) -> Self {
        Self {
            width,
            height,
            target_width,
            target_height,
        }
    }

    /// Largest top-left corner that keeps the whole target on screen.
    /// Collapses to zero when the target is larger than the play area.
    pub fn max_corner(&self) -> Vec2 {
        Vec2::new(
            (self.width - self.target_width).max(0.0),
            (self.height - self.target_height).max(0.0),
        )
    }

    /// Clamp a top-left corner into the reachable region
    pub fn clamp(&self, pos: Vec2) -> Vec2 {
        pos.clamp(Vec2::ZERO, self.max_corner())
    }

    /// Whether a top-left corner keeps the target fully inside
    pub fn contains(&self, pos: Vec2) -> bool {
        let max = self.max_corner();
        pos.x >= 0.0 && pos.y >= 0.0 && pos.x <= max.x && pos.y <= max.y
    }
}

/// Which axes reflected during a step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bounce {
    pub x: bool,
    pub y: bool,
}

impl Bounce {
    pub fn any(&self) -> bool {
        self.x || self.y
    }
}

/// Deterministic target motion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionEngine {
    pub pos: Vec2,
    pub direction: Direction,
    pub speed: f32,
    pub bounds: PlayBounds,
}

impl MotionEngine {
    /// Create an engine; the start position is clamped into the bounds
    pub fn new(bounds: PlayBounds, pos: Vec2, direction: Direction, speed: f32) -> Self {
        Self {
            pos: bounds.clamp(pos),
            direction,
            speed: speed.max(0.0),
            bounds,
        }
    }

    /// Advance by `dt` ticks and reflect off the walls.
    pub fn step(&mut self, dt: f32) -> Bounce {
        self.pos += self.direction.as_vec2() * self.speed * dt;

        let max = self.bounds.max_corner();
        let bounce = Bounce {
            x: Self::reflect_axis(&mut self.direction.x, self.pos.x, max.x),
            y: Self::reflect_axis(&mut self.direction.y, self.pos.y, max.y),
        };

        // Overshoot is folded back onto the wall so the target never drifts out
        self.pos = self.bounds.clamp(self.pos);
        bounce
    }

    /// Flip the sign when the target touches the wall it is heading into
    fn reflect_axis(sign: &mut Sign, pos: f32, max: f32) -> bool {
        let hit = match *sign {
            Sign::Negative => pos <= 0.0,
            Sign::Positive => pos >= max,
        };
        if hit {
            *sign = sign.flipped();
        }
        hit
    }

    /// Raise speed by `delta`. No ceiling.
    pub fn accelerate(&mut self, delta: f32) {
        self.speed += delta;
    }
}
