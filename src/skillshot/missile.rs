//! Missile Kinematics
//!
//! A missile's position is never stored. It is recomputed from elapsed
//! flight time, base speed, acceleration and the speed caps.

use serde::{Serialize, Deserialize};

use crate::core::{EntityId, GameTime, Vec2};

/// Speed profile of a missile. Speeds in units/s, acceleration in units/s^2.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Kinematics {
    /// Initial speed
    pub speed: f32,
    /// Acceleration (negative decelerates)
    pub accel: f32,
    /// Floor for decelerating missiles
    pub min_speed: f32,
    /// Cap for accelerating missiles (0 = uncapped)
    pub max_speed: f32,
}

impl Kinematics {
    /// Constant-speed missile.
    pub fn constant(speed: f32) -> Self {
        Self {
            speed,
            ..Self::default()
        }
    }

    /// Speed the profile settles at, if it ever stops changing.
    fn limit_speed(&self) -> Option<f32> {
        if self.accel > 0.0 {
            (self.max_speed > 0.0).then(|| self.max_speed.max(self.speed))
        } else if self.accel < 0.0 {
            Some(self.min_speed.max(0.0).min(self.speed))
        } else {
            Some(self.speed)
        }
    }

    /// Seconds until the speed reaches its cap or floor (infinite if never).
    fn seconds_to_limit(&self) -> f32 {
        if self.accel == 0.0 {
            return 0.0;
        }
        match self.limit_speed() {
            Some(limit) => ((limit - self.speed) / self.accel).max(0.0),
            None => f32::INFINITY,
        }
    }

    /// Distance covered after `elapsed` ms of flight.
    ///
    /// Quadratic while the speed is changing, linear once it hits the cap
    /// or floor.
    pub fn distance_after(&self, elapsed: GameTime) -> f32 {
        let t = (elapsed / 1000.0).max(0.0);
        let t_limit = self.seconds_to_limit();

        if t <= t_limit {
            self.speed * t + 0.5 * self.accel * t * t
        } else {
            let ramp = self.speed * t_limit + 0.5 * self.accel * t_limit * t_limit;
            ramp + self.limit_speed().unwrap_or(self.speed) * (t - t_limit)
        }
    }

    /// Flight time (ms) to cover `distance`, or `None` if the missile never
    /// gets there (zero speed, or decelerating to a stop first).
    pub fn travel_time(&self, distance: f32) -> Option<GameTime> {
        if distance <= 0.0 {
            return Some(0.0);
        }
        if self.accel == 0.0 {
            return (self.speed > 0.0).then(|| distance / self.speed * 1000.0);
        }

        let t_limit = self.seconds_to_limit();
        let ramp = if t_limit.is_finite() {
            self.speed * t_limit + 0.5 * self.accel * t_limit * t_limit
        } else {
            f32::INFINITY
        };

        if distance <= ramp {
            // 0.5*a*t^2 + v*t - d = 0, smaller positive root
            let disc = self.speed * self.speed + 2.0 * self.accel * distance;
            if disc < 0.0 {
                return None;
            }
            Some((disc.sqrt() - self.speed) / self.accel * 1000.0)
        } else {
            let limit = self.limit_speed().unwrap_or(0.0);
            if limit <= 0.0 {
                return None;
            }
            Some((t_limit + (distance - ramp) / limit) * 1000.0)
        }
    }
}

/// Live projectile attached to a skillshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MissileHandle {
    /// Projectile network id
    pub id: EntityId,
    /// Projectile asset name
    pub name: String,
    /// Last position reported by the host
    pub last_position: Option<Vec2>,
    /// Time the projectile was first seen
    pub spawn_time: GameTime,
}

impl MissileHandle {
    /// New handle with no reported position.
    pub fn new(id: EntityId, name: &str, spawn_time: GameTime) -> Self {
        Self {
            id,
            name: name.to_string(),
            last_position: None,
            spawn_time,
        }
    }
}

/// Leading edge of a missile launched from `start` along `direction`,
/// capped at `length` units of travel.
pub fn leading_edge(
    kinematics: &Kinematics,
    start: Vec2,
    direction: Vec2,
    length: f32,
    elapsed: GameTime,
) -> Vec2 {
    let travelled = kinematics.distance_after(elapsed).min(length).max(0.0);
    start + direction.scale(travelled)
}
