//! Threat Tracker
//!
//! Owns the active skillshot set. Every tick runs, in order:
//!
//! 1. expire pass: drop every shot whose lifetime has elapsed
//! 2. refresh pass: recompute endpoints and footprints of the rest
//!
//! New detections go through [`Tracker::submit`], which merges repeat
//! observations of the same cast. Projectile deaths go through
//! [`Tracker::on_projectile_destroyed`].
//!
//! The set is only mutated inside these methods. Readers borrow it through
//! [`Tracker::active`] or take an owned [`Tracker::snapshot`].

use tracing::{debug, info};
#[cfg(feature = "debug-tracing")]
use tracing::trace;

use crate::config::TrackerConfig;
use crate::core::{compute_state_digest, EntityId, GameTime, StateDigest, Vec2};
use crate::core::vec2::EPSILON;
use crate::geometry::{union, Polygon};
use crate::skillshot::{Endpoints, Shape, ShotContext, Skillshot, SkillshotState};
use crate::world::GameWorld;

use super::events::{ShotSummary, ThreatEvent};

/// Active threat set.
#[derive(Debug, Default)]
pub struct Tracker {
    config: TrackerConfig,
    active: Vec<Skillshot>,
}

impl Tracker {
    /// Empty tracker.
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            active: Vec::new(),
        }
    }

    /// Currently tracked shots, in insertion order.
    pub fn active(&self) -> &[Skillshot] {
        &self.active
    }

    /// Owned summaries of every tracked shot.
    pub fn snapshot(&self) -> Vec<ShotSummary> {
        self.active.iter().map(ShotSummary::of).collect()
    }

    /// Number of tracked shots.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// True if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Drop every tracked shot without emitting events.
    pub fn clear(&mut self) {
        self.active.clear();
    }

    // =========================================================================
    // Per-tick passes
    // =========================================================================

    /// Expire, then refresh.
    pub fn tick(&mut self, tick: u64, world: &dyn GameWorld) -> Vec<ThreatEvent> {
        let mut events = self.expire(tick, world.now());
        events.extend(self.refresh(tick, world));
        events
    }

    /// Remove every shot whose lifetime has elapsed at `now`.
    pub fn expire(&mut self, tick: u64, now: GameTime) -> Vec<ThreatEvent> {
        let mut events = Vec::new();

        // Reverse index scan so removals do not shift unvisited entries
        for i in (0..self.active.len()).rev() {
            if self.active[i].is_expired(now) {
                let mut shot = self.active.remove(i);
                shot.finish(SkillshotState::Expired);
                debug!("Expired {} (shot {})", shot.spell().spell_name, shot.id());
                events.push(ThreatEvent::expired(tick, &shot));
            }
        }

        events.reverse();
        events
    }

    /// Recompute every shot's endpoints and footprint.
    ///
    /// All updates are computed against the unchanged set first, then
    /// applied, so overrides that read sibling shots see a consistent view.
    pub fn refresh(&mut self, tick: u64, world: &dyn GameWorld) -> Vec<ThreatEvent> {
        let updates: Vec<(Endpoints, Shape)> = {
            let ctx = ShotContext::new(world, &self.active);
            self.active.iter().map(|shot| shot.compute_refresh(&ctx)).collect()
        };

        let mut events = Vec::new();
        for (shot, (endpoints, shape)) in self.active.iter_mut().zip(updates) {
            #[cfg(feature = "debug-tracing")]
            trace!(
                "Refresh shot {}: ({:.1}, {:.1}) -> ({:.1}, {:.1})",
                shot.id(),
                endpoints.start.x,
                endpoints.start.y,
                endpoints.end.x,
                endpoints.end.y
            );
            if shot.apply_refresh(endpoints, shape) {
                events.push(ThreatEvent::updated(tick, shot));
            }
        }
        events
    }

    // =========================================================================
    // Detections and projectile signals
    // =========================================================================

    /// Insert a processed shot, or merge it into a tracked observation of
    /// the same cast.
    ///
    /// Two shots are the same cast when ability and a known caster match and
    /// their directions differ by less than the merge tolerance. Shots with
    /// no span have no direction and never merge. Merging moves the
    /// new shot's missile handle onto the tracked one and discards the rest.
    pub fn submit(&mut self, tick: u64, mut shot: Skillshot) -> Option<ThreatEvent> {
        let tolerance = self.config.merge_angle_tolerance_deg;

        let existing = self
            .active
            .iter_mut()
            .find(|tracked| is_same_cast(tracked, &shot, tolerance));

        if let Some(tracked) = existing {
            debug!(
                "Merged repeat observation of {} into shot {}",
                shot.spell().spell_name,
                tracked.id()
            );
            return match shot.take_missile() {
                Some(handle) if tracked.missile().is_none() => {
                    // Receiving shot is a missile shape: same ability
                    tracked.attach_missile(handle).ok()?;
                    Some(ThreatEvent::updated(tick, tracked))
                }
                _ => None,
            };
        }

        info!(
            "New threat {} from {:?} (shot {})",
            shot.spell().spell_name,
            shot.caster().id,
            shot.id()
        );
        let event = ThreatEvent::detected(tick, &shot);
        self.active.push(shot);
        Some(event)
    }

    /// A projectile died.
    ///
    /// Removes shots tracking that projectile whose ability can be removed
    /// early, and shots of a force-removed ability fired by the same caster
    /// under that projectile name.
    pub fn on_projectile_destroyed(
        &mut self,
        tick: u64,
        id: EntityId,
        name: &str,
        caster: Option<EntityId>,
    ) -> Vec<ThreatEvent> {
        let mut events = Vec::new();

        for i in (0..self.active.len()).rev() {
            let shot = &self.active[i];
            let spell = shot.spell();

            let tracked = spell.can_be_removed && shot.missile().is_some_and(|m| m.id == id);
            let forced = spell.force_remove
                && caster.is_some()
                && shot.caster().id == caster
                && spell.all_missile_names().any(|n| n.eq_ignore_ascii_case(name));

            if tracked || forced {
                let mut shot = self.active.remove(i);
                shot.finish(SkillshotState::EarlyRemoved);
                debug!("Removed {} early (projectile {})", shot.spell().spell_name, id);
                events.push(ThreatEvent::removed(tick, &shot));
            }
        }

        events.reverse();
        events
    }

    /// Record a projectile's reported position. Returns true if a tracked
    /// shot holds that projectile.
    pub fn on_projectile_moved(&mut self, id: EntityId, position: Vec2) -> bool {
        match self
            .active
            .iter_mut()
            .find(|shot| shot.missile().is_some_and(|m| m.id == id))
        {
            Some(shot) => {
                shot.update_missile_position(position);
                true
            }
            None => false,
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Shots whose footprint contains `point`.
    pub fn threats_at(&self, point: Vec2) -> Vec<&Skillshot> {
        self.active.iter().filter(|shot| shot.contains(point)).collect()
    }

    /// Union of every tracked footprint.
    pub fn danger_polygons(&self) -> Vec<Polygon> {
        let polygons: Vec<Polygon> = self
            .active
            .iter()
            .map(Skillshot::polygon)
            .filter(|p| p.len() >= 3)
            .collect();
        union(&polygons)
    }

    /// Deterministic digest of the tracked set.
    pub fn digest(&self, tick: u64) -> StateDigest {
        compute_state_digest(tick, self.active.len(), |hasher| {
            for shot in &self.active {
                hasher.update_u64(shot.id());
                hasher.update_str(&shot.spell().spell_name);
                hasher.update_u32(shot.caster().id.unwrap_or(0));
                hasher.update_bool(shot.caster().hostility_assumed);
                hasher.update_f32(shot.start_time());
                hasher.update_vec2(shot.start());
                hasher.update_vec2(shot.end());
                hasher.update_vec2(shot.direction());
                hasher.update_u8(shot.state() as u8);
                match shot.missile() {
                    Some(missile) => {
                        hasher.update_u32(missile.id);
                        hasher.update_vec2(missile.last_position.unwrap_or(Vec2::ZERO));
                    }
                    None => hasher.update_u32(0),
                }
            }
        })
    }
}

/// Direction difference is compared at this resolution (degrees).
const MERGE_ANGLE_RESOLUTION_DEG: f32 = 1e-4;

fn is_same_cast(tracked: &Skillshot, shot: &Skillshot, tolerance: f32) -> bool {
    if tracked.spell().spell_name != shot.spell().spell_name {
        return false;
    }
    match (tracked.caster().id, shot.caster().id) {
        (Some(a), Some(b)) if a == b => {}
        _ => return false,
    }
    if tracked.base_endpoints().length() <= EPSILON || shot.base_endpoints().length() <= EPSILON {
        return false;
    }
    let angle = tracked.direction().angle_between(shot.direction());
    (angle / MERGE_ANGLE_RESOLUTION_DEG).round() < (tolerance / MERGE_ANGLE_RESOLUTION_DEG).round()
}
