//! Skillshots
//!
//! A skillshot is one detected instance of an area ability. It binds one
//! [`SpellMetadata`] for life, owns its resolved endpoints and footprint,
//! and delegates shape-specific behavior to a [`SkillshotVariant`].
//!
//! Lifecycle:
//!
//! ```text
//! Constructing --process()--> Active --+--> Expired
//!                                      +--> EarlyRemoved
//! ```
//!
//! Start, end and direction are only ever read through [`Skillshot::start`],
//! [`Skillshot::end`] and [`Skillshot::direction`], which return what the
//! variant derived on the last resolve or refresh. Overrides therefore see
//! and publish the same values as every other caller.

pub mod missile;
pub mod shapes;
pub mod overrides;

use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::catalog::{ShapeKind, SpellMetadata};
use crate::config::DetectorConfig;
use crate::core::{EntityId, GameTime, Vec2};
use crate::error::DetectionError;
use crate::geometry::polygon::{self, Polygon};
use crate::world::{GameWorld, Team};

pub use missile::{Kinematics, MissileHandle};
pub use shapes::Shape;
pub use overrides::OverrideRegistry;

/// Unique id assigned by the detector.
pub type ShotId = u64;

/// Which trigger produced the detection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DetectionOrigin {
    /// Ability cast observed on the caster
    ProcessSpell,
    /// Projectile spawned
    MissileCreate,
    /// Transient effect object spawned
    ObjectCreate,
}

/// Lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SkillshotState {
    /// Built but not yet processed
    Constructing = 0,
    /// Tracked and refreshed every tick
    Active = 1,
    /// Lifetime elapsed
    Expired = 2,
    /// Removed when its projectile died
    EarlyRemoved = 3,
}

/// Who cast the ability.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Caster {
    /// Caster entity, if known
    pub id: Option<EntityId>,
    /// Caster archetype (hero name)
    pub archetype: String,
    /// Caster team
    pub team: Team,
    /// Ownership could not be determined; the shot is assumed hostile
    pub hostility_assumed: bool,
}

impl Caster {
    /// Caster of unknown ownership, assumed hostile.
    pub fn unknown(archetype: &str) -> Self {
        Self {
            id: None,
            archetype: archetype.to_string(),
            team: Team::Neutral,
            hostility_assumed: true,
        }
    }
}

/// What the trigger observed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CastObservation {
    /// Observed start, if the trigger carries one
    pub start: Option<Vec2>,
    /// Observed end (target point)
    pub end: Vec2,
    /// Effective cast start time
    pub time: GameTime,
}

/// Resolved start, end and unit direction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Endpoints {
    /// Start point
    pub start: Vec2,
    /// End point
    pub end: Vec2,
    /// Unit vector from start to end
    pub direction: Vec2,
}

impl Endpoints {
    /// Endpoints between two points. A zero-length span faces +X.
    pub fn between(start: Vec2, end: Vec2) -> Self {
        let direction = (end - start).normalize();
        Self {
            start,
            end,
            direction: if direction.is_zero() { Vec2::RIGHT } else { direction },
        }
    }

    /// Distance from start to end.
    #[inline]
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }
}

/// Read-only context handed to variants.
pub struct ShotContext<'a> {
    /// Host world
    pub world: &'a dyn GameWorld,
    /// Current time
    pub now: GameTime,
    /// Currently tracked shots
    pub active: &'a [Skillshot],
}

impl<'a> ShotContext<'a> {
    /// Context at the world's current time.
    pub fn new(world: &'a dyn GameWorld, active: &'a [Skillshot]) -> Self {
        Self {
            world,
            now: world.now(),
            active,
        }
    }
}

/// Shape-specific behavior of a skillshot.
///
/// The default implementation of every method is the by-kind behavior.
/// Per-ability overrides implement this trait themselves and replace the
/// default variant wholesale.
pub trait SkillshotVariant: fmt::Debug + Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Current endpoints, derived from the processed ones.
    fn endpoints(&self, shot: &Skillshot, ctx: &ShotContext<'_>) -> Endpoints {
        default_endpoints(shot, ctx)
    }

    /// Footprint at `ctx.now` for the given endpoints.
    fn build_shape(&self, shot: &Skillshot, endpoints: &Endpoints, ctx: &ShotContext<'_>) -> Shape {
        default_shape(shot, endpoints, ctx.now)
    }

    /// Time at which the shot stops being a threat.
    fn end_time(&self, shot: &Skillshot) -> GameTime {
        default_end_time(shot)
    }
}

/// By-kind behavior with no overrides.
#[derive(Debug, Default)]
pub struct DefaultVariant;

impl SkillshotVariant for DefaultVariant {
    fn name(&self) -> &'static str {
        "default"
    }
}

/// Processed endpoints, re-anchored on the caster for caster-following missiles.
pub fn default_endpoints(shot: &Skillshot, ctx: &ShotContext<'_>) -> Endpoints {
    let base = shot.base;
    if !shot.spell.missile_follows_caster {
        return base;
    }
    let Some(position) = shot.caster_position(ctx.world) else {
        return base;
    };
    Endpoints {
        start: position,
        end: position + base.direction.scale(base.length()),
        direction: base.direction,
    }
}

/// Footprint by shape kind.
pub fn default_shape(shot: &Skillshot, endpoints: &Endpoints, now: GameTime) -> Shape {
    let spell = &shot.spell;
    let Endpoints { start, end, direction } = *endpoints;

    match spell.shape {
        ShapeKind::Circle => Shape::Circle { center: end, radius: spell.radius },
        ShapeKind::Line => Shape::Rectangle { start, end, half_width: spell.radius },
        ShapeKind::Cone => Shape::Sector {
            apex: start,
            direction,
            angle_deg: spell.angle,
            radius: spell.range,
        },
        ShapeKind::Ring => Shape::Ring {
            center: end,
            inner: spell.radius,
            outer: spell.radius + spell.width,
        },
        ShapeKind::MissileLine => Shape::Rectangle {
            start: shot.leading_edge(endpoints, now),
            end,
            half_width: spell.radius,
        },
        ShapeKind::MissileCircle => Shape::Circle {
            center: shot.leading_edge(endpoints, now),
            radius: spell.radius,
        },
        ShapeKind::MissileArc => {
            let arc = polygon::arc_points(start, end, spell.angle, shot.quality);
            let travelled = spell.kinematics().distance_after(shot.flight_time(now));
            let path = trim_path(&arc, travelled);
            if path.len() < 2 {
                Shape::Empty
            } else {
                Shape::Band { path, half_width: spell.radius }
            }
        }
    }
}

/// Expiry rule: hard timeout for accelerating missiles, otherwise
/// `start + delay + travel + extra_duration`.
pub fn default_end_time(shot: &Skillshot) -> GameTime {
    let spell = &shot.spell;
    if spell.is_accelerating() {
        return shot.start_time + shot.timeout_ms;
    }
    let travel = spell
        .kinematics()
        .travel_time(shot.endpoints.length())
        .unwrap_or(0.0);
    shot.start_time + spell.delay + travel + spell.extra_duration
}

/// Drop the first `distance` units of a polyline.
fn trim_path(path: &[Vec2], distance: f32) -> Vec<Vec2> {
    let mut remaining = distance.max(0.0);
    for (i, seg) in path.windows(2).enumerate() {
        let len = seg[0].distance(seg[1]);
        if remaining < len {
            let mut trimmed = vec![seg[0].extend(seg[1], remaining)];
            trimmed.extend_from_slice(&path[i + 1..]);
            return trimmed;
        }
        remaining -= len;
    }
    Vec::new()
}

/// One detected ability instance.
#[derive(Debug)]
pub struct Skillshot {
    id: ShotId,
    caster: Caster,
    origin: DetectionOrigin,
    spell: Arc<SpellMetadata>,
    cast: CastObservation,
    start_time: GameTime,
    /// Endpoints after start resolution and range clamping
    base: Endpoints,
    /// Endpoints derived by the variant on the last resolve/refresh
    endpoints: Endpoints,
    shape: Shape,
    missile: Option<MissileHandle>,
    state: SkillshotState,
    variant: Box<dyn SkillshotVariant>,
    quality: u32,
    timeout_ms: f32,
}

impl Skillshot {
    /// Build a shot in the `Constructing` state.
    pub fn new(
        id: ShotId,
        spell: Arc<SpellMetadata>,
        caster: Caster,
        origin: DetectionOrigin,
        cast: CastObservation,
        variant: Box<dyn SkillshotVariant>,
        config: &DetectorConfig,
    ) -> Self {
        let placeholder = Endpoints::between(cast.start.unwrap_or(cast.end), cast.end);
        Self {
            id,
            caster,
            origin,
            spell,
            cast,
            start_time: cast.time,
            base: placeholder,
            endpoints: placeholder,
            shape: Shape::Empty,
            missile: None,
            state: SkillshotState::Constructing,
            variant,
            quality: config.circle_quality,
            timeout_ms: config.accelerating_missile_timeout_ms,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Detector-assigned id.
    pub fn id(&self) -> ShotId {
        self.id
    }

    /// Caster.
    pub fn caster(&self) -> &Caster {
        &self.caster
    }

    /// Trigger that produced the shot.
    pub fn origin(&self) -> DetectionOrigin {
        self.origin
    }

    /// Bound metadata.
    pub fn spell(&self) -> &Arc<SpellMetadata> {
        &self.spell
    }

    /// Observed start, before resolution.
    pub fn cast_start(&self) -> Option<Vec2> {
        self.cast.start
    }

    /// Observed end, before clamping.
    pub fn cast_end(&self) -> Vec2 {
        self.cast.end
    }

    /// Effective cast start time.
    pub fn start_time(&self) -> GameTime {
        self.start_time
    }

    /// Current start point.
    pub fn start(&self) -> Vec2 {
        self.endpoints.start
    }

    /// Current end point.
    pub fn end(&self) -> Vec2 {
        self.endpoints.end
    }

    /// Current unit direction.
    pub fn direction(&self) -> Vec2 {
        self.endpoints.direction
    }

    /// Current endpoints.
    pub fn endpoints(&self) -> Endpoints {
        self.endpoints
    }

    /// Current footprint.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Live projectile, if one is attached.
    pub fn missile(&self) -> Option<&MissileHandle> {
        self.missile.as_ref()
    }

    /// Lifecycle state.
    pub fn state(&self) -> SkillshotState {
        self.state
    }

    /// Name of the behavior variant.
    pub fn variant_name(&self) -> &'static str {
        self.variant.name()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Resolve start, clamp end, compute direction and build the footprint.
    ///
    /// On success the shot becomes `Active`.
    pub fn process(&mut self, ctx: &ShotContext<'_>) -> Result<(), DetectionError> {
        // 1. Resolve start: spawn object, observed start, caster position
        let start = self
            .spawn_object_position(ctx.world)
            .or(self.cast.start)
            .or_else(|| self.caster_position(ctx.world))
            .ok_or_else(|| DetectionError::StartUnresolved {
                spell: self.spell.spell_name.clone(),
            })?;

        // 2. Clamp end, then extend
        let spell = &self.spell;
        let heading = Endpoints::between(start, self.cast.end).direction;
        let mut end = self.cast.end;
        if spell.fixed_range {
            end = start + heading.scale(spell.range);
        } else if !spell.ignore_max_range && spell.range > 0.0 && start.distance(end) > spell.range {
            end = start + heading.scale(spell.range);
        }
        if spell.extra_range != 0.0 {
            end += heading.scale(spell.extra_range);
        }

        // 3. Direction and footprint
        self.base = Endpoints::between(start, end);
        self.refresh(ctx);
        self.state = SkillshotState::Active;

        debug!(
            "Processed {} ({}) from ({:.0}, {:.0}) to ({:.0}, {:.0})",
            self.spell.spell_name,
            self.variant.name(),
            self.endpoints.start.x,
            self.endpoints.start.y,
            self.endpoints.end.x,
            self.endpoints.end.y
        );
        Ok(())
    }

    /// Derive endpoints and footprint for `ctx.now` without mutating.
    pub fn compute_refresh(&self, ctx: &ShotContext<'_>) -> (Endpoints, Shape) {
        let endpoints = self.variant.endpoints(self, ctx);
        let shape = self.variant.build_shape(self, &endpoints, ctx);
        (endpoints, shape)
    }

    /// Apply a refresh computed by [`Skillshot::compute_refresh`].
    ///
    /// Returns true if the footprint changed.
    pub fn apply_refresh(&mut self, endpoints: Endpoints, shape: Shape) -> bool {
        let changed = self.endpoints != endpoints || self.shape != shape;
        self.endpoints = endpoints;
        self.shape = shape;
        changed
    }

    /// Recompute endpoints and footprint in place.
    pub fn refresh(&mut self, ctx: &ShotContext<'_>) -> bool {
        let (endpoints, shape) = self.compute_refresh(ctx);
        self.apply_refresh(endpoints, shape)
    }

    /// Attach a live projectile. Only missile shapes accept one.
    pub fn attach_missile(&mut self, handle: MissileHandle) -> Result<(), DetectionError> {
        if !self.spell.shape.is_missile() {
            return Err(DetectionError::MissileOnNonMissile {
                spell: self.spell.spell_name.clone(),
                kind: self.spell.shape,
            });
        }
        self.missile = Some(handle);
        Ok(())
    }

    /// Move the missile handle out (used when merging into another shot).
    pub fn take_missile(&mut self) -> Option<MissileHandle> {
        self.missile.take()
    }

    /// Record the projectile's reported position.
    pub fn update_missile_position(&mut self, position: Vec2) {
        if let Some(missile) = self.missile.as_mut() {
            missile.last_position = Some(position);
        }
    }

    /// Time at which the shot stops being a threat.
    pub fn end_time(&self) -> GameTime {
        self.variant.end_time(self)
    }

    /// Has the lifetime elapsed at `now`?
    pub fn is_expired(&self, now: GameTime) -> bool {
        now >= self.end_time()
    }

    /// Enter a terminal state.
    pub fn finish(&mut self, state: SkillshotState) {
        debug_assert!(matches!(state, SkillshotState::Expired | SkillshotState::EarlyRemoved));
        self.state = state;
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Is `point` inside the current footprint?
    pub fn contains(&self, point: Vec2) -> bool {
        self.shape.contains(point)
    }

    /// Polygon form of the current footprint.
    pub fn polygon(&self) -> Polygon {
        self.shape.to_polygon(self.quality)
    }

    /// Milliseconds from `now` until the effect reaches `point`, or `None`
    /// if the point is outside the footprint.
    pub fn time_to_hit(&self, point: Vec2, now: GameTime) -> Option<GameTime> {
        if !self.contains(point) {
            return None;
        }
        let arrival = self.start_time + self.spell.delay;
        if !self.spell.shape.is_missile() {
            return Some((arrival - now).max(0.0));
        }
        let along = point
            .project_on(self.endpoints.start, self.endpoints.end)
            .segment_point
            .distance(self.endpoints.start);
        let travel = self.spell.kinematics().travel_time(along)?;
        Some((arrival + travel - now).max(0.0))
    }

    /// Milliseconds the missile has been flying at `now`.
    pub fn flight_time(&self, now: GameTime) -> GameTime {
        (now - self.start_time - self.spell.delay).max(0.0)
    }

    /// Extrapolated missile position for the given endpoints.
    pub fn leading_edge(&self, endpoints: &Endpoints, now: GameTime) -> Vec2 {
        missile::leading_edge(
            &self.spell.kinematics(),
            endpoints.start,
            endpoints.direction,
            endpoints.length(),
            self.flight_time(now),
        )
    }

    /// Processed endpoints before variant derivation.
    pub fn base_endpoints(&self) -> Endpoints {
        self.base
    }

    /// Caster's current position.
    pub fn caster_position(&self, world: &dyn GameWorld) -> Option<Vec2> {
        self.caster.id.and_then(|id| world.entity(id)).map(|e| e.position)
    }

    fn spawn_object_position(&self, world: &dyn GameWorld) -> Option<Vec2> {
        if self.spell.spawn_object_name.is_empty() {
            return None;
        }
        world.find_object(&self.spell.spawn_object_name, self.caster.id)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Build and process a default-variant shot against `world`.
    pub fn processed_shot(
        world: &dyn GameWorld,
        id: ShotId,
        spell: SpellMetadata,
        caster: EntityId,
        start: Vec2,
        end: Vec2,
    ) -> Skillshot {
        let mut shot = Skillshot::new(
            id,
            Arc::new(spell),
            Caster {
                id: Some(caster),
                archetype: "Test".to_string(),
                team: Team::Chaos,
                hostility_assumed: false,
            },
            DetectionOrigin::ProcessSpell,
            CastObservation { start: Some(start), end, time: world.now() },
            Box::new(DefaultVariant),
            &DetectorConfig::default(),
        );
        shot.process(&ShotContext::new(world, &[])).unwrap();
        shot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::test_support::processed_shot;
    use crate::world::WorldSnapshot;
    use proptest::prelude::*;

    fn line_spell() -> SpellMetadata {
        let mut spell = SpellMetadata::new("Test", "TestLine", ShapeKind::MissileLine);
        spell.delay = 250.0;
        spell.missile_speed = 1000.0;
        spell.range = 1000.0;
        spell.radius = 60.0;
        spell
    }

    #[test]
    fn test_line_expires_after_delay_and_travel() {
        let world = WorldSnapshot::new();
        let shot = processed_shot(&world, 1, line_spell(), 1, Vec2::ZERO, Vec2::new(1000.0, 0.0));

        assert_eq!(shot.state(), SkillshotState::Active);
        assert!((shot.end_time() - 1250.0).abs() < 1e-3);
        assert!(!shot.is_expired(1249.0));
        assert!(shot.is_expired(1250.0));
    }

    #[test]
    fn test_static_line_expiry_matches_missile_line() {
        let world = WorldSnapshot::new();
        let mut spell = line_spell();
        spell.shape = ShapeKind::Line;
        let shot = processed_shot(&world, 1, spell, 1, Vec2::ZERO, Vec2::new(1000.0, 0.0));
        assert!((shot.end_time() - 1250.0).abs() < 1e-3);
    }

    #[test]
    fn test_accelerating_missile_uses_timeout() {
        let world = WorldSnapshot::new();
        let mut spell = line_spell();
        spell.missile_accel = 1000.0;
        spell.missile_max_speed = 2500.0;
        let shot = processed_shot(&world, 1, spell, 1, Vec2::ZERO, Vec2::new(1000.0, 0.0));
        assert!((shot.end_time() - 4000.0).abs() < 1e-3);
    }

    #[test]
    fn test_end_clamped_to_range() {
        let world = WorldSnapshot::new();
        let shot = processed_shot(&world, 1, line_spell(), 1, Vec2::ZERO, Vec2::new(3000.0, 0.0));
        assert!((shot.end().x - 1000.0).abs() < 1e-3);
        assert_eq!(shot.direction(), Vec2::RIGHT);
        assert_eq!(shot.cast_end(), Vec2::new(3000.0, 0.0));
    }

    #[test]
    fn test_fixed_range_and_extra_range() {
        let world = WorldSnapshot::new();
        let mut spell = line_spell();
        spell.fixed_range = true;
        spell.extra_range = 50.0;
        let shot = processed_shot(&world, 1, spell, 1, Vec2::ZERO, Vec2::new(0.0, 200.0));
        assert!(shot.end().distance(Vec2::new(0.0, 1050.0)) < 1e-2);
    }

    #[test]
    fn test_ignore_max_range() {
        let world = WorldSnapshot::new();
        let mut spell = line_spell();
        spell.ignore_max_range = true;
        let shot = processed_shot(&world, 1, spell, 1, Vec2::ZERO, Vec2::new(3000.0, 0.0));
        assert!((shot.end().x - 3000.0).abs() < 1e-3);
    }

    #[test]
    fn test_start_falls_back_to_caster() {
        let world = WorldSnapshot::new().with_hero(4, "Lux", Team::Chaos, Vec2::new(100.0, 100.0));
        let mut shot = Skillshot::new(
            1,
            Arc::new(line_spell()),
            Caster { id: Some(4), archetype: "Lux".into(), team: Team::Chaos, hostility_assumed: false },
            DetectionOrigin::ObjectCreate,
            CastObservation { start: None, end: Vec2::new(500.0, 100.0), time: 0.0 },
            Box::new(DefaultVariant),
            &DetectorConfig::default(),
        );
        shot.process(&ShotContext::new(&world, &[])).unwrap();
        assert_eq!(shot.start(), Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_unresolved_start_is_error() {
        let world = WorldSnapshot::new();
        let mut shot = Skillshot::new(
            1,
            Arc::new(line_spell()),
            Caster::unknown("Lux"),
            DetectionOrigin::ObjectCreate,
            CastObservation { start: None, end: Vec2::new(500.0, 0.0), time: 0.0 },
            Box::new(DefaultVariant),
            &DetectorConfig::default(),
        );
        let err = shot.process(&ShotContext::new(&world, &[])).unwrap_err();
        assert!(matches!(err, DetectionError::StartUnresolved { .. }));
        assert_eq!(shot.state(), SkillshotState::Constructing);
    }

    #[test]
    fn test_spawn_object_wins_over_observed_start() {
        let world = WorldSnapshot::new().with_object("TheDoomBall", Some(3), Vec2::new(-200.0, 0.0));
        let mut spell = line_spell();
        spell.spawn_object_name = "TheDoomBall".to_string();
        let shot = processed_shot(&world, 1, spell, 3, Vec2::ZERO, Vec2::new(500.0, 0.0));
        assert_eq!(shot.start(), Vec2::new(-200.0, 0.0));
    }

    #[test]
    fn test_missile_line_leading_edge() {
        let mut world = WorldSnapshot::new();
        let mut shot = processed_shot(&world, 1, line_spell(), 1, Vec2::ZERO, Vec2::new(1000.0, 0.0));

        // During the delay the whole line is dangerous
        assert!(shot.contains(Vec2::new(10.0, 0.0)));

        world.advance(750.0);
        shot.refresh(&ShotContext::new(&world, &[]));
        // 500 units flown: the first half is safe
        assert!(!shot.contains(Vec2::new(400.0, 0.0)));
        assert!(shot.contains(Vec2::new(600.0, 0.0)));
    }

    #[test]
    fn test_missile_circle_moves() {
        let mut world = WorldSnapshot::new();
        let mut spell = line_spell();
        spell.shape = ShapeKind::MissileCircle;
        spell.delay = 0.0;
        let mut shot = processed_shot(&world, 1, spell, 1, Vec2::ZERO, Vec2::new(1000.0, 0.0));
        assert!(shot.contains(Vec2::new(0.0, 30.0)));

        world.advance(500.0);
        shot.refresh(&ShotContext::new(&world, &[]));
        assert!(!shot.contains(Vec2::new(0.0, 30.0)));
        assert!(shot.contains(Vec2::new(500.0, 30.0)));
    }

    #[test]
    fn test_missile_arc_band() {
        let world = WorldSnapshot::new();
        let mut spell = line_spell();
        spell.shape = ShapeKind::MissileArc;
        spell.angle = 30.0;
        let shot = processed_shot(&world, 1, spell, 1, Vec2::ZERO, Vec2::new(1000.0, 0.0));
        match shot.shape() {
            Shape::Band { path, .. } => {
                assert!(path[0].distance(Vec2::ZERO) < 1e-2);
                assert!(path[path.len() - 1].distance(Vec2::new(1000.0, 0.0)) < 1.0);
                // Bulges off the chord
                assert!(path[path.len() / 2].y.abs() > 10.0);
            }
            other => panic!("expected band, got {:?}", other),
        }
    }

    #[test]
    fn test_follows_caster() {
        let mut world = WorldSnapshot::new().with_hero(1, "Test", Team::Chaos, Vec2::ZERO);
        let mut spell = line_spell();
        spell.missile_follows_caster = true;
        let mut shot = processed_shot(&world, 1, spell, 1, Vec2::ZERO, Vec2::new(1000.0, 0.0));

        world.move_entity(1, Vec2::new(0.0, 300.0));
        assert!(shot.refresh(&ShotContext::new(&world, &[])));
        assert_eq!(shot.start(), Vec2::new(0.0, 300.0));
        assert!(shot.end().distance(Vec2::new(1000.0, 300.0)) < 1e-3);
    }

    #[test]
    fn test_missile_on_non_missile_rejected() {
        let world = WorldSnapshot::new();
        let mut spell = line_spell();
        spell.shape = ShapeKind::Circle;
        let mut shot = processed_shot(&world, 1, spell, 1, Vec2::ZERO, Vec2::new(500.0, 0.0));
        let err = shot.attach_missile(MissileHandle::new(77, "x", 0.0)).unwrap_err();
        assert!(matches!(err, DetectionError::MissileOnNonMissile { kind: ShapeKind::Circle, .. }));
        assert!(shot.missile().is_none());
    }

    #[test]
    fn test_time_to_hit() {
        let world = WorldSnapshot::new();
        let shot = processed_shot(&world, 1, line_spell(), 1, Vec2::ZERO, Vec2::new(1000.0, 0.0));
        let t = shot.time_to_hit(Vec2::new(500.0, 20.0), 0.0).unwrap();
        assert!((t - 750.0).abs() < 1e-2);
        assert!(shot.time_to_hit(Vec2::new(500.0, 200.0), 0.0).is_none());
    }

    #[test]
    fn test_trim_path() {
        let path = [Vec2::ZERO, Vec2::new(100.0, 0.0), Vec2::new(100.0, 100.0)];
        let trimmed = trim_path(&path, 150.0);
        assert_eq!(trimmed.len(), 2);
        assert!(trimmed[0].distance(Vec2::new(100.0, 50.0)) < 1e-3);
        assert!(trim_path(&path, 500.0).is_empty());
    }

    proptest! {
        #[test]
        fn prop_refresh_idempotent(
            x in -2000.0f32..2000.0,
            y in -2000.0f32..2000.0,
            elapsed in 0.0f32..2000.0,
            kind in 0u8..7,
        ) {
            let shape = match kind {
                0 => ShapeKind::Circle,
                1 => ShapeKind::Line,
                2 => ShapeKind::Cone,
                3 => ShapeKind::Ring,
                4 => ShapeKind::MissileLine,
                5 => ShapeKind::MissileCircle,
                _ => ShapeKind::MissileArc,
            };
            let mut spell = line_spell();
            spell.shape = shape;
            spell.angle = 40.0;
            spell.width = 80.0;

            let mut world = WorldSnapshot::new();
            let mut shot = processed_shot(&world, 1, spell, 1, Vec2::ZERO, Vec2::new(x, y));
            world.advance(elapsed);

            shot.refresh(&ShotContext::new(&world, &[]));
            let first = (shot.endpoints(), shot.shape().clone());
            let changed = shot.refresh(&ShotContext::new(&world, &[]));
            prop_assert!(!changed);
            prop_assert_eq!(first, (shot.endpoints(), shot.shape().clone()));
        }
    }
}
