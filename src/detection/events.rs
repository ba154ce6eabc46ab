//! Detection Events
//!
//! Inbound events come from the host's collaborators (cast observers,
//! projectile and object managers). Outbound events tell consumers what
//! changed in the tracked threat set.

use serde::{Serialize, Deserialize};

use crate::catalog::ShapeKind;
use crate::core::{EntityId, GameTime, Vec2};
use crate::skillshot::{DetectionOrigin, ShotId, Skillshot};

/// Projectile as reported by the host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectileInfo {
    /// Projectile network id
    pub id: EntityId,
    /// Asset name
    pub name: String,
    /// Entity that fired it, if known
    pub caster: Option<EntityId>,
    /// Launch position
    pub start: Vec2,
    /// Position when observed
    pub position: Vec2,
    /// Target position
    pub end: Vec2,
}

/// Events delivered by the host each tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum InboundEvent {
    /// An ability cast was observed on a caster
    AbilityCast {
        /// Caster entity
        caster: EntityId,
        /// Ability name
        spell_name: String,
        /// Cast start
        start: Vec2,
        /// Cast target
        end: Vec2,
        /// Time of the cast
        time: GameTime,
    },
    /// A projectile appeared
    ProjectileSpawned(ProjectileInfo),
    /// A projectile reported a new position
    ProjectileMoved {
        /// Projectile network id
        id: EntityId,
        /// New position
        position: Vec2,
    },
    /// A projectile was destroyed
    ProjectileDestroyed {
        /// Projectile network id
        id: EntityId,
        /// Asset name
        name: String,
        /// Entity that fired it, if known
        caster: Option<EntityId>,
    },
    /// A transient effect object appeared
    EffectObjectSpawned {
        /// Object network id
        id: EntityId,
        /// Object name
        name: String,
        /// Owning entity, if known
        owner: Option<EntityId>,
        /// Object position
        position: Vec2,
    },
}

/// Owned, serializable view of a tracked skillshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShotSummary {
    /// Detector-assigned id
    pub id: ShotId,
    /// Ability name
    pub spell_name: String,
    /// Ability owner name
    pub champion_name: String,
    /// Caster entity, if known
    pub caster: Option<EntityId>,
    /// Caster ownership was assumed
    pub hostility_assumed: bool,
    /// Shape kind
    pub shape: ShapeKind,
    /// Trigger that produced the shot
    pub origin: DetectionOrigin,
    /// Behavior variant name
    pub variant: String,
    /// Current start
    pub start: Vec2,
    /// Current end
    pub end: Vec2,
    /// Current direction
    pub direction: Vec2,
    /// Effective cast start time
    pub start_time: GameTime,
    /// Expiry time
    pub end_time: GameTime,
    /// Danger rating
    pub danger_value: u8,
    /// Attached projectile id
    pub missile: Option<EntityId>,
}

impl ShotSummary {
    /// Summarize a shot's current state.
    pub fn of(shot: &Skillshot) -> Self {
        let spell = shot.spell();
        Self {
            id: shot.id(),
            spell_name: spell.spell_name.clone(),
            champion_name: spell.champion_name.clone(),
            caster: shot.caster().id,
            hostility_assumed: shot.caster().hostility_assumed,
            shape: spell.shape,
            origin: shot.origin(),
            variant: shot.variant_name().to_string(),
            start: shot.start(),
            end: shot.end(),
            direction: shot.direction(),
            start_time: shot.start_time(),
            end_time: shot.end_time(),
            danger_value: spell.danger_value,
            missile: shot.missile().map(|m| m.id),
        }
    }
}

/// What happened to a tracked shot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThreatEventKind {
    /// A new shot entered the tracked set
    NewThreatDetected,
    /// A tracked shot's geometry or missile changed
    ThreatUpdated,
    /// A tracked shot reached the end of its lifetime
    ThreatExpired,
    /// A tracked shot was removed when its projectile died
    ThreatRemoved,
}

/// Outbound notification.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThreatEvent {
    /// Engine tick
    pub tick: u64,
    /// What happened
    pub kind: ThreatEventKind,
    /// Shot state at the time of the event
    pub shot: ShotSummary,
}

impl ThreatEvent {
    /// Create a new event.
    pub fn new(tick: u64, kind: ThreatEventKind, shot: &Skillshot) -> Self {
        Self {
            tick,
            kind,
            shot: ShotSummary::of(shot),
        }
    }

    /// Shot entered the tracked set.
    pub fn detected(tick: u64, shot: &Skillshot) -> Self {
        Self::new(tick, ThreatEventKind::NewThreatDetected, shot)
    }

    /// Shot changed.
    pub fn updated(tick: u64, shot: &Skillshot) -> Self {
        Self::new(tick, ThreatEventKind::ThreatUpdated, shot)
    }

    /// Shot expired.
    pub fn expired(tick: u64, shot: &Skillshot) -> Self {
        Self::new(tick, ThreatEventKind::ThreatExpired, shot)
    }

    /// Shot removed early.
    pub fn removed(tick: u64, shot: &Skillshot) -> Self {
        Self::new(tick, ThreatEventKind::ThreatRemoved, shot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SpellMetadata;
    use crate::skillshot::test_support::processed_shot;
    use crate::world::WorldSnapshot;

    #[test]
    fn test_summary_reflects_shot() {
        let world = WorldSnapshot::new();
        let mut spell = SpellMetadata::new("Annie", "AnnieW", ShapeKind::Cone);
        spell.range = 600.0;
        spell.angle = 50.0;
        spell.delay = 250.0;
        spell.danger_value = 2;
        let shot = processed_shot(&world, 42, spell, 3, Vec2::ZERO, Vec2::new(0.0, 400.0));

        let event = ThreatEvent::detected(7, &shot);
        assert_eq!(event.kind, ThreatEventKind::NewThreatDetected);
        assert_eq!(event.tick, 7);
        assert_eq!(event.shot.id, 42);
        assert_eq!(event.shot.caster, Some(3));
        assert_eq!(event.shot.direction, Vec2::UP);
        assert_eq!(event.shot.end_time, 250.0);
        assert_eq!(event.shot.danger_value, 2);
        assert_eq!(event.shot.missile, None);
    }
}
