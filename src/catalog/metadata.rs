//! Spell Metadata
//!
//! Immutable per-ability descriptor. One record per ability, shared by
//! every skillshot instance of that ability for the process lifetime.

use std::ops::BitOr;
use serde::{Serialize, Deserialize};

use crate::skillshot::missile::Kinematics;

/// Geometric shape of an ability's effect area.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ShapeKind {
    /// Static circle at the cast end point
    Circle = 0,
    /// Static rectangle from start to end
    Line = 1,
    /// Sector opening from the start point
    Cone = 2,
    /// Annulus at the cast end point
    Ring = 3,
    /// Rectangle whose leading edge is a flying missile
    MissileLine = 4,
    /// Circle riding on a flying missile
    MissileCircle = 5,
    /// Curved band whose leading edge is a flying missile
    MissileArc = 6,
}

impl ShapeKind {
    /// Does this shape track a missile?
    #[inline]
    pub fn is_missile(self) -> bool {
        matches!(
            self,
            ShapeKind::MissileLine | ShapeKind::MissileCircle | ShapeKind::MissileArc
        )
    }
}

/// Which trigger kinds may detect an ability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CastType {
    /// Ability cast observed on the caster
    Spell,
    /// Projectile spawned
    Missile,
    /// Transient effect object spawned
    Object,
}

/// Classes of obstacle a path can collide with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObstacleClass {
    /// Lane and jungle units
    Minion,
    /// Player-controlled heroes
    Hero,
    /// Static blocking terrain
    Terrain,
    /// Wall spanned between two marker objects
    MarkerWall,
}

/// Bit mask over [`ObstacleClass`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollisionMask(pub u8);

impl CollisionMask {
    /// No obstacles
    pub const NONE: Self = Self(0);
    /// Minions
    pub const MINIONS: Self = Self(1 << 0);
    /// Heroes
    pub const HEROES: Self = Self(1 << 1);
    /// Terrain
    pub const TERRAIN: Self = Self(1 << 2);
    /// Paired-marker wall
    pub const MARKER_WALL: Self = Self(1 << 3);
    /// Everything
    pub const ALL: Self = Self(0b1111);

    /// Mask for a single class.
    pub fn of(class: ObstacleClass) -> Self {
        match class {
            ObstacleClass::Minion => Self::MINIONS,
            ObstacleClass::Hero => Self::HEROES,
            ObstacleClass::Terrain => Self::TERRAIN,
            ObstacleClass::MarkerWall => Self::MARKER_WALL,
        }
    }

    /// Build a mask from a class list.
    pub fn from_classes(classes: &[ObstacleClass]) -> Self {
        classes.iter().fold(Self::NONE, |mask, c| mask | Self::of(*c))
    }

    /// Does the mask include `class`?
    #[inline]
    pub fn contains(self, class: ObstacleClass) -> bool {
        self.0 & Self::of(class).0 != 0
    }

    /// True if no class is set.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for CollisionMask {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

fn default_danger() -> u8 {
    1
}

/// Static descriptor of one ability.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpellMetadata {
    /// Owner (caster archetype) name
    pub champion_name: String,
    /// Canonical ability name
    pub spell_name: String,
    /// Alternate ability names
    #[serde(default)]
    pub extra_spell_names: Vec<String>,
    /// Projectile asset name (empty if the ability has none)
    #[serde(default)]
    pub missile_name: String,
    /// Alternate projectile names
    #[serde(default)]
    pub extra_missile_names: Vec<String>,
    /// Substring matched against spawned effect object names
    #[serde(default)]
    pub source_object_name: String,
    /// Named object the ability originates from instead of the caster
    #[serde(default)]
    pub spawn_object_name: String,

    /// Shape of the effect area
    pub shape: ShapeKind,
    /// Triggers allowed to detect this ability (empty = all)
    #[serde(default)]
    pub cast_types: Vec<CastType>,

    /// Cast delay before the effect starts (ms)
    #[serde(default)]
    pub delay: f32,
    /// Maximum cast range
    #[serde(default)]
    pub range: f32,
    /// Radius (half-width for lines)
    #[serde(default)]
    pub radius: f32,
    /// Width (ring thickness, placement width)
    #[serde(default)]
    pub width: f32,
    /// Full cone angle, or arc bend, in degrees
    #[serde(default)]
    pub angle: f32,
    /// Distance added past the clamped end point
    #[serde(default)]
    pub extra_range: f32,
    /// Time the area lingers after arrival (ms)
    #[serde(default)]
    pub extra_duration: f32,

    /// Base missile speed (units/s)
    #[serde(default)]
    pub missile_speed: f32,
    /// Missile acceleration (units/s^2)
    #[serde(default)]
    pub missile_accel: f32,
    /// Speed floor for decelerating missiles
    #[serde(default)]
    pub missile_min_speed: f32,
    /// Speed cap for accelerating missiles
    #[serde(default)]
    pub missile_max_speed: f32,

    /// Obstacles that stop this ability
    #[serde(default)]
    pub collision_objects: Vec<ObstacleClass>,
    /// Danger rating (1 = low, 5 = lethal)
    #[serde(default = "default_danger")]
    pub danger_value: u8,

    /// Remove when the tracked projectile is destroyed
    #[serde(default)]
    pub can_be_removed: bool,
    /// Remove when any projectile of this ability from the caster is destroyed
    #[serde(default)]
    pub force_remove: bool,
    /// Do not clamp the end point to range
    #[serde(default)]
    pub ignore_max_range: bool,
    /// Always travel exactly `range`
    #[serde(default)]
    pub fixed_range: bool,
    /// Start point follows the caster while active
    #[serde(default)]
    pub missile_follows_caster: bool,
    /// Missile object exists during the cast delay
    #[serde(default)]
    pub missile_pre_delayed: bool,
    /// Cast resets the caster's basic attack timer
    #[serde(default)]
    pub resets_attack_timer: bool,
}

impl SpellMetadata {
    /// Minimal record with every optional field at its default.
    pub fn new(champion_name: &str, spell_name: &str, shape: ShapeKind) -> Self {
        Self {
            champion_name: champion_name.to_string(),
            spell_name: spell_name.to_string(),
            extra_spell_names: Vec::new(),
            missile_name: String::new(),
            extra_missile_names: Vec::new(),
            source_object_name: String::new(),
            spawn_object_name: String::new(),
            shape,
            cast_types: Vec::new(),
            delay: 0.0,
            range: 0.0,
            radius: 0.0,
            width: 0.0,
            angle: 0.0,
            extra_range: 0.0,
            extra_duration: 0.0,
            missile_speed: 0.0,
            missile_accel: 0.0,
            missile_min_speed: 0.0,
            missile_max_speed: 0.0,
            collision_objects: Vec::new(),
            danger_value: default_danger(),
            can_be_removed: false,
            force_remove: false,
            ignore_max_range: false,
            fixed_range: false,
            missile_follows_caster: false,
            missile_pre_delayed: false,
            resets_attack_timer: false,
        }
    }

    /// Is the missile speed time-varying?
    #[inline]
    pub fn is_accelerating(&self) -> bool {
        self.missile_accel != 0.0
    }

    /// May `cast_type` detect this ability?
    pub fn accepts(&self, cast_type: CastType) -> bool {
        self.cast_types.is_empty() || self.cast_types.contains(&cast_type)
    }

    /// Obstacles as a bit mask.
    pub fn collision_mask(&self) -> CollisionMask {
        CollisionMask::from_classes(&self.collision_objects)
    }

    /// Missile kinematic parameters.
    pub fn kinematics(&self) -> Kinematics {
        Kinematics {
            speed: self.missile_speed,
            accel: self.missile_accel,
            min_speed: self.missile_min_speed,
            max_speed: self.missile_max_speed,
        }
    }

    /// Canonical name followed by aliases.
    pub fn all_spell_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.spell_name.as_str())
            .chain(self.extra_spell_names.iter().map(String::as_str))
    }

    /// Missile name followed by aliases, skipping empty names.
    pub fn all_missile_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.missile_name.as_str())
            .chain(self.extra_missile_names.iter().map(String::as_str))
            .filter(|n| !n.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collision_mask() {
        let mask = CollisionMask::from_classes(&[ObstacleClass::Minion, ObstacleClass::MarkerWall]);
        assert!(mask.contains(ObstacleClass::Minion));
        assert!(mask.contains(ObstacleClass::MarkerWall));
        assert!(!mask.contains(ObstacleClass::Hero));
        assert!(CollisionMask::NONE.is_empty());
        assert!(CollisionMask::ALL.contains(ObstacleClass::Terrain));
    }

    #[test]
    fn test_accepts_cast_types() {
        let mut spell = SpellMetadata::new("Lux", "LuxLightBinding", ShapeKind::MissileLine);
        assert!(spell.accepts(CastType::Object));

        spell.cast_types = vec![CastType::Spell, CastType::Missile];
        assert!(spell.accepts(CastType::Missile));
        assert!(!spell.accepts(CastType::Object));
    }

    #[test]
    fn test_missile_shapes() {
        assert!(ShapeKind::MissileArc.is_missile());
        assert!(!ShapeKind::Ring.is_missile());
    }

    #[test]
    fn test_record_defaults_from_json() {
        let json = r#"{ "champion_name": "Xerath", "spell_name": "XerathArcaneBarrage2", "shape": "Circle" }"#;
        let spell: SpellMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(spell.danger_value, 1);
        assert!(spell.extra_spell_names.is_empty());
        assert!(spell.all_missile_names().next().is_none());
    }
}
