//! Per-Ability Overrides
//!
//! Some abilities do not follow their shape's default behavior. The
//! registry maps (caster archetype, ability name) to a factory that builds a
//! replacement variant. It is populated once at startup; lookups are
//! case-insensitive.

use std::collections::BTreeMap;

use super::{Endpoints, ShotContext, Skillshot, SkillshotVariant};

/// Builds a fresh variant instance.
pub type VariantFactory = fn() -> Box<dyn SkillshotVariant>;

/// Compile-time table of override variants.
#[derive(Default)]
pub struct OverrideRegistry {
    factories: BTreeMap<(String, String), VariantFactory>,
}

impl std::fmt::Debug for OverrideRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverrideRegistry")
            .field("keys", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl OverrideRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the overrides shipped in this crate.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("JarvanIV", "JarvanIVDragonStrike", || {
            Box::new(SiblingAnchoredLine {
                sibling: "JarvanIVDemacianStandard",
            })
        });
        registry.register("Ahri", "AhriOrbReturn", || Box::new(ReturningLine));
        registry
    }

    /// Register a factory. A later registration for the same key replaces
    /// the earlier one.
    pub fn register(&mut self, archetype: &str, spell: &str, factory: VariantFactory) {
        self.factories.insert(key(archetype, spell), factory);
    }

    /// Build the override for this caster and ability, if there is one.
    pub fn create(&self, archetype: &str, spell: &str) -> Option<Box<dyn SkillshotVariant>> {
        self.factories.get(&key(archetype, spell)).map(|factory| factory())
    }

    /// Number of registered overrides.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

fn key(archetype: &str, spell: &str) -> (String, String) {
    (archetype.to_lowercase(), spell.to_lowercase())
}

// =============================================================================
// BUILT-IN OVERRIDES
// =============================================================================

/// A line that reaches a sibling cast from the same caster when the
/// sibling's area lies on its path within range.
#[derive(Debug)]
pub struct SiblingAnchoredLine {
    /// Ability name of the anchor
    pub sibling: &'static str,
}

impl SkillshotVariant for SiblingAnchoredLine {
    fn name(&self) -> &'static str {
        "sibling-anchored-line"
    }

    fn endpoints(&self, shot: &Skillshot, ctx: &ShotContext<'_>) -> Endpoints {
        let base = shot.base_endpoints();
        let Some(caster) = shot.caster().id else {
            return base;
        };

        let anchor = ctx
            .active
            .iter()
            .filter(|other| other.id() != shot.id())
            .filter(|other| other.caster().id == Some(caster))
            .filter(|other| other.spell().spell_name.eq_ignore_ascii_case(self.sibling))
            .map(|other| (other.end(), other.spell().radius))
            .filter(|(anchor, radius)| {
                let along = (*anchor - base.start).dot(base.direction);
                let lateral = (*anchor - base.start).cross(base.direction).abs();
                along > 0.0 && along <= shot.spell().range + radius && lateral <= *radius
            })
            .map(|(anchor, _)| anchor)
            .min_by(|a, b| {
                a.distance_squared(base.start)
                    .total_cmp(&b.distance_squared(base.start))
            });

        match anchor {
            Some(anchor) => Endpoints::between(base.start, anchor),
            None => base,
        }
    }
}

/// A missile flying from its turn point back to the caster's current
/// position. With a stationary caster this is the outbound line reversed.
#[derive(Debug)]
pub struct ReturningLine;

impl SkillshotVariant for ReturningLine {
    fn name(&self) -> &'static str {
        "returning-line"
    }

    fn endpoints(&self, shot: &Skillshot, ctx: &ShotContext<'_>) -> Endpoints {
        let base = shot.base_endpoints();
        let target = shot.caster_position(ctx.world).unwrap_or(base.end);
        Endpoints::between(base.start, target)
    }
}
