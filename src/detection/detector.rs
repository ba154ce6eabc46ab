//! Skillshot Detector
//!
//! Turns inbound collaborator events into processed skillshots. Three
//! triggers feed it:
//!
//! - ability casts, classified by ability name
//! - spawned projectiles, classified by asset name and resolved one tick
//!   after they appear
//! - spawned effect objects, classified by source-object name fragment
//!
//! A detection that does not match the catalog, is not allowed for its
//! trigger, comes from an ally, or fails to resolve is dropped. None of
//! these are errors for the caller.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::catalog::{CastType, SpellCatalog, SpellMetadata};
use crate::config::DetectorConfig;
use crate::core::{EntityId, GameTime, Vec2};
use crate::skillshot::{
    CastObservation, Caster, DefaultVariant, DetectionOrigin, MissileHandle,
    OverrideRegistry, ShotContext, ShotId, Skillshot,
};
use crate::world::GameWorld;

use super::events::ProjectileInfo;

/// Projectile waiting for its deferred resolution.
#[derive(Clone, Debug, PartialEq)]
struct PendingProjectile {
    /// Tick at which to resolve
    due_tick: u64,
    /// Latest host report
    info: ProjectileInfo,
    /// Time of the latest report
    observed_at: GameTime,
    /// Time the projectile first appeared
    spawned_at: GameTime,
}

/// Classifies collaborator events into skillshots.
#[derive(Debug)]
pub struct Detector {
    catalog: Arc<SpellCatalog>,
    overrides: OverrideRegistry,
    config: DetectorConfig,
    pending: Vec<PendingProjectile>,
    next_id: ShotId,
}

impl Detector {
    /// Create a detector over a catalog and override registry.
    pub fn new(catalog: Arc<SpellCatalog>, overrides: OverrideRegistry, config: DetectorConfig) -> Self {
        Self {
            catalog,
            overrides,
            config,
            pending: Vec::new(),
            next_id: 1,
        }
    }

    /// Catalog in use.
    pub fn catalog(&self) -> &SpellCatalog {
        &self.catalog
    }

    /// Projectiles waiting for resolution.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    // =========================================================================
    // Triggers
    // =========================================================================

    /// An ability cast was observed.
    pub fn on_ability_cast(
        &mut self,
        ctx: &ShotContext<'_>,
        caster: EntityId,
        spell_name: &str,
        start: Vec2,
        end: Vec2,
        time: GameTime,
    ) -> Option<Skillshot> {
        let spell = Arc::clone(self.catalog.lookup_by_name(spell_name)?);
        if !spell.accepts(CastType::Spell) {
            return None;
        }

        let caster = resolve_caster(ctx.world, Some(caster), &spell);
        let cast = CastObservation { start: Some(start), end, time };
        self.build(ctx, spell, caster, DetectionOrigin::ProcessSpell, cast, None)
    }

    /// A projectile appeared. Resolution waits `projectile_defer_ticks`.
    ///
    /// Returns false if the projectile is not an ability of interest.
    pub fn on_projectile_spawned(&mut self, tick: u64, now: GameTime, info: ProjectileInfo) -> bool {
        let Some(spell) = self.catalog.lookup_by_missile_name(&info.name) else {
            return false;
        };
        if !spell.accepts(CastType::Missile) {
            return false;
        }

        debug!("Deferring projectile {} ({}) to tick {}", info.id, info.name, tick + self.config.projectile_defer_ticks);
        self.pending.push(PendingProjectile {
            due_tick: tick + self.config.projectile_defer_ticks,
            info,
            observed_at: now,
            spawned_at: now,
        });
        true
    }

    /// A pending projectile reported a new position.
    pub fn on_projectile_moved(&mut self, id: EntityId, position: Vec2, now: GameTime) {
        if let Some(pending) = self.pending.iter_mut().find(|p| p.info.id == id) {
            pending.info.position = position;
            pending.observed_at = now;
        }
    }

    /// A projectile died. Drops it if it was still waiting.
    pub fn on_projectile_destroyed(&mut self, id: EntityId) {
        self.pending.retain(|p| p.info.id != id);
    }

    /// Resolve every pending projectile due at or before `tick`.
    pub fn resolve_due(&mut self, tick: u64, ctx: &ShotContext<'_>) -> Vec<Skillshot> {
        let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|p| p.due_tick <= tick);
        self.pending = waiting;

        due.into_iter()
            .filter_map(|pending| self.resolve_projectile(ctx, pending))
            .collect()
    }

    /// A transient effect object appeared.
    pub fn on_effect_object(
        &mut self,
        ctx: &ShotContext<'_>,
        name: &str,
        owner: Option<EntityId>,
        position: Vec2,
    ) -> Option<Skillshot> {
        let spell = Arc::clone(self.catalog.lookup_by_source_object_name(name)?);
        if !spell.accepts(CastType::Object) {
            return None;
        }

        // A visible owner anchors the start, so the object lines up with the cast
        let caster = resolve_caster(ctx.world, owner, &spell);
        let cast = CastObservation {
            start: caster.hostility_assumed.then_some(position),
            end: position,
            time: ctx.now,
        };
        self.build(ctx, spell, caster, DetectionOrigin::ObjectCreate, cast, None)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn resolve_projectile(&mut self, ctx: &ShotContext<'_>, pending: PendingProjectile) -> Option<Skillshot> {
        let spell = Arc::clone(self.catalog.lookup_by_missile_name(&pending.info.name)?);
        let info = pending.info;

        // Back-compute the cast time from the observed flight
        let travelled = info.start.distance(info.position);
        let elapsed_travel = spell.kinematics().travel_time(travelled).unwrap_or(0.0);
        let delay = if spell.missile_pre_delayed { 0.0 } else { spell.delay };
        let time = pending.observed_at - ctx.world.latency_ms() * 0.5 - elapsed_travel - delay;

        let caster = resolve_caster(ctx.world, info.caster, &spell);
        let cast = CastObservation {
            start: Some(info.start),
            end: info.end,
            time,
        };
        let mut handle = MissileHandle::new(info.id, &info.name, pending.spawned_at);
        handle.last_position = Some(info.position);

        self.build(ctx, spell, caster, DetectionOrigin::MissileCreate, cast, Some(handle))
    }

    fn build(
        &mut self,
        ctx: &ShotContext<'_>,
        spell: Arc<SpellMetadata>,
        caster: Caster,
        origin: DetectionOrigin,
        cast: CastObservation,
        missile: Option<MissileHandle>,
    ) -> Option<Skillshot> {
        if !caster.hostility_assumed
            && caster.team == ctx.world.local_team()
            && !self.config.track_allies
        {
            debug!("Ignoring allied cast of {}", spell.spell_name);
            return None;
        }

        let variant = self
            .overrides
            .create(&caster.archetype, &spell.spell_name)
            .unwrap_or_else(|| Box::new(DefaultVariant));

        let id = self.next_id;
        self.next_id += 1;

        let mut shot = Skillshot::new(id, spell, caster, origin, cast, variant, &self.config);

        if let Some(handle) = missile {
            if let Err(e) = shot.attach_missile(handle) {
                warn!("{}; tracking without live missile", e);
            }
        }

        match shot.process(ctx) {
            Ok(()) => Some(shot),
            Err(e) => {
                warn!("Discarding detection: {}", e);
                None
            }
        }
    }
}

/// Caster identity, degrading to "assumed hostile" when ownership is unknown.
fn resolve_caster(world: &dyn GameWorld, id: Option<EntityId>, spell: &SpellMetadata) -> Caster {
    match id.and_then(|id| world.entity(id)) {
        Some(entity) => Caster {
            id: Some(entity.id),
            archetype: entity.archetype,
            team: entity.team,
            hostility_assumed: false,
        },
        None => Caster {
            id,
            ..Caster::unknown(&spell.champion_name)
        },
    }
}
