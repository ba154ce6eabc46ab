//! Per-Tick Pipeline
//!
//! The engine owns one detector, one tracker and one collision engine and
//! drives them from the host's per-tick callback. Several engines can run
//! side by side; nothing is global.
//!
//! Order within a tick:
//!
//! 1. expire pass
//! 2. refresh pass
//! 3. inbound events, in delivery order
//! 4. projectiles whose deferral ran out
//!
//! Detections therefore merge against directions refreshed this tick.

use std::sync::Arc;

use tracing::debug;

use crate::catalog::SpellCatalog;
use crate::collision::{CollisionEngine, CollisionQuery, WaypointCollision};
use crate::config::EngineConfig;
use crate::core::StateDigest;
use crate::detection::{Detector, InboundEvent, ShotSummary, ThreatEvent, ThreatEventKind, Tracker};
use crate::skillshot::{OverrideRegistry, ShotContext, Skillshot};
use crate::world::GameWorld;

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Tick number
    pub tick: u64,
    /// Events generated this tick, in order
    pub events: Vec<ThreatEvent>,
}

impl TickResult {
    /// Events of one kind.
    pub fn of_kind(&self, kind: ThreatEventKind) -> impl Iterator<Item = &ThreatEvent> {
        self.events.iter().filter(move |e| e.kind == kind)
    }
}

/// Detection, tracking and collision for one client.
#[derive(Debug)]
pub struct Engine {
    detector: Detector,
    tracker: Tracker,
    collision: CollisionEngine,
    tick: u64,
}

impl Engine {
    /// Engine with the built-in override registry.
    pub fn new(catalog: Arc<SpellCatalog>, config: EngineConfig) -> Self {
        Self::with_overrides(catalog, OverrideRegistry::builtin(), config)
    }

    /// Engine with a custom override registry.
    pub fn with_overrides(
        catalog: Arc<SpellCatalog>,
        overrides: OverrideRegistry,
        config: EngineConfig,
    ) -> Self {
        Self {
            detector: Detector::new(catalog, overrides, config.detector),
            tracker: Tracker::new(config.tracker),
            collision: CollisionEngine::new(config.collision),
            tick: 0,
        }
    }

    /// Ticks run so far.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// The tracker, for read-only queries between ticks.
    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    /// Tracked shots.
    pub fn active(&self) -> &[Skillshot] {
        self.tracker.active()
    }

    /// Owned summaries of the tracked shots.
    pub fn snapshot(&self) -> Vec<ShotSummary> {
        self.tracker.snapshot()
    }

    /// Digest of the tracked set at the current tick.
    pub fn digest(&self) -> StateDigest {
        self.tracker.digest(self.tick)
    }

    /// Evaluate a collision query.
    pub fn query(&self, world: &dyn GameWorld, query: &CollisionQuery) -> Vec<WaypointCollision> {
        self.collision.query(world, query)
    }

    /// Run one tick.
    pub fn tick(&mut self, world: &dyn GameWorld, inbound: &[InboundEvent]) -> TickResult {
        // 0. Advance tick counter
        self.tick += 1;
        let tick = self.tick;
        let now = world.now();
        let mut events = Vec::new();

        // 1. Expire
        events.extend(self.tracker.expire(tick, now));

        // 2. Refresh
        events.extend(self.tracker.refresh(tick, world));

        // 3. Inbound events
        for event in inbound {
            self.handle_event(tick, world, event, &mut events);
        }

        // 4. Deferred projectiles
        let resolved = {
            let ctx = ShotContext::new(world, self.tracker.active());
            self.detector.resolve_due(tick, &ctx)
        };
        for shot in resolved {
            events.extend(self.tracker.submit(tick, shot));
        }

        if !events.is_empty() {
            debug!("Tick {}: {} events, {} tracked", tick, events.len(), self.tracker.len());
        }

        TickResult { tick, events }
    }

    fn handle_event(
        &mut self,
        tick: u64,
        world: &dyn GameWorld,
        event: &InboundEvent,
        events: &mut Vec<ThreatEvent>,
    ) {
        match event {
            InboundEvent::AbilityCast { caster, spell_name, start, end, time } => {
                let shot = {
                    let ctx = ShotContext::new(world, self.tracker.active());
                    self.detector.on_ability_cast(&ctx, *caster, spell_name, *start, *end, *time)
                };
                if let Some(shot) = shot {
                    events.extend(self.tracker.submit(tick, shot));
                }
            }
            InboundEvent::ProjectileSpawned(info) => {
                self.detector.on_projectile_spawned(tick, world.now(), info.clone());
            }
            InboundEvent::ProjectileMoved { id, position } => {
                self.detector.on_projectile_moved(*id, *position, world.now());
                self.tracker.on_projectile_moved(*id, *position);
            }
            InboundEvent::ProjectileDestroyed { id, name, caster } => {
                self.detector.on_projectile_destroyed(*id);
                events.extend(self.tracker.on_projectile_destroyed(tick, *id, name, *caster));
            }
            InboundEvent::EffectObjectSpawned { name, owner, position, .. } => {
                let shot = {
                    let ctx = ShotContext::new(world, self.tracker.active());
                    self.detector.on_effect_object(&ctx, name, *owner, *position)
                };
                if let Some(shot) = shot {
                    events.extend(self.tracker.submit(tick, shot));
                }
            }
        }
    }
}

/// Run a recorded sequence of world frames and inbound events through a
/// fresh engine.
///
/// Returns the final digest and every event produced.
pub fn replay<W: GameWorld>(
    catalog: Arc<SpellCatalog>,
    config: EngineConfig,
    frames: &[(W, Vec<InboundEvent>)],
) -> (StateDigest, Vec<ThreatEvent>) {
    let mut engine = Engine::new(catalog, config);
    let mut events = Vec::new();

    for (world, inbound) in frames {
        let result = engine.tick(world, inbound);
        events.extend(result.events);
    }

    (engine.digest(), events)
}
