//! Skillshot Replay
//!
//! Runs a scripted skirmish through the engine, logs every threat event,
//! then replays the same frames and checks the tracker digest matches.
//!
//! Usage: `skillshot-replay [catalog.json] [config.json]`

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use skillshot::{
    VERSION,
    catalog::{ObstacleClass, SpellCatalog},
    collision::CollisionQuery,
    config::EngineConfig,
    detection::{InboundEvent, ProjectileInfo, ThreatEventKind},
    engine::{replay, Engine},
    geometry::{best_circle_position, best_line_position},
    world::{Obstacle, Team, WorldSnapshot},
    GameWorld, Vec2,
};

/// Simulation rate of the scripted scenario (Hz).
const TICK_RATE: u32 = 30;

/// Scenario length in ticks.
const SCENARIO_TICKS: u32 = 150;

/// Local hero id.
const LOCAL_HERO: u32 = 100;

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Skillshot Replay v{}", VERSION);

    let mut args = std::env::args().skip(1);
    let catalog = match args.next() {
        Some(path) => SpellCatalog::load(&path).with_context(|| format!("loading catalog {}", path))?,
        None => SpellCatalog::builtin().context("loading builtin catalog")?,
    };
    let config = match args.next() {
        Some(path) => EngineConfig::load(&path).with_context(|| format!("loading config {}", path))?,
        None => EngineConfig::default(),
    };
    info!("Catalog: {} abilities", catalog.len());

    run_scenario(Arc::new(catalog), config)
}

/// Build the scripted frames: one world snapshot and its inbound events per tick.
fn scenario_frames() -> Vec<(WorldSnapshot, Vec<InboundEvent>)> {
    let tick_ms = 1000.0 / TICK_RATE as f32;

    let mut world = WorldSnapshot::new()
        .with_hero(LOCAL_HERO, "Garen", Team::Order, Vec2::new(800.0, 0.0))
        .with_hero(1, "Lux", Team::Chaos, Vec2::ZERO)
        .with_hero(2, "Ezreal", Team::Chaos, Vec2::new(0.0, 600.0))
        .with_hero(3, "Brand", Team::Chaos, Vec2::new(1400.0, 900.0))
        .with_obstacle(Obstacle::stationary(40, ObstacleClass::Minion, Vec2::new(450.0, 30.0), 48.0))
        .with_markers(Vec2::new(1000.0, 400.0), Vec2::new(1000.0, 800.0));
    world.latency = 50.0;

    let mut frames = Vec::with_capacity(SCENARIO_TICKS as usize);
    for t in 0..SCENARIO_TICKS {
        let now = world.now();
        let inbound = match t {
            5 => vec![InboundEvent::AbilityCast {
                caster: 1,
                spell_name: "LuxLightBinding".to_string(),
                start: Vec2::ZERO,
                end: Vec2::new(800.0, 0.0),
                time: now,
            }],
            13 => vec![InboundEvent::ProjectileSpawned(ProjectileInfo {
                id: 5001,
                name: "LuxLightBindingMis".to_string(),
                caster: Some(1),
                start: Vec2::ZERO,
                position: Vec2::new(20.0, 0.0),
                end: Vec2::new(1175.0, 0.0),
            })],
            20 => vec![InboundEvent::ProjectileMoved {
                id: 5001,
                position: Vec2::new(260.0, 0.0),
            }],
            22 => vec![InboundEvent::ProjectileDestroyed {
                id: 5001,
                name: "LuxLightBindingMis".to_string(),
                caster: Some(1),
            }],
            30 => vec![InboundEvent::AbilityCast {
                caster: 2,
                spell_name: "EzrealQ".to_string(),
                start: Vec2::new(0.0, 600.0),
                end: Vec2::new(800.0, 0.0),
                time: now,
            }],
            45 => vec![InboundEvent::EffectObjectSpawned {
                id: 7001,
                name: "Brand_Base_W_POF_tar_red".to_string(),
                owner: None,
                position: Vec2::new(900.0, 100.0),
            }],
            60 => vec![InboundEvent::AbilityCast {
                caster: 1,
                spell_name: "LuxLightStrikeKugel".to_string(),
                start: Vec2::ZERO,
                end: Vec2::new(750.0, 50.0),
                time: now,
            }],
            _ => Vec::new(),
        };

        frames.push((world.clone(), inbound));

        // Local hero strafes upward
        world.advance(tick_ms);
        let y = (t + 1) as f32 * 4.0;
        world.move_entity(LOCAL_HERO, Vec2::new(800.0, y));
    }
    frames
}

/// Where the local hero would aim its own area abilities at the enemy heroes
/// of the last frame.
fn report_placements(frames: &[(WorldSnapshot, Vec<InboundEvent>)], config: &EngineConfig) {
    let Some((world, _)) = frames.last() else {
        return;
    };
    let Some(hero) = world.entity(LOCAL_HERO) else {
        return;
    };
    let enemies: Vec<Vec2> = world
        .entities
        .values()
        .filter(|e| e.team != hero.team)
        .map(|e| e.position)
        .collect();

    if let Some(circle) = best_circle_position(hero.position, &enemies, 300.0, 1200.0, &config.placement) {
        info!(
            "Best circle at ({:.0}, {:.0}) covers {} enemies",
            circle.center.x,
            circle.center.y,
            circle.hit_count()
        );
    }
    if let Some(line) = best_line_position(hero.position, &enemies, 80.0, 1100.0) {
        info!(
            "Best line toward ({:.0}, {:.0}) crosses {} points",
            line.end.x, line.end.y, line.hit_count
        );
    }
}

fn run_scenario(catalog: Arc<SpellCatalog>, config: EngineConfig) -> Result<()> {
    info!("=== Starting Scenario ===");

    let frames = scenario_frames();
    let mut engine = Engine::new(Arc::clone(&catalog), config.clone());
    let mut total_events = 0;

    for (world, inbound) in &frames {
        let result = engine.tick(world, inbound);
        total_events += result.events.len();

        for event in &result.events {
            match event.kind {
                ThreatEventKind::NewThreatDetected => {
                    info!(
                        "[tick {}] New threat {} (shot {}, danger {})",
                        event.tick, event.shot.spell_name, event.shot.id, event.shot.danger_value
                    );
                }
                ThreatEventKind::ThreatExpired => {
                    info!("[tick {}] Expired {} (shot {})", event.tick, event.shot.spell_name, event.shot.id);
                }
                ThreatEventKind::ThreatRemoved => {
                    info!("[tick {}] Removed {} (shot {})", event.tick, event.shot.spell_name, event.shot.id);
                }
                ThreatEventKind::ThreatUpdated => {}
            }
        }

        // Consumers read the tracked set between ticks
        if let Some(hero) = world.entities.get(&LOCAL_HERO) {
            let threats = engine.tracker().threats_at(hero.position);
            if !threats.is_empty() {
                info!(
                    "[tick {}] Local hero inside {} threat(s)",
                    result.tick,
                    threats.len()
                );
            }
        }

        for shot in engine.active() {
            let query = CollisionQuery::for_shot(shot);
            if query.mask.is_empty() {
                continue;
            }
            let blocked = engine
                .query(world, &query)
                .iter()
                .any(|r| r.collides());
            let is_new = result
                .of_kind(ThreatEventKind::NewThreatDetected)
                .any(|e| e.shot.id == shot.id());
            if blocked && is_new {
                info!("[tick {}] {} is blocked before its end", result.tick, shot.spell().spell_name);
            }
        }
    }

    info!("=== Scenario Results ===");
    let digest = engine.digest();
    info!("Final Tracker Digest: {}", hex::encode(digest));
    info!("Still tracked: {}", engine.active().len());
    info!("Danger polygons: {}", engine.tracker().danger_polygons().len());
    info!("Total events: {}", total_events);

    report_placements(&frames, &config);

    info!("=== Verifying Determinism ===");
    let (replay_digest, replay_events) = replay(catalog, config, &frames);
    info!("Replay Tracker Digest: {}", hex::encode(replay_digest));

    if digest != replay_digest || replay_events.len() != total_events {
        warn!("DETERMINISM FAILURE: digests differ");
        bail!("replay diverged");
    }
    info!("DETERMINISM VERIFIED: digests match");
    Ok(())
}
