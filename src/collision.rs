//! Path Collision
//!
//! Answers "does this path hit something before it gets there?" for a
//! source point and a list of waypoints. Each waypoint is tested along the
//! straight segment from the source.
//!
//! - Minions and heroes: positions are predicted to the time the path
//!   reaches the waypoint, then tested against the segment with the
//!   combined radius. Results name the obstacles.
//! - Terrain: the segment is sampled at equal steps. The result is only a
//!   blocked flag.
//! - Paired-marker wall: the wall rectangle's edges are tested against the
//!   segment. The result is only a blocked flag.
//!
//! An obstacle whose position cannot be predicted is left out of the
//! result; the query carries on with the rest.

use std::collections::BTreeSet;

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::catalog::{CollisionMask, ObstacleClass};
use crate::config::CollisionConfig;
use crate::core::{EntityId, Vec2};
use crate::error::PredictionError;
use crate::geometry::polygon;
use crate::skillshot::Skillshot;
use crate::world::{GameWorld, Obstacle, Team};

/// Inputs of a collision query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollisionQuery {
    /// Path origin
    pub source: Vec2,
    /// Points to test, each along a segment from `source`
    pub waypoints: Vec<Vec2>,
    /// Obstacle classes to consider
    pub mask: CollisionMask,
    /// Half-width of the moving body
    pub path_radius: f32,
    /// Travel speed (units/s, 0 = instant)
    pub speed: f32,
    /// Time before travel starts (ms)
    pub delay: f32,
    /// Only units on this team block the path (`None` = any team)
    pub obstacle_team: Option<Team>,
}

impl CollisionQuery {
    /// Instant query with no delay.
    pub fn new(source: Vec2, waypoints: Vec<Vec2>, mask: CollisionMask, path_radius: f32) -> Self {
        Self {
            source,
            waypoints,
            mask,
            path_radius,
            speed: 0.0,
            delay: 0.0,
            obstacle_team: None,
        }
    }

    /// Query for a skillshot's own flight, using its metadata.
    pub fn for_shot(shot: &Skillshot) -> Self {
        let spell = shot.spell();
        Self {
            source: shot.start(),
            waypoints: vec![shot.end()],
            mask: spell.collision_mask(),
            path_radius: spell.radius,
            speed: spell.missile_speed,
            delay: spell.delay,
            obstacle_team: None,
        }
    }

    /// Time (ms) at which the path reaches `waypoint`.
    pub fn arrival_time(&self, waypoint: Vec2) -> f32 {
        if self.speed <= 0.0 {
            return self.delay;
        }
        self.delay + self.source.distance(waypoint) / self.speed * 1000.0
    }
}

/// Result for one waypoint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WaypointCollision {
    /// Index into the query's waypoints
    pub index: usize,
    /// Units and heroes hit on the way, by id
    pub obstacles: BTreeSet<EntityId>,
    /// Terrain or the marker wall blocks the way
    pub blocked: bool,
}

impl WaypointCollision {
    /// Anything in the way?
    pub fn collides(&self) -> bool {
        self.blocked || !self.obstacles.is_empty()
    }
}

/// Predict where `obstacle` will be after `delay` ms, walking its path.
pub fn predict_position(obstacle: &Obstacle, delay: f32) -> Result<Vec2, PredictionError> {
    if !obstacle.valid {
        return Err(PredictionError::ObstacleInvalid(obstacle.id));
    }
    if !obstacle.move_speed.is_finite() || obstacle.move_speed < 0.0 || !delay.is_finite() {
        return Err(PredictionError::NoMovementData(obstacle.id));
    }

    let mut remaining = obstacle.move_speed * delay.max(0.0) / 1000.0;
    let mut position = obstacle.position;
    for waypoint in &obstacle.path {
        let leg = position.distance(*waypoint);
        if remaining <= leg {
            return Ok(position.extend(*waypoint, remaining));
        }
        remaining -= leg;
        position = *waypoint;
    }
    Ok(position)
}

/// Evaluates collision queries against the world.
#[derive(Clone, Debug, Default)]
pub struct CollisionEngine {
    config: CollisionConfig,
}

impl CollisionEngine {
    /// Create an engine with the given tuning.
    pub fn new(config: CollisionConfig) -> Self {
        Self { config }
    }

    /// Evaluate every waypoint of `query`.
    pub fn query(&self, world: &dyn GameWorld, query: &CollisionQuery) -> Vec<WaypointCollision> {
        let units = self.gather_units(world, query);
        let markers = if query.mask.contains(ObstacleClass::MarkerWall) {
            world.wall_markers()
        } else {
            None
        };

        query
            .waypoints
            .iter()
            .enumerate()
            .map(|(index, waypoint)| {
                let mut result = WaypointCollision {
                    index,
                    ..WaypointCollision::default()
                };

                // 1. Units and heroes
                self.collect_units(query, *waypoint, &units, &mut result.obstacles);

                // 2. Terrain
                if query.mask.contains(ObstacleClass::Terrain)
                    && self.terrain_blocks(world, query.source, *waypoint)
                {
                    result.blocked = true;
                }

                // 3. Paired-marker wall
                if let Some((a, b)) = markers {
                    if self.wall_blocks(a, b, query.source, *waypoint) {
                        result.blocked = true;
                    }
                }

                result
            })
            .collect()
    }

    /// Does any waypoint collide?
    pub fn collides(&self, world: &dyn GameWorld, query: &CollisionQuery) -> bool {
        self.query(world, query).iter().any(WaypointCollision::collides)
    }

    fn gather_units(&self, world: &dyn GameWorld, query: &CollisionQuery) -> Vec<Obstacle> {
        let mut units = Vec::new();
        for class in [ObstacleClass::Minion, ObstacleClass::Hero] {
            if query.mask.contains(class) {
                units.extend(
                    world
                        .obstacles(class)
                        .into_iter()
                        .filter(|o| query.obstacle_team.map_or(true, |team| o.team == team)),
                );
            }
        }
        units
    }

    fn collect_units(
        &self,
        query: &CollisionQuery,
        waypoint: Vec2,
        units: &[Obstacle],
        hits: &mut BTreeSet<EntityId>,
    ) {
        let source = query.source;
        let validity = source.distance(waypoint) + self.config.validity_extension;
        let arrival = query.arrival_time(waypoint);

        for unit in units {
            if unit.position.distance(source) > validity {
                continue;
            }

            let predicted = match predict_position(unit, arrival) {
                Ok(position) => position,
                Err(e) => {
                    debug!("Skipping obstacle: {}", e);
                    continue;
                }
            };

            let reach = query.path_radius + unit.radius + self.config.slack;
            let reach_sq = reach * reach;
            if predicted.distance_squared(source) <= reach_sq
                || predicted.distance_squared(waypoint) <= reach_sq
                || predicted.distance_to_segment_squared(source, waypoint) <= reach_sq
            {
                hits.insert(unit.id);
            }
        }
    }

    fn terrain_blocks(&self, world: &dyn GameWorld, source: Vec2, waypoint: Vec2) -> bool {
        let steps = self.config.terrain_samples.max(1);
        (1..=steps).any(|i| world.is_wall(source.lerp(waypoint, i as f32 / steps as f32)))
    }

    fn wall_blocks(&self, a: Vec2, b: Vec2, source: Vec2, waypoint: Vec2) -> bool {
        polygon::rectangle(a, b, self.config.wall_thickness * 0.5).intersects_segment(source, waypoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::WorldSnapshot;

    fn path_query(mask: CollisionMask) -> CollisionQuery {
        CollisionQuery::new(Vec2::ZERO, vec![Vec2::new(1000.0, 0.0)], mask, 50.0)
    }

    #[test]
    fn test_static_obstacle_on_path() {
        let world = WorldSnapshot::new()
            .with_obstacle(Obstacle::stationary(10, ObstacleClass::Minion, Vec2::new(500.0, 0.0), 50.0));
        let engine = CollisionEngine::default();

        let results = engine.query(&world, &path_query(CollisionMask::MINIONS));
        assert_eq!(results.len(), 1);
        assert!(results[0].obstacles.contains(&10));
        assert!(!results[0].blocked);
    }

    #[test]
    fn test_static_obstacle_off_path() {
        let world = WorldSnapshot::new()
            .with_obstacle(Obstacle::stationary(10, ObstacleClass::Minion, Vec2::new(500.0, 500.0), 50.0));
        let engine = CollisionEngine::default();

        let results = engine.query(&world, &path_query(CollisionMask::MINIONS));
        assert!(!results[0].collides());
    }

    #[test]
    fn test_mask_filters_classes() {
        let world = WorldSnapshot::new()
            .with_obstacle(Obstacle::stationary(10, ObstacleClass::Hero, Vec2::new(500.0, 0.0), 50.0));
        let engine = CollisionEngine::default();

        assert!(!engine.collides(&world, &path_query(CollisionMask::MINIONS)));
        assert!(engine.collides(&world, &path_query(CollisionMask::HEROES)));
    }

    #[test]
    fn test_moving_obstacle_predicted() {
        // Walks onto the path by the time the missile gets there
        let mut unit = Obstacle::stationary(11, ObstacleClass::Hero, Vec2::new(1000.0, 400.0), 50.0);
        unit.move_speed = 400.0;
        unit.path = vec![Vec2::new(1000.0, 0.0)];
        let world = WorldSnapshot::new().with_obstacle(unit);
        let engine = CollisionEngine::default();

        let mut query = path_query(CollisionMask::HEROES);
        query.speed = 1000.0;
        assert!(engine.collides(&world, &query));

        // Instant path: the unit is still far away
        query.speed = 0.0;
        assert!(!engine.collides(&world, &query));
    }

    #[test]
    fn test_invalid_obstacle_excluded() {
        let mut dead = Obstacle::stationary(12, ObstacleClass::Minion, Vec2::new(300.0, 0.0), 50.0);
        dead.valid = false;
        let world = WorldSnapshot::new()
            .with_obstacle(dead)
            .with_obstacle(Obstacle::stationary(13, ObstacleClass::Minion, Vec2::new(600.0, 0.0), 50.0));
        let engine = CollisionEngine::default();

        let results = engine.query(&world, &path_query(CollisionMask::MINIONS));
        assert_eq!(results[0].obstacles.iter().copied().collect::<Vec<_>>(), vec![13]);
    }

    #[test]
    fn test_out_of_validity_range_ignored() {
        let world = WorldSnapshot::new()
            .with_obstacle(Obstacle::stationary(14, ObstacleClass::Minion, Vec2::new(-1500.0, 0.0), 50.0));
        let engine = CollisionEngine::default();
        assert!(!engine.collides(&world, &path_query(CollisionMask::MINIONS)));
    }

    #[test]
    fn test_terrain_blocks() {
        let wall = polygon::rectangle(Vec2::new(700.0, -300.0), Vec2::new(700.0, 300.0), 40.0);
        let world = WorldSnapshot::new().with_terrain(wall);
        let engine = CollisionEngine::default();

        let query = CollisionQuery::new(
            Vec2::ZERO,
            vec![Vec2::new(1000.0, 0.0), Vec2::new(500.0, 0.0)],
            CollisionMask::TERRAIN,
            50.0,
        );
        let results = engine.query(&world, &query);
        assert!(results[0].blocked);
        assert!(results[0].obstacles.is_empty());
        assert!(!results[1].blocked);
        assert_eq!(results[1].index, 1);
    }

    #[test]
    fn test_marker_wall_blocks() {
        let world = WorldSnapshot::new().with_markers(Vec2::new(500.0, -200.0), Vec2::new(500.0, 200.0));
        let engine = CollisionEngine::default();

        assert!(engine.collides(&world, &path_query(CollisionMask::MARKER_WALL)));
        assert!(!engine.collides(&world, &path_query(CollisionMask::TERRAIN)));

        let beside = CollisionQuery::new(
            Vec2::new(0.0, 500.0),
            vec![Vec2::new(1000.0, 500.0)],
            CollisionMask::MARKER_WALL,
            50.0,
        );
        assert!(!engine.collides(&world, &beside));
    }

    #[test]
    fn test_predict_position_walks_path() {
        let mut unit = Obstacle::stationary(1, ObstacleClass::Hero, Vec2::ZERO, 65.0);
        unit.move_speed = 300.0;
        unit.path = vec![Vec2::new(300.0, 0.0), Vec2::new(300.0, 300.0)];

        assert_eq!(predict_position(&unit, 0.0), Ok(Vec2::ZERO));
        let p = predict_position(&unit, 1500.0).unwrap();
        assert!(p.distance(Vec2::new(300.0, 150.0)) < 1e-3);
        // Stops at the end of its path
        assert_eq!(predict_position(&unit, 10_000.0), Ok(Vec2::new(300.0, 300.0)));

        unit.move_speed = f32::NAN;
        assert_eq!(predict_position(&unit, 10.0), Err(PredictionError::NoMovementData(1)));
    }

    #[test]
    fn test_query_for_shot() {
        use crate::catalog::{ShapeKind, SpellMetadata};
        use crate::skillshot::test_support::processed_shot;

        let world = WorldSnapshot::new()
            .with_obstacle(Obstacle::stationary(20, ObstacleClass::Minion, Vec2::new(400.0, 30.0), 40.0));
        let mut spell = SpellMetadata::new("Lux", "LuxLightBinding", ShapeKind::MissileLine);
        spell.range = 1175.0;
        spell.radius = 70.0;
        spell.missile_speed = 1200.0;
        spell.collision_objects = vec![ObstacleClass::Minion];
        let shot = processed_shot(&world, 1, spell, 1, Vec2::ZERO, Vec2::new(1000.0, 0.0));

        let query = CollisionQuery::for_shot(&shot);
        assert_eq!(query.waypoints, vec![Vec2::new(1000.0, 0.0)]);
        assert!(CollisionEngine::default().collides(&world, &query));
    }
}
