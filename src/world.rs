//! Game World Interface
//!
//! Everything the core needs from the host client: the clock, entity
//! lookups, named objects, obstacles and terrain. The host implements
//! [`GameWorld`]; [`WorldSnapshot`] is a plain-data implementation used by
//! tests and the replay binary.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::catalog::ObstacleClass;
use crate::core::{EntityId, GameTime, Vec2};
use crate::geometry::Polygon;

/// Team affiliation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Team {
    /// Blue side
    Order,
    /// Red side
    Chaos,
    /// Jungle monsters, unowned objects
    Neutral,
}

/// A live entity that can cast abilities.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityInfo {
    /// Network id
    pub id: EntityId,
    /// Archetype (hero name) used for override lookup
    pub archetype: String,
    /// Team
    pub team: Team,
    /// Current position
    pub position: Vec2,
    /// Alive and visible
    pub valid: bool,
}

/// Unit or hero that can block a path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Network id
    pub id: EntityId,
    /// Obstacle class
    pub class: ObstacleClass,
    /// Team
    pub team: Team,
    /// Current position
    pub position: Vec2,
    /// Bounding radius
    pub radius: f32,
    /// Movement speed (units/s)
    pub move_speed: f32,
    /// Remaining waypoints, nearest first
    pub path: Vec<Vec2>,
    /// Alive, visible and targetable
    pub valid: bool,
}

impl Obstacle {
    /// A stationary obstacle.
    pub fn stationary(id: EntityId, class: ObstacleClass, position: Vec2, radius: f32) -> Self {
        Self {
            id,
            class,
            team: Team::Chaos,
            position,
            radius,
            move_speed: 0.0,
            path: Vec::new(),
            valid: true,
        }
    }
}

/// Named object in the world (spawn anchors, effect objects).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NamedObject {
    /// Object name
    pub name: String,
    /// Owning entity, if known
    pub owner: Option<EntityId>,
    /// Position
    pub position: Vec2,
}

/// Host-provided view of the game world.
pub trait GameWorld {
    /// Current game time.
    fn now(&self) -> GameTime;

    /// Round-trip latency (ms).
    fn latency_ms(&self) -> f32;

    /// Team of the local player.
    fn local_team(&self) -> Team;

    /// Look up an entity by id.
    fn entity(&self, id: EntityId) -> Option<EntityInfo>;

    /// Position of a named object, preferring one owned by `owner`.
    fn find_object(&self, name: &str, owner: Option<EntityId>) -> Option<Vec2>;

    /// Obstacles of one class.
    fn obstacles(&self, class: ObstacleClass) -> Vec<Obstacle>;

    /// Is `point` on blocking terrain?
    fn is_wall(&self, point: Vec2) -> bool;

    /// The two end markers of the paired-marker wall, if one is up.
    fn wall_markers(&self) -> Option<(Vec2, Vec2)>;
}

/// Plain-data world state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Current game time (ms)
    pub time: GameTime,
    /// Latency (ms)
    pub latency: f32,
    /// Local player's team
    pub local_team: Team,
    /// Entities by id
    pub entities: BTreeMap<EntityId, EntityInfo>,
    /// Named objects
    pub objects: Vec<NamedObject>,
    /// Units and heroes that can block paths
    pub obstacles: Vec<Obstacle>,
    /// Blocking terrain
    pub terrain: Vec<Polygon>,
    /// Paired-marker wall ends
    pub markers: Option<(Vec2, Vec2)>,
}

impl Default for WorldSnapshot {
    fn default() -> Self {
        Self {
            time: 0.0,
            latency: 0.0,
            local_team: Team::Order,
            entities: BTreeMap::new(),
            objects: Vec::new(),
            obstacles: Vec::new(),
            terrain: Vec::new(),
            markers: None,
        }
    }
}

impl WorldSnapshot {
    /// Empty world at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a hero that can cast.
    pub fn with_hero(mut self, id: EntityId, archetype: &str, team: Team, position: Vec2) -> Self {
        self.entities.insert(
            id,
            EntityInfo {
                id,
                archetype: archetype.to_string(),
                team,
                position,
                valid: true,
            },
        );
        self
    }

    /// Add a named object.
    pub fn with_object(mut self, name: &str, owner: Option<EntityId>, position: Vec2) -> Self {
        self.objects.push(NamedObject {
            name: name.to_string(),
            owner,
            position,
        });
        self
    }

    /// Add an obstacle.
    pub fn with_obstacle(mut self, obstacle: Obstacle) -> Self {
        self.obstacles.push(obstacle);
        self
    }

    /// Add a terrain polygon.
    pub fn with_terrain(mut self, wall: Polygon) -> Self {
        self.terrain.push(wall);
        self
    }

    /// Raise the paired-marker wall.
    pub fn with_markers(mut self, a: Vec2, b: Vec2) -> Self {
        self.markers = Some((a, b));
        self
    }

    /// Advance the clock.
    pub fn advance(&mut self, ms: f32) {
        self.time += ms;
    }

    /// Move an entity.
    pub fn move_entity(&mut self, id: EntityId, position: Vec2) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.position = position;
        }
    }
}

impl GameWorld for WorldSnapshot {
    fn now(&self) -> GameTime {
        self.time
    }

    fn latency_ms(&self) -> f32 {
        self.latency
    }

    fn local_team(&self) -> Team {
        self.local_team
    }

    fn entity(&self, id: EntityId) -> Option<EntityInfo> {
        self.entities.get(&id).filter(|e| e.valid).cloned()
    }

    fn find_object(&self, name: &str, owner: Option<EntityId>) -> Option<Vec2> {
        let mut matching = self
            .objects
            .iter()
            .filter(|o| o.name.eq_ignore_ascii_case(name));
        match owner {
            Some(owner) => {
                let all: Vec<&NamedObject> = matching.collect();
                all.iter()
                    .find(|o| o.owner == Some(owner))
                    .or_else(|| all.first())
                    .map(|o| o.position)
            }
            None => matching.next().map(|o| o.position),
        }
    }

    fn obstacles(&self, class: ObstacleClass) -> Vec<Obstacle> {
        self.obstacles
            .iter()
            .filter(|o| o.class == class)
            .cloned()
            .collect()
    }

    fn is_wall(&self, point: Vec2) -> bool {
        self.terrain.iter().any(|wall| wall.contains(point))
    }

    fn wall_markers(&self) -> Option<(Vec2, Vec2)> {
        self.markers
    }
}
