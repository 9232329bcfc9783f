use std::fmt;

use engine::Vec2;
use thiserror::Error;
use tracing::info;

use super::collision::{Aabb, ControlledEntity};
use super::placement::Decoration;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct MapId(String);

impl MapId {
    pub(crate) fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum WorldError {
    #[error("world has no maps")]
    Empty,
    #[error("unknown map '{0}'")]
    UnknownMap(MapId),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Teleporter {
    pub(crate) position: Vec2,
    pub(crate) radius: f32,
    pub(crate) destination: MapId,
    pub(crate) destination_position: Vec2,
}

impl Teleporter {
    pub(crate) fn is_triggered_by(&self, position: Vec2) -> bool {
        self.position.distance(position) < self.radius
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Map {
    pub(crate) id: MapId,
    pub(crate) texture: String,
    /// The map spans `[-half, half]` on both axes around the origin.
    pub(crate) half_extents: Vec2,
    pub(crate) spawn: Vec2,
    pub(crate) has_npcs: bool,
    pub(crate) teleporters: Vec<Teleporter>,
    /// Spots scattered decorations must keep clear of (spawn, triggers, arrivals, NPCs).
    pub(crate) reserved_points: Vec<Vec2>,
    obstacles: Vec<Aabb>,
    decorations: Vec<Decoration>,
}

impl Map {
    pub(crate) fn new(
        id: MapId,
        texture: String,
        half_extents: Vec2,
        spawn: Vec2,
        has_npcs: bool,
    ) -> Self {
        Self {
            id,
            texture,
            half_extents,
            spawn,
            has_npcs,
            teleporters: Vec::new(),
            reserved_points: Vec::new(),
            obstacles: Vec::new(),
            decorations: Vec::new(),
        }
    }

    pub(crate) fn obstacles(&self) -> &[Aabb] {
        &self.obstacles
    }

    pub(crate) fn decorations(&self) -> &[Decoration] {
        &self.decorations
    }

    pub(crate) fn push_obstacle(&mut self, obstacle: Aabb) {
        self.obstacles.push(obstacle);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TeleportEvent {
    pub(crate) from: MapId,
    pub(crate) to: MapId,
    pub(crate) position: Vec2,
}

/// Every map of the session. Exactly one is active; switching never
/// touches the state of the others.
#[derive(Debug)]
pub(crate) struct World {
    maps: Vec<Map>,
    active: usize,
}

impl World {
    pub(crate) fn new(maps: Vec<Map>, start: &MapId) -> Result<Self, WorldError> {
        if maps.is_empty() {
            return Err(WorldError::Empty);
        }
        let active = maps
            .iter()
            .position(|map| &map.id == start)
            .ok_or_else(|| WorldError::UnknownMap(start.clone()))?;
        Ok(Self { maps, active })
    }

    pub(crate) fn active_map(&self) -> &Map {
        &self.maps[self.active]
    }

    pub(crate) fn map(&self, id: &MapId) -> Option<&Map> {
        self.maps.iter().find(|map| &map.id == id)
    }

    pub(crate) fn map_mut(&mut self, id: &MapId) -> Option<&mut Map> {
        self.maps.iter_mut().find(|map| &map.id == id)
    }

    pub(crate) fn maps(&self) -> &[Map] {
        &self.maps
    }

    pub(crate) fn obstacles_of(&self, id: &MapId) -> Option<&[Aabb]> {
        self.map(id).map(Map::obstacles)
    }

    pub(crate) fn load_map(&mut self, id: &MapId) -> Result<(), WorldError> {
        let index = self
            .maps
            .iter()
            .position(|map| &map.id == id)
            .ok_or_else(|| WorldError::UnknownMap(id.clone()))?;
        self.active = index;
        info!(map = %id, obstacle_count = self.maps[index].obstacles.len(), "map_loaded");
        Ok(())
    }

    pub(crate) fn add_obstacle(&mut self, id: &MapId, obstacle: Aabb) -> Result<(), WorldError> {
        self.map_mut(id)
            .ok_or_else(|| WorldError::UnknownMap(id.clone()))?
            .push_obstacle(obstacle);
        Ok(())
    }

    /// Stores the decoration and registers its base box as an obstacle.
    pub(crate) fn add_decoration(
        &mut self,
        id: &MapId,
        decoration: Decoration,
    ) -> Result<(), WorldError> {
        self.map_mut(id)
            .ok_or_else(|| WorldError::UnknownMap(id.clone()))?
            .decorations
            .push(decoration);
        self.add_obstacle(id, decoration.base())
    }

    /// Fires the first teleporter of the active map whose radius contains the
    /// entity. At most one teleport per call.
    pub(crate) fn check_teleporters(
        &mut self,
        entity: &mut ControlledEntity,
    ) -> Result<Option<TeleportEvent>, WorldError> {
        let Some(teleporter) = self
            .active_map()
            .teleporters
            .iter()
            .find(|teleporter| teleporter.is_triggered_by(entity.position))
            .cloned()
        else {
            return Ok(None);
        };

        let from = self.active_map().id.clone();
        self.load_map(&teleporter.destination)?;
        entity.position = teleporter.destination_position;
        Ok(Some(TeleportEvent {
            from,
            to: teleporter.destination,
            position: teleporter.destination_position,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(id: &str) -> Map {
        Map::new(
            MapId::new(id),
            format!("maps/{id}"),
            Vec2::new(20.0, 15.0),
            Vec2::ZERO,
            false,
        )
    }

    fn linked_world() -> World {
        let mut exterior = map("exterior");
        exterior.teleporters.push(Teleporter {
            position: Vec2::new(-10.0, 0.0),
            radius: 1.0,
            destination: MapId::new("cave"),
            destination_position: Vec2::new(0.0, -8.0),
        });
        exterior.teleporters.push(Teleporter {
            position: Vec2::new(-10.5, 0.0),
            radius: 1.0,
            destination: MapId::new("attic"),
            destination_position: Vec2::new(3.0, 3.0),
        });
        World::new(vec![exterior, map("cave"), map("attic")], &MapId::new("exterior"))
            .expect("world")
    }

    #[test]
    fn new_rejects_unknown_start() {
        let err = World::new(vec![map("exterior")], &MapId::new("moon")).expect_err("unknown");
        assert_eq!(err, WorldError::UnknownMap(MapId::new("moon")));
        assert_eq!(
            World::new(Vec::new(), &MapId::new("exterior")).expect_err("empty"),
            WorldError::Empty
        );
    }

    #[test]
    fn switching_maps_keeps_inactive_obstacles() {
        let mut world = linked_world();
        let cave = MapId::new("cave");
        let exterior = MapId::new("exterior");
        world
            .add_obstacle(&exterior, Aabb::from_size(Vec2::new(1.0, 1.0), 2.0, 2.0))
            .expect("add");

        world.load_map(&cave).expect("load cave");
        assert_eq!(world.active_map().id, cave);
        assert_eq!(world.obstacles_of(&exterior).map(<[Aabb]>::len), Some(1));

        world.load_map(&exterior).expect("load exterior");
        assert_eq!(world.active_map().obstacles().len(), 1);
    }

    #[test]
    fn load_unknown_map_leaves_active_map() {
        let mut world = linked_world();
        assert!(world.load_map(&MapId::new("moon")).is_err());
        assert_eq!(world.active_map().id, MapId::new("exterior"));
    }

    #[test]
    fn teleport_moves_entity_to_destination_exactly() {
        let mut world = linked_world();
        let mut entity = ControlledEntity::new(Vec2::new(-9.2, 0.0), 4.0);

        let event = world
            .check_teleporters(&mut entity)
            .expect("teleport")
            .expect("triggered");
        assert_eq!(event.to, MapId::new("cave"));
        assert_eq!(world.active_map().id, MapId::new("cave"));
        assert_eq!(entity.position, Vec2::new(0.0, -8.0));
    }

    #[test]
    fn first_listed_teleporter_wins_when_radii_overlap() {
        let mut world = linked_world();
        let mut entity = ControlledEntity::new(Vec2::new(-10.25, 0.0), 4.0);

        let event = world
            .check_teleporters(&mut entity)
            .expect("teleport")
            .expect("triggered");
        assert_eq!(event.to, MapId::new("cave"));
    }

    #[test]
    fn radius_boundary_does_not_trigger() {
        let mut world = linked_world();
        let mut entity = ControlledEntity::new(Vec2::new(-9.0, 0.0), 4.0);
        assert_eq!(world.check_teleporters(&mut entity), Ok(None));
        assert_eq!(world.active_map().id, MapId::new("exterior"));
    }
}
