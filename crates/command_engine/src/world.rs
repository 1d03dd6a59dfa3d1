use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The only entity capability commands are allowed to touch.
pub trait Movable {
    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);
}

/// Resolves bound target ids to something a command can move.
pub trait TargetWorld {
    fn target(&self, id: EntityId) -> Option<&dyn Movable>;
    fn target_mut(&mut self, id: EntityId) -> Option<&mut dyn Movable>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub position: Vec3,
}

impl Movable for Entity {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }
}

#[derive(Debug, Default)]
pub struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

#[derive(Debug, Default)]
pub struct World {
    allocator: EntityIdAllocator,
    entities: Vec<Entity>,
}

impl World {
    pub fn spawn(&mut self, name: impl Into<String>, position: Vec3) -> EntityId {
        let id = self.allocator.allocate();
        self.entities.push(Entity {
            id,
            name: name.into(),
            position,
        });
        id
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn find_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    pub fn find_entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|entity| entity.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.name == name)
    }

    pub fn position_of(&self, id: EntityId) -> Option<Vec3> {
        self.find_entity(id).map(|entity| entity.position)
    }
}

impl TargetWorld for World {
    fn target(&self, id: EntityId) -> Option<&dyn Movable> {
        self.find_entity(id).map(|entity| entity as &dyn Movable)
    }

    fn target_mut(&mut self, id: EntityId) -> Option<&mut dyn Movable> {
        self.find_entity_mut(id)
            .map(|entity| entity as &mut dyn Movable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocator_never_reuses_ids() {
        let mut allocator = EntityIdAllocator::default();
        let first = allocator.allocate();
        let second = allocator.allocate();
        let third = allocator.allocate();

        assert_eq!(first.0, 0);
        assert_eq!(second.0, 1);
        assert_eq!(third.0, 2);
    }

    #[test]
    fn spawn_and_lookup_by_id_and_name() {
        let mut world = World::default();
        let cube = world.spawn("cube", Vec3::ZERO);
        let sphere = world.spawn("sphere", Vec3::new(3.0, 0.0, 0.0));

        assert_eq!(world.entities().len(), 2);
        assert_eq!(world.find_entity(cube).map(|e| e.name.as_str()), Some("cube"));
        assert_eq!(world.find_by_name("sphere").map(|e| e.id), Some(sphere));
        assert!(world.find_by_name("cone").is_none());
        assert!(world.find_entity(EntityId(99)).is_none());
    }

    #[test]
    fn target_world_moves_only_the_requested_entity() {
        let mut world = World::default();
        let cube = world.spawn("cube", Vec3::ZERO);
        let sphere = world.spawn("sphere", Vec3::new(3.0, 0.0, 0.0));

        world
            .target_mut(cube)
            .expect("cube target")
            .set_position(Vec3::new(0.0, 0.0, 1.0));

        assert_eq!(world.position_of(cube), Some(Vec3::new(0.0, 0.0, 1.0)));
        assert_eq!(world.position_of(sphere), Some(Vec3::new(3.0, 0.0, 0.0)));
        assert_eq!(
            world.target(cube).map(|target| target.position()),
            Some(Vec3::new(0.0, 0.0, 1.0))
        );
        assert!(world.target_mut(EntityId(42)).is_none());
    }
}
