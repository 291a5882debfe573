//! Generation-checked storage for live entities.

use crawler_core::{EntityId, EntityKind, EntitySnapshot};
use glam::Vec2;

/// Mutable state of a single entity.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Entity {
    pub(crate) name: &'static str,
    pub(crate) kind: EntityKind,
    pub(crate) position: Vec2,
    pub(crate) elevation: f32,
    pub(crate) scale: f32,
    pub(crate) distance_to_player: f32,
}

impl Entity {
    pub(crate) fn snapshot(&self, id: EntityId) -> EntitySnapshot {
        EntitySnapshot {
            id,
            name: self.name,
            kind: self.kind,
            position: self.position,
            elevation: self.elevation,
            scale: self.scale,
            distance_to_player: self.distance_to_player,
        }
    }
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    entity: Option<Entity>,
}

/// Slot arena with a free list; removed slots are reused under a new generation.
#[derive(Clone, Debug, Default)]
pub(crate) struct EntityArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl EntityArena {
    pub(crate) fn insert(&mut self, entity: Entity) -> EntityId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entity = Some(entity);
            return EntityId::new(index, slot.generation);
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            entity: Some(entity),
        });
        EntityId::new(index, 0)
    }

    pub(crate) fn get(&self, id: EntityId) -> Option<&Entity> {
        self.slots
            .get(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.entity.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.entity.as_mut())
    }

    pub(crate) fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let slot = self
            .slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())?;
        let entity = slot.entity.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index());
        self.live -= 1;
        Some(entity)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.entity
                .as_ref()
                .map(|entity| (EntityId::new(index as u32, slot.generation), entity))
        })
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.slots
            .iter_mut()
            .filter_map(|slot| slot.entity.as_mut())
    }

    pub(crate) fn len(&self) -> usize {
        self.live
    }
}
