//! Spawn codes stored in the payload of walkable cells.

use crawler_core::{EntityKind, HostileStats};

/// Sprites are authored ten times larger than they are drawn.
pub(crate) const SCALE_DIVISOR: f32 = 10.0;

/// Elevation shared by every spawned sprite so it rests on the floor.
pub(crate) const SPAWN_ELEVATION: f32 = -12.0;

/// Blueprint for the entity spawned by a cell payload.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SpawnTemplate {
    pub(crate) name: &'static str,
    pub(crate) kind: EntityKind,
    pub(crate) scale: f32,
}

const fn hostile(
    name: &'static str,
    max_health: u32,
    base_damage: u32,
    speed: f32,
    scale: f32,
) -> SpawnTemplate {
    SpawnTemplate {
        name,
        kind: EntityKind::Hostile(HostileStats {
            max_health,
            base_damage,
            speed,
        }),
        scale,
    }
}

const fn template(name: &'static str, kind: EntityKind, scale: f32) -> SpawnTemplate {
    SpawnTemplate { name, kind, scale }
}

/// Looks up the blueprint for a spawn code; zero and unknown codes spawn nothing.
pub(crate) fn template_for(code: u16) -> Option<SpawnTemplate> {
    let template = match code {
        1 => template(
            "dungeon_keeper",
            EntityKind::Dialogue {
                dialogue: "dungeon_keeper",
            },
            0.5,
        ),
        2 => hostile("skeleton", 60, 10, 35.0, 1.0),
        3 => hostile("rat", 15, 5, 100.0, 0.5),
        4 => template(
            "key1",
            EntityKind::Collectible {
                dialogue: "object_collected",
            },
            0.2,
        ),
        5 => template(
            "key2",
            EntityKind::Collectible {
                dialogue: "object_collected",
            },
            0.2,
        ),
        6 => template("tree", EntityKind::Static, 1.0),
        7 => template(
            "hooded_man",
            EntityKind::Dialogue {
                dialogue: "hooded_man",
            },
            0.5,
        ),
        8 => hostile("zombie", 50, 8, 30.0, 1.0),
        9 => hostile("goblin", 30, 6, 30.0, 1.0),
        10 => template(
            "ancient_scroll",
            EntityKind::Collectible {
                dialogue: "ancient_scroll",
            },
            0.5,
        ),
        11 => template("stone_statue", EntityKind::Static, 1.0),
        12 => hostile("dark_knight", 120, 20, 30.0, 1.0),
        _ => return None,
    };
    Some(template)
}
