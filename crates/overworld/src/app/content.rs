use std::fmt;
use std::path::Path;

use engine::{read_json_document, validate_sprite_key, ContentReadError, SpriteKeyError, Vec2};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::info;

use super::gameplay::collision::{collides, Aabb, PLAYER_HALF_EXTENT};
use super::gameplay::dialogue::Npc;
use super::gameplay::quest::NpcRole;
use super::gameplay::world::{Map, MapId, Teleporter};

pub(crate) const WORLD_FILE_NAME: &str = "world.json";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct WorldDocument {
    #[serde(deserialize_with = "deserialize_map_entries")]
    maps: Vec<(String, MapDocument)>,
    npcs: Vec<NpcDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MapDocument {
    texture: String,
    width: f32,
    height: f32,
    spawn: PointDocument,
    #[serde(default)]
    obstacles: Vec<RectDocument>,
    #[serde(default)]
    teleporters: Vec<TeleporterDocument>,
    #[serde(default)]
    npcs: bool,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
struct PointDocument {
    x: f32,
    y: f32,
}

impl PointDocument {
    fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// `x`/`y` is the centre; `width`/`height` the full size.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RectDocument {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TeleporterDocument {
    x: f32,
    y: f32,
    destination: String,
    destination_x: f32,
    destination_y: f32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NpcDocument {
    name: String,
    x: f32,
    y: f32,
    /// Portrait sprite key first, then the spoken lines.
    dialogue: Vec<String>,
}

/// Keeps every `maps` entry in document order, duplicates included, so
/// validation can report them instead of serde silently keeping the last.
fn deserialize_map_entries<'de, D>(deserializer: D) -> Result<Vec<(String, MapDocument)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct EntriesVisitor;

    impl<'de> Visitor<'de> for EntriesVisitor {
        type Value = Vec<(String, MapDocument)>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("an object of map id to map definition")
        }

        fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some(entry) = access.next_entry::<String, MapDocument>()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(EntriesVisitor)
}

#[derive(Debug, Error)]
pub(crate) enum WorldContentError {
    #[error(transparent)]
    Read(#[from] ContentReadError),
    #[error("world content defines no maps")]
    NoMaps,
    #[error("map '{id}' is defined more than once")]
    DuplicateMapId { id: String },
    #[error("map '{map}' has non-positive extent {width}x{height}")]
    NonPositiveExtent { map: String, width: f32, height: f32 },
    #[error("{owner} has a non-finite coordinate")]
    NonFinite { owner: String },
    #[error("{owner} uses invalid sprite key '{key}': {source}")]
    InvalidSprite {
        owner: String,
        key: String,
        #[source]
        source: SpriteKeyError,
    },
    #[error("obstacle {index} on map '{map}' has non-positive size")]
    DegenerateObstacle { map: String, index: usize },
    #[error("teleporter {index} on map '{map}' leads to unknown map '{destination}'")]
    UnknownDestination {
        map: String,
        index: usize,
        destination: String,
    },
    #[error(
        "teleporter {index} on map '{map}' lands at distance {distance} from a trigger on '{destination}' (radius {radius})"
    )]
    TeleporterReentry {
        map: String,
        index: usize,
        destination: String,
        distance: f32,
        radius: f32,
    },
    #[error("{what} on map '{map}' at ({x}, {y}) is inside an obstacle")]
    BlockedPosition {
        map: String,
        what: &'static str,
        x: f32,
        y: f32,
    },
    #[error("npc '{name}' needs a portrait and at least one line of dialogue")]
    EmptyDialogue { name: String },
    #[error("npc at index {index} has an empty name")]
    UnnamedNpc { index: usize },
}

#[derive(Debug)]
pub(crate) struct WorldContent {
    pub(crate) maps: Vec<Map>,
    pub(crate) npcs: Vec<Npc>,
}

pub(crate) fn load_world_content(
    path: &Path,
    teleporter_radius: f32,
) -> Result<WorldContent, WorldContentError> {
    let document: WorldDocument = read_json_document(path)?;
    let content = build_world_content(document, teleporter_radius)?;
    info!(
        path = %path.display(),
        map_count = content.maps.len(),
        npc_count = content.npcs.len(),
        "world_content_loaded"
    );
    Ok(content)
}

/// Validates the registry and turns it into runtime maps and NPCs. Every
/// configuration defect is reported here, before the first tick.
pub(crate) fn build_world_content(
    document: WorldDocument,
    teleporter_radius: f32,
) -> Result<WorldContent, WorldContentError> {
    if document.maps.is_empty() {
        return Err(WorldContentError::NoMaps);
    }
    for (index, (id, _)) in document.maps.iter().enumerate() {
        if document.maps[..index].iter().any(|(other, _)| other == id) {
            return Err(WorldContentError::DuplicateMapId { id: id.clone() });
        }
    }

    let npcs = build_npcs(&document.npcs)?;
    let mut maps = document
        .maps
        .iter()
        .map(|(id, doc)| build_map(id, doc, teleporter_radius))
        .collect::<Result<Vec<_>, _>>()?;

    validate_teleporters(&maps)?;
    reserve_points(&mut maps, &npcs);
    Ok(WorldContent { maps, npcs })
}

fn build_map(id: &str, doc: &MapDocument, teleporter_radius: f32) -> Result<Map, WorldContentError> {
    let owner = || format!("map '{id}'");
    if !(doc.width.is_finite() && doc.height.is_finite() && doc.spawn.to_vec2().is_finite()) {
        return Err(WorldContentError::NonFinite { owner: owner() });
    }
    if doc.width <= 0.0 || doc.height <= 0.0 {
        return Err(WorldContentError::NonPositiveExtent {
            map: id.to_string(),
            width: doc.width,
            height: doc.height,
        });
    }
    check_sprite_key(&owner(), &doc.texture)?;

    let mut map = Map::new(
        MapId::new(id),
        doc.texture.clone(),
        Vec2::new(doc.width * 0.5, doc.height * 0.5),
        doc.spawn.to_vec2(),
        doc.npcs,
    );

    for (index, rect) in doc.obstacles.iter().enumerate() {
        let center = Vec2::new(rect.x, rect.y);
        if !center.is_finite() || !rect.width.is_finite() || !rect.height.is_finite() {
            return Err(WorldContentError::NonFinite {
                owner: format!("obstacle {index} on map '{id}'"),
            });
        }
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return Err(WorldContentError::DegenerateObstacle {
                map: id.to_string(),
                index,
            });
        }
        map.push_obstacle(Aabb::from_size(center, rect.width, rect.height));
    }

    for (index, teleporter) in doc.teleporters.iter().enumerate() {
        let position = Vec2::new(teleporter.x, teleporter.y);
        let destination_position = Vec2::new(teleporter.destination_x, teleporter.destination_y);
        if !position.is_finite() || !destination_position.is_finite() {
            return Err(WorldContentError::NonFinite {
                owner: format!("teleporter {index} on map '{id}'"),
            });
        }
        map.teleporters.push(Teleporter {
            position,
            radius: teleporter_radius,
            destination: MapId::new(teleporter.destination.as_str()),
            destination_position,
        });
    }

    ensure_unblocked(&map, map.spawn, "spawn")?;
    Ok(map)
}

fn build_npcs(docs: &[NpcDocument]) -> Result<Vec<Npc>, WorldContentError> {
    docs.iter()
        .enumerate()
        .map(|(index, doc)| {
            if doc.name.trim().is_empty() {
                return Err(WorldContentError::UnnamedNpc { index });
            }
            let position = Vec2::new(doc.x, doc.y);
            if !position.is_finite() {
                return Err(WorldContentError::NonFinite {
                    owner: format!("npc '{}'", doc.name),
                });
            }
            let Some((portrait, lines)) = doc.dialogue.split_first() else {
                return Err(WorldContentError::EmptyDialogue {
                    name: doc.name.clone(),
                });
            };
            if lines.is_empty() {
                return Err(WorldContentError::EmptyDialogue {
                    name: doc.name.clone(),
                });
            }
            check_sprite_key(&format!("npc '{}'", doc.name), portrait)?;
            Ok(Npc {
                name: doc.name.clone(),
                position,
                portrait: portrait.clone(),
                lines: lines.to_vec(),
                role: NpcRole::from_name(&doc.name),
            })
        })
        .collect()
}

fn validate_teleporters(maps: &[Map]) -> Result<(), WorldContentError> {
    for map in maps {
        for (index, teleporter) in map.teleporters.iter().enumerate() {
            let Some(destination) = maps.iter().find(|other| other.id == teleporter.destination)
            else {
                return Err(WorldContentError::UnknownDestination {
                    map: map.id.to_string(),
                    index,
                    destination: teleporter.destination.to_string(),
                });
            };

            if let Some(reverse) = destination
                .teleporters
                .iter()
                .find(|reverse| reverse.is_triggered_by(teleporter.destination_position))
            {
                return Err(WorldContentError::TeleporterReentry {
                    map: map.id.to_string(),
                    index,
                    destination: destination.id.to_string(),
                    distance: reverse.position.distance(teleporter.destination_position),
                    radius: reverse.radius,
                });
            }
            ensure_unblocked(destination, teleporter.destination_position, "arrival")?;
        }
    }
    Ok(())
}

fn reserve_points(maps: &mut [Map], npcs: &[Npc]) {
    let arrivals = maps
        .iter()
        .flat_map(|map| map.teleporters.iter())
        .map(|teleporter| (teleporter.destination.clone(), teleporter.destination_position))
        .collect::<Vec<_>>();

    for map in maps.iter_mut() {
        let mut reserved = vec![map.spawn];
        reserved.extend(map.teleporters.iter().map(|teleporter| teleporter.position));
        reserved.extend(
            arrivals
                .iter()
                .filter(|(destination, _)| destination == &map.id)
                .map(|(_, position)| *position),
        );
        if map.has_npcs {
            reserved.extend(npcs.iter().map(|npc| npc.position));
        }
        map.reserved_points = reserved;
    }
}

fn ensure_unblocked(map: &Map, position: Vec2, what: &'static str) -> Result<(), WorldContentError> {
    let bounds = Aabb::new(position, Vec2::new(PLAYER_HALF_EXTENT, PLAYER_HALF_EXTENT));
    if collides(&bounds, map.obstacles()) {
        return Err(WorldContentError::BlockedPosition {
            map: map.id.to_string(),
            what,
            x: position.x,
            y: position.y,
        });
    }
    Ok(())
}

fn check_sprite_key(owner: &str, key: &str) -> Result<(), WorldContentError> {
    validate_sprite_key(key).map_err(|source| WorldContentError::InvalidSprite {
        owner: owner.to_string(),
        key: key.to_string(),
        source,
    })
}
