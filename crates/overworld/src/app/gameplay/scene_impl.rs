use engine::{
    view_half_extents_world, Backdrop, EntityId, InputSnapshot, RenderableDesc, RenderableKind,
    Scene, SceneWorld, Transform, Vec2,
};
use tracing::{info, trace, warn};

use super::dialogue::InteractionState;
use super::notifications::{Notification, NotificationKind};
use super::player_record::INVENTORY_SLOTS;
use super::simulation::SimulationContext;
use super::world::MapId;

const PLAYER_SPRITE: &str = "actors/player";
const PLAYER_TINT: [u8; 4] = [230, 200, 90, 255];
const NPC_TINT: [u8; 4] = [200, 120, 80, 255];
const TELEPORTER_TINT: [u8; 4] = [140, 90, 220, 255];
const NPC_HALF_EXTENTS: Vec2 = Vec2::new(0.6, 0.8);

/// Adapts the simulation to the engine: ticks it and mirrors its state into
/// the renderable `SceneWorld`.
pub(crate) struct ExplorationScene {
    sim: SimulationContext,
    player_entity: Option<EntityId>,
    map_entities: Vec<EntityId>,
    mirrored_map: Option<MapId>,
    window_size: (u32, u32),
    latest_notification: Option<Notification>,
}

impl ExplorationScene {
    pub(crate) fn new(sim: SimulationContext) -> Self {
        Self {
            sim,
            player_entity: None,
            map_entities: Vec::new(),
            mirrored_map: None,
            window_size: (0, 0),
            latest_notification: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn simulation(&self) -> &SimulationContext {
        &self.sim
    }

    #[cfg(test)]
    pub(crate) fn simulation_mut(&mut self) -> &mut SimulationContext {
        &mut self.sim
    }

    fn rebuild_map_entities(&mut self, world: &mut SceneWorld) {
        for id in self.map_entities.drain(..) {
            world.despawn(id);
        }

        let map = self.sim.world.active_map();
        world.set_backdrop(Backdrop {
            sprite_key: map.texture.clone(),
            half_extents: map.half_extents,
        });

        for decoration in map.decorations() {
            let id = world.spawn(
                Transform {
                    position: decoration.position,
                    flip_x: false,
                },
                RenderableDesc {
                    kind: RenderableKind::Sprite(decoration.kind.sprite_key().to_string()),
                    debug_name: decoration.kind.as_str(),
                    half_extents: decoration.kind.visual_half_extents(),
                    tint: decoration.kind.tint(),
                },
            );
            self.map_entities.push(id);
        }

        for teleporter in &map.teleporters {
            let id = world.spawn(
                Transform {
                    position: teleporter.position,
                    flip_x: false,
                },
                RenderableDesc {
                    kind: RenderableKind::Placeholder,
                    debug_name: "teleporter",
                    half_extents: Vec2::new(teleporter.radius, teleporter.radius),
                    tint: TELEPORTER_TINT,
                },
            );
            self.map_entities.push(id);
        }

        for npc in self.sim.visible_npcs() {
            let id = world.spawn(
                Transform {
                    position: npc.position,
                    flip_x: false,
                },
                RenderableDesc {
                    kind: RenderableKind::Sprite(npc.portrait.clone()),
                    debug_name: "npc",
                    half_extents: NPC_HALF_EXTENTS,
                    tint: NPC_TINT,
                },
            );
            self.map_entities.push(id);
        }

        info!(
            map = %map.id,
            entity_count = self.map_entities.len(),
            "map_mirrored"
        );
        self.mirrored_map = Some(map.id.clone());
    }

    fn player_transform(&self) -> Transform {
        Transform {
            position: self.sim.player.position,
            flip_x: self.sim.player.facing.sign() < 0.0,
        }
    }

    fn sync_presentation(&self, world: &mut SceneWorld) {
        if let Some(id) = self.player_entity {
            if let Some(entity) = world.find_entity_mut(id) {
                entity.transform = self.player_transform();
            }
        }
        world.camera_mut().position = self.sim.camera.position();
    }

    fn drain_notifications(&mut self) {
        for notification in self.sim.notifications.drain() {
            match notification.kind {
                NotificationKind::Warning => {
                    warn!(text = notification.text.as_str(), "notification")
                }
                kind => info!(kind = kind.as_str(), text = notification.text.as_str(), "notification"),
            }
            self.latest_notification = Some(notification);
        }
    }

    fn status_line(&self) -> String {
        let npcs = &self.sim.npcs;
        match self.sim.dialogue.state() {
            InteractionState::InDialogue { npc, .. } => {
                let name = npcs.get(npc).map_or("", |npc| npc.name.as_str());
                let line = self.sim.dialogue.current_line(npcs).unwrap_or_default();
                format!("{name}: {line}  [Space]")
            }
            InteractionState::AwaitingChoice { npc } => {
                let name = npcs.get(npc).map_or("", |npc| npc.name.as_str());
                format!("{name}: [Space] accept  [E] leave")
            }
            InteractionState::Free => match &self.latest_notification {
                Some(notification) => notification.text.clone(),
                None => self.sim.progress.story_hint().to_string(),
            },
        }
    }
}

impl Scene for ExplorationScene {
    fn load(&mut self, world: &mut SceneWorld) {
        self.rebuild_map_entities(world);
        let renderable = RenderableDesc {
            kind: RenderableKind::Sprite(PLAYER_SPRITE.to_string()),
            debug_name: "player",
            half_extents: self.sim.player.half_extents,
            tint: PLAYER_TINT,
        };
        self.player_entity = Some(world.spawn(self.player_transform(), renderable));
        world.camera_mut().position = self.sim.camera.position();
    }

    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot, world: &mut SceneWorld) {
        let window_size = input.window_size();
        if window_size != self.window_size && window_size.0 > 0 && window_size.1 > 0 {
            self.window_size = window_size;
            self.sim
                .set_viewport_half_extents(view_half_extents_world(window_size));
        }

        let report = self.sim.tick(fixed_dt_seconds, input);
        if report.movement.blocked_x || report.movement.blocked_y {
            trace!(
                blocked_x = report.movement.blocked_x,
                blocked_y = report.movement.blocked_y,
                "player_blocked"
            );
        }
        if self.mirrored_map.as_ref() != Some(&self.sim.world.active_map().id) {
            self.rebuild_map_entities(world);
        }
        if report.resolution.is_some() || report.teleport.is_some() {
            // A fresh event replaces whatever message was on screen.
            self.latest_notification = None;
        }
        self.drain_notifications();
        self.sync_presentation(world);
    }

    fn unload(&mut self, world: &mut SceneWorld) {
        world.despawn_all();
        self.map_entities.clear();
        self.player_entity = None;
        self.mirrored_map = None;
    }

    fn debug_title(&self) -> Option<String> {
        let quest = self
            .sim
            .record
            .open_quest()
            .map_or("-", |entry| entry.title.as_str());
        Some(format!(
            "Overworld | {} | bag {}/{} | badges {} | quest {} | {}",
            self.sim.world.active_map().id,
            self.sim.record.items().len(),
            INVENTORY_SLOTS,
            self.sim.record.badge_count(),
            quest,
            self.status_line()
        ))
    }
}
