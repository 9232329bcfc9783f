use engine::{InputAction, InputSnapshot, Vec2};
use tracing::{info, warn};

use super::camera::CameraController;
use super::collision::{movement_intent, resolve_movement, ControlledEntity, MoveOutcome};
use super::dialogue::{DialogueChoice, DialogueSession, InteractionState, Npc};
use super::notifications::Notifications;
use super::player_record::Inventory;
use super::quest::{resolve_acceptance, QuestProgress, Resolution, ResolutionContext};
use super::world::{TeleportEvent, World};

/// What happened during one tick, for logging and tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct TickReport {
    pub(crate) movement: MoveOutcome,
    pub(crate) teleport: Option<TeleportEvent>,
    pub(crate) resolution: Option<Resolution>,
}

/// NPCs only exist on maps flagged for them.
pub(crate) fn npcs_on_active_map<'a>(world: &World, npcs: &'a [Npc]) -> &'a [Npc] {
    if world.active_map().has_npcs {
        npcs
    } else {
        &[]
    }
}

/// All session state, owned in one place and advanced one tick at a time.
#[derive(Debug)]
pub(crate) struct SimulationContext {
    pub(crate) world: World,
    pub(crate) player: ControlledEntity,
    pub(crate) camera: CameraController,
    pub(crate) npcs: Vec<Npc>,
    pub(crate) dialogue: DialogueSession,
    pub(crate) progress: QuestProgress,
    pub(crate) record: Inventory,
    pub(crate) notifications: Notifications,
}

impl SimulationContext {
    pub(crate) fn new(
        world: World,
        player: ControlledEntity,
        mut camera: CameraController,
        npcs: Vec<Npc>,
        dialogue: DialogueSession,
    ) -> Self {
        camera.snap_to(player.position, world.active_map().half_extents);
        Self {
            world,
            player,
            camera,
            npcs,
            dialogue,
            progress: QuestProgress::default(),
            record: Inventory::default(),
            notifications: Notifications::default(),
        }
    }

    pub(crate) fn visible_npcs(&self) -> &[Npc] {
        npcs_on_active_map(&self.world, &self.npcs)
    }

    pub(crate) fn set_viewport_half_extents(&mut self, half_extents: Vec2) {
        let map_half_extents = self.world.active_map().half_extents;
        self.camera
            .set_viewport_half_extents(half_extents, map_half_extents);
    }

    /// Input, movement, teleport, camera, interaction; in that order.
    pub(crate) fn tick(&mut self, dt_seconds: f32, input: &InputSnapshot) -> TickReport {
        let mut report = TickReport::default();

        if !self.dialogue.is_paused() {
            let intent = movement_intent(
                input.is_down(InputAction::MoveUp),
                input.is_down(InputAction::MoveDown),
                input.is_down(InputAction::MoveLeft),
                input.is_down(InputAction::MoveRight),
            );
            if intent != Vec2::ZERO {
                report.movement = resolve_movement(
                    &mut self.player,
                    intent,
                    dt_seconds,
                    self.world.active_map().obstacles(),
                );
            }
        }

        match self.world.check_teleporters(&mut self.player) {
            Ok(Some(event)) => {
                self.camera
                    .snap_to(event.position, self.world.active_map().half_extents);
                info!(
                    from = %event.from,
                    to = %event.to,
                    x = event.position.x,
                    y = event.position.y,
                    "teleported"
                );
                report.teleport = Some(event);
            }
            Ok(None) => {}
            Err(error) => warn!(error = %error, "teleport_failed"),
        }

        self.camera.follow(
            self.player.position,
            dt_seconds,
            self.world.active_map().half_extents,
        );

        report.resolution = self.step_interaction(input);
        report
    }

    fn step_interaction(&mut self, input: &InputSnapshot) -> Option<Resolution> {
        match self.dialogue.state() {
            InteractionState::Free => {
                if input.interact_pressed() {
                    let npcs = npcs_on_active_map(&self.world, &self.npcs);
                    self.dialogue.try_open(npcs, self.player.position);
                }
                None
            }
            InteractionState::InDialogue { .. } => {
                if input.confirm_pressed() {
                    self.dialogue.advance(&self.npcs);
                }
                None
            }
            InteractionState::AwaitingChoice { .. } => {
                if input.confirm_pressed() {
                    self.choose(DialogueChoice::Accept)
                } else if input.interact_pressed() {
                    self.choose(DialogueChoice::Close)
                } else {
                    None
                }
            }
        }
    }

    /// Resolves the pending choice. Returns the rule outcome on `Accept`.
    pub(crate) fn choose(&mut self, choice: DialogueChoice) -> Option<Resolution> {
        let npc_index = self.dialogue.choose(choice)?;
        if choice == DialogueChoice::Close {
            return None;
        }
        let role = self.npcs.get(npc_index)?.role;
        let mut ctx = ResolutionContext {
            progress: &mut self.progress,
            record: &mut self.record,
            notifications: &mut self.notifications,
        };
        Some(resolve_acceptance(role, &mut ctx))
    }
}
