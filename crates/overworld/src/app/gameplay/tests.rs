use std::path::PathBuf;

use engine::{view_half_extents_world, InputAction, InputSnapshot, Scene, SceneWorld, Vec2};

use super::dialogue::{DialogueChoice, InteractionState};
use super::player_record::PlayerRecord;
use super::quest::{QuestStatus, Resolution, STORY_HINTS};
use super::simulation::{npcs_on_active_map, SimulationContext, TickReport};
use super::world::MapId;
use super::*;
use crate::app::config::GameConfig;
use crate::app::content::{load_world_content, WORLD_FILE_NAME};

const DT: f32 = 1.0 / 60.0;

fn shipped_world_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../assets/base")
        .join(WORLD_FILE_NAME)
}

fn simulation_with(config: GameConfig) -> SimulationContext {
    let content =
        load_world_content(&shipped_world_path(), config.teleporter_radius).expect("content");
    build_simulation(content, &config, view_half_extents_world((1280, 720))).expect("simulation")
}

/// Shipped maps without scattered decorations, so positions are predictable.
fn bare_simulation() -> SimulationContext {
    simulation_with(GameConfig {
        scatter_jobs: Vec::new(),
        ..GameConfig::default()
    })
}

fn snapshot_from_actions(actions: &[InputAction]) -> InputSnapshot {
    let mut snapshot = InputSnapshot::empty();
    for action in actions {
        snapshot = snapshot.with_action_down(*action, true);
    }
    snapshot
}

fn interact() -> InputSnapshot {
    InputSnapshot::empty().with_interact_pressed(true)
}

fn confirm() -> InputSnapshot {
    InputSnapshot::empty().with_confirm_pressed(true)
}

fn npc_position(sim: &SimulationContext, name: &str) -> Vec2 {
    sim.npcs
        .iter()
        .find(|npc| npc.name == name)
        .map(|npc| npc.position)
        .expect("npc exists")
}

/// Walks through every line of `name`'s dialogue and accepts the offer.
fn accept_offer_from(sim: &mut SimulationContext, name: &str) -> Option<Resolution> {
    sim.player.position = npc_position(sim, name);
    sim.tick(DT, &interact());
    assert!(matches!(
        sim.dialogue.state(),
        InteractionState::InDialogue { line: 0, .. }
    ));
    while matches!(sim.dialogue.state(), InteractionState::InDialogue { .. }) {
        sim.tick(DT, &confirm());
    }
    assert!(matches!(
        sim.dialogue.state(),
        InteractionState::AwaitingChoice { .. }
    ));
    sim.tick(DT, &confirm()).resolution
}

fn tick_until_teleport(sim: &mut SimulationContext, input: &InputSnapshot) -> TickReport {
    for _ in 0..120 {
        let report = sim.tick(DT, input);
        if report.teleport.is_some() {
            return report;
        }
    }
    panic!("no teleport within 120 ticks");
}

#[test]
fn session_starts_on_exterior_spawn() {
    let sim = bare_simulation();
    assert_eq!(sim.world.active_map().id, MapId::new("exterior"));
    assert_eq!(sim.player.position, Vec2::new(-31.0, 47.0));
    assert_eq!(sim.progress.story_step(), 0);
}

#[test]
fn walking_into_exterior_teleporter_lands_in_cave() {
    let mut sim = bare_simulation();
    sim.player.position = Vec2::new(-73.0, 0.0);

    let report = tick_until_teleport(&mut sim, &snapshot_from_actions(&[InputAction::MoveLeft]));
    let event = report.teleport.expect("teleport");
    assert_eq!(event.from, MapId::new("exterior"));
    assert_eq!(event.to, MapId::new("cave"));
    assert_eq!(sim.world.active_map().id, MapId::new("cave"));
    assert_eq!(sim.player.position, Vec2::new(0.0, -8.0));
}

#[test]
fn teleport_snaps_camera_and_pins_narrow_axis() {
    let mut sim = bare_simulation();
    sim.player.position = Vec2::new(-74.5, 0.0);
    sim.tick(DT, &InputSnapshot::empty());

    assert_eq!(sim.world.active_map().id, MapId::new("cave"));
    // Cave is 40 wide, narrower than the 16:9 view; 30 tall leaves 3 units of play.
    assert_eq!(sim.camera.position().x, 0.0);
    assert!((sim.camera.position().y + 3.0).abs() < 0.0001);
}

#[test]
fn one_teleport_per_tick_and_arrival_does_not_bounce() {
    let mut sim = bare_simulation();
    sim.player.position = Vec2::new(-75.0, 0.0);
    let first = sim.tick(DT, &InputSnapshot::empty());
    assert!(first.teleport.is_some());

    let second = sim.tick(DT, &InputSnapshot::empty());
    assert!(second.teleport.is_none());
    assert_eq!(sim.world.active_map().id, MapId::new("cave"));
}

#[test]
fn cave_teleporter_returns_to_exterior() {
    let mut sim = bare_simulation();
    sim.player.position = Vec2::new(-75.0, 0.0);
    sim.tick(DT, &InputSnapshot::empty());

    let report = tick_until_teleport(&mut sim, &snapshot_from_actions(&[InputAction::MoveDown]));
    assert_eq!(report.teleport.expect("teleport").to, MapId::new("exterior"));
    assert_eq!(sim.player.position, Vec2::new(-72.0, 0.0));
}

#[test]
fn map_switches_keep_scattered_decorations() {
    let mut sim = simulation_with(GameConfig::default());
    let exterior = MapId::new("exterior");
    let before = sim.world.map(&exterior).expect("exterior").decorations().to_vec();
    assert!(!before.is_empty());

    sim.player.position = Vec2::new(-75.0, 0.0);
    sim.tick(DT, &InputSnapshot::empty());
    sim.player.position = Vec2::new(0.0, -13.0);
    sim.tick(DT, &InputSnapshot::empty());

    assert_eq!(sim.world.active_map().id, exterior);
    assert_eq!(sim.world.active_map().decorations(), before.as_slice());
}

#[test]
fn shipped_scatter_keeps_separation_and_spawn_clear() {
    let sim = simulation_with(GameConfig::default());
    for map in sim.world.maps() {
        let decorations = map.decorations();
        for (index, a) in decorations.iter().enumerate() {
            for b in &decorations[index + 1..] {
                assert!(a.position.distance(b.position) >= placement::MIN_SEPARATION);
            }
            assert!(a.position.distance(map.spawn) >= placement::RESERVED_CLEARANCE);
        }
    }
}

#[test]
fn same_seed_scatters_identically() {
    let a = simulation_with(GameConfig::default());
    let b = simulation_with(GameConfig::default());
    assert_eq!(
        a.world.active_map().decorations(),
        b.world.active_map().decorations()
    );
}

#[test]
fn walls_stop_the_player() {
    let mut sim = bare_simulation();
    let input = snapshot_from_actions(&[InputAction::MoveUp]);
    for _ in 0..600 {
        sim.tick(DT, &input);
    }
    // Top wall's lower edge sits at y = 59.
    assert!(sim.player.position.y <= 58.5);
    assert!(sim.player.position.y > 58.0);
}

#[test]
fn renard_without_map_leaves_compass_untouched() {
    let mut sim = bare_simulation();
    let resolution = accept_offer_from(&mut sim, "Renard");

    assert_eq!(resolution, Some(Resolution::Rejected));
    assert_eq!(sim.progress.status("compass"), QuestStatus::NotStarted);
    assert!(sim.record.items().is_empty());
    assert_eq!(sim.dialogue.state(), InteractionState::Free);
}

#[test]
fn renard_with_map_completes_compass_in_one_resolution() {
    let mut sim = bare_simulation();
    assert_eq!(accept_offer_from(&mut sim, "Hibou"), Some(Resolution::Applied));
    assert!(sim.record.has_item("Map"));

    assert_eq!(accept_offer_from(&mut sim, "Renard"), Some(Resolution::Applied));
    assert!(!sim.record.has_item("Map"));
    assert!(sim.record.has_item("Compass"));
    assert_eq!(sim.progress.status("compass"), QuestStatus::Complete);
    assert_eq!(sim.progress.status("map"), QuestStatus::Complete);
}

#[test]
fn full_story_reaches_last_hint() {
    let mut sim = bare_simulation();
    accept_offer_from(&mut sim, "Hibou");
    accept_offer_from(&mut sim, "Renard");
    assert_eq!(accept_offer_from(&mut sim, "Blaireau"), Some(Resolution::Applied));

    assert_eq!(sim.progress.story_step(), 3);
    assert_eq!(sim.progress.status("cave"), QuestStatus::Complete);
    assert_eq!(sim.progress.story_hint(), STORY_HINTS[3]);
    assert!(sim.record.has_badge("compass"));
    assert!(sim.record.has_badge("explorer"));
}

#[test]
fn opening_interact_is_not_reused_as_a_choice() {
    let mut sim = bare_simulation();
    sim.player.position = npc_position(&sim, "Mulot");

    let both = InputSnapshot::empty()
        .with_interact_pressed(true)
        .with_confirm_pressed(true);
    sim.tick(DT, &both);
    assert!(matches!(
        sim.dialogue.state(),
        InteractionState::InDialogue { line: 0, .. }
    ));

    sim.tick(DT, &interact());
    assert!(matches!(
        sim.dialogue.state(),
        InteractionState::InDialogue { line: 0, .. }
    ));

    sim.tick(DT, &confirm());
    assert!(matches!(
        sim.dialogue.state(),
        InteractionState::AwaitingChoice { .. }
    ));
    let report = sim.tick(DT, &interact());
    assert_eq!(report.resolution, None);
    assert_eq!(sim.dialogue.state(), InteractionState::Free);
}

#[test]
fn movement_is_paused_during_dialogue() {
    let mut sim = bare_simulation();
    let start = npc_position(&sim, "Mulot");
    sim.player.position = start;
    sim.tick(DT, &interact());

    let held = snapshot_from_actions(&[InputAction::MoveRight]);
    for _ in 0..10 {
        sim.tick(DT, &held);
    }
    assert_eq!(sim.player.position, start);
}

#[test]
fn interact_far_from_everyone_does_nothing() {
    let mut sim = bare_simulation();
    sim.player.position = Vec2::new(60.0, 40.0);
    sim.tick(DT, &interact());
    assert_eq!(sim.dialogue.state(), InteractionState::Free);
}

#[test]
fn visible_npcs_follow_the_active_map_flag() {
    let mut sim = bare_simulation();
    assert_eq!(npcs_on_active_map(&sim.world, &sim.npcs).len(), sim.npcs.len());
    assert_eq!(sim.visible_npcs().len(), sim.npcs.len());

    sim.world.load_map(&MapId::new("cave")).expect("cave");
    assert!(npcs_on_active_map(&sim.world, &sim.npcs).is_empty());
    assert!(sim.visible_npcs().is_empty());
}

#[test]
fn npcs_are_absent_from_the_cave() {
    let mut sim = bare_simulation();
    sim.player.position = Vec2::new(-75.0, 0.0);
    sim.tick(DT, &InputSnapshot::empty());
    assert!(sim.visible_npcs().is_empty());

    // Standing where Hibou would be on the exterior does nothing underground.
    sim.player.position = Vec2::new(0.0, -8.0);
    sim.npcs[0].position = Vec2::new(0.0, -8.0);
    sim.tick(DT, &interact());
    assert_eq!(sim.dialogue.state(), InteractionState::Free);
}

#[test]
fn choose_api_closes_without_effect() {
    let mut sim = bare_simulation();
    sim.player.position = npc_position(&sim, "Hibou");
    sim.tick(DT, &interact());
    while matches!(sim.dialogue.state(), InteractionState::InDialogue { .. }) {
        sim.tick(DT, &confirm());
    }

    assert_eq!(sim.choose(DialogueChoice::Close), None);
    assert_eq!(sim.progress.status("map"), QuestStatus::NotStarted);
    assert!(sim.record.items().is_empty());
}

#[test]
fn scene_mirrors_map_and_follows_teleports() {
    let content = load_world_content(&shipped_world_path(), 1.0).expect("content");
    let config = GameConfig::default();
    let sim = build_simulation(content, &config, view_half_extents_world((1280, 720)))
        .expect("simulation");
    let exterior = sim.world.active_map();
    let expected_exterior =
        exterior.decorations().len() + exterior.teleporters.len() + sim.npcs.len() + 1;

    let mut scene = ExplorationScene::new(sim);
    let mut world = SceneWorld::default();
    scene.load(&mut world);
    world.apply_pending();
    assert_eq!(world.entity_count(), expected_exterior);
    assert_eq!(
        world.backdrop().map(|backdrop| backdrop.sprite_key.as_str()),
        Some("maps/exterior")
    );

    scene.simulation_mut().player.position = Vec2::new(-75.0, 0.0);
    scene.update(DT, &InputSnapshot::empty(), &mut world);
    world.apply_pending();

    let cave = scene.simulation().world.active_map();
    assert_eq!(cave.id, MapId::new("cave"));
    assert_eq!(
        world.entity_count(),
        cave.decorations().len() + cave.teleporters.len() + 1
    );
    assert_eq!(
        world.backdrop().map(|backdrop| backdrop.sprite_key.as_str()),
        Some("maps/cave")
    );
    assert_eq!(world.camera().position, scene.simulation().camera.position());
    let title = scene.debug_title().expect("title");
    assert!(title.contains("cave"), "{title}");
}

#[test]
fn scene_resize_updates_camera_viewport() {
    let mut scene = ExplorationScene::new(bare_simulation());
    let mut world = SceneWorld::default();
    scene.load(&mut world);
    world.apply_pending();

    scene.update(
        DT,
        &InputSnapshot::empty().with_window_size((800, 600)),
        &mut world,
    );
    let half = scene.simulation().camera.viewport_half_extents();
    assert!((half.x - 16.0).abs() < 0.0001);
    assert!((half.y - 12.0).abs() < 0.0001);
}

#[test]
fn scene_title_shows_dialogue_and_notifications() {
    let mut scene = ExplorationScene::new(bare_simulation());
    let mut world = SceneWorld::default();
    scene.load(&mut world);
    world.apply_pending();

    let renard = npc_position(scene.simulation(), "Renard");
    scene.simulation_mut().player.position = renard;
    scene.update(DT, &interact(), &mut world);
    let title = scene.debug_title().expect("title");
    assert!(title.contains("Renard: A map?"), "{title}");

    while matches!(
        scene.simulation().dialogue.state(),
        InteractionState::InDialogue { .. }
    ) {
        scene.update(DT, &confirm(), &mut world);
    }
    scene.update(DT, &confirm(), &mut world);
    let title = scene.debug_title().expect("title");
    assert!(title.contains("Renard needs a map"), "{title}");
    assert!(scene.simulation().notifications.is_empty());
}
