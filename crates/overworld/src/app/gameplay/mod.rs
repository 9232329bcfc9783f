pub(crate) mod camera;
pub(crate) mod collision;
pub(crate) mod dialogue;
pub(crate) mod notifications;
pub(crate) mod placement;
pub(crate) mod player_record;
pub(crate) mod quest;
pub(crate) mod simulation;
pub(crate) mod world;

mod scene_impl;

use engine::Vec2;
use tracing::{debug, info, warn};

use super::config::GameConfig;
use super::content::WorldContent;
use camera::CameraController;
use collision::ControlledEntity;
use dialogue::DialogueSession;
use placement::PlacementGenerator;
use simulation::SimulationContext;
use world::{World, WorldError};

pub(crate) use scene_impl::ExplorationScene;

/// Builds the session: picks the start map, scatters decorations and puts
/// the player on the start map's spawn point.
pub(crate) fn build_simulation(
    content: WorldContent,
    config: &GameConfig,
    viewport_half_extents: Vec2,
) -> Result<SimulationContext, WorldError> {
    let WorldContent { maps, npcs } = content;
    let mut world = World::new(maps, &config.start_map)?;

    let mut generator =
        PlacementGenerator::new(config.seed).with_min_separation(config.decoration_spacing);
    for job in &config.scatter_jobs {
        match generator.place(&mut world, &job.map, job.zone, job.count, job.kind) {
            Ok(placed) if placed < job.count => info!(
                map = %job.map,
                kind = job.kind.as_str(),
                requested = job.count,
                placed,
                "placement_underfilled"
            ),
            Ok(_) => {}
            Err(error) => warn!(error = %error, "scatter_job_skipped"),
        }
    }

    for map in world.maps() {
        debug!(
            map = %map.id,
            obstacle_count = map.obstacles().len(),
            decoration_count = map.decorations().len(),
            "map_populated"
        );
    }

    let player = ControlledEntity::new(world.active_map().spawn, config.player_speed);
    let camera = CameraController::new(config.camera_gain, viewport_half_extents);
    info!(
        map = %world.active_map().id,
        seed = config.seed,
        x = player.position.x,
        y = player.position.y,
        "simulation_ready"
    );
    Ok(SimulationContext::new(
        world,
        player,
        camera,
        npcs,
        DialogueSession::new(config.interaction_radius),
    ))
}

#[cfg(test)]
mod tests;
