use std::env;
use std::path::PathBuf;

use engine::{
    resolve_app_paths, view_half_extents_world, LoopConfig, Scene, StartupError,
};
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::config::GameConfig;
use super::content::{load_world_content, WorldContentError, WORLD_FILE_NAME};
use super::gameplay::world::{MapId, WorldError};
use super::gameplay::{self, ExplorationScene};

pub(crate) const SEED_ENV_VAR: &str = "OVERWORLD_SEED";
pub(crate) const START_MAP_ENV_VAR: &str = "OVERWORLD_START_MAP";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
    pub(crate) asset_root: PathBuf,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("failed to load world content: {0}")]
    Content(#[from] WorldContentError),
    #[error("failed to build world: {0}")]
    World(#[from] WorldError),
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Overworld Startup ===");

    let app_paths = resolve_app_paths()?;
    info!(
        root = %app_paths.root.display(),
        base_content_dir = %app_paths.base_content_dir.display(),
        "startup"
    );

    let game_config = apply_env_overrides(
        GameConfig::default(),
        env::var(SEED_ENV_VAR).ok().as_deref(),
        env::var(START_MAP_ENV_VAR).ok().as_deref(),
    );
    let content = load_world_content(
        &app_paths.base_content_dir.join(WORLD_FILE_NAME),
        game_config.teleporter_radius,
    )?;

    let config = LoopConfig::default();
    let viewport = view_half_extents_world((config.window_width, config.window_height));
    let simulation = gameplay::build_simulation(content, &game_config, viewport)?;

    Ok(AppWiring {
        config,
        scene: Box::new(ExplorationScene::new(simulation)),
        asset_root: app_paths.assets_dir,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

/// Invalid values are logged and ignored.
fn apply_env_overrides(
    mut config: GameConfig,
    seed: Option<&str>,
    start_map: Option<&str>,
) -> GameConfig {
    if let Some(raw) = seed {
        match raw.trim().parse::<u64>() {
            Ok(value) => config.seed = value,
            Err(_) => warn!(
                env_var = SEED_ENV_VAR,
                value = raw,
                "invalid seed env var value; falling back to default"
            ),
        }
    }
    if let Some(raw) = start_map {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            warn!(
                env_var = START_MAP_ENV_VAR,
                "empty start map env var value; falling back to default"
            );
        } else {
            config.start_map = MapId::new(trimmed);
        }
    }
    config
}
