use engine::Vec2;

use super::gameplay::camera::DEFAULT_FOLLOW_GAIN;
use super::gameplay::dialogue::DEFAULT_INTERACTION_RADIUS;
use super::gameplay::placement::{DecorationKind, Zone, MIN_SEPARATION};
use super::gameplay::world::MapId;

pub(crate) const DEFAULT_START_MAP: &str = "exterior";
pub(crate) const DEFAULT_SEED: u64 = 0x0b5e_55ed;
pub(crate) const DEFAULT_PLAYER_SPEED: f32 = 6.0;
pub(crate) const DEFAULT_TELEPORTER_RADIUS: f32 = 1.0;

/// One batch of decorations scattered at startup.
#[derive(Debug, Clone)]
pub(crate) struct ScatterJob {
    pub(crate) map: MapId,
    pub(crate) zone: Zone,
    pub(crate) count: usize,
    pub(crate) kind: DecorationKind,
}

impl ScatterJob {
    fn new(map: &str, min: (f32, f32), max: (f32, f32), count: usize, kind: DecorationKind) -> Self {
        Self {
            map: MapId::new(map),
            zone: Zone::new(Vec2::new(min.0, min.1), Vec2::new(max.0, max.1)),
            count,
            kind,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct GameConfig {
    pub(crate) start_map: MapId,
    pub(crate) seed: u64,
    pub(crate) player_speed: f32,
    pub(crate) camera_gain: f32,
    pub(crate) teleporter_radius: f32,
    pub(crate) interaction_radius: f32,
    pub(crate) decoration_spacing: f32,
    pub(crate) scatter_jobs: Vec<ScatterJob>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            start_map: MapId::new(DEFAULT_START_MAP),
            seed: DEFAULT_SEED,
            player_speed: DEFAULT_PLAYER_SPEED,
            camera_gain: DEFAULT_FOLLOW_GAIN,
            teleporter_radius: DEFAULT_TELEPORTER_RADIUS,
            interaction_radius: DEFAULT_INTERACTION_RADIUS,
            decoration_spacing: MIN_SEPARATION,
            scatter_jobs: vec![
                ScatterJob::new("exterior", (20.0, 20.0), (72.0, 54.0), 28, DecorationKind::Tree),
                ScatterJob::new("exterior", (-72.0, -54.0), (-20.0, -12.0), 22, DecorationKind::Tree),
                ScatterJob::new("exterior", (-40.0, -50.0), (40.0, -16.0), 14, DecorationKind::Bush),
                ScatterJob::new("exterior", (-60.0, 10.0), (0.0, 30.0), 10, DecorationKind::Rock),
                ScatterJob::new("cave", (-17.0, -4.0), (17.0, 12.0), 8, DecorationKind::Rock),
            ],
        }
    }
}
