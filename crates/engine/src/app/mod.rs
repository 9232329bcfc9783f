mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use input::InputAction;
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use rendering::{
    view_half_extents_world, world_to_screen, Renderer, Viewport,
    VIEW_HEIGHT_WORLD,
};
pub use scene::{
    Backdrop, Camera2D, Entity, EntityId, InputSnapshot, RenderableDesc, RenderableKind, Scene,
    SceneWorld, Transform, Vec2,
};
