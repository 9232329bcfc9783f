mod renderer;
mod transform;

pub use renderer::Renderer;
pub use transform::{
    view_half_extents_world, world_to_screen, Viewport, VIEW_HEIGHT_WORLD,
};
