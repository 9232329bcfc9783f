use crate::app::{Camera2D, Vec2};

/// World units visible vertically; horizontal span follows the aspect ratio.
pub const VIEW_HEIGHT_WORLD: f32 = 24.0;

#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn pixels_per_world(self) -> f32 {
        self.height.max(1) as f32 / VIEW_HEIGHT_WORLD
    }
}

/// Half the visible world area for a surface of the given size.
pub fn view_half_extents_world(window_size: (u32, u32)) -> Vec2 {
    let (width, height) = window_size;
    let half_height = VIEW_HEIGHT_WORLD * 0.5;
    if width == 0 || height == 0 {
        return Vec2::new(half_height, half_height);
    }
    let aspect = width as f32 / height as f32;
    Vec2::new(half_height * aspect, half_height)
}

pub fn world_to_screen(
    world: Vec2,
    camera: &Camera2D,
    viewport: Viewport,
    pixels_per_world: f32,
) -> (i32, i32) {
    let x = (world.x - camera.position.x) * pixels_per_world + viewport.width as f32 * 0.5;
    let y = viewport.height as f32 * 0.5 - (world.y - camera.position.y) * pixels_per_world;
    (x.round() as i32, y.round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_maps_to_viewport_center() {
        let viewport = Viewport {
            width: 800,
            height: 600,
        };
        let camera = Camera2D::default();
        let (x, y) = world_to_screen(Vec2::ZERO, &camera, viewport, 32.0);
        assert_eq!(x, 400);
        assert_eq!(y, 300);
    }

    #[test]
    fn camera_offset_shifts_screen_position() {
        let viewport = Viewport {
            width: 800,
            height: 600,
        };
        let camera = Camera2D {
            position: Vec2::new(10.0, -5.0),
        };
        let (x, y) = world_to_screen(Vec2::new(12.0, -4.0), &camera, viewport, 10.0);
        assert_eq!(x, 420);
        assert_eq!(y, 290);
    }

    #[test]
    fn view_half_extents_follow_aspect_ratio() {
        let half = view_half_extents_world((1600, 800));
        assert!((half.y - VIEW_HEIGHT_WORLD * 0.5).abs() < 0.0001);
        assert!((half.x - VIEW_HEIGHT_WORLD).abs() < 0.0001);
    }

    #[test]
    fn zero_sized_surface_falls_back_to_square_view() {
        let half = view_half_extents_world((0, 0));
        assert_eq!(half.x, half.y);
    }

    #[test]
    fn pixels_per_world_spans_view_height() {
        let viewport = Viewport {
            width: 1280,
            height: 720,
        };
        assert!((viewport.pixels_per_world() * VIEW_HEIGHT_WORLD - 720.0).abs() < 0.001);
    }
}
