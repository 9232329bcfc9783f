use engine::Vec2;

pub(crate) const DEFAULT_FOLLOW_GAIN: f32 = 5.0;

/// Smooth follow toward a target, clamped so the view stays inside the map.
#[derive(Debug, Clone)]
pub(crate) struct CameraController {
    position: Vec2,
    gain: f32,
    viewport_half_extents: Vec2,
}

impl CameraController {
    pub(crate) fn new(gain: f32, viewport_half_extents: Vec2) -> Self {
        Self {
            position: Vec2::ZERO,
            gain: gain.max(0.0),
            viewport_half_extents,
        }
    }

    pub(crate) fn position(&self) -> Vec2 {
        self.position
    }

    #[cfg(test)]
    pub(crate) fn viewport_half_extents(&self) -> Vec2 {
        self.viewport_half_extents
    }

    pub(crate) fn set_viewport_half_extents(&mut self, half_extents: Vec2, map_half_extents: Vec2) {
        self.viewport_half_extents = half_extents;
        self.clamp(map_half_extents);
    }

    pub(crate) fn follow(&mut self, target: Vec2, dt_seconds: f32, map_half_extents: Vec2) {
        let factor = (self.gain * dt_seconds).clamp(0.0, 1.0);
        self.position = self.position + (target - self.position) * factor;
        self.clamp(map_half_extents);
    }

    pub(crate) fn snap_to(&mut self, position: Vec2, map_half_extents: Vec2) {
        self.position = position;
        self.clamp(map_half_extents);
    }

    fn clamp(&mut self, map_half_extents: Vec2) {
        self.position = Vec2::new(
            clamp_axis(
                self.position.x,
                map_half_extents.x,
                self.viewport_half_extents.x,
            ),
            clamp_axis(
                self.position.y,
                map_half_extents.y,
                self.viewport_half_extents.y,
            ),
        );
    }
}

/// A map narrower than the view pins the camera to the centre on that axis.
fn clamp_axis(value: f32, map_half: f32, view_half: f32) -> f32 {
    let limit = map_half - view_half;
    if limit <= 0.0 {
        0.0
    } else {
        value.clamp(-limit, limit)
    }
}
