use std::f32::consts::FRAC_1_SQRT_2;

use engine::Vec2;

pub(crate) const PLAYER_HALF_EXTENT: f32 = 0.5;

/// Axis-aligned box stored as centre plus half extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Aabb {
    pub(crate) center: Vec2,
    pub(crate) half_extents: Vec2,
}

impl Aabb {
    pub(crate) const fn new(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    pub(crate) fn from_size(center: Vec2, width: f32, height: f32) -> Self {
        Self::new(center, Vec2::new(width * 0.5, height * 0.5))
    }

    /// Strict test: boxes that only share an edge do not overlap.
    pub(crate) fn overlaps(&self, other: &Aabb) -> bool {
        (self.center.x - other.center.x).abs() < self.half_extents.x + other.half_extents.x
            && (self.center.y - other.center.y).abs() < self.half_extents.y + other.half_extents.y
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Facing {
    Left,
    Right,
}

impl Facing {
    pub(crate) fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

/// The player-driven body. Moved by the resolver and by teleporters only.
#[derive(Debug, Clone)]
pub(crate) struct ControlledEntity {
    pub(crate) position: Vec2,
    pub(crate) facing: Facing,
    pub(crate) speed: f32,
    pub(crate) half_extents: Vec2,
}

impl ControlledEntity {
    pub(crate) fn new(position: Vec2, speed: f32) -> Self {
        Self {
            position,
            facing: Facing::Right,
            speed,
            half_extents: Vec2::new(PLAYER_HALF_EXTENT, PLAYER_HALF_EXTENT),
        }
    }

    pub(crate) fn bounds_at(&self, position: Vec2) -> Aabb {
        Aabb::new(position, self.half_extents)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct MoveOutcome {
    pub(crate) blocked_x: bool,
    pub(crate) blocked_y: bool,
}

/// Unit-length (or zero) intent from the four directional states.
pub(crate) fn movement_intent(up: bool, down: bool, left: bool, right: bool) -> Vec2 {
    let x = f32::from(u8::from(right)) - f32::from(u8::from(left));
    let y = f32::from(u8::from(up)) - f32::from(u8::from(down));
    if x != 0.0 && y != 0.0 {
        Vec2::new(x * FRAC_1_SQRT_2, y * FRAC_1_SQRT_2)
    } else {
        Vec2::new(x, y)
    }
}

/// Moves X first, then Y from the possibly updated X. Each axis either
/// commits its full step or keeps its old coordinate.
///
/// Displacement per tick is assumed smaller than the thinnest obstacle;
/// there is no swept test.
pub(crate) fn resolve_movement(
    entity: &mut ControlledEntity,
    intent: Vec2,
    dt_seconds: f32,
    obstacles: &[Aabb],
) -> MoveOutcome {
    if intent.x > 0.0 {
        entity.facing = Facing::Right;
    } else if intent.x < 0.0 {
        entity.facing = Facing::Left;
    }

    let step = intent * (entity.speed * dt_seconds);
    let mut outcome = MoveOutcome::default();

    if step.x != 0.0 {
        let candidate = Vec2::new(entity.position.x + step.x, entity.position.y);
        if collides(&entity.bounds_at(candidate), obstacles) {
            outcome.blocked_x = true;
        } else {
            entity.position = candidate;
        }
    }

    if step.y != 0.0 {
        let candidate = Vec2::new(entity.position.x, entity.position.y + step.y);
        if collides(&entity.bounds_at(candidate), obstacles) {
            outcome.blocked_y = true;
        } else {
            entity.position = candidate;
        }
    }
    outcome
}

pub(crate) fn collides(bounds: &Aabb, obstacles: &[Aabb]) -> bool {
    obstacles.iter().any(|obstacle| bounds.overlaps(obstacle))
}
