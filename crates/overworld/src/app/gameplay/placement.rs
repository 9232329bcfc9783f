use engine::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use super::collision::{collides, Aabb};
use super::world::{MapId, World, WorldError};

pub(crate) const MIN_SEPARATION: f32 = 3.0;
pub(crate) const MAX_ATTEMPTS_PER_OBJECT: usize = 5;
/// Decorations never land this close to a map's reserved points.
pub(crate) const RESERVED_CLEARANCE: f32 = 2.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DecorationKind {
    Tree,
    Rock,
    Bush,
}

impl DecorationKind {
    pub(crate) fn visual_half_extents(self) -> Vec2 {
        match self {
            DecorationKind::Tree => Vec2::new(1.0, 1.5),
            DecorationKind::Rock => Vec2::new(0.6, 0.5),
            DecorationKind::Bush => Vec2::new(0.7, 0.5),
        }
    }

    /// Collision footprint at the foot of the visual, narrower than the visual.
    pub(crate) fn base_half_extents(self) -> Vec2 {
        match self {
            DecorationKind::Tree => Vec2::new(0.4, 0.3),
            DecorationKind::Rock => Vec2::new(0.5, 0.3),
            DecorationKind::Bush => Vec2::new(0.5, 0.25),
        }
    }

    pub(crate) fn sprite_key(self) -> &'static str {
        match self {
            DecorationKind::Tree => "decor/tree",
            DecorationKind::Rock => "decor/rock",
            DecorationKind::Bush => "decor/bush",
        }
    }

    pub(crate) fn tint(self) -> [u8; 4] {
        match self {
            DecorationKind::Tree => [34, 110, 48, 255],
            DecorationKind::Rock => [120, 120, 128, 255],
            DecorationKind::Bush => [70, 140, 60, 255],
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            DecorationKind::Tree => "tree",
            DecorationKind::Rock => "rock",
            DecorationKind::Bush => "bush",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Decoration {
    pub(crate) position: Vec2,
    pub(crate) kind: DecorationKind,
}

impl Decoration {
    pub(crate) fn base(&self) -> Aabb {
        let visual = self.kind.visual_half_extents();
        let base = self.kind.base_half_extents();
        let center = Vec2::new(self.position.x, self.position.y - visual.y + base.y);
        Aabb::new(center, base)
    }
}

/// Rectangular scatter area. Corners are normalised so `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Zone {
    min: Vec2,
    max: Vec2,
}

impl Zone {
    pub(crate) fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: Vec2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Vec2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Corners and span are both finite, so sampling cannot overflow.
    fn is_sampleable(&self) -> bool {
        let span = self.max - self.min;
        self.min.is_finite() && self.max.is_finite() && span.is_finite()
    }
}

/// Seeded rejection sampler for map decorations.
pub(crate) struct PlacementGenerator {
    rng: StdRng,
    min_separation: f32,
}

impl PlacementGenerator {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            min_separation: MIN_SEPARATION,
        }
    }

    pub(crate) fn with_min_separation(mut self, min_separation: f32) -> Self {
        self.min_separation = min_separation.max(0.0);
        self
    }

    /// Places up to `count` decorations of `kind` inside `zone` on `map` and
    /// returns how many landed. Separation is checked against everything
    /// previously placed on the same map, across calls. Gives up after
    /// `count * MAX_ATTEMPTS_PER_OBJECT` draws; under-fill is not an error.
    pub(crate) fn place(
        &mut self,
        world: &mut World,
        map_id: &MapId,
        zone: Zone,
        count: usize,
        kind: DecorationKind,
    ) -> Result<usize, WorldError> {
        if world.map(map_id).is_none() {
            return Err(WorldError::UnknownMap(map_id.clone()));
        }
        if !zone.is_sampleable() {
            warn!(map = %map_id, kind = kind.as_str(), "placement_zone_not_finite");
            return Ok(0);
        }

        let max_attempts = count.saturating_mul(MAX_ATTEMPTS_PER_OBJECT);
        let mut placed = 0usize;
        let mut attempts = 0usize;

        while placed < count && attempts < max_attempts {
            attempts += 1;
            let candidate = Decoration {
                position: Vec2::new(
                    self.rng.gen_range(zone.min.x..=zone.max.x),
                    self.rng.gen_range(zone.min.y..=zone.max.y),
                ),
                kind,
            };

            if !self.accepts(world, map_id, &candidate) {
                continue;
            }
            world.add_decoration(map_id, candidate)?;
            placed += 1;
        }

        debug!(
            map = %map_id,
            kind = kind.as_str(),
            requested = count,
            placed,
            attempts,
            "decorations_placed"
        );
        Ok(placed)
    }

    fn accepts(&self, world: &World, map_id: &MapId, candidate: &Decoration) -> bool {
        let Some(map) = world.map(map_id) else {
            return false;
        };
        let min_separation_sq = self.min_separation * self.min_separation;
        let too_close = map
            .decorations()
            .iter()
            .any(|other| other.position.distance_sq(candidate.position) < min_separation_sq);
        let crowds_reserved = map
            .reserved_points
            .iter()
            .any(|point| point.distance(candidate.position) < RESERVED_CLEARANCE);
        !too_close
            && !crowds_reserved
            && world
                .obstacles_of(map_id)
                .is_some_and(|obstacles| !collides(&candidate.base(), obstacles))
    }
}
