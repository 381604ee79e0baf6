use bevy::prelude::*;

use crate::dataset::ScaleFactor;

/// Distance tier of an entity relative to the avatar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProximityTier {
    Safe,
    Alert,
    Collision,
}

/// Inclusive upper bounds for the two inner tiers.
#[derive(Debug, Clone, Copy)]
pub struct ProximityThresholds {
    pub collision: f32,
    pub alert: f32,
}

impl ProximityTier {
    pub fn classify(distance: f32, thresholds: ProximityThresholds) -> Self {
        if distance <= thresholds.collision {
            ProximityTier::Collision
        } else if distance <= thresholds.alert {
            ProximityTier::Alert
        } else {
            ProximityTier::Safe
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RepulsionParams {
    pub safe_distance: f32,
    pub max_correction: f32,
}

/// Converts a raw dataset coordinate into display space (origin bottom-left).
pub fn map_to_display(x_world: i32, y_world: i32, scale: ScaleFactor, magnification: f32, viewport: Vec2) -> Vec2 {
    let world = Vec2::new(x_world as f32, y_world as f32);
    world / scale.get() * magnification + viewport / 2.0
}

/// Display space has its origin in the bottom-left corner, the 2D camera looks at the centre.
pub fn display_to_world(position: Vec2, viewport: Vec2, depth: f32) -> Vec3 {
    (position - viewport / 2.0).extend(depth)
}

/// Per-frame positional nudge away from every neighbor closer than `safe_distance`.
/// The caller must leave the point's own position out of `neighbors`.
pub fn repel<I>(point: Vec2, neighbors: I, params: RepulsionParams) -> Vec2
where
    I: IntoIterator<Item = Vec2>,
{
    let mut force = Vec2::ZERO;

    for neighbor in neighbors {
        let offset = point - neighbor;
        let distance = offset.length();

        // Coincident points have no direction to push along
        if distance <= 0.0 || distance >= params.safe_distance {
            continue;
        }

        let strength = (params.safe_distance - distance) / params.safe_distance;
        force += offset / distance * strength;
    }

    force.clamp(Vec2::splat(-params.max_correction), Vec2::splat(params.max_correction))
}
