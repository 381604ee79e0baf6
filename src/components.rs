use bevy::prelude::*;

// --- TAGS ---

/// Shape spawned for a single redraw; despawned before the next one.
#[derive(Component)]
pub struct FrameShape;
