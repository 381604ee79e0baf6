use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bevy::prelude::*;
use ron::de::from_reader;
use serde::Deserialize;
use thiserror::Error;

use crate::dataset::LoopBound;
use crate::scene::ShapeColor;
use crate::utilityfunctions::{ProximityThresholds, RepulsionParams};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config '{}' could not be opened", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config '{}' is not valid RON", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("invalid config value: {0}")]
    Invalid(&'static str),
}

#[derive(Resource, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SimulationConfig {
    pub dataset_path: PathBuf,
    /// Keep only the first N parsed entities; `None` loads every line.
    pub entity_limit: Option<usize>,
    pub min_expected_entities: usize,

    // viewport
    pub window_width: f32,
    pub window_height: f32,
    /// Dataset units to pixels, applied after dividing by the file's scale factor.
    pub magnification: f32,

    // avatar
    pub avatar_size: f32,
    pub avatar_speed: f32,

    // entities
    pub entity_size: f32,
    pub circle_segments: u32,

    // proximity
    pub proximity_threshold: f32,
    pub collision_distance: f32,

    // repulsion
    pub apply_repulsion: bool,
    pub safe_distance: f32,
    pub max_correction: f32,

    // playback
    pub tick_interval_ms: u64,
    pub loop_bound: LoopBound,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("assets/Paths_D.txt"),
            entity_limit: Some(10),
            min_expected_entities: 6,
            window_width: 800.0,
            window_height: 600.0,
            magnification: 3.0,
            avatar_size: 15.0,
            avatar_speed: 10.0,
            entity_size: 10.0,
            circle_segments: 64,
            proximity_threshold: 50.0,
            collision_distance: 25.0,
            apply_repulsion: true,
            safe_distance: 15.0,
            max_correction: 0.5,
            tick_interval_ms: 100,
            loop_bound: LoopBound::Longest,
        }
    }
}

impl SimulationConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = from_reader(file).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let sizes = [
            self.window_width,
            self.window_height,
            self.magnification,
            self.avatar_size,
            self.avatar_speed,
            self.entity_size,
            self.proximity_threshold,
            self.collision_distance,
            self.safe_distance,
        ];
        if sizes.iter().any(|v| !v.is_finite() || *v <= 0.0) || !self.max_correction.is_finite() {
            return Err(ConfigError::Invalid("sizes, speeds and distances must be finite and positive"));
        }
        if self.window_width <= self.avatar_size || self.window_height <= self.avatar_size {
            return Err(ConfigError::Invalid("window must be larger than the avatar"));
        }
        if self.safe_distance <= 0.0 || self.max_correction < 0.0 {
            return Err(ConfigError::Invalid("repulsion distances must be positive"));
        }
        if self.collision_distance > self.proximity_threshold {
            return Err(ConfigError::Invalid("collision_distance exceeds proximity_threshold"));
        }
        if self.circle_segments < 3 {
            return Err(ConfigError::Invalid("circle_segments must be at least 3"));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid("tick_interval_ms must be non-zero"));
        }
        Ok(())
    }

    pub fn viewport(&self) -> Vec2 {
        Vec2::new(self.window_width, self.window_height)
    }

    pub fn thresholds(&self) -> ProximityThresholds {
        ProximityThresholds {
            collision: self.collision_distance,
            alert: self.proximity_threshold,
        }
    }

    pub fn repulsion(&self) -> RepulsionParams {
        RepulsionParams {
            safe_distance: self.safe_distance,
            max_correction: self.max_correction,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Current playback frame, wrapping at `bound`.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameCursor {
    index: usize,
    bound: usize,
}

impl FrameCursor {
    pub fn new(bound: usize) -> Self {
        Self { index: 0, bound }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn bound(&self) -> usize {
        self.bound
    }

    pub fn tick(&mut self) -> usize {
        self.index += 1;
        if self.index >= self.bound {
            self.index = 0;
        }
        self.index
    }
}

#[derive(Resource)]
pub struct AnimationClock(pub Timer);

impl AnimationClock {
    pub fn new(period: Duration) -> Self {
        Self(Timer::new(period, TimerMode::Repeating))
    }
}

/// Meshes and materials reused across redraws, keyed by what varies.
#[derive(Resource, Default)]
pub struct ShapeCache {
    circles: HashMap<u32, Handle<Mesh>>,
    materials: HashMap<ShapeColor, Handle<ColorMaterial>>,
}

impl ShapeCache {
    /// Unit-radius circle tessellated into `segments` sides.
    pub fn circle(&mut self, meshes: &mut Assets<Mesh>, segments: u32) -> Handle<Mesh> {
        self.circles
            .entry(segments)
            .or_insert_with(|| meshes.add(Circle::new(1.0).mesh().resolution(segments).build()))
            .clone()
    }

    pub fn material(&mut self, materials: &mut Assets<ColorMaterial>, color: ShapeColor) -> Handle<ColorMaterial> {
        self.materials
            .entry(color)
            .or_insert_with(|| materials.add(ColorMaterial::from(color.color())))
            .clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
    Left,
    Right,
}

/// User-controlled square, kept inside the viewport.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct Avatar {
    pub position: Vec2,
    speed: f32,
    min: Vec2,
    max: Vec2,
}

impl Avatar {
    pub fn centered(viewport: Vec2, size: f32, speed: f32) -> Self {
        let half = Vec2::splat(size / 2.0);
        Self {
            position: viewport / 2.0,
            speed,
            min: half,
            max: viewport - half,
        }
    }

    pub fn step(&mut self, direction: MoveDirection) {
        let delta = match direction {
            MoveDirection::Up => Vec2::Y,
            MoveDirection::Down => Vec2::NEG_Y,
            MoveDirection::Left => Vec2::NEG_X,
            MoveDirection::Right => Vec2::X,
        };
        self.position = (self.position + delta * self.speed).clamp(self.min, self.max);
    }
}
