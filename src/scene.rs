//! Per-frame scene composition.
//!
//! `compose_frame` turns the dataset, the avatar and the current frame index
//! into a flat list of draw commands. Rendering happens elsewhere through the
//! `Canvas` trait so the composition stays a pure function.

use bevy::prelude::*;

use crate::dataset::Dataset;
use crate::resources::SimulationConfig;
use crate::utilityfunctions::{map_to_display, repel, ProximityTier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeColor {
    Blue,
    Red,
    Yellow,
    Green,
}

impl ShapeColor {
    pub fn color(self) -> Color {
        match self {
            ShapeColor::Blue => Color::srgb(0.0, 0.0, 1.0),
            ShapeColor::Red => Color::srgb(1.0, 0.0, 0.0),
            ShapeColor::Yellow => Color::srgb(1.0, 1.0, 0.0),
            ShapeColor::Green => Color::srgb(0.0, 1.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Square { size: f32 },
    Circle { radius: f32, segments: u32 },
}

/// One shape at a display-space position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub shape: Shape,
    pub color: ShapeColor,
    pub position: Vec2,
}

/// Immediate-mode drawing surface in display space.
pub trait Canvas {
    fn set_color(&mut self, color: ShapeColor);
    fn draw_square(&mut self, position: Vec2, size: f32);
    fn draw_circle(&mut self, position: Vec2, radius: f32, segments: u32);
}

pub fn paint(commands: &[DrawCommand], canvas: &mut impl Canvas) {
    for command in commands {
        canvas.set_color(command.color);
        match command.shape {
            Shape::Square { size } => canvas.draw_square(command.position, size),
            Shape::Circle { radius, segments } => canvas.draw_circle(command.position, radius, segments),
        }
    }
}

fn entity_command(tier: ProximityTier, position: Vec2, config: &SimulationConfig) -> DrawCommand {
    let (shape, color) = match tier {
        ProximityTier::Collision => (
            Shape::Circle {
                radius: config.entity_size,
                segments: config.circle_segments,
            },
            ShapeColor::Red,
        ),
        ProximityTier::Alert => (Shape::Square { size: config.entity_size }, ShapeColor::Yellow),
        ProximityTier::Safe => (Shape::Square { size: config.entity_size }, ShapeColor::Green),
    };
    DrawCommand { shape, color, position }
}

/// Builds the draw list for `frame`: the avatar first, then every entity that
/// has a sample at that frame.
pub fn compose_frame(dataset: &Dataset, avatar: Vec2, frame: usize, config: &SimulationConfig) -> Vec<DrawCommand> {
    let viewport = config.viewport();

    // Slot 0 is the avatar, entity positions follow
    let mut positions = vec![avatar];
    positions.extend(dataset.entities.iter().filter_map(|entity| {
        entity
            .sample(frame)
            .map(|s| map_to_display(s.x, s.y, dataset.scale, config.magnification, viewport))
    }));

    let mut commands = Vec::with_capacity(positions.len());
    commands.push(DrawCommand {
        shape: Shape::Square { size: config.avatar_size },
        color: ShapeColor::Blue,
        position: avatar,
    });

    for (slot, &position) in positions.iter().enumerate().skip(1) {
        let draw_position = if config.apply_repulsion {
            let neighbors = positions
                .iter()
                .enumerate()
                .filter(|&(other, _)| other != slot)
                .map(|(_, &p)| p);
            position + repel(position, neighbors, config.repulsion())
        } else {
            position
        };

        let tier = ProximityTier::classify(draw_position.distance(avatar), config.thresholds());
        commands.push(entity_command(tier, draw_position, config));
    }

    commands
}
