use anyhow::Context;
use bevy::prelude::*;
use bevy::window::WindowResolution;

mod components;
mod dataset;
mod resources;
mod scene;
mod systems;
mod utilityfunctions;

use resources::{AnimationClock, Avatar, FrameCursor, ShapeCache, SimulationConfig};
use systems::*;

fn main() -> anyhow::Result<()> {
    // 1. Load the config and dataset from disk; either failing ends the run
    let config_path = "assets/simulation.ron";
    let config = SimulationConfig::load(config_path).context("failed to load simulation config")?;
    let dataset = dataset::load(&config.dataset_path, config.entity_limit).context("failed to load dataset")?;

    let cursor = FrameCursor::new(dataset.loop_bound(config.loop_bound));
    let avatar = Avatar::centered(config.viewport(), config.avatar_size, config.avatar_speed);
    let window = Window {
        title: "Proximity Replay".into(),
        resolution: WindowResolution::new(config.window_width, config.window_height),
        resizable: false,
        ..default()
    };

    let exit = App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(window),
            ..default()
        }))
        .insert_resource(ClearColor(Color::BLACK))
        .insert_resource(AnimationClock::new(config.tick_interval()))
        .insert_resource(cursor)
        .insert_resource(avatar)
        .insert_resource(dataset)
        .insert_resource(config)
        .init_resource::<ShapeCache>()
        .add_systems(Startup, setup_scene)
        .add_systems(Update, (advance_frame, steer_avatar, draw_scene).chain())
        .run();

    if let AppExit::Error(code) = exit {
        anyhow::bail!("application exited with code {code}");
    }
    Ok(())
}
