use bevy::input::keyboard::KeyboardInput;
use bevy::input::ButtonState;
use bevy::prelude::*;

use crate::components::*;
use crate::dataset::Dataset;
use crate::resources::*;
use crate::scene::{compose_frame, paint, Canvas, ShapeColor};
use crate::utilityfunctions::display_to_world;

/// Later shapes are drawn on top of earlier ones.
const DEPTH_STEP: f32 = 0.01;

// --- SETUP ---

pub fn setup_scene(
    mut commands: Commands,
    dataset: Res<Dataset>,
    config: Res<SimulationConfig>,
    cursor: Res<FrameCursor>,
) {
    commands.spawn(Camera2d);

    info!(
        "Loaded {} entities from {} (scale {}), looping {} frames ({:?})",
        dataset.entities.len(),
        config.dataset_path.display(),
        dataset.scale.get(),
        cursor.bound(),
        config.loop_bound
    );
    for (i, entity) in dataset.entities.iter().enumerate() {
        if let Some((first, last)) = entity.tag_range() {
            debug!("entity {i}: {} samples, recorded frames {first}..={last}", entity.len());
        }
    }

    if let Some(count) = dataset.underpopulated(config.min_expected_entities) {
        warn!(
            "Only {} entities loaded (expected at least {})",
            count, config.min_expected_entities
        );
    }
}

// --- PLAYBACK ---

pub fn advance_frame(time: Res<Time>, mut clock: ResMut<AnimationClock>, mut cursor: ResMut<FrameCursor>) {
    clock.0.tick(time.delta());
    for _ in 0..clock.0.times_finished_this_tick() {
        cursor.tick();
    }
}

// --- INPUT ---

pub fn direction_for(key: KeyCode) -> Option<MoveDirection> {
    match key {
        KeyCode::KeyW => Some(MoveDirection::Up),
        KeyCode::KeyS => Some(MoveDirection::Down),
        KeyCode::KeyA => Some(MoveDirection::Left),
        KeyCode::KeyD => Some(MoveDirection::Right),
        _ => None,
    }
}

/// Key presses, including OS auto-repeat, step the avatar once each.
pub fn steer_avatar(
    mut key_events: EventReader<KeyboardInput>,
    mut avatar: ResMut<Avatar>,
    mut exit: EventWriter<AppExit>,
) {
    for event in key_events.read() {
        if event.state != ButtonState::Pressed {
            continue;
        }
        if event.key_code == KeyCode::Escape {
            info!("Escape pressed, exiting");
            exit.write(AppExit::Success);
            return;
        }
        if let Some(direction) = direction_for(event.key_code) {
            avatar.step(direction);
        }
    }
}

// --- RENDERING ---

/// Spawns one `FrameShape` entity per draw call.
struct ShapeSpawner<'a, 'w, 's> {
    commands: &'a mut Commands<'w, 's>,
    cache: &'a mut ShapeCache,
    meshes: &'a mut Assets<Mesh>,
    materials: &'a mut Assets<ColorMaterial>,
    viewport: Vec2,
    color: ShapeColor,
    depth: f32,
}

impl ShapeSpawner<'_, '_, '_> {
    fn next_transform(&mut self, position: Vec2) -> Transform {
        let transform = Transform::from_translation(display_to_world(position, self.viewport, self.depth));
        self.depth += DEPTH_STEP;
        transform
    }
}

impl Canvas for ShapeSpawner<'_, '_, '_> {
    fn set_color(&mut self, color: ShapeColor) {
        self.color = color;
    }

    fn draw_square(&mut self, position: Vec2, size: f32) {
        let transform = self.next_transform(position);
        self.commands.spawn((
            Sprite::from_color(self.color.color(), Vec2::splat(size)),
            transform,
            FrameShape,
        ));
    }

    fn draw_circle(&mut self, position: Vec2, radius: f32, segments: u32) {
        let transform = self.next_transform(position).with_scale(Vec3::new(radius, radius, 1.0));
        let mesh = self.cache.circle(self.meshes, segments);
        let material = self.cache.material(self.materials, self.color);
        self.commands.spawn((Mesh2d(mesh), MeshMaterial2d(material), transform, FrameShape));
    }
}

/// Redraws whenever the frame advanced or the avatar moved.
pub fn draw_scene(
    mut commands: Commands,
    dataset: Res<Dataset>,
    config: Res<SimulationConfig>,
    cursor: Res<FrameCursor>,
    avatar: Res<Avatar>,
    shapes: Query<Entity, With<FrameShape>>,
    mut cache: ResMut<ShapeCache>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    if !cursor.is_changed() && !avatar.is_changed() {
        return;
    }

    for entity in &shapes {
        commands.entity(entity).despawn();
    }

    let draw_list = compose_frame(&dataset, avatar.position, cursor.index(), &config);
    let mut canvas = ShapeSpawner {
        commands: &mut commands,
        cache: &mut *cache,
        meshes: &mut *meshes,
        materials: &mut *materials,
        viewport: config.viewport(),
        color: ShapeColor::Blue,
        depth: 0.0,
    };
    paint(&draw_list, &mut canvas);
}
