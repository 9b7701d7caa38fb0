use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use game_helpers::log_error;
use thiserror::Error;

use crate::config::{
    CATEGORY_SCENERY, CATEGORY_TARGET, CONTACT_FORCE_THRESHOLD, GROUND_TOP, SEAL_RADIUS,
    WORLD_WIDTH,
};

const WOOD_COLOR: Color = Color::srgb(0.6, 0.4, 0.2);
const SEAL_COLOR: Color = Color::srgb(0.45, 0.5, 0.6);
const GROUND_COLOR: Color = Color::srgb(0.92, 0.96, 1.0);

pub struct LevelPlugin;

impl Plugin for LevelPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<RoundStarted>()
            .add_systems(Update, load_round_level.pipe(log_error));
    }
}

/// A round begins on `level`: at startup, after a restart, or on "next level".
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundStarted {
    pub level: u32,
}

/// Everything that belongs to the loaded level and goes away with it.
#[derive(Component)]
pub struct LevelContent;

/// A seal; destroyed by hard enough contacts.
#[derive(Component)]
pub struct Target;

/// Collision category bits of a body.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicsCategory(pub u32);

impl PhysicsCategory {
    /// Member of its own category, colliding with everything.
    pub fn collision_groups(self) -> CollisionGroups {
        CollisionGroups::new(Group::from_bits_truncate(self.0), Group::ALL)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block {
    pub center: Vec2,
    pub size: Vec2,
}

const fn block(x: f32, y: f32, width: f32, height: f32) -> Block {
    Block {
        center: Vec2::new(x, y),
        size: Vec2::new(width, height),
    }
}

#[derive(Debug)]
pub struct LevelLayout {
    pub name: &'static str,
    pub blocks: &'static [Block],
    pub targets: &'static [Vec2],
}

pub static LEVELS: [LevelLayout; 2] = [
    LevelLayout {
        name: "Level1",
        blocks: &[
            block(600.0, 75.0, 20.0, 70.0),
            block(700.0, 75.0, 20.0, 70.0),
            block(650.0, 120.0, 140.0, 20.0),
        ],
        targets: &[Vec2::new(650.0, 54.0), Vec2::new(650.0, 144.0)],
    },
    LevelLayout {
        name: "Level2",
        blocks: &[
            block(560.0, 75.0, 20.0, 70.0),
            block(640.0, 75.0, 20.0, 70.0),
            block(600.0, 120.0, 120.0, 20.0),
            block(700.0, 50.0, 60.0, 20.0),
            block(760.0, 75.0, 20.0, 70.0),
            block(840.0, 75.0, 20.0, 70.0),
            block(800.0, 120.0, 120.0, 20.0),
        ],
        targets: &[
            Vec2::new(600.0, 54.0),
            Vec2::new(600.0, 144.0),
            Vec2::new(700.0, 74.0),
            Vec2::new(800.0, 54.0),
            Vec2::new(800.0, 144.0),
        ],
    },
];

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LevelError {
    #[error("unknown level {0}, levels are numbered 1 to {count}", count = LEVELS.len())]
    UnknownLevel(u32),
}

/// Layout of the 1-based `level`.
pub fn layout(level: u32) -> Result<&'static LevelLayout, LevelError> {
    usize::try_from(level)
        .ok()
        .and_then(|level| level.checked_sub(1))
        .and_then(|index| LEVELS.get(index))
        .ok_or(LevelError::UnknownLevel(level))
}

fn load_round_level(
    mut commands: Commands,
    mut round_started: EventReader<RoundStarted>,
    content: Query<Entity, With<LevelContent>>,
) -> Result<(), LevelError> {
    let Some(started) = round_started.read().last().copied() else {
        return Ok(());
    };
    // Resolve first so a bad request leaves the current level in place.
    let layout = layout(started.level)?;

    for entity in &content {
        commands.entity(entity).despawn_recursive();
    }

    spawn_ground(&mut commands);
    for block in layout.blocks {
        spawn_block(&mut commands, *block);
    }
    for position in layout.targets {
        spawn_seal(&mut commands, *position);
    }

    info!("loaded {} ({} targets)", layout.name, layout.targets.len());
    Ok(())
}

fn spawn_ground(commands: &mut Commands) {
    let size = Vec2::new(WORLD_WIDTH, GROUND_TOP);
    commands.spawn((
        Name::new("Ground"),
        Sprite::from_color(GROUND_COLOR, size),
        Transform::from_translation((size / 2.0).extend(0.0)),
        RigidBody::Fixed,
        Collider::cuboid(size.x / 2.0, size.y / 2.0),
        PhysicsCategory(CATEGORY_SCENERY),
        PhysicsCategory(CATEGORY_SCENERY).collision_groups(),
        LevelContent,
    ));
}

fn spawn_block(commands: &mut Commands, block: Block) {
    commands.spawn((
        Name::new("Block"),
        Sprite::from_color(WOOD_COLOR, block.size),
        Transform::from_translation(block.center.extend(0.5)),
        RigidBody::Dynamic,
        Collider::cuboid(block.size.x / 2.0, block.size.y / 2.0),
        Friction::coefficient(0.7),
        PhysicsCategory(CATEGORY_SCENERY),
        PhysicsCategory(CATEGORY_SCENERY).collision_groups(),
        LevelContent,
    ));
}

fn spawn_seal(commands: &mut Commands, position: Vec2) {
    commands.spawn((
        Name::new("Seal"),
        Sprite::from_color(SEAL_COLOR, Vec2::splat(SEAL_RADIUS * 2.0)),
        Transform::from_translation(position.extend(1.0)),
        RigidBody::Dynamic,
        Collider::ball(SEAL_RADIUS),
        PhysicsCategory(CATEGORY_TARGET),
        PhysicsCategory(CATEGORY_TARGET).collision_groups(),
        ActiveEvents::CONTACT_FORCE_EVENTS,
        ContactForceEventThreshold(CONTACT_FORCE_THRESHOLD),
        Target,
        LevelContent,
    ));
}
