// Scene coordinates: origin bottom-left, y up, 320 units tall, world roughly 1000 units wide.
use core::time::Duration;

use bevy::prelude::*;

pub const SCENE_HEIGHT: f32 = 320.0;
pub const GROUND_TOP: f32 = 40.0;
pub const WORLD_WIDTH: f32 = 1000.0;
// Projectiles below this have fallen out of the world.
pub const KILL_Y: f32 = -200.0;

pub const PIXELS_PER_METER: f32 = 150.0;

// Camera
pub const CAMERA_HOME_X: f32 = 284.0;
pub const CAMERA_Y: f32 = 160.0;
pub const CAMERA_MIN_X: f32 = 283.0;
pub const CAMERA_MAX_X: f32 = 677.0;
pub const CAMERA_RETURN_DELAY: Duration = Duration::from_millis(500);
pub const CAMERA_RETURN_DURATION: Duration = Duration::from_millis(1500);

// Catapult
pub const CATAPULT_POSITION: Vec2 = Vec2::new(220.0, 70.0);
pub const CATAPULT_SIZE: Vec2 = Vec2::new(40.0, 60.0);
pub const ARM_POSITION: Vec2 = Vec2::new(214.0, 150.0);
pub const ARM_SIZE: Vec2 = Vec2::new(20.0, 100.0);
pub const ARM_MASS: f32 = 0.5;
pub const ARM_PIVOT: Vec2 = Vec2::new(220.0, 105.0);
// Relative to the arm centre.
pub const ARM_SPRING_ANCHOR: Vec2 = Vec2::new(15.0, 30.0);
pub const BUCKET_OFFSET: Vec2 = Vec2::new(32.0, 50.0);
pub const ARM_SPRING_STIFFNESS: f32 = 45.0;
pub const ARM_SPRING_DAMPING: f32 = 0.6;
pub const DRAG_SPRING_STIFFNESS: f32 = 60.0;
pub const DRAG_SPRING_DAMPING: f32 = 1.0;

// Projectile
pub const PENGUIN_RADIUS: f32 = 10.0;
pub const PENGUIN_DENSITY: f32 = 4.0;
// A released penguin is not checked for rest until it had time to leave the bucket.
pub const SETTLE_GRACE: f32 = 0.3;

// Level content
pub const SEAL_RADIUS: f32 = 14.0;
pub const SEAL_REMOVAL_DELAY: f32 = 0.1;
pub const PARTICLE_COUNT: usize = 25;
pub const PARTICLE_LIFETIME: f32 = 0.6;
pub const PARTICLE_SPEED: f32 = 120.0;

// Collision categories (rapier collision group bits).
pub const CATEGORY_PROJECTILE: u32 = 1;
pub const CATEGORY_TARGET: u32 = 2;
pub const CATEGORY_SCENERY: u32 = 4;
pub const CATEGORY_LAUNCHER: u32 = 8;

// Force that delivers an impulse of 1 over a 60 Hz step. A seal resting under its own weight stays
// below it, so rapier does not report resting contacts.
pub const CONTACT_FORCE_THRESHOLD: f32 = PIXELS_PER_METER * PIXELS_PER_METER * 60.0;

pub const SAVE_FILE_ENV: &str = "PEEVED_PENGUINS_SAVE";
pub const DEFAULT_SAVE_FILE: &str = "save/settings.json";
