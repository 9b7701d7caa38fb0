mod app;
pub use app::*;

pub mod floating_score;
pub mod high_score;
pub mod input;
pub mod lifetime;
pub mod restart;
pub mod tween;
