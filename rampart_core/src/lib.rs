//! Game state stack and engine loop for simple game engine based on Rust.

pub use app::{DeltaTime, Engine};
pub use rampart_ecs as ecs;

pub mod app;
pub mod config;
pub mod error;
pub mod state;
