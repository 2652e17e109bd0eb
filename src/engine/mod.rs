// Engine module - camera control, input tracking and scene state
// Everything here is window-agnostic except the winit types it consumes

pub mod camera;
pub mod components;
pub mod config;
pub mod debug_overlay;
pub mod input;
pub mod mesh;
pub mod motion;
pub mod pointer_lock;
pub mod scene;
pub mod systems;

// Re-export commonly used items
pub use components::*;
