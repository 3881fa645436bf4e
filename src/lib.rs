//! Polygon Viewer - a windowed 2D mesh viewer with keyboard panning
//!
//! Renders one fixed polygon mesh in two passes sharing a single vertex
//! buffer: a solid triangle-list body and a line-list edge overlay drawn
//! on top. Held W/A/S/D or arrow keys pan the shape; the movement step is
//! derived from frame timing, and a per-frame aspect correction keeps the
//! shape's proportions stable as the window is resized.
//!
//! # Structure
//! - [`geometry`] - the fixed vertex table and the two index lists
//! - [`shader`] - GLSL stage compilation (via naga) and program linking
//! - [`renderer`] - wgpu device setup, buffers, pipelines, frame drawing
//! - [`camera`] - pan offsets, aspect correction, frame timing
//! - [`input`] - held-key state
//! - [`app`] - the winit event loop

pub mod app;
pub mod camera;
pub mod error;
pub mod geometry;
pub mod input;
pub mod renderer;
pub mod shader;

pub use app::run;
pub use error::{ViewerError, ViewerResult};

/// Configuration for the viewer.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Window title
    pub title: String,
    /// Window width used when the primary monitor cannot be queried
    pub width: u32,
    /// Window height used when the primary monitor cannot be queried
    pub height: u32,
    /// Enable vsync
    pub vsync: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "Polygon Viewer".to_string(),
            width: 1280,
            height: 720,
            vsync: true,
        }
    }
}
