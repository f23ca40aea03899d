//! Rendering module
//!
//! The scene painter turns session state into draw commands; a `Surface`
//! paints them. `DrawList` records them for tests and headless runs.

pub mod draw;
pub mod scene;

#[cfg(target_arch = "wasm32")]
pub mod canvas;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;
pub use draw::{Color, Dash, DrawCommand, DrawList, Path, PathOp, Rect, Surface, colors};
pub use scene::{RoadGeometry, render_frame};
