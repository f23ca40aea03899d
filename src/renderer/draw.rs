//! Draw commands and the surface they are painted on

use std::collections::HashSet;

use glam::Vec2;
use serde::Serialize;

use crate::assets::AssetKey;

/// RGBA colour, alpha in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// CSS colour string for canvas fill/stroke styles
    pub fn css(&self) -> String {
        format!("rgba({},{},{},{})", self.r, self.g, self.b, self.a)
    }
}

/// Colors for scene elements
pub mod colors {
    use super::Color;

    pub const SKY: Color = Color::rgb(135, 196, 235);
    pub const GROUND_LIGHT: Color = Color::rgb(104, 168, 72);
    pub const GROUND_DARK: Color = Color::rgb(84, 144, 58);
    pub const ROAD: Color = Color::rgb(78, 78, 84);
    pub const LANE_MARKING: Color = Color::rgb(245, 245, 235);
    pub const HEADLIGHT: Color = Color::rgba(255, 250, 200, 0.25);
    pub const SIGN_POLE: Color = Color::rgb(150, 150, 158);
    pub const SIGN_PLATE: Color = Color::rgb(255, 255, 255);
    pub const SIGN_RING: Color = Color::rgb(206, 32, 41);
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum PathOp {
    MoveTo(Vec2),
    LineTo(Vec2),
    /// Quadratic bezier from the current point
    QuadTo { ctrl: Vec2, to: Vec2 },
    Close,
}

/// A sequence of path operations
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Path {
    pub ops: Vec<PathOp>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(mut self, p: Vec2) -> Self {
        self.ops.push(PathOp::MoveTo(p));
        self
    }

    pub fn line_to(mut self, p: Vec2) -> Self {
        self.ops.push(PathOp::LineTo(p));
        self
    }

    pub fn quad_to(mut self, ctrl: Vec2, to: Vec2) -> Self {
        self.ops.push(PathOp::QuadTo { ctrl, to });
        self
    }

    pub fn close(mut self) -> Self {
        self.ops.push(PathOp::Close);
        self
    }
}

/// Repeating dash pattern for strokes
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Dash {
    pub on: f32,
    pub off: f32,
    /// Pattern phase; advancing it scrolls the dashes
    pub offset: f32,
}

/// One drawing primitive, in virtual view units
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawCommand {
    FillRect {
        rect: Rect,
        color: Color,
    },
    FillPath {
        path: Path,
        color: Color,
    },
    StrokePath {
        path: Path,
        color: Color,
        width: f32,
        dash: Option<Dash>,
    },
    FillCircle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    StrokeCircle {
        center: Vec2,
        radius: f32,
        color: Color,
        width: f32,
    },
    /// Bitmap, horizontally skewed by `skew` around its bottom edge
    Image {
        key: AssetKey,
        rect: Rect,
        skew: f32,
    },
    /// Bitmap clipped to a circle
    ImageCircle {
        key: AssetKey,
        center: Vec2,
        radius: f32,
    },
}

/// Something the renderer can paint on
pub trait Surface {
    /// Called once before each frame's commands
    fn begin_frame(&mut self) {}

    /// Whether an image has finished loading and can be drawn
    fn image_ready(&self, key: AssetKey) -> bool;

    fn draw(&mut self, command: &DrawCommand);
}

/// Surface that records commands instead of painting them
#[derive(Debug, Default)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
    pub frames: u32,
    ready: HashSet<AssetKey>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recording surface that reports the given images as loaded
    pub fn with_images(keys: impl IntoIterator<Item = AssetKey>) -> Self {
        Self {
            ready: keys.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn mark_ready(&mut self, key: AssetKey) {
        self.ready.insert(key);
    }

    /// Images drawn in the last frame
    pub fn images(&self) -> impl Iterator<Item = AssetKey> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Image { key, .. } | DrawCommand::ImageCircle { key, .. } => Some(*key),
            _ => None,
        })
    }
}

impl Surface for DrawList {
    fn begin_frame(&mut self) {
        self.commands.clear();
        self.frames += 1;
    }

    fn image_ready(&self, key: AssetKey) -> bool {
        self.ready.contains(&key)
    }

    fn draw(&mut self, command: &DrawCommand) {
        self.commands.push(command.clone());
    }
}
