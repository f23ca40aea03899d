//! Canvas 2D surface for the browser

use std::collections::HashMap;
use std::f64::consts::TAU;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use super::draw::{DrawCommand, Path, PathOp, Surface};
use crate::assets::{self, AssetKey};
use crate::consts::{VIEW_HEIGHT, VIEW_WIDTH};

/// Paints draw commands onto an HTML canvas, scaling the virtual view to
/// the canvas size
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    images: HashMap<AssetKey, HtmlImageElement>,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into()?;

        // Start every image loading now; frames skip them until complete
        let mut images = HashMap::new();
        for key in assets::all() {
            let img = HtmlImageElement::new()?;
            img.set_src(key.path());
            images.insert(key, img);
        }
        log::info!("Canvas surface ready, loading {} images", images.len());

        Ok(Self {
            canvas,
            ctx,
            images,
        })
    }

    fn trace(&self, path: &Path) {
        self.ctx.begin_path();
        for op in &path.ops {
            match *op {
                PathOp::MoveTo(p) => self.ctx.move_to(p.x as f64, p.y as f64),
                PathOp::LineTo(p) => self.ctx.line_to(p.x as f64, p.y as f64),
                PathOp::QuadTo { ctrl, to } => self.ctx.quadratic_curve_to(
                    ctrl.x as f64,
                    ctrl.y as f64,
                    to.x as f64,
                    to.y as f64,
                ),
                PathOp::Close => self.ctx.close_path(),
            }
        }
    }

    fn circle(&self, x: f32, y: f32, radius: f32) {
        self.ctx.begin_path();
        self.ctx
            .arc(x as f64, y as f64, radius.max(0.0) as f64, 0.0, TAU)
            .ok();
    }

    fn ready_image(&self, key: AssetKey) -> Option<&HtmlImageElement> {
        self.images
            .get(&key)
            .filter(|img| img.complete() && img.natural_width() > 0)
    }
}

impl Surface for CanvasSurface {
    fn begin_frame(&mut self) {
        let sx = self.canvas.width() as f64 / VIEW_WIDTH as f64;
        let sy = self.canvas.height() as f64 / VIEW_HEIGHT as f64;
        self.ctx.set_transform(sx, 0.0, 0.0, sy, 0.0, 0.0).ok();
        self.ctx
            .clear_rect(0.0, 0.0, VIEW_WIDTH as f64, VIEW_HEIGHT as f64);
    }

    fn image_ready(&self, key: AssetKey) -> bool {
        self.ready_image(key).is_some()
    }

    fn draw(&mut self, command: &DrawCommand) {
        let ctx = &self.ctx;
        match command {
            DrawCommand::FillRect { rect, color } => {
                ctx.set_fill_style_str(&color.css());
                ctx.fill_rect(rect.x as f64, rect.y as f64, rect.w as f64, rect.h as f64);
            }
            DrawCommand::FillPath { path, color } => {
                self.trace(path);
                ctx.set_fill_style_str(&color.css());
                ctx.fill();
            }
            DrawCommand::StrokePath {
                path,
                color,
                width,
                dash,
            } => {
                self.trace(path);
                ctx.save();
                ctx.set_stroke_style_str(&color.css());
                ctx.set_line_width(*width as f64);
                if let Some(dash) = dash {
                    let pattern = js_sys::Array::of2(
                        &JsValue::from_f64(dash.on as f64),
                        &JsValue::from_f64(dash.off as f64),
                    );
                    ctx.set_line_dash(&pattern).ok();
                    ctx.set_line_dash_offset(dash.offset as f64);
                }
                ctx.stroke();
                ctx.restore();
            }
            DrawCommand::FillCircle {
                center,
                radius,
                color,
            } => {
                self.circle(center.x, center.y, *radius);
                ctx.set_fill_style_str(&color.css());
                ctx.fill();
            }
            DrawCommand::StrokeCircle {
                center,
                radius,
                color,
                width,
            } => {
                self.circle(center.x, center.y, *radius);
                ctx.set_stroke_style_str(&color.css());
                ctx.set_line_width(*width as f64);
                ctx.stroke();
            }
            DrawCommand::Image { key, rect, skew } => {
                let Some(img) = self.ready_image(*key) else {
                    return;
                };
                ctx.save();
                // Skew around the bottom centre so the wheels stay put
                ctx.translate((rect.x + rect.w / 2.0) as f64, (rect.y + rect.h) as f64)
                    .ok();
                ctx.transform(1.0, 0.0, -(*skew as f64), 1.0, 0.0, 0.0).ok();
                ctx.draw_image_with_html_image_element_and_dw_and_dh(
                    img,
                    -(rect.w / 2.0) as f64,
                    -rect.h as f64,
                    rect.w as f64,
                    rect.h as f64,
                )
                .ok();
                ctx.restore();
            }
            DrawCommand::ImageCircle {
                key,
                center,
                radius,
            } => {
                let Some(img) = self.ready_image(*key) else {
                    return;
                };
                ctx.save();
                self.circle(center.x, center.y, *radius);
                ctx.clip();
                let size = (*radius * 2.0) as f64;
                ctx.draw_image_with_html_image_element_and_dw_and_dh(
                    img,
                    (center.x - radius) as f64,
                    (center.y - radius) as f64,
                    size,
                    size,
                )
                .ok();
                ctx.restore();
            }
        }
    }
}
