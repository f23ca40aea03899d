//! Pseudo-3D road scene painter
//!
//! Paints one frame from the session state, back to front: sky, ground
//! bands, road, lane markings, headlights, car, roadside sign. Painting
//! never changes the session.

use glam::Vec2;

use super::draw::{Dash, DrawCommand, Path, Rect, Surface, colors};
use crate::assets;
use crate::consts::*;
use crate::quiz::SignSide;
use crate::sim::{GameSession, PoleMarker, RoadState};

/// Road half-width at the bottom of the view
const ROAD_HALF_WIDTH: f32 = 450.0;
/// Road half-width at the vanishing point
const ROAD_TOP_HALF_WIDTH: f32 = 4.0;
/// Horizontal shift of the vanishing point per unit of curve
const CURVE_VANISH: f32 = 4.0;
/// Sideways bend of the road edges per unit of curve
const CURVE_BEND: f32 = 3.0;
/// Vanishing point parallax against the car's lateral offset
const VANISH_PARALLAX: f32 = 0.05;

/// Each ground band further away is this much thinner
const BAND_RATIO: f32 = 0.7;
/// Bands thinner than this are not drawn
const MIN_BAND_HEIGHT: f32 = 0.5;

const LANE_WIDTH: f32 = 6.0;
const DASH_LENGTH: f32 = 40.0;

const CAR_WIDTH: f32 = 180.0;
const CAR_HEIGHT: f32 = 100.0;
const CAR_BOTTOM_MARGIN: f32 = 10.0;
/// Sprite skew per unit of turn angle
const CAR_SKEW: f32 = 0.04;
const HEADLIGHT_REACH: f32 = 170.0;
const HEADLIGHT_SPREAD: f32 = 60.0;

/// Smallest scale of a sign at the horizon
const SIGN_MIN_SCALE: f32 = 0.1;
const SIGN_POLE_HEIGHT: f32 = 160.0;
const SIGN_POLE_WIDTH: f32 = 8.0;
const SIGN_RADIUS: f32 = 45.0;
const SIGN_RING_WIDTH: f32 = 8.0;
const SIGN_INSET_RADIUS: f32 = 36.0;
/// Gap between the road edge and the pole
const SIGN_MARGIN: f32 = 70.0;

fn horizon_y() -> f32 {
    VIEW_HEIGHT * HORIZON_RATIO
}

/// Road outline in view coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadGeometry {
    pub bottom_left: Vec2,
    pub bottom_right: Vec2,
    pub top_left: Vec2,
    pub top_right: Vec2,
    pub ctrl_left: Vec2,
    pub ctrl_right: Vec2,
    pub bottom_centre: Vec2,
    pub vanishing_point: Vec2,
    pub ctrl_centre: Vec2,
}

impl RoadGeometry {
    pub fn new(road: &RoadState) -> Self {
        let horizon = horizon_y();
        let bend = Vec2::new(road.current_curve * CURVE_BEND, 0.0);

        let bottom_centre = Vec2::new(VIEW_WIDTH / 2.0 - road.lateral_offset, VIEW_HEIGHT);
        let vanishing_point = Vec2::new(
            VIEW_WIDTH / 2.0 + road.current_curve * CURVE_VANISH
                - road.lateral_offset * VANISH_PARALLAX,
            horizon,
        );

        let bottom_left = bottom_centre - Vec2::X * ROAD_HALF_WIDTH;
        let bottom_right = bottom_centre + Vec2::X * ROAD_HALF_WIDTH;
        let top_left = vanishing_point - Vec2::X * ROAD_TOP_HALF_WIDTH;
        let top_right = vanishing_point + Vec2::X * ROAD_TOP_HALF_WIDTH;

        Self {
            bottom_left,
            bottom_right,
            top_left,
            top_right,
            ctrl_left: bottom_left.lerp(top_left, 0.5) - bend,
            ctrl_right: bottom_right.lerp(top_right, 0.5) - bend,
            bottom_centre,
            vanishing_point,
            ctrl_centre: bottom_centre.lerp(vanishing_point, 0.5) - bend,
        }
    }

    /// Road edge at a given depth (0 = horizon, 1 = bottom of the view)
    pub fn edge_at(&self, depth: f32, side: SignSide) -> Vec2 {
        // Control points sit at mid-height, so the edge's y is linear in t
        let t = 1.0 - depth.clamp(0.0, 1.0);
        match side {
            SignSide::Left => quad_point(self.bottom_left, self.ctrl_left, self.top_left, t),
            SignSide::Right => quad_point(self.bottom_right, self.ctrl_right, self.top_right, t),
        }
    }

    fn surface_path(&self) -> Path {
        Path::new()
            .move_to(self.bottom_left)
            .quad_to(self.ctrl_left, self.top_left)
            .line_to(self.top_right)
            .quad_to(self.ctrl_right, self.bottom_right)
            .close()
    }

    fn centre_line(&self) -> Path {
        Path::new()
            .move_to(self.bottom_centre)
            .quad_to(self.ctrl_centre, self.vanishing_point)
    }
}

#[inline]
fn quad_point(p0: Vec2, p1: Vec2, p2: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    p0 * (u * u) + p1 * (2.0 * u * t) + p2 * (t * t)
}

/// Paint the whole scene for the current session state
pub fn render_frame<S: Surface + ?Sized>(session: &GameSession, surface: &mut S) {
    surface.begin_frame();

    let road = &session.road;
    let geometry = RoadGeometry::new(road);

    paint_sky(road, surface);
    paint_ground(road, surface);
    surface.draw(&DrawCommand::FillPath {
        path: geometry.surface_path(),
        color: colors::ROAD,
    });
    paint_lane_markings(road, &geometry, surface);
    if session.headlights {
        paint_headlights(surface);
    }
    paint_car(road, surface);
    if let Some(marker) = session.sign.marker() {
        paint_sign(marker, &geometry, surface);
    }
}

/// Sky fill, then two copies of the backdrop so the wrap has no seam
fn paint_sky<S: Surface + ?Sized>(road: &RoadState, surface: &mut S) {
    let height = horizon_y();
    surface.draw(&DrawCommand::FillRect {
        rect: Rect::new(0.0, 0.0, VIEW_WIDTH, height),
        color: colors::SKY,
    });

    if !surface.image_ready(assets::SKY) {
        return;
    }
    let x = -road.backdrop_offset;
    for copy_x in [x, x + VIEW_WIDTH] {
        surface.draw(&DrawCommand::Image {
            key: assets::SKY,
            rect: Rect::new(copy_x, 0.0, VIEW_WIDTH, height),
            skew: 0.0,
        });
    }
}

/// Ground band boundaries as fractions of the ground height, nearest first.
///
/// Boundary k sits at `BAND_RATIO^(k - phase)`; at phase 1 every boundary has
/// moved to where its neighbour was, which is why the polarity flips there.
pub fn band_edges(stripe_offset: f32) -> Vec<f32> {
    let phase = (stripe_offset / STRIPE_PERIOD).clamp(0.0, 1.0);
    let ground = VIEW_HEIGHT - horizon_y();

    let mut edges = Vec::new();
    let mut k = 0;
    loop {
        let f = BAND_RATIO.powf(k as f32 - phase).min(1.0);
        // Only far bands end the loop; the nearest one may be clipped thin
        if let Some(&prev) = edges.last() {
            if f < BAND_RATIO && (prev - f) * ground < MIN_BAND_HEIGHT {
                break;
            }
        }
        edges.push(f);
        k += 1;
    }
    edges.push(0.0);
    edges
}

fn paint_ground<S: Surface + ?Sized>(road: &RoadState, surface: &mut S) {
    let horizon = horizon_y();
    let ground = VIEW_HEIGHT - horizon;

    // Far strip behind the finest band
    surface.draw(&DrawCommand::FillRect {
        rect: Rect::new(0.0, horizon, VIEW_WIDTH, ground),
        color: colors::GROUND_DARK,
    });

    let edges = band_edges(road.ground_stripe_offset);
    for (k, pair) in edges.windows(2).enumerate() {
        let (near, far) = (pair[0], pair[1]);
        let light = (k % 2 == 0) != road.ground_stripe_polarity;
        let color = if light {
            colors::GROUND_LIGHT
        } else {
            colors::GROUND_DARK
        };
        let top = horizon + far * ground;
        let bottom = horizon + near * ground;
        surface.draw(&DrawCommand::FillRect {
            rect: Rect::new(0.0, top, VIEW_WIDTH, bottom - top),
            color,
        });
    }
}

fn paint_lane_markings<S: Surface + ?Sized>(
    road: &RoadState,
    geometry: &RoadGeometry,
    surface: &mut S,
) {
    let cycle = road.ground_stripe_offset / STRIPE_PERIOD
        + if road.ground_stripe_polarity { 1.0 } else { 0.0 };
    surface.draw(&DrawCommand::StrokePath {
        path: geometry.centre_line(),
        color: colors::LANE_MARKING,
        width: LANE_WIDTH,
        dash: Some(Dash {
            on: DASH_LENGTH,
            off: DASH_LENGTH,
            offset: -cycle * DASH_LENGTH,
        }),
    });
}

fn car_rect() -> Rect {
    Rect::new(
        (VIEW_WIDTH - CAR_WIDTH) / 2.0,
        VIEW_HEIGHT - CAR_HEIGHT - CAR_BOTTOM_MARGIN,
        CAR_WIDTH,
        CAR_HEIGHT,
    )
}

fn paint_headlights<S: Surface + ?Sized>(surface: &mut S) {
    let car = car_rect();
    for lamp_x in [car.x + car.w * 0.2, car.x + car.w * 0.8] {
        let lamp = Vec2::new(lamp_x, car.y + car.h * 0.35);
        let reach = lamp - Vec2::Y * HEADLIGHT_REACH;
        let path = Path::new()
            .move_to(lamp)
            .line_to(reach - Vec2::X * HEADLIGHT_SPREAD)
            .line_to(reach + Vec2::X * HEADLIGHT_SPREAD)
            .close();
        surface.draw(&DrawCommand::FillPath {
            path,
            color: colors::HEADLIGHT,
        });
    }
}

fn paint_car<S: Surface + ?Sized>(road: &RoadState, surface: &mut S) {
    if !surface.image_ready(assets::CAR) {
        return;
    }
    surface.draw(&DrawCommand::Image {
        key: assets::CAR,
        rect: car_rect(),
        skew: road.turn_angle * CAR_SKEW,
    });
}

fn paint_sign<S: Surface + ?Sized>(marker: &PoleMarker, geometry: &RoadGeometry, surface: &mut S) {
    let depth = marker.perspective();
    let scale = SIGN_MIN_SCALE + depth * (1.0 - SIGN_MIN_SCALE);

    let edge = geometry.edge_at(depth, marker.side);
    let outward = match marker.side {
        SignSide::Left => -1.0,
        SignSide::Right => 1.0,
    };
    let base = edge + Vec2::X * (outward * SIGN_MARGIN * scale);

    let pole_h = SIGN_POLE_HEIGHT * scale;
    let pole_w = SIGN_POLE_WIDTH * scale;
    surface.draw(&DrawCommand::FillRect {
        rect: Rect::new(base.x - pole_w / 2.0, base.y - pole_h, pole_w, pole_h),
        color: colors::SIGN_POLE,
    });

    let centre = Vec2::new(base.x, base.y - pole_h);
    surface.draw(&DrawCommand::FillCircle {
        center: centre,
        radius: SIGN_RADIUS * scale,
        color: colors::SIGN_PLATE,
    });
    surface.draw(&DrawCommand::StrokeCircle {
        center: centre,
        radius: SIGN_RADIUS * scale,
        color: colors::SIGN_RING,
        width: SIGN_RING_WIDTH * scale,
    });

    // Inset waits until the artwork has loaded
    if let (Some(key), true) = (marker.image, marker.is_loaded) {
        surface.draw(&DrawCommand::ImageCircle {
            key,
            center: centre,
            radius: SIGN_INSET_RADIUS * scale,
        });
    }
}
