//! Car physics integrator
//!
//! Converts held keys into speed, steering and lateral position. One call
//! per tick; deterministic and infallible.

use super::state::{KeyState, RoadState};
use crate::approach;
use crate::consts::*;

/// Advance the car by one tick
pub fn integrate(road: &mut RoadState, keys: &KeyState) {
    // Throttle / coast
    if keys.up {
        road.speed += ACCELERATION - road.speed * DRAG;
    } else {
        road.speed = (road.speed - FRICTION).max(0.0);
    }
    if keys.down && road.speed > 0.0 {
        road.speed -= BRAKE;
    }
    road.speed = road.speed.clamp(0.0, road.max_speed);

    // Steering only bites while moving
    let steering = keys.left != keys.right;
    if steering && road.speed > 0.0 {
        let shift = steer_shift(road.turn_angle, road.speed);
        if keys.left {
            road.turn_angle -= TURN_STEP;
            road.lateral_offset -= shift;
        } else {
            road.turn_angle += TURN_STEP;
            road.lateral_offset += shift;
        }
    } else if !steering {
        road.turn_angle = approach(road.turn_angle, 0.0, TURN_DECAY);
    }
    road.turn_angle = road.turn_angle.clamp(-MAX_TURN, MAX_TURN);

    // Curves push the car toward the outside
    road.lateral_offset -= road.current_curve * road.speed * CURVE_DRIFT;
    road.lateral_offset = road
        .lateral_offset
        .clamp(-MAX_LATERAL_OFFSET, MAX_LATERAL_OFFSET);

    // Off the road: the car parks
    if road.is_parked() {
        road.speed = 0.0;
    }

    scroll_scenery(road);
}

/// Sideways movement for one tick of steering. Grows with the steering
/// angle; above `STEER_REFERENCE_SPEED` it falls off with speed.
pub fn steer_shift(turn_angle: f32, speed: f32) -> f32 {
    let response = if speed > STEER_REFERENCE_SPEED {
        STEER_REFERENCE_SPEED / speed
    } else {
        1.0
    };
    STEER_RATE * (1.0 + turn_angle.abs()) * response
}

/// Ground bands and sky follow the car's motion
fn scroll_scenery(road: &mut RoadState) {
    road.ground_stripe_offset += road.speed * STRIPE_SCROLL;
    while road.ground_stripe_offset >= STRIPE_PERIOD {
        road.ground_stripe_offset -= STRIPE_PERIOD;
        road.ground_stripe_polarity = !road.ground_stripe_polarity;
    }

    let sky = road.backdrop_offset + road.current_curve * road.speed * BACKDROP_SCROLL;
    road.backdrop_offset = sky.rem_euclid(VIEW_WIDTH);
}
