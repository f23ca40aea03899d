//! Road curvature generator
//!
//! The road is split into sections of random length. Each new section picks
//! a curve target far enough from the last one to be noticeable, and the
//! visible curve eases toward it.

use rand::Rng;

use super::state::RoadState;
use crate::approach;
use crate::consts::*;

/// Pick the next target curve.
///
/// A first draw that lands within `MIN_CURVE_CHANGE` of `previous` is
/// rerolled once; the reroll only draws from values far enough away.
pub fn next_curve_target<R: Rng>(rng: &mut R, previous: i32) -> i32 {
    let first = rng.random_range(-CURVE_RANGE..=CURVE_RANGE);
    if (first - previous).abs() >= MIN_CURVE_CHANGE {
        return first;
    }

    // Values at least MIN_CURVE_CHANGE below and above `previous`
    let low_end = previous - MIN_CURVE_CHANGE;
    let high_start = previous + MIN_CURVE_CHANGE;
    let low_count = (low_end + CURVE_RANGE + 1).max(0);
    let high_count = (CURVE_RANGE - high_start + 1).max(0);

    let pick = rng.random_range(0..low_count + high_count);
    if pick < low_count {
        -CURVE_RANGE + pick
    } else {
        high_start + (pick - low_count)
    }
}

/// Length of the next road section
pub fn next_section_length<R: Rng>(rng: &mut R) -> f32 {
    rng.random_range(MIN_SECTION_LENGTH..=MAX_SECTION_LENGTH)
}

/// Advance the curve state by one tick
pub fn advance<R: Rng>(road: &mut RoadState, rng: &mut R) {
    road.remaining_section_distance -= road.speed;
    if road.remaining_section_distance < 0.0 {
        let previous = road.target_curve.round() as i32;
        road.target_curve = next_curve_target(rng, previous) as f32;
        road.remaining_section_distance = next_section_length(rng);
        log::debug!(
            "New road section: curve {} for {:.0}",
            road.target_curve,
            road.remaining_section_distance
        );
    }

    road.current_curve = approach(road.current_curve, road.target_curve, road.speed * CURVE_EASE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_targets_stay_in_range_and_spaced() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut previous = 0;
        for _ in 0..5000 {
            let next = next_curve_target(&mut rng, previous);
            assert!((-CURVE_RANGE..=CURVE_RANGE).contains(&next));
            assert!((next - previous).abs() >= MIN_CURVE_CHANGE);
            previous = next;
        }
    }

    #[test]
    fn test_edge_previous_values_still_reroll() {
        let mut rng = Pcg32::seed_from_u64(3);
        for previous in [-CURVE_RANGE, CURVE_RANGE, 0] {
            for _ in 0..500 {
                let next = next_curve_target(&mut rng, previous);
                assert!((next - previous).abs() >= MIN_CURVE_CHANGE);
            }
        }
    }

    #[test]
    fn test_section_rollover_picks_new_target() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut road = RoadState::new(DEFAULT_MAX_SPEED);
        road.speed = 5.0;
        road.remaining_section_distance = 2.0;

        advance(&mut road, &mut rng);

        assert!(road.target_curve.abs() >= MIN_CURVE_CHANGE as f32);
        assert!(road.remaining_section_distance >= MIN_SECTION_LENGTH);
        assert!(road.remaining_section_distance <= MAX_SECTION_LENGTH);
        // Eased by at most one step
        assert!((road.current_curve.abs() - 5.0 * CURVE_EASE).abs() < 1e-5);
    }

    #[test]
    fn test_curve_eases_without_overshoot() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut road = RoadState::new(DEFAULT_MAX_SPEED);
        road.speed = DEFAULT_MAX_SPEED;
        road.target_curve = 1.0;
        road.remaining_section_distance = 1.0e9;
        for _ in 0..50 {
            advance(&mut road, &mut rng);
            assert!(road.current_curve <= 1.0);
        }
        assert_eq!(road.current_curve, 1.0);
    }

    #[test]
    fn test_stationary_car_keeps_curve() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut road = RoadState::new(DEFAULT_MAX_SPEED);
        road.target_curve = 30.0;
        advance(&mut road, &mut rng);
        assert_eq!(road.current_curve, 0.0);
        assert_eq!(road.remaining_section_distance, INITIAL_SECTION_LENGTH);
    }
}
