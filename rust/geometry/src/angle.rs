// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Angle helpers (radians unless stated otherwise)

use std::f64::consts::PI;

/// Wrap an angle into `[-π, π)`.
pub fn wrap_angle(angle: f64) -> f64 {
    (angle + PI).rem_euclid(2.0 * PI) - PI
}

/// Fold an angle into `[0, π)` so that opposite directions compare equal.
pub fn direction_insensitive(angle: f64) -> f64 {
    angle.rem_euclid(PI)
}

/// Absolute signed angular distance between two angles, in `[0, π]`.
pub fn angular_distance(a: f64, b: f64) -> f64 {
    wrap_angle(a - b).abs()
}

/// True when two directions are parallel (or anti-parallel) within `tolerance`.
pub fn is_parallel(a: f64, b: f64, tolerance: f64) -> bool {
    let diff = (direction_insensitive(a) - direction_insensitive(b)).abs();
    diff < tolerance || diff > PI - tolerance
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_wrap_angle() {
        assert_relative_eq!(wrap_angle(0.0), 0.0);
        assert_relative_eq!(wrap_angle(3.0 * PI / 2.0), -PI / 2.0, epsilon = 1e-12);
        assert_relative_eq!(wrap_angle(-3.0 * PI / 2.0), PI / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_direction_insensitive() {
        assert_relative_eq!(direction_insensitive(-PI / 2.0), PI / 2.0, epsilon = 1e-12);
        assert_relative_eq!(direction_insensitive(PI / 4.0), PI / 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_angular_distance_across_seam() {
        let a = 179.0_f64.to_radians();
        let b = (-179.0_f64).to_radians();
        assert_relative_eq!(angular_distance(a, b), 2.0_f64.to_radians(), epsilon = 1e-9);
    }

    #[test]
    fn test_is_parallel() {
        assert!(is_parallel(0.0, PI, 0.01));
        assert!(is_parallel(0.001, -0.001, 0.01));
        assert!(!is_parallel(0.0, PI / 2.0, 0.01));
    }
}
