//! # Motion profile module
//!
//! Provides a time-optimal trapezoidal motion profile from rest at zero to
//! rest at a goal position. The profile accelerates at the maximum
//! acceleration, cruises at the maximum velocity and decelerates at the
//! maximum acceleration. If the goal is too close to reach the maximum
//! velocity the cruise phase disappears and the profile is triangular.
//!
//! The profile is a pure function of the time elapsed since its start, so it
//! can be sampled at any tick rate without accumulating drift.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use util::maths::sign;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Kinematic limits of the profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    /// Maximum velocity.
    ///
    /// Units: meters/second
    pub max_velocity_ms: f64,

    /// Maximum acceleration (and deceleration).
    ///
    /// Units: meters/second^2
    pub max_accel_mss: f64,
}

/// A point along the profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ProfileState {
    /// Units: meters
    pub position_m: f64,

    /// Units: meters/second
    pub velocity_ms: f64,
}

/// A trapezoidal motion profile from rest at zero to rest at the goal.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TrapezoidProfile {
    constraints: Constraints,

    /// Signed goal position.
    goal_m: f64,

    /// Direction of travel, `-1`, `0` or `1`.
    direction: f64,

    /// Highest velocity reached, equal to the maximum velocity unless the
    /// profile is triangular.
    peak_velocity_ms: f64,

    /// Duration of the acceleration phase, which is also the duration of the
    /// deceleration phase.
    accel_time_s: f64,

    /// Duration of the constant velocity phase.
    cruise_time_s: f64,

    total_time_s: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while building a profile.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileError {
    #[error("Maximum velocity must be positive and finite, found {0}")]
    InvalidMaxVelocity(f64),

    #[error("Maximum acceleration must be positive and finite, found {0}")]
    InvalidMaxAccel(f64),

    #[error("The goal must be finite, found {0}")]
    InvalidGoal(f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Constraints {
    pub fn new(max_velocity_ms: f64, max_accel_mss: f64) -> Self {
        Self {
            max_velocity_ms,
            max_accel_mss,
        }
    }

    /// Check that both limits are strictly positive and finite.
    ///
    /// A zero limit would produce a profile which never moves, which is
    /// treated as a caller error.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if !(self.max_velocity_ms.is_finite() && self.max_velocity_ms > 0.0) {
            return Err(ProfileError::InvalidMaxVelocity(self.max_velocity_ms));
        }
        if !(self.max_accel_mss.is_finite() && self.max_accel_mss > 0.0) {
            return Err(ProfileError::InvalidMaxAccel(self.max_accel_mss));
        }

        Ok(())
    }
}

impl TrapezoidProfile {
    /// Build the profile for the given constraints and goal.
    pub fn new(constraints: Constraints, goal_m: f64) -> Result<Self, ProfileError> {
        constraints.validate()?;

        if !goal_m.is_finite() {
            return Err(ProfileError::InvalidGoal(goal_m));
        }

        let dist_m = goal_m.abs();
        let v_max = constraints.max_velocity_ms;
        let a_max = constraints.max_accel_mss;

        // Distance covered getting up to full speed
        let full_accel_time_s = v_max / a_max;
        let full_accel_dist_m = 0.5 * a_max * full_accel_time_s * full_accel_time_s;

        let (peak_velocity_ms, accel_time_s, cruise_time_s) = if 2.0 * full_accel_dist_m >= dist_m {
            // Triangular, we turn around half way
            let accel_time_s = (dist_m / a_max).sqrt();
            (a_max * accel_time_s, accel_time_s, 0.0)
        } else {
            (
                v_max,
                full_accel_time_s,
                (dist_m - 2.0 * full_accel_dist_m) / v_max,
            )
        };

        Ok(Self {
            constraints,
            goal_m,
            direction: sign(goal_m),
            peak_velocity_ms,
            accel_time_s,
            cruise_time_s,
            total_time_s: 2.0 * accel_time_s + cruise_time_s,
        })
    }

    /// Get the state the profile occupies `elapsed_s` seconds after its
    /// start.
    ///
    /// Negative times give the initial state, times past the end of the
    /// profile give the goal at rest.
    pub fn calculate(&self, elapsed_s: f64) -> ProfileState {
        if elapsed_s <= 0.0 || self.direction == 0.0 {
            return ProfileState::default();
        }
        if elapsed_s >= self.total_time_s {
            return ProfileState {
                position_m: self.goal_m,
                velocity_ms: 0.0,
            };
        }

        let a_max = self.constraints.max_accel_mss;
        let dist_m = self.goal_m.abs();
        let decel_start_s = self.accel_time_s + self.cruise_time_s;

        let (position_m, velocity_ms) = if elapsed_s < self.accel_time_s {
            (0.5 * a_max * elapsed_s * elapsed_s, a_max * elapsed_s)
        } else if elapsed_s < decel_start_s {
            let accel_dist_m = 0.5 * a_max * self.accel_time_s * self.accel_time_s;
            (
                accel_dist_m + self.peak_velocity_ms * (elapsed_s - self.accel_time_s),
                self.peak_velocity_ms,
            )
        } else {
            // Mirror of the acceleration phase about the goal
            let remaining_s = self.total_time_s - elapsed_s;
            (
                dist_m - 0.5 * a_max * remaining_s * remaining_s,
                a_max * remaining_s,
            )
        };

        ProfileState {
            position_m: self.direction * position_m.min(dist_m),
            velocity_ms: self.direction * velocity_ms.min(self.peak_velocity_ms),
        }
    }

    /// Whether the profile has reached the goal at `elapsed_s`.
    pub fn is_finished(&self, elapsed_s: f64) -> bool {
        elapsed_s >= self.total_time_s
    }

    /// Total duration of the profile.
    ///
    /// Units: seconds
    pub fn total_time_s(&self) -> f64 {
        self.total_time_s
    }

    pub fn goal_m(&self) -> f64 {
        self.goal_m
    }

    pub fn constraints(&self) -> Constraints {
        self.constraints
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn profile(goal_m: f64) -> TrapezoidProfile {
        TrapezoidProfile::new(Constraints::new(2.0, 4.0), goal_m).unwrap()
    }

    #[test]
    fn test_starts_at_rest() {
        let p = profile(3.0);
        assert_eq!(p.calculate(0.0), ProfileState::default());
        assert_eq!(p.calculate(-1.0), ProfileState::default());
    }

    #[test]
    fn test_trapezoidal_phases() {
        // 0.5 s accelerating over 0.5 m, 1.0 s cruising over 2 m, 0.5 s
        // decelerating over 0.5 m
        let p = profile(3.0);
        assert!((p.total_time_s() - 2.0).abs() < EPS);

        let s = p.calculate(0.25);
        assert!((s.position_m - 0.125).abs() < EPS);
        assert!((s.velocity_ms - 1.0).abs() < EPS);

        let s = p.calculate(1.0);
        assert!((s.position_m - 1.5).abs() < EPS);
        assert!((s.velocity_ms - 2.0).abs() < EPS);

        let s = p.calculate(1.75);
        assert!((s.position_m - 2.875).abs() < EPS);
        assert!((s.velocity_ms - 1.0).abs() < EPS);
    }

    #[test]
    fn test_triangular() {
        // Full speed would need 1 m, so a 0.5 m move never cruises
        let p = profile(0.5);
        let accel_time_s = (0.5f64 / 4.0).sqrt();
        assert!((p.total_time_s() - 2.0 * accel_time_s).abs() < EPS);

        let peak = p.calculate(accel_time_s);
        assert!((peak.position_m - 0.25).abs() < EPS);
        assert!((peak.velocity_ms - 4.0 * accel_time_s).abs() < EPS);
        assert!(peak.velocity_ms < 2.0);
    }

    #[test]
    fn test_settles_at_goal() {
        let p = profile(3.0);
        for t in &[2.0, 2.5, 100.0] {
            let s = p.calculate(*t);
            assert_eq!(s.position_m, 3.0);
            assert_eq!(s.velocity_ms, 0.0);
            assert!(p.is_finished(*t));
        }
        assert!(!p.is_finished(1.99));
    }

    #[test]
    fn test_bounded_and_monotonic() {
        let p = profile(4.2426);
        let mut last = 0.0;
        for i in 0..500 {
            let s = p.calculate(i as f64 * 0.01);
            assert!(s.position_m >= last - EPS);
            assert!(s.position_m <= 4.2426 + EPS);
            assert!(s.velocity_ms <= 2.0 + EPS);
            assert!(s.velocity_ms >= 0.0);
            last = s.position_m;
        }
    }

    #[test]
    fn test_pure_function_of_time() {
        let p = profile(3.0);
        let late = p.calculate(1.3);
        let _ = p.calculate(0.1);
        assert_eq!(p.calculate(1.3), late);
    }

    #[test]
    fn test_negative_goal() {
        let p = profile(-3.0);
        let s = p.calculate(1.0);
        assert!((s.position_m + 1.5).abs() < EPS);
        assert!((s.velocity_ms + 2.0).abs() < EPS);
        assert_eq!(p.calculate(5.0).position_m, -3.0);
    }

    #[test]
    fn test_zero_goal() {
        let p = profile(0.0);
        assert_eq!(p.total_time_s(), 0.0);
        assert_eq!(p.calculate(1.0), ProfileState::default());
    }

    #[test]
    fn test_invalid_constraints() {
        assert_eq!(
            TrapezoidProfile::new(Constraints::new(0.0, 1.0), 1.0).unwrap_err(),
            ProfileError::InvalidMaxVelocity(0.0)
        );
        assert_eq!(
            TrapezoidProfile::new(Constraints::new(1.0, -1.0), 1.0).unwrap_err(),
            ProfileError::InvalidMaxAccel(-1.0)
        );
        assert!(matches!(
            TrapezoidProfile::new(Constraints::new(1.0, 1.0), f64::NAN),
            Err(ProfileError::InvalidGoal(_))
        ));
    }
}
