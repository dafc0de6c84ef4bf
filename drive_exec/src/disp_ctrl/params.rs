//! Displacement control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use crate::profile::Constraints;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for displacement control
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Params {
    /// Distance controller proportional gain
    pub k_p: f64,

    /// Distance controller integral gain
    pub k_i: f64,

    /// Distance controller derivative gain
    pub k_d: f64,

    /// If true the profile's velocity setpoint is added to the controller
    /// output, scaled by `k_v`.
    #[serde(default)]
    pub feed_forward: bool,

    /// Velocity feed-forward gain, converts a velocity setpoint into a
    /// normalised drive demand. Defaults to unit gain.
    ///
    /// Units: seconds/meter
    #[serde(default = "default_k_v")]
    pub k_v: f64,

    /// The command is finished when the travelled distance is within this
    /// band of the target.
    ///
    /// Units: meters
    pub tolerance_m: f64,

    /// Maximum velocity of the motion profile.
    ///
    /// Units: meters/second
    pub max_velocity_ms: f64,

    /// Maximum acceleration of the motion profile.
    ///
    /// Units: meters/second^2
    pub max_accel_mss: f64,

    /// Absolute limit on the integral accumulation. Zero or less disables the
    /// limit.
    ///
    /// Units: meter.seconds
    pub integral_limit: f64,

    /// Absolute limit on the controller output, which is the demand on the
    /// dominant drive axis. Zero or less disables the limit.
    pub output_limit: f64,

    /// Number of consecutive cycles the distance must move away from the
    /// target before the tracking is reported as diverging.
    pub divergence_cycles: u64,

    /// Number of cycles after which a command which has not finished is
    /// reported as overrunning. Zero disables the check.
    pub cycle_limit: u64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// The motion profile constraints.
    pub fn constraints(&self) -> Constraints {
        Constraints::new(self.max_velocity_ms, self.max_accel_mss)
    }

    /// Check that the parameters describe a usable controller.
    pub fn validate(&self) -> Result<(), String> {
        let gains = [
            ("k_p", self.k_p),
            ("k_i", self.k_i),
            ("k_d", self.k_d),
            ("k_v", self.k_v),
            ("integral_limit", self.integral_limit),
            ("output_limit", self.output_limit),
        ];
        for (name, value) in gains.iter() {
            if !value.is_finite() {
                return Err(format!("{} must be finite, found {}", name, value));
            }
        }

        if !(self.tolerance_m.is_finite() && self.tolerance_m > 0.0) {
            return Err(format!(
                "tolerance_m must be positive, found {}",
                self.tolerance_m
            ));
        }

        if self.feed_forward && self.k_v == 0.0 {
            return Err(String::from(
                "feed_forward is enabled but k_v is zero, the feed-forward term would do nothing",
            ));
        }

        self.constraints().validate().map_err(|e| e.to_string())
    }
}

fn default_k_v() -> f64 {
    1.0
}

impl Default for Params {
    fn default() -> Self {
        Self {
            k_p: 1.2,
            k_i: 0.15,
            k_d: 0.0,
            feed_forward: false,
            k_v: default_k_v(),
            tolerance_m: 0.10,
            max_velocity_ms: 2.0,
            max_accel_mss: 2.0,
            integral_limit: 1.0,
            output_limit: 1.0,
            divergence_cycles: 10,
            cycle_limit: 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(Params::default().validate(), Ok(()));
    }

    #[test]
    fn test_invalid_tolerance() {
        let params = Params {
            tolerance_m: 0.0,
            ..Params::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_invalid_constraints() {
        let params = Params {
            max_accel_mss: 0.0,
            ..Params::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_feed_forward_needs_gain() {
        let params = Params {
            feed_forward: true,
            k_v: 0.0,
            ..Params::default()
        };
        assert!(params.validate().is_err());

        let params = Params {
            feed_forward: true,
            ..Params::default()
        };
        assert_eq!(params.validate(), Ok(()));
    }

    #[test]
    fn test_feed_forward_from_toml_defaults_gain() {
        let params: Params = util::params::from_str(
            r#"
            k_p = 1.2
            k_i = 0.15
            k_d = 0.0
            feed_forward = true
            tolerance_m = 0.1
            max_velocity_ms = 2.0
            max_accel_mss = 2.0
            integral_limit = 1.0
            output_limit = 1.0
            divergence_cycles = 10
            cycle_limit = 500
            "#,
        )
        .unwrap();
        assert_eq!(params.k_v, 1.0);
        assert_eq!(params.validate(), Ok(()));
    }

    #[test]
    fn test_from_toml() {
        let params: Params = util::params::from_str(
            r#"
            k_p = 1.2
            k_i = 0.15
            k_d = 0.0
            tolerance_m = 0.1
            max_velocity_ms = 2.0
            max_accel_mss = 2.0
            integral_limit = 1.0
            output_limit = 1.0
            divergence_cycles = 10
            cycle_limit = 500
            "#,
        )
        .unwrap();
        assert_eq!(params, Params::default());
    }
}
