//! Parameters structure for the simulated drive base

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the simulated drive base.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    /// Wheel speed for a drive demand of 1.
    ///
    /// Units: meters/second
    pub max_wheel_speed_ms: f64,

    /// Time constant of the first order response of the wheels to a demand.
    /// Zero gives an instantaneous response.
    ///
    /// Units: seconds
    pub response_time_s: f64,

    /// Distance reported by the odometry before it is first reset.
    ///
    /// Units: meters
    #[serde(default)]
    pub initial_distance_m: f64,

    /// Yaw reported by the heading sensor before it is first reset.
    ///
    /// Units: degrees
    #[serde(default)]
    pub initial_yaw_deg: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            max_wheel_speed_ms: 3.0,
            response_time_s: 0.1,
            initial_distance_m: 0.0,
            initial_yaw_deg: 0.0,
        }
    }
}
