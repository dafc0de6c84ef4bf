//! Targets and options for a displacement command

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A displacement to drive, in the robot (or field) frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Distance along the X axis, positive is forward.
    ///
    /// Units: meters
    pub distance_x_m: f64,

    /// Distance along the Y axis, positive is left.
    ///
    /// Units: meters
    pub distance_y_m: f64,
}

/// Per-episode options chosen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeOptions {
    pub stop: StopMotors,
    pub brakes: Brakes,
    pub field_oriented: FieldOriented,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Whether to stop the motors when the command ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopMotors {
    DontStop,
    Stop,
}

/// Brake mode to set at the start of the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Brakes {
    Off,
    On,
}

/// Whether to drive relative to the field for the duration of the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldOriented {
    Off,
    On,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Target {
    /// A target given as cartesian distances.
    pub fn cartes(distance_x_m: f64, distance_y_m: f64) -> Self {
        Self {
            distance_x_m,
            distance_y_m,
        }
    }

    /// A target given as a distance along a heading, positive heading is to
    /// the left of the X axis.
    pub fn polar(distance_m: f64, heading_deg: f64) -> Self {
        let heading_rad = heading_deg.to_radians();

        Self {
            distance_x_m: distance_m * heading_rad.cos(),
            distance_y_m: distance_m * heading_rad.sin(),
        }
    }

    pub fn as_vector(&self) -> Vector2<f64> {
        Vector2::new(self.distance_x_m, self.distance_y_m)
    }

    /// Straight line distance to the target.
    ///
    /// Units: meters
    pub fn distance_m(&self) -> f64 {
        self.as_vector().norm()
    }

    /// Angle of the target from the X axis.
    ///
    /// Units: radians
    pub fn angle_rad(&self) -> f64 {
        self.distance_y_m.atan2(self.distance_x_m)
    }

    pub fn is_finite(&self) -> bool {
        self.distance_x_m.is_finite() && self.distance_y_m.is_finite()
    }
}

impl Default for EpisodeOptions {
    fn default() -> Self {
        Self {
            stop: StopMotors::Stop,
            brakes: Brakes::On,
            field_oriented: FieldOriented::Off,
        }
    }
}

impl From<bool> for StopMotors {
    fn from(stop: bool) -> Self {
        if stop {
            StopMotors::Stop
        } else {
            StopMotors::DontStop
        }
    }
}

impl From<bool> for Brakes {
    fn from(on: bool) -> Self {
        if on {
            Brakes::On
        } else {
            Brakes::Off
        }
    }
}

impl From<bool> for FieldOriented {
    fn from(on: bool) -> Self {
        if on {
            FieldOriented::On
        } else {
            FieldOriented::Off
        }
    }
}
