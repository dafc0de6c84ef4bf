//! Axis decomposition
//!
//! Splits the scalar output of the distance controller between the X and Y
//! drive axes so that the commanded motion points along the target
//! displacement. The dominant axis always gets the full output.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;
use util::maths::sign;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Per-axis output multipliers, each in `[-1, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AxisRatios {
    pub multiplier_x: f64,
    pub multiplier_y: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl AxisRatios {
    /// Scale a scalar output into the `(x, y)` axis demands.
    pub fn apply(&self, output: f64) -> (f64, f64) {
        (output * self.multiplier_x, output * self.multiplier_y)
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the axis multipliers for a displacement of `(distance_x_m, distance_y_m)`.
///
/// The larger axis gets a multiplier of `±1`, the other one the ratio of the
/// two distances, both carrying the sign of their distance. A zero
/// displacement gives zero multipliers.
pub fn decompose(distance_x_m: f64, distance_y_m: f64) -> AxisRatios {
    let abs_x = distance_x_m.abs();
    let abs_y = distance_y_m.abs();

    if abs_x == 0.0 && abs_y == 0.0 {
        return AxisRatios::default();
    }

    if abs_x > abs_y {
        AxisRatios {
            multiplier_x: sign(distance_x_m),
            multiplier_y: (abs_y / abs_x) * sign(distance_y_m),
        }
    } else {
        AxisRatios {
            multiplier_x: (abs_x / abs_y) * sign(distance_x_m),
            multiplier_y: sign(distance_y_m),
        }
    }
}
