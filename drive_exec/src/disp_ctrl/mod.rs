//! # Displacement control module
//!
//! Displacement control drives an omnidirectional drive base along a
//! straight line to a target displacement `(x, y)`.
//!
//! The distance along the line is controlled by a PID controller tracking
//! the setpoint of a trapezoidal motion profile, so the drive base
//! accelerates smoothly, cruises and then decelerates to a stop at the
//! target. The measured quantity is the cumulative distance travelled
//! reported by the drive base odometry.
//!
//! The controller's scalar output is split between the X and Y drive axes by
//! a pair of multipliers computed once from the target, keeping the commanded
//! motion on the line to the target. No rotation is commanded.
//!
//! The command is finished when the travelled distance is within the
//! tolerance band of the target distance. This is evaluated on the live
//! odometry reading rather than on the controller's own error, which lags
//! the measurement by a cycle and depends on the cycle rate.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod controllers;
pub mod decompose;
mod lifecycle;
pub mod params;
pub mod state;
pub mod target;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use controllers::*;
pub use decompose::*;
pub use params::Params;
pub use state::*;
pub use target::*;

use crate::eqpt::EqptError;
use crate::profile::ProfileError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during DispCtrl operation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DispCtrlError {
    #[error("Cannot drive to a zero distance target")]
    ZeroDistanceTarget,

    #[error("The target must be finite, found ({0}, {1})")]
    NonFiniteTarget(f64, f64),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Cannot build the motion profile: {0}")]
    Profile(#[from] ProfileError),

    #[error("Equipment fault: {0}")]
    Eqpt(#[from] EqptError),

    #[error("The command is not running")]
    NotRunning,

    #[error("The command has already been started")]
    AlreadyStarted,

    #[error("The command has already ended")]
    AlreadyEnded,
}
