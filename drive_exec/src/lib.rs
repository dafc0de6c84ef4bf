//! # Drive library.
//!
//! This library allows the drive executable and benchmarks to access items defined inside the
//! drive crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Displacement control module - drives the base a given distance along a fixed direction
pub mod disp_ctrl;

/// Equipment interfaces - the drivetrain and sensors a command acts on
pub mod eqpt;

/// Motion profiles - time parameterised trapezoidal position/velocity setpoints
pub mod profile;

/// Episode runner - runs a command at a fixed period until it finishes
pub mod runner;

/// Simulated drive base - a kinematic stand-in for the hardware
pub mod sim_drive;

/// Executable parameters
pub mod params;
