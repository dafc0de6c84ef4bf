//! # Equipment interfaces
//!
//! The drive base is owned by the surrounding system. Commands borrow it for
//! each lifecycle call through these traits, so the compiler guarantees that
//! only one command drives it at a time.

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Faults reported by a piece of equipment.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EqptError {
    #[error("The distance sensor reported a fault: {0}")]
    DistanceSensorFault(String),

    #[error("The heading sensor reported a fault: {0}")]
    HeadingSensorFault(String),
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// An omnidirectional (e.g. swerve) drivetrain.
pub trait Drivetrain {
    /// Drive with normalised axis demands in `[-1, 1]`.
    ///
    /// `x` is forward, `y` is left and `rotation` is counter-clockwise.
    fn drive(&mut self, x: f64, y: f64, rotation: f64);

    /// Make the motors resist motion (`true`) or coast (`false`) when stopped.
    fn set_brake_mode(&mut self, on: bool);

    /// Stop all motors.
    fn stop(&mut self);

    /// Whether demands are currently interpreted relative to the field.
    fn get_field_oriented(&self) -> bool;

    /// Switch between robot-relative and field-relative demands.
    fn toggle_field_oriented(&mut self);
}

/// Odometry reporting the distance travelled since the last reset.
pub trait DistanceSensor {
    /// Cumulative distance travelled since the last reset, in meters.
    fn get_distance_traveled(&self) -> Result<f64, EqptError>;

    /// Reset the cumulative distance to zero.
    fn reset_distance_traveled(&mut self);
}

/// Yaw sensor (e.g. an IMU).
pub trait HeadingSensor {
    /// Current yaw in degrees, positive counter-clockwise.
    fn get_yaw(&self) -> Result<f64, EqptError>;

    /// Reset the yaw to zero.
    fn reset_yaw(&mut self);
}

/// Everything a displacement command needs from the drive base.
pub trait DriveBase: Drivetrain + DistanceSensor + HeadingSensor {}

impl<T> DriveBase for T where T: Drivetrain + DistanceSensor + HeadingSensor {}

// ---------------------------------------------------------------------------
// TEST EQUIPMENT
// ---------------------------------------------------------------------------

/// A drive base which records every call made to it.
#[cfg(test)]
pub(crate) mod mock {
    use super::*;

    #[derive(Debug, Default)]
    pub struct MockDriveBase {
        pub distance_m: f64,
        pub yaw_deg: f64,
        pub field_oriented: bool,
        pub brake_mode: Option<bool>,
        pub distance_fault: bool,

        pub drive_calls: Vec<(f64, f64, f64)>,
        pub stop_calls: usize,
        pub toggle_calls: usize,
        pub distance_resets: usize,
        pub yaw_resets: usize,
    }

    impl Drivetrain for MockDriveBase {
        fn drive(&mut self, x: f64, y: f64, rotation: f64) {
            self.drive_calls.push((x, y, rotation));
        }

        fn set_brake_mode(&mut self, on: bool) {
            self.brake_mode = Some(on);
        }

        fn stop(&mut self) {
            self.stop_calls += 1;
        }

        fn get_field_oriented(&self) -> bool {
            self.field_oriented
        }

        fn toggle_field_oriented(&mut self) {
            self.toggle_calls += 1;
            self.field_oriented = !self.field_oriented;
        }
    }

    impl DistanceSensor for MockDriveBase {
        fn get_distance_traveled(&self) -> Result<f64, EqptError> {
            if self.distance_fault {
                Err(EqptError::DistanceSensorFault("mock fault".into()))
            } else {
                Ok(self.distance_m)
            }
        }

        fn reset_distance_traveled(&mut self) {
            self.distance_resets += 1;
            self.distance_m = 0.0;
        }
    }

    impl HeadingSensor for MockDriveBase {
        fn get_yaw(&self) -> Result<f64, EqptError> {
            Ok(self.yaw_deg)
        }

        fn reset_yaw(&mut self) {
            self.yaw_resets += 1;
            self.yaw_deg = 0.0;
        }
    }
}
