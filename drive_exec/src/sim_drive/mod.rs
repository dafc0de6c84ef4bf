//! # Simulated drive base
//!
//! A kinematic model of a swerve drive base used to run displacement
//! commands without hardware. The wheel velocity follows the normalised
//! demand with a first order lag and the odometry integrates the distance
//! travelled along the ground.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, trace};
use nalgebra::Vector2;
use serde::Serialize;

pub use params::Params;

use crate::eqpt::{DistanceSensor, Drivetrain, EqptError, HeadingSensor};
use crate::runner::Plant;
use util::maths::clamp_abs;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Simulated drive base state.
#[derive(Debug, Clone, Serialize)]
pub struct SimDriveBase {
    #[serde(skip)]
    params: Params,

    /// Normalised demand along the X and Y axes
    demand: Vector2<f64>,

    /// Demanded rotation rate, not simulated
    rotation_demand: f64,

    /// Current velocity
    ///
    /// Units: meters/second
    velocity_ms: Vector2<f64>,

    /// Position since the start of the simulation
    ///
    /// Units: meters
    position_m: Vector2<f64>,

    /// Distance travelled since the last odometry reset
    ///
    /// Units: meters
    distance_m: f64,

    /// Units: degrees
    yaw_deg: f64,

    brake_mode: bool,

    field_oriented: bool,

    /// Number of calls to `stop`
    pub num_stops: u64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimDriveBase {
    pub fn new(params: Params) -> Self {
        Self {
            demand: Vector2::zeros(),
            rotation_demand: 0.0,
            velocity_ms: Vector2::zeros(),
            position_m: Vector2::zeros(),
            distance_m: params.initial_distance_m,
            yaw_deg: params.initial_yaw_deg,
            brake_mode: false,
            field_oriented: false,
            num_stops: 0,
            params,
        }
    }

    /// Advance the simulation by `dt_s` seconds.
    pub fn step(&mut self, dt_s: f64) {
        if dt_s <= 0.0 {
            return;
        }

        let target_ms = self.demand * self.params.max_wheel_speed_ms;

        // Exact discretisation of the first order lag
        let alpha = if self.params.response_time_s > 0.0 {
            1.0 - (-dt_s / self.params.response_time_s).exp()
        } else {
            1.0
        };

        let prev_velocity_ms = self.velocity_ms;
        self.velocity_ms += (target_ms - self.velocity_ms) * alpha;

        // Trapezoidal integration of the velocity
        let step_m = (prev_velocity_ms + self.velocity_ms) * 0.5 * dt_s;
        self.position_m += step_m;
        self.distance_m += step_m.norm();

        trace!(
            "SimDriveBase: vel=({:.3}, {:.3}) m/s  pos=({:.3}, {:.3}) m  dist={:.3} m",
            self.velocity_ms[0],
            self.velocity_ms[1],
            self.position_m[0],
            self.position_m[1],
            self.distance_m
        );
    }

    /// Position since the start of the simulation.
    ///
    /// Units: meters
    pub fn position_m(&self) -> Vector2<f64> {
        self.position_m
    }

    pub fn velocity_ms(&self) -> Vector2<f64> {
        self.velocity_ms
    }

    pub fn brake_mode(&self) -> bool {
        self.brake_mode
    }
}

impl Plant for SimDriveBase {
    fn step(&mut self, dt_s: f64) {
        SimDriveBase::step(self, dt_s)
    }
}

impl Drivetrain for SimDriveBase {
    fn drive(&mut self, x: f64, y: f64, rotation: f64) {
        self.demand = Vector2::new(clamp_abs(x, 1.0), clamp_abs(y, 1.0));
        self.rotation_demand = clamp_abs(rotation, 1.0);
    }

    fn set_brake_mode(&mut self, on: bool) {
        debug!("SimDriveBase: brake mode {}", on);
        self.brake_mode = on;
    }

    fn stop(&mut self) {
        self.num_stops += 1;
        self.demand = Vector2::zeros();
        self.rotation_demand = 0.0;

        // Braked wheels lock up, coasting ones keep rolling down through the
        // lag
        if self.brake_mode {
            self.velocity_ms = Vector2::zeros();
        }
    }

    fn get_field_oriented(&self) -> bool {
        self.field_oriented
    }

    fn toggle_field_oriented(&mut self) {
        self.field_oriented = !self.field_oriented;
        debug!("SimDriveBase: field oriented {}", self.field_oriented);
    }
}

impl DistanceSensor for SimDriveBase {
    fn get_distance_traveled(&self) -> Result<f64, EqptError> {
        if self.distance_m.is_finite() {
            Ok(self.distance_m)
        } else {
            Err(EqptError::DistanceSensorFault(format!(
                "non-finite distance {}",
                self.distance_m
            )))
        }
    }

    fn reset_distance_traveled(&mut self) {
        self.distance_m = 0.0;
    }
}

impl HeadingSensor for SimDriveBase {
    fn get_yaw(&self) -> Result<f64, EqptError> {
        Ok(self.yaw_deg)
    }

    fn reset_yaw(&mut self) {
        self.yaw_deg = 0.0;
    }
}
