//! # Displacement controllers module
//!
//! This module provides the PID controller used by DispCtrl and the profiled
//! controller which closes the loop on the setpoint of a trapezoidal motion
//! profile.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use serde::Serialize;

// Internal
use super::Params;
use crate::profile::{ProfileError, ProfileState, TrapezoidProfile};
use util::maths::clamp_abs;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PID controller
#[derive(Debug, Serialize, Clone)]
pub struct PidController {
    /// Previous time that the error was passed in
    prev_time_s: Option<f64>,

    /// Proportional gain
    k_p: f64,

    /// Integral gain
    k_i: f64,

    /// Dervative gain
    k_d: f64,

    /// Absolute limit on the integral, disabled if not positive
    integral_limit: f64,

    /// Previous error
    prev_error: Option<f64>,

    /// The integral accumulation
    integral: f64,
}

/// A PID controller tracking the setpoint of a trapezoidal motion profile.
#[derive(Debug, Serialize, Clone)]
pub struct ProfiledPid {
    pid: PidController,

    profile: TrapezoidProfile,

    feed_forward: bool,

    k_v: f64,

    output_limit: f64,

    tolerance_m: f64,

    /// Setpoint sampled on the last tick
    setpoint: ProfileState,

    /// Position error on the last tick
    error_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {
    /// Create a new controller with the given gains.
    pub fn new(k_p: f64, k_i: f64, k_d: f64) -> Self {
        Self {
            k_p,
            k_i,
            k_d,
            integral_limit: 0.0,
            integral: 0f64,
            prev_time_s: None,
            prev_error: None,
        }
    }

    /// Limit the absolute value of the integral accumulation.
    pub fn with_integral_limit(mut self, limit: f64) -> Self {
        self.integral_limit = limit;
        self
    }

    /// Forget the integral and derivative history.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = None;
        self.prev_time_s = None;
    }

    /// Get the value of the controller for the given error at the given time.
    ///
    /// The time step is taken from the previous call, so the controller
    /// follows whatever rate it is ticked at.
    pub fn get(&mut self, error: f64, time_s: f64) -> f64 {
        // Calculate dt, a repeated or backwards time is treated as no step
        let dt = match self.prev_time_s {
            Some(t0) if time_s > t0 => Some(time_s - t0),
            _ => None,
        };

        // Accumulate the integral term.
        //
        // If there's no time difference then we don't accumulate the integral
        // The other option is to add on the error and that will produce a
        // large spike in integral compared to normal operation, so we don't do
        // this.
        if let Some(t) = dt {
            self.integral = clamp_abs(self.integral + error * t, self.integral_limit);
        }

        // Calculate the derivative, again assuming none without a time step
        // or a previous error.
        let deriv = match (self.prev_error, dt) {
            (Some(e), Some(t)) => (error - e) / t,
            _ => 0f64,
        };

        let out = self.k_p * error + self.k_i * self.integral + self.k_d * deriv;

        self.prev_error = Some(error);
        if dt.is_some() || self.prev_time_s.is_none() {
            self.prev_time_s = Some(time_s);
        }

        out
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }
}

impl ProfiledPid {
    /// Create a new profiled controller driving from zero to `goal_m`.
    pub fn new(params: &Params, goal_m: f64) -> Result<Self, ProfileError> {
        Ok(Self {
            pid: PidController::new(params.k_p, params.k_i, params.k_d)
                .with_integral_limit(params.integral_limit),
            profile: TrapezoidProfile::new(params.constraints(), goal_m)?,
            feed_forward: params.feed_forward,
            k_v: params.k_v,
            output_limit: params.output_limit,
            tolerance_m: params.tolerance_m,
            setpoint: ProfileState::default(),
            error_m: 0.0,
        })
    }

    /// Reset the controller ready for a new episode.
    pub fn reset(&mut self) {
        self.pid.reset();
        self.setpoint = ProfileState::default();
        self.error_m = 0.0;
    }

    /// Calculate the output for the measured position, `elapsed_s` seconds
    /// after the start of the profile.
    pub fn tick(&mut self, measured_m: f64, elapsed_s: f64) -> f64 {
        self.setpoint = self.profile.calculate(elapsed_s);
        self.error_m = self.setpoint.position_m - measured_m;

        let mut out = self.pid.get(self.error_m, elapsed_s);

        if self.feed_forward {
            out += self.k_v * self.setpoint.velocity_ms;
        }

        debug!(
            "ProfiledPid: sp={:.3} m vsp={:.3} m/s err={:.3} m int={:.3} out={:.3}",
            self.setpoint.position_m,
            self.setpoint.velocity_ms,
            self.error_m,
            self.pid.integral(),
            out
        );

        clamp_abs(out, self.output_limit)
    }

    /// Setpoint sampled on the last tick.
    pub fn setpoint(&self) -> ProfileState {
        self.setpoint
    }

    /// Position error on the last tick.
    pub fn error_m(&self) -> f64 {
        self.error_m
    }

    /// Whether the last error was inside the tolerance band.
    ///
    /// This only reflects the controller's own bookkeeping, the command's
    /// completion is decided from the live distance measurement.
    pub fn at_goal(&self) -> bool {
        self.error_m.abs() <= self.tolerance_m
    }

    pub fn goal_m(&self) -> f64 {
        self.profile.goal_m()
    }

    pub fn profile(&self) -> &TrapezoidProfile {
        &self.profile
    }
}
