//! Displacement control module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace, warn};
use serde::Serialize;

// Internal
use super::*;
use crate::eqpt::DriveBase;
use util::module::Command;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Displacement control command.
///
/// Built once per episode from the target, which fixes the goal distance and
/// the axis multipliers for the whole episode.
#[derive(Debug, Clone)]
pub struct DispCtrl {
    pub(crate) params: Params,

    pub(crate) target: Target,

    pub(crate) options: EpisodeOptions,

    /// Straight line distance to the target
    pub(crate) distance_m: f64,

    pub(crate) ratios: AxisRatios,

    pub(crate) controller: ProfiledPid,

    pub(crate) mode: Mode,

    /// State of the running episode, `None` until setup
    pub(crate) state: Option<ControlState>,
}

/// Mutable state of one episode.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ControlState {
    /// Number of cycles executed
    pub iterations: u64,

    /// Scheduler time at setup
    ///
    /// Units: seconds
    pub start_time_s: f64,

    /// Units: meters
    pub setpoint_m: f64,

    /// Magnitude of the distance travelled on the last cycle
    ///
    /// Units: meters
    pub measurement_m: f64,

    /// Controller position error on the last cycle
    ///
    /// Units: meters
    pub error_m: f64,

    /// True if setup switched the drive base to field oriented
    pub field_oriented_toggled: bool,

    /// Distance left to the target on the last cycle
    pub(crate) prev_remaining_m: Option<f64>,

    /// Number of consecutive cycles the remaining distance has grown
    pub(crate) receding_cycles: u64,
}

/// The status report for one cycle of processing.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusReport {
    /// Units: seconds
    pub time_s: f64,

    pub iteration: u64,

    /// Units: meters
    pub setpoint_m: f64,

    /// Units: meters/second
    pub setpoint_velocity_ms: f64,

    /// Units: meters
    pub measured_m: f64,

    /// Units: meters
    pub error_m: f64,

    /// Scalar controller output, the demand on the dominant axis
    pub output: f64,

    pub axis_x: f64,

    pub axis_y: f64,

    /// Yaw in the swerve convention (positive clockwise)
    ///
    /// Units: degrees
    pub yaw_deg: f64,

    /// The controller's own view of whether it has reached the goal
    pub ctrl_at_goal: bool,

    /// If true the distance has been moving away from the target
    pub diverging: bool,

    /// If true the command has run for more than the configured cycle limit
    pub cycle_limit_exceeded: bool,
}

/// Summary of an episode, produced at teardown.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EpisodeSummary {
    pub target: Target,

    /// Units: meters
    pub target_m: f64,

    /// Units: meters
    pub actual_m: f64,

    /// Signed error as a percentage of the target distance, positive is an
    /// overshoot
    pub error_pct: f64,

    /// Units: degrees
    pub yaw_deg: f64,

    pub iterations: u64,

    /// Units: seconds
    pub elapsed_s: f64,

    pub interrupted: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Lifecycle of the command: `Idle -> Running -> Ended`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mode {
    Idle,
    Running,
    Ended,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DispCtrl {
    /// Create a new command driving to `target`.
    ///
    /// A zero or non-finite target is rejected, as are invalid parameters.
    pub fn new(
        target: Target,
        options: EpisodeOptions,
        params: Params,
    ) -> Result<Self, DispCtrlError> {
        if !target.is_finite() {
            return Err(DispCtrlError::NonFiniteTarget(
                target.distance_x_m,
                target.distance_y_m,
            ));
        }

        let distance_m = target.distance_m();
        if distance_m == 0.0 {
            return Err(DispCtrlError::ZeroDistanceTarget);
        }

        params.validate().map_err(DispCtrlError::InvalidParams)?;

        let ratios = decompose(target.distance_x_m, target.distance_y_m);
        let controller = ProfiledPid::new(&params, distance_m)?;

        info!(
            "DispCtrl: distanceX={:.3}m  distanceY={:.3}m  distance={:.3}m  angle={:.3}r  \
             stop={:?}  brakes={:?}  fieldOriented={:?}",
            target.distance_x_m,
            target.distance_y_m,
            distance_m,
            target.angle_rad(),
            options.stop,
            options.brakes,
            options.field_oriented
        );
        info!(
            "DispCtrl: kP={:.6}  kI={:.6}  kD={:.6}  feedForward={}",
            params.k_p, params.k_i, params.k_d, params.feed_forward
        );

        Ok(Self {
            params,
            target,
            options,
            distance_m,
            ratios,
            controller,
            mode: Mode::Idle,
            state: None,
        })
    }

    /// Drive `distance_x_m` forward and `distance_y_m` left.
    pub fn cartes(
        distance_x_m: f64,
        distance_y_m: f64,
        options: EpisodeOptions,
        params: Params,
    ) -> Result<Self, DispCtrlError> {
        Self::new(Target::cartes(distance_x_m, distance_y_m), options, params)
    }

    /// Drive `distance_m` along `heading_deg`, positive heading is left.
    pub fn polar(
        distance_m: f64,
        heading_deg: f64,
        options: EpisodeOptions,
        params: Params,
    ) -> Result<Self, DispCtrlError> {
        Self::new(Target::polar(distance_m, heading_deg), options, params)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn distance_m(&self) -> f64 {
        self.distance_m
    }

    pub fn ratios(&self) -> AxisRatios {
        self.ratios
    }

    pub fn options(&self) -> EpisodeOptions {
        self.options
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn controller(&self) -> &ProfiledPid {
        &self.controller
    }

    /// State of the current episode, `None` before setup.
    pub fn control_state(&self) -> Option<&ControlState> {
        self.state.as_ref()
    }

    /// Whether the measured distance is inside the tolerance band of the
    /// target distance.
    pub fn within_tolerance(&self, measured_m: f64) -> bool {
        (self.distance_m.abs() - measured_m.abs()).abs() <= self.params.tolerance_m
    }

    /// Run one cycle of control.
    fn tick(
        &mut self,
        drive: &mut dyn DriveBase,
        time_s: f64,
    ) -> Result<StatusReport, DispCtrlError> {
        if self.mode != Mode::Running {
            return Err(DispCtrlError::NotRunning);
        }

        // Invert to the swerve angle convention
        let yaw_deg = -drive.get_yaw()?;
        let measured_m = drive.get_distance_traveled()?.abs();

        let state = self.state.as_mut().ok_or(DispCtrlError::NotRunning)?;

        let output = self
            .controller
            .tick(measured_m, time_s - state.start_time_s);
        let (axis_x, axis_y) = self.ratios.apply(output);

        drive.drive(axis_x, axis_y, 0.0);

        let setpoint = self.controller.setpoint();
        state.iterations += 1;
        state.setpoint_m = setpoint.position_m;
        state.measurement_m = measured_m;
        state.error_m = self.controller.error_m();

        // ---- DIAGNOSTICS ----

        let remaining_m = (self.distance_m - measured_m).abs();
        state.receding_cycles = match state.prev_remaining_m {
            Some(prev) if remaining_m > prev => state.receding_cycles + 1,
            _ => 0,
        };
        state.prev_remaining_m = Some(remaining_m);

        let diverging =
            self.params.divergence_cycles > 0 && state.receding_cycles >= self.params.divergence_cycles;
        if diverging && state.receding_cycles == self.params.divergence_cycles {
            warn!(
                "DispCtrl: distance has moved away from the target for {} cycles \
                 (dist={:.3} m, target={:.3} m)",
                state.receding_cycles, measured_m, self.distance_m
            );
        }

        let cycle_limit_exceeded =
            self.params.cycle_limit > 0 && state.iterations > self.params.cycle_limit;
        if cycle_limit_exceeded && state.iterations == self.params.cycle_limit + 1 {
            warn!(
                "DispCtrl: target not reached after {} cycles (dist={:.3} m, target={:.3} m)",
                self.params.cycle_limit, measured_m, self.distance_m
            );
        }

        trace!(
            "DispCtrl: tg={:.3}  dist={:.3}  sp={:.3}  err={:.3}  yaw={:.2}  out=({:.3}, {:.3})",
            self.distance_m,
            measured_m,
            setpoint.position_m,
            state.error_m,
            yaw_deg,
            axis_x,
            axis_y
        );
        trace!(
            "DispCtrl: traveled distance at iteration {} is {:.3}, want to reach {:.3}",
            state.iterations,
            measured_m,
            self.distance_m
        );

        Ok(StatusReport {
            time_s,
            iteration: state.iterations,
            setpoint_m: setpoint.position_m,
            setpoint_velocity_ms: setpoint.velocity_ms,
            measured_m,
            error_m: state.error_m,
            output,
            axis_x,
            axis_y,
            yaw_deg,
            ctrl_at_goal: self.controller.at_goal(),
            diverging,
            cycle_limit_exceeded,
        })
    }
}

impl Command for DispCtrl {
    type Resource = dyn DriveBase;
    type StatusReport = StatusReport;
    type Summary = EpisodeSummary;
    type Error = DispCtrlError;

    fn init(&mut self, drive: &mut Self::Resource, time_s: f64) -> Result<(), DispCtrlError> {
        self.setup(drive, time_s)
    }

    fn execute(
        &mut self,
        drive: &mut Self::Resource,
        time_s: f64,
    ) -> Result<StatusReport, DispCtrlError> {
        self.tick(drive, time_s)
    }

    /// Finished once the live distance reading is within tolerance of the
    /// target. Before setup the odometry is stale, so an idle command is
    /// never finished.
    fn is_finished(&mut self, drive: &mut Self::Resource) -> Result<bool, DispCtrlError> {
        match self.mode {
            Mode::Idle => Ok(false),
            Mode::Ended => Ok(true),
            Mode::Running => Ok(self.within_tolerance(drive.get_distance_traveled()?)),
        }
    }

    fn end(
        &mut self,
        drive: &mut Self::Resource,
        interrupted: bool,
        time_s: f64,
    ) -> Result<EpisodeSummary, DispCtrlError> {
        self.teardown(drive, interrupted, time_s)
    }
}
