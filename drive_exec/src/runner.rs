//! # Episode runner
//!
//! Runs a drive command at a fixed period until it finishes or is
//! interrupted, always finishing with the command's teardown. Time is
//! simulated time (cycle count times the period) so runs are repeatable; in
//! realtime mode each cycle is additionally padded out to the period.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};
use std::thread;
use std::time::{Duration, Instant};

// Internal
use crate::eqpt::DriveBase;
use util::module::Command;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerParams {
    /// Target period of one cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// If true cycles are throttled to the period in wall clock time.
    pub realtime: bool,

    /// Interrupt the command if it has not finished after this long.
    ///
    /// Units: seconds
    pub timeout_s: Option<f64>,
}

/// The result of running a command to its end.
#[derive(Debug, Clone)]
pub struct Outcome<S> {
    pub summary: S,

    /// Number of cycles executed
    pub num_cycles: u64,

    /// True if the command was ended before it finished
    pub interrupted: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while running a command.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError<E: Debug + Display> {
    #[error("The cycle period must be positive, found {0} s")]
    InvalidPeriod(f64),

    #[error("The command failed to start: {0}")]
    Init(E),

    #[error("The command failed on cycle {cycle}: {error}")]
    Execute { cycle: u64, error: E },

    #[error("The command failed to end: {0}")]
    End(E),
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A drive base whose state evolves with time.
///
/// Hardware advances on its own so its step does nothing, simulations
/// integrate their model over the step.
pub trait Plant {
    fn step(&mut self, dt_s: f64);
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Run `cmd` against `drive` until it finishes or the timeout is reached.
///
/// Each cycle the command is executed, its status report passed to
/// `on_report`, its completion checked, and then the drive base stepped by
/// one period. If any stage of the command fails the command is still ended
/// (as interrupted) before the error is returned.
pub fn run_episode<C, D, F>(
    cmd: &mut C,
    drive: &mut D,
    params: &RunnerParams,
    mut on_report: F,
) -> Result<Outcome<C::Summary>, RunnerError<C::Error>>
where
    C: Command<Resource = dyn DriveBase>,
    C::Error: Debug + Display,
    D: DriveBase + Plant + 'static,
    F: FnMut(&C::StatusReport),
{
    let period_s = params.cycle_period_s;
    if !(period_s.is_finite() && period_s > 0.0) {
        return Err(RunnerError::InvalidPeriod(period_s));
    }

    cmd.init(drive, 0.0).map_err(RunnerError::Init)?;

    info!("Command started");

    let mut num_cycles: u64 = 0;

    let interrupted = loop {
        let cycle_start_instant = Instant::now();
        let time_s = num_cycles as f64 * period_s;

        if let Some(timeout_s) = params.timeout_s {
            if time_s >= timeout_s {
                warn!("Command timed out after {:.3} s, interrupting", time_s);
                break true;
            }
        }

        let cycle_result = match cmd.execute(drive, time_s) {
            Ok(report) => {
                on_report(&report);
                cmd.is_finished(drive)
            }
            Err(e) => Err(e),
        };

        num_cycles += 1;

        match cycle_result {
            Ok(true) => break false,
            Ok(false) => (),
            Err(e) => {
                error!("Command failed on cycle {}: {}", num_cycles, e);

                if let Err(end_err) = cmd.end(drive, true, time_s) {
                    warn!("Error while ending the failed command: {}", end_err);
                }

                return Err(RunnerError::Execute {
                    cycle: num_cycles,
                    error: e,
                });
            }
        }

        drive.step(period_s);

        // ---- CYCLE MANAGEMENT ----

        if params.realtime {
            let cycle_dur = Instant::now() - cycle_start_instant;

            match Duration::from_secs_f64(period_s).checked_sub(cycle_dur) {
                Some(d) => thread::sleep(d),
                None => warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - period_s
                ),
            }
        }
    };

    let end_time_s = num_cycles as f64 * period_s;
    let summary = cmd
        .end(drive, interrupted, end_time_s)
        .map_err(RunnerError::End)?;

    info!(
        "Command ended after {} cycles (interrupted={})",
        num_cycles, interrupted
    );

    Ok(Outcome {
        summary,
        num_cycles,
        interrupted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disp_ctrl::{
        Brakes, DispCtrl, DispCtrlError, EpisodeOptions, FieldOriented, Mode, Params, StopMotors,
    };
    use crate::eqpt::mock::MockDriveBase;
    use crate::eqpt::Drivetrain;
    use crate::sim_drive::{self, SimDriveBase};

    impl Plant for MockDriveBase {
        fn step(&mut self, _dt_s: f64) {}
    }

    fn runner_params(timeout_s: Option<f64>) -> RunnerParams {
        RunnerParams {
            cycle_period_s: 0.02,
            realtime: false,
            timeout_s,
        }
    }

    #[test]
    fn test_runs_to_target() {
        let options = EpisodeOptions {
            stop: StopMotors::Stop,
            brakes: Brakes::On,
            field_oriented: FieldOriented::On,
        };
        let mut cmd = DispCtrl::cartes(3.0, 3.0, options, Params::default()).unwrap();
        let mut sim = SimDriveBase::new(sim_drive::Params {
            initial_distance_m: 12.0,
            ..sim_drive::Params::default()
        });

        let mut reports = vec![];
        let outcome = run_episode(&mut cmd, &mut sim, &runner_params(Some(30.0)), |r| {
            reports.push(*r)
        })
        .unwrap();

        assert!(!outcome.interrupted);
        assert!(outcome.summary.error_pct.abs() < 100.0 * 0.10 / cmd.distance_m());
        assert_eq!(outcome.num_cycles as usize, reports.len());
        assert_eq!(cmd.mode(), Mode::Ended);

        // Stayed on the diagonal with the frame restored
        let pos = sim.position_m();
        assert!((pos[0] - pos[1]).abs() < 1e-9);
        assert!(!sim.get_field_oriented());
        assert_eq!(sim.num_stops, 1);
        assert!(reports.iter().all(|r| r.axis_x == r.axis_y));
    }

    #[test]
    fn test_timeout_interrupts() {
        let mut cmd =
            DispCtrl::cartes(2.0, 0.0, EpisodeOptions::default(), Params::default()).unwrap();

        // Odometry never moves
        let mut drive = MockDriveBase::default();
        let outcome = run_episode(&mut cmd, &mut drive, &runner_params(Some(1.0)), |_| ()).unwrap();

        assert!(outcome.interrupted);
        assert!(outcome.summary.interrupted);
        assert_eq!(outcome.num_cycles, 50);
        assert_eq!(drive.stop_calls, 1);
    }

    #[test]
    fn test_fault_ends_command() {
        let options = EpisodeOptions {
            field_oriented: FieldOriented::On,
            ..EpisodeOptions::default()
        };
        let mut cmd = DispCtrl::cartes(2.0, 0.0, options, Params::default()).unwrap();
        let mut drive = MockDriveBase {
            distance_fault: true,
            ..MockDriveBase::default()
        };
        let res = run_episode(&mut cmd, &mut drive, &runner_params(None), |_| ());

        assert!(matches!(
            res,
            Err(RunnerError::Execute {
                cycle: 1,
                error: DispCtrlError::Eqpt(_)
            })
        ));
        assert_eq!(cmd.mode(), Mode::Ended);
        assert_eq!(drive.stop_calls, 1);
        assert!(!drive.field_oriented);
    }

    #[test]
    fn test_invalid_period() {
        let mut cmd =
            DispCtrl::cartes(2.0, 0.0, EpisodeOptions::default(), Params::default()).unwrap();
        let mut drive = MockDriveBase::default();
        let params = RunnerParams {
            cycle_period_s: 0.0,
            realtime: false,
            timeout_s: None,
        };

        assert!(matches!(
            run_episode(&mut cmd, &mut drive, &params, |_| ()),
            Err(RunnerError::InvalidPeriod(_))
        ));
        assert_eq!(cmd.mode(), Mode::Idle);
    }
}
