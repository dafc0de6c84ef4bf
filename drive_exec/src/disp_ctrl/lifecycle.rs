//! Setup and teardown of a displacement control episode
//!
//! Setup must reset the odometry before the first cycle reads it, otherwise a
//! stale distance from a previous command would be taken as progress towards
//! the target. Teardown must undo the reference frame change made by setup,
//! whether the episode finished or was interrupted.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::info;

// Internal
use super::*;
use crate::eqpt::DriveBase;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DispCtrl {
    /// Prepare the drive base and start the episode.
    pub(crate) fn setup(
        &mut self,
        drive: &mut dyn DriveBase,
        time_s: f64,
    ) -> Result<(), DispCtrlError> {
        match self.mode {
            Mode::Idle => (),
            Mode::Running => return Err(DispCtrlError::AlreadyStarted),
            Mode::Ended => return Err(DispCtrlError::AlreadyEnded),
        }

        info!(
            "DispCtrl setup: distanceX={:.3}m  distanceY={:.3}m  distance={:.3}m  \
             stop={:?}  brakes={:?}  fieldOriented={:?}",
            self.target.distance_x_m,
            self.target.distance_y_m,
            self.distance_m,
            self.options.stop,
            self.options.brakes,
            self.options.field_oriented
        );

        drive.set_brake_mode(self.options.brakes == Brakes::On);

        drive.reset_distance_traveled();

        let field_oriented_toggled =
            self.options.field_oriented == FieldOriented::On && !drive.get_field_oriented();
        if field_oriented_toggled {
            drive.toggle_field_oriented();
        }

        drive.reset_yaw();

        self.controller.reset();
        self.state = Some(ControlState {
            start_time_s: time_s,
            field_oriented_toggled,
            ..ControlState::default()
        });
        self.mode = Mode::Running;

        Ok(())
    }

    /// End the episode, leaving the drive base in a consistent state.
    ///
    /// The motors are stopped (if requested) and the reference frame restored
    /// before the sensors are read for the summary, so a sensor fault cannot
    /// skip them.
    pub(crate) fn teardown(
        &mut self,
        drive: &mut dyn DriveBase,
        interrupted: bool,
        time_s: f64,
    ) -> Result<EpisodeSummary, DispCtrlError> {
        match self.mode {
            Mode::Running => (),
            Mode::Idle => return Err(DispCtrlError::NotRunning),
            Mode::Ended => return Err(DispCtrlError::AlreadyEnded),
        }
        self.mode = Mode::Ended;

        info!("DispCtrl end: interrupted={}", interrupted);

        if self.options.stop == StopMotors::Stop {
            drive.stop();
        }

        let state = self.state.unwrap_or_default();

        // Only undo our own toggle, a frame which was already field oriented
        // before the episode stays that way.
        if state.field_oriented_toggled && drive.get_field_oriented() {
            drive.toggle_field_oriented();
        }

        let actual_m = drive.get_distance_traveled()?.abs();
        let yaw_deg = drive.get_yaw()?;

        let target_m = self.distance_m.abs();
        let summary = EpisodeSummary {
            target: self.target,
            target_m,
            actual_m,
            error_pct: (actual_m - target_m) / target_m * 100.0,
            yaw_deg,
            iterations: state.iterations,
            elapsed_s: time_s - state.start_time_s,
            interrupted,
        };

        info!(
            "DispCtrl end: target={:.3}  actual={:.3}  error={:.2} pct  yaw={:.2}",
            summary.target_m, summary.actual_m, summary.error_pct, summary.yaw_deg
        );
        info!(
            "DispCtrl end: iterations={}  elapsed time={:.3}s",
            summary.iterations, summary.elapsed_s
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eqpt::mock::MockDriveBase;
    use util::module::Command;

    fn ctrl(options: EpisodeOptions) -> DispCtrl {
        DispCtrl::cartes(2.0, 1.0, options, Params::default()).unwrap()
    }

    fn options(stop: StopMotors, brakes: Brakes, field_oriented: FieldOriented) -> EpisodeOptions {
        EpisodeOptions {
            stop,
            brakes,
            field_oriented,
        }
    }

    #[test]
    fn test_setup_resets_stale_distance() {
        let mut ctrl = ctrl(EpisodeOptions::default());
        let mut drive = MockDriveBase {
            distance_m: 7.5,
            yaw_deg: 30.0,
            ..MockDriveBase::default()
        };

        ctrl.init(&mut drive, 0.0).unwrap();
        assert_eq!(drive.distance_resets, 1);
        assert_eq!(drive.yaw_resets, 1);

        let report = ctrl.execute(&mut drive, 0.02).unwrap();
        assert_eq!(report.measured_m, 0.0);
        assert_eq!(ctrl.control_state().unwrap().measurement_m, 0.0);
        assert!(!ctrl.is_finished(&mut drive).unwrap());
    }

    #[test]
    fn test_setup_brake_mode() {
        let mut drive = MockDriveBase::default();
        ctrl(options(StopMotors::Stop, Brakes::On, FieldOriented::Off))
            .init(&mut drive, 0.0)
            .unwrap();
        assert_eq!(drive.brake_mode, Some(true));

        ctrl(options(StopMotors::Stop, Brakes::Off, FieldOriented::Off))
            .init(&mut drive, 0.0)
            .unwrap();
        assert_eq!(drive.brake_mode, Some(false));
    }

    #[test]
    fn test_field_oriented_restored_after_finish() {
        let mut ctrl = ctrl(options(StopMotors::Stop, Brakes::On, FieldOriented::On));
        let mut drive = MockDriveBase::default();

        ctrl.init(&mut drive, 0.0).unwrap();
        assert!(drive.field_oriented);

        ctrl.end(&mut drive, false, 1.0).unwrap();
        assert!(!drive.field_oriented);
        assert_eq!(drive.toggle_calls, 2);
    }

    #[test]
    fn test_field_oriented_restored_after_interrupt() {
        let mut ctrl = ctrl(options(StopMotors::DontStop, Brakes::Off, FieldOriented::On));
        let mut drive = MockDriveBase::default();

        ctrl.init(&mut drive, 0.0).unwrap();
        ctrl.execute(&mut drive, 0.02).unwrap();

        let summary = ctrl.end(&mut drive, true, 0.04).unwrap();
        assert!(summary.interrupted);
        assert!(!drive.field_oriented);
    }

    #[test]
    fn test_field_oriented_already_on_is_kept() {
        let mut ctrl = ctrl(options(StopMotors::Stop, Brakes::On, FieldOriented::On));
        let mut drive = MockDriveBase {
            field_oriented: true,
            ..MockDriveBase::default()
        };

        ctrl.init(&mut drive, 0.0).unwrap();
        ctrl.end(&mut drive, true, 1.0).unwrap();
        assert!(drive.field_oriented);
        assert_eq!(drive.toggle_calls, 0);
    }

    #[test]
    fn test_field_oriented_off_never_toggles() {
        let mut ctrl = ctrl(options(StopMotors::Stop, Brakes::On, FieldOriented::Off));
        let mut drive = MockDriveBase::default();

        ctrl.init(&mut drive, 0.0).unwrap();
        ctrl.end(&mut drive, false, 1.0).unwrap();
        assert!(!drive.field_oriented);
        assert_eq!(drive.toggle_calls, 0);
    }

    #[test]
    fn test_dont_stop() {
        let mut ctrl = ctrl(options(StopMotors::DontStop, Brakes::On, FieldOriented::Off));
        let mut drive = MockDriveBase::default();

        ctrl.init(&mut drive, 0.0).unwrap();
        for i in 1..5 {
            ctrl.execute(&mut drive, i as f64 * 0.02).unwrap();
        }
        let num_drive_calls = drive.drive_calls.len();
        ctrl.end(&mut drive, false, 0.1).unwrap();

        assert_eq!(drive.stop_calls, 0);
        assert_eq!(drive.drive_calls.len(), num_drive_calls);
        assert!(!drive.drive_calls.contains(&(0.0, 0.0, 0.0)));
    }

    #[test]
    fn test_summary() {
        let mut ctrl = ctrl(EpisodeOptions::default());
        let mut drive = MockDriveBase::default();

        ctrl.init(&mut drive, 10.0).unwrap();
        for i in 1..=3 {
            ctrl.execute(&mut drive, 10.0 + i as f64 * 0.02).unwrap();
        }
        drive.distance_m = ctrl.distance_m() * 1.1;
        drive.yaw_deg = 2.0;

        let summary = ctrl.end(&mut drive, false, 11.0).unwrap();
        assert_eq!(summary.iterations, 3);
        assert!((summary.elapsed_s - 1.0).abs() < 1e-9);
        assert!((summary.error_pct - 10.0).abs() < 1e-9);
        assert_eq!(summary.yaw_deg, 2.0);
    }

    #[test]
    fn test_lifecycle_order() {
        let mut ctrl = ctrl(EpisodeOptions::default());
        let mut drive = MockDriveBase::default();

        assert_eq!(ctrl.mode(), Mode::Idle);
        assert_eq!(
            ctrl.end(&mut drive, true, 0.0).unwrap_err(),
            DispCtrlError::NotRunning
        );

        ctrl.init(&mut drive, 0.0).unwrap();
        assert_eq!(ctrl.mode(), Mode::Running);
        assert_eq!(
            ctrl.init(&mut drive, 0.0).unwrap_err(),
            DispCtrlError::AlreadyStarted
        );

        ctrl.end(&mut drive, false, 0.0).unwrap();
        assert_eq!(ctrl.mode(), Mode::Ended);
        assert!(ctrl.is_finished(&mut drive).unwrap());

        // Teardown runs exactly once
        assert_eq!(
            ctrl.end(&mut drive, true, 0.0).unwrap_err(),
            DispCtrlError::AlreadyEnded
        );
        assert_eq!(drive.stop_calls, 1);
        assert_eq!(
            ctrl.execute(&mut drive, 0.0).unwrap_err(),
            DispCtrlError::NotRunning
        );
        assert_eq!(
            ctrl.init(&mut drive, 0.0).unwrap_err(),
            DispCtrlError::AlreadyEnded
        );
    }

    #[test]
    fn test_integral_reset_between_setups() {
        let mut drive = MockDriveBase::default();
        let mut first = ctrl(EpisodeOptions::default());
        first.init(&mut drive, 0.0).unwrap();
        for i in 1..50 {
            first.execute(&mut drive, i as f64 * 0.02).unwrap();
        }

        // A clone made mid-episode starts its own episode from a clean
        // controller
        let mut second = first.clone();
        second.mode = Mode::Idle;
        second.init(&mut drive, 0.0).unwrap();

        let mut fresh = ctrl(EpisodeOptions::default());
        fresh.init(&mut drive, 0.0).unwrap();

        let a = second.execute(&mut drive, 0.02).unwrap();
        let b = fresh.execute(&mut drive, 0.02).unwrap();
        assert_eq!(a.output, b.output);
    }
}
