//! Drive executable entry point.
//!
//! # Architecture
//!
//! A single displacement episode is run against the simulated drive base:
//!
//!     - Initialise the session and logging
//!     - Load the controller, simulation and executable parameters
//!     - Build the displacement command from the command line target
//!     - Run the episode to completion, archiving each status report
//!     - Save the episode summary to the session

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{error, info, warn};
use structopt::StructOpt;

// Internal
use drive_lib::{
    disp_ctrl::{self, DispCtrl, EpisodeOptions},
    params::DriveExecParams,
    runner::{self, RunnerError},
    sim_drive::{self, SimDriveBase},
};
use util::{
    archive::Archiver,
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Drive the simulated swerve base a given displacement.
#[derive(Debug, StructOpt)]
#[structopt(name = "drive_exec")]
struct Opts {
    /// Stop the motors at the end of the episode.
    #[structopt(long, default_value = "true", parse(try_from_str))]
    stop: bool,

    /// Hold the wheels with the motor brakes rather than letting them coast.
    #[structopt(long, default_value = "true", parse(try_from_str))]
    brakes: bool,

    /// Drive in the field frame rather than the robot frame.
    #[structopt(long)]
    field_oriented: bool,

    /// Log at trace level rather than debug.
    #[structopt(short, long)]
    verbose: bool,

    #[structopt(subcommand)]
    target: TargetCmd,
}

/// The displacement to drive.
#[derive(Debug, Clone, Copy, StructOpt)]
enum TargetCmd {
    /// A displacement given as forward and left distances.
    #[structopt(name = "cartes")]
    Cartes {
        /// Distance forward in meters
        #[structopt(allow_hyphen_values = true)]
        distance_x_m: f64,

        /// Distance to the left in meters
        #[structopt(allow_hyphen_values = true)]
        distance_y_m: f64,
    },

    /// A displacement given as a distance along a heading.
    #[structopt(name = "polar")]
    Polar {
        /// Distance in meters
        #[structopt(allow_hyphen_values = true)]
        distance_m: f64,

        /// Heading in degrees, positive to the left of forward
        #[structopt(allow_hyphen_values = true)]
        heading_deg: f64,
    },
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("drive_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    let level = if opts.verbose {
        LevelFilter::Trace
    } else {
        LevelFilter::Debug
    };
    // The simulation traces every integration step, keep it at debug
    logger_init(level, &[("drive_lib::sim_drive", LevelFilter::Debug)], &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Drive Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    info!("Command line: {:?}", opts);

    // ---- LOAD PARAMETERS ----

    let disp_ctrl_params: disp_ctrl::Params =
        util::params::load("disp_ctrl.toml").wrap_err("Could not load DispCtrl params")?;
    let sim_params: sim_drive::Params =
        util::params::load("sim_drive.toml").wrap_err("Could not load SimDrive params")?;
    let exec_params: DriveExecParams =
        util::params::load("drive_exec.toml").wrap_err("Could not load exec params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE MODULES ----

    let options = EpisodeOptions {
        stop: opts.stop.into(),
        brakes: opts.brakes.into(),
        field_oriented: opts.field_oriented.into(),
    };

    let mut cmd = match opts.target {
        TargetCmd::Cartes {
            distance_x_m,
            distance_y_m,
        } => DispCtrl::cartes(distance_x_m, distance_y_m, options, disp_ctrl_params),
        TargetCmd::Polar {
            distance_m,
            heading_deg,
        } => DispCtrl::polar(distance_m, heading_deg, options, disp_ctrl_params),
    }
    .wrap_err("Failed to create the displacement command")?;

    let mut sim = SimDriveBase::new(sim_params);

    let mut archiver = if exec_params.archive_status {
        Some(
            Archiver::from_path(&session, "disp_ctrl/status_report.csv")
                .wrap_err("Failed to create the status report archive")?,
        )
    } else {
        None
    };

    info!("Module initialisation complete\n");

    // ---- RUN EPISODE ----

    let mut num_archive_errors = 0u64;

    let result = runner::run_episode(&mut cmd, &mut sim, &exec_params.runner, |report| {
        if let Some(ref mut a) = archiver {
            if let Err(e) = a.serialise(report) {
                // Only report the first failure, the rest would be the same
                if num_archive_errors == 0 {
                    warn!("Could not archive the status report: {}", e);
                }
                num_archive_errors += 1;
            }
        }
    });

    if num_archive_errors > 0 {
        warn!("{} status reports could not be archived", num_archive_errors);
    }

    let outcome = match result {
        Ok(o) => o,
        Err(e) => {
            error!("Episode failed: {}", e);
            session.exit();

            return Err(match e {
                RunnerError::InvalidPeriod(_) => eyre!("Invalid runner parameters: {}", e),
                _ => eyre!("Displacement episode failed: {}", e),
            });
        }
    };

    info!(
        "Episode complete: {:.3} m of {:.3} m ({:+.2} %) in {:.3} s, final position ({:.3}, {:.3}) m",
        outcome.summary.actual_m,
        outcome.summary.target_m,
        outcome.summary.error_pct,
        outcome.summary.elapsed_s,
        sim.position_m()[0],
        sim.position_m()[1]
    );

    session.save("disp_ctrl/summary.json", outcome.summary);

    // ---- SHUTDOWN ----

    info!("End of execution");
    session.exit();

    Ok(())
}
