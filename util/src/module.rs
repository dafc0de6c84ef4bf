//! Module interfaces
//!
//! Commands run by an executable's scheduler shall implement the `Command`
//! trait. The scheduler owns the lifecycle: it calls `init` once, then
//! `execute` and `is_finished` once per cycle, and finally `end` exactly once,
//! whether the command finished by itself or was interrupted.

// ---------------------------------------------------------------------------
// COMMAND LIFECYCLE
// ---------------------------------------------------------------------------

/// A cyclically executed command acting on a shared resource.
pub trait Command {
    /// The resource (e.g. a drive base) the command acts on. The resource is
    /// borrowed for each call so only one command can drive it at a time.
    type Resource: ?Sized;

    /// A report on the status of the cyclic processing.
    type StatusReport;

    /// Data produced when the command ends.
    type Summary;

    /// An error which can occur during any stage of the lifecycle.
    type Error;

    /// Prepare the resource and start the command.
    ///
    /// # Inputs
    /// - `resource`: The resource the command acts on.
    /// - `time_s`: The scheduler's time at the start of the command.
    fn init(&mut self, resource: &mut Self::Resource, time_s: f64) -> Result<(), Self::Error>;

    /// Main cyclic processing function.
    ///
    /// # Outputs
    /// - On success the status report for this cycle.
    /// - On error an `Error` instance.
    fn execute(
        &mut self,
        resource: &mut Self::Resource,
        time_s: f64,
    ) -> Result<Self::StatusReport, Self::Error>;

    /// Whether the command has completed and should be ended.
    fn is_finished(&mut self, resource: &mut Self::Resource) -> Result<bool, Self::Error>;

    /// Tear down the command, leaving the resource in a consistent state.
    ///
    /// `interrupted` is true if the scheduler ended the command before
    /// `is_finished` returned true.
    fn end(
        &mut self,
        resource: &mut Self::Resource,
        interrupted: bool,
        time_s: f64,
    ) -> Result<Self::Summary, Self::Error>;
}
