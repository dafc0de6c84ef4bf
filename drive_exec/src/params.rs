//! # Drive Executable Parameters
//!
//! This module provides parameters for the drive executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::runner::RunnerParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveExecParams {
    /// If true every status report is archived to the session's CSV file
    pub archive_status: bool,

    /// Episode runner parameters
    pub runner: RunnerParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load() {
        let params: DriveExecParams = util::params::from_str(
            r#"
            archive_status = true

            [runner]
            cycle_period_s = 0.02
            realtime = false
            "#,
        )
        .unwrap();

        assert!(params.archive_status);
        assert_eq!(params.runner.cycle_period_s, 0.02);
        assert!(params.runner.timeout_s.is_none());
    }
}
