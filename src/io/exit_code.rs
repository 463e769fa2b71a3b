//! Process exit codes.

/// Exit status of a `zatch` run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Shut down on request
    Success = 0,
    /// No usable directories, or the source could not be set up
    SetupFailed = 1,
    /// The event stream ended without a shutdown request
    UnexpectedReturn = 2,
    /// Standard output could not be written
    OutputFailed = 3,
}

impl ExitCode {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.code())
    }
}
