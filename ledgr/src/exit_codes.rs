#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,

    /// Invalid CLI input or malformed JSON (bad flags, invalid durations, syntax errors).
    InvalidInput = 30,

    /// An integer could not be represented under the `safe` int decoding policy.
    PrecisionLoss = 31,

    /// The node could not be reached or answered with an error status.
    RequestFailed = 35,

    /// Internal/runtime error (IO errors, unexpected invariants).
    RuntimeError = 40,
}

impl ExitCode {
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}
