//! C-compatible status codes.
//!
//! [`QallocStatus`] is a `repr(i32)` enum covering every failure the C
//! API can report. Conversion from [`QubitError`] follows the error
//! taxonomy.

use qalloc_core::{ErrorKind, QubitError};

/// C-compatible status code returned by all FFI functions.
///
/// `Ok` = 0, all errors are negative. Values are ABI-stable.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QallocStatus {
    /// Success.
    Ok = 0,
    /// Manager handle is invalid or was already destroyed.
    InvalidHandle = -1,
    /// Not enough free qubits and growth is disabled or exhausted.
    CapacityExhausted = -2,
    /// Release or disable of a qubit in the wrong state, or out of range.
    InvalidOperation = -3,
    /// Ended a restricted reuse area that was never started.
    EmptyStack = -4,
    /// A pointer argument is null.
    InvalidArgument = -5,
    /// Internal error (e.g. poisoned mutex after a prior panic).
    InternalError = -6,
    /// A Rust panic was caught at the FFI boundary.
    Panicked = -128,
}

impl From<&QubitError> for QallocStatus {
    fn from(e: &QubitError) -> Self {
        match e.kind() {
            ErrorKind::CapacityExhausted => QallocStatus::CapacityExhausted,
            ErrorKind::InvalidOperation => QallocStatus::InvalidOperation,
            ErrorKind::EmptyStack => QallocStatus::EmptyStack,
        }
    }
}

impl From<Result<(), QubitError>> for QallocStatus {
    fn from(result: Result<(), QubitError>) -> Self {
        match result {
            Ok(()) => QallocStatus::Ok,
            Err(e) => QallocStatus::from(&e),
        }
    }
}
