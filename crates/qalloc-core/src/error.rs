//! Error types for qubit id management.
//!
//! Every failing operation reports one [`QubitError`]. Errors fall into
//! three kinds (see [`ErrorKind`]): resource exhaustion, caller misuse of
//! a single id, and unbalanced restricted reuse areas. None are retried
//! internally, and a failed operation leaves the manager unchanged.

use std::error::Error;
use std::fmt;

use crate::id::QubitId;

/// Coarse classification of a [`QubitError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request cannot be met by free ids or by permitted growth.
    CapacityExhausted,
    /// The operation is not legal for the id's current state.
    InvalidOperation,
    /// `end_restricted_reuse_area` was called with only the base area open.
    EmptyStack,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExhausted => write!(f, "capacity exhausted"),
            Self::InvalidOperation => write!(f, "invalid operation"),
            Self::EmptyStack => write!(f, "empty area stack"),
        }
    }
}

/// Errors returned by qubit manager operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QubitError {
    /// Not enough reusable ids, and growth is disabled or would pass the
    /// capacity ceiling.
    CapacityExhausted {
        /// Number of ids the operation asked for.
        requested: u32,
        /// Number of ids that could have been supplied.
        available: u32,
    },
    /// The id does not name a slot of the status table.
    OutOfRange {
        /// The offending id.
        id: QubitId,
        /// Current table capacity.
        capacity: u32,
    },
    /// Release or disable of an id that is not currently allocated.
    NotAllocated {
        /// The offending id.
        id: QubitId,
    },
    /// The id was disabled earlier; disabled ids accept no operation.
    AlreadyDisabled {
        /// The offending id.
        id: QubitId,
    },
    /// The handle mapper could not translate a handle back to an id.
    UnknownHandle,
    /// Attempted to end the base restricted reuse area.
    EmptyAreaStack,
}

impl QubitError {
    /// The taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CapacityExhausted { .. } => ErrorKind::CapacityExhausted,
            Self::OutOfRange { .. }
            | Self::NotAllocated { .. }
            | Self::AlreadyDisabled { .. }
            | Self::UnknownHandle => ErrorKind::InvalidOperation,
            Self::EmptyAreaStack => ErrorKind::EmptyStack,
        }
    }
}

impl fmt::Display for QubitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExhausted {
                requested,
                available,
            } => {
                write!(
                    f,
                    "not enough qubits: requested {requested}, available {available}"
                )
            }
            Self::OutOfRange { id, capacity } => {
                write!(f, "qubit {id} is out of range for capacity {capacity}")
            }
            Self::NotAllocated { id } => write!(f, "qubit {id} is not allocated"),
            Self::AlreadyDisabled { id } => write!(f, "qubit {id} is disabled"),
            Self::UnknownHandle => write!(f, "handle does not map to a qubit id"),
            Self::EmptyAreaStack => {
                write!(f, "cannot end the base restricted reuse area")
            }
        }
    }
}

impl Error for QubitError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        let exhausted = QubitError::CapacityExhausted {
            requested: 3,
            available: 1,
        };
        assert_eq!(exhausted.kind(), ErrorKind::CapacityExhausted);
        assert_eq!(
            QubitError::NotAllocated { id: QubitId(1) }.kind(),
            ErrorKind::InvalidOperation
        );
        assert_eq!(
            QubitError::AlreadyDisabled { id: QubitId(1) }.kind(),
            ErrorKind::InvalidOperation
        );
        assert_eq!(
            QubitError::OutOfRange {
                id: QubitId(9),
                capacity: 8
            }
            .kind(),
            ErrorKind::InvalidOperation
        );
        assert_eq!(QubitError::UnknownHandle.kind(), ErrorKind::InvalidOperation);
        assert_eq!(QubitError::EmptyAreaStack.kind(), ErrorKind::EmptyStack);
    }

    #[test]
    fn display_names_the_id() {
        let e = QubitError::NotAllocated { id: QubitId(5) };
        assert_eq!(e.to_string(), "qubit q5 is not allocated");
        let e = QubitError::CapacityExhausted {
            requested: 4,
            available: 2,
        };
        assert_eq!(e.to_string(), "not enough qubits: requested 4, available 2");
    }
}
