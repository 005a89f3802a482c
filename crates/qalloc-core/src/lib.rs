//! Core types and traits for the qalloc qubit id allocator.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the qalloc workspace:
//! the [`QubitId`] type and its reserved limits, the error taxonomy, and
//! the [`QubitMapper`] extension point for caller-visible handles.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod traits;

pub use error::{ErrorKind, QubitError};
pub use id::{QubitId, FALLBACK_CAPACITY, MAX_CAPACITY};
pub use traits::{IdentityMapper, QubitMapper};
