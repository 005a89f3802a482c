//! C FFI bindings for the qalloc qubit id allocator.
//!
//! Exposes a C-compatible API for runtimes written in other languages.
//! Managers live in a global handle table and are named by `u64`
//! handles; qubit ids cross the boundary as non-negative `int32_t`.
//! Every entry point returns a [`QallocStatus`] code and catches panics.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

/// Run an FFI body, converting a panic into `QallocStatus::Panicked`.
macro_rules! ffi_guard {
    ($body:block) => {
        match ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(|| -> i32 { $body })) {
            Ok(code) => code,
            Err(_) => {
                ::tracing::error!("panic caught at qalloc FFI boundary");
                $crate::status::QallocStatus::Panicked as i32
            }
        }
    };
}

/// Lock a mutex, returning `InternalError` from the enclosing FFI body if
/// it is poisoned.
macro_rules! ffi_lock {
    ($mutex:expr) => {
        match $mutex.lock() {
            Ok(guard) => guard,
            Err(_) => return $crate::status::QallocStatus::InternalError as i32,
        }
    };
}

mod handle;
pub mod manager;
pub mod status;

pub use manager::QallocCounts;
pub use status::QallocStatus;
