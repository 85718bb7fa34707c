//! Tracing compatibility layer for structured capture-plumbing events.
//!
//! This module provides a unified interface for tracing that works whether or
//! not the `tracing-integration` feature is enabled:
//!
//! - **With feature enabled**: Re-exports the event macros from the `tracing`
//!   crate for full functionality.
//! - **Without feature**: No-op macros that compile to nothing for zero
//!   runtime overhead.
//!
//! The framework emits `trace!` events when scopes are pushed and popped and
//! `debug!` events when callables are wrapped and crossing environments are
//! restored. None of these events affect capture semantics.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crosscap::tracing_compat::{debug, trace};
//!
//! // These compile to no-ops when tracing-integration is disabled
//! trace!(capture_type = "dyn TextLog", "capture scope installed");
//! debug!(depth = 2, "crossing environment restored");
//! ```
//!
//! # Feature Flag
//!
//! Enable tracing by adding the feature to your `Cargo.toml`:
//!
//! ```toml
//! crosscap = { version = "0.1", features = ["tracing-integration"] }
//! ```

#[cfg(feature = "tracing-integration")]
pub use tracing::{debug, error, info, trace, warn};

// When tracing is disabled, provide no-op macros
#[cfg(not(feature = "tracing-integration"))]
mod noop {
    //! No-op implementations when tracing is disabled.
    //!
    //! These macros expand to nothing, ensuring zero compile-time and runtime
    //! cost.

    /// No-op trace-level logging macro.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    /// No-op debug-level logging macro.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// No-op info-level logging macro.
    #[macro_export]
    macro_rules! info {
        ($($arg:tt)*) => {};
    }

    /// No-op warn-level logging macro.
    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }

    /// No-op error-level logging macro.
    #[macro_export]
    macro_rules! error {
        ($($arg:tt)*) => {};
    }

    // Re-export the macros at module level
    pub use crate::{debug, error, info, trace, warn};
}

#[cfg(not(feature = "tracing-integration"))]
pub use noop::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_macros_compile() {
        // These should all compile and, without the feature, do nothing
        trace!("trace message");
        debug!("debug message");
        info!("info message");
        warn!("warn message");
        error!("error message");

        trace!(field = "value", "trace with field");
        debug!(count = 42, "debug with field");
    }
}
