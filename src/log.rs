//! Logging macros.
//!
//! All macros take the current simulation time followed by format arguments and forward the message to the `log`
//! facade with the `episim` target, so verbosity is controlled by the installed logger (e.g. `RUST_LOG=episim=debug`
//! with `env_logger`). The message is prefixed by the time and a colored level label:
//!
//! ```text
//! [0.532 DEBUG episim] trajectory completed after 512 reactions
//! ```

/// Logs a message at the trace level.
#[macro_export]
macro_rules! log_trace {
    ($time:expr, $($arg:tt)+) => {
        $crate::__log::trace!(
            target: "episim",
            "[{:.3} {} episim] {}",
            $time,
            $crate::colored::Colorize::cyan("TRACE"),
            format_args!($($arg)+)
        )
    };
}

/// Logs a message at the debug level.
#[macro_export]
macro_rules! log_debug {
    ($time:expr, $($arg:tt)+) => {
        $crate::__log::debug!(
            target: "episim",
            "[{:.3} {} episim] {}",
            $time,
            $crate::colored::Colorize::blue("DEBUG"),
            format_args!($($arg)+)
        )
    };
}

/// Logs a message at the info level.
#[macro_export]
macro_rules! log_info {
    ($time:expr, $($arg:tt)+) => {
        $crate::__log::info!(
            target: "episim",
            "[{:.3} {} episim] {}",
            $time,
            $crate::colored::Colorize::green("INFO"),
            format_args!($($arg)+)
        )
    };
}

/// Logs a message at the warn level.
#[macro_export]
macro_rules! log_warn {
    ($time:expr, $($arg:tt)+) => {
        $crate::__log::warn!(
            target: "episim",
            "[{:.3} {} episim] {}",
            $time,
            $crate::colored::Colorize::yellow("WARN"),
            format_args!($($arg)+)
        )
    };
}
