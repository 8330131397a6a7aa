//! # Logging Module
//!
//! Output helpers for the `licenser` command line:
//! - [`verbose_log!`](crate::verbose_log) for details only shown with `--verbose`
//! - [`info_log!`](crate::info_log) for user-facing progress, silenced by `--quiet`
//! - [`init_tracing`] for the `tracing` diagnostics emitted by the library
//!
//! ## Example
//!
//! ```rust
//! use licenser::logging::{ColorMode, set_verbose};
//! use licenser::{info_log, verbose_log};
//!
//! set_verbose();
//! ColorMode::Auto.apply();
//!
//! verbose_log!("Loaded rule from {}", "HEADER");
//! info_log!("Checking {} files", 12);
//! ```

mod modes;

pub use modes::{
  ColorMode, LOG_ENV_VAR, init_tracing, is_quiet, is_verbose, set_normal, set_quiet, set_verbose, tracing_level,
};
use owo_colors::{OwoColorize, Stream};

/// Logs a message to stderr if verbose mode is enabled.
///
/// Uses the same format string syntax as [`eprintln!`].
#[macro_export]
macro_rules! verbose_log {
    ($($arg:tt)*) => {
        if $crate::logging::is_verbose() {
            eprintln!($($arg)*);
        }
    };
}

/// Logs a message to stdout unless quiet mode is enabled.
///
/// Uses the same format string syntax as [`println!`].
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        if !$crate::logging::is_quiet() {
            $crate::logging::print_info_log(&format!($($arg)*));
        }
    };
}

/// Prints an [`info_log!`](crate::info_log) message, colored when stdout supports it.
pub fn print_info_log(message: &str) {
  println!("{}", message.if_supports_color(Stream::Stdout, |m| m.yellow()));
}
