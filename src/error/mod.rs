//! Error types.
//!
//! Three families: [`BuildError`] when a schema fragment can not be compiled,
//! [`ValidationFailures`] when `valid` rejects a value, and [`CleanError`]
//! when `clean` can not convert one.

mod build_error;
mod clean_error;
mod failure;

pub use build_error::BuildError;
pub use clean_error::CleanError;
pub use failure::{ValidationFailure, ValidationFailures, ValidationResult};

pub(crate) use failure::{absorb, fail, finish};
