//! ecctool-verify: output verification for `ecctool repair-status`
//!
//! Runs the external tool, splits its tabular text output into header, row
//! and summary regions, checks each region against the expected format, and
//! polls job state until a repair completes or disappears.

pub mod cli;
pub mod config;
pub mod error;
pub mod feature;
pub mod invoke;
pub mod logging;
pub mod output;
pub mod poll;
pub mod rows;
pub mod scenario;
pub mod status;
pub mod validate;
