//! CLI domain: parse, route, help, output, and presentation only.
//! Verification logic lives in the scenario and feature modules.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::{command_name, split_target};
pub use output::{map_error, CommandOutput};
pub use parse::{Cli, Commands};
pub use presentation::{
    format_list_result_json, format_list_result_text, format_run_report_json,
    format_run_report_text, format_show_result, format_wait_result,
};
pub use route::RunContext;
