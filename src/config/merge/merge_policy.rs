//! Merge rules: built-in defaults are the lowest layer; later sources win.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("ecctool.path", "ecctool")?
        .set_default("ecctool.subcommand", "repair-status")?
        .set_default("poll.interval_ms", 1000)?
        .set_default("poll.timeout_secs", 150)?
        .set_default("output.partition", "markers")
}
