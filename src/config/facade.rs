//! Config loading facade: assembles the layered sources into a validated
//! [`VerifierConfig`].

use super::merge::merge_policy;
use super::sources::{environment, global_file, workspace_file};
use super::VerifierConfig;
use crate::error::VerifyError;
use config::File;
use std::path::Path;
use tracing::debug;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load defaults, global file, workspace files, then environment.
    pub fn load(workspace_root: &Path) -> Result<VerifierConfig, VerifyError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder);

        let config: VerifierConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        debug!(workspace = %workspace_root.display(), "Configuration loaded");
        Ok(config)
    }

    /// Load a single explicit file on top of defaults; environment still wins.
    pub fn load_from_file(path: &Path) -> Result<VerifierConfig, VerifyError> {
        if !path.exists() {
            return Err(VerifyError::Config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }
        let builder = merge_policy::builder_with_defaults()?
            .add_source(File::from(path).required(true));
        let builder = environment::add_to_builder(builder);

        let config: VerifierConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        debug!(config_path = %path.display(), "Configuration loaded");
        Ok(config)
    }
}
