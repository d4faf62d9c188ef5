// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Command handlers for the ptplink CLI.

use ptplink_core::{ConfigError, ConfigLoader, DaemonConfig};

pub mod peers;
pub mod send;
pub mod status;
pub mod validate;

/// Load the daemon endpoint configuration.
///
/// A missing file is not an error: the daemon endpoints have compiled-in
/// defaults and the file only overrides them.
pub(crate) fn load_config(path: &str) -> Result<DaemonConfig, ConfigError> {
    if std::path::Path::new(path).exists() {
        ConfigLoader::load_file(path)
    } else {
        tracing::debug!(path = %path, "No configuration file; using compiled-in daemon endpoints");
        Ok(DaemonConfig::default())
    }
}
