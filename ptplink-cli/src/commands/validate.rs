// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `ptplink validate` command - Validate configuration file.

use ptplink_core::ConfigLoader;

pub fn execute(file: &str) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(file = %file, "Validating configuration");

    match ConfigLoader::load_file(file) {
        Ok(config) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Daemon Endpoints:");
            println!("  Shared Memory Name: {}", config.shm_name());
            println!("  Control Port:       {}", config.control_port());
            println!("  Lock Timeout:       {}ms", config.lock_timeout().as_millis());
            println!(
                "  Lock Retry:         {}us",
                config.lock_retry_interval().as_micros()
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed:");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}
