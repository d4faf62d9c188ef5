// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `ptplink send` command - push a raw control message to the daemon.

use ptplink_core::ControlSender;

pub fn execute(config_path: &str, message: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let sender = ControlSender::new(config.control_port());

    if let Err(e) = sender.send(message) {
        eprintln!("✗ Failed to send control message: {}", e);
        std::process::exit(1);
    }

    println!("✓ Sent control message to port {}", sender.port());
    Ok(())
}
