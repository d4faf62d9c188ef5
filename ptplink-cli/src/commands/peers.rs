// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `ptplink peers` command - announce the timing peer list to the daemon.

use std::net::IpAddr;

use ptplink_core::ControlSender;

pub fn execute(config_path: &str, addrs: &[IpAddr]) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let sender = ControlSender::new(config.control_port());

    // The peer list is load-bearing for timing: a dead control channel
    // here means synchronized playback cannot work, so exit non-zero.
    if let Err(e) = sender.announce_timing_peers(addrs) {
        eprintln!("✗ Failed to announce timing peers: {}", e);
        std::process::exit(1);
    }

    if addrs.is_empty() {
        println!("✓ Cleared the daemon's timing peer list");
    } else {
        println!("✓ Announced {} timing peer(s)", addrs.len());
    }
    Ok(())
}
