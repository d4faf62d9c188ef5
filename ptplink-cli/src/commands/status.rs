// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `ptplink status` command - query the daemon's published clock state.

use std::time::Duration;

use ptplink_core::{ClockReader, ClockSnapshot};

pub fn execute(
    config_path: &str,
    watch: Option<u64>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let reader = ClockReader::new(config);

    match watch {
        Some(interval_ms) => loop {
            tick(&reader, json);
            std::thread::sleep(Duration::from_millis(interval_ms));
        },
        None => match reader.query() {
            Ok(snapshot) => {
                print_snapshot(&snapshot, json);
                Ok(())
            }
            Err(e) => {
                if json {
                    println!(
                        "{}",
                        serde_json::json!({ "available": false, "error": e.to_string() })
                    );
                } else {
                    eprintln!("✗ {}", e);
                }
                std::process::exit(1);
            }
        },
    }
}

/// One poll iteration; failures are printed and polling continues.
fn tick(reader: &ClockReader, json: bool) {
    match reader.query() {
        Ok(snapshot) => print_snapshot(&snapshot, json),
        Err(e) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({ "available": false, "error": e.to_string() })
                );
            } else {
                println!("daemon unavailable: {}", e);
            }
        }
    }
}

fn print_snapshot(snapshot: &ClockSnapshot, json: bool) {
    if json {
        println!(
            "{}",
            serde_json::json!({
                "available": true,
                "master_clock_id": snapshot.clock_id.to_string(),
                "local_to_master_offset_ns": snapshot.local_to_master_offset,
            })
        );
    } else {
        println!("Master clock: {}", snapshot.clock_id);
        println!("Offset (ns):  {}", snapshot.local_to_master_offset);
    }
}
