// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! UDP control channel to the clock daemon.
//!
//! Fire-and-forget: each message is one datagram to the daemon's
//! well-known port on localhost, sent from an ephemeral socket that is
//! closed immediately after. No reply is awaited and nothing is retried.
//!
//! Transport failures surface as typed errors; whether they are fatal is
//! the caller's policy, not this module's.

use std::net::{IpAddr, Ipv4Addr, SocketAddrV4, UdpSocket};

use crate::error::ControlError;
use crate::types::ControlPort;

/// Sender for the daemon's UDP control channel.
///
/// Stateless between calls; holds only the validated target port.
pub struct ControlSender {
    port: ControlPort,
}

impl ControlSender {
    /// Create a sender targeting the daemon's control port.
    pub fn new(port: ControlPort) -> Self {
        Self { port }
    }

    /// The port this sender targets.
    pub fn port(&self) -> ControlPort {
        self.port
    }

    /// Send one control message in a single datagram.
    ///
    /// The daemon expects the terminating NUL inside the datagram, so the
    /// payload is the message bytes plus one terminator byte.
    pub fn send(&self, message: &str) -> Result<(), ControlError> {
        tracing::debug!(payload = %message, port = %self.port, "Sending control message to clock daemon");

        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))
            .map_err(|source| ControlError::SocketCreate { source })?;

        let mut datagram = Vec::with_capacity(message.len() + 1);
        datagram.extend_from_slice(message.as_bytes());
        datagram.push(0);

        let target = SocketAddrV4::new(Ipv4Addr::LOCALHOST, self.port.value());
        let sent = socket
            .send_to(&datagram, target)
            .map_err(|source| ControlError::SendFailed {
                port: self.port.value(),
                source,
            })?;

        if sent != datagram.len() {
            return Err(ControlError::ShortSend {
                sent,
                expected: datagram.len(),
            });
        }

        Ok(())
        // socket closed on drop
    }

    /// Announce the current set of timing peers to the daemon.
    ///
    /// Formats the daemon's `T` command: `"T <addr> <addr> ..."`. An empty
    /// slice sends a bare `"T"`, which clears the daemon's peer list.
    pub fn announce_timing_peers(&self, peers: &[IpAddr]) -> Result<(), ControlError> {
        let mut message = String::from("T");
        for peer in peers {
            message.push(' ');
            message.push_str(&peer.to_string());
        }
        self.send(&message)
    }
}
