//! Best-effort datagram emitter for per-tick state frames.
//!
//! Owns a bound non-blocking UDP socket and a reusable 64-byte buffer.
//! Sending is fire-and-forget: transport failures bump a counter and the
//! tick carries on.

use std::net::UdpSocket;

use serde::Serialize;

use pursuit_common::protocol::{STATE_FRAME_SIZE, StateMessage};

use crate::error::ControlError;

/// Emission counters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EmitterStats {
    /// Frames handed to the socket successfully.
    pub send_count: u64,
    /// Transport errors (including sends after close).
    pub error_count: u64,
    /// `error_count / max(1, send_count)`.
    pub error_rate: f64,
}

/// One-shot, never-raising state emitter.
#[derive(Debug)]
pub struct UdpEmitter {
    socket: Option<UdpSocket>,
    buf: [u8; STATE_FRAME_SIZE],
    send_count: u64,
    error_count: u64,
}

impl UdpEmitter {
    /// Bind an ephemeral local socket and pin it to `dest` (`host:port`).
    ///
    /// Binding or resolving the destination fails fatally; everything after
    /// construction is best-effort.
    pub fn bind(dest: &str) -> Result<Self, ControlError> {
        let map = |source| ControlError::Socket {
            role: "emitter",
            source,
        };
        let socket = UdpSocket::bind(("0.0.0.0", 0)).map_err(map)?;
        socket.connect(dest).map_err(map)?;
        socket.set_nonblocking(true).map_err(map)?;
        Ok(Self {
            socket: Some(socket),
            buf: [0u8; STATE_FRAME_SIZE],
            send_count: 0,
            error_count: 0,
        })
    }

    /// Encode `msg` into the owned buffer and transmit it.
    ///
    /// Never returns an error: success bumps `send_count`, any transport
    /// failure (or a send after [`UdpEmitter::close`]) bumps `error_count`.
    #[inline]
    pub fn send(&mut self, msg: &StateMessage) {
        msg.encode(&mut self.buf);
        match &self.socket {
            Some(socket) => match socket.send(&self.buf) {
                Ok(_) => self.send_count += 1,
                Err(_) => self.error_count += 1,
            },
            None => self.error_count += 1,
        }
    }

    /// Current counters.
    pub fn stats(&self) -> EmitterStats {
        EmitterStats {
            send_count: self.send_count,
            error_count: self.error_count,
            error_rate: self.error_count as f64 / self.send_count.max(1) as f64,
        }
    }

    /// Release the socket. Idempotent.
    pub fn close(&mut self) {
        self.socket = None;
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn local_receiver() -> (UdpSocket, String) {
        let socket = UdpSocket::bind(("127.0.0.1", 0)).unwrap();
        let addr = socket.local_addr().unwrap().to_string();
        (socket, addr)
    }

    #[test]
    fn send_delivers_encoded_frame() {
        let (receiver, addr) = local_receiver();
        let mut emitter = UdpEmitter::bind(&addr).unwrap();

        let msg = StateMessage {
            timestamp_us: 42.0,
            cursor_x: 0.5,
            trial_number: 9,
            ..Default::default()
        };
        emitter.send(&msg);

        let mut buf = [0u8; STATE_FRAME_SIZE];
        let n = receiver.recv(&mut buf).unwrap();
        assert_eq!(n, STATE_FRAME_SIZE);
        let back = StateMessage::decode(&buf);
        assert_eq!(back.timestamp_us, 42.0);
        assert_eq!(back.cursor_x, 0.5);
        assert_eq!(back.trial_number, 9);

        let stats = emitter.stats();
        assert_eq!(stats.send_count, 1);
        assert_eq!(stats.error_count, 0);
        assert_eq!(stats.error_rate, 0.0);
    }

    #[test]
    fn send_after_close_counts_errors() {
        let (_receiver, addr) = local_receiver();
        let mut emitter = UdpEmitter::bind(&addr).unwrap();
        emitter.close();
        emitter.close(); // idempotent
        emitter.send(&StateMessage::default());
        emitter.send(&StateMessage::default());

        let stats = emitter.stats();
        assert_eq!(stats.send_count, 0);
        assert_eq!(stats.error_count, 2);
        assert_eq!(stats.error_rate, 2.0);
    }

    #[test]
    fn unresolvable_destination_is_fatal() {
        let result = UdpEmitter::bind("definitely-not-a-host.invalid:12345");
        assert!(matches!(
            result,
            Err(ControlError::Socket { role: "emitter", .. })
        ));
    }

    #[test]
    fn counters_accumulate() {
        let (receiver, addr) = local_receiver();
        let mut emitter = UdpEmitter::bind(&addr).unwrap();
        for _ in 0..10 {
            emitter.send(&StateMessage::default());
        }
        assert_eq!(emitter.stats().send_count, 10);
        drop(receiver);
    }
}
