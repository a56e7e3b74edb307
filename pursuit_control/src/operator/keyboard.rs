//! Keyboard bridge device: non-blocking datagram drain of key states.
//!
//! An external bridge process sends datagrams of at least 4 bytes to the
//! bridge port; bytes [0..3] are (up, down, left, right), nonzero = pressed,
//! extra bytes ignored. The drain runs at the head of each tick and the
//! last datagram wins, so the loop always acts on the freshest snapshot.

use std::io::ErrorKind;
use std::net::UdpSocket;

use bitflags::bitflags;

use pursuit_common::plant::{Force2D, PlantState};

use crate::error::ControlError;

bitflags! {
    /// Pressed-direction bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct KeyState: u8 {
        const UP = 1 << 0;
        const DOWN = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
    }
}

impl KeyState {
    /// Decode the first four payload bytes of a bridge datagram.
    pub fn from_payload(payload: &[u8; 4]) -> Self {
        let mut keys = Self::empty();
        keys.set(Self::UP, payload[0] != 0);
        keys.set(Self::DOWN, payload[1] != 0);
        keys.set(Self::LEFT, payload[2] != 0);
        keys.set(Self::RIGHT, payload[3] != 0);
        keys
    }

    /// Unit-per-axis direction: right−left on X, up−down on Y.
    pub fn direction(self) -> (f64, f64) {
        let axis = |pos: bool, neg: bool| (pos as i8 - neg as i8) as f64;
        (
            axis(self.contains(Self::RIGHT), self.contains(Self::LEFT)),
            axis(self.contains(Self::UP), self.contains(Self::DOWN)),
        )
    }
}

/// Non-blocking UDP receiver holding the latest key snapshot.
#[derive(Debug)]
pub struct KeyboardDevice {
    socket: UdpSocket,
    keys: KeyState,
    force_scale: f64,
    buf: [u8; 64],
}

impl KeyboardDevice {
    /// Bind the bridge port. Port 0 binds an ephemeral port (tests).
    pub fn bind(port: u16, force_scale: f64) -> Result<Self, ControlError> {
        let map = |source| ControlError::Socket {
            role: "keyboard",
            source,
        };
        let socket = UdpSocket::bind(("0.0.0.0", port)).map_err(map)?;
        socket.set_nonblocking(true).map_err(map)?;
        Ok(Self {
            socket,
            keys: KeyState::empty(),
            force_scale,
            buf: [0u8; 64],
        })
    }

    /// The port actually bound.
    pub fn local_port(&self) -> u16 {
        self.socket.local_addr().map(|a| a.port()).unwrap_or(0)
    }

    /// Currently held keys.
    pub fn keys(&self) -> KeyState {
        self.keys
    }

    /// Drain all pending datagrams without blocking; the most recent
    /// well-formed one wins. Runt datagrams (< 4 bytes) are ignored.
    pub fn poll(&mut self) {
        loop {
            match self.socket.recv(&mut self.buf) {
                Ok(n) if n >= 4 => {
                    let mut payload = [0u8; 4];
                    payload.copy_from_slice(&self.buf[..4]);
                    self.keys = KeyState::from_payload(&payload);
                }
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(_) => break,
            }
        }
    }

    /// Force from the held keys; the plant state is not consulted.
    #[inline]
    pub fn compute_input(&self, _state: &PlantState) -> Force2D {
        let (dx, dy) = self.keys.direction();
        Force2D::new(self.force_scale * dx, self.force_scale * dy)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
