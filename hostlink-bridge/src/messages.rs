//!
//! The command fragments an autonomy host publishes.
//!
//! Each fragment is one independently-timed piece of the overall
//! command.  All three carry a fixed-size little-endian wire layout so
//! the same types describe both the bus payloads and the host-link
//! datagrams.
//!

use hostlink_utils::wire::{WireError, WireFormat};

/// A gimbal attitude target from the host.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AttitudeTarget {
    /// Roll angle (rad).  Carried on the wire but never forwarded
    /// downstream by the bridge.
    pub roll: f32,
    /// Pitch angle (rad).
    pub pitch: f32,
    /// Yaw angle (rad).
    pub yaw: f32,
}

impl WireFormat for AttitudeTarget {
    const WIRE_SIZE: usize = 12;

    fn encode(&self, buffer: &mut [u8]) -> Result<(), WireError> {
        if buffer.len() < Self::WIRE_SIZE {
            return Err(WireError::BufferTooSmall);
        }

        self.roll.encode(&mut buffer[0..4])?;
        self.pitch.encode(&mut buffer[4..8])?;
        self.yaw.encode(&mut buffer[8..12])
    }

    fn decode(buffer: &[u8]) -> Result<Self, WireError> {
        if buffer.len() < Self::WIRE_SIZE {
            return Err(WireError::BufferTooSmall);
        }

        Ok(Self {
            roll: f32::decode(&buffer[0..4])?,
            pitch: f32::decode(&buffer[4..8])?,
            yaw: f32::decode(&buffer[8..12])?,
        })
    }
}

/// A chassis velocity target from the host.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ChassisTarget {
    /// Forward velocity (m/s).
    pub vx: f32,
    /// Leftward velocity (m/s).
    pub vy: f32,
    /// Angular velocity around the vertical axis (rad/s).
    pub w: f32,
}

impl ChassisTarget {
    /// Whether this target is exactly the zero vector.
    pub fn is_zero(&self) -> bool {
        self.vx == 0.0 && self.vy == 0.0 && self.w == 0.0
    }
}

impl WireFormat for ChassisTarget {
    const WIRE_SIZE: usize = 12;

    fn encode(&self, buffer: &mut [u8]) -> Result<(), WireError> {
        if buffer.len() < Self::WIRE_SIZE {
            return Err(WireError::BufferTooSmall);
        }

        self.vx.encode(&mut buffer[0..4])?;
        self.vy.encode(&mut buffer[4..8])?;
        self.w.encode(&mut buffer[8..12])
    }

    fn decode(buffer: &[u8]) -> Result<Self, WireError> {
        if buffer.len() < Self::WIRE_SIZE {
            return Err(WireError::BufferTooSmall);
        }

        Ok(Self {
            vx: f32::decode(&buffer[0..4])?,
            vy: f32::decode(&buffer[4..8])?,
            w: f32::decode(&buffer[8..12])?,
        })
    }
}

/// The host's fire trigger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FireCommand {
    /// Whether the launcher should fire.
    pub fire: bool,
}

impl WireFormat for FireCommand {
    const WIRE_SIZE: usize = 1;

    fn encode(&self, buffer: &mut [u8]) -> Result<(), WireError> {
        if buffer.is_empty() {
            return Err(WireError::BufferTooSmall);
        }

        buffer[0] = self.fire as u8;
        Ok(())
    }

    /// Any nonzero byte reads as firing; the payload is otherwise not
    /// inspected.
    fn decode(buffer: &[u8]) -> Result<Self, WireError> {
        if buffer.is_empty() {
            return Err(WireError::BufferTooSmall);
        }

        Ok(Self {
            fire: buffer[0] != 0,
        })
    }
}

/// The enumerated trigger variant some host protocols send instead of a
/// bare flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FireState {
    /// Hold fire.
    #[default]
    Stop,
    /// Fire.
    Start,
}

impl From<FireState> for FireCommand {
    fn from(state: FireState) -> Self {
        Self {
            fire: state == FireState::Start,
        }
    }
}

impl WireFormat for FireState {
    const WIRE_SIZE: usize = 1;

    fn encode(&self, buffer: &mut [u8]) -> Result<(), WireError> {
        if buffer.is_empty() {
            return Err(WireError::BufferTooSmall);
        }

        buffer[0] = match self {
            FireState::Stop => 0,
            FireState::Start => 1,
        };
        Ok(())
    }

    fn decode(buffer: &[u8]) -> Result<Self, WireError> {
        if buffer.is_empty() {
            return Err(WireError::BufferTooSmall);
        }

        Ok(match buffer[0] {
            0 => FireState::Stop,
            _ => FireState::Start,
        })
    }
}
