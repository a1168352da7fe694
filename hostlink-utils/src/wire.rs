//!
//! The fixed-size little-endian wire format for data sent over a host
//! link.
//!
//! Every payload has a size known at setup time; transports allocate
//! their buffers once from `WIRE_SIZE` and never inspect the bytes
//! beyond the layout described here.
//!

/// An error from attempting to encode data into a buffer or decode data
/// from a slice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WireError {
    /// The buffer is too small to hold the fixed-size payload.
    BufferTooSmall,
}

/// Trait implemented by data carried over a host link.
///
/// The layout is fixed-size and little-endian.
pub trait WireFormat: Sized {
    /// The exact number of bytes this payload occupies on the wire.
    const WIRE_SIZE: usize;

    /// Encode this payload into the front of `buffer`.
    fn encode(&self, buffer: &mut [u8]) -> Result<(), WireError>;

    /// Decode a payload from the front of `buffer`.
    fn decode(buffer: &[u8]) -> Result<Self, WireError>;
}

macro_rules! wire_primitive {
    ($primitive:ident, $size:literal) => {
        impl WireFormat for $primitive {
            const WIRE_SIZE: usize = $size;

            fn encode(&self, buffer: &mut [u8]) -> Result<(), WireError> {
                if buffer.len() < Self::WIRE_SIZE {
                    return Err(WireError::BufferTooSmall);
                }

                buffer[..Self::WIRE_SIZE].copy_from_slice(&self.to_le_bytes());
                Ok(())
            }

            fn decode(buffer: &[u8]) -> Result<Self, WireError> {
                if buffer.len() < Self::WIRE_SIZE {
                    return Err(WireError::BufferTooSmall);
                }

                Ok(Self::from_le_bytes(
                    buffer[..Self::WIRE_SIZE].try_into().unwrap(),
                ))
            }
        }
    };
}

wire_primitive!(u8, 1);
wire_primitive!(u16, 2);
wire_primitive!(u32, 4);
wire_primitive!(u64, 8);
wire_primitive!(i8, 1);
wire_primitive!(i16, 2);
wire_primitive!(i32, 4);
wire_primitive!(i64, 8);
wire_primitive!(f32, 4);
wire_primitive!(f64, 8);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undersized_buffer_is_rejected() {
        let mut buffer = [0u8; 2];
        assert_eq!(1.5f32.encode(&mut buffer), Err(WireError::BufferTooSmall));
        assert_eq!(f32::decode(&buffer), Err(WireError::BufferTooSmall));
    }

    #[test]
    fn test_f32_layout_is_little_endian() {
        let mut buffer = [0u8; 4];
        1.0f32.encode(&mut buffer).unwrap();
        assert_eq!(buffer, [0x00, 0x00, 0x80, 0x3f]);
        assert_eq!(f32::decode(&buffer).unwrap(), 1.0);
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let buffer = [0x2a, 0x00, 0x00, 0x00, 0xff, 0xff];
        assert_eq!(u32::decode(&buffer).unwrap(), 42);
    }
}
