//! Command buffer construction
//!
//! A [`CommandBuffer`] is an ordered byte sequence of primitive engine
//! commands, built once per call and handed to the transport in a single
//! write. Encoding is deterministic: identical append sequences produce
//! byte-identical buffers.

use alloc::vec::Vec;

/// Set pin levels and directions on the engine's low byte
pub const OPCODE_SET_PIN_STATE: u8 = 0x80;
/// Clock bits out, MSB first, data changes on the rising clock edge
pub const OPCODE_BITS_OUT_RISING: u8 = 0x12;
/// Clock bits out, MSB first, data changes on the falling clock edge
pub const OPCODE_BITS_OUT_FALLING: u8 = 0x13;
/// Clock bits in, MSB first, sampled on the rising clock edge
pub const OPCODE_BITS_IN_RISING: u8 = 0x22;
/// Clock bits in, MSB first, sampled on the falling clock edge
pub const OPCODE_BITS_IN_FALLING: u8 = 0x26;
/// Flush sampled data back to the host immediately
pub const OPCODE_SEND_IMMEDIATE: u8 = 0x87;
/// Enable three-phase data clocking
pub const OPCODE_ENABLE_THREE_PHASE: u8 = 0x8C;

/// Encoded length of a set-pin-state command
pub const SET_PIN_STATE_LEN: usize = 3;
/// Encoded length of a clock-bits-out command
pub const CLOCK_BITS_OUT_LEN: usize = 3;
/// Encoded length of a clock-bits-in command
pub const CLOCK_BITS_IN_LEN: usize = 2;
/// Encoded length of a send-immediate command
pub const SEND_IMMEDIATE_LEN: usize = 1;

/// Clock edge a bit transfer shifts on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockEdge {
    Rising,
    Falling,
}

/// Errors that can occur while building a command buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// The allocator could not reserve the requested buffer
    OutOfMemory,
}

/// An ordered sequence of encoded engine commands
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandBuffer {
    bytes: Vec<u8>,
}

impl CommandBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Create a buffer with exactly `capacity` bytes reserved up front
    ///
    /// Batched transfers pre-compute their total command size and allocate
    /// once; a failed reservation is reported before anything is encoded.
    pub fn with_exact_capacity(capacity: usize) -> Result<Self, CommandError> {
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(capacity)
            .map_err(|_| CommandError::OutOfMemory)?;
        Ok(Self { bytes })
    }

    /// Append a set-pin-state command
    ///
    /// `value` holds the driven level per pin, `direction` the output mask
    /// (1 = output). Pins with the direction bit clear float as inputs and
    /// the value bit is latched for when they next become outputs.
    pub fn set_pin_state(&mut self, value: u8, direction: u8) {
        self.bytes.push(OPCODE_SET_PIN_STATE);
        self.bytes.push(value);
        self.bytes.push(direction);
    }

    /// Append a clocked bit output command
    ///
    /// Shifts the upper `count` bits of `data` out MSB first on the given
    /// edge. `count` must be 1..=8; the engine encodes it as count-1.
    pub fn clock_bits_out(&mut self, edge: ClockEdge, count: u8, data: u8) {
        debug_assert!((1..=8).contains(&count));
        self.bytes.push(match edge {
            ClockEdge::Rising => OPCODE_BITS_OUT_RISING,
            ClockEdge::Falling => OPCODE_BITS_OUT_FALLING,
        });
        self.bytes.push(count - 1);
        self.bytes.push(data);
    }

    /// Append a clocked bit input command
    ///
    /// Samples `count` bits MSB first on the given edge; the engine queues
    /// one reply byte holding the sampled bits.
    pub fn clock_bits_in(&mut self, edge: ClockEdge, count: u8) {
        debug_assert!((1..=8).contains(&count));
        self.bytes.push(match edge {
            ClockEdge::Rising => OPCODE_BITS_IN_RISING,
            ClockEdge::Falling => OPCODE_BITS_IN_FALLING,
        });
        self.bytes.push(count - 1);
    }

    /// Append a send-immediate command, flushing sampled bytes to the host
    pub fn send_immediate(&mut self) {
        self.bytes.push(OPCODE_SEND_IMMEDIATE);
    }

    /// Encoded bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Encoded length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True when nothing has been encoded yet
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_set_pin_state_encoding() {
        let mut buf = CommandBuffer::new();
        buf.set_pin_state(0x03, 0x01);
        assert_eq!(buf.as_bytes(), &[OPCODE_SET_PIN_STATE, 0x03, 0x01]);
        assert_eq!(buf.len(), SET_PIN_STATE_LEN);
    }

    #[test]
    fn test_clock_bits_out_encoding() {
        let mut buf = CommandBuffer::new();
        buf.clock_bits_out(ClockEdge::Falling, 8, 0xA5);
        assert_eq!(buf.as_bytes(), &[OPCODE_BITS_OUT_FALLING, 7, 0xA5]);

        let mut buf = CommandBuffer::new();
        buf.clock_bits_out(ClockEdge::Rising, 1, 0x80);
        assert_eq!(buf.as_bytes(), &[OPCODE_BITS_OUT_RISING, 0, 0x80]);
    }

    #[test]
    fn test_clock_bits_in_encoding() {
        let mut buf = CommandBuffer::new();
        buf.clock_bits_in(ClockEdge::Rising, 8);
        buf.clock_bits_in(ClockEdge::Falling, 1);
        assert_eq!(
            buf.as_bytes(),
            &[OPCODE_BITS_IN_RISING, 7, OPCODE_BITS_IN_FALLING, 0]
        );
    }

    #[test]
    fn test_send_immediate_encoding() {
        let mut buf = CommandBuffer::new();
        buf.send_immediate();
        assert_eq!(buf.as_bytes(), &[OPCODE_SEND_IMMEDIATE]);
    }

    #[test]
    fn test_exact_capacity_reservation() {
        let buf = CommandBuffer::with_exact_capacity(64).unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn test_deterministic_encoding() {
        let build = || {
            let mut buf = CommandBuffer::new();
            buf.set_pin_state(0x00, 0x03);
            buf.clock_bits_out(ClockEdge::Falling, 8, 0x42);
            buf.set_pin_state(0x00, 0x01);
            buf.clock_bits_in(ClockEdge::Rising, 1);
            buf.send_immediate();
            buf
        };
        assert_eq!(build(), build());
    }

    proptest! {
        /// Every append grows the buffer by exactly its advertised length.
        #[test]
        fn prop_lengths_match_constants(
            value: u8,
            direction: u8,
            data: u8,
            count in 1u8..=8,
            rising: bool,
        ) {
            let edge = if rising { ClockEdge::Rising } else { ClockEdge::Falling };
            let mut buf = CommandBuffer::new();

            buf.set_pin_state(value, direction);
            prop_assert_eq!(buf.len(), SET_PIN_STATE_LEN);

            buf.clock_bits_out(edge, count, data);
            prop_assert_eq!(buf.len(), SET_PIN_STATE_LEN + CLOCK_BITS_OUT_LEN);

            buf.clock_bits_in(edge, count);
            prop_assert_eq!(
                buf.len(),
                SET_PIN_STATE_LEN + CLOCK_BITS_OUT_LEN + CLOCK_BITS_IN_LEN
            );

            buf.send_immediate();
            prop_assert_eq!(
                buf.len(),
                SET_PIN_STATE_LEN + CLOCK_BITS_OUT_LEN + CLOCK_BITS_IN_LEN
                    + SEND_IMMEDIATE_LEN
            );
        }
    }
}
