//! Scripted transport for unit tests
//!
//! Records every command byte written to it and serves replies from a
//! queue the test pre-loads. A decoder turns the recorded stream back
//! into wire operations so tests can assert on structure instead of raw
//! offsets.

use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::convert::Infallible;

use pinion_hal::CommandChannel;
use pinion_protocol::{
    OPCODE_BITS_IN_FALLING, OPCODE_BITS_IN_RISING, OPCODE_BITS_OUT_FALLING, OPCODE_BITS_OUT_RISING,
    OPCODE_ENABLE_THREE_PHASE, OPCODE_SEND_IMMEDIATE, OPCODE_SET_PIN_STATE,
};

#[derive(Debug, Default)]
pub(crate) struct MockChannel {
    /// Every byte written, across all calls
    pub written: Vec<u8>,
    /// Reply bytes served to `read`, in order
    pub replies: VecDeque<u8>,
    /// Cap on how many bytes a single `write` accepts
    pub write_limit: Option<usize>,
    /// Cap on how many bytes a single `read` returns
    pub read_limit: Option<usize>,
    pub purges: usize,
    pub locks: usize,
    pub unlocks: usize,
    /// Arguments of every `set_clock_and_latency` call
    pub clock_calls: Vec<(u32, u8, bool, bool)>,
}

impl MockChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_replies(&mut self, bytes: &[u8]) {
        self.replies.extend(bytes.iter().copied());
    }
}

impl CommandChannel for MockChannel {
    type Error = Infallible;

    fn write(&mut self, bytes: &[u8]) -> Result<usize, Self::Error> {
        let accepted = match self.write_limit {
            Some(limit) => bytes.len().min(limit),
            None => bytes.len(),
        };
        self.written.extend_from_slice(&bytes[..accepted]);
        Ok(accepted)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut served = match self.read_limit {
            Some(limit) => buf.len().min(limit),
            None => buf.len(),
        };
        served = served.min(self.replies.len());
        for slot in buf[..served].iter_mut() {
            // Length is clamped to the queue, so the pop cannot fail.
            if let Some(byte) = self.replies.pop_front() {
                *slot = byte;
            }
        }
        Ok(served)
    }

    fn pending(&mut self) -> Result<usize, Self::Error> {
        // An empty queue here means the test script forgot a reply; a
        // panic beats spinning forever in wait loops.
        assert!(
            !self.replies.is_empty(),
            "mock reply queue exhausted while the engine is still waiting"
        );
        Ok(self.replies.len())
    }

    fn purge(&mut self) -> Result<(), Self::Error> {
        self.purges += 1;
        Ok(())
    }

    fn set_clock_and_latency(
        &mut self,
        clock_hz: u32,
        latency_ms: u8,
        three_phase: bool,
        drive_only_zero: bool,
    ) -> Result<(), Self::Error> {
        self.clock_calls
            .push((clock_hz, latency_ms, three_phase, drive_only_zero));
        Ok(())
    }

    fn lock(&mut self) {
        self.locks += 1;
    }

    fn unlock(&mut self) {
        self.unlocks += 1;
    }
}

/// One decoded command from the recorded stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WireOp {
    SetPin { value: u8, direction: u8 },
    BitsOut { falling: bool, count: u8, data: u8 },
    BitsIn { rising: bool, count: u8 },
    SendImmediate,
    EnableThreePhase,
}

/// Decode a recorded command stream back into operations
///
/// Panics on anything unrecognized; a malformed stream is a bug in the
/// code under test.
pub(crate) fn decode_commands(mut bytes: &[u8]) -> Vec<WireOp> {
    let mut ops = Vec::new();
    while let Some(&opcode) = bytes.first() {
        let op = match opcode {
            OPCODE_SET_PIN_STATE => {
                let op = WireOp::SetPin {
                    value: bytes[1],
                    direction: bytes[2],
                };
                bytes = &bytes[3..];
                op
            }
            OPCODE_BITS_OUT_FALLING | OPCODE_BITS_OUT_RISING => {
                let op = WireOp::BitsOut {
                    falling: opcode == OPCODE_BITS_OUT_FALLING,
                    count: bytes[1] + 1,
                    data: bytes[2],
                };
                bytes = &bytes[3..];
                op
            }
            OPCODE_BITS_IN_RISING | OPCODE_BITS_IN_FALLING => {
                let op = WireOp::BitsIn {
                    rising: opcode == OPCODE_BITS_IN_RISING,
                    count: bytes[1] + 1,
                };
                bytes = &bytes[2..];
                op
            }
            OPCODE_SEND_IMMEDIATE => {
                bytes = &bytes[1..];
                WireOp::SendImmediate
            }
            OPCODE_ENABLE_THREE_PHASE => {
                bytes = &bytes[1..];
                WireOp::EnableThreePhase
            }
            other => panic!("unrecognized opcode 0x{other:02X} in command stream"),
        };
        ops.push(op);
    }
    ops
}

/// Data bytes clocked out in full 8-bit groups, in order
pub(crate) fn bytes_clocked_out(stream: &[u8]) -> Vec<u8> {
    decode_commands(stream)
        .into_iter()
        .filter_map(|op| match op {
            WireOp::BitsOut { count: 8, data, .. } => Some(data),
            _ => None,
        })
        .collect()
}

/// Driven acknowledgement bits (1-bit clock-outs), in order
pub(crate) fn ack_bits_driven(stream: &[u8]) -> Vec<u8> {
    decode_commands(stream)
        .into_iter()
        .filter_map(|op| match op {
            WireOp::BitsOut { count: 1, data, .. } => Some(data),
            _ => None,
        })
        .collect()
}

/// Number of STOP conditions in the stream, counted by the tri-state
/// release that only a STOP ends with
pub(crate) fn stop_count(stream: &[u8]) -> usize {
    decode_commands(stream)
        .into_iter()
        .filter(|op| {
            matches!(
                op,
                WireOp::SetPin {
                    value: 0x03,
                    direction: 0x00
                }
            )
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_mixed_stream() {
        let stream = [
            0x80, 0x00, 0x03, // set pins
            0x13, 0x07, 0xA5, // 8 bits out, falling
            0x22, 0x00, // 1 bit in, rising
            0x87, // flush
        ];
        assert_eq!(
            decode_commands(&stream),
            &[
                WireOp::SetPin {
                    value: 0x00,
                    direction: 0x03
                },
                WireOp::BitsOut {
                    falling: true,
                    count: 8,
                    data: 0xA5
                },
                WireOp::BitsIn {
                    rising: true,
                    count: 1
                },
                WireOp::SendImmediate,
            ]
        );
        assert_eq!(bytes_clocked_out(&stream), &[0xA5]);
    }

    #[test]
    fn test_short_write_and_read_limits() {
        let mut chan = MockChannel::new();
        chan.write_limit = Some(2);
        assert_eq!(chan.write(&[1, 2, 3, 4]), Ok(2));
        assert_eq!(chan.written, &[1, 2]);

        chan.push_replies(&[9, 8, 7]);
        chan.read_limit = Some(1);
        let mut buf = [0u8; 3];
        assert_eq!(chan.read(&mut buf), Ok(1));
        assert_eq!(buf[0], 9);
    }
}
