//! Bus condition generation
//!
//! Builds the pin sequences for START and STOP conditions. A condition is a
//! specific SDA transition while SCL is high, held for a configurable dwell
//! (a repeat count of identical set-pin-state commands) so the levels are
//! stable on the wire before and after the edge.

use pinion_hal::CommandChannel;
use pinion_protocol::{CommandBuffer, SET_PIN_STATE_LEN};

use crate::error::Error;
use crate::transfer::write_all;

/// SCL pin bit on the engine's low byte
pub(crate) const PIN_SCL: u8 = 0x01;
/// SDA pin bit on the engine's low byte
pub(crate) const PIN_SDA: u8 = 0x02;

/// Both lines low
pub(crate) const VALUE_BOTH_LOW: u8 = 0x00;
/// SCL high, SDA low
pub(crate) const VALUE_SCL_HIGH: u8 = PIN_SCL;
/// Both lines high
pub(crate) const VALUE_BOTH_HIGH: u8 = PIN_SCL | PIN_SDA;

/// SCL and SDA both driven
pub(crate) const DIR_BOTH_OUT: u8 = PIN_SCL | PIN_SDA;
/// SCL driven, SDA released to the pull-up
pub(crate) const DIR_SDA_IN: u8 = PIN_SCL;
/// Both pins tri-stated
pub(crate) const DIR_BOTH_IN: u8 = 0x00;

/// Dwell counts for the bus condition phases
///
/// Each field is the number of repeated set-pin-state commands holding one
/// phase of a condition. The defaults reproduce the engine's stock timing;
/// they are deliberately not scaled per clock tier, so a slower bus simply
/// holds the condition longer in bus-clock terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusTiming {
    /// START: both lines released high
    pub start_setup: u8,
    /// START: SDA pulled low while SCL stays high (the start edge)
    pub start_hold: u8,
    /// STOP: both lines driven low
    pub stop_setup: u8,
    /// STOP: SCL raised while SDA stays low
    pub stop_hold: u8,
    /// STOP: SDA released high while SCL stays high (the stop edge)
    pub stop_release: u8,
}

impl Default for BusTiming {
    fn default() -> Self {
        Self {
            start_setup: 10,
            start_hold: 20,
            stop_setup: 10,
            stop_hold: 10,
            stop_release: 10,
        }
    }
}

impl BusTiming {
    /// Encoded size of a START sequence in command bytes
    pub fn start_command_len(&self) -> usize {
        (self.start_setup as usize + self.start_hold as usize + 1) * SET_PIN_STATE_LEN
    }

    /// Encoded size of a STOP sequence in command bytes
    pub fn stop_command_len(&self) -> usize {
        (self.stop_setup as usize + self.stop_hold as usize + self.stop_release as usize + 1)
            * SET_PIN_STATE_LEN
    }
}

/// Append a START condition
///
/// Both lines are released high (SDA as input so the pull-up floats it),
/// then SDA is driven low while SCL stays high, then SCL drops, leaving the
/// bus claimed with both lines driven low.
pub(crate) fn append_start(buf: &mut CommandBuffer, timing: &BusTiming) {
    for _ in 0..timing.start_setup {
        buf.set_pin_state(VALUE_BOTH_HIGH, DIR_SDA_IN);
    }
    for _ in 0..timing.start_hold {
        buf.set_pin_state(VALUE_SCL_HIGH, DIR_BOTH_OUT);
    }
    buf.set_pin_state(VALUE_BOTH_LOW, DIR_BOTH_OUT);
}

/// Append a STOP condition
///
/// From both lines low, SCL rises first, then SDA rises while SCL is high
/// (the stop edge), and finally both pins are tri-stated to release the
/// bus to its pull-ups.
pub(crate) fn append_stop(buf: &mut CommandBuffer, timing: &BusTiming) {
    for _ in 0..timing.stop_setup {
        buf.set_pin_state(VALUE_BOTH_LOW, DIR_BOTH_OUT);
    }
    for _ in 0..timing.stop_hold {
        buf.set_pin_state(VALUE_SCL_HIGH, DIR_BOTH_OUT);
    }
    for _ in 0..timing.stop_release {
        buf.set_pin_state(VALUE_BOTH_HIGH, DIR_SDA_IN);
    }
    buf.set_pin_state(VALUE_BOTH_HIGH, DIR_BOTH_IN);
}

/// Build and send a START condition on its own
pub(crate) fn send_start<C: CommandChannel>(
    chan: &mut C,
    timing: &BusTiming,
) -> Result<(), Error<C::Error>> {
    let mut buf = CommandBuffer::with_exact_capacity(timing.start_command_len())?;
    append_start(&mut buf, timing);
    write_all(chan, buf.as_bytes())
}

/// Build and send a STOP condition on its own
pub(crate) fn send_stop<C: CommandChannel>(
    chan: &mut C,
    timing: &BusTiming,
) -> Result<(), Error<C::Error>> {
    let mut buf = CommandBuffer::with_exact_capacity(timing.stop_command_len())?;
    append_stop(&mut buf, timing);
    write_all(chan, buf.as_bytes())
}
