//! Byte-granular transfer primitives
//!
//! Each primitive builds one short command frame, flushes it with a
//! send-immediate, and round-trips one sampled reply byte. The pin
//! sequencing follows the glitch rule throughout: before a pin's direction
//! flips, its driven value is pre-set to the level it will present once
//! switched, so the line never spikes through the transition.

use pinion_hal::CommandChannel;
use pinion_protocol::{ClockEdge, CommandBuffer};

use crate::bus::{DIR_BOTH_OUT, DIR_SDA_IN, VALUE_BOTH_LOW};
use crate::config::{AddressWidth, Direction};
use crate::error::{Ack, Error};

/// Bit pattern clocked out to drive an acknowledgement low
const DRIVE_ACK: u8 = 0x00;
/// Bit pattern clocked out for a NACK; SDA is an input at that point, so
/// this burns the bit time without ever reaching the line
const DRIVE_NACK: u8 = 0x80;

/// Write a full buffer, treating a short count as an I/O failure
pub(crate) fn write_all<C: CommandChannel>(
    chan: &mut C,
    bytes: &[u8],
) -> Result<(), Error<C::Error>> {
    let sent = chan.write(bytes).map_err(Error::Channel)?;
    if sent != bytes.len() {
        return Err(Error::Io);
    }
    Ok(())
}

/// Fill a buffer from the reply stream, treating a short count as I/O failure
pub(crate) fn read_exact<C: CommandChannel>(
    chan: &mut C,
    buf: &mut [u8],
) -> Result<(), Error<C::Error>> {
    let got = chan.read(buf).map_err(Error::Channel)?;
    if got != buf.len() {
        return Err(Error::Io);
    }
    Ok(())
}

/// Poll the inbound queue until `count` reply bytes have arrived
///
/// The transport has no completion signal; the engine queues the sampled
/// byte some USB latency after the flush, so the primitives poll here
/// before reading. Blocking with no timeout is the contract: a stuck
/// transport stalls the transaction.
fn wait_for_reply<C: CommandChannel>(chan: &mut C, count: usize) -> Result<(), Error<C::Error>> {
    while chan.pending().map_err(Error::Channel)? < count {}
    Ok(())
}

/// Write one byte and sample the device's acknowledgement
///
/// Clocks 8 data bits out MSB-first on the falling edge, releases SDA to
/// the device, and clocks the acknowledgement bit in on the rising edge.
pub(crate) fn write_byte_get_ack<C: CommandChannel>(
    chan: &mut C,
    data: u8,
) -> Result<Ack, Error<C::Error>> {
    let mut cmd = CommandBuffer::new();

    cmd.set_pin_state(VALUE_BOTH_LOW, DIR_BOTH_OUT);
    cmd.clock_bits_out(ClockEdge::Falling, 8, data);

    // Hand SDA to the device before sampling its acknowledgement
    cmd.set_pin_state(VALUE_BOTH_LOW, DIR_SDA_IN);
    cmd.clock_bits_in(ClockEdge::Rising, 1);

    cmd.send_immediate();

    write_all(chan, cmd.as_bytes())?;
    wait_for_reply(chan, 1)?;
    let mut reply = [0u8; 1];
    read_exact(chan, &mut reply)?;
    Ok(Ack::from_sampled(reply[0]))
}

/// Read one byte and drive the acknowledgement bit back
///
/// Clocks 8 bits in MSB-first on the rising edge, then either drives the
/// acknowledgement low or leaves SDA released for a NACK, and returns to
/// the SDA-released idle state.
pub(crate) fn read_byte_give_ack<C: CommandChannel>(
    chan: &mut C,
    ack: Ack,
) -> Result<u8, Error<C::Error>> {
    let mut cmd = CommandBuffer::new();

    cmd.set_pin_state(VALUE_BOTH_LOW, DIR_SDA_IN);
    cmd.clock_bits_in(ClockEdge::Rising, 8);

    match ack {
        Ack::Ack => {
            // Pre-set the low level, then take the pin over to drive it
            cmd.set_pin_state(VALUE_BOTH_LOW, DIR_BOTH_OUT);
            cmd.clock_bits_out(ClockEdge::Falling, 1, DRIVE_ACK);
        }
        Ack::Nack => {
            // SDA stays an input; the pull-up presents the high bit
            cmd.set_pin_state(VALUE_BOTH_LOW, DIR_SDA_IN);
            cmd.clock_bits_out(ClockEdge::Falling, 1, DRIVE_NACK);
        }
    }

    // Back to idle with SDA released
    cmd.set_pin_state(VALUE_BOTH_LOW, DIR_SDA_IN);
    cmd.send_immediate();

    write_all(chan, cmd.as_bytes())?;
    wait_for_reply(chan, 1)?;
    let mut reply = [0u8; 1];
    read_exact(chan, &mut reply)?;
    Ok(reply[0])
}

/// Encode a 7-bit address with its direction bit
pub(crate) fn encode_address(address: u8, direction: Direction) -> u8 {
    let direction_bit = match direction {
        Direction::Read => 0x01,
        Direction::Write => 0x00,
    };
    (address << 1) | direction_bit
}

/// Write the address phase and return the device's acknowledgement
pub(crate) fn write_address<C: CommandChannel>(
    chan: &mut C,
    address: u8,
    width: AddressWidth,
    direction: Direction,
) -> Result<Ack, Error<C::Error>> {
    match width {
        AddressWidth::SevenBit => write_byte_get_ack(chan, encode_address(address, direction)),
        AddressWidth::TenBit => Err(Error::NotSupported),
    }
}
