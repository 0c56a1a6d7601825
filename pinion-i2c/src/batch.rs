//! Batched fast-path transfers
//!
//! Serializes an entire transaction (START, address phase, every data
//! phase, STOP) into one command buffer sized by pure arithmetic, sent to
//! the engine in a single write. Replies come back in one or two reads:
//! the address acknowledgement byte, then the per-byte acknowledgements
//! (write) or the data bytes (read). There is no send-immediate in the
//! batch; the latency timer flushes the sampled bytes.
//!
//! Because the buffer is pre-serialized, nothing can branch mid-transfer:
//! break-on-nack does not apply, and a read always NACKs its final byte.

use alloc::vec;

use pinion_hal::CommandChannel;
use pinion_protocol::{
    ClockEdge, CommandBuffer, CLOCK_BITS_IN_LEN, CLOCK_BITS_OUT_LEN, SET_PIN_STATE_LEN,
};

use crate::bus::{append_start, append_stop, BusTiming, DIR_BOTH_OUT, DIR_SDA_IN, VALUE_BOTH_LOW};
use crate::config::{Direction, Granularity, TransferOptions};
use crate::error::{Ack, Error};
use crate::transfer::{encode_address, read_exact, write_all};

/// Command bytes per written data byte: direction, 8 bits out, direction,
/// acknowledgement sample
const WRITE_PHASE_LEN: usize =
    SET_PIN_STATE_LEN + CLOCK_BITS_OUT_LEN + SET_PIN_STATE_LEN + CLOCK_BITS_IN_LEN;

/// Command bytes per read data byte: direction, 8 bits in, direction,
/// acknowledgement drive, back to idle
const READ_PHASE_LEN: usize = SET_PIN_STATE_LEN
    + CLOCK_BITS_IN_LEN
    + SET_PIN_STATE_LEN
    + CLOCK_BITS_OUT_LEN
    + SET_PIN_STATE_LEN;

/// The address phase costs the same as a written data byte
const ADDRESS_PHASE_LEN: usize = WRITE_PHASE_LEN;

/// Exact command-buffer size for a batched transfer
///
/// Pure arithmetic over the options and length; the serializers below
/// produce exactly this many bytes for the same inputs.
pub(crate) fn batch_command_len(
    direction: Direction,
    len: usize,
    options: &TransferOptions,
    timing: &BusTiming,
) -> usize {
    let phase = match direction {
        Direction::Write => WRITE_PHASE_LEN,
        Direction::Read => READ_PHASE_LEN,
    };
    let mut total = len * phase;
    if !options.no_address {
        total += ADDRESS_PHASE_LEN;
    }
    if options.start {
        total += timing.start_command_len();
    }
    if options.stop {
        total += timing.stop_command_len();
    }
    total
}

/// Append one clock-out data phase: drive the byte, sample the ack
fn append_out_phase(buf: &mut CommandBuffer, byte: u8) {
    buf.set_pin_state(VALUE_BOTH_LOW, DIR_BOTH_OUT);
    buf.clock_bits_out(ClockEdge::Falling, 8, byte);
    buf.set_pin_state(VALUE_BOTH_LOW, DIR_SDA_IN);
    buf.clock_bits_in(ClockEdge::Rising, 1);
}

/// Append one clock-in data phase: sample the byte, drive the ack
fn append_in_phase(buf: &mut CommandBuffer, ack: Ack) {
    buf.set_pin_state(VALUE_BOTH_LOW, DIR_SDA_IN);
    buf.clock_bits_in(ClockEdge::Rising, 8);
    match ack {
        Ack::Ack => {
            buf.set_pin_state(VALUE_BOTH_LOW, DIR_BOTH_OUT);
            buf.clock_bits_out(ClockEdge::Falling, 1, 0x00);
        }
        Ack::Nack => {
            buf.set_pin_state(VALUE_BOTH_LOW, DIR_SDA_IN);
            buf.clock_bits_out(ClockEdge::Falling, 1, 0x80);
        }
    }
    buf.set_pin_state(VALUE_BOTH_LOW, DIR_SDA_IN);
}

/// Serialize a whole write transaction into one command buffer
fn build_write_commands(
    address: u8,
    data: &[u8],
    options: &TransferOptions,
    timing: &BusTiming,
) -> Result<CommandBuffer, pinion_protocol::CommandError> {
    let total = batch_command_len(Direction::Write, data.len(), options, timing);
    let mut buf = CommandBuffer::with_exact_capacity(total)?;

    if options.start {
        append_start(&mut buf, timing);
    }
    if !options.no_address {
        append_out_phase(&mut buf, encode_address(address, Direction::Write));
    }
    for &byte in data {
        append_out_phase(&mut buf, byte);
    }
    if options.stop {
        append_stop(&mut buf, timing);
    }

    debug_assert_eq!(buf.len(), total);
    Ok(buf)
}

/// Serialize a whole read transaction into one command buffer
///
/// Every byte but the last is ACKed; the last is always NACKed so the
/// device releases the bus for the STOP.
fn build_read_commands(
    address: u8,
    len: usize,
    options: &TransferOptions,
    timing: &BusTiming,
) -> Result<CommandBuffer, pinion_protocol::CommandError> {
    let total = batch_command_len(Direction::Read, len, options, timing);
    let mut buf = CommandBuffer::with_exact_capacity(total)?;

    if options.start {
        append_start(&mut buf, timing);
    }
    if !options.no_address {
        append_out_phase(&mut buf, encode_address(address, Direction::Read));
    }
    for index in 0..len {
        let ack = if index + 1 < len { Ack::Ack } else { Ack::Nack };
        append_in_phase(&mut buf, ack);
    }
    if options.stop {
        append_stop(&mut buf, timing);
    }

    debug_assert_eq!(buf.len(), total);
    Ok(buf)
}

/// Reject anything but byte granularity before touching the bus
fn check_granularity<E>(options: &TransferOptions) -> Result<(), Error<E>> {
    match options.fast {
        Some(Granularity::Bytes) => Ok(()),
        _ => Err(Error::InvalidParameter),
    }
}

/// Read back the address acknowledgement byte queued ahead of the data
fn read_address_ack<C: CommandChannel>(chan: &mut C) -> Result<Ack, Error<C::Error>> {
    let mut reply = [0u8; 1];
    read_exact(chan, &mut reply)?;
    Ok(Ack::from_sampled(reply[0]))
}

/// Batched write: one command write, then the acknowledgement bytes back
pub(crate) fn fast_write<C: CommandChannel>(
    chan: &mut C,
    address: u8,
    data: &[u8],
    options: &TransferOptions,
    timing: &BusTiming,
) -> Result<usize, Error<C::Error>> {
    check_granularity(options)?;

    let buf = build_write_commands(address, data, options, timing)?;
    write_all(chan, buf.as_bytes())?;

    let address_ack = if options.no_address {
        Ack::Ack
    } else {
        read_address_ack(chan)?
    };

    // One acknowledgement sample per data byte, drained even when the
    // address went unanswered; the buffer already ran to completion.
    let mut acks = vec![0u8; data.len()];
    read_exact(chan, &mut acks)?;

    if !address_ack.is_ack() {
        return Err(Error::DeviceNotFound);
    }
    Ok(data.len())
}

/// Batched read: one command write, then the sampled data bytes back
pub(crate) fn fast_read<C: CommandChannel>(
    chan: &mut C,
    address: u8,
    buf: &mut [u8],
    options: &TransferOptions,
    timing: &BusTiming,
) -> Result<usize, Error<C::Error>> {
    check_granularity(options)?;

    let commands = build_read_commands(address, buf.len(), options, timing)?;
    write_all(chan, commands.as_bytes())?;

    let address_ack = if options.no_address {
        Ack::Ack
    } else {
        read_address_ack(chan)?
    };

    read_exact(chan, buf)?;

    if !address_ack.is_ack() {
        return Err(Error::DeviceNotFound);
    }
    Ok(buf.len())
}
