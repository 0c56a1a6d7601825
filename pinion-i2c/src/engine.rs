//! Transaction orchestrator
//!
//! [`I2cMaster`] owns the transport and sequences whole transfers out of
//! the bus-condition, address and byte primitives, or hands the entire
//! transaction to the batched fast path when the caller asks for it. The
//! transport is locked for the duration of every transfer and released on
//! all exit paths, including errors.

use pinion_hal::CommandChannel;
use pinion_protocol::OPCODE_ENABLE_THREE_PHASE;

use crate::batch::{fast_read, fast_write};
use crate::bus::{send_start, send_stop, BusTiming};
use crate::config::{AddressWidth, ChannelConfig, Direction, TransferOptions, MAX_ADDRESS};
use crate::error::{Ack, Error};
use crate::transfer::{read_byte_give_ack, write_all, write_address, write_byte_get_ack};

/// Holds the transport lock for one transaction
///
/// Locks on construction, unlocks on drop, so every return path out of a
/// transfer releases the channel.
struct ChannelGuard<'a, C: CommandChannel> {
    chan: &'a mut C,
}

impl<'a, C: CommandChannel> ChannelGuard<'a, C> {
    fn new(chan: &'a mut C) -> Self {
        chan.lock();
        Self { chan }
    }
}

impl<C: CommandChannel> Drop for ChannelGuard<'_, C> {
    fn drop(&mut self) {
        self.chan.unlock();
    }
}

impl<C: CommandChannel> core::ops::Deref for ChannelGuard<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.chan
    }
}

impl<C: CommandChannel> core::ops::DerefMut for ChannelGuard<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        self.chan
    }
}

/// Master-side I2C engine over a command channel
pub struct I2cMaster<C: CommandChannel> {
    channel: C,
    config: ChannelConfig,
    timing: BusTiming,
}

impl<C: CommandChannel> I2cMaster<C> {
    /// Wrap a channel with the standard-mode configuration
    ///
    /// The channel is not touched until [`init`](Self::init) programs it.
    pub fn new(channel: C) -> Self {
        Self {
            channel,
            config: ChannelConfig::default(),
            timing: BusTiming::default(),
        }
    }

    /// Program the transport for I2C operation and cache the configuration
    ///
    /// The clock rate handed to the transport is the three-phase adjusted
    /// rate; the cached configuration keeps the requested one.
    pub fn init(&mut self, config: ChannelConfig) -> Result<(), Error<C::Error>> {
        let mut guard = ChannelGuard::new(&mut self.channel);

        guard
            .set_clock_and_latency(
                config.effective_clock_hz(),
                config.latency_ms,
                config.three_phase_clocking,
                config.drive_only_zero,
            )
            .map_err(Error::Channel)?;

        if config.three_phase_clocking {
            write_all(&mut *guard, &[OPCODE_ENABLE_THREE_PHASE])?;
        }

        drop(guard);
        self.config = config;
        Ok(())
    }

    /// The configuration cached at the last [`init`](Self::init)
    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    pub fn bus_timing(&self) -> &BusTiming {
        &self.timing
    }

    /// Override the bus-condition dwell counts for subsequent transfers
    pub fn set_bus_timing(&mut self, timing: BusTiming) {
        self.timing = timing;
    }

    /// Give the transport back
    pub fn release(self) -> C {
        self.channel
    }

    /// Write `data` to the device at `address`
    ///
    /// Returns the number of bytes clocked onto the bus. With
    /// `break_on_nack` set, a data-byte NACK aborts the transfer after the
    /// offending byte and reports how many the device accepted; without
    /// it, every byte is sent regardless of the acknowledgements.
    pub fn device_write(
        &mut self,
        address: u8,
        data: &[u8],
        options: &TransferOptions,
    ) -> Result<usize, Error<C::Error>> {
        if address > MAX_ADDRESS {
            return Err(Error::InvalidParameter);
        }

        let mut guard = ChannelGuard::new(&mut self.channel);
        guard.purge().map_err(Error::Channel)?;

        if options.fast.is_some() {
            return fast_write(&mut *guard, address, data, options, &self.timing);
        }

        if options.start {
            send_start(&mut *guard, &self.timing)?;
        }

        let ack = write_address(&mut *guard, address, AddressWidth::SevenBit, Direction::Write)?;
        if !ack.is_ack() {
            #[cfg(feature = "defmt")]
            defmt::warn!("device 0x{:02x} did not acknowledge its address", address);
            if options.stop {
                send_stop(&mut *guard, &self.timing)?;
            }
            return Err(Error::DeviceNotFound);
        }

        for (index, &byte) in data.iter().enumerate() {
            let ack = write_byte_get_ack(&mut *guard, byte)?;
            if !ack.is_ack() && options.break_on_nack {
                if options.stop {
                    send_stop(&mut *guard, &self.timing)?;
                }
                return Err(Error::FailedToWriteDevice { acked: index });
            }
        }

        if options.stop {
            send_stop(&mut *guard, &self.timing)?;
        }
        Ok(data.len())
    }

    /// Read `buf.len()` bytes from the device at `address`
    ///
    /// Every byte is acknowledged unless `nack_last_byte` asks for the
    /// final byte to be NACKed, releasing the device ahead of the STOP.
    pub fn device_read(
        &mut self,
        address: u8,
        buf: &mut [u8],
        options: &TransferOptions,
    ) -> Result<usize, Error<C::Error>> {
        if address > MAX_ADDRESS {
            return Err(Error::InvalidParameter);
        }

        let mut guard = ChannelGuard::new(&mut self.channel);
        guard.purge().map_err(Error::Channel)?;

        if options.fast.is_some() {
            return fast_read(&mut *guard, address, buf, options, &self.timing);
        }

        if options.start {
            send_start(&mut *guard, &self.timing)?;
        }

        let ack = write_address(&mut *guard, address, AddressWidth::SevenBit, Direction::Read)?;
        if !ack.is_ack() {
            #[cfg(feature = "defmt")]
            defmt::warn!("device 0x{:02x} did not acknowledge its address", address);
            if options.stop {
                send_stop(&mut *guard, &self.timing)?;
            }
            return Err(Error::DeviceNotFound);
        }

        let len = buf.len();
        for (index, slot) in buf.iter_mut().enumerate() {
            let last = index + 1 == len;
            let ack = if last && options.nack_last_byte {
                Ack::Nack
            } else {
                Ack::Ack
            };
            *slot = read_byte_give_ack(&mut *guard, ack)?;
        }

        if options.stop {
            send_stop(&mut *guard, &self.timing)?;
        }
        Ok(len)
    }
}
