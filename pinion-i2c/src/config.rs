//! Channel and transfer configuration types

/// Highest valid 7-bit device address
pub const MAX_ADDRESS: u8 = 127;

/// I2C channel configuration
///
/// Set once at [`init`](crate::I2cMaster::init) and cached verbatim for the
/// channel's life. The clock rate stored here is the requested bus rate;
/// the three-phase adjustment is applied on the way to the transport, never
/// to the cached value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelConfig {
    /// Requested bus clock frequency in Hz
    pub clock_hz: u32,
    /// Transport latency timer in milliseconds
    pub latency_ms: u8,
    /// Three-phase data clocking (on by default)
    ///
    /// Three-phase clocking issues 50% more clock edges per bit, so the
    /// rate handed to the transport is the requested rate times 3/2.
    pub three_phase_clocking: bool,
    /// Drive SDA only for low output, tri-stating it for high
    pub drive_only_zero: bool,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl ChannelConfig {
    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self {
        clock_hz: 100_000,
        latency_ms: 16,
        three_phase_clocking: true,
        drive_only_zero: true,
    };

    /// Fast mode (400 kHz)
    pub const FAST: Self = Self {
        clock_hz: 400_000,
        ..Self::STANDARD
    };

    /// Fast mode plus (1 MHz)
    pub const FAST_PLUS: Self = Self {
        clock_hz: 1_000_000,
        ..Self::STANDARD
    };

    /// High-speed mode (3.4 MHz)
    pub const HIGH_SPEED: Self = Self {
        clock_hz: 3_400_000,
        ..Self::STANDARD
    };

    /// Clock rate to program into the transport
    ///
    /// Requested rate times 3/2 when three-phase clocking is enabled,
    /// unchanged otherwise. The adjustment is computed in 64 bits and
    /// saturates at `u32::MAX`, so a rate beyond any real bus cannot wrap.
    pub fn effective_clock_hz(&self) -> u32 {
        if self.three_phase_clocking {
            let adjusted = u64::from(self.clock_hz) * 3 / 2;
            adjusted.min(u64::from(u32::MAX)) as u32
        } else {
            self.clock_hz
        }
    }
}

/// Transfer direction on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Master writes to the device (address LSB = 0)
    Write,
    /// Master reads from the device (address LSB = 1)
    Read,
}

/// Device address width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressWidth {
    SevenBit,
    /// Not implemented; the address phase rejects it
    TenBit,
}

/// Granularity of a batched fast transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Granularity {
    Bytes,
    /// Not implemented; the batch builder rejects it
    Bits,
}

/// Per-transfer options for device reads and writes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransferOptions {
    /// Generate a START condition before the transfer
    pub start: bool,
    /// Generate a STOP condition after the transfer
    pub stop: bool,
    /// Abort a write as soon as the device NACKs a data byte
    pub break_on_nack: bool,
    /// NACK the final byte of a read instead of ACKing it
    pub nack_last_byte: bool,
    /// Batch the whole transaction into one command buffer
    pub fast: Option<Granularity>,
    /// Skip the address phase (fast path only); the address is part of the
    /// data or the frame needs none
    pub no_address: bool,
}

impl TransferOptions {
    /// START and STOP around the transfer, everything else off
    pub const fn start_stop() -> Self {
        Self {
            start: true,
            stop: true,
            break_on_nack: false,
            nack_last_byte: false,
            fast: None,
            no_address: false,
        }
    }
}
