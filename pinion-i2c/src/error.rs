//! Acknowledgement and error types

use pinion_protocol::CommandError;

/// Acknowledgement bit sampled from or driven onto the bus
///
/// On the wire the acknowledgement is the raw SDA level during the ninth
/// clock: a device holding the line low acknowledges, a released (high)
/// line does not. The inversion is decoded exactly once, in
/// [`Ack::from_sampled`]; past that point the level never travels as a bare
/// bool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ack {
    /// Device pulled SDA low
    Ack,
    /// SDA stayed high
    Nack,
}

impl Ack {
    /// Decode a sampled reply byte; the engine places the bit in the LSB
    pub fn from_sampled(byte: u8) -> Self {
        if byte & 0x01 == 0 {
            Ack::Ack
        } else {
            Ack::Nack
        }
    }

    pub fn is_ack(self) -> bool {
        self == Ack::Ack
    }
}

/// Errors returned by the engine
///
/// `E` is the transport's own error type; everything else is protocol-level
/// status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// A parameter was rejected before any bus activity
    InvalidParameter,
    /// The addressed device did not acknowledge its address
    DeviceNotFound,
    /// A transport write or read moved fewer bytes than requested
    Io,
    /// The device NACKed a data byte mid-write with break-on-nack set;
    /// `acked` bytes were accepted before the failure
    FailedToWriteDevice { acked: usize },
    /// The batched command buffer could not be allocated
    InsufficientResources,
    /// The operation is not implemented (10-bit addressing)
    NotSupported,
    /// The transport itself failed
    Channel(E),
}

impl<E> From<CommandError> for Error<E> {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::OutOfMemory => Error::InsufficientResources,
        }
    }
}
