//! Master-side I2C protocol engine
//!
//! Turns logical I2C transactions (read or write N bytes at address A) into
//! exact sequences of pin-state and clocked-bit commands for an MPSSE-style
//! command engine, dispatches them over a blocking byte channel, and decodes
//! the sampled-bit replies into acknowledgements and data.
//!
//! Two code paths produce the same bus traffic:
//!
//! - the normal path round-trips one command frame per byte, sampling the
//!   acknowledgement after each, so the orchestrator can branch mid-transfer
//!   (break on NACK, early stop);
//! - the fast path serializes the whole transaction (START, address, data
//!   phases, STOP) into one pre-sized command buffer sent in a single write,
//!   trading mid-transfer branching for the removal of per-phase round-trip
//!   latency.
//!
//! The engine owns nothing but the channel, the cached channel
//! configuration, and the bus timing; every command buffer lives and dies
//! within one call.

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod batch;
mod transfer;

pub mod bus;
pub mod config;
pub mod engine;
pub mod error;

#[cfg(test)]
pub(crate) mod mock;

pub use bus::BusTiming;
pub use config::{
    AddressWidth, ChannelConfig, Direction, Granularity, TransferOptions, MAX_ADDRESS,
};
pub use engine::I2cMaster;
pub use error::{Ack, Error};
