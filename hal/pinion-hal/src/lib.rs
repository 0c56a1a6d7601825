//! Pinion transport abstraction layer
//!
//! This crate defines the transport trait consumed by the Pinion protocol
//! engines. A transport carries byte-encoded commands to a pin/command
//! engine (an MPSSE-style programmable serial engine) and returns the bytes
//! the engine sampled, over a blocking channel.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Protocol engines (pinion-i2c, ...)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pinion-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  Concrete channel (USB bridge, ...)     │
//! └─────────────────────────────────────────┘
//! ```

#![no_std]
#![deny(unsafe_code)]

pub mod channel;

// Re-export the key trait at crate root for convenience
pub use channel::CommandChannel;
