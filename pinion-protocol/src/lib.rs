//! Command-engine byte encoding
//!
//! This crate encodes primitive operations for MPSSE-style command engines:
//! programmable serial engines that execute byte-encoded commands to drive
//! GPIO-like pins and clock bits in or out, and stream sampled results back
//! over a byte channel.
//!
//! # Command set
//!
//! ```text
//! ┌──────────────────────┬────────┬──────────────────────────────┐
//! │ Command              │ Opcode │ Operands                     │
//! ├──────────────────────┼────────┼──────────────────────────────┤
//! │ set pin state        │ 0x80   │ value, direction mask        │
//! │ clock bits out       │ 0x12/13│ count-1, data (MSB first)    │
//! │ clock bits in        │ 0x22/26│ count-1                      │
//! │ send immediate       │ 0x87   │ -                            │
//! │ enable 3-phase clock │ 0x8C   │ -                            │
//! └──────────────────────┴────────┴──────────────────────────────┘
//! ```
//!
//! Out/in opcodes differ by the clock edge the engine shifts on. Protocol
//! engines compose these into command buffers; this crate owns only the
//! byte layout.

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod command;

pub use command::{
    ClockEdge, CommandBuffer, CommandError, CLOCK_BITS_IN_LEN, CLOCK_BITS_OUT_LEN,
    OPCODE_BITS_IN_FALLING, OPCODE_BITS_IN_RISING, OPCODE_BITS_OUT_FALLING,
    OPCODE_BITS_OUT_RISING, OPCODE_ENABLE_THREE_PHASE, OPCODE_SEND_IMMEDIATE,
    OPCODE_SET_PIN_STATE, SEND_IMMEDIATE_LEN, SET_PIN_STATE_LEN,
};
