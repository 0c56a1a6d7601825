//! Command-engine channel abstractions
//!
//! Provides the blocking byte-channel trait through which protocol engines
//! talk to a command engine. Implementations wrap whatever carries the
//! bytes (a USB bridge chip, a serial link, a test double).

/// Blocking byte channel to a command engine
///
/// All calls block until the transport completes or fails; the trait has no
/// cancellation or timeout surface. A short transfer count is reported as a
/// successful call with a count below the requested one, and it is the
/// caller's job to treat that as an I/O failure.
pub trait CommandChannel {
    /// Error type for channel operations
    type Error;

    /// Write command bytes to the engine
    ///
    /// Returns the number of bytes the transport accepted.
    fn write(&mut self, bytes: &[u8]) -> Result<usize, Self::Error>;

    /// Read sampled reply bytes from the engine
    ///
    /// Blocks until the buffer is filled or the transport gives up.
    /// Returns the number of bytes actually read.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Number of reply bytes waiting in the inbound queue
    ///
    /// Callers poll this before a reply read to let a sampled byte arrive.
    fn pending(&mut self) -> Result<usize, Self::Error>;

    /// Discard stale bytes from the inbound queue
    fn purge(&mut self) -> Result<(), Self::Error>;

    /// Program the engine's clock rate and latency timer
    ///
    /// `clock_hz` is the final rate on the wire (any protocol-level
    /// adjustment has already been applied by the caller). The mode flags
    /// select engine features that the transport programs at setup time.
    fn set_clock_and_latency(
        &mut self,
        clock_hz: u32,
        latency_ms: u8,
        three_phase: bool,
        drive_only_zero: bool,
    ) -> Result<(), Self::Error>;

    /// Acquire exclusive use of the underlying device handle
    ///
    /// Channels shared between threads must block here until the handle is
    /// free. The default is a no-op: a channel reached through `&mut` is
    /// already exclusive in single-threaded use.
    fn lock(&mut self) {}

    /// Release exclusive use of the underlying device handle
    fn unlock(&mut self) {}
}
