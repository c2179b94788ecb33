//! Write-only byte channel to the audio module.
//!
//! Concrete implementations:
//! - UART on ESP-IDF ([`crate::adapters::uart`])
//! - recording mocks in the integration tests
//!
//! The player is generic over `CommandTransport`, so swapping the serial
//! backend requires zero changes to the framing logic.

/// Byte-oriented, unidirectional transport.
pub trait CommandTransport {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Write `data`.  Returns the number of bytes actually written.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Flush any buffered output.
    fn flush(&mut self) -> Result<(), Self::Error>;
}

impl<T: CommandTransport + ?Sized> CommandTransport for &mut T {
    type Error = T::Error;

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        (**self).write(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        (**self).flush()
    }
}
