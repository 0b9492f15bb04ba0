//! Minimal abstraction for an asynchronous serial port, split in a read and
//! a write half so the reader task and the runner can own one each.
use futures_util::Future;

/// Receiving half of the port.
pub trait SerialRead {
    type Error: core::fmt::Debug;
    /// Read at least one byte into `buffer` and return how many were read.
    /// `Ok(0)` means the peer closed the port.
    fn read<'a>(
        &'a mut self,
        buffer: &'a mut [u8],
    ) -> impl Future<Output = Result<usize, Self::Error>> + 'a;
}

/// Sending half of the port.
pub trait SerialWrite {
    type Error: core::fmt::Debug;
    /// Queue all of `data` for transmission.
    fn write<'a>(
        &'a mut self,
        data: &'a [u8],
    ) -> impl Future<Output = Result<(), Self::Error>> + 'a;
    /// Wait until queued bytes have left the port.
    fn flush<'a>(&'a mut self) -> impl Future<Output = Result<(), Self::Error>> + 'a;
}
