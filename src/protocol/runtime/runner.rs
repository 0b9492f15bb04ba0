//! Async driver for a [`Connection`].
//!
//! Two producers feed an [`EventChannel`]: [`serial_reader`] turns port reads
//! into `Serial In` events and [`keep_alive`] emits a tick every
//! [`KEEP_ALIVE_INTERVAL_MS`]. A single [`ConnectionRunner`] consumes the
//! channel, dispatches each event through the pipeline and writes the
//! resulting frames to the port. Events the layers emit are handled before
//! the next external event is taken from the channel.
//!
//! The caller provides the channel, so no allocation happens behind its back
//! and any executor can run the futures.
use alloc::collections::VecDeque;
use core::future::pending;

use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    channel::{Channel, Receiver, Sender},
};
use futures_util::{future::select, future::Either, pin_mut};

use super::Connection;
use crate::core::{Direction, Event};
use crate::error::RunError;
use crate::protocol::modules::DockModule;
use crate::protocol::transport::traits::{
    dock_timer::DockTimer,
    serial_port::{SerialRead, SerialWrite},
};
use crate::protocol::transport::{KEEP_ALIVE_INTERVAL_MS, SERIAL_READ_CHUNK};

/// Queue shared by the producers and the runner.
pub type EventChannel<const N: usize> = Channel<CriticalSectionRawMutex, Event, N>;

/// Forward everything read from the port. A zero-length read means the port
/// closed: a quit event is sent and the task ends.
pub async fn serial_reader<R: SerialRead, const N: usize>(
    reader: &mut R,
    events: Sender<'_, CriticalSectionRawMutex, Event, N>,
) -> Result<(), R::Error> {
    let mut buffer = [0u8; SERIAL_READ_CHUNK];
    loop {
        let read = reader.read(&mut buffer).await?;
        if read == 0 {
            #[cfg(feature = "defmt")]
            defmt::info!("serial: port closed");
            events.send(Event::quit()).await;
            return Ok(());
        }
        events.send(Event::serial_in(&buffer[..read])).await;
    }
}

/// Send a keep-alive tick every `interval_ms`, forever.
pub async fn keep_alive<T: DockTimer, const N: usize>(
    timer: &mut T,
    events: Sender<'_, CriticalSectionRawMutex, Event, N>,
    interval_ms: u32,
) {
    loop {
        timer.delay_ms(interval_ms).await;
        events.send(Event::KeepAlive).await;
    }
}

/// Single consumer of the event channel.
pub struct ConnectionRunner<'a, M: DockModule, W: SerialWrite, const N: usize> {
    connection: Connection<M>,
    writer: W,
    events: Receiver<'a, CriticalSectionRawMutex, Event, N>,
    /// Events emitted by the layers, not yet dispatched.
    local: VecDeque<Event>,
}

impl<'a, M, W, const N: usize> ConnectionRunner<'a, M, W, N>
where
    M: DockModule,
    W: SerialWrite,
{
    pub fn new(
        connection: Connection<M>,
        writer: W,
        events: Receiver<'a, CriticalSectionRawMutex, Event, N>,
    ) -> Self {
        Self {
            connection,
            writer,
            events,
            local: VecDeque::new(),
        }
    }

    pub fn connection(&self) -> &Connection<M> {
        &self.connection
    }

    pub fn into_connection(self) -> Connection<M> {
        self.connection
    }

    /// Process external events until a quit arrives through the channel
    /// (the port closed). A quit raised by the link itself only resets the
    /// layers.
    pub async fn drive(&mut self) -> Result<(), W::Error> {
        loop {
            let event = self.events.receive().await;
            let closing = event.is_quit();
            self.handle(event).await?;
            if closing {
                return Ok(());
            }
        }
    }

    /// Dispatch `event`, then every event it causes, writing serial output
    /// as it comes.
    pub async fn handle(&mut self, event: Event) -> Result<(), W::Error> {
        self.local.push_back(event);
        while let Some(event) = self.local.pop_front() {
            if let Event::Serial {
                direction: Direction::Out,
                data,
            } = &event
            {
                self.writer.write(data).await?;
                self.writer.flush().await?;
            }
            let emitted = self.connection.dispatch(&event);
            self.local.extend(emitted);
        }
        Ok(())
    }
}

/// Run a connection over a serial port until the port closes, then hand the
/// connection back so its module can be inspected.
pub async fn run_connection<M, R, W, T, const N: usize>(
    connection: Connection<M>,
    mut reader: R,
    writer: W,
    mut timer: T,
    channel: &EventChannel<N>,
) -> Result<Connection<M>, RunError<R::Error, W::Error>>
where
    M: DockModule,
    R: SerialRead,
    W: SerialWrite,
    T: DockTimer,
{
    let mut runner = ConnectionRunner::new(connection, writer, channel.receiver());
    {
        let input = async {
            match serial_reader(&mut reader, channel.sender()).await {
                // The runner stops once it has seen the quit.
                Ok(()) => pending::<R::Error>().await,
                Err(err) => err,
            }
        };
        let ticks = keep_alive(&mut timer, channel.sender(), KEEP_ALIVE_INTERVAL_MS);
        let drive = runner.drive();
        pin_mut!(input);
        pin_mut!(ticks);
        pin_mut!(drive);

        match select(select(input, ticks), drive).await {
            Either::Left((Either::Left((err, _)), _)) => return Err(RunError::Read(err)),
            Either::Left((Either::Right(((), _)), _)) => {}
            Either::Right((result, _)) => result.map_err(RunError::Write)?,
        }
    }
    Ok(runner.into_connection())
}
