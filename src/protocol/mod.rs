//! Newton Dock protocol layers, from serial framing up to the application
//! modules, and the runtime that chains them.
pub mod dock;
pub mod framing;
pub mod link;
pub mod modules;
pub mod runtime;
pub mod transport;
