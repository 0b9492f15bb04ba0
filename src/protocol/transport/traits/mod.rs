//! Abstraction traits used by the runner (serial port halves and timer).
pub mod dock_timer;
pub mod serial_port;
