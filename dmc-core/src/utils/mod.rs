//! Utility re-exports and helper macros for the dual motor controller.
//!
//! This module re-exports core components and timing, and provides a helper
//! macro:
//!
//! - `connection`: JSON command ingest feeding the motor channel
//! - `controllers`: the motor controller and its pin capability
//! - `math`: range mapping for duty cycles
//!
//! The `mk_static!` macro simplifies static initialization in no-std contexts.

pub mod connection;
pub mod controllers;
pub mod math;

pub use connection::ingest::{forward, ingest};
pub use controllers::SystemController;
pub use embassy_time::Duration;
pub use math::range::map_range;

#[macro_export]
/// Initialize a no-std static cell and write the given value into it.
///
/// This macro creates a `static_cell::StaticCell` for type `$t` and initializes
/// it with `$val`, returning a mutable reference to the stored value.
macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        STATIC_CELL.uninit().write($val)
    }};
}
