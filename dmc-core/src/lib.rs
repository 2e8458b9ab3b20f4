//! Core driver for a dual DC motor H-bridge on no-std embedded platforms.
//!
//! For a runnable host demo, see `dmc-app/mock-mcu`.
#![no_std]

pub mod utils;
