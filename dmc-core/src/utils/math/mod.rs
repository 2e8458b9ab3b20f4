//! Math utilities for the dual motor controller.
//!
//! This module provides the integer range mapping used to derive PWM duty cycles.

pub mod range;
