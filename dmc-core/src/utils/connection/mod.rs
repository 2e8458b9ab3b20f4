//! Module Exports
//!
//! This file exports the command ingest used by transports that feed the
//! motor controller.
//!
//! # Modules
//! - `ingest`: decodes JSON commands and forwards them to the motor channel.

/// Module for decoding and queueing incoming motor commands.
pub mod ingest;
