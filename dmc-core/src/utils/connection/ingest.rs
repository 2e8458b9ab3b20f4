//! Command ingest.
//!
//! Decodes JSON `MotorCommand` payloads from any transport (serial line,
//! socket frame, stdin) and forwards them to `MOTOR_CHANNEL`, where the single
//! controller task executes them one at a time.

use embassy_sync::channel::TrySendError;

use crate::utils::controllers::{MotorCommand, MOTOR_CHANNEL};

/// Errors produced while accepting a command payload.
#[derive(Debug)]
pub enum IngestError {
    /// Payload is not a valid `MotorCommand`.
    Malformed(serde_json::Error),
    /// The command queue is full; the command was dropped.
    QueueFull(MotorCommand),
}

/// Deserialize a JSON `MotorCommand`, e.g. `{"mc":"run","m":"both","s":80}`.
pub fn parse(data: &[u8]) -> Result<MotorCommand, serde_json::Error> {
    serde_json::from_slice::<MotorCommand>(data)
}

/// Parse `data` and queue it without waiting.
///
/// Usable from outside the executor (e.g. a reader thread on a host).
pub fn ingest(data: &[u8]) -> Result<MotorCommand, IngestError> {
    let command = parse(data).map_err(|error| {
        tracing::error!(?error, "error deserializing MotorCommand");
        IngestError::Malformed(error)
    })?;
    MOTOR_CHANNEL.try_send(command).map_err(|TrySendError::Full(dropped)| {
        tracing::warn!(?dropped, "motor queue full, command dropped");
        IngestError::QueueFull(dropped)
    })?;
    Ok(command)
}

/// Parse `data` and queue it, waiting for space in the channel.
pub async fn forward(data: &[u8]) -> Result<MotorCommand, serde_json::Error> {
    match parse(data) {
        Ok(command) => {
            MOTOR_CHANNEL.send(command).await;
            Ok(command)
        }
        Err(error) => {
            tracing::error!(?error, "error deserializing MotorCommand");
            Err(error)
        }
    }
}
