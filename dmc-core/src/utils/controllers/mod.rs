//! Module Exports
//!
//! This file exports the controllers that turn motor commands into pin writes.
//!
//! - `motor`: motor identities, calibration and the `MotorController`.
//! - `pins`: the `PinDriver` capability and its `embedded-hal` adapter.

/// Module for the dual motor controller.
pub mod motor;
pub mod pins;

pub use motor::{Direction, MotorCommand, MotorController, MotorId, MOTOR_CHANNEL};
pub use pins::{DualModePin, HalPins, Motor, PinDriver, PinError, PinId, Terminal};

use embedded_hal::delay::DelayNs;

/// Owns the `MotorController` and serves commands from `MOTOR_CHANNEL`.
pub struct SystemController<P, D> {
    pub motors: MotorController<P, D>,
}

impl<P, D> SystemController<P, D>
where
    P: PinDriver,
    D: DelayNs,
{
    /// Build the controller; `rotations` defaults to forward for both motors.
    pub fn new(
        pins: P,
        delay: D,
        rotations: Option<[Direction; 2]>,
    ) -> Self {
        let rotations = rotations.unwrap_or([Direction::Forward; 2]);
        tracing::info!(?rotations, "motor controller ready");

        SystemController {
            motors: MotorController::with_rotations(pins, delay, rotations),
        }
    }

    /// Execute one command, logging the outcome.
    pub fn execute_command(
        &mut self,
        command: MotorCommand,
    ) -> Result<(), P::Error> {
        match self.motors.execute_command(command) {
            Ok(()) => {
                tracing::info!("Motor command executed successfully");
                Ok(())
            }
            Err(e) => {
                tracing::error!(?e, ?command, "Motor command failed");
                Err(e)
            }
        }
    }

    /// Drain `MOTOR_CHANNEL` forever, executing commands in arrival order.
    pub async fn motor_ch(&mut self) -> ! {
        loop {
            let command = motor::MOTOR_CHANNEL.receiver().receive().await;
            tracing::info!("Received Motor Command: {:?}", command);
            // failures are already logged; the next command re-drives the pins
            let _ = self.execute_command(command);
        }
    }
}
