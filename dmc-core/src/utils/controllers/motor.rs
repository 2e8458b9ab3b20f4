//! Dual DC motor control over four H-bridge input pins.
//!
//! Each physical motor has a forward and a reverse input. Running a motor
//! clears the inactive input, then drives the active one either fully HIGH
//! (at full speed) or with PWM. Commands are received via `MOTOR_CHANNEL`.
//!
//! Only a few PWM channels exist on the reference board, so a full-speed
//! command always uses a plain digital HIGH to leave a channel free.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::Duration;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::PinState;
use serde::{Deserialize, Serialize};

use super::pins::{Motor, PinDriver, PinId, Terminal};
use crate::utils::math::range::{duty_for, speed_magnitude, FULL_SPEED};

/// Pause between the first and second motor when a run addresses both.
pub const RUN_STAGGER: Duration = Duration::from_millis(50);

/// How long both inputs are held HIGH while braking.
pub const BRAKE_DWELL: Duration = Duration::from_millis(250);

/// Channel used to receive motor commands (`MotorCommand` messages).
pub static MOTOR_CHANNEL: embassy_sync::channel::Channel<
    CriticalSectionRawMutex,
    MotorCommand,
    16,
> = embassy_sync::channel::Channel::new();

/// Which motor(s) a command addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotorId {
    First,
    Second,
    Both,
}

impl MotorId {
    /// Physical motors addressed, first motor before second.
    pub fn motors(self) -> &'static [Motor] {
        match self {
            MotorId::First => &[Motor::First],
            MotorId::Second => &[Motor::Second],
            MotorId::Both => &Motor::ALL,
        }
    }
}

impl From<Motor> for MotorId {
    fn from(motor: Motor) -> Self {
        match motor {
            Motor::First => MotorId::First,
            Motor::Second => MotorId::Second,
        }
    }
}

/// Rotation polarity of a motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    /// Sign multiplier applied to a commanded speed.
    pub fn sign(self) -> i32 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

/// Motor command variants.
///
/// Serialized as JSON with tag `"mc"`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "mc", rename_all = "snake_case")]
pub enum MotorCommand {
    /// Run at a signed speed percentage.
    Run { m: MotorId, s: i32 },
    /// Release both inputs (coast).
    Stop { m: MotorId },
    /// Short both inputs HIGH, then release. Experimental.
    Brake { m: MotorId },
    /// Set the rotation calibration.
    Rotation { m: MotorId, d: Direction },
}

/// Drives two DC motors through a [`PinDriver`], blocking on `D` for the
/// stagger and brake delays.
pub struct MotorController<P, D> {
    pins: P,
    delay: D,
    rotations: [Direction; 2],
}

impl<P, D> MotorController<P, D>
where
    P: PinDriver,
    D: DelayNs,
{
    /// Create a controller with both motors at forward calibration.
    ///
    /// No pins are written until the first command.
    pub fn new(
        pins: P,
        delay: D,
    ) -> Self {
        Self::with_rotations(pins, delay, [Direction::Forward; 2])
    }

    /// Create a controller with a preset calibration, `[first, second]`.
    pub fn with_rotations(
        pins: P,
        delay: D,
        rotations: [Direction; 2],
    ) -> Self {
        Self {
            pins,
            delay,
            rotations,
        }
    }

    /// Give back the pin driver and delay.
    pub fn release(self) -> (P, D) {
        (self.pins, self.delay)
    }

    /// Stored calibration for `motor`.
    pub fn rotation(
        &self,
        motor: Motor,
    ) -> Direction {
        self.rotations[motor.index()]
    }

    /// Execute a `MotorCommand`.
    pub fn execute_command(
        &mut self,
        command: MotorCommand,
    ) -> Result<(), P::Error> {
        match command {
            MotorCommand::Run { m, s } => self.run(m, s),
            MotorCommand::Stop { m } => self.stop(m),
            MotorCommand::Brake { m } => self.brake(m),
            MotorCommand::Rotation { m, d } => {
                self.set_rotation(m, d);
                Ok(())
            }
        }
    }

    /// Run `motor` at `speed` percent; the sign selects the direction.
    ///
    /// Magnitudes above 100 are clamped. A speed of zero stops the motor. When
    /// `motor` is [`MotorId::Both`] the second motor starts [`RUN_STAGGER`]
    /// after the first.
    pub fn run(
        &mut self,
        motor: MotorId,
        speed: i32,
    ) -> Result<(), P::Error> {
        if speed == 0 {
            return self.stop(motor);
        }

        let magnitude = speed_magnitude(speed);
        for (i, &m) in motor.motors().iter().enumerate() {
            if i > 0 {
                self.delay.delay_ms(RUN_STAGGER.as_millis() as u32);
            }
            self.drive(m, speed, magnitude)?;
        }
        Ok(())
    }

    fn drive(
        &mut self,
        motor: Motor,
        speed: i32,
        magnitude: u32,
    ) -> Result<(), P::Error> {
        let forward = speed.signum() * self.rotations[motor.index()].sign() > 0;
        let terminal = if forward {
            Terminal::Forward
        } else {
            Terminal::Reverse
        };
        let active = PinId::new(motor, terminal);
        let inactive = PinId::new(motor, terminal.opposite());

        self.pins.write_digital(inactive, PinState::Low)?;
        if magnitude == FULL_SPEED {
            tracing::debug!(?active, "full speed, digital high");
            self.pins.write_digital(active, PinState::High)
        } else {
            let duty = duty_for(magnitude, self.pins.max_duty(active));
            tracing::debug!(?active, duty, "pwm");
            self.pins.write_analog(active, duty)
        }
    }

    /// Pull both inputs of `motor` LOW.
    pub fn stop(
        &mut self,
        motor: MotorId,
    ) -> Result<(), P::Error> {
        for &m in motor.motors() {
            self.set_both(m, PinState::Low)?;
        }
        Ok(())
    }

    /// Actively brake `motor`: both inputs HIGH for [`BRAKE_DWELL`], then LOW.
    ///
    /// Shorting the motor terminals stresses the driver; treat as experimental.
    /// If an input cannot be driven HIGH, every addressed input is pulled LOW
    /// before the error is returned.
    pub fn brake(
        &mut self,
        motor: MotorId,
    ) -> Result<(), P::Error> {
        tracing::warn!(?motor, "active brake (experimental)");
        let shorted = motor
            .motors()
            .iter()
            .try_for_each(|&m| self.set_both(m, PinState::High));
        if let Err(e) = shorted {
            tracing::error!(?motor, ?e, "brake failed, releasing inputs");
            // keep the original error; the release is best-effort
            let _ = self.release_all(motor);
            return Err(e);
        }
        self.delay.delay_ms(BRAKE_DWELL.as_millis() as u32);
        self.release_all(motor)
    }

    /// Pull every input of `motor` LOW, attempting each one even after a
    /// failure. Returns the first error seen.
    fn release_all(
        &mut self,
        motor: MotorId,
    ) -> Result<(), P::Error> {
        let mut first_err = None;
        for &m in motor.motors() {
            for terminal in [Terminal::Reverse, Terminal::Forward] {
                if let Err(e) = self
                    .pins
                    .write_digital(PinId::new(m, terminal), PinState::Low)
                {
                    first_err.get_or_insert(e);
                }
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Store the rotation calibration for `motor`; applies from the next run.
    pub fn set_rotation(
        &mut self,
        motor: MotorId,
        direction: Direction,
    ) {
        for &m in motor.motors() {
            self.rotations[m.index()] = direction;
        }
        tracing::debug!(?motor, ?direction, "rotation set");
    }

    fn set_both(
        &mut self,
        motor: Motor,
        level: PinState,
    ) -> Result<(), P::Error> {
        self.pins
            .write_digital(PinId::new(motor, Terminal::Reverse), level)?;
        self.pins
            .write_digital(PinId::new(motor, Terminal::Forward), level)
    }
}
