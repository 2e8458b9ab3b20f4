//! Pin-level capability consumed by the motor controller.
//!
//! [`PinDriver`] is the seam between motor logic and hardware: it writes a
//! logic level or a PWM duty to one of the four control pins. [`HalPins`]
//! implements it over `embedded-hal` digital outputs and PWM channels, while
//! tests substitute recording fakes.

use embedded_hal::digital::{OutputPin, PinState};
use embedded_hal::pwm::SetDutyCycle;

/// A physical motor on the dual driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motor {
    First,
    Second,
}

impl Motor {
    /// Both physical motors, in command order.
    pub const ALL: [Motor; 2] = [Motor::First, Motor::Second];

    pub(crate) fn index(self) -> usize {
        match self {
            Motor::First => 0,
            Motor::Second => 1,
        }
    }
}

/// Which of a motor's two H-bridge inputs a pin drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    /// Driven when the motor turns with forward polarity.
    Forward,
    /// Driven when the motor turns with reverse polarity.
    Reverse,
}

impl Terminal {
    /// The other input of the same motor.
    pub fn opposite(self) -> Self {
        match self {
            Terminal::Forward => Terminal::Reverse,
            Terminal::Reverse => Terminal::Forward,
        }
    }
}

/// One of the four control pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinId {
    pub motor: Motor,
    pub terminal: Terminal,
}

impl PinId {
    pub const fn new(
        motor: Motor,
        terminal: Terminal,
    ) -> Self {
        Self { motor, terminal }
    }

    fn slot(self) -> usize {
        let t = match self.terminal {
            Terminal::Forward => 0,
            Terminal::Reverse => 1,
        };
        self.motor.index() * 2 + t
    }
}

/// Write access to the four motor control pins.
pub trait PinDriver {
    type Error: core::fmt::Debug;

    /// Drive `pin` to a plain logic level.
    fn write_digital(
        &mut self,
        pin: PinId,
        level: PinState,
    ) -> Result<(), Self::Error>;

    /// Drive `pin` with PWM at `duty` (on the pin's native `0..=max_duty` scale).
    fn write_analog(
        &mut self,
        pin: PinId,
        duty: u16,
    ) -> Result<(), Self::Error>;

    /// Native full-scale duty value of `pin`.
    fn max_duty(
        &self,
        pin: PinId,
    ) -> u16;
}

/// Errors raised by a [`DualModePin`].
#[derive(Debug)]
pub enum PinError<D: core::fmt::Debug, A: core::fmt::Debug> {
    Digital(D),
    Pwm(A),
}

/// A single control line reachable both as a GPIO output and as a PWM channel.
///
/// Going digital hands the line back from the PWM channel (duty 0) first, so a
/// full-speed or stop command releases the channel for other uses. Going PWM
/// pulls the GPIO side LOW first if it was left HIGH.
pub struct DualModePin<D, A> {
    digital: D,
    pwm: A,
    pwm_engaged: bool,
    digital_high: bool,
}

impl<D, A> DualModePin<D, A>
where
    D: OutputPin,
    A: SetDutyCycle,
{
    pub fn new(
        digital: D,
        pwm: A,
    ) -> Self {
        Self {
            digital,
            pwm,
            pwm_engaged: false,
            digital_high: false,
        }
    }

    /// Give back the underlying GPIO output and PWM channel.
    pub fn release(self) -> (D, A) {
        (self.digital, self.pwm)
    }

    pub fn set_level(
        &mut self,
        level: PinState,
    ) -> Result<(), PinError<D::Error, A::Error>> {
        if self.pwm_engaged {
            self.pwm.set_duty_cycle(0).map_err(PinError::Pwm)?;
            self.pwm_engaged = false;
        }
        self.digital.set_state(level).map_err(PinError::Digital)?;
        self.digital_high = level == PinState::High;
        Ok(())
    }

    pub fn set_duty(
        &mut self,
        duty: u16,
    ) -> Result<(), PinError<D::Error, A::Error>> {
        if self.digital_high {
            self.digital.set_low().map_err(PinError::Digital)?;
            self.digital_high = false;
        }
        self.pwm.set_duty_cycle(duty).map_err(PinError::Pwm)?;
        self.pwm_engaged = true;
        Ok(())
    }

    pub fn max_duty(&self) -> u16 {
        self.pwm.max_duty_cycle()
    }
}

/// The four control pins of the dual driver, backed by `embedded-hal` traits.
pub struct HalPins<D, A> {
    // first forward, first reverse, second forward, second reverse
    pins: [DualModePin<D, A>; 4],
}

impl<D, A> HalPins<D, A>
where
    D: OutputPin,
    A: SetDutyCycle,
{
    pub fn new(
        first_forward: DualModePin<D, A>,
        first_reverse: DualModePin<D, A>,
        second_forward: DualModePin<D, A>,
        second_reverse: DualModePin<D, A>,
    ) -> Self {
        Self {
            pins: [first_forward, first_reverse, second_forward, second_reverse],
        }
    }

    /// Give back the pins in construction order.
    pub fn release(self) -> [DualModePin<D, A>; 4] {
        self.pins
    }
}

impl<D, A> PinDriver for HalPins<D, A>
where
    D: OutputPin,
    A: SetDutyCycle,
{
    type Error = PinError<D::Error, A::Error>;

    fn write_digital(
        &mut self,
        pin: PinId,
        level: PinState,
    ) -> Result<(), Self::Error> {
        self.pins[pin.slot()].set_level(level)
    }

    fn write_analog(
        &mut self,
        pin: PinId,
        duty: u16,
    ) -> Result<(), Self::Error> {
        self.pins[pin.slot()].set_duty(duty)
    }

    fn max_duty(
        &self,
        pin: PinId,
    ) -> u16 {
        self.pins[pin.slot()].max_duty()
    }
}
