use dmc_core::utils::controllers::{
    Direction, DualModePin, HalPins, MotorController, MotorId,
};
use embedded_hal_mock::eh1::delay::NoopDelay;
use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTrans};
use embedded_hal_mock::eh1::pwm::{Mock as PwmMock, Transaction as PwmTrans};

/// Native PWM range of the reference board.
const MAX_DUTY: u16 = 1023;

/// Expected digital and PWM traffic for one control line.
struct Line {
    digital: PinMock,
    pwm: PwmMock,
}

impl Line {
    fn new(
        digital: &[PinTrans],
        pwm: &[PwmTrans],
    ) -> Self {
        Line {
            digital: PinMock::new(digital),
            pwm: PwmMock::new(pwm),
        }
    }

    fn idle() -> Self {
        Self::new(&[], &[])
    }

    fn pin(&self) -> DualModePin<PinMock, PwmMock> {
        DualModePin::new(self.digital.clone(), self.pwm.clone())
    }

    fn done(&mut self) {
        self.digital.done();
        self.pwm.done();
    }
}

/// Lines in order: first forward, first reverse, second forward, second reverse.
fn controller(lines: &[Line; 4]) -> MotorController<HalPins<PinMock, PwmMock>, NoopDelay> {
    let pins = HalPins::new(
        lines[0].pin(),
        lines[1].pin(),
        lines[2].pin(),
        lines[3].pin(),
    );
    MotorController::new(pins, NoopDelay::new())
}

fn finish(lines: &mut [Line; 4]) {
    for line in lines.iter_mut() {
        line.done();
    }
}

fn low() -> PinTrans {
    PinTrans::set(State::Low)
}

fn high() -> PinTrans {
    PinTrans::set(State::High)
}

#[test]
fn test_run_half_speed_uses_pwm() {
    let mut lines = [
        Line::new(
            &[],
            &[
                PwmTrans::max_duty_cycle(MAX_DUTY),
                PwmTrans::set_duty_cycle(511),
            ],
        ),
        Line::new(&[low()], &[]),
        Line::idle(),
        Line::idle(),
    ];
    let mut motors = controller(&lines);
    motors.run(MotorId::First, 50).unwrap();
    finish(&mut lines);
}

#[test]
fn test_run_full_speed_avoids_pwm() {
    let mut lines = [
        Line::idle(),
        Line::idle(),
        Line::new(&[high()], &[]),
        Line::new(&[low()], &[]),
    ];
    let mut motors = controller(&lines);
    motors.run(MotorId::Second, 100).unwrap();
    finish(&mut lines);
}

#[test]
fn test_run_full_reverse_avoids_pwm() {
    let mut lines = [
        Line::new(&[low()], &[]),
        Line::new(&[high()], &[]),
        Line::idle(),
        Line::idle(),
    ];
    let mut motors = controller(&lines);
    motors.run(MotorId::First, -100).unwrap();
    finish(&mut lines);
}

#[test]
fn test_run_clamps_overspeed_to_digital_high() {
    let mut lines = [
        Line::new(&[high()], &[]),
        Line::new(&[low()], &[]),
        Line::new(&[low()], &[]),
        Line::new(&[high()], &[]),
    ];
    let mut motors = controller(&lines);
    motors.set_rotation(MotorId::Second, Direction::Backward);
    motors.run(MotorId::Both, 250).unwrap();
    finish(&mut lines);
}

#[test]
fn test_reversed_calibration_drives_reverse_input() {
    let mut lines = [
        Line::new(&[low()], &[]),
        Line::new(
            &[],
            &[
                PwmTrans::max_duty_cycle(MAX_DUTY),
                PwmTrans::set_duty_cycle(306),
            ],
        ),
        Line::idle(),
        Line::idle(),
    ];
    let mut motors = controller(&lines);
    motors.set_rotation(MotorId::First, Direction::Backward);
    motors.run(MotorId::First, 30).unwrap();
    finish(&mut lines);
}

#[test]
fn test_going_digital_releases_pwm_channel() {
    // 50% then full speed on the same input: the PWM channel is zeroed before
    // the line is driven HIGH.
    let mut lines = [
        Line::new(
            &[high()],
            &[
                PwmTrans::max_duty_cycle(MAX_DUTY),
                PwmTrans::set_duty_cycle(511),
                PwmTrans::set_duty_cycle(0),
            ],
        ),
        Line::new(&[low(), low()], &[]),
        Line::idle(),
        Line::idle(),
    ];
    let mut motors = controller(&lines);
    motors.run(MotorId::First, 50).unwrap();
    motors.run(MotorId::First, 100).unwrap();
    finish(&mut lines);
}

#[test]
fn test_going_pwm_pulls_digital_side_low() {
    // full speed then 50% on the same input: the GPIO HIGH is dropped before
    // the PWM channel takes over the line.
    let mut lines = [
        Line::new(
            &[high(), low()],
            &[
                PwmTrans::max_duty_cycle(MAX_DUTY),
                PwmTrans::set_duty_cycle(511),
            ],
        ),
        Line::new(&[low(), low()], &[]),
        Line::idle(),
        Line::idle(),
    ];
    let mut motors = controller(&lines);
    motors.run(MotorId::First, 100).unwrap();
    motors.run(MotorId::First, 50).unwrap();
    finish(&mut lines);
}

#[test]
fn test_pwm_after_low_leaves_gpio_alone() {
    let mut lines = [
        Line::idle(),
        Line::idle(),
        Line::new(
            &[low()],
            &[
                PwmTrans::max_duty_cycle(MAX_DUTY),
                PwmTrans::set_duty_cycle(204),
            ],
        ),
        Line::new(&[low(), low()], &[]),
    ];
    let mut motors = controller(&lines);
    motors.stop(MotorId::Second).unwrap();
    motors.run(MotorId::Second, 20).unwrap();
    finish(&mut lines);
}

#[test]
fn test_stop_both_pulls_all_low() {
    let mut lines = [
        Line::new(&[low()], &[]),
        Line::new(&[low()], &[]),
        Line::new(&[low()], &[]),
        Line::new(&[low()], &[]),
    ];
    let mut motors = controller(&lines);
    motors.stop(MotorId::Both).unwrap();
    finish(&mut lines);
}

#[test]
fn test_brake_pulses_both_inputs() {
    let mut lines = [
        Line::idle(),
        Line::idle(),
        Line::new(&[high(), low()], &[]),
        Line::new(&[high(), low()], &[]),
    ];
    let mut motors = controller(&lines);
    motors.brake(MotorId::Second).unwrap();
    finish(&mut lines);
}

#[test]
fn test_release_returns_pins() {
    let mut lines = [
        Line::new(&[], &[PwmTrans::max_duty_cycle(MAX_DUTY)]),
        Line::idle(),
        Line::idle(),
        Line::idle(),
    ];
    let motors = controller(&lines);
    let (pins, _delay) = motors.release();
    let released = pins.release();
    assert_eq!(released.len(), 4);
    assert_eq!(released[0].max_duty(), MAX_DUTY);
    finish(&mut lines);
}
