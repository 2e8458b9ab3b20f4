use clap::Parser;
use core::convert::Infallible;
use dmc_core::mk_static;
use dmc_core::utils::controllers::{Direction, PinDriver, PinId};
use dmc_core::utils::{SystemController, ingest};
use embassy_executor::Executor;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::PinState;
use embedded_hal_mock::eh1::delay::StdSleep;
use std::io::BufRead;
use tracing::{error, info};
use critical_section as _;

#[derive(Parser)]
#[clap(version = "1.0")]
struct Opts
{
    /// native full-scale PWM duty of the simulated pins
    #[clap(long, default_value_t = 1023)]
    max_duty: u16,
    /// first motor is wired with reversed polarity
    #[clap(long)]
    invert_first: bool,
    /// second motor is wired with reversed polarity
    #[clap(long)]
    invert_second: bool,
    /// actually sleep for stagger and brake delays
    #[clap(long)]
    realtime: bool,
}

/// Pin driver that logs every write to the console.
struct LoggingPins {
    max_duty: u16,
}

impl PinDriver for LoggingPins {
    type Error = Infallible;

    fn write_digital(
        &mut self,
        pin: PinId,
        level: PinState,
    ) -> Result<(), Self::Error> {
        info!(motor = ?pin.motor, terminal = ?pin.terminal, ?level, "digital");
        Ok(())
    }

    fn write_analog(
        &mut self,
        pin: PinId,
        duty: u16,
    ) -> Result<(), Self::Error> {
        info!(motor = ?pin.motor, terminal = ?pin.terminal, duty, max = self.max_duty, "pwm");
        Ok(())
    }

    fn max_duty(
        &self,
        _pin: PinId,
    ) -> u16 {
        self.max_duty
    }
}

/// Logs each delay, sleeping only in realtime mode.
struct HostDelay {
    realtime: bool,
    sleep: StdSleep,
}

impl DelayNs for HostDelay {
    fn delay_ns(
        &mut self,
        ns: u32,
    ) {
        info!(ms = ns / 1_000_000, "delay");
        if self.realtime {
            self.sleep.delay_ns(ns);
        }
    }
}

#[embassy_executor::task]
async fn motor_task(mut ctrl: SystemController<LoggingPins, HostDelay>) -> ! {
    ctrl.motor_ch().await
}

fn polarity(inverted: bool) -> Direction {
    if inverted {
        Direction::Backward
    } else {
        Direction::Forward
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let opts: Opts = Opts::parse();
    let pins = LoggingPins {
        max_duty: opts.max_duty,
    };
    let delay = HostDelay {
        realtime: opts.realtime,
        sleep: StdSleep::new(),
    };
    let rotations = [polarity(opts.invert_first), polarity(opts.invert_second)];
    let ctrl = SystemController::new(pins, delay, Some(rotations));

    // JSON commands, one per line, e.g. {"mc":"run","m":"both","s":80}
    std::thread::spawn(|| {
        info!("Reading motor commands from stdin");
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => {
                    if let Ok(cmd) = ingest(line.trim().as_bytes()) {
                        info!(?cmd, "queued");
                    }
                }
                Err(e) => {
                    error!("stdin read failed: {:?}", e);
                    break;
                }
            }
        }
        info!("stdin closed");
    });

    let executor = mk_static!(Executor, Executor::new());
    executor.run(|spawner| {
        spawner.spawn(motor_task(ctrl)).unwrap();
    });
}
