mod chip;
mod core;
mod monitor;
mod pwm;
mod register_file;
pub mod script;
mod spi;
mod vcd;

// Re-export public API
pub use chip::Chip;
pub use monitor::{PwmMeasurement, PwmMonitor};
pub use pwm::{CLOCK_HZ, PWM_PERIOD};
pub use register_file::{
    REG_BIDIR_DATA, REG_DUTY, REG_OUT_DATA, REG_PWM_ENABLE, RegisterFile,
};
pub use spi::{Frame, SpiReceiver};

pub use crate::core::{SCLK_HALF_PERIOD, SETTLE_TICKS, Simulator};
