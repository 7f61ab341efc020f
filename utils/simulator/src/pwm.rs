/// Reference clock rate; one model tick per clock cycle
pub const CLOCK_HZ: u64 = 10_000_000;

/// Counter wrap value. 10 MHz / 3333 gives a 3000.3 Hz carrier, inside
/// the 3 kHz +/- 1% target.
pub const PWM_PERIOD: u32 = 3333;

/// Shared PWM waveform generator: a free-running counter compared
/// against a threshold derived from the committed duty register.
pub struct PwmGenerator {
    counter: u32,
    level: u8,
}

impl PwmGenerator {
    pub fn new() -> Self {
        Self { counter: 0, level: 0 }
    }

    /// Advance one clock tick. The threshold is a pure function of the
    /// committed duty value, so a duty write that lands mid-cycle takes
    /// effect within the current carrier period.
    pub fn tick(&mut self, duty: u8) {
        self.counter += 1;
        if self.counter >= PWM_PERIOD {
            self.counter = 0;
        }
        self.level = (self.counter < threshold(duty)) as u8;
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn reset(&mut self) {
        self.counter = 0;
        self.level = 0;
    }
}

impl Default for PwmGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Comparator threshold for an 8-bit duty value, rounded to nearest.
/// 0xFF saturates to the full period (permanently high) and 0x00 maps
/// to zero (permanently low).
fn threshold(duty: u8) -> u32 {
    if duty == 0xFF {
        PWM_PERIOD
    } else {
        (duty as u32 * PWM_PERIOD + 128) / 256
    }
}
