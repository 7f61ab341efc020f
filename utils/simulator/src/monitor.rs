/// PWM waveform monitor using transition-based decoding
///
/// Fed one sample of a single output bit per clock tick. Yields one
/// measurement per completed carrier cycle, rising edge to rising edge
/// with an intervening falling edge. The first sample only primes the
/// edge tracker so attaching mid-pulse cannot fabricate an edge.
pub struct PwmMonitor {
    prev: u8,
    tick: u64,
    last_rise: Option<u64>,
    last_fall: Option<u64>,
    primed: bool,
}

/// One carrier cycle worth of timing, in clock ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PwmMeasurement {
    pub period_ticks: u64,
    pub high_ticks: u64,
}

impl PwmMeasurement {
    pub fn frequency_hz(&self, clock_hz: u64) -> f64 {
        clock_hz as f64 / self.period_ticks as f64
    }

    pub fn duty_percent(&self) -> f64 {
        100.0 * self.high_ticks as f64 / self.period_ticks as f64
    }
}

impl PwmMonitor {
    pub fn new() -> Self {
        Self {
            prev: 0,
            tick: 0,
            last_rise: None,
            last_fall: None,
            primed: false,
        }
    }

    /// Process one tick of the monitored bit.
    /// Returns a measurement each time a full carrier cycle completes.
    pub fn process(&mut self, level: u8) -> Option<PwmMeasurement> {
        let level = level & 1;
        if !self.primed {
            self.primed = true;
            self.prev = level;
            self.tick = 1;
            return None;
        }

        let mut measurement = None;
        if self.prev == 0 && level == 1 {
            if let (Some(rise), Some(fall)) = (self.last_rise, self.last_fall) {
                if fall > rise {
                    measurement = Some(PwmMeasurement {
                        period_ticks: self.tick - rise,
                        high_ticks: fall - rise,
                    });
                }
            }
            self.last_rise = Some(self.tick);
        }
        if self.prev == 1 && level == 0 {
            self.last_fall = Some(self.tick);
        }

        self.prev = level;
        self.tick += 1;
        measurement
    }
}

impl Default for PwmMonitor {
    fn default() -> Self {
        Self::new()
    }
}
