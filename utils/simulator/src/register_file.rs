/// Static levels for the output port when a pin is not PWM-routed
pub const REG_OUT_DATA: u8 = 0x00;
/// Levels for the bidirectional port, always driven directly
pub const REG_BIDIR_DATA: u8 = 0x01;
/// Per-bit: route the shared PWM waveform to the output-port pin
pub const REG_PWM_ENABLE: u8 = 0x02;
/// Shared duty cycle, 0x00 = 0% to 0xFF = 100%
pub const REG_DUTY: u8 = 0x04;

/// Configuration register file
///
/// Written only by the frame decoder; every write fully replaces the
/// addressed 8-bit value. Addresses outside the map have no backing
/// storage.
#[derive(Debug, Clone, Default)]
pub struct RegisterFile {
    out_data: u8,
    bidir_data: u8,
    pwm_enable: u8,
    duty: u8,
}

impl RegisterFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a decoded write. Returns false for unmapped addresses,
    /// leaving all state untouched.
    pub fn write(&mut self, address: u8, value: u8) -> bool {
        match address {
            REG_OUT_DATA => self.out_data = value,
            REG_BIDIR_DATA => self.bidir_data = value,
            REG_PWM_ENABLE => self.pwm_enable = value,
            REG_DUTY => self.duty = value,
            _ => return false,
        }
        true
    }

    /// Current value of a register; unmapped addresses read as zero.
    pub fn read(&self, address: u8) -> u8 {
        match address {
            REG_OUT_DATA => self.out_data,
            REG_BIDIR_DATA => self.bidir_data,
            REG_PWM_ENABLE => self.pwm_enable,
            REG_DUTY => self.duty,
            _ => 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn out_data(&self) -> u8 {
        self.out_data
    }

    pub fn bidir_data(&self) -> u8 {
        self.bidir_data
    }

    pub fn pwm_enable(&self) -> u8 {
        self.pwm_enable
    }

    pub fn duty(&self) -> u8 {
        self.duty
    }
}
