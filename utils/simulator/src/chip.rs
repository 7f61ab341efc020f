use crate::pwm::PwmGenerator;
use crate::register_file::RegisterFile;
use crate::spi::SpiReceiver;

/// Top level of the peripheral: SPI receiver, register file, PWM
/// generator and the output multiplexer.
///
/// Input pins and output ports are public fields; signal levels are 0/1,
/// ports are packed bytes. The harness sets the inputs, calls [`tick`],
/// and reads the ports back.
///
/// [`tick`]: Chip::tick
pub struct Chip {
    /// Active-low synchronous reset
    pub rst_n: u8,
    /// Active-low chip select
    pub cs_n: u8,
    /// Shift clock
    pub sclk: u8,
    /// Serial data in
    pub sdi: u8,
    /// 8-bit output-only port
    pub port_out: u8,
    /// 8-bit bidirectional port, driven as output in this design
    pub port_bidir: u8,
    spi: SpiReceiver,
    regs: RegisterFile,
    pwm: PwmGenerator,
    read_response: u8,
}

impl Chip {
    pub fn new() -> Self {
        Self {
            rst_n: 1,
            cs_n: 1,
            sclk: 0,
            sdi: 0,
            port_out: 0,
            port_bidir: 0,
            spi: SpiReceiver::new(),
            regs: RegisterFile::new(),
            pwm: PwmGenerator::new(),
            read_response: 0,
        }
    }

    /// Advance the model by one clock tick.
    ///
    /// Fixed evaluation order: deserializer, frame decode and register
    /// commit, PWM counter, output multiplexer. A write committed on one
    /// tick is reflected on the ports by the end of the same call and on
    /// every tick after.
    pub fn tick(&mut self) {
        if self.rst_n & 1 == 0 {
            self.spi.reset(self.cs_n, self.sclk);
            self.regs.reset();
            self.pwm.reset();
            self.read_response = 0;
            self.port_out = 0;
            self.port_bidir = 0;
            return;
        }

        if let Some(frame) = self.spi.sample(self.cs_n, self.sclk, self.sdi) {
            if frame.write {
                // Unmapped addresses are silent no-ops
                self.regs.write(frame.address, frame.data);
            } else {
                // Read path: latch the addressed value for the harness.
                // Nothing drives it back onto a pin (no MISO).
                self.read_response = self.regs.read(frame.address);
            }
        }

        self.pwm.tick(self.regs.duty());

        let mask = self.regs.pwm_enable();
        let wave = if self.pwm.level() != 0 { mask } else { 0 };
        self.port_out = (self.regs.out_data() & !mask) | wave;
        self.port_bidir = self.regs.bidir_data();
    }

    /// Level of the shared PWM waveform after the last tick
    pub fn pwm_level(&self) -> u8 {
        self.pwm.level()
    }

    /// Value latched by the most recent read transaction
    pub fn read_response(&self) -> u8 {
        self.read_response
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.regs
    }
}

impl Default for Chip {
    fn default() -> Self {
        Self::new()
    }
}
