use std::path::Path;

use anyhow::{Context, Result, ensure};

use crate::chip::Chip;
use crate::vcd::{Snapshot, VcdWriter};

/// SCLK half-period in core clock ticks: a 100 kHz shift clock from the
/// 10 MHz reference clock
pub const SCLK_HALF_PERIOD: u64 = 50;

/// Idle ticks with CS high after each transaction, the inter-transaction
/// settling time
pub const SETTLE_TICKS: u64 = 20;

/// Simulation harness around [`Chip`]: tick driver, host-side SPI master
/// and VCD tracing.
pub struct Simulator {
    chip: Chip,
    timestamp: u64,
    vcd: Option<VcdWriter>,
}

impl Simulator {
    pub fn new() -> Self {
        let mut chip = Chip::new();
        // Idle bus: CS deasserted, SCLK and SDI low
        chip.cs_n = 1;
        chip.sclk = 0;
        chip.sdi = 0;
        Self {
            chip,
            timestamp: 0,
            vcd: None,
        }
    }

    pub fn chip(&self) -> &Chip {
        &self.chip
    }

    pub fn chip_mut(&mut self) -> &mut Chip {
        &mut self.chip
    }

    /// Elapsed ticks since construction
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn port_out(&self) -> u8 {
        self.chip.port_out
    }

    pub fn port_bidir(&self) -> u8 {
        self.chip.port_bidir
    }

    pub fn open_vcd<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let writer = VcdWriter::create(path.as_ref()).with_context(|| {
            format!("Failed to create VCD trace {}", path.as_ref().display())
        })?;
        self.vcd = Some(writer);
        Ok(())
    }

    pub fn close_vcd(&mut self) -> Result<()> {
        if let Some(vcd) = self.vcd.take() {
            vcd.finish(self.timestamp)
                .context("Failed to finish VCD trace")?;
        }
        Ok(())
    }

    /// Advance the model by one clock tick.
    pub fn tick(&mut self) -> Result<()> {
        self.chip.tick();
        if let Some(vcd) = self.vcd.as_mut() {
            let snap = Snapshot {
                rst_n: self.chip.rst_n,
                cs_n: self.chip.cs_n,
                sclk: self.chip.sclk,
                sdi: self.chip.sdi,
                pwm: self.chip.pwm_level(),
                port_out: self.chip.port_out,
                port_bidir: self.chip.port_bidir,
            };
            vcd.dump(self.timestamp, snap)
                .context("Failed to write VCD trace")?;
        }
        self.timestamp += 1;
        Ok(())
    }

    pub fn run(&mut self, ticks: u64) -> Result<()> {
        for _ in 0..ticks {
            self.tick()?;
        }
        Ok(())
    }

    /// Drive the reset sequence: idle bus, a few ticks with rst_n low,
    /// then release and let the model settle.
    pub fn reset(&mut self) -> Result<()> {
        self.chip.cs_n = 1;
        self.chip.sclk = 0;
        self.chip.sdi = 0;
        self.chip.rst_n = 0;
        self.run(5)?;
        self.chip.rst_n = 1;
        self.run(5)
    }

    /// Write `data` to register `address` over the serial bus.
    pub fn write_reg(&mut self, address: u8, data: u8) -> Result<()> {
        self.transaction(true, address, data)
    }

    /// Issue a read transaction. The peripheral latches the addressed
    /// value internally but drives nothing back (no MISO in this design);
    /// the latch is returned for inspection.
    pub fn read_reg(&mut self, address: u8) -> Result<u8> {
        self.read_reg_with_payload(address, 0)
    }

    /// Read transaction carrying an explicit data payload. Hosts may
    /// drive don't-care bits in the data field of a read; the peripheral
    /// ignores them.
    pub fn read_reg_with_payload(&mut self, address: u8, data: u8) -> Result<u8> {
        self.transaction(false, address, data)?;
        Ok(self.chip.read_response())
    }

    fn transaction(&mut self, write: bool, address: u8, data: u8) -> Result<()> {
        ensure!(address <= 0x7F, "Address 0x{:02x} exceeds 7 bits", address);
        let word = ((write as u16) << 15) | ((address as u16) << 8) | data as u16;

        self.chip.cs_n = 0;
        self.chip.sclk = 0;
        self.chip.sdi = 0;
        self.tick()?;

        for i in (0..16).rev() {
            // SCLK low, present the data bit
            self.chip.sdi = ((word >> i) & 1) as u8;
            self.chip.sclk = 0;
            self.run(SCLK_HALF_PERIOD)?;
            // SCLK high, bit is sampled on this edge
            self.chip.sclk = 1;
            self.run(SCLK_HALF_PERIOD)?;
        }

        // CS deassert commits the frame
        self.chip.sclk = 0;
        self.chip.sdi = 0;
        self.chip.cs_n = 1;
        self.run(SETTLE_TICKS)
    }

    /// Clock out only the top `nbits` of `word`, then deassert CS. The
    /// peripheral must discard the partial frame with no side effect.
    pub fn clock_partial_frame(&mut self, word: u16, nbits: u8) -> Result<()> {
        ensure!(nbits < 16, "Partial frame must be shorter than 16 bits");

        self.chip.cs_n = 0;
        self.chip.sclk = 0;
        self.tick()?;

        for i in 0..nbits {
            self.chip.sdi = ((word >> (15 - i)) & 1) as u8;
            self.chip.sclk = 0;
            self.run(SCLK_HALF_PERIOD)?;
            self.chip.sclk = 1;
            self.run(SCLK_HALF_PERIOD)?;
        }

        self.chip.sclk = 0;
        self.chip.sdi = 0;
        self.chip.cs_n = 1;
        self.run(SETTLE_TICKS)
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}
