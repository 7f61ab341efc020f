/// One decoded 16-bit transaction: `[RW(1) | ADDRESS(7) | DATA(8)]`,
/// MSB first on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub write: bool,
    pub address: u8,
    pub data: u8,
}

impl Frame {
    pub fn from_word(word: u16) -> Self {
        Self {
            write: word & 0x8000 != 0,
            address: ((word >> 8) & 0x7F) as u8,
            data: (word & 0xFF) as u8,
        }
    }
}

/// SPI frame receiver: bit deserializer plus frame decoder.
///
/// The shift clock is asynchronous to the core clock, so the receiver is
/// fed the raw pin levels once per core tick and detects SCLK edges by
/// comparison against the previous sample. Clock mode is CPOL=0/CPHA=0:
/// data is held stable while SCLK is low and sampled on the rising edge.
pub struct SpiReceiver {
    shift: u16,
    bits: u8,
    prev_sclk: u8,
    prev_cs: u8,
}

impl SpiReceiver {
    pub fn new() -> Self {
        Self {
            shift: 0,
            bits: 0,
            prev_sclk: 0,
            prev_cs: 1, // Idle is deasserted (CS is active low)
        }
    }

    /// Sample the bus pins for one core clock tick.
    ///
    /// Returns a decoded frame exactly once, on the tick where CS
    /// deasserts with all 16 bits collected. Deassertion with fewer bits
    /// discards the partial frame silently; SCLK edges past the 16th
    /// while CS stays low are ignored.
    pub fn sample(&mut self, cs_n: u8, sclk: u8, sdi: u8) -> Option<Frame> {
        let cs_n = cs_n & 1;
        let sclk = sclk & 1;
        let mut frame = None;

        if self.prev_cs == 1 && cs_n == 0 {
            // New transaction, drop any stale shift state
            self.shift = 0;
            self.bits = 0;
        }

        if cs_n == 0 && self.prev_sclk == 0 && sclk == 1 && self.bits < 16 {
            self.shift = (self.shift << 1) | (sdi & 1) as u16;
            self.bits += 1;
        }

        if self.prev_cs == 0 && cs_n == 1 {
            if self.bits == 16 {
                frame = Some(Frame::from_word(self.shift));
            }
            self.shift = 0;
            self.bits = 0;
        }

        self.prev_sclk = sclk;
        self.prev_cs = cs_n;
        frame
    }

    /// Synchronous reset: aborts any in-flight frame. The edge trackers
    /// adopt the current pin levels so releasing reset mid-transaction
    /// cannot fabricate an edge.
    pub fn reset(&mut self, cs_n: u8, sclk: u8) {
        self.shift = 0;
        self.bits = 0;
        self.prev_cs = cs_n & 1;
        self.prev_sclk = sclk & 1;
    }
}

impl Default for SpiReceiver {
    fn default() -> Self {
        Self::new()
    }
}
