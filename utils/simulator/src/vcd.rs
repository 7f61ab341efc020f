use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Pin and port levels captured after one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub rst_n: u8,
    pub cs_n: u8,
    pub sclk: u8,
    pub sdi: u8,
    pub pwm: u8,
    pub port_out: u8,
    pub port_bidir: u8,
}

// Identifier codes for the trace variables
const ID_RST_N: char = '!';
const ID_CS_N: char = '"';
const ID_SCLK: char = '#';
const ID_SDI: char = '$';
const ID_PWM: char = '%';
const ID_PORT_OUT: char = '&';
const ID_PORT_BIDIR: char = '(';

/// Minimal VCD trace writer for the peripheral's pins and ports.
/// One timestep per model tick, 100 ns each at the 10 MHz clock.
pub struct VcdWriter {
    out: BufWriter<File>,
    last: Option<Snapshot>,
}

impl VcdWriter {
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let mut out = BufWriter::new(File::create(path)?);
        writeln!(out, "$timescale 100 ns $end")?;
        writeln!(out, "$scope module chip $end")?;
        for (name, id) in [
            ("rst_n", ID_RST_N),
            ("cs_n", ID_CS_N),
            ("sclk", ID_SCLK),
            ("sdi", ID_SDI),
            ("pwm", ID_PWM),
        ] {
            writeln!(out, "$var wire 1 {id} {name} $end")?;
        }
        for (name, id) in [("port_out", ID_PORT_OUT), ("port_bidir", ID_PORT_BIDIR)] {
            writeln!(out, "$var wire 8 {id} {name} [7:0] $end")?;
        }
        writeln!(out, "$upscope $end")?;
        writeln!(out, "$enddefinitions $end")?;
        Ok(Self { out, last: None })
    }

    /// Emit value changes for `snap` at `timestamp` (in ticks).
    /// Unchanged signals are skipped; a fully unchanged snapshot emits
    /// nothing.
    pub fn dump(&mut self, timestamp: u64, snap: Snapshot) -> io::Result<()> {
        if self.last == Some(snap) {
            return Ok(());
        }
        writeln!(self.out, "#{timestamp}")?;
        let last = self.last;
        self.scalar(last.map(|l| l.rst_n), snap.rst_n, ID_RST_N)?;
        self.scalar(last.map(|l| l.cs_n), snap.cs_n, ID_CS_N)?;
        self.scalar(last.map(|l| l.sclk), snap.sclk, ID_SCLK)?;
        self.scalar(last.map(|l| l.sdi), snap.sdi, ID_SDI)?;
        self.scalar(last.map(|l| l.pwm), snap.pwm, ID_PWM)?;
        self.vector(last.map(|l| l.port_out), snap.port_out, ID_PORT_OUT)?;
        self.vector(last.map(|l| l.port_bidir), snap.port_bidir, ID_PORT_BIDIR)?;
        self.last = Some(snap);
        Ok(())
    }

    fn scalar(&mut self, prev: Option<u8>, cur: u8, id: char) -> io::Result<()> {
        if prev != Some(cur) {
            writeln!(self.out, "{}{}", cur & 1, id)?;
        }
        Ok(())
    }

    fn vector(&mut self, prev: Option<u8>, cur: u8, id: char) -> io::Result<()> {
        if prev != Some(cur) {
            writeln!(self.out, "b{cur:08b} {id}")?;
        }
        Ok(())
    }

    /// Close out the trace with a final timestamp and flush.
    pub fn finish(mut self, timestamp: u64) -> io::Result<()> {
        writeln!(self.out, "#{timestamp}")?;
        self.out.flush()
    }
}
