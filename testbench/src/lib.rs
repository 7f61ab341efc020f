//! Helpers for driving the simulated peripheral from tests: edge waits
//! with tick timeouts, carrier-cycle measurement and constancy checks.

use anyhow::{Result, bail};
use simulator::{PwmMeasurement, PwmMonitor, REG_DUTY, REG_OUT_DATA, REG_PWM_ENABLE, Simulator};

/// Give up waiting for an edge after this many ticks (10 ms of sim time)
pub const EDGE_TIMEOUT_TICKS: u64 = 100_000;

/// Build a simulator and take it through the reset sequence.
pub fn fresh_dut() -> Result<Simulator> {
    let mut sim = Simulator::new();
    sim.reset()?;
    Ok(sim)
}

fn port_bit(sim: &Simulator, bit: u8) -> u8 {
    (sim.port_out() >> bit) & 1
}

/// Tick until a rising edge is observed on an output-port bit.
pub fn wait_rise(sim: &mut Simulator, bit: u8) -> Result<()> {
    wait_edge(sim, bit, 0, 1)
}

/// Tick until a falling edge is observed on an output-port bit.
pub fn wait_fall(sim: &mut Simulator, bit: u8) -> Result<()> {
    wait_edge(sim, bit, 1, 0)
}

fn wait_edge(sim: &mut Simulator, bit: u8, from: u8, to: u8) -> Result<()> {
    let mut prev = port_bit(sim, bit);
    for _ in 0..EDGE_TIMEOUT_TICKS {
        sim.tick()?;
        let cur = port_bit(sim, bit);
        if prev == from && cur == to {
            return Ok(());
        }
        prev = cur;
    }
    bail!("Timeout waiting for {}->{} edge on output bit {}", from, to, bit)
}

/// Measure one settled carrier cycle on an output-port bit.
///
/// The first measured cycle is skipped: a duty write that lands mid-cycle
/// can produce one transitional edge before the waveform settles.
pub fn measure_cycle(sim: &mut Simulator, bit: u8) -> Result<PwmMeasurement> {
    let mut monitor = PwmMonitor::new();
    let mut skipped_first = false;
    for _ in 0..4 * EDGE_TIMEOUT_TICKS {
        if let Some(measurement) = monitor.process(port_bit(sim, bit)) {
            if skipped_first {
                return Ok(measurement);
            }
            skipped_first = true;
        }
        sim.tick()?;
    }
    bail!("Timeout waiting for a settled carrier cycle on output bit {}", bit)
}

/// Assert an output-port bit holds a constant level for `ticks` cycles.
pub fn assert_bit_constant(sim: &mut Simulator, bit: u8, expected: u8, ticks: u64) -> Result<()> {
    for _ in 0..ticks {
        let level = port_bit(sim, bit);
        if level != expected {
            bail!(
                "Expected output bit {} constant at {}, observed {} at t={}",
                bit,
                expected,
                level,
                sim.timestamp()
            );
        }
        sim.tick()?;
    }
    Ok(())
}

/// Route the shared PWM waveform to output bit 0 at the given duty.
pub fn configure_pwm_bit0(sim: &mut Simulator, duty: u8) -> Result<()> {
    sim.write_reg(REG_OUT_DATA, 0x01)?;
    sim.write_reg(REG_PWM_ENABLE, 0x01)?;
    sim.write_reg(REG_DUTY, duty)
}
