//! PWM waveform tests
//!
//! Carrier frequency against the 3 kHz +/- 1% target, duty saturation at
//! 0x00/0xFF, duty linearity at the quarter points, frequency invariance
//! across duty settings and routing between static and PWM-driven bits.

use anyhow::{Result, ensure};
use libtest_mimic::{Arguments, Failed, Trial};
use simulator::{CLOCK_HZ, PWM_PERIOD, REG_DUTY, REG_OUT_DATA, REG_PWM_ENABLE, Simulator};
use testbench::{assert_bit_constant, configure_pwm_bit0, measure_cycle, wait_fall, wait_rise};

fn main() {
    let args = Arguments::from_args();

    let tests = vec![
        trial("carrier_frequency_in_tolerance", carrier_frequency_in_tolerance),
        trial("duty_zero_always_low", duty_zero_always_low),
        trial("duty_full_always_high", duty_full_always_high),
        trial("duty_linearity_50_percent", duty_linearity_50_percent),
        trial("duty_linearity_25_percent", duty_linearity_25_percent),
        trial("frequency_invariant_across_duty", frequency_invariant_across_duty),
        trial("duty_update_within_one_period", duty_update_within_one_period),
        trial("static_bits_hold_while_pwm_runs", static_bits_hold_while_pwm_runs),
        trial("enable_mask_routes_multiple_bits", enable_mask_routes_multiple_bits),
        trial("disable_returns_bit_to_static_level", disable_returns_bit_to_static_level),
    ];

    libtest_mimic::run(&args, tests).exit();
}

fn trial(name: &'static str, test: fn(&mut Simulator) -> Result<()>) -> Trial {
    Trial::test(name, move || run_test(test))
}

fn run_test(test: fn(&mut Simulator) -> Result<()>) -> Result<(), Failed> {
    let mut sim = testbench::fresh_dut().map_err(|e| format!("{:#}", e))?;
    match test(&mut sim) {
        Ok(()) => Ok(()),
        Err(e) => Err(format!("{:#}", e).into()),
    }
}

fn carrier_frequency_in_tolerance(sim: &mut Simulator) -> Result<()> {
    configure_pwm_bit0(sim, 0x80)?;
    let m = measure_cycle(sim, 0)?;
    let frequency = m.frequency_hz(CLOCK_HZ);
    ensure!(
        (2970.0..=3030.0).contains(&frequency),
        "Carrier {:.1} Hz outside 3 kHz +/- 1%",
        frequency
    );
    Ok(())
}

fn duty_zero_always_low(sim: &mut Simulator) -> Result<()> {
    configure_pwm_bit0(sim, 0x00)?;
    assert_bit_constant(sim, 0, 0, 3 * PWM_PERIOD as u64)
}

fn duty_full_always_high(sim: &mut Simulator) -> Result<()> {
    configure_pwm_bit0(sim, 0xFF)?;
    assert_bit_constant(sim, 0, 1, 3 * PWM_PERIOD as u64)
}

fn duty_linearity_50_percent(sim: &mut Simulator) -> Result<()> {
    configure_pwm_bit0(sim, 0x80)?;
    let duty = measure_cycle(sim, 0)?.duty_percent();
    ensure!(
        (49.0..=51.0).contains(&duty),
        "Duty {:.2}% out of 50% +/- 1 for 0x80",
        duty
    );
    Ok(())
}

fn duty_linearity_25_percent(sim: &mut Simulator) -> Result<()> {
    configure_pwm_bit0(sim, 0x40)?;
    let duty = measure_cycle(sim, 0)?.duty_percent();
    ensure!(
        (24.0..=26.0).contains(&duty),
        "Duty {:.2}% out of 25% +/- 1 for 0x40",
        duty
    );
    Ok(())
}

fn frequency_invariant_across_duty(sim: &mut Simulator) -> Result<()> {
    configure_pwm_bit0(sim, 0x40)?;
    for duty in [0x20u8, 0x40, 0x80, 0xC0, 0xF0] {
        sim.write_reg(REG_DUTY, duty)?;
        let m = measure_cycle(sim, 0)?;
        ensure!(
            m.period_ticks == PWM_PERIOD as u64,
            "Period {} ticks at duty 0x{:02x}, expected {}",
            m.period_ticks,
            duty,
            PWM_PERIOD
        );
    }
    Ok(())
}

fn duty_update_within_one_period(sim: &mut Simulator) -> Result<()> {
    configure_pwm_bit0(sim, 0x40)?;
    let before = measure_cycle(sim, 0)?.duty_percent();
    ensure!(
        (24.0..=26.0).contains(&before),
        "Initial duty {:.2}% out of 25% +/- 1",
        before
    );

    // Re-program mid-flight; the very next settled cycle must show it
    sim.write_reg(REG_DUTY, 0xC0)?;
    let after = measure_cycle(sim, 0)?.duty_percent();
    ensure!(
        (74.0..=76.0).contains(&after),
        "Updated duty {:.2}% out of 75% +/- 1",
        after
    );
    Ok(())
}

fn static_bits_hold_while_pwm_runs(sim: &mut Simulator) -> Result<()> {
    sim.write_reg(REG_OUT_DATA, 0xF0)?;
    sim.write_reg(REG_PWM_ENABLE, 0x01)?;
    sim.write_reg(REG_DUTY, 0x80)?;

    wait_rise(sim, 0)?;
    for _ in 0..3 * PWM_PERIOD as u64 {
        sim.tick()?;
        ensure!(
            sim.port_out() & 0xFE == 0xF0,
            "Static bits disturbed: port_out=0x{:02x}",
            sim.port_out()
        );
    }
    Ok(())
}

fn enable_mask_routes_multiple_bits(sim: &mut Simulator) -> Result<()> {
    sim.write_reg(REG_OUT_DATA, 0x42)?;
    sim.write_reg(REG_PWM_ENABLE, 0x81)?;
    sim.write_reg(REG_DUTY, 0x80)?;

    wait_rise(sim, 0)?;
    for _ in 0..2 * PWM_PERIOD as u64 {
        sim.tick()?;
        let port = sim.port_out();
        ensure!(
            (port & 1) == (port >> 7),
            "PWM-routed bits 0 and 7 diverged: port_out=0x{:02x}",
            port
        );
        ensure!(
            port & 0x7E == 0x42,
            "Static bits disturbed: port_out=0x{:02x}",
            port
        );
    }
    Ok(())
}

fn disable_returns_bit_to_static_level(sim: &mut Simulator) -> Result<()> {
    configure_pwm_bit0(sim, 0x80)?;
    wait_rise(sim, 0)?;
    wait_fall(sim, 0)?;

    // Drop the routing; the bit must snap back to its static level (1)
    sim.write_reg(REG_PWM_ENABLE, 0x00)?;
    assert_bit_constant(sim, 0, 1, 2 * PWM_PERIOD as u64)
}
