use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::Parser;
use simulator::script::{Command, parse_script};
use simulator::{
    CLOCK_HZ, PwmMonitor, REG_BIDIR_DATA, REG_DUTY, REG_OUT_DATA, REG_PWM_ENABLE, Simulator,
};

#[derive(Parser)]
#[command(name = "ttpwm-sim")]
#[command(about = "Standalone SPI-configured PWM peripheral simulator")]
#[command(version)]
struct Args {
    /// Path to a transaction script (write/read/idle/reset, one per line)
    #[arg(value_name = "SCRIPT")]
    script: Option<Utf8PathBuf>,

    /// VCD output file
    #[arg(long, default_value = "trace.vcd")]
    vcd: Option<Utf8PathBuf>,

    /// Extra cycles to run after the script completes
    #[arg(long, default_value = "20000")]
    run_cycles: u64,

    /// Monitor an output-port bit (0-7) and report measured PWM timing
    #[arg(long)]
    monitor: Option<u8>,

    /// List the register map and exit
    #[arg(long)]
    list_registers: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.list_registers {
        println!("Register map:");
        println!(
            "  0x{REG_OUT_DATA:02x}  out_data     static output-port levels (non-PWM pins)"
        );
        println!("  0x{REG_BIDIR_DATA:02x}  bidir_data   bidirectional-port levels");
        println!("  0x{REG_PWM_ENABLE:02x}  pwm_enable   per-bit PWM routing for the output port");
        println!("  0x{REG_DUTY:02x}  duty         shared duty cycle, 0x00-0xFF");
        return Ok(());
    }

    let script_path = args
        .script
        .ok_or_else(|| anyhow::anyhow!("SCRIPT argument is required"))?;
    let text = std::fs::read_to_string(&script_path)
        .with_context(|| format!("Failed to read script {script_path}"))?;
    let commands = parse_script(&text).context("Failed to parse script")?;

    let mut monitor = match args.monitor {
        Some(bit) if bit > 7 => anyhow::bail!("Monitor bit {} out of range 0-7", bit),
        Some(bit) => Some((bit, PwmMonitor::new())),
        None => None,
    };

    let mut sim = Simulator::new();
    if let Some(vcd) = &args.vcd {
        sim.open_vcd(vcd.as_std_path())?;
    }

    sim.reset()?;
    println!("Reset complete, running {} command(s)", commands.len());

    for command in &commands {
        match *command {
            Command::Write { address, data } => {
                sim.write_reg(address, data)?;
                println!(
                    "write 0x{:02x} = 0x{:02x}   port_out=0x{:02x} port_bidir=0x{:02x}",
                    address,
                    data,
                    sim.port_out(),
                    sim.port_bidir()
                );
            }
            Command::Read { address } => {
                let value = sim.read_reg(address)?;
                println!("read  0x{address:02x} -> 0x{value:02x} (internal latch, nothing driven on a pin)");
            }
            Command::Idle { ticks } => {
                sim.run(ticks)?;
                println!("idle  {ticks} ticks");
            }
            Command::Reset => {
                sim.reset()?;
                println!("reset ports cleared");
            }
        }
    }

    let mut last_measurement = None;
    for _ in 0..args.run_cycles {
        sim.tick()?;
        if let Some((bit, monitor)) = monitor.as_mut() {
            let level = (sim.port_out() >> *bit) & 1;
            if let Some(measurement) = monitor.process(level) {
                last_measurement = Some(measurement);
            }
        }
    }

    if let Some((bit, _)) = &monitor {
        match last_measurement {
            Some(m) => println!(
                "PWM on output bit {}: {:.1} Hz, {:.2}% duty ({} of {} ticks high)",
                bit,
                m.frequency_hz(CLOCK_HZ),
                m.duty_percent(),
                m.high_ticks,
                m.period_ticks
            ),
            None => println!("PWM on output bit {bit}: no complete carrier cycle observed"),
        }
    }

    println!(
        "Done at t={} ticks, port_out=0x{:02x} port_bidir=0x{:02x}",
        sim.timestamp(),
        sim.port_out(),
        sim.port_bidir()
    );

    sim.close_vcd()?;
    Ok(())
}
