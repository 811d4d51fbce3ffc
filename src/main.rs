//! Nodal - Analog Circuit Modeller
//!
//! Streams audio through a simulated analog circuit.
//!
//! # Usage
//!
//! ```bash
//! ffmpeg -i input.wav -f f32le -ac 1 -ar 48000 - | nodal rc-lowpass | ffmpeg -f f32le -ac 1 -ar 48000 -i - output.wav
//! ```

use clap::{Parser, ValueEnum};
use nodal_core::{
    audio::process_audio,
    components::{AntiParallelDiode, Capacitor, Resistor},
    error::Result,
    Circuit, Pin, Simulator, SolverConfig, DEFAULT_SAMPLE_RATE,
};

/// Built-in demonstration circuits.
#[derive(ValueEnum, Clone, Copy, Debug)]
enum DemoCircuit {
    /// First-order RC low-pass filter
    RcLowpass,
    /// Resistor into an anti-parallel diode pair
    DiodeClipper,
}

/// Analog circuit modeller
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Built-in circuit to run
    #[arg(value_enum, value_name = "CIRCUIT")]
    circuit: DemoCircuit,

    /// Sample rate in Hz
    #[arg(short, long, default_value_t = DEFAULT_SAMPLE_RATE)]
    sample_rate: f64,

    /// Series resistance in ohms
    #[arg(short, long, default_value_t = 1000.0)]
    resistance: f64,

    /// Shunt capacitance in farads (rc-lowpass only)
    #[arg(short, long, default_value_t = 33e-9)]
    capacitance: f64,

    /// Maximum Newton-Raphson iterations per sample
    #[arg(short = 'i', long)]
    max_iterations: Option<usize>,

    /// Convergence tolerance on the Newton update (in volts)
    #[arg(short = 't', long)]
    tolerance: Option<f64>,
}

fn build_circuit(args: &Args) -> Result<Circuit> {
    let mut circuit = Circuit::new(1, 1, 1);
    circuit.set_dynamic_pin_names(vec!["out".to_string()])?;
    circuit.set_static_pin_names(vec!["gnd".to_string()])?;

    circuit.add_component(
        Box::new(Resistor::new("R1", args.resistance)),
        vec![Pin::input(0), Pin::dynamic(0)],
    )?;

    match args.circuit {
        DemoCircuit::RcLowpass => {
            circuit.add_component(
                Box::new(Capacitor::new("C1", args.capacitance)),
                vec![Pin::static_pin(0), Pin::dynamic(0)],
            )?;
        }
        DemoCircuit::DiodeClipper => {
            circuit.add_component(
                Box::new(AntiParallelDiode::new("D1")),
                vec![Pin::dynamic(0), Pin::static_pin(0)],
            )?;
        }
    }

    Ok(circuit)
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    let circuit = build_circuit(&args)?;

    let mut config = SolverConfig::new();
    if let Some(max_iterations) = args.max_iterations {
        config = config.with_max_iterations(max_iterations);
    }
    if let Some(tolerance) = args.tolerance {
        config = config.with_x_tolerance(tolerance);
    }

    let mut simulator = Simulator::with_config(circuit, args.sample_rate, config);
    simulator.setup()?;

    process_audio(&mut simulator)?;

    Ok(())
}
