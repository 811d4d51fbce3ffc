//! Main simulator interface: setup and per-block processing.

use log::{debug, warn};

use crate::circuit::{validate_wiring, Circuit};
use crate::error::{NodalError, Result};

use super::newton::{NewtonRaphson, SolverConfig};

/// The block-processing driver around a [`Circuit`].
///
/// Owns the circuit and the solver, establishes the DC operating point at
/// [`Simulator::setup`], and then advances the model one sample at a time
/// inside [`Simulator::process_block`].
#[derive(Debug)]
pub struct Simulator {
    /// The circuit being simulated
    circuit: Circuit,
    /// Newton-Raphson solver, sized for the circuit
    newton: NewtonRaphson,
    /// Sample rate in Hz
    sample_rate: f64,
    /// Time step (1/sample_rate)
    dt: f64,
    /// Dynamic pin read by each output port
    output_pins: Vec<usize>,
    /// Samples where the solver reported a numerical failure
    numerical_failures: u64,
}

impl Simulator {
    /// Create a new simulator with the default solver configuration.
    pub fn new(circuit: Circuit, sample_rate: f64) -> Self {
        Self::with_config(circuit, sample_rate, SolverConfig::default())
    }

    /// Create a new simulator with a custom solver configuration.
    pub fn with_config(circuit: Circuit, sample_rate: f64, config: SolverConfig) -> Self {
        let newton = NewtonRaphson::with_config(circuit.nb_dynamic_pins(), config);
        // Output port o reads dynamic pin o unless remapped
        let output_pins = (0..circuit.nb_dynamic_pins()).collect();
        Self {
            circuit,
            newton,
            sample_rate,
            dt: 1.0 / sample_rate,
            output_pins,
            numerical_failures: 0,
        }
    }

    /// Get the sample rate.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Choose which dynamic pin each output port reads.
    pub fn set_output_pins(&mut self, pins: Vec<usize>) -> Result<()> {
        for &pin in &pins {
            if pin >= self.circuit.nb_dynamic_pins() {
                return Err(NodalError::PinOutOfRange {
                    name: "output port".to_string(),
                    pin: crate::circuit::Pin::dynamic(pin),
                });
            }
        }
        self.output_pins = pins;
        Ok(())
    }

    /// Number of solves that failed to converge or hit a singular
    /// Jacobian since construction. Diagnostics only; the affected
    /// samples still carry the last iterate.
    pub fn numerical_failures(&self) -> u64 {
        self.numerical_failures
    }

    /// Establish the DC operating point and freeze the wiring.
    ///
    /// Runs the steady-state pass over all components, solves the DC
    /// bias with reactive elements at their long-time equivalents, and
    /// re-centres the companion histories on the solution so a held
    /// input reproduces the operating point exactly.
    pub fn setup(&mut self) -> Result<()> {
        if self.circuit.initialized {
            return Err(NodalError::AlreadyInitialized {
                operation: "setup".to_string(),
            });
        }

        validate_wiring(&self.circuit)?;

        self.circuit.precompute_all(self.dt, true);
        let iterations = self.newton.solve(&mut self.circuit, true)?;
        self.circuit.precompute_all(self.dt, true);
        self.circuit.update_state_all();

        debug!(
            "DC operating point after {} iterations: {:?}",
            iterations,
            self.circuit.dynamic_state()
        );

        self.circuit.initialized = true;
        Ok(())
    }

    /// Process one block of samples.
    ///
    /// `inputs` holds one buffer per input pin, `outputs` one buffer per
    /// output port; all buffers must share a length. Numerical failures
    /// do not abort the block: the degraded sample is still written and
    /// the failure counter advances.
    pub fn process_block(&mut self, inputs: &[&[f64]], outputs: &mut [&mut [f64]]) -> Result<()> {
        if !self.circuit.initialized {
            return Err(NodalError::NotInitialized {
                operation: "process_block".to_string(),
            });
        }

        if inputs.len() != self.circuit.nb_input_pins() {
            return Err(NodalError::dimension(
                "input buffers",
                self.circuit.nb_input_pins(),
                inputs.len(),
            ));
        }
        if outputs.len() > self.output_pins.len() {
            return Err(NodalError::dimension(
                "output buffers",
                self.output_pins.len(),
                outputs.len(),
            ));
        }

        let block_size = inputs
            .first()
            .map(|buffer| buffer.len())
            .or_else(|| outputs.first().map(|buffer| buffer.len()))
            .unwrap_or(0);

        for buffer in inputs {
            if buffer.len() != block_size {
                return Err(NodalError::dimension("input buffer", block_size, buffer.len()));
            }
        }
        for buffer in outputs.iter() {
            if buffer.len() != block_size {
                return Err(NodalError::dimension(
                    "output buffer",
                    block_size,
                    buffer.len(),
                ));
            }
        }

        for t in 0..block_size {
            for (pin, buffer) in inputs.iter().enumerate() {
                self.circuit.state.input_state[pin] = buffer[t];
            }

            self.circuit.precompute_all(self.dt, false);

            match self.newton.solve(&mut self.circuit, false) {
                Ok(_) => {}
                Err(error @ (NodalError::ConvergenceFailure { .. } | NodalError::SingularMatrix)) => {
                    self.numerical_failures += 1;
                    warn!("sample {t}: {error}");
                }
                Err(error) => return Err(error),
            }

            self.circuit.update_state_all();

            for (port, buffer) in outputs.iter_mut().enumerate() {
                buffer[t] = self.circuit.state.dynamic_state[self.output_pins[port]];
            }
        }

        Ok(())
    }

    /// Process a single mono stream through the first input pin and the
    /// first output port.
    pub fn process(&mut self, input: &[f64], output: &mut [f64]) -> Result<()> {
        let mut outputs = [output];
        self.process_block(&[input], &mut outputs)
    }

    /// Get a reference to the circuit.
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Get a mutable reference to the circuit, e.g. for parameter
    /// updates between blocks.
    pub fn circuit_mut(&mut self) -> &mut Circuit {
        &mut self.circuit
    }
}
