//! Newton-Raphson iteration over the dynamic-pin voltages.

use log::trace;

use crate::circuit::Circuit;
use crate::error::{NodalError, Result};

use super::linear::NodalSystem;
use super::{DEFAULT_F_TOLERANCE, DEFAULT_MAX_DELTA, DEFAULT_MAX_ITERATIONS, DEFAULT_X_TOLERANCE};

/// Configuration for the Newton-Raphson solver.
///
/// All knobs are per-instance; there is no process-wide tuning.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Maximum Newton-Raphson iterations per solve.
    pub max_iterations: usize,
    /// Convergence threshold on the residual infinity norm (amperes).
    pub f_tolerance: f64,
    /// Convergence threshold on the update infinity norm (volts).
    pub x_tolerance: f64,
    /// Largest voltage step applied per iteration; bigger updates are
    /// rescaled. Keeps exponential devices from overshooting.
    pub max_delta: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            f_tolerance: DEFAULT_F_TOLERANCE,
            x_tolerance: DEFAULT_X_TOLERANCE,
            max_delta: DEFAULT_MAX_DELTA,
        }
    }
}

impl SolverConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum Newton-Raphson iterations.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the residual convergence threshold (in amperes).
    pub fn with_f_tolerance(mut self, f_tolerance: f64) -> Self {
        self.f_tolerance = f_tolerance;
        self
    }

    /// Set the update convergence threshold (in volts).
    pub fn with_x_tolerance(mut self, x_tolerance: f64) -> Self {
        self.x_tolerance = x_tolerance;
        self
    }

    /// Set the per-iteration voltage step limit.
    pub fn with_max_delta(mut self, max_delta: f64) -> Self {
        self.max_delta = max_delta;
        self
    }
}

/// Newton-Raphson solver for the dynamic-pin system.
#[derive(Debug)]
pub struct NewtonRaphson {
    config: SolverConfig,
    system: NodalSystem,
}

impl NewtonRaphson {
    /// Create a solver for a system of the given dimension.
    pub fn new(nb_dynamic: usize) -> Self {
        Self::with_config(nb_dynamic, SolverConfig::default())
    }

    /// Create a solver with a custom configuration.
    pub fn with_config(nb_dynamic: usize, config: SolverConfig) -> Self {
        Self {
            config,
            system: NodalSystem::new(nb_dynamic),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solve the circuit's dynamic voltages, warm-started from their
    /// present values. Returns the number of iterations used.
    ///
    /// On non-convergence the last iterate stays in `dynamic_state` so
    /// callers can still read a (degraded) solution.
    pub fn solve(&mut self, circuit: &mut Circuit, steady_state: bool) -> Result<usize> {
        for iteration in 0..self.config.max_iterations {
            if self.iterate(circuit, steady_state)? {
                trace!("converged after {} iterations", iteration + 1);
                return Ok(iteration + 1);
            }
        }

        Err(NodalError::convergence_failure(
            self.config.max_iterations,
            self.system.residual_max(),
        ))
    }

    /// One Newton-Raphson step. Returns true once converged.
    fn iterate(&mut self, circuit: &mut Circuit, steady_state: bool) -> Result<bool> {
        self.system.clear();

        // Populate the residual and Jacobian, one row per dynamic pin:
        // the override row if a component claimed the pin, otherwise the
        // Kirchhoff current sum over the incident components.
        for pin in 0..circuit.nb_dynamic_pins() {
            match circuit.override_eq[pin] {
                Some((component, eq_index)) => {
                    let (residual, row) = self.system.equation_row_mut(pin);
                    circuit.components[component].equation(
                        eq_index,
                        pin,
                        residual,
                        row,
                        &circuit.state,
                        steady_state,
                    );
                }
                None => {
                    for &(component, local) in &circuit.dynamic_pins[pin] {
                        let component = &circuit.components[component];
                        self.system.add_residual(
                            pin,
                            component.current(local, &circuit.state, steady_state),
                        );
                        for (wrt, wrt_pin) in component.pins().iter().enumerate() {
                            if wrt_pin.is_dynamic() {
                                self.system.add_jacobian(
                                    pin,
                                    wrt_pin.index,
                                    component.gradient(local, wrt, &circuit.state, steady_state),
                                );
                            }
                        }
                    }
                }
            }
        }

        // The equations may already balance
        if self.system.residual_max() < self.config.f_tolerance {
            return Ok(true);
        }

        self.system.factor()?;
        self.system.solve()?;

        let delta_max = self.system.delta_max();
        if delta_max > self.config.max_delta {
            self.system.scale_delta(self.config.max_delta / delta_max);
        }

        for (voltage, delta) in circuit
            .state
            .dynamic_state
            .iter_mut()
            .zip(self.system.delta())
        {
            *voltage -= delta;
        }

        Ok(delta_max < self.config.x_tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::Pin;
    use crate::components::{AntiParallelDiode, Resistor};

    /// 1k/1k divider from a 1V input to ground.
    fn divider() -> Circuit {
        let mut circuit = Circuit::new(1, 1, 1);
        circuit
            .add_component(
                Box::new(Resistor::new("R1", 1000.0)),
                vec![Pin::input(0), Pin::dynamic(0)],
            )
            .unwrap();
        circuit
            .add_component(
                Box::new(Resistor::new("R2", 1000.0)),
                vec![Pin::dynamic(0), Pin::static_pin(0)],
            )
            .unwrap();
        circuit.state.input_state[0] = 1.0;
        circuit
    }

    #[test]
    fn test_linear_circuit_converges_quickly() {
        let mut circuit = divider();
        let mut newton = NewtonRaphson::new(1);

        // 0.5V step is above max_delta, so the solve takes a few clamped
        // iterations plus the confirming one
        let iterations = newton.solve(&mut circuit, false).unwrap();
        assert!(iterations <= 6, "took {iterations} iterations");
        assert!((circuit.state.dynamic_state[0] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_warm_start_confirms_in_one_iteration() {
        let mut circuit = divider();
        let mut newton = NewtonRaphson::new(1);
        newton.solve(&mut circuit, false).unwrap();

        // Solving again from the answer costs a single iteration
        let iterations = newton.solve(&mut circuit, false).unwrap();
        assert_eq!(iterations, 1);
    }

    #[test]
    fn test_clipper_converges() {
        // 1V through 1k into an anti-parallel clipping pair
        let mut circuit = Circuit::new(1, 1, 1);
        circuit
            .add_component(
                Box::new(Resistor::new("R1", 1000.0)),
                vec![Pin::input(0), Pin::dynamic(0)],
            )
            .unwrap();
        circuit
            .add_component(
                Box::new(AntiParallelDiode::new("D1")),
                vec![Pin::dynamic(0), Pin::static_pin(0)],
            )
            .unwrap();
        circuit.state.input_state[0] = 1.0;

        let mut newton = NewtonRaphson::new(1);
        newton.solve(&mut circuit, false).unwrap();

        // The pair clamps the node well below the input
        let v = circuit.state.dynamic_state[0];
        assert!(v > 0.3 && v < 0.8, "clipped voltage {v}");

        // And KCL holds at the solution
        let residual = (1.0 - v) / 1000.0
            - 1e-14 * ((v / (1.24 * 26e-3)).exp() - (-v / (1.24 * 26e-3)).exp());
        assert!(residual.abs() < 1e-7);
    }

    #[test]
    fn test_floating_pin_is_singular() {
        // Pin 1 has nothing attached, so its Jacobian row is zero
        let mut circuit = Circuit::new(2, 0, 1);
        circuit
            .add_component(
                Box::new(Resistor::new("R1", 1000.0)),
                vec![Pin::input(0), Pin::dynamic(0)],
            )
            .unwrap();
        circuit.state.input_state[0] = 1.0;

        let mut newton = NewtonRaphson::new(2);
        let err = newton.solve(&mut circuit, false).unwrap_err();
        assert!(matches!(err, NodalError::SingularMatrix));
    }
}
