//! # Nodal Core
//!
//! A real-time analog circuit modeller for audio effects.
//!
//! This library provides:
//! - A programmatic builder for wiring two-or-more-terminal components
//!   between named pins
//! - A Newton-Raphson solver that balances Kirchhoff's current law at
//!   every dynamic node, every sample
//! - Component models for passives (R, C, L), sources, semiconductors
//!   (diodes, BJTs) and ideal active stages (op-amps, gain blocks)
//! - A block-processing driver for streaming audio through the model
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`circuit`] - Pin addressing, state vectors, and the circuit graph
//! - [`components`] - Component models and the [`components::Component`] contract
//! - [`solver`] - Residual/Jacobian assembly and Newton-Raphson solving
//! - [`audio`] - Audio I/O and processing (CLI only)
//!
//! ## Usage
//!
//! ```no_run
//! use nodal_core::{Circuit, Pin, Simulator};
//! use nodal_core::components::{Capacitor, Resistor};
//!
//! let mut circuit = Circuit::new(1, 1, 1);
//! circuit.add_component(
//!     Box::new(Resistor::new("R1", 1000.0)),
//!     vec![Pin::input(0), Pin::dynamic(0)],
//! )?;
//! circuit.add_component(
//!     Box::new(Capacitor::new("C1", 33e-9)),
//!     vec![Pin::static_pin(0), Pin::dynamic(0)],
//! )?;
//!
//! let mut sim = Simulator::new(circuit, 48000.0);
//! sim.setup()?;
//!
//! let input = vec![0.0; 256];
//! let mut output = vec![0.0; 256];
//! sim.process(&input, &mut output)?;
//! # Ok::<(), nodal_core::NodalError>(())
//! ```
//!
//! ## Simulation Method
//!
//! Each pin is addressed as (kind, index), with kind one of Input
//! (driven by the sample stream), Static (fixed rails) or Dynamic
//! (solved). Per sample the solver assembles one equation per dynamic
//! pin - the Kirchhoff current sum of the incident components, or an
//! override equation claimed by a rank-deficient component - and
//! iterates Newton-Raphson with a dense LU factorisation until both the
//! residual and the update are below tolerance.
//!
//! Reactive elements (C, L) are discretized using the trapezoidal rule
//! for accuracy and stability.

pub mod circuit;
pub mod components;
pub mod error;
pub mod solver;

#[cfg(feature = "cli")]
pub mod audio;

// Re-export main types for convenience
pub use circuit::{Circuit, CircuitState, ComponentId, Pin, PinKind};
pub use error::{NodalError, Result};
pub use solver::{Simulator, SolverConfig};

/// Default sample rate in Hz
pub const DEFAULT_SAMPLE_RATE: f64 = 48000.0;

/// Thermal voltage at room temperature (approximately 26mV)
pub const THERMAL_VOLTAGE: f64 = 26e-3;
