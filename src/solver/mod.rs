//! Nonlinear solver for the dynamic-pin system.
//!
//! This module provides the numerical engine of the modeller.
//!
//! ## Method
//!
//! Each sample asks for the dynamic-pin voltage vector v satisfying one
//! scalar equation per pin: the Kirchhoff current sum of its incident
//! components, or a component-supplied override (ideal sources, op-amp
//! outputs). The system F(v) = 0 is solved by Newton-Raphson:
//!
//! 1. Assemble the residual F and the Jacobian J = dF/dv by asking each
//!    incident component for its contribution
//! 2. Solve J * delta = F with a dense LU decomposition
//! 3. Update v -= delta, until either norm drops under its tolerance
//!
//! Reactive components are discretized with the trapezoidal rule, so a
//! purely linear circuit converges in one step plus the confirming one.

mod linear;
mod newton;
mod simulator;

pub use linear::NodalSystem;
pub use newton::{NewtonRaphson, SolverConfig};
pub use simulator::Simulator;

/// Maximum Newton-Raphson iterations per solve.
pub const DEFAULT_MAX_ITERATIONS: usize = 200;

/// Convergence threshold on the residual infinity norm.
pub const DEFAULT_F_TOLERANCE: f64 = 1e-8;

/// Convergence threshold on the Newton update infinity norm.
pub const DEFAULT_X_TOLERANCE: f64 = 1e-8;

/// Largest per-iteration voltage step before rescaling.
pub const DEFAULT_MAX_DELTA: f64 = 1e-1;
