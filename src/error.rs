//! Error types for the Nodal circuit modeller.
//!
//! This module provides a unified error type [`NodalError`] that covers
//! all error conditions that can occur during circuit wiring, setup,
//! and simulation.

use thiserror::Error;

use crate::circuit::Pin;

/// Result type alias using [`NodalError`].
pub type Result<T> = std::result::Result<T, NodalError>;

/// Unified error type for all Nodal operations.
#[derive(Error, Debug)]
pub enum NodalError {
    // ============ Wiring Errors ============
    /// Component wired with the wrong number of pins
    #[error("Component '{name}' expects {expected} pins, got {actual}")]
    PinCountMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// Pin index outside the declared pin ranges
    #[error("Component '{name}' wired to out-of-range pin {pin}")]
    PinOutOfRange { name: String, pin: Pin },

    /// Equation override claimed on a pin that is not dynamic
    #[error("Component '{name}' claims an equation override on non-dynamic pin {pin}")]
    InvalidOverride { name: String, pin: Pin },

    /// Dynamic pin with no incident component and no override equation
    #[error("Floating dynamic pin {pin} - no component drives its equation")]
    FloatingPin { pin: usize },

    // ============ Lifecycle Errors ============
    /// Builder operation attempted after setup
    #[error("'{operation}' called after setup - the circuit is frozen")]
    AlreadyInitialized { operation: String },

    /// Processing attempted before setup
    #[error("'{operation}' called before setup")]
    NotInitialized { operation: String },

    // ============ Dimension Errors ============
    /// A vector passed to the builder has the wrong length
    #[error("{what} has length {actual}, expected {expected}")]
    DimensionMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    // ============ Simulation Errors ============
    /// Jacobian LU factorisation failed
    #[error("Singular Jacobian - circuit may have a floating node or short circuit")]
    SingularMatrix,

    /// Newton-Raphson iteration did not converge
    #[error("Newton-Raphson did not converge after {iterations} iterations (residual: {residual:.2e})")]
    ConvergenceFailure { iterations: usize, residual: f64 },

    // ============ Parameter Errors ============
    /// Flattened parameter identifier out of range
    #[error("No parameter with identifier {identifier}")]
    UnknownParameter { identifier: usize },

    // ============ I/O Errors ============
    /// Error reading audio input
    #[error("Audio input error: {message}")]
    AudioInputError { message: String },

    /// Error writing audio output
    #[error("Audio output error: {message}")]
    AudioOutputError { message: String },
}

impl NodalError {
    /// Create a pin-count mismatch error
    pub fn pin_count(name: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::PinCountMismatch {
            name: name.into(),
            expected,
            actual,
        }
    }

    /// Create a dimension mismatch error
    pub fn dimension(what: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            what: what.into(),
            expected,
            actual,
        }
    }

    /// Create a convergence failure error
    pub fn convergence_failure(iterations: usize, residual: f64) -> Self {
        Self::ConvergenceFailure {
            iterations,
            residual,
        }
    }
}
