//! Voltage state vectors.

use super::types::{Pin, PinKind};

/// The three dense voltage vectors the solver works on.
///
/// Components read voltages through [`CircuitState::voltage`]; only the
/// solver writes `dynamic_state`, only the per-block driver writes
/// `input_state`, and `static_state` is fixed by the builder.
#[derive(Debug, Clone)]
pub struct CircuitState {
    /// Solved node voltages, one per dynamic pin.
    pub dynamic_state: Vec<f64>,
    /// Fixed voltages (rails, ground), one per static pin.
    pub static_state: Vec<f64>,
    /// Externally driven voltages, one per input pin.
    pub input_state: Vec<f64>,
}

impl CircuitState {
    /// Create a zeroed state for the given pin counts.
    pub fn new(nb_dynamic: usize, nb_static: usize, nb_input: usize) -> Self {
        Self {
            dynamic_state: vec![0.0; nb_dynamic],
            static_state: vec![0.0; nb_static],
            input_state: vec![0.0; nb_input],
        }
    }

    /// Read the voltage at a pin. Constant time.
    ///
    /// An out-of-range index is a wiring bug upstream and panics.
    #[inline]
    pub fn voltage(&self, pin: Pin) -> f64 {
        match pin.kind {
            PinKind::Dynamic => self.dynamic_state[pin.index],
            PinKind::Static => self.static_state[pin.index],
            PinKind::Input => self.input_state[pin.index],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voltage_selects_vector_by_kind() {
        let mut state = CircuitState::new(2, 1, 1);
        state.dynamic_state[1] = 1.5;
        state.static_state[0] = 9.0;
        state.input_state[0] = -0.25;

        assert_eq!(state.voltage(Pin::dynamic(1)), 1.5);
        assert_eq!(state.voltage(Pin::static_pin(0)), 9.0);
        assert_eq!(state.voltage(Pin::input(0)), -0.25);
        assert_eq!(state.voltage(Pin::dynamic(0)), 0.0);
    }
}
