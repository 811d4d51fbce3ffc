//! Voltage and current sources.

use crate::circuit::{CircuitState, Pin};

use super::{pin_sign, Component};

/// An ideal voltage source between two pins, `[negative, positive]`.
///
/// An ideal source is rank-deficient under pure nodal analysis, so it
/// claims the Kirchhoff equation at its positive pin and replaces it with
///   v+ - v- - V = 0
/// The positive pin must therefore be dynamic.
#[derive(Debug)]
pub struct VoltageSource {
    name: String,
    pins: Vec<Pin>,
    voltage: f64,
}

impl VoltageSource {
    /// Create a new voltage source.
    pub fn new(name: impl Into<String>, voltage: f64) -> Self {
        Self {
            name: name.into(),
            pins: Vec::new(),
            voltage,
        }
    }

    /// Get the source voltage.
    pub fn voltage(&self) -> f64 {
        self.voltage
    }
}

impl Component for VoltageSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn nb_pins(&self) -> usize {
        2
    }

    fn pins(&self) -> &[Pin] {
        &self.pins
    }

    fn set_pins(&mut self, pins: Vec<Pin>) {
        self.pins = pins;
    }

    fn equation_claims(&self) -> Vec<(usize, usize)> {
        vec![(1, 0)]
    }

    fn current(&self, _pin_index: usize, _state: &CircuitState, _steady_state: bool) -> f64 {
        // The branch current is whatever the node needs; the override
        // row carries the constraint instead.
        0.0
    }

    fn gradient(
        &self,
        _eq_pin: usize,
        _wrt_pin: usize,
        _state: &CircuitState,
        _steady_state: bool,
    ) -> f64 {
        0.0
    }

    fn equation(
        &self,
        _eq_index: usize,
        _dyn_pin: usize,
        residual: &mut f64,
        jacobian_row: &mut [f64],
        state: &CircuitState,
        _steady_state: bool,
    ) {
        *residual = state.voltage(self.pins[1]) - state.voltage(self.pins[0]) - self.voltage;
        if self.pins[1].is_dynamic() {
            jacobian_row[self.pins[1].index] += 1.0;
        }
        if self.pins[0].is_dynamic() {
            jacobian_row[self.pins[0].index] -= 1.0;
        }
    }

    fn nb_parameters(&self) -> usize {
        1
    }

    fn parameter_name(&self, _index: usize) -> &str {
        "voltage"
    }

    fn parameter(&self, _index: usize) -> f64 {
        self.voltage
    }

    fn set_parameter(&mut self, _index: usize, value: f64) {
        self.voltage = value;
    }
}

/// An ideal current source between two pins.
///
/// A positive value drives current out of pin 0's node and into pin 1's.
#[derive(Debug)]
pub struct CurrentSource {
    name: String,
    pins: Vec<Pin>,
    current: f64,
}

impl CurrentSource {
    /// Create a new current source.
    pub fn new(name: impl Into<String>, current: f64) -> Self {
        Self {
            name: name.into(),
            pins: Vec::new(),
            current,
        }
    }
}

impl Component for CurrentSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn nb_pins(&self) -> usize {
        2
    }

    fn pins(&self) -> &[Pin] {
        &self.pins
    }

    fn set_pins(&mut self, pins: Vec<Pin>) {
        self.pins = pins;
    }

    fn current(&self, pin_index: usize, _state: &CircuitState, _steady_state: bool) -> f64 {
        -self.current * pin_sign(pin_index)
    }

    fn gradient(
        &self,
        _eq_pin: usize,
        _wrt_pin: usize,
        _state: &CircuitState,
        _steady_state: bool,
    ) -> f64 {
        0.0
    }

    fn nb_parameters(&self) -> usize {
        1
    }

    fn parameter_name(&self, _index: usize) -> &str {
        "current"
    }

    fn parameter(&self, _index: usize) -> f64 {
        self.current
    }

    fn set_parameter(&mut self, _index: usize, value: f64) {
        self.current = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voltage_source_equation() {
        let mut state = CircuitState::new(1, 1, 0);
        state.static_state[0] = 0.0;
        state.dynamic_state[0] = 3.0;

        let mut source = VoltageSource::new("V1", 5.0);
        source.set_pins(vec![Pin::static_pin(0), Pin::dynamic(0)]);

        let mut residual = 0.0;
        let mut row = vec![0.0];
        source.equation(0, 0, &mut residual, &mut row, &state, false);

        // v+ - v- - V = 3 - 0 - 5
        assert!((residual + 2.0).abs() < 1e-12);
        assert_eq!(row, vec![1.0]);
    }

    #[test]
    fn test_current_source_direction() {
        let state = CircuitState::new(2, 0, 0);
        let mut source = CurrentSource::new("I1", 2e-3);
        source.set_pins(vec![Pin::dynamic(0), Pin::dynamic(1)]);

        assert!((source.current(0, &state, false) + 2e-3).abs() < 1e-15);
        assert!((source.current(1, &state, false) - 2e-3).abs() < 1e-15);
    }
}
