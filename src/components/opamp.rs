//! Ideal op-amp and controlled voltage stages.
//!
//! Both components are rank-deficient in nodal form and therefore claim
//! the Kirchhoff equation at their output pin, replacing it with a
//! constraint on the surrounding voltages.

use crate::circuit::{CircuitState, Pin, PinKind};

use super::Component;

/// An ideal op-amp between three pins, `[inverting, non-inverting, output]`.
///
/// The feedback network is assumed to keep the device in its linear
/// region, so the output-pin equation becomes the virtual-short
/// constraint v- = v+. Input impedance is infinite: the input pins draw
/// no current.
#[derive(Debug)]
pub struct OpAmp {
    name: String,
    pins: Vec<Pin>,
}

impl OpAmp {
    /// Create a new ideal op-amp.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pins: Vec::new(),
        }
    }
}

impl Component for OpAmp {
    fn name(&self) -> &str {
        &self.name
    }

    fn nb_pins(&self) -> usize {
        3
    }

    fn pins(&self) -> &[Pin] {
        &self.pins
    }

    fn set_pins(&mut self, pins: Vec<Pin>) {
        self.pins = pins;
    }

    fn equation_claims(&self) -> Vec<(usize, usize)> {
        vec![(2, 0)]
    }

    fn current(&self, _pin_index: usize, _state: &CircuitState, _steady_state: bool) -> f64 {
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
        *residual = state.voltage(self.pins[0]) - state.voltage(self.pins[1]);
        if self.pins[0].is_dynamic() {
            jacobian_row[self.pins[0].index] += 1.0;
        }
        if self.pins[1].is_dynamic() {
            jacobian_row[self.pins[1].index] -= 1.0;
        }
    }
}

/// A differential voltage gain stage between four pins,
/// `[in+, in-, out+, out-]`, enforcing
///   gain * (vi+ - vi-) = vo+ - vo-
/// at its out+ pin.
#[derive(Debug)]
pub struct VoltageGain {
    name: String,
    pins: Vec<Pin>,
    gain: f64,
}

impl VoltageGain {
    /// Create a new gain stage.
    pub fn new(name: impl Into<String>, gain: f64) -> Self {
        Self {
            name: name.into(),
            pins: Vec::new(),
            gain,
        }
    }
}

impl Component for VoltageGain {
    fn name(&self) -> &str {
        &self.name
    }

    fn nb_pins(&self) -> usize {
        4
    }

    fn pins(&self) -> &[Pin] {
        &self.pins
    }

    fn set_pins(&mut self, pins: Vec<Pin>) {
        self.pins = pins;
    }

    fn equation_claims(&self) -> Vec<(usize, usize)> {
        vec![(2, 0)]
    }

    fn current(&self, _pin_index: usize, _state: &CircuitState, _steady_state: bool) -> f64 {
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
        *residual = self.gain * (state.voltage(self.pins[0]) - state.voltage(self.pins[1]))
            - (state.voltage(self.pins[2]) - state.voltage(self.pins[3]));
        let weights = [self.gain, -self.gain, -1.0, 1.0];
        for (pin, weight) in self.pins.iter().zip(weights) {
            if pin.kind == PinKind::Dynamic {
                jacobian_row[pin.index] += weight;
            }
        }
    }

    fn nb_parameters(&self) -> usize {
        1
    }

    fn parameter_name(&self, _index: usize) -> &str {
        "gain"
    }

    fn parameter(&self, _index: usize) -> f64 {
        self.gain
    }

    fn set_parameter(&mut self, _index: usize, value: f64) {
        self.gain = value;
    }
}
