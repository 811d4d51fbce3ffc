//! Linear passive components: Resistor, Capacitor, Inductor.

use crate::circuit::{CircuitState, Pin};

use super::{pin_pair_voltage, pin_sign, Component};

/// A resistor between two pins.
#[derive(Debug)]
pub struct Resistor {
    name: String,
    pins: Vec<Pin>,
    resistance: f64,
    conductance: f64,
}

impl Resistor {
    /// Create a new resistor.
    pub fn new(name: impl Into<String>, resistance: f64) -> Self {
        let r = resistance.max(1e-12); // Minimum resistance to avoid singularity
        Self {
            name: name.into(),
            pins: Vec::new(),
            resistance: r,
            conductance: 1.0 / r,
        }
    }
}

impl Component for Resistor {
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

    fn current(&self, pin_index: usize, state: &CircuitState, _steady_state: bool) -> f64 {
        pin_pair_voltage(&self.pins, state) * self.conductance * pin_sign(pin_index)
    }

    fn gradient(
        &self,
        eq_pin: usize,
        wrt_pin: usize,
        _state: &CircuitState,
        _steady_state: bool,
    ) -> f64 {
        // d current(eq_pin) / d v(wrt_pin), with current = (v1 - v0) * G
        -pin_sign(wrt_pin) * pin_sign(eq_pin) * self.conductance
    }

    fn nb_parameters(&self) -> usize {
        1
    }

    fn parameter_name(&self, _index: usize) -> &str {
        "resistance"
    }

    fn parameter(&self, _index: usize) -> f64 {
        self.resistance
    }

    fn set_parameter(&mut self, _index: usize, value: f64) {
        self.resistance = value.max(1e-12);
        self.conductance = 1.0 / self.resistance;
    }
}

/// A capacitor between two pins.
///
/// Discretized with the trapezoidal rule as a Norton companion:
///   i(n) = c2t * v(n) - iceq
/// where c2t = 2C/dt and iceq carries the history from the previous
/// sample. In steady state the capacitor is an open circuit and
/// contributes nothing.
#[derive(Debug)]
pub struct Capacitor {
    name: String,
    pins: Vec<Pin>,
    capacitance: f64,
    /// Companion conductance 2C/dt, rebuilt every precompute
    c2t: f64,
    /// History current of the Norton equivalent
    iceq: f64,
}

impl Capacitor {
    /// Create a new capacitor.
    pub fn new(name: impl Into<String>, capacitance: f64) -> Self {
        Self {
            name: name.into(),
            pins: Vec::new(),
            capacitance,
            c2t: 0.0,
            iceq: 0.0,
        }
    }
}

impl Component for Capacitor {
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

    fn precompute(&mut self, state: &CircuitState, dt: f64, steady_state: bool) {
        self.c2t = 2.0 * self.capacitance / dt;
        if steady_state {
            // Centre the history on the present voltage so the first
            // transient sample starts from zero capacitor current.
            self.iceq = self.c2t * pin_pair_voltage(&self.pins, state);
        }
    }

    fn current(&self, pin_index: usize, state: &CircuitState, steady_state: bool) -> f64 {
        if steady_state {
            return 0.0;
        }
        (pin_pair_voltage(&self.pins, state) * self.c2t - self.iceq) * pin_sign(pin_index)
    }

    fn gradient(
        &self,
        eq_pin: usize,
        wrt_pin: usize,
        _state: &CircuitState,
        steady_state: bool,
    ) -> f64 {
        if steady_state {
            return 0.0;
        }
        -pin_sign(wrt_pin) * pin_sign(eq_pin) * self.c2t
    }

    fn update_state(&mut self, state: &CircuitState) {
        self.iceq = 2.0 * self.c2t * pin_pair_voltage(&self.pins, state) - self.iceq;
    }

    fn nb_parameters(&self) -> usize {
        1
    }

    fn parameter_name(&self, _index: usize) -> &str {
        "capacitance"
    }

    fn parameter(&self, _index: usize) -> f64 {
        self.capacitance
    }

    fn set_parameter(&mut self, _index: usize, value: f64) {
        self.capacitance = value;
    }
}

/// An inductor between two pins.
///
/// Trapezoidal companion with a Thevenin-style history voltage veq:
///   i(n) = (v(n) + veq) / l2t
/// where l2t = 2L/dt. In steady state an inductor is a near-short; it is
/// modelled with a large conductance so only DC paths matter.
#[derive(Debug)]
pub struct Inductor {
    name: String,
    pins: Vec<Pin>,
    inductance: f64,
    /// Companion impedance 2L/dt
    l2t: f64,
    invl2t: f64,
    /// History voltage of the companion model
    veq: f64,
}

impl Inductor {
    /// Conductance standing in for the DC short circuit.
    const STEADY_CONDUCTANCE: f64 = 1e6;

    /// Create a new inductor.
    pub fn new(name: impl Into<String>, inductance: f64) -> Self {
        Self {
            name: name.into(),
            pins: Vec::new(),
            inductance,
            l2t: 0.0,
            invl2t: 0.0,
            veq: 0.0,
        }
    }

    fn branch_current(&self, state: &CircuitState) -> f64 {
        (pin_pair_voltage(&self.pins, state) + self.veq) * self.invl2t
    }
}

impl Component for Inductor {
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

    fn precompute(&mut self, state: &CircuitState, dt: f64, steady_state: bool) {
        self.l2t = 2.0 * self.inductance / dt;
        self.invl2t = 1.0 / self.l2t;
        if steady_state {
            let dc_current = pin_pair_voltage(&self.pins, state) * Self::STEADY_CONDUCTANCE;
            self.veq = self.l2t * dc_current;
        }
    }

    fn current(&self, pin_index: usize, state: &CircuitState, steady_state: bool) -> f64 {
        let i = if steady_state {
            pin_pair_voltage(&self.pins, state) * Self::STEADY_CONDUCTANCE
        } else {
            self.branch_current(state)
        };
        i * pin_sign(pin_index)
    }

    fn gradient(
        &self,
        eq_pin: usize,
        wrt_pin: usize,
        _state: &CircuitState,
        steady_state: bool,
    ) -> f64 {
        let g = if steady_state {
            Self::STEADY_CONDUCTANCE
        } else {
            self.invl2t
        };
        -pin_sign(wrt_pin) * pin_sign(eq_pin) * g
    }

    fn update_state(&mut self, state: &CircuitState) {
        let i = self.branch_current(state);
        self.veq = 2.0 * self.l2t * i - self.veq;
    }

    fn nb_parameters(&self) -> usize {
        1
    }

    fn parameter_name(&self, _index: usize) -> &str {
        "inductance"
    }

    fn parameter(&self, _index: usize) -> f64 {
        self.inductance
    }

    fn set_parameter(&mut self, _index: usize, value: f64) {
        self.inductance = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_pin_state(v0: f64, v1: f64) -> (Vec<Pin>, CircuitState) {
        let mut state = CircuitState::new(2, 0, 0);
        state.dynamic_state[0] = v0;
        state.dynamic_state[1] = v1;
        (vec![Pin::dynamic(0), Pin::dynamic(1)], state)
    }

    #[test]
    fn test_resistor_current_signs() {
        let (pins, state) = two_pin_state(0.0, 1.0);
        let mut r = Resistor::new("R1", 1000.0);
        r.set_pins(pins);

        // 1V across 1k drives 1mA into pin 0's node, out of pin 1's
        assert!((r.current(0, &state, false) - 1e-3).abs() < 1e-12);
        assert!((r.current(1, &state, false) + 1e-3).abs() < 1e-12);
    }

    #[test]
    fn test_resistor_gradient_matches_current() {
        let (pins, mut state) = two_pin_state(0.25, -0.5);
        let mut r = Resistor::new("R1", 2200.0);
        r.set_pins(pins);

        // Finite-difference check of every Jacobian entry
        let dx = 1e-7;
        for eq in 0..2 {
            for wrt in 0..2 {
                let base = r.current(eq, &state, false);
                state.dynamic_state[wrt] += dx;
                let bumped = r.current(eq, &state, false);
                state.dynamic_state[wrt] -= dx;
                let numerical = (bumped - base) / dx;
                assert!(
                    (r.gradient(eq, wrt, &state, false) - numerical).abs() < 1e-6,
                    "gradient({eq},{wrt}) mismatch"
                );
            }
        }
    }

    #[test]
    fn test_capacitor_open_in_steady_state() {
        let (pins, state) = two_pin_state(0.0, 5.0);
        let mut c = Capacitor::new("C1", 1e-6);
        c.set_pins(pins);
        c.precompute(&state, 1.0 / 48000.0, true);

        assert_eq!(c.current(0, &state, true), 0.0);
        assert_eq!(c.gradient(0, 1, &state, true), 0.0);
    }

    #[test]
    fn test_capacitor_companion_model() {
        let (pins, mut state) = two_pin_state(0.0, 0.0);
        let mut c = Capacitor::new("C1", 1e-6);
        c.set_pins(pins);
        let dt = 1.0 / 48000.0;
        c.precompute(&state, dt, true);

        // Centred at 0V: no current yet
        assert!(c.current(0, &state, false).abs() < 1e-12);

        // Step the far pin to 1V: i = c2t * v
        state.dynamic_state[1] = 1.0;
        let c2t = 2.0 * 1e-6 * 48000.0;
        assert!((c.current(0, &state, false) - c2t).abs() < 1e-9);

        // After committing the sample the same voltage draws the
        // opposite history current
        c.update_state(&state);
        assert!((c.current(0, &state, false) + c2t).abs() < 1e-9);
    }

    #[test]
    fn test_inductor_steady_state_short() {
        let (pins, state) = two_pin_state(0.0, 1e-3);
        let mut l = Inductor::new("L1", 1e-3);
        l.set_pins(pins);
        l.precompute(&state, 1.0 / 48000.0, true);

        // 1mV across the near-short pushes 1kA-scale current: the node
        // is forced to the same potential in the DC solution
        assert!((l.current(0, &state, true) - 1e3).abs() < 1e-6);
    }
}
