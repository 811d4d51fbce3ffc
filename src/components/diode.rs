//! Diode models.
//!
//! Both models follow the Shockley equation
//!   I = Is * (exp(Vd / (n * Vt)) - 1)
//! in residual form: the solver's step clamp keeps the exponential in a
//! sane range during Newton iteration.

use crate::circuit::{CircuitState, Pin};
use crate::THERMAL_VOLTAGE;

use super::Component;

/// A diode between two pins, `[anode, cathode]`.
#[derive(Debug)]
pub struct Diode {
    name: String,
    pins: Vec<Pin>,
    /// Saturation current (A)
    is: f64,
    /// Ideality factor
    n: f64,
    /// Thermal voltage (V)
    vt: f64,
}

impl Diode {
    /// Create a diode with explicit Shockley parameters.
    pub fn with_params(name: impl Into<String>, is: f64, n: f64, vt: f64) -> Self {
        Self {
            name: name.into(),
            pins: Vec::new(),
            is,
            n,
            vt,
        }
    }

    /// Create a diode with typical silicon parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_params(name, 1e-14, 1.24, THERMAL_VOLTAGE)
    }

    fn exp_vd(&self, state: &CircuitState) -> f64 {
        let vd = state.voltage(self.pins[0]) - state.voltage(self.pins[1]);
        (vd / (self.n * self.vt)).exp()
    }
}

impl Component for Diode {
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
        // Forward current leaves the anode node and enters the cathode node
        let sign = if pin_index == 1 { 1.0 } else { -1.0 };
        self.is * (self.exp_vd(state) - 1.0) * sign
    }

    fn gradient(
        &self,
        eq_pin: usize,
        wrt_pin: usize,
        state: &CircuitState,
        _steady_state: bool,
    ) -> f64 {
        let g = self.is / (self.n * self.vt) * self.exp_vd(state);
        let wrt_sign = if wrt_pin == 0 { 1.0 } else { -1.0 };
        let eq_sign = if eq_pin == 1 { 1.0 } else { -1.0 };
        g * wrt_sign * eq_sign
    }
}

/// Two diodes in anti-parallel between two pins, the classic clipping pair.
#[derive(Debug)]
pub struct AntiParallelDiode {
    name: String,
    pins: Vec<Pin>,
    is: f64,
    n: f64,
    vt: f64,
}

impl AntiParallelDiode {
    /// Create a pair with explicit Shockley parameters.
    pub fn with_params(name: impl Into<String>, is: f64, n: f64, vt: f64) -> Self {
        Self {
            name: name.into(),
            pins: Vec::new(),
            is,
            n,
            vt,
        }
    }

    /// Create a pair with typical silicon parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_params(name, 1e-14, 1.24, THERMAL_VOLTAGE)
    }

    fn exp_vd(&self, state: &CircuitState) -> f64 {
        let vd = state.voltage(self.pins[0]) - state.voltage(self.pins[1]);
        (vd / (self.n * self.vt)).exp()
    }
}

impl Component for AntiParallelDiode {
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
        let e = self.exp_vd(state);
        let sign = if pin_index == 1 { 1.0 } else { -1.0 };
        self.is * (e - 1.0 / e) * sign
    }

    fn gradient(
        &self,
        eq_pin: usize,
        wrt_pin: usize,
        state: &CircuitState,
        _steady_state: bool,
    ) -> f64 {
        let e = self.exp_vd(state);
        let g = self.is / (self.n * self.vt) * (e + 1.0 / e);
        let wrt_sign = if wrt_pin == 0 { 1.0 } else { -1.0 };
        let eq_sign = if eq_pin == 1 { 1.0 } else { -1.0 };
        g * wrt_sign * eq_sign
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diode_at(vd: f64) -> (Diode, CircuitState) {
        let mut state = CircuitState::new(2, 0, 0);
        state.dynamic_state[0] = vd;
        let mut d = Diode::new("D1");
        d.set_pins(vec![Pin::dynamic(0), Pin::dynamic(1)]);
        (d, state)
    }

    #[test]
    fn test_diode_forward_bias() {
        let (d, state) = diode_at(0.0);
        assert!(d.current(1, &state, false).abs() < 1e-10);

        let (d, state) = diode_at(0.6);
        let i_forward = d.current(1, &state, false);
        assert!(i_forward > 0.0);

        // Exponential growth with forward voltage
        let (d, state) = diode_at(0.7);
        assert!(d.current(1, &state, false) > i_forward * 10.0);
    }

    #[test]
    fn test_diode_reverse_bias() {
        let (d, state) = diode_at(-1.0);
        let i_rev = d.current(1, &state, false);
        assert!(i_rev < 0.0);
        assert!(i_rev > -2e-14);
    }

    #[test]
    fn test_antiparallel_symmetry() {
        let mut state = CircuitState::new(2, 0, 0);
        let mut d = AntiParallelDiode::new("D1");
        d.set_pins(vec![Pin::dynamic(0), Pin::dynamic(1)]);

        state.dynamic_state[0] = 0.5;
        let i_pos = d.current(1, &state, false);
        state.dynamic_state[0] = -0.5;
        let i_neg = d.current(1, &state, false);

        assert!((i_pos + i_neg).abs() < 1e-15);
    }

    #[test]
    fn test_diode_gradient_matches_current() {
        let (d, mut state) = diode_at(0.55);
        let dx = 1e-9;
        for eq in 0..2 {
            for wrt in 0..2 {
                let base = d.current(eq, &state, false);
                state.dynamic_state[wrt] += dx;
                let bumped = d.current(eq, &state, false);
                state.dynamic_state[wrt] -= dx;
                let numerical = (bumped - base) / dx;
                let analytic = d.gradient(eq, wrt, &state, false);
                assert!(
                    (analytic - numerical).abs() < 1e-4 * analytic.abs().max(1e-12),
                    "gradient({eq},{wrt}): {analytic} vs {numerical}"
                );
            }
        }
    }
}
