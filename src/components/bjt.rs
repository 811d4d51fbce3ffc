//! Bipolar junction transistor model.
//!
//! Ebers-Moll large-signal model between three pins, `[base, collector,
//! emitter]`. The two junction exponentials are shared between the base
//! and collector currents:
//!   ib = Is * ((exp(Vbe/Vt) - 1) / Bf + (exp(Vbc/Vt) - 1) / Br)
//!   ic = Is * ((exp(Vbe/Vt) - exp(Vbc/Vt)) - (exp(Vbc/Vt) - 1) / Br)
//! PNP devices mirror the polarities.

use crate::circuit::{CircuitState, Pin};
use crate::THERMAL_VOLTAGE;

use super::Component;

/// Transistor polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BjtType {
    Npn,
    Pnp,
}

/// A BJT between three pins, `[base, collector, emitter]`.
#[derive(Debug)]
pub struct Bjt {
    name: String,
    pins: Vec<Pin>,
    bjt_type: BjtType,
    /// Saturation current (A)
    is: f64,
    /// Thermal voltage times emission coefficient (V)
    vt: f64,
    /// Reverse beta
    br: f64,
    /// Forward beta
    bf: f64,
}

/// The junction exponentials at the present operating point.
struct Junctions {
    exp_vbe: f64,
    exp_vbc: f64,
}

impl Bjt {
    /// Create a transistor with explicit model parameters.
    pub fn with_params(
        name: impl Into<String>,
        bjt_type: BjtType,
        is: f64,
        vt: f64,
        ne: f64,
        br: f64,
        bf: f64,
    ) -> Self {
        Self {
            name: name.into(),
            pins: Vec::new(),
            bjt_type,
            is,
            vt: vt * ne,
            br,
            bf,
        }
    }

    /// Create a transistor with typical small-signal parameters.
    pub fn new(name: impl Into<String>, bjt_type: BjtType) -> Self {
        Self::with_params(name, bjt_type, 1e-12, THERMAL_VOLTAGE, 1.0, 1.0, 100.0)
    }

    fn junctions(&self, state: &CircuitState) -> Junctions {
        let vbe = state.voltage(self.pins[0]) - state.voltage(self.pins[2]);
        let vbc = state.voltage(self.pins[0]) - state.voltage(self.pins[1]);
        let polarity = match self.bjt_type {
            BjtType::Npn => 1.0,
            BjtType::Pnp => -1.0,
        };
        Junctions {
            exp_vbe: (polarity * vbe / self.vt).exp(),
            exp_vbc: (polarity * vbc / self.vt).exp(),
        }
    }

    fn ib(&self, j: &Junctions) -> f64 {
        self.is * ((j.exp_vbe - 1.0) / self.bf + (j.exp_vbc - 1.0) / self.br)
    }

    fn ic(&self, j: &Junctions) -> f64 {
        self.is * ((j.exp_vbe - j.exp_vbc) - (j.exp_vbc - 1.0) / self.br)
    }

    fn ib_vbe(&self, j: &Junctions) -> f64 {
        self.is * j.exp_vbe / self.vt / self.bf
    }

    fn ib_vbc(&self, j: &Junctions) -> f64 {
        self.is * j.exp_vbc / self.vt / self.br
    }

    fn ic_vbe(&self, j: &Junctions) -> f64 {
        self.is * j.exp_vbe / self.vt
    }

    fn ic_vbc(&self, j: &Junctions) -> f64 {
        self.is * (-j.exp_vbc - j.exp_vbc / self.br) / self.vt
    }
}

impl Component for Bjt {
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

    fn current(&self, pin_index: usize, state: &CircuitState, _steady_state: bool) -> f64 {
        let j = self.junctions(state);
        let polarity = match self.bjt_type {
            BjtType::Npn => 1.0,
            BjtType::Pnp => -1.0,
        };
        match pin_index {
            0 => -polarity * self.ib(&j),
            1 => -polarity * self.ic(&j),
            _ => polarity * (self.ib(&j) + self.ic(&j)),
        }
    }

    fn gradient(
        &self,
        eq_pin: usize,
        wrt_pin: usize,
        state: &CircuitState,
        _steady_state: bool,
    ) -> f64 {
        // The polarity factors cancel in the derivatives, so NPN and PNP
        // share the gradient table.
        let j = self.junctions(state);
        match (eq_pin, wrt_pin) {
            (0, 0) => -(self.ib_vbc(&j) + self.ib_vbe(&j)),
            (0, 1) => self.ib_vbc(&j),
            (0, 2) => self.ib_vbe(&j),
            (1, 0) => -(self.ic_vbc(&j) + self.ic_vbe(&j)),
            (1, 1) => self.ic_vbc(&j),
            (1, 2) => self.ic_vbe(&j),
            (2, 0) => {
                self.ib_vbe(&j) + self.ib_vbc(&j) + self.ic_vbe(&j) + self.ic_vbc(&j)
            }
            (2, 1) => -(self.ib_vbc(&j) + self.ic_vbc(&j)),
            _ => -(self.ib_vbe(&j) + self.ic_vbe(&j)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn npn_at(vb: f64, vc: f64, ve: f64) -> (Bjt, CircuitState) {
        let mut state = CircuitState::new(3, 0, 0);
        state.dynamic_state[0] = vb;
        state.dynamic_state[1] = vc;
        state.dynamic_state[2] = ve;
        let mut q = Bjt::new("Q1", BjtType::Npn);
        q.set_pins(vec![Pin::dynamic(0), Pin::dynamic(1), Pin::dynamic(2)]);
        (q, state)
    }

    #[test]
    fn test_currents_sum_to_zero() {
        // KCL across the device itself: the three pin currents cancel
        let (q, state) = npn_at(0.65, 3.0, 0.0);
        let total: f64 = (0..3).map(|pin| q.current(pin, &state, false)).sum();
        assert!(total.abs() < 1e-12);
    }

    #[test]
    fn test_active_region_gain() {
        let (q, state) = npn_at(0.65, 3.0, 0.0);
        let i_b = -q.current(0, &state, false);
        let i_c = -q.current(1, &state, false);

        // Forward active: collector current is roughly beta times base
        assert!(i_b > 0.0);
        assert!(i_c > 50.0 * i_b);
        assert!(i_c < 150.0 * i_b);
    }

    #[test]
    fn test_pnp_mirrors_npn() {
        let (npn, state) = npn_at(0.65, 3.0, 0.0);
        let mut pnp = Bjt::new("Q2", BjtType::Pnp);
        pnp.set_pins(vec![Pin::dynamic(0), Pin::dynamic(1), Pin::dynamic(2)]);

        let mut mirrored = CircuitState::new(3, 0, 0);
        for i in 0..3 {
            mirrored.dynamic_state[i] = -state.dynamic_state[i];
        }

        for pin in 0..3 {
            let i_npn = npn.current(pin, &state, false);
            let i_pnp = pnp.current(pin, &mirrored, false);
            assert!(
                (i_npn + i_pnp).abs() < 1e-12 * i_npn.abs().max(1e-15),
                "pin {pin}: {i_npn} vs {i_pnp}"
            );
        }
    }

    #[test]
    fn test_gradient_matches_current() {
        let (q, mut state) = npn_at(0.6, 2.0, 0.0);
        let dx = 1e-8;
        for eq in 0..3 {
            for wrt in 0..3 {
                let base = q.current(eq, &state, false);
                state.dynamic_state[wrt] += dx;
                let bumped = q.current(eq, &state, false);
                state.dynamic_state[wrt] -= dx;
                let numerical = (bumped - base) / dx;
                let analytic = q.gradient(eq, wrt, &state, false);
                let scale = analytic.abs().max(1e-6);
                assert!(
                    (analytic - numerical).abs() < 1e-3 * scale,
                    "gradient({eq},{wrt}): {analytic} vs {numerical}"
                );
            }
        }
    }
}
