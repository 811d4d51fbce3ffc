//! The circuit aggregate: component arena, wiring tables, state vectors.

use log::warn;

use crate::components::Component;
use crate::error::{NodalError, Result};

use super::state::CircuitState;
use super::types::{ComponentId, Pin, PinKind};

/// A complete circuit ready for simulation.
///
/// The circuit owns its components in an arena; the per-pin incidence
/// lists and the equation-override table refer to them by stable index,
/// so the graph can be cyclic without back-pointers. All dimensions are
/// fixed at construction time.
#[derive(Debug)]
pub struct Circuit {
    /// All components, in insertion order
    pub(crate) components: Vec<Box<dyn Component>>,

    /// Per dynamic pin, the incident (component index, local pin) pairs
    pub(crate) dynamic_pins: Vec<Vec<(usize, usize)>>,

    /// Per dynamic pin, the (component index, equation index) override,
    /// or None to use the Kirchhoff current sum
    pub(crate) override_eq: Vec<Option<(usize, usize)>>,

    /// The three voltage vectors
    pub(crate) state: CircuitState,

    /// Optional labels; positional indices remain canonical
    dynamic_pin_names: Vec<String>,
    static_pin_names: Vec<String>,

    /// Set once by `Simulator::setup`; freezes the wiring
    pub(crate) initialized: bool,
}

impl Circuit {
    /// Create an empty circuit with the given pin counts.
    pub fn new(nb_dynamic: usize, nb_static: usize, nb_input: usize) -> Self {
        Self {
            components: Vec::new(),
            dynamic_pins: vec![Vec::new(); nb_dynamic],
            override_eq: vec![None; nb_dynamic],
            state: CircuitState::new(nb_dynamic, nb_static, nb_input),
            dynamic_pin_names: Vec::new(),
            static_pin_names: Vec::new(),
            initialized: false,
        }
    }

    /// Add a component, wiring it to `pins` (one entry per component pin).
    ///
    /// The circuit takes ownership; the returned id stays valid for the
    /// circuit's lifetime. Fails if the pin list does not match the
    /// component's arity, if any index is out of range, or if the circuit
    /// has already been set up.
    pub fn add_component(
        &mut self,
        mut component: Box<dyn Component>,
        pins: Vec<Pin>,
    ) -> Result<ComponentId> {
        if self.initialized {
            return Err(NodalError::AlreadyInitialized {
                operation: "add_component".to_string(),
            });
        }

        if pins.len() != component.nb_pins() {
            return Err(NodalError::pin_count(
                component.name(),
                component.nb_pins(),
                pins.len(),
            ));
        }

        for &pin in &pins {
            let limit = match pin.kind {
                PinKind::Dynamic => self.nb_dynamic_pins(),
                PinKind::Static => self.nb_static_pins(),
                PinKind::Input => self.nb_input_pins(),
            };
            if pin.index >= limit {
                return Err(NodalError::PinOutOfRange {
                    name: component.name().to_string(),
                    pin,
                });
            }
        }

        // Validate override claims before touching any table, so a
        // failed add leaves the circuit untouched
        let claims = component.equation_claims();
        for &(local, _) in &claims {
            let pin = pins[local];
            if !pin.is_dynamic() {
                return Err(NodalError::InvalidOverride {
                    name: component.name().to_string(),
                    pin,
                });
            }
        }

        let index = self.components.len();

        for (local, &pin) in pins.iter().enumerate() {
            if pin.is_dynamic() {
                self.dynamic_pins[pin.index].push((index, local));
            }
        }

        // Register Kirchhoff-equation overrides (e.g. ideal sources,
        // op-amp outputs). Last claim wins; a re-claim is a modelling
        // error worth flagging.
        for &(local, eq) in &claims {
            let pin = pins[local];
            if self.override_eq[pin.index].is_some() {
                warn!(
                    "dynamic pin {} equation re-claimed by '{}'",
                    pin.index,
                    component.name()
                );
            }
            self.override_eq[pin.index] = Some((index, eq));
        }

        component.set_pins(pins);
        self.components.push(component);
        Ok(ComponentId(index))
    }

    /// Set the fixed voltages. Length must equal the static pin count.
    pub fn set_static_state(&mut self, static_state: Vec<f64>) -> Result<()> {
        if static_state.len() != self.nb_static_pins() {
            return Err(NodalError::dimension(
                "static state",
                self.nb_static_pins(),
                static_state.len(),
            ));
        }
        self.state.static_state = static_state;
        Ok(())
    }

    /// Label the dynamic pins. Length must equal the dynamic pin count.
    pub fn set_dynamic_pin_names(&mut self, names: Vec<String>) -> Result<()> {
        if names.len() != self.nb_dynamic_pins() {
            return Err(NodalError::dimension(
                "dynamic pin names",
                self.nb_dynamic_pins(),
                names.len(),
            ));
        }
        self.dynamic_pin_names = names;
        Ok(())
    }

    /// Label the static pins. Length must equal the static pin count.
    pub fn set_static_pin_names(&mut self, names: Vec<String>) -> Result<()> {
        if names.len() != self.nb_static_pins() {
            return Err(NodalError::dimension(
                "static pin names",
                self.nb_static_pins(),
                names.len(),
            ));
        }
        self.static_pin_names = names;
        Ok(())
    }

    /// Number of dynamic pins.
    pub fn nb_dynamic_pins(&self) -> usize {
        self.state.dynamic_state.len()
    }

    /// Number of static pins.
    pub fn nb_static_pins(&self) -> usize {
        self.state.static_state.len()
    }

    /// Number of input pins.
    pub fn nb_input_pins(&self) -> usize {
        self.state.input_state.len()
    }

    /// Number of components.
    pub fn nb_components(&self) -> usize {
        self.components.len()
    }

    /// Name of a dynamic pin, if labels were set.
    pub fn dynamic_pin_name(&self, index: usize) -> Option<&str> {
        self.dynamic_pin_names.get(index).map(String::as_str)
    }

    /// Name of a static pin, if labels were set.
    pub fn static_pin_name(&self, index: usize) -> Option<&str> {
        self.static_pin_names.get(index).map(String::as_str)
    }

    /// Read the voltage at a pin from the current state.
    pub fn retrieve_voltage(&self, pin: Pin) -> f64 {
        self.state.voltage(pin)
    }

    /// The solved node voltages.
    pub fn dynamic_state(&self) -> &[f64] {
        &self.state.dynamic_state
    }

    /// The fixed voltages.
    pub fn static_state(&self) -> &[f64] {
        &self.state.static_state
    }

    /// The externally driven voltages.
    pub fn input_state(&self) -> &[f64] {
        &self.state.input_state
    }

    // ============ Flattened parameter view ============
    //
    // Parameters are exposed as one list across components in insertion
    // order, each component contributing its own ordered parameters.

    /// Total number of parameters across all components.
    pub fn nb_parameters(&self) -> usize {
        self.components.iter().map(|c| c.nb_parameters()).sum()
    }

    /// Resolve a flattened identifier to (component index, local index).
    fn locate_parameter(&self, identifier: usize) -> Result<(usize, usize)> {
        let mut base = 0;
        for (index, component) in self.components.iter().enumerate() {
            let count = component.nb_parameters();
            if identifier < base + count {
                return Ok((index, identifier - base));
            }
            base += count;
        }
        Err(NodalError::UnknownParameter { identifier })
    }

    /// Name of a parameter, qualified by its component.
    pub fn parameter_name(&self, identifier: usize) -> Result<String> {
        let (index, local) = self.locate_parameter(identifier)?;
        let component = &self.components[index];
        Ok(format!(
            "{}.{}",
            component.name(),
            component.parameter_name(local)
        ))
    }

    /// Value of a parameter.
    pub fn parameter(&self, identifier: usize) -> Result<f64> {
        let (index, local) = self.locate_parameter(identifier)?;
        Ok(self.components[index].parameter(local))
    }

    /// Set a parameter. Takes effect at the next sample's precompute.
    pub fn set_parameter(&mut self, identifier: usize, value: f64) -> Result<()> {
        let (index, local) = self.locate_parameter(identifier)?;
        self.components[index].set_parameter(local, value);
        Ok(())
    }

    // ============ Solver-facing helpers ============

    /// Run `precompute` on every component, in insertion order.
    pub(crate) fn precompute_all(&mut self, dt: f64, steady_state: bool) {
        let state = &self.state;
        for component in &mut self.components {
            component.precompute(state, dt, steady_state);
        }
    }

    /// Run `update_state` on every component, in insertion order.
    pub(crate) fn update_state_all(&mut self) {
        let state = &self.state;
        for component in &mut self.components {
            component.update_state(state);
        }
    }
}
