//! Circuit validation.

use crate::error::{NodalError, Result};

use super::Circuit;

/// Validate a circuit's wiring before the first solve.
///
/// Every dynamic pin must either have at least one incident component or
/// carry an equation override; otherwise its row of the Jacobian would be
/// zero and the very first factorisation would fail.
pub fn validate_wiring(circuit: &Circuit) -> Result<()> {
    for (pin, incident) in circuit.dynamic_pins.iter().enumerate() {
        if incident.is_empty() && circuit.override_eq[pin].is_none() {
            return Err(NodalError::FloatingPin { pin });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::Pin;
    use crate::components::Resistor;

    #[test]
    fn test_floating_pin_detected() {
        let circuit = Circuit::new(1, 0, 0);
        let err = validate_wiring(&circuit).unwrap_err();
        assert!(matches!(err, NodalError::FloatingPin { pin: 0 }));
    }

    #[test]
    fn test_wired_pin_passes() {
        let mut circuit = Circuit::new(1, 1, 0);
        circuit
            .add_component(
                Box::new(Resistor::new("R1", 1000.0)),
                vec![Pin::static_pin(0), Pin::dynamic(0)],
            )
            .unwrap();
        assert!(validate_wiring(&circuit).is_ok());
    }
}
