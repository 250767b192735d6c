//! Metron SI - a ready-made unit catalog
//!
//! Populates a `UnitRegistry` with the SI prefixes and a catalog of SI,
//! scientific and imperial units. The mass basis is the kilogram rather
//! than the gram it is derived from.
//!
//! Uses only the public `metron-units` API; other unit systems can be
//! bootstrapped the same way.

mod catalog;
mod prefixes;

pub use catalog::si_units;
pub use prefixes::si_prefixes;

use metron_core::prelude::*;
use metron_units::{Diagnostic, UnitRegistry};

/// Register the SI catalog into `registry` and install the kilogram as mass basis.
///
/// Prefixes must already be configured on the registry; they only expand
/// units registered after them.
pub fn load_si_units(registry: &UnitRegistry) -> Result<&UnitRegistry, UnitError> {
    let units = si_units();
    let count = units.len();
    for unit in units {
        registry.register(unit)?;
    }
    registry.set_basis([("mass", "kg")])?;
    tracing::debug!(units = count, names = registry.names().len(), "loaded SI catalog");
    Ok(registry)
}

/// A fresh registry holding the SI prefixes and catalog
pub fn si_registry() -> Result<UnitRegistry, UnitError> {
    let registry = UnitRegistry::new().with_prefixes(si_prefixes());
    load_si_units(&registry)?;
    Ok(registry)
}

/// Like `si_registry`, reporting basis diagnostics to `sink`
pub fn si_registry_with_sink<F>(sink: F) -> Result<UnitRegistry, UnitError>
where
    F: Fn(&Diagnostic) + 'static,
{
    let registry = UnitRegistry::new()
        .with_prefixes(si_prefixes())
        .with_diagnostic_sink(sink);
    load_si_units(&registry)?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use metron_units::{CompositeUnit, DimensionVector, UnitDefinition};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs())
    }

    fn si() -> UnitRegistry {
        si_registry().unwrap()
    }

    #[test]
    fn test_loading_is_quiet() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let registry = si_registry_with_sink(move |d| sink.borrow_mut().push(d.clone())).unwrap();

        assert!(seen.borrow().is_empty(), "{:?}", seen.borrow());
        assert_eq!(
            registry.dimensions(),
            vec!["currency", "current", "intensity", "length", "mass", "substance", "temperature", "time"]
        );
        assert!(registry.basis().values().all(Option::is_some));
    }

    #[test]
    fn test_basis_units() {
        let registry = si();
        assert_eq!(registry.basis_for("mass").unwrap().symbol(), "kg");
        assert_eq!(registry.basis_for("length").unwrap().name(), "metre");
        assert_eq!(registry.basis_for("time").unwrap().name(), "second");
        assert_eq!(registry.basis_for("currency").unwrap().symbol(), "$");
    }

    #[test]
    fn test_every_prefixable_unit_has_every_prefix() {
        let registry = si();
        for unit in si_units().into_iter().filter(UnitDefinition::is_prefixable) {
            for prefix in si_prefixes() {
                let name = format!("{}{}", prefix.name, unit.name());
                let variant = registry.resolve(name.as_str()).unwrap();
                assert_eq!(variant.name(), name);
                assert!(approx(variant.scale(), unit.scale() * prefix.multiplier), "{}", name);
                assert_eq!(variant.dimensions(), unit.dimensions());
                assert!(!variant.is_prefixable());
            }
        }
    }

    #[test]
    fn test_prefixed_aliases_and_plurals() {
        let registry = si();
        assert_eq!(registry.resolve("kilometer").unwrap().name(), "kilometre");
        assert_eq!(registry.resolve("kilofeet").unwrap().name(), "kilofoot");
        assert_eq!(registry.resolve("{mu}m").unwrap().name(), "micrometre");
        assert_eq!(registry.resolve("dam").unwrap().name(), "decametre");
    }

    #[test]
    fn test_later_units_win_name_clashes() {
        // milli-inch would be "min", but minute is registered afterwards
        let registry = si();
        assert_eq!(registry.resolve("min").unwrap().name(), "minute");
        assert_eq!(registry.resolve("milliinch").unwrap().abbreviation(), Some("min"));
    }

    #[test]
    fn test_clashing_symbol_does_not_share_conversions() {
        let registry = si();
        let second = registry.materialize("s").unwrap();
        assert!(approx(second.scale_to("min").unwrap(), 1.0 / 60.0));

        let milliinch = registry.resolve("milliinch").unwrap();
        assert!(matches!(
            second.scale_to(&milliinch),
            Err(UnitError::UnitConversion { .. })
        ));
    }

    #[test]
    fn test_multi_word_names_are_reachable() {
        let registry = si();
        let au = registry.materialize("astronomical_unit").unwrap();
        assert_eq!(au.to_string(), "au");
        assert!(approx(au.scale_to("m").unwrap(), 149_597_870_691.0));
        assert!(approx(
            registry.materialize("kiloastronomical_unit").unwrap().scale_to("au").unwrap(),
            1000.0
        ));
        assert!(si_units().iter().all(|u| u.keys().all(|k| !k.contains(char::is_whitespace))));
    }

    #[test]
    fn test_multiply_divide_round_trip() {
        let registry = si();
        let pairs = [("kg*m^2", "s^-3"), ("N", "m"), ("V/A", "ohm"), ("units", "Pa")];
        for (a, b) in pairs {
            let a = registry.materialize(a).unwrap();
            let b = registry.materialize(b).unwrap();
            assert_eq!((&a * &b) / b.clone(), a);
        }
    }

    #[test]
    fn test_power_laws() {
        let registry = si();
        let a = registry.materialize("J/mol/K").unwrap();
        let exponents = [
            Exponent::from(2),
            Exponent::from(-3),
            Exponent::new(1, 2).unwrap(),
            Exponent::new(-2, 3).unwrap(),
        ];
        for n in &exponents {
            for m in &exponents {
                assert_eq!(a.pow(n.clone()) * a.pow(m.clone()), a.pow(n + m));
            }
        }
    }

    #[test]
    fn test_parse_idempotent() {
        let registry = si();
        for expr in ["kg*m*s^-2", "W/m^2/K^4", "m^(1/2)", "/s", "units", "mmHg*L", "$/h"] {
            let first = registry.materialize(expr).unwrap();
            let again = registry.materialize(first.to_string()).unwrap();
            assert_eq!(again, first);
        }
    }

    #[test]
    fn test_scale_to() {
        let registry = si();
        let metre = registry.materialize("metre").unwrap();
        assert!(approx(metre.scale_to("centimetre").unwrap(), 100.0));
        assert!(approx(registry.materialize("mi").unwrap().scale_to("ft").unwrap(), 5280.0));
        assert!(approx(registry.materialize("gal").unwrap().scale_to("qt").unwrap(), 4.0));
        assert!(approx(registry.materialize("atm").unwrap().scale_to("mmHg").unwrap(), 760.0));
        assert!(approx(registry.materialize("kW*h").unwrap().scale_to("J").unwrap(), 3.6e6));
        assert!(approx(registry.materialize("km/h").unwrap().scale_to("m/s").unwrap(), 1.0 / 3.6));
        assert!(registry.materialize("J").unwrap().scale_to("W").is_err());
    }

    #[test]
    fn test_dimensionless() {
        let registry = si();
        let none = registry.materialize("units").unwrap();
        assert_eq!(none.to_string(), "units");
        assert_eq!(none.relative_scale(), 1.0);
        assert!(approx(registry.materialize("constant").unwrap().scale_to("units").unwrap(), 1.0));
    }

    #[test]
    fn test_force_end_to_end() {
        let registry = si();
        let force = registry.materialize("kg*m*s^-2").unwrap();
        let expected: DimensionVector = [("mass", 1), ("length", 1), ("time", -2)].into_iter().collect();
        assert_eq!(force.dimensions(), expected);
        assert!(approx(force.relative_scale(), 1.0));
        assert_eq!(registry.materialize("N").unwrap().to_basis().unwrap(), force);
    }

    #[test]
    fn test_to_basis() {
        let registry = si();
        let volt = registry.materialize("V").unwrap().to_basis().unwrap();
        assert_eq!(volt.to_string(), "kg*m^2/A/s^3");
        assert!(approx(registry.materialize("kV").unwrap().scale_to(&volt).unwrap(), 1000.0));
        assert_eq!(registry.materialize("L").unwrap().to_basis().unwrap().to_string(), "m^3");
    }

    #[test]
    fn test_overwrite_keeps_last_definition() {
        let registry = si();
        registry
            .register(UnitDefinition::new("psi", 6894.76).with_abbreviation("psi"))
            .unwrap();
        let psi = registry.resolve("psi").unwrap();
        assert_eq!(psi.scale(), 6894.76);
        assert!(psi.dimensions().is_dimensionless());
    }

    #[test]
    fn test_unknown_token() {
        let registry = si();
        match registry.materialize("foo*s") {
            Err(UnitError::InvalidUnit { identifier, .. }) => assert_eq!(identifier, "foo"),
            other => panic!("expected InvalidUnit, got {:?}", other),
        }
    }

    #[test]
    fn test_cache_shared_across_clones() {
        let registry = si();
        let handle = registry.clone();
        let a = registry.materialize("kg*m").unwrap();
        let b = handle.materialize("kg*m").unwrap();
        assert!(CompositeUnit::same_instance(&a, &b));
        assert!(a.registry().ptr_eq(&handle));
    }

    #[test]
    fn test_descriptor_registration() {
        let registry = si();
        registry
            .register_descriptor(&serde_json::json!({
                "names": ["knot"],
                "abbr": "kn",
                "rel": 1852.0 / 3600.0,
                "length": 1,
                "time": -1
            }))
            .unwrap();
        assert!(approx(registry.materialize("kn").unwrap().scale_to("km/h").unwrap(), 1.852));
        assert!(registry.has("kiloknot"));
    }
}
