//! SI, scientific and imperial unit definitions
//!
//! Scales are relative to the SI base units (metre, second, kilogram,
//! ampere, kelvin, mole, candela).

use metron_units::UnitDefinition;

fn unit(name: &str, abbreviation: &str, scale: f64, dimensions: &[(&str, i32)]) -> UnitDefinition {
    dimensions.iter().fold(
        UnitDefinition::new(name, scale).with_abbreviation(abbreviation),
        |unit, &(dimension, power)| unit.with_dimension(dimension, power),
    )
}

const PRESSURE: &[(&str, i32)] = &[("mass", 1), ("length", -1), ("time", -2)];
const ENERGY: &[(&str, i32)] = &[("mass", 1), ("length", 2), ("time", -2)];

/// Every unit of the SI catalog, in registration order.
///
/// The first unit of each base dimension becomes that dimension's basis,
/// so the base units come first.
pub fn si_units() -> Vec<UnitDefinition> {
    let us_gallon = 473_176_473.0 / 125_000_000_000.0;

    vec![
        // Base units
        UnitDefinition::new("constant", 1.0).with_name("non-dim").prefixable(false),
        unit("metre", "m", 1.0, &[("length", 1)]).with_name("meter"),
        unit("second", "s", 1.0, &[("time", 1)]),
        unit("gram", "g", 1e-3, &[("mass", 1)]),
        unit("ampere", "A", 1.0, &[("current", 1)]),
        unit("kelvin", "K", 1.0, &[("temperature", 1)]),
        unit("mole", "mol", 1.0, &[("substance", 1)]),
        unit("candela", "cd", 1.0, &[("intensity", 1)]),
        unit("dollar", "$", 1.0, &[("currency", 1)]),

        // Scientific lengths
        unit("angstrom", "Å", 1e-10, &[("length", 1)]),
        unit("astronomical_unit", "au", 149_597_870_691.0, &[("length", 1)]),
        unit("lightyear", "ly", 9_460_730_472_580_800.0, &[("length", 1)]),

        // Imperial lengths
        unit("mile", "mi", 1609.344, &[("length", 1)]),
        unit("yard", "yd", 0.9144, &[("length", 1)]),
        unit("foot", "ft", 0.3048, &[("length", 1)]).with_plural("feet"),
        unit("inch", "in", 0.0254, &[("length", 1)]).with_plural("inches"),
        unit("point", "pt", 0.0254 / 72.0, &[("length", 1)]),
        unit("mmHg", "mmHg", 101_325.0 / 760.0, PRESSURE),

        // Time
        unit("year", "year", 31_556_925.216, &[("time", 1)]),
        unit("day", "day", 86_400.0, &[("time", 1)]),
        unit("hour", "h", 3600.0, &[("time", 1)]),
        unit("minute", "min", 60.0, &[("time", 1)]),
        unit("hertz", "Hz", 1.0, &[("time", -1)]),

        // Force and pressure
        unit("newton", "N", 1.0, &[("mass", 1), ("length", 1), ("time", -2)]),
        unit("atm", "atm", 101_325.0, PRESSURE),
        unit("bar", "bar", 100_000.0, PRESSURE),
        unit("pascal", "Pa", 1.0, PRESSURE),
        unit("psi", "psi", 6894.757, PRESSURE),

        // Energy and power
        unit("joule", "J", 1.0, ENERGY),
        unit("calorie", "cal", 4.1868, ENERGY),
        unit("electronvolt", "eV", 1.602_176_487e-19, ENERGY),
        unit("watt", "W", 1.0, &[("mass", 1), ("length", 2), ("time", -3)]),

        // Electromagnetism
        unit("coulomb", "C", 1.0, &[("current", 1), ("time", 1)]),
        unit("farad", "F", 1.0, &[("time", 4), ("current", 2), ("length", -2), ("mass", -1)]),
        unit("henry", "H", 1.0, &[("mass", 1), ("length", 2), ("time", -2), ("current", -2)]),
        unit("volt", "V", 1.0, &[("mass", 1), ("length", 2), ("current", -1), ("time", -3)]),
        unit("ohm", "Ω", 1.0, &[("mass", 1), ("length", 2), ("time", -3), ("current", -2)]),
        unit("siemens", "mho", 1.0, &[("mass", -1), ("length", -2), ("time", 3), ("current", 2)]),
        unit("tesla", "T", 1.0, &[("mass", 1), ("current", -1), ("time", -2)]),
        unit("gauss", "G", 1e-4, &[("mass", 1), ("current", -1), ("time", -2)]),
        unit("weber", "Wb", 1.0, &[("length", 2), ("mass", 1), ("time", -2), ("current", -1)]),

        // Volume
        unit("litre", "L", 1e-3, &[("length", 3)]).with_name("liter"),
        unit("gallon", "gal", us_gallon, &[("length", 3)]),
        unit("quart", "qt", us_gallon / 4.0, &[("length", 3)]),
    ]
}
