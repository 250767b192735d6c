//! Exact rational exponents using dashu
//!
//! Unit powers are kept as `RBig` so that repeated multiplication, division
//! and exponentiation of composite units never drift. Conversion to `f64`
//! only happens when a caller asks for a scale factor.

use dashu_base::Abs;
use dashu_int::{IBig, UBig};
use dashu_ratio::RBig;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use crate::UnitError;

/// Exact rational power of a unit or dimension
///
/// Always stored in lowest terms with a positive denominator.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Exponent(RBig);

impl Exponent {
    pub const ZERO: Exponent = Exponent(RBig::ZERO);
    pub const ONE: Exponent = Exponent(RBig::ONE);

    /// Create from numerator and denominator, `None` if the denominator is zero
    pub fn new(numerator: i64, denominator: i64) -> Option<Self> {
        if denominator == 0 {
            return None;
        }
        let num = IBig::from(numerator) * IBig::from(denominator.signum());
        let den = UBig::from(denominator.unsigned_abs());
        Some(Self(RBig::from_parts(num, den)))
    }

    /// Create an integral exponent
    pub fn from_integer(n: i64) -> Self {
        Self(RBig::from(IBig::from(n)))
    }

    /// Parse a signed decimal (`"-2"`, `"2.5"`, `"2.000000"`) or a
    /// rational literal (`"1/3"`, `"-1/2"`).
    pub fn parse(literal: &str) -> Result<Self, UnitError> {
        let s = literal.trim();
        let invalid = || UnitError::InvalidExponent { literal: literal.to_string() };

        if let Some((num, den)) = s.split_once('/') {
            let num = parse_signed_decimal(num.trim()).ok_or_else(invalid)?;
            let den = parse_signed_decimal(den.trim()).ok_or_else(invalid)?;
            if den.0 == RBig::ZERO {
                return Err(invalid());
            }
            return Ok(Self(num.0 / den.0));
        }

        parse_signed_decimal(s).ok_or_else(invalid)
    }

    /// Exact value of a finite float, taken from its shortest decimal form
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        // Display for f64 never uses exponent notation
        parse_signed_decimal(&format!("{}", value))
    }

    pub fn is_zero(&self) -> bool {
        self.0 == RBig::ZERO
    }

    pub fn is_one(&self) -> bool {
        self.0 == RBig::ONE
    }

    pub fn is_negative(&self) -> bool {
        self.0 < RBig::ZERO
    }

    pub fn is_positive(&self) -> bool {
        self.0 > RBig::ZERO
    }

    /// True when the denominator is 1
    pub fn is_integer(&self) -> bool {
        *self.0.denominator() == UBig::ONE
    }

    pub fn abs(&self) -> Self {
        Self(self.0.clone().abs())
    }

    pub fn numerator(&self) -> &IBig {
        self.0.numerator()
    }

    pub fn denominator(&self) -> &UBig {
        self.0.denominator()
    }

    /// Integral value if it fits in an i32 (used for `powi`)
    pub fn to_i32(&self) -> Option<i32> {
        if !self.is_integer() {
            return None;
        }
        i32::try_from(self.0.numerator().clone()).ok()
    }

    /// Lossy conversion to f64
    pub fn to_f64(&self) -> f64 {
        let num = match i64::try_from(self.0.numerator().clone()) {
            Ok(n) => n as f64,
            Err(_) => self.0.numerator().to_string().parse().unwrap_or(f64::NAN),
        };
        let den = match u64::try_from(self.0.denominator().clone()) {
            Ok(d) => d as f64,
            Err(_) => self.0.denominator().to_string().parse().unwrap_or(f64::NAN),
        };
        num / den
    }

    /// Raise a positive real base to this power
    pub fn apply_to(&self, base: f64) -> f64 {
        match self.to_i32() {
            Some(n) => base.powi(n),
            None => base.powf(self.to_f64()),
        }
    }

    pub fn as_inner(&self) -> &RBig {
        &self.0
    }

    pub fn into_inner(self) -> RBig {
        self.0
    }
}

/// Parse `[+-]digits[.digits]` exactly
fn parse_signed_decimal(s: &str) -> Option<Exponent> {
    let (negative, body) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };

    let (int_part, frac_part) = match body.split_once('.') {
        Some((i, f)) => (i, f),
        None => (body, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit()) || !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let digits = format!("{}{}", int_part, frac_part);
    let magnitude: UBig = if digits.is_empty() { UBig::ZERO } else { digits.parse().ok()? };
    let denominator = UBig::from(10u8).pow(frac_part.len());

    let numerator = if negative { -IBig::from(magnitude) } else { IBig::from(magnitude) };
    Some(Exponent(RBig::from_parts(numerator, denominator)))
}

// ========== Trait Implementations ==========

impl fmt::Display for Exponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_integer() {
            write!(f, "{}", self.0.numerator())
        } else {
            write!(f, "{}/{}", self.0.numerator(), self.0.denominator())
        }
    }
}

impl Default for Exponent {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Debug for Exponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Exponent({})", self)
    }
}

impl FromStr for Exponent {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<i32> for Exponent {
    fn from(n: i32) -> Self {
        Self::from_integer(n as i64)
    }
}

impl From<i64> for Exponent {
    fn from(n: i64) -> Self {
        Self::from_integer(n)
    }
}

impl From<RBig> for Exponent {
    fn from(r: RBig) -> Self {
        Self(r)
    }
}

impl Add for Exponent {
    type Output = Exponent;

    fn add(self, rhs: Exponent) -> Exponent {
        Exponent(self.0 + rhs.0)
    }
}

impl Add<&Exponent> for &Exponent {
    type Output = Exponent;

    fn add(self, rhs: &Exponent) -> Exponent {
        Exponent(&self.0 + &rhs.0)
    }
}

impl Sub for Exponent {
    type Output = Exponent;

    fn sub(self, rhs: Exponent) -> Exponent {
        Exponent(self.0 - rhs.0)
    }
}

impl Sub<&Exponent> for &Exponent {
    type Output = Exponent;

    fn sub(self, rhs: &Exponent) -> Exponent {
        Exponent(&self.0 - &rhs.0)
    }
}

impl Mul for Exponent {
    type Output = Exponent;

    fn mul(self, rhs: Exponent) -> Exponent {
        Exponent(self.0 * rhs.0)
    }
}

impl Mul<&Exponent> for &Exponent {
    type Output = Exponent;

    fn mul(self, rhs: &Exponent) -> Exponent {
        Exponent(&self.0 * &rhs.0)
    }
}

impl Neg for Exponent {
    type Output = Exponent;

    fn neg(self) -> Exponent {
        Exponent(-self.0)
    }
}

impl Neg for &Exponent {
    type Output = Exponent;

    fn neg(self) -> Exponent {
        Exponent(-self.0.clone())
    }
}

impl Serialize for Exponent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Exponent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduction() {
        let e = Exponent::new(4, -6).unwrap();
        assert_eq!(e.to_string(), "-2/3");
        assert!(e.is_negative());
        assert!(Exponent::new(1, 0).is_none());
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(Exponent::parse("-2").unwrap(), Exponent::from(-2));
        assert_eq!(Exponent::parse("+3").unwrap(), Exponent::from(3));
        assert_eq!(Exponent::parse("2.5").unwrap(), Exponent::new(5, 2).unwrap());
        assert_eq!(Exponent::parse("2.000000").unwrap(), Exponent::from(2));
        assert_eq!(Exponent::parse(".5").unwrap(), Exponent::new(1, 2).unwrap());
        assert_eq!(Exponent::parse("-0.333").unwrap(), Exponent::new(-333, 1000).unwrap());
    }

    #[test]
    fn test_parse_rational() {
        assert_eq!(Exponent::parse("1/3").unwrap(), Exponent::new(1, 3).unwrap());
        assert_eq!(Exponent::parse("-1/2").unwrap(), Exponent::new(-1, 2).unwrap());
        assert!(Exponent::parse("1/0").is_err());
    }

    #[test]
    fn test_parse_invalid() {
        for bad in ["", "-", ".", "abc", "1e3", "1.2.3", "--1"] {
            assert!(Exponent::parse(bad).is_err(), "{:?} should not parse", bad);
        }
    }

    #[test]
    fn test_arithmetic_is_exact() {
        let third = Exponent::new(1, 3).unwrap();
        let sum = &(&third + &third) + &third;
        assert!(sum.is_one());

        let product = &third * &Exponent::from(3);
        assert_eq!(product, Exponent::ONE);
        assert!((&third - &third).is_zero());
        assert_eq!(-third.clone(), Exponent::new(-1, 3).unwrap());
    }

    #[test]
    fn test_from_f64() {
        assert_eq!(Exponent::from_f64(0.5).unwrap(), Exponent::new(1, 2).unwrap());
        assert_eq!(Exponent::from_f64(-2.0).unwrap(), Exponent::from(-2));
        assert!(Exponent::from_f64(f64::NAN).is_none());
        assert!(Exponent::from_f64(f64::INFINITY).is_none());
    }

    #[test]
    fn test_to_f64_and_apply() {
        assert_eq!(Exponent::new(1, 4).unwrap().to_f64(), 0.25);
        assert!((Exponent::from(-2).apply_to(10.0) - 0.01).abs() < 1e-15);
        assert!((Exponent::new(1, 2).unwrap().apply_to(16.0) - 4.0).abs() < 1e-12);
    }
}
