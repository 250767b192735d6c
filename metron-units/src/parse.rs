//! Unit expression tokenizer - expressions like "kg*m*s^-2" or "m/s"
//!
//! Grammar (whitespace is stripped first):
//! - Terms are separated by `*` (multiply) or `/` (divide, negates the power)
//! - A leading `*` or `/` is allowed; the first term defaults to `*`
//! - A term is a unit name without digits, `*`, `/` or `^`, optionally
//!   followed by `^` and a signed decimal (`^-2`, `^0.5`) or a
//!   parenthesized rational (`^(1/3)`)
//! - The literal `units` is the dimensionless unit

use metron_core::{Exponent, UnitError};

/// Literal denoting the dimensionless unit
pub const DIMENSIONLESS: &str = "units";

/// One `name^power` term, power already negated for `/`
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub name: String,
    pub power: Exponent,
}

/// Split an expression into terms without resolving unit names
pub fn tokenize(expression: &str) -> Result<Vec<Term>, UnitError> {
    let stripped: String = expression.chars().filter(|c| !c.is_whitespace()).collect();
    let invalid = |reason: String| UnitError::invalid_unit(expression, reason);

    if stripped == DIMENSIONLESS {
        return Ok(Vec::new());
    }
    if stripped.is_empty() {
        return Err(invalid("empty unit expression".to_string()));
    }

    let mut terms = Vec::new();
    let mut rest = stripped.as_str();

    while !rest.is_empty() {
        // Operator
        let divide = match rest.as_bytes()[0] {
            b'/' => {
                rest = &rest[1..];
                true
            }
            b'*' => {
                rest = &rest[1..];
                false
            }
            _ if terms.is_empty() => false,
            _ => return Err(invalid(format!("expected '*' or '/' before '{}'", rest))),
        };

        // Name
        let name_end = rest.find(['*', '/', '^']).unwrap_or(rest.len());
        let name = &rest[..name_end];
        if name.is_empty() {
            return Err(invalid("missing unit name".to_string()));
        }
        if name.chars().any(|c| c.is_ascii_digit()) {
            return Err(invalid(format!("unexpected digit in unit name '{}'", name)));
        }
        rest = &rest[name_end..];

        // Optional power
        let mut power = Exponent::ONE;
        if let Some(after_caret) = rest.strip_prefix('^') {
            let (literal, remainder) = split_power(after_caret)
                .ok_or_else(|| invalid(format!("missing exponent after '{}^'", name)))?;
            power = Exponent::parse(literal)
                .map_err(|_| invalid(format!("invalid exponent '{}'", literal)))?;
            rest = remainder;
        }

        terms.push(Term {
            name: name.to_string(),
            power: if divide { -power } else { power },
        });
    }

    Ok(terms)
}

/// Split the exponent literal off the front of `s`
fn split_power(s: &str) -> Option<(&str, &str)> {
    if let Some(inner) = s.strip_prefix('(') {
        let close = inner.find(')')?;
        return Some((&inner[..close], &inner[close + 1..]));
    }

    let mut end = 0;
    for (i, c) in s.char_indices() {
        let is_sign = (c == '-' || c == '+') && i == 0;
        if c.is_ascii_digit() || c == '.' || is_sign {
            end = i + c.len_utf8();
        } else {
            break;
        }
    }
    if end == 0 {
        None
    } else {
        Some((&s[..end], &s[end..]))
    }
}

/// Render a power for the `^` suffix so that `tokenize` reads it back exactly
pub fn render_power(power: &Exponent) -> String {
    if power.is_integer() {
        power.to_string()
    } else {
        format!("({})", power)
    }
}

/// Render a power the way basis expressions spell it: a six-place float
/// literal when that is exact, else the parenthesized rational
pub fn render_float_power(power: &Exponent) -> String {
    let literal = format!("{:.6}", power.to_f64());
    match Exponent::parse(&literal) {
        Ok(parsed) if parsed == *power => literal,
        _ => render_power(power),
    }
}
