//! Complex-number parsing for power quantities.
//!
//! Model properties such as `power_out` hold a complex number followed by a
//! unit, e.g. `"1234.5+67.8j VA"`. The numeric token uses the form
//! `<real>[+/-<imag>j]` (bare reals and pure imaginaries included). The
//! parser is written out explicitly instead of leaning on any language's
//! complex-literal grammar so the accepted syntax is pinned down here.

use std::str::FromStr;
use thiserror::Error;

/// A parsed complex quantity. Edge weighting only consumes the real part,
/// but both components are kept so callers can log the full value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

/// Token that could not be read as a complex number.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("'{0}' is not a complex number")]
pub struct InvalidComplex(pub String);

/// Parse a complex-number token.
///
/// Accepted forms: `<real>`, `<imag>j`, `<real>+<imag>j`, `<real>-<imag>j`,
/// with standard float syntax (signs, decimals, exponents) in each
/// component and a bare trailing `j` meaning an imaginary part of 1.
pub fn parse_complex(token: &str) -> Result<Complex, InvalidComplex> {
    let s = token.trim();
    if s.is_empty() {
        return Err(InvalidComplex(token.to_string()));
    }

    if let Some(body) = s.strip_suffix(['j', 'J']) {
        if let Some(split) = imaginary_split(body) {
            let re = parse_component(&body[..split], token)?;
            let im = parse_signed_unit(&body[split..], token)?;
            Ok(Complex { re, im })
        } else {
            let im = parse_signed_unit(body, token)?;
            Ok(Complex { re: 0.0, im })
        }
    } else {
        let re = parse_component(s, token)?;
        Ok(Complex { re, im: 0.0 })
    }
}

/// Index of the sign separating real and imaginary components, skipping a
/// leading sign on the real part and exponent signs (`1e+3`).
fn imaginary_split(body: &str) -> Option<usize> {
    let bytes = body.as_bytes();
    (1..bytes.len())
        .rev()
        .find(|&i| matches!(bytes[i], b'+' | b'-') && !matches!(bytes[i - 1], b'e' | b'E'))
}

fn parse_component(text: &str, token: &str) -> Result<f64, InvalidComplex> {
    f64::from_str(text).map_err(|_| InvalidComplex(token.to_string()))
}

/// An imaginary component may be a bare sign (`+j`, `-j`) or even absent
/// (`j`), both meaning magnitude 1.
fn parse_signed_unit(text: &str, token: &str) -> Result<f64, InvalidComplex> {
    match text {
        "" | "+" => Ok(1.0),
        "-" => Ok(-1.0),
        _ => parse_component(text, token),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn re_of(token: &str) -> f64 {
        parse_complex(token).expect("parses").re
    }

    #[test]
    fn full_rectangular_form() {
        let c = parse_complex("1234.5+67.8j").unwrap();
        assert_eq!(c.re, 1234.5);
        assert_eq!(c.im, 67.8);

        let c = parse_complex("-4.2e3-1j").unwrap();
        assert_eq!(c.re, -4200.0);
        assert_eq!(c.im, -1.0);
    }

    #[test]
    fn bare_real() {
        assert_eq!(re_of("5000"), 5000.0);
        assert_eq!(re_of("-12.5"), -12.5);
        assert_eq!(re_of("+1e6"), 1e6);
    }

    #[test]
    fn pure_imaginary() {
        let c = parse_complex("67.8j").unwrap();
        assert_eq!((c.re, c.im), (0.0, 67.8));

        assert_eq!(parse_complex("j").unwrap().im, 1.0);
        assert_eq!(parse_complex("+j").unwrap().im, 1.0);
        assert_eq!(parse_complex("-j").unwrap().im, -1.0);
    }

    #[test]
    fn exponent_signs_are_not_component_splits() {
        let c = parse_complex("1e+3+2e-1j").unwrap();
        assert_eq!(c.re, 1000.0);
        assert_eq!(c.im, 0.2);
    }

    #[test]
    fn bare_sign_imaginary_component() {
        let c = parse_complex("5+j").unwrap();
        assert_eq!((c.re, c.im), (5.0, 1.0));
        let c = parse_complex("5-j").unwrap();
        assert_eq!((c.re, c.im), (5.0, -1.0));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_complex("").is_err());
        assert!(parse_complex("VA").is_err());
        assert!(parse_complex("1.2.3").is_err());
        assert!(parse_complex("1+2i").is_err());
        assert!(parse_complex("++5j").is_err());
    }
}
