//! Result types returned by a conversion.

use serde::{Deserialize, Serialize};

/// Decimal places kept in every `em` value.
pub const EM_PRECISION: i32 = 6;

/// Box measurements of a rendered fragment, in `em`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub width: f64,
    pub height: f64,
    /// Distance from the baseline down to the lowest point; 0 when dvisvgm
    /// reports none.
    pub depth: f64,
}

impl Measurement {
    /// CSS `vertical-align` offset: the negated depth.
    ///
    /// Zero depth yields `0.0` rather than `-0.0`.
    pub fn valign(&self) -> f64 {
        if self.depth == 0.0 {
            0.0
        } else {
            -self.depth
        }
    }
}

/// A finished SVG plus its sizing metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// Final SVG document text.
    pub svg: String,
    /// Width in `em`, rounded to 6 decimals.
    pub width: f64,
    /// Height in `em`, rounded to 6 decimals.
    pub height: f64,
    /// Baseline offset in `em` (`-depth`), rounded to 6 decimals.
    pub valign: f64,
}

impl ConversionOutput {
    pub(crate) fn new(svg: String, m: &Measurement) -> Self {
        Self {
            svg,
            width: round_em(m.width),
            height: round_em(m.height),
            valign: round_em(m.valign()),
        }
    }
}

pub(crate) fn round_em(value: f64) -> f64 {
    let factor = 10f64.powi(EM_PRECISION);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valign_is_negated_depth() {
        let m = Measurement {
            width: 1.0,
            height: 1.0,
            depth: 0.25,
        };
        assert_eq!(m.valign(), -0.25);
    }

    #[test]
    fn zero_depth_is_positive_zero() {
        let m = Measurement {
            width: 1.0,
            height: 1.0,
            depth: 0.0,
        };
        assert!(m.valign().is_sign_positive());
    }

    #[test]
    fn output_rounds_to_six_places() {
        let m = Measurement {
            width: 0.123_456_789,
            height: 1.999_999_95,
            depth: 0.000_000_4,
        };
        let out = ConversionOutput::new(String::new(), &m);
        assert_eq!(out.width, 0.123457);
        assert_eq!(out.height, 2.0);
        assert_eq!(out.valign, 0.0);
        assert!(out.valign.is_sign_positive());
    }

    #[test]
    fn output_serialises_four_fields() {
        let out = ConversionOutput {
            svg: "<svg/>".into(),
            width: 1.5,
            height: 0.75,
            valign: -0.1,
        };
        let v: serde_json::Value = serde_json::to_value(&out).unwrap();
        assert_eq!(v["svg"], "<svg/>");
        assert_eq!(v["width"], 1.5);
        assert_eq!(v["valign"], -0.1);
        assert_eq!(v.as_object().unwrap().len(), 4);
    }
}
