//! DVI → SVG conversion and size extraction.
//!
//! dvisvgm writes `code.svg` and reports the exact bounding box on stderr:
//!
//! ```text
//! pre-processing DVI file (format version 2)
//! processing page 1
//!   computing extents based on data set by preview package (version 13.1)
//!   width=39.1803pt, height=9.4117pt, depth=2.7567pt
//!   graphic size: 39.1803pt x 12.1684pt (13.7698mm x 4.27665mm)
//!   output written to code.svg
//! 1 of 1 page converted in 0.083 seconds
//! ```
//!
//! The numbers are TeX points (1/72.27 in) while the SVG's viewBox is in
//! PostScript points (1/72 in), so every value is multiplied by
//! [`PT_CORRECTION`] on the way to `em`.

use crate::config::ConversionParams;
use crate::error::{Latex2SvgError, Tool};
use crate::output::Measurement;
use crate::pipeline::command::ToolCommand;
use crate::pipeline::typeset::DVI_FILE;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const SVG_FILE: &str = "code.svg";

/// 72.27 / 72: ratio between a TeX point and a PostScript point.
pub const PT_CORRECTION: f64 = 1.00375;

static RE_SIZE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([0-9.]+)pt x ([0-9.]+)pt").unwrap());

static RE_DEPTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bdepth=([0-9.e-]+)pt").unwrap());

/// Run dvisvgm on the DVI file and measure the result.
///
/// Returns the SVG path and the measurements in `em`.
pub fn convert_dvi(
    params: &ConversionParams,
    work_dir: &Path,
) -> Result<(PathBuf, Measurement), Latex2SvgError> {
    let scale = format!("{:.6}", params.scale);
    let output = ToolCommand::from_template(
        Tool::Dvisvgm,
        &params.dvisvgm_cmd,
        &[("infile", DVI_FILE), ("scale", &scale)],
    )?
    .with_libgs(params.libgs.as_deref())
    .run(work_dir)?;

    let diagnostics = String::from_utf8_lossy(&output.stderr);
    let measurement = parse_measurement(&diagnostics, params.fontsize)?;
    debug!(
        "Measured {:.6}em x {:.6}em, depth {:.6}em",
        measurement.width, measurement.height, measurement.depth
    );

    Ok((work_dir.join(SVG_FILE), measurement))
}

/// TeX points → `em` at the given font size.
pub fn pt_to_em(points: f64, fontsize: f64) -> f64 {
    points / fontsize * PT_CORRECTION
}

/// Extract width, height and depth from dvisvgm's diagnostic text.
///
/// A missing size is fatal. A missing depth means no descenders and is 0.
pub fn parse_measurement(output: &str, fontsize: f64) -> Result<Measurement, Latex2SvgError> {
    let not_found = || Latex2SvgError::MeasurementNotFound {
        output: output.to_string(),
    };

    let caps = RE_SIZE.captures(output).ok_or_else(not_found)?;
    let width: f64 = caps[1].parse().map_err(|_| not_found())?;
    let height: f64 = caps[2].parse().map_err(|_| not_found())?;

    let depth = RE_DEPTH
        .captures(output)
        .and_then(|c| c[1].parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(Measurement {
        width: pt_to_em(width, fontsize),
        height: pt_to_em(height, fontsize),
        depth: pt_to_em(depth, fontsize),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "pre-processing DVI file (format version 2)\n\
        processing page 1\n  \
        computing extents based on data set by preview package (version 13.1)\n  \
        width=39.1803pt, height=9.4117pt, depth=2.7567pt\n  \
        graphic size: 39.1803pt x 12.1684pt (13.7698mm x 4.27665mm)\n  \
        output written to code.svg\n\
        1 of 1 page converted in 0.083 seconds\n";

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn parses_size_and_depth() {
        let m = parse_measurement(SAMPLE, 12.0).unwrap();
        assert!(close(m.width, 39.1803 / 12.0 * PT_CORRECTION));
        assert!(close(m.height, 12.1684 / 12.0 * PT_CORRECTION));
        assert!(close(m.depth, 2.7567 / 12.0 * PT_CORRECTION));
        assert!(close(m.valign(), -m.depth));
    }

    #[test]
    fn missing_depth_is_exactly_zero() {
        let m = parse_measurement("graphic size: 5.479pt x 4.289pt (1mm x 1mm)", 12.0).unwrap();
        assert_eq!(m.depth, 0.0);
        assert_eq!(m.valign(), 0.0);
    }

    #[test]
    fn missing_size_is_fatal() {
        let err = parse_measurement("width=1pt, height=2pt, depth=0pt", 12.0).unwrap_err();
        match err {
            Latex2SvgError::MeasurementNotFound { output } => {
                assert!(output.contains("depth=0pt"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unparsable_size_is_fatal() {
        assert!(parse_measurement("1.2.3pt x 4pt", 10.0).is_err());
    }

    #[test]
    fn scaling_is_linear_in_fontsize_multiples() {
        for fontsize in [8.0, 10.0, 12.0, 17.28] {
            for k in [0.5, 1.0, 2.0, 3.25] {
                let em = pt_to_em(fontsize * k, fontsize);
                assert!((em - k * PT_CORRECTION).abs() < 1e-12, "{fontsize} {k}");
            }
        }
    }

    #[test]
    fn depth_accepts_exponent_notation() {
        let m = parse_measurement("depth=1e-05pt\n10pt x 10pt", 10.0).unwrap();
        assert!(close(m.depth, 1e-05 / 10.0 * PT_CORRECTION));
    }
}
