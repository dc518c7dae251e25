//! Conversion entry points.
//!
//! Two layers:
//!
//! * [`convert_in`] runs the pipeline inside a directory the caller owns and
//!   cleans up.
//! * [`convert`] creates a [`tempfile::TempDir`], delegates to
//!   [`convert_in`], and lets the directory drop on every exit path.
//!
//! [`convert_async`] and [`convert_to_file`] are conveniences on top of
//! [`convert`].

use crate::config::ConversionParams;
use crate::error::Latex2SvgError;
use crate::output::ConversionOutput;
use crate::pipeline::{document, inject, measure, optimize, typeset};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Convert a LaTeX fragment to SVG in a fresh temporary directory.
///
/// # Errors
/// - [`Latex2SvgError::Io`] — the temporary directory could not be created
/// - [`Latex2SvgError::ToolNotFound`] — latex, dvisvgm or the optimizer is missing
/// - [`Latex2SvgError::ToolFailed`] — a tool exited non-zero; its output is attached
/// - [`Latex2SvgError::MeasurementNotFound`] — dvisvgm printed no size
pub fn convert(code: &str, params: &ConversionParams) -> Result<ConversionOutput, Latex2SvgError> {
    let work_dir = tempfile::Builder::new()
        .prefix("latex2svg-")
        .tempdir()
        .map_err(|e| Latex2SvgError::io(std::env::temp_dir(), e))?;
    debug!("Working directory: {}", work_dir.path().display());

    // `work_dir` is removed when it drops, whether or not the pipeline failed.
    convert_in(code, params, work_dir.path())
}

/// Convert a LaTeX fragment to SVG using `work_dir` for intermediate files.
///
/// The directory must exist and must not be shared with a concurrent call.
/// Files written: `code.tex`, `code.dvi`, `code.svg`, and depending on the
/// optimizer `optimized.svg` and `svgo.config.js`. Nothing is cleaned up.
pub fn convert_in(
    code: &str,
    params: &ConversionParams,
    work_dir: &Path,
) -> Result<ConversionOutput, Latex2SvgError> {
    params.validate()?;
    let start = Instant::now();
    info!(
        "Converting {} bytes of LaTeX at {}pt (scale {}, optimizer {})",
        code.len(),
        params.fontsize,
        params.scale,
        params.optimizer
    );

    // ── Step 1: Assemble document ────────────────────────────────────────
    let source = document::assemble(code, params);

    // ── Step 2: Typeset ──────────────────────────────────────────────────
    typeset::typeset(&source, params, work_dir)?;

    // ── Step 3: DVI → SVG, measure ───────────────────────────────────────
    let (svg_path, measurement) = measure::convert_dvi(params, work_dir)?;

    // ── Step 4: Inject em size and baseline offset ───────────────────────
    inject::inject_metadata(&svg_path, &measurement)?;

    // ── Step 5: Optimize ─────────────────────────────────────────────────
    let svg = optimize::optimize(params, work_dir)?;

    let output = ConversionOutput::new(svg, &measurement);
    info!(
        "Conversion complete: {}em x {}em, valign {}em, {} bytes in {}ms",
        output.width,
        output.height,
        output.valign,
        output.svg.len(),
        start.elapsed().as_millis()
    );
    Ok(output)
}

/// Run [`convert`] on tokio's blocking pool.
///
/// The external tools block; this keeps them off the async worker threads.
pub async fn convert_async(
    code: impl Into<String>,
    params: ConversionParams,
) -> Result<ConversionOutput, Latex2SvgError> {
    let code = code.into();
    tokio::task::spawn_blocking(move || convert(&code, &params))
        .await
        .map_err(|e| Latex2SvgError::Internal(format!("Conversion task panicked: {e}")))?
}

/// Convert and write the SVG to `output_path`.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub fn convert_to_file(
    code: &str,
    output_path: impl AsRef<Path>,
    params: &ConversionParams,
) -> Result<ConversionOutput, Latex2SvgError> {
    let output = convert(code, params)?;
    let path = output_path.as_ref();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Latex2SvgError::io(parent, e))?;
    }

    let tmp_path = path.with_extension("svg.tmp");
    std::fs::write(&tmp_path, &output.svg).map_err(|e| Latex2SvgError::io(&tmp_path, e))?;
    std::fs::rename(&tmp_path, path).map_err(|e| Latex2SvgError::io(path, e))?;

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Tool;

    #[test]
    fn invalid_params_fail_before_any_tool_runs() {
        let dir = tempfile::tempdir().unwrap();
        let params = ConversionParams {
            fontsize: -1.0,
            ..ConversionParams::default()
        };
        let err = convert_in("$x$", &params, dir.path()).unwrap_err();
        assert!(matches!(err, Latex2SvgError::InvalidConfig(_)));
        assert!(!dir.path().join(typeset::TEX_FILE).exists());
    }

    #[test]
    fn missing_latex_is_reported_as_latex() {
        let params = ConversionParams::builder()
            .latex_cmd("latex2svg-test-no-such-latex {{ infile }}")
            .build()
            .unwrap();
        let err = convert("$x$", &params).unwrap_err();
        assert!(matches!(err, Latex2SvgError::ToolNotFound { tool: Tool::Latex, .. }));
    }

    #[tokio::test]
    async fn async_wrapper_propagates_errors() {
        let params = ConversionParams::builder()
            .latex_cmd("latex2svg-test-no-such-latex {{ infile }}")
            .build()
            .unwrap();
        let err = convert_async("$x$", params).await.unwrap_err();
        assert_eq!(err.tool(), Some(Tool::Latex));
    }
}
