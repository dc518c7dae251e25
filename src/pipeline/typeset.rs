//! Typesetting: write `code.tex` and run LaTeX to produce `code.dvi`.
//!
//! LaTeX prints its errors on stdout, so both streams are captured and a
//! failed run hands them back unchanged. No retry: the same input always
//! fails the same way.

use crate::config::ConversionParams;
use crate::error::{Latex2SvgError, Tool};
use crate::pipeline::command::ToolCommand;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const TEX_FILE: &str = "code.tex";
pub const DVI_FILE: &str = "code.dvi";

/// Write `document` into `work_dir` and typeset it.
///
/// Returns the path of the DVI file.
pub fn typeset(
    document: &str,
    params: &ConversionParams,
    work_dir: &Path,
) -> Result<PathBuf, Latex2SvgError> {
    let tex_path = work_dir.join(TEX_FILE);
    std::fs::write(&tex_path, document).map_err(|e| Latex2SvgError::io(&tex_path, e))?;

    let output = ToolCommand::from_template(Tool::Latex, &params.latex_cmd, &[("infile", TEX_FILE)])?
        .run(work_dir)?;
    debug!("latex wrote {} bytes of log to stdout", output.stdout.len());

    Ok(work_dir.join(DVI_FILE))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn writes_document_before_running() {
        let dir = tempfile::tempdir().unwrap();
        let params = ConversionParams::builder()
            .latex_cmd("sh -c 'cp {{ infile }} code.dvi'")
            .build()
            .unwrap();
        let dvi = typeset("hello", &params, dir.path()).unwrap();
        assert_eq!(dvi, dir.path().join(DVI_FILE));
        assert_eq!(std::fs::read_to_string(&dvi).unwrap(), "hello");
    }

    #[test]
    fn failure_carries_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let params = ConversionParams::builder()
            .latex_cmd("sh -c 'echo \"! Missing } inserted.\"; exit 1' {{ infile }}")
            .build()
            .unwrap();
        match typeset("x", &params, dir.path()).unwrap_err() {
            Latex2SvgError::ToolFailed { tool, stdout, .. } => {
                assert_eq!(tool, Tool::Latex);
                assert!(String::from_utf8_lossy(&stdout).contains("Missing }"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
