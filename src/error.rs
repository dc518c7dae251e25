//! Error types for the latex2svg library.
//!
//! Every failure is fatal: each stage depends on the artifacts of the one
//! before it, so nothing is recovered locally and nothing is retried. The
//! variants are split so a caller can tell a deployment problem (a tool is
//! not installed) from a bad fragment (a tool ran and rejected it):
//!
//! * [`Latex2SvgError::ToolNotFound`] — the executable could not be spawned.
//! * [`Latex2SvgError::ToolFailed`] — it ran and exited non-zero. The
//!   captured `stdout`/`stderr` bytes are kept verbatim; LaTeX reports syntax
//!   errors on stdout, dvisvgm on stderr.
//! * [`Latex2SvgError::MeasurementNotFound`] — dvisvgm succeeded but printed
//!   no `WIDTHpt x HEIGHTpt` size, so the image cannot be sized.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The external programs the pipeline drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    /// Typesetting engine: `.tex` → `.dvi`.
    Latex,
    /// DVI → SVG conversion engine; also reports the box measurements.
    Dvisvgm,
    /// Python SVG optimizer (default backend).
    Scour,
    /// Node SVG optimizer.
    Svgo,
}

impl Tool {
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Latex => "latex",
            Tool::Dvisvgm => "dvisvgm",
            Tool::Scour => "scour",
            Tool::Svgo => "svgo",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// All errors returned by the latex2svg library.
#[derive(Debug, Error)]
pub enum Latex2SvgError {
    // ── External tools ────────────────────────────────────────────────────
    /// The configured executable does not exist (or is not executable).
    #[error("{tool} not found: could not run '{program}'\nIs it installed and on PATH?")]
    ToolNotFound { tool: Tool, program: String },

    /// The tool ran and exited with a non-zero status.
    #[error("{tool} failed with {}", exit_status_text(.code))]
    ToolFailed {
        tool: Tool,
        code: Option<i32>,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
    },

    /// A command template could not be split into an argument list.
    #[error("Invalid command template for {tool} ({reason}): {template:?}")]
    InvalidCommand {
        tool: Tool,
        template: String,
        reason: String,
    },

    // ── Measurement ───────────────────────────────────────────────────────
    /// dvisvgm's diagnostic output contained no `WIDTHpt x HEIGHTpt` token.
    #[error("Could not find the graphic size in dvisvgm output:\n{output}")]
    MeasurementNotFound { output: String },

    // ── Artifacts ─────────────────────────────────────────────────────────
    /// The raw SVG written by dvisvgm is not well-formed XML.
    #[error("Malformed SVG '{path}': {detail}")]
    MalformedSvg { path: PathBuf, detail: String },

    /// Reading or writing a file inside the working directory failed.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn exit_status_text(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit status {c}"),
        None => "termination by signal".to_string(),
    }
}

impl Latex2SvgError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Latex2SvgError::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit status the CLI should terminate with.
    ///
    /// The failing tool's own code when there is one, `1` otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            Latex2SvgError::ToolFailed { code: Some(c), .. } if *c != 0 => *c,
            _ => 1,
        }
    }

    /// The captured output of a failed tool: stdout, then stderr.
    ///
    /// `None` for every variant that did not come from a tool run.
    pub fn diagnostics(&self) -> Option<String> {
        match self {
            Latex2SvgError::ToolFailed { stdout, stderr, .. } => Some(format!(
                "{}\n{}",
                String::from_utf8_lossy(stdout),
                String::from_utf8_lossy(stderr)
            )),
            _ => None,
        }
    }

    /// The tool this error is attributed to, if any.
    pub fn tool(&self) -> Option<Tool> {
        match self {
            Latex2SvgError::ToolNotFound { tool, .. }
            | Latex2SvgError::ToolFailed { tool, .. }
            | Latex2SvgError::InvalidCommand { tool, .. } => Some(*tool),
            Latex2SvgError::MeasurementNotFound { .. } => Some(Tool::Dvisvgm),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_not_found_names_program() {
        let e = Latex2SvgError::ToolNotFound {
            tool: Tool::Dvisvgm,
            program: "dvisvgm".into(),
        };
        let msg = e.to_string();
        assert!(msg.starts_with("dvisvgm not found"), "got: {msg}");
        assert_eq!(e.exit_code(), 1);
        assert_eq!(e.tool(), Some(Tool::Dvisvgm));
    }

    #[test]
    fn tool_failed_keeps_streams_and_code() {
        let e = Latex2SvgError::ToolFailed {
            tool: Tool::Latex,
            code: Some(3),
            stdout: b"! Missing } inserted.".to_vec(),
            stderr: Vec::new(),
        };
        assert_eq!(e.exit_code(), 3);
        assert!(e.to_string().contains("exit status 3"));
        let diag = e.diagnostics().unwrap();
        assert!(diag.contains("Missing } inserted"));
    }

    #[test]
    fn signal_termination_exits_one() {
        let e = Latex2SvgError::ToolFailed {
            tool: Tool::Scour,
            code: None,
            stdout: Vec::new(),
            stderr: Vec::new(),
        };
        assert_eq!(e.exit_code(), 1);
        assert!(e.to_string().contains("signal"));
    }

    #[test]
    fn measurement_not_found_is_dvisvgm() {
        let e = Latex2SvgError::MeasurementNotFound {
            output: "pre-processing DVI file".into(),
        };
        assert_eq!(e.tool(), Some(Tool::Dvisvgm));
        assert!(e.diagnostics().is_none());
    }
}
