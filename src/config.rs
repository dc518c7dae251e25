//! Conversion parameters.
//!
//! All conversion behaviour is controlled through [`ConversionParams`],
//! built via its [`ConversionParamsBuilder`]. The value is constructed once
//! by the host and only read by the pipeline.
//!
//! # Placeholders
//!
//! The document template uses `{{ fontsize }}`, `{{ preamble }}` and
//! `{{ code }}`. Command templates may use `{{ infile }}`, `{{ outfile }}`,
//! `{{ prefix }}`, `{{ scale }}` and `{{ config }}`; they are rendered first
//! and then split into an argument vector (POSIX quoting, no shell is
//! involved). `latex_cmd` must name `{{ infile }}`, `dvisvgm_cmd` both
//! `{{ infile }}` and `{{ scale }}`, and the selected optimizer's command
//! `{{ infile }}` and `{{ outfile }}`.
//!
//! # Ghostscript
//!
//! dvisvgm needs Ghostscript's shared library to process PostScript
//! specials. [`detect_libgs`] looks for it; it never runs implicitly. Call it
//! (or [`ConversionParams::discover`]) once at startup and pass the result
//! down.

use crate::error::Latex2SvgError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

/// Standalone document wrapping the fragment in a `preview` environment so
/// dvisvgm's exact bounding box matches the content.
pub const DEFAULT_TEMPLATE: &str = r"
\documentclass[{{ fontsize }}pt,preview]{standalone}
{{ preamble }}
\begin{document}
\begin{preview}
{{ code }}
\end{preview}
\end{document}
";

/// Packages and shortcuts available to every fragment by default.
pub const DEFAULT_PREAMBLE: &str = r"
\usepackage[utf8x]{inputenc}
\usepackage{amsmath}
\usepackage{amsfonts}
\usepackage{amssymb}
\usepackage{amstext}
\usepackage{newtxtext}
\usepackage[libertine]{newtxmath}
% prevent errors from old font commands
\DeclareOldFontCommand{\rm}{\normalfont\rmfamily}{\mathrm}
\DeclareOldFontCommand{\sf}{\normalfont\sffamily}{\mathsf}
\DeclareOldFontCommand{\tt}{\normalfont\ttfamily}{\mathtt}
\DeclareOldFontCommand{\bf}{\normalfont\bfseries}{\mathbf}
\DeclareOldFontCommand{\it}{\normalfont\itshape}{\mathit}
\DeclareOldFontCommand{\sl}{\normalfont\slshape}{\@nomath\sl}
\DeclareOldFontCommand{\sc}{\normalfont\scshape}{\@nomath\sc}
% prevent errors from undefined shortcuts
\newcommand{\N}{\mathbb{N}}
\newcommand{\R}{\mathbb{R}}
\newcommand{\Z}{\mathbb{Z}}
";

/// svgo configuration. The viewBox must survive so the image can still be
/// resized with CSS.
pub const DEFAULT_SVGO_CONFIG: &str = r"module.exports = {
  plugins: [
    {
      name: 'preset-default',
      params: {
        overrides: {
          removeViewBox: false,
        },
      },
    },
    {
      name: 'prefixIds',
      params: {
        prefix: '{{ prefix }}',
        delim: '_',
      },
    },
  ],
};
";

pub const DEFAULT_LATEX_CMD: &str = "latex -interaction nonstopmode -halt-on-error {{ infile }}";

pub const DEFAULT_DVISVGM_CMD: &str =
    "dvisvgm --no-fonts --exact-bbox --scale={{ scale }} {{ infile }}";

// scour keeps 5 significant digits by default.
pub const DEFAULT_SCOUR_CMD: &str = "scour --shorten-ids --shorten-ids-prefix=\"{{ prefix }}\" \
     --no-line-breaks --remove-metadata --enable-comment-stripping \
     --strip-xml-prolog -i {{ infile }} -o {{ outfile }}";

pub const DEFAULT_SVGO_CMD: &str = "svgo --config {{ config }} -i {{ infile }} -o {{ outfile }}";

/// Parameters for one LaTeX → SVG conversion.
///
/// # Example
/// ```rust
/// use latex2svg::{ConversionParams, Optimizer};
///
/// let params = ConversionParams::builder()
///     .fontsize(11.0)
///     .optimizer(Optimizer::None)
///     .build()
///     .unwrap();
/// assert_eq!(params.scale, 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionParams {
    /// Document font size in TeX points. Default: 12.
    ///
    /// Also the divisor that turns measured points into `em`.
    pub fontsize: f64,

    /// Extra output scaling applied by dvisvgm. Default: 1.0.
    pub scale: f64,

    /// Document template with `{{ fontsize }}`, `{{ preamble }}`, `{{ code }}`.
    pub template: String,

    /// LaTeX preamble substituted into the template.
    pub preamble: String,

    /// Typesetting command. Default: [`DEFAULT_LATEX_CMD`].
    pub latex_cmd: String,

    /// DVI → SVG command. Default: [`DEFAULT_DVISVGM_CMD`].
    pub dvisvgm_cmd: String,

    /// scour command. Input and output must differ. Default: [`DEFAULT_SCOUR_CMD`].
    pub scour_cmd: String,

    /// svgo command. Default: [`DEFAULT_SVGO_CMD`].
    pub svgo_cmd: String,

    /// svgo configuration file contents with a `{{ prefix }}` marker.
    pub svgo_config: String,

    /// Which optimizer runs after attribute injection. Default: scour.
    pub optimizer: Optimizer,

    /// Ghostscript library exported to dvisvgm and the optimizer as `LIBGS`.
    pub libgs: Option<PathBuf>,
}

impl Default for ConversionParams {
    fn default() -> Self {
        Self {
            fontsize: 12.0,
            scale: 1.0,
            template: DEFAULT_TEMPLATE.to_string(),
            preamble: DEFAULT_PREAMBLE.to_string(),
            latex_cmd: DEFAULT_LATEX_CMD.to_string(),
            dvisvgm_cmd: DEFAULT_DVISVGM_CMD.to_string(),
            scour_cmd: DEFAULT_SCOUR_CMD.to_string(),
            svgo_cmd: DEFAULT_SVGO_CMD.to_string(),
            svgo_config: DEFAULT_SVGO_CONFIG.to_string(),
            optimizer: Optimizer::default(),
            libgs: None,
        }
    }
}

impl ConversionParams {
    /// Create a new builder for `ConversionParams`.
    pub fn builder() -> ConversionParamsBuilder {
        ConversionParamsBuilder {
            params: Self::default(),
        }
    }

    /// Defaults plus whatever [`detect_libgs`] finds on this machine.
    pub fn discover() -> Self {
        Self {
            libgs: detect_libgs(),
            ..Self::default()
        }
    }

    pub(crate) fn validate(&self) -> Result<(), Latex2SvgError> {
        if !(self.fontsize.is_finite() && self.fontsize > 0.0) {
            return Err(Latex2SvgError::InvalidConfig(format!(
                "font size must be a positive number, got {}",
                self.fontsize
            )));
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(Latex2SvgError::InvalidConfig(format!(
                "scale must be a positive number, got {}",
                self.scale
            )));
        }

        require_markers("latex_cmd", &self.latex_cmd, &["infile"])?;
        require_markers("dvisvgm_cmd", &self.dvisvgm_cmd, &["infile", "scale"])?;
        match self.optimizer {
            Optimizer::Scour => require_markers("scour_cmd", &self.scour_cmd, &["infile", "outfile"]),
            Optimizer::Svgo => require_markers("svgo_cmd", &self.svgo_cmd, &["infile", "outfile"]),
            Optimizer::None => Ok(()),
        }
    }
}

/// Every file and value the pipeline hands a tool travels through a marker,
/// so a template without one would silently drop it.
fn require_markers(field: &str, template: &str, markers: &[&str]) -> Result<(), Latex2SvgError> {
    match markers
        .iter()
        .find(|m| !template.contains(&format!("{{{{ {m} }}}}")))
    {
        Some(missing) => Err(Latex2SvgError::InvalidConfig(format!(
            "{field} must contain {{{{ {missing} }}}}, got {template:?}"
        ))),
        None => Ok(()),
    }
}

/// Builder for [`ConversionParams`].
#[derive(Debug)]
pub struct ConversionParamsBuilder {
    params: ConversionParams,
}

impl ConversionParamsBuilder {
    pub fn fontsize(mut self, pt: f64) -> Self {
        self.params.fontsize = pt;
        self
    }

    pub fn scale(mut self, scale: f64) -> Self {
        self.params.scale = scale;
        self
    }

    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.params.template = template.into();
        self
    }

    pub fn preamble(mut self, preamble: impl Into<String>) -> Self {
        self.params.preamble = preamble.into();
        self
    }

    pub fn latex_cmd(mut self, cmd: impl Into<String>) -> Self {
        self.params.latex_cmd = cmd.into();
        self
    }

    pub fn dvisvgm_cmd(mut self, cmd: impl Into<String>) -> Self {
        self.params.dvisvgm_cmd = cmd.into();
        self
    }

    pub fn scour_cmd(mut self, cmd: impl Into<String>) -> Self {
        self.params.scour_cmd = cmd.into();
        self
    }

    pub fn svgo_cmd(mut self, cmd: impl Into<String>) -> Self {
        self.params.svgo_cmd = cmd.into();
        self
    }

    pub fn svgo_config(mut self, config: impl Into<String>) -> Self {
        self.params.svgo_config = config.into();
        self
    }

    pub fn optimizer(mut self, optimizer: Optimizer) -> Self {
        self.params.optimizer = optimizer;
        self
    }

    pub fn libgs(mut self, path: impl Into<PathBuf>) -> Self {
        self.params.libgs = Some(path.into());
        self
    }

    /// Build the parameters, validating constraints.
    pub fn build(self) -> Result<ConversionParams, Latex2SvgError> {
        self.params.validate()?;
        Ok(self.params)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// SVG optimizer run after the size attributes are injected.
///
/// Both real backends minify the file and namespace every `id` with a fresh
/// random prefix so several formulas can share one HTML page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Optimizer {
    /// scour: `--shorten-ids` with a prefix. (default)
    #[default]
    Scour,
    /// svgo with a generated `prefixIds` configuration.
    Svgo,
    /// Return dvisvgm's SVG with the injected attributes, unoptimized.
    None,
}

impl Optimizer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Optimizer::Scour => "scour",
            Optimizer::Svgo => "svgo",
            Optimizer::None => "none",
        }
    }
}

impl fmt::Display for Optimizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Optimizer {
    type Err = Latex2SvgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scour" => Ok(Optimizer::Scour),
            "svgo" => Ok(Optimizer::Svgo),
            "none" => Ok(Optimizer::None),
            other => Err(Latex2SvgError::InvalidConfig(format!(
                "unknown optimizer '{other}' (expected scour, svgo or none)"
            ))),
        }
    }
}

// ── Ghostscript discovery ────────────────────────────────────────────────

const HOMEBREW_LIBGS: &str = "/usr/local/opt/ghostscript/lib/libgs.dylib";

const LIB_DIRS: &[&str] = &[
    "/usr/lib",
    "/usr/lib64",
    "/usr/local/lib",
    "/usr/lib/x86_64-linux-gnu",
    "/usr/lib/aarch64-linux-gnu",
    "/opt/homebrew/lib",
];

/// Locate Ghostscript's shared library for dvisvgm.
///
/// Returns `None` when `LIBGS` is already set in the environment (dvisvgm
/// reads it itself) or when a system copy is on a standard library path and
/// needs no override. Otherwise falls back to Homebrew's location on macOS.
/// Logs a warning when no library is found at all.
pub fn detect_libgs() -> Option<PathBuf> {
    if std::env::var_os("LIBGS").is_some_and(|v| !v.is_empty()) {
        debug!("LIBGS already set in environment");
        return None;
    }

    if let Some(found) = LIB_DIRS.iter().find_map(|dir| find_libgs_in(Path::new(dir))) {
        debug!("Found Ghostscript library: {}", found.display());
        return None;
    }

    if cfg!(target_os = "macos") {
        let homebrew = Path::new(HOMEBREW_LIBGS);
        if homebrew.exists() {
            debug!("Using Homebrew Ghostscript: {}", homebrew.display());
            return Some(homebrew.to_path_buf());
        }
    }

    warn!("libgs not found; dvisvgm may be unable to process PostScript specials");
    None
}

fn find_libgs_in(dir: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .find(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(is_libgs_name)
        })
}

fn is_libgs_name(name: &str) -> bool {
    name == "libgs.dylib"
        || name == "libgs.so"
        || name.starts_with("libgs.so.")
        || (name.starts_with("libgs.") && name.ends_with(".dylib"))
}
