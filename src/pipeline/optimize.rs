//! Optimization: minify the sized SVG and namespace its ids.
//!
//! dvisvgm names glyph paths `g0-120`, `g1-50` and so on, identically in
//! every file. Two formulas on one HTML page would then reference each
//! other's glyphs, so every conversion draws a fresh random [`IdPrefix`] and
//! the optimizer rewrites all ids with it.

use crate::config::{ConversionParams, Optimizer};
use crate::error::{Latex2SvgError, Tool};
use crate::pipeline::command::{render, ToolCommand};
use crate::pipeline::measure::SVG_FILE;
use rand::Rng;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// scour cannot write to its input file.
pub const OPTIMIZED_FILE: &str = "optimized.svg";
pub const SVGO_CONFIG_FILE: &str = "svgo.config.js";

const PREFIX_LEN: usize = 6;
const PREFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Random id namespace for one conversion.
///
/// Letters only: XML ids may not start with a digit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdPrefix(String);

impl IdPrefix {
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let prefix = (0..PREFIX_LEN)
            .map(|_| PREFIX_ALPHABET[rng.random_range(0..PREFIX_ALPHABET.len())] as char)
            .collect();
        IdPrefix(prefix)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Run the configured optimizer over `code.svg` and return the final text.
pub fn optimize(params: &ConversionParams, work_dir: &Path) -> Result<String, Latex2SvgError> {
    let prefix = IdPrefix::generate();
    debug!("Optimizing with {} (id prefix {prefix})", params.optimizer);

    match params.optimizer {
        Optimizer::Scour => run_scour(params, work_dir, &prefix),
        Optimizer::Svgo => run_svgo(params, work_dir, &prefix),
        Optimizer::None => read_artifact(&work_dir.join(SVG_FILE)),
    }
}

fn run_scour(
    params: &ConversionParams,
    work_dir: &Path,
    prefix: &IdPrefix,
) -> Result<String, Latex2SvgError> {
    let scour_prefix = format!("{prefix}_");
    ToolCommand::from_template(
        Tool::Scour,
        &params.scour_cmd,
        &[
            ("infile", SVG_FILE),
            ("outfile", OPTIMIZED_FILE),
            ("prefix", &scour_prefix),
        ],
    )?
    .with_libgs(params.libgs.as_deref())
    .run(work_dir)?;

    read_artifact(&work_dir.join(OPTIMIZED_FILE))
}

fn run_svgo(
    params: &ConversionParams,
    work_dir: &Path,
    prefix: &IdPrefix,
) -> Result<String, Latex2SvgError> {
    let config_path = work_dir.join(SVGO_CONFIG_FILE);
    let config = render(&params.svgo_config, &[("prefix", prefix.as_str())]);
    std::fs::write(&config_path, config).map_err(|e| Latex2SvgError::io(&config_path, e))?;

    ToolCommand::from_template(
        Tool::Svgo,
        &params.svgo_cmd,
        &[
            ("infile", SVG_FILE),
            ("outfile", OPTIMIZED_FILE),
            ("config", SVGO_CONFIG_FILE),
            ("prefix", prefix.as_str()),
        ],
    )?
    .with_libgs(params.libgs.as_deref())
    .run(work_dir)?;

    read_artifact(&work_dir.join(OPTIMIZED_FILE))
}

fn read_artifact(path: &Path) -> Result<String, Latex2SvgError> {
    std::fs::read_to_string(path).map_err(|e| Latex2SvgError::io(path, e))
}
