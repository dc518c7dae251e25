//! # latex2svg
//!
//! Render a LaTeX fragment as a small, self-contained SVG for web pages.
//!
//! The output carries `width`, `height` and `style="vertical-align:…"` in
//! `em`, so it scales with the surrounding font and sits on the text
//! baseline. Element ids are prefixed with a random token, so the same
//! formula can appear many times on one page without id collisions.
//!
//! ## Pipeline Overview
//!
//! ```text
//! LaTeX fragment
//!  │
//!  ├─ 1. Assemble  template + preamble + font size → code.tex
//!  ├─ 2. Typeset   latex → code.dvi
//!  ├─ 3. Convert   dvisvgm → code.svg, parse width/height/depth from stderr
//!  ├─ 4. Inject    em-sized width/height/vertical-align on the root <svg>
//!  └─ 5. Optimize  scour | svgo | none → minified SVG with prefixed ids
//! ```
//!
//! The heavy lifting is done by external programs (`latex`, `dvisvgm`,
//! `scour` or `svgo`); this crate drives them, reads their diagnostics and
//! edits the SVG root.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use latex2svg::{convert, ConversionParams};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Probe for Ghostscript once at startup.
//!     let params = ConversionParams::discover();
//!     let out = convert(r"$\zeta(s) = \sum_{n=1}^\infty n^{-s}$", &params)?;
//!     println!("{}", out.svg);
//!     eprintln!("{}em x {}em, valign {}em", out.width, out.height, out.valign);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `latex2svg` binary (clap + anyhow + serde_json + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{detect_libgs, ConversionParams, ConversionParamsBuilder, Optimizer};
pub use convert::{convert, convert_async, convert_in, convert_to_file};
pub use error::{Latex2SvgError, Tool};
pub use output::{ConversionOutput, Measurement};
pub use pipeline::optimize::IdPrefix;
