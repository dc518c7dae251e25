//! Pipeline stages for LaTeX-to-SVG conversion.
//!
//! Each submodule implements exactly one transformation step. Data flows
//! strictly forward; every stage blocks until the previous stage's files are
//! fully written.
//!
//! ## Data Flow
//!
//! ```text
//! document ──▶ typeset ──▶ measure ──▶ inject ──▶ optimize
//!  (.tex)      (latex)    (dvisvgm)   (em size)  (scour/svgo)
//! ```
//!
//! 1. [`document`] — substitute fragment, preamble and font size into the template
//! 2. [`typeset`]  — write `code.tex`, run LaTeX → `code.dvi`
//! 3. [`measure`]  — run dvisvgm → `code.svg`, parse width/height/depth from stderr
//! 4. [`inject`]   — rewrite the root `<svg>` size and alignment in `em`, drop comments
//! 5. [`optimize`] — minify and namespace ids → `optimized.svg`
//!
//! [`command`] holds the subprocess plumbing shared by stages 2–5.

pub mod command;
pub mod document;
pub mod inject;
pub mod measure;
pub mod optimize;
pub mod typeset;
