//! Document assembly: fragment + preamble + font size → complete `.tex` source.
//!
//! Pure string substitution. The fragment is not checked here; a malformed
//! fragment is reported by LaTeX in the next stage.

use crate::config::ConversionParams;

/// Fill the document template.
///
/// The preamble is substituted before the fragment so that marker-like text
/// inside the fragment is left alone.
pub fn assemble(code: &str, params: &ConversionParams) -> String {
    params
        .template
        .replace("{{ preamble }}", &params.preamble)
        .replace("{{ fontsize }}", &format_fontsize(params.fontsize))
        .replace("{{ code }}", code)
}

/// `12.0` → `12`, `10.5` → `10.5`.
fn format_fontsize(pt: f64) -> String {
    if pt.fract() == 0.0 {
        format!("{}", pt as i64)
    } else {
        pt.to_string()
    }
}
