//! Metadata injection: size the root `<svg>` in `em` and drop comments.
//!
//! dvisvgm sizes its output in points and prepends a "generated by"
//! comment. The root element's `width`, `height` and `style` are replaced
//! with font-relative values so the image scales with the surrounding text
//! and sits on its baseline. Everything else is streamed through untouched.

use crate::error::Latex2SvgError;
use crate::output::{Measurement, EM_PRECISION};
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::path::Path;
use tracing::debug;

const SIZED_ATTRS: [&str; 3] = ["width", "height", "style"];

/// Rewrite the SVG at `svg_path` in place.
pub fn inject_metadata(svg_path: &Path, m: &Measurement) -> Result<(), Latex2SvgError> {
    let source =
        std::fs::read_to_string(svg_path).map_err(|e| Latex2SvgError::io(svg_path, e))?;
    let sized = size_root(&source, m).map_err(|detail| Latex2SvgError::MalformedSvg {
        path: svg_path.to_path_buf(),
        detail,
    })?;
    std::fs::write(svg_path, sized).map_err(|e| Latex2SvgError::io(svg_path, e))?;
    debug!("Injected em sizing into {}", svg_path.display());
    Ok(())
}

/// `1.5` → `1.500000em`.
pub fn em(value: f64) -> String {
    format!("{:.*}em", EM_PRECISION as usize, value)
}

/// Return `source` without comments and with the root element resized.
pub fn size_root(source: &str, m: &Measurement) -> Result<String, String> {
    let mut reader = Reader::from_str(source);
    let mut writer = Writer::new(Vec::with_capacity(source.len()));
    let mut root_seen = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("at byte {}: {e}", reader.buffer_position()))?;
        let written = match event {
            Event::Eof => break,
            Event::Comment(_) => continue,
            Event::Start(e) if !root_seen => {
                root_seen = true;
                writer.write_event(Event::Start(sized_root(&e, m)?))
            }
            Event::Empty(e) if !root_seen => {
                root_seen = true;
                writer.write_event(Event::Empty(sized_root(&e, m)?))
            }
            other => writer.write_event(other),
        };
        written.map_err(|e| e.to_string())?;
    }

    if !root_seen {
        return Err("document has no root element".to_string());
    }
    String::from_utf8(writer.into_inner()).map_err(|e| e.to_string())
}

/// Copy of `e` with `width`/`height`/`style` replaced in place, or appended
/// when absent.
fn sized_root(e: &BytesStart<'_>, m: &Measurement) -> Result<BytesStart<'static>, String> {
    let values = [
        em(m.width),
        em(m.height),
        format!("vertical-align:{}", em(m.valign())),
    ];
    let mut applied = [false; SIZED_ATTRS.len()];

    let mut root = BytesStart::new(String::from_utf8_lossy(e.name().as_ref()).into_owned());
    for attr in e.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = match SIZED_ATTRS.iter().position(|k| *k == key) {
            Some(i) => {
                applied[i] = true;
                values[i].clone()
            }
            None => attr.unescape_value().map_err(|e| e.to_string())?.into_owned(),
        };
        root.push_attribute((key.as_str(), value.as_str()));
    }
    for (i, key) in SIZED_ATTRS.iter().enumerate() {
        if !applied[i] {
            root.push_attribute((*key, values[i].as_str()));
        }
    }
    Ok(root)
}
