//! Working-directory creation failures.
//!
//! Kept in its own test binary: it points `TMPDIR` at a missing directory,
//! which would break every other test running in the same process.

#![cfg(unix)]

use latex2svg::{convert, ConversionParams, Latex2SvgError};
use std::path::PathBuf;

#[test]
fn unusable_temp_root_is_an_io_error() {
    let root = tempfile::tempdir().unwrap();
    let missing = root.path().join("does-not-exist");
    std::env::set_var("TMPDIR", &missing);

    let err = convert("$x$", &ConversionParams::default()).unwrap_err();

    match err {
        Latex2SvgError::Io { path, source } => {
            assert_eq!(path, PathBuf::from(&missing));
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("expected Io, got {other:?}"),
    }
}
