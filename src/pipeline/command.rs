//! Running the external tools.
//!
//! Every stage shells out the same way: render a command template, split it
//! into an argument vector, run it with the working directory as `cwd`,
//! capture both streams as bytes and classify the outcome. A spawn that
//! fails with `NotFound`/`PermissionDenied` becomes
//! [`Latex2SvgError::ToolNotFound`]; a non-zero exit becomes
//! [`Latex2SvgError::ToolFailed`] carrying the captured streams untouched.
//!
//! Environment overrides (the optional `LIBGS`) are set on the child
//! [`Command`] only; the host's environment is never modified.

use crate::error::{Latex2SvgError, Tool};
use std::io::ErrorKind;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tracing::debug;

/// Replace every `{{ key }}` marker in `template`.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{{ {key} }}}}"), value)
    })
}

/// Split a command line into arguments following POSIX shell quoting.
///
/// Whitespace separates arguments. Inside single quotes everything is
/// literal. Inside double quotes a backslash only escapes `\\` and `"`;
/// before any other character it is kept. Outside quotes a backslash
/// escapes the next character. An unclosed quote or a trailing backslash
/// is an error.
pub fn split_args(line: &str) -> Result<Vec<String>, &'static str> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some('\''), '\'') | (Some('"'), '"') => quote = None,
            (Some('"'), '\\') => match chars.peek() {
                Some(&next @ ('\\' | '"')) => {
                    current.push(next);
                    chars.next();
                }
                _ => current.push('\\'),
            },
            (Some(_), _) => current.push(c),
            (None, '\\') => {
                current.push(chars.next().ok_or("trailing backslash")?);
                in_arg = true;
            }
            (None, '\'' | '"') => {
                quote = Some(c);
                in_arg = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            (None, _) => {
                current.push(c);
                in_arg = true;
            }
        }
    }
    if quote.is_some() {
        return Err("unclosed quote");
    }
    if in_arg {
        args.push(current);
    }
    Ok(args)
}

/// A fully rendered invocation of one tool.
#[derive(Debug, Clone)]
pub struct ToolCommand<'a> {
    tool: Tool,
    argv: Vec<String>,
    env: Vec<(&'static str, &'a Path)>,
}

impl<'a> ToolCommand<'a> {
    /// Render `template` with `vars` and split it.
    pub fn from_template(
        tool: Tool,
        template: &str,
        vars: &[(&str, &str)],
    ) -> Result<Self, Latex2SvgError> {
        let invalid = |reason: &str| Latex2SvgError::InvalidCommand {
            tool,
            template: template.to_string(),
            reason: reason.to_string(),
        };
        let argv = split_args(&render(template, vars)).map_err(invalid)?;
        if argv.is_empty() {
            return Err(invalid("no program"));
        }
        Ok(Self {
            tool,
            argv,
            env: Vec::new(),
        })
    }

    /// Export `LIBGS` to the child when a library path is configured.
    pub fn with_libgs(mut self, libgs: Option<&'a Path>) -> Self {
        if let Some(path) = libgs {
            self.env.push(("LIBGS", path));
        }
        self
    }

    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }

    /// Run to completion inside `cwd`.
    ///
    /// Returns the captured output on a zero exit status.
    pub fn run(&self, cwd: &Path) -> Result<Output, Latex2SvgError> {
        debug!("Running {}: {}", self.tool, self.argv.join(" "));

        let mut cmd = Command::new(self.program());
        cmd.args(self.args())
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        let output = cmd.output().map_err(|e| match e.kind() {
            ErrorKind::NotFound | ErrorKind::PermissionDenied => Latex2SvgError::ToolNotFound {
                tool: self.tool,
                program: self.program().to_string(),
            },
            _ => Latex2SvgError::Internal(format!("failed to run {}: {e}", self.tool)),
        })?;

        if !output.status.success() {
            debug!("{} exited with {}", self.tool, output.status);
            return Err(Latex2SvgError::ToolFailed {
                tool: self.tool,
                code: output.status.code(),
                stdout: output.stdout,
                stderr: output.stderr,
            });
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_replaces_all_markers() {
        let out = render(
            "scour -i {{ infile }} -o {{ outfile }} {{ infile }}",
            &[("infile", "code.svg"), ("outfile", "optimized.svg")],
        );
        assert_eq!(out, "scour -i code.svg -o optimized.svg code.svg");
    }

    #[test]
    fn render_leaves_unknown_markers() {
        assert_eq!(render("{{ other }}", &[("infile", "x")]), "{{ other }}");
    }

    #[test]
    fn split_plain_whitespace() {
        assert_eq!(
            split_args("  latex  -interaction nonstopmode\tcode.tex ").unwrap(),
            vec!["latex", "-interaction", "nonstopmode", "code.tex"]
        );
    }

    #[test]
    fn split_strips_quotes_inside_argument() {
        assert_eq!(
            split_args(r#"scour --shorten-ids-prefix="abc_" -i 'my file.svg'"#).unwrap(),
            vec!["scour", "--shorten-ids-prefix=abc_", "-i", "my file.svg"]
        );
    }

    #[test]
    fn split_keeps_empty_quoted_argument() {
        assert_eq!(split_args(r#"cmd "" x"#).unwrap(), vec!["cmd", "", "x"]);
    }

    #[test]
    fn split_backslash_escapes() {
        assert_eq!(split_args(r"a\ b c").unwrap(), vec!["a b", "c"]);
        assert_eq!(split_args(r"'a\b'").unwrap(), vec![r"a\b"]);
    }

    #[test]
    fn split_double_quotes_keep_plain_backslash() {
        assert_eq!(split_args(r#"x "a\b""#).unwrap(), vec!["x", r"a\b"]);
        assert_eq!(
            split_args(r#""q\"d" "s\\l""#).unwrap(),
            vec![r#"q"d"#, r"s\l"]
        );
    }

    #[test]
    fn split_rejects_unclosed_quote() {
        assert_eq!(
            split_args(r#"scour --prefix="abc -i code.svg"#),
            Err("unclosed quote")
        );
        assert_eq!(split_args("echo 'abc"), Err("unclosed quote"));
        assert_eq!(split_args(r#"echo "a\""#), Err("unclosed quote"));
    }

    #[test]
    fn split_rejects_trailing_backslash() {
        assert_eq!(split_args(r"latex code.tex \"), Err("trailing backslash"));
    }

    #[test]
    fn unclosed_quote_is_invalid_command() {
        let err = ToolCommand::from_template(
            Tool::Scour,
            r#"scour --shorten-ids-prefix="{{ prefix }} -i {{ infile }}"#,
            &[("prefix", "abc_"), ("infile", "code.svg")],
        )
        .unwrap_err();
        match err {
            Latex2SvgError::InvalidCommand { tool, reason, .. } => {
                assert_eq!(tool, Tool::Scour);
                assert_eq!(reason, "unclosed quote");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_template_is_invalid() {
        let err = ToolCommand::from_template(Tool::Svgo, "   ", &[]).unwrap_err();
        assert!(matches!(err, Latex2SvgError::InvalidCommand { tool: Tool::Svgo, .. }));
    }

    #[test]
    fn missing_program_is_tool_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = ToolCommand::from_template(
            Tool::Dvisvgm,
            "latex2svg-test-no-such-program {{ infile }}",
            &[("infile", "code.dvi")],
        )
        .unwrap();
        match cmd.run(dir.path()).unwrap_err() {
            Latex2SvgError::ToolNotFound { tool, program } => {
                assert_eq!(tool, Tool::Dvisvgm);
                assert_eq!(program, "latex2svg-test-no-such-program");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_keeps_streams() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = ToolCommand::from_template(
            Tool::Latex,
            "sh -c 'echo out; echo err >&2; exit 7'",
            &[],
        )
        .unwrap();
        match cmd.run(dir.path()).unwrap_err() {
            Latex2SvgError::ToolFailed {
                tool,
                code,
                stdout,
                stderr,
            } => {
                assert_eq!(tool, Tool::Latex);
                assert_eq!(code, Some(7));
                assert_eq!(stdout, b"out\n");
                assert_eq!(stderr, b"err\n");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn libgs_is_set_on_child_only() {
        let dir = tempfile::tempdir().unwrap();
        let lib = Path::new("/opt/gs/libgs.so");
        let output = ToolCommand::from_template(Tool::Dvisvgm, "sh -c 'printf %s \"$LIBGS\"'", &[])
            .unwrap()
            .with_libgs(Some(lib))
            .run(dir.path())
            .unwrap();
        assert_eq!(output.stdout, b"/opt/gs/libgs.so");
        assert_ne!(
            std::env::var_os("LIBGS").as_deref(),
            Some(lib.as_os_str())
        );
    }
}
