//! CLI binary for latex2svg.
//!
//! A thin shim over the library crate: reads LaTeX from stdin, maps flags
//! to `ConversionParams`, writes the SVG to stdout. When a tool fails its
//! captured output goes to stderr and the process exits with the tool's
//! status.

use anyhow::{Context, Result};
use clap::Parser;
use latex2svg::{convert, convert_to_file, ConversionParams, Latex2SvgError, Optimizer};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Inline formula to stdout
  echo '$x^2$' | latex2svg

  # Display math with svgo, written to a file
  echo '\[ \int_0^1 f(x)\,dx \]' | latex2svg --optimizer svgo -o integral.svg

  # Custom preamble, JSON with em sizes
  latex2svg --preamble preamble.tex --json < formula.tex

REQUIRED TOOLS:
  latex      TeX Live / MiKTeX, with the standalone and preview packages
  dvisvgm    DVI to SVG converter (needs Ghostscript for PostScript specials)
  scour      default optimizer   (pip install scour)
  svgo       optional optimizer  (npm install -g svgo)

ENVIRONMENT VARIABLES:
  LIBGS      Path to Ghostscript's shared library, passed to dvisvgm
  RUST_LOG   Log filter, e.g. RUST_LOG=latex2svg=debug
"#;

#[derive(Parser, Debug)]
#[command(
    name = "latex2svg",
    version,
    about = "Render LaTeX code from stdin as SVG to stdout",
    long_about = "Render LaTeX code from stdin as SVG to stdout. Writes metadata (baseline \
offset, width, height in em units) into the SVG attributes.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// LaTeX preamble code to read from file.
    #[arg(long, env = "LATEX2SVG_PREAMBLE")]
    preamble: Option<PathBuf>,

    /// SVG optimizer to use.
    #[arg(long, env = "LATEX2SVG_OPTIMIZER", value_enum, default_value = "scour")]
    optimizer: OptimizerArg,

    /// SVG output scaling.
    #[arg(long, env = "LATEX2SVG_SCALE", default_value_t = 1.0)]
    scale: f64,

    /// Document font size in TeX points.
    #[arg(long, env = "LATEX2SVG_FONTSIZE", default_value_t = 12.0)]
    fontsize: f64,

    /// Write the SVG to a file instead of stdout.
    #[arg(short, long, env = "LATEX2SVG_OUTPUT")]
    output: Option<PathBuf>,

    /// Print `{svg, width, height, valign}` as JSON.
    #[arg(long, env = "LATEX2SVG_JSON")]
    json: bool,

    #[arg(short, long, env = "LATEX2SVG_VERBOSE")]
    verbose: bool,

    #[arg(short, long, env = "LATEX2SVG_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum OptimizerArg {
    Scour,
    Svgo,
    None,
}

impl From<OptimizerArg> for Optimizer {
    fn from(v: OptimizerArg) -> Self {
        match v {
            OptimizerArg::Scour => Optimizer::Scour,
            OptimizerArg::Svgo => Optimizer::Svgo,
            OptimizerArg::None => Optimizer::None,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}

fn run(cli: &Cli) -> Result<()> {
    let params = build_params(cli)?;

    let mut latex = String::new();
    io::stdin()
        .read_to_string(&mut latex)
        .context("Failed to read LaTeX from stdin")?;

    let output = match cli.output {
        Some(ref path) => convert_to_file(&latex, path, &params)?,
        None => convert(&latex, &params)?,
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if cli.output.is_none() {
        io::stdout()
            .lock()
            .write_all(output.svg.as_bytes())
            .context("Failed to write to stdout")?;
    }
    Ok(())
}

/// Map CLI args to `ConversionParams`.
fn build_params(cli: &Cli) -> Result<ConversionParams> {
    let mut builder = ConversionParams::builder()
        .optimizer(cli.optimizer.into())
        .scale(cli.scale)
        .fontsize(cli.fontsize);

    if let Some(ref path) = cli.preamble {
        let preamble = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read preamble from {:?}", path))?;
        builder = builder.preamble(preamble);
    }
    if let Some(libgs) = latex2svg::detect_libgs() {
        builder = builder.libgs(libgs);
    }

    builder.build().context("Invalid configuration")
}

/// Print an error the way the tools would and pick the exit status.
fn report(err: &anyhow::Error) -> ExitCode {
    let code = match err.downcast_ref::<Latex2SvgError>() {
        Some(e @ Latex2SvgError::ToolFailed { .. }) => {
            // LaTeX writes its errors to stdout, dvisvgm to stderr: show both.
            if let Some(diag) = e.diagnostics() {
                eprintln!("{diag}");
            }
            eprintln!("latex2svg: {e}");
            e.exit_code()
        }
        Some(e) => {
            eprintln!("latex2svg: {e}");
            e.exit_code()
        }
        None => {
            eprintln!("latex2svg: {err:#}");
            1
        }
    };
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
