use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use docx_conformity::analysis::{DEFAULT_LABEL, DEFAULT_MAX_DEPTH};
use docx_conformity::{AnalysisOptions, AnnotationColor, ChartImage, Error, report};

#[derive(Parser)]
#[command(name = "docx-conformity")]
#[command(version)]
#[command(about = "Count conformity markers and extract red annotations from a DOCX checklist", long_about = None)]
struct Cli {
    /// Input DOCX checklist
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Write the report as a Word document
    #[arg(long, value_name = "FILE")]
    docx: Option<PathBuf>,

    /// Append the report to a copy of the input instead of a new document
    #[arg(long, requires = "docx")]
    append: bool,

    /// Write a PDF summary
    #[arg(long, value_name = "FILE")]
    pdf: Option<PathBuf>,

    /// Write descriptions and table indices as CSV
    #[arg(long, value_name = "FILE")]
    csv: Option<PathBuf>,

    /// Write the result as JSON (stdout when no file is given)
    #[arg(long, value_name = "FILE", num_args = 0..=1, default_missing_value = "-")]
    json: Option<PathBuf>,

    /// Chart PNG to embed in the DOCX and PDF reports
    #[arg(long, value_name = "PNG")]
    chart: Option<PathBuf>,

    /// Field label that precedes annotations
    #[arg(long, default_value = DEFAULT_LABEL)]
    label: String,

    /// Additional annotation color as hex, e.g. C00000 (repeatable)
    #[arg(long = "color", value_name = "HEX", value_parser = parse_color)]
    colors: Vec<AnnotationColor>,

    /// Nested table levels followed below each top-level table
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Keep empty descriptions even when they reconcile with the counts
    #[arg(long)]
    no_sanitize: bool,

    /// Do not print the summary
    #[arg(short, long)]
    quiet: bool,
}

fn parse_color(value: &str) -> Result<AnnotationColor, String> {
    AnnotationColor::from_hex(value).ok_or_else(|| format!("not a six digit hex color: {value}"))
}

fn read_input(path: &Path) -> Result<Vec<u8>, Error> {
    std::fs::read(path).map_err(|e| {
        Error::Io(io::Error::new(e.kind(), format!("{}: {}", e, path.display())))
    })
}

fn run(cli: Cli) -> Result<(), Error> {
    let mut options = AnalysisOptions::new()
        .with_label(cli.label)
        .with_max_depth(cli.max_depth)
        .with_sanitize(!cli.no_sanitize);
    for color in cli.colors {
        options = options.with_annotation_color(color);
    }

    let input = read_input(&cli.input)?;
    let result = docx_conformity::analyze_docx_bytes(&input, &options)?;
    let chart = cli.chart.as_deref().map(ChartImage::load).transpose()?;

    let json_to_stdout = cli.json.as_deref() == Some(Path::new("-"));
    if json_to_stdout {
        println!("{}", report::to_json(&result, true)?);
    } else if !cli.quiet {
        print!("{}", report::summary_text(&result));
    }

    if let Some(path) = cli.json.as_deref().filter(|_| !json_to_stdout) {
        std::fs::write(path, report::to_json(&result, true)?)?;
        log::info!("Wrote {}", path.display());
    }

    if let Some(path) = &cli.docx {
        let bytes = if cli.append {
            report::docx::append_report(&input, &result, chart.as_ref())?
        } else {
            report::docx::build_report(&result, chart.as_ref())?
        };
        std::fs::write(path, bytes)?;
        log::info!("Wrote {}", path.display());
    }

    if let Some(path) = &cli.pdf {
        std::fs::write(path, report::pdf::render(&result, chart.as_ref())?)?;
        log::info!("Wrote {}", path.display());
    }

    if let Some(path) = &cli.csv {
        std::fs::write(path, report::to_csv(&result)?)?;
        log::info!("Wrote {}", path.display());
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
