//! PRN Analyser command-line runner
//!
//! Reads a print job from a file or stdin and prints the decoded rows.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use prn_analyser::{Analyser, AnalyserConfig, CliArgs, OutputFormat, Report};

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = CliArgs::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("prn-analyse: {}", e);
            ExitCode::FAILURE
        },
    }
}

fn run(args: &CliArgs) -> prn_analyser::Result<()> {
    let config = AnalyserConfig::load_with_args(args)?;
    tracing::debug!(?config, "configuration loaded");

    let analyser = Analyser::new(config);
    let analysis = match &args.file {
        Some(path) => {
            tracing::info!("analysing {}", path.display());
            analyser.analyse_reader(BufReader::new(File::open(path)?))?
        },
        None => analyser.analyse_reader(io::stdin().lock())?,
    };

    let config = analyser.config();
    let report = Report::new(config.offset_format, config.stats);
    let rendered = match config.output {
        OutputFormat::Text => report.render_text(&analysis),
        OutputFormat::Json => report.render_json(&analysis)?,
    };

    let mut stdout = io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    if config.output == OutputFormat::Json {
        writeln!(stdout)?;
    }
    stdout.flush()?;
    Ok(())
}
