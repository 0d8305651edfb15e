//! Parity harness CLI

use clap::{ArgAction, Parser};
use parity_harness::{HarnessConfig, ParityRunner, Result, create_adapters, report, write_json};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "parity-harness")]
#[command(about = "Compare a spreadsheet-to-CSV implementation against calamine for parity and speed", long_about = None)]
struct Cli {
    /// Workbook to read (may also come from --config)
    file: Option<PathBuf>,

    /// Zero-based sheet index [default: 0]
    #[arg(short = 's', long)]
    sheet_index: Option<usize>,

    /// Number of timed rounds [default: 3]
    #[arg(short = 'r', long)]
    rounds: Option<usize>,

    /// TOML configuration file; command-line flags take precedence
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Executable of the implementation under test
    #[arg(long)]
    subject_program: Option<PathBuf>,

    /// Argument passed to the subject before the file path and sheet index (repeatable)
    #[arg(long = "subject-arg", allow_hyphen_values = true)]
    subject_args: Vec<String>,

    /// Do not ask the subject for its internal timing line
    #[arg(long)]
    no_profile: bool,

    /// Also write the full report as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn into_config(self) -> Result<HarnessConfig> {
        let mut config = match &self.config {
            Some(path) => HarnessConfig::from_toml_file(path)?,
            None => HarnessConfig::default(),
        };

        if let Some(file) = self.file {
            config.file = file;
        }
        if let Some(sheet_index) = self.sheet_index {
            config.sheet_index = sheet_index;
        }
        if let Some(rounds) = self.rounds {
            config.rounds = rounds;
        }
        if let Some(program) = self.subject_program {
            config.subject.program = program;
            // The default arguments belong to the default python3 program
            config.subject.args.clear();
        }
        if !self.subject_args.is_empty() {
            config.subject.args = self.subject_args;
        }
        if self.no_profile {
            config.subject.profile = false;
        }
        if self.json.is_some() {
            config.json_output = self.json;
        }

        Ok(config)
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.into_config()?;
    config.validate()?;

    tracing::info!(
        file = %config.file.display(),
        sheet_index = config.sheet_index,
        rounds = config.rounds,
        subject = %config.subject.program.display(),
        "Starting parity run"
    );

    let (subject, reference) = create_adapters(&config);
    let subject_name = config.subject.name.clone();
    let reference_name = config.reference_name.clone();

    let mut runner = ParityRunner::new(
        Box::new(subject),
        Box::new(reference),
        config.file.clone(),
        config.sheet_index,
        config.rounds,
    );

    let stdout = std::io::stdout();
    let run_report = runner
        .run_with_progress(|measurement| {
            let mut out = stdout.lock();
            if let Err(e) = report::write_round(&mut out, &subject_name, &reference_name, measurement)
                .and_then(|()| out.flush())
            {
                tracing::warn!(error = %e, "Failed to print round");
            }
        })
        .await?;

    {
        let mut out = stdout.lock();
        report::write_parity(&mut out, &run_report)?;
        report::write_summary(&mut out, &run_report)?;
        out.flush()?;
    }

    if let Some(path) = &config.json_output {
        write_json(&run_report, path)?;
    }

    Ok(())
}
