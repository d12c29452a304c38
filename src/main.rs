use anyhow::Result;
use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;
use vadcut::cli::{Cli, Commands, ConfigAction};
use vadcut::config::Config;
use vadcut::runner::{BatchSummary, run_batch};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        None => {
            run_split(&cli).await?;
        }
        Some(Commands::Config { action }) => match action {
            ConfigAction::Dump => {
                print!("{}", Config::dump_template());
            }
        },
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(*shell, &mut Cli::command(), "vadcut", &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Route engine diagnostics to stderr, keyed off -v unless RUST_LOG is set.
fn init_tracing(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let default_directive = match verbose {
        0 => "vadcut=warn",
        1 => "vadcut=info",
        2 => "vadcut=debug",
        _ => "vadcut=trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Segment the input files and report the outcome.
async fn run_split(cli: &Cli) -> Result<()> {
    if cli.inputs.is_empty() {
        eprintln!("No input files given.");
        eprintln!();
        eprintln!("Usage: vadcut [OPTIONS] <FILE>...");
        eprintln!("Try `vadcut --help` for details.");
        std::process::exit(1);
    }

    let mut config = load_config(cli.config.as_deref())?;
    cli.apply_overrides(&mut config)?;
    config.validate()?;

    let jobs = cli.jobs.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    });

    let batch = run_batch(&cli.inputs, &config, jobs).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&batch)?);
    } else if !cli.quiet {
        render_summary(&batch, cli.verbose);
    }

    // Nothing processed at all: make the failure visible to scripts.
    if batch.files.is_empty() && !batch.failures.is_empty() {
        std::process::exit(1);
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/vadcut/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&std::path::Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        Config::load(path)?
    } else {
        Config::load_or_default(&Config::default_path())?
    };

    Ok(config.with_env_overrides())
}

/// Human-readable batch report.
fn render_summary(batch: &BatchSummary, verbose: u8) {
    if verbose >= 1 {
        for file in &batch.files {
            let s = &file.summary;
            println!(
                "{}: {} segments ({:.1}s) from {} candidates, {} rejected",
                file.input,
                s.accepted.to_string().green(),
                s.accepted_duration_secs,
                s.candidates,
                s.rejected_silence + s.rejected_degenerate,
            );
        }
    }

    for failure in &batch.failures {
        eprintln!(
            "{}",
            format!("{}: {}", failure.input, failure.error).red()
        );
    }

    println!(
        "{} files, {} segments, {:.1}s of audio kept",
        batch.files.len(),
        batch.accepted().to_string().green(),
        batch.accepted_duration_secs(),
    );
}
