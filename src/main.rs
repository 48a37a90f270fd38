//! CLI entry point for `warenpost-label`.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use warenpost_label::config::{self, Config};
use warenpost_label::fetch::HttpFetcher;
use warenpost_label::label::text::LopdfText;
use warenpost_label::mail::gmail::{self, GmailClient};
use warenpost_label::model::label::{OutputArtifact, WriteStatus};
use warenpost_label::pipeline::{Pipeline, PipelineOutcome, PipelineSettings};
use warenpost_label::print::Printer;
use warenpost_label::prompt;

#[derive(Parser)]
#[command(
    name = "warenpost-label",
    version,
    about = "Download the newest Deutsche Post Internetmarke label from Gmail and print it"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Trim the label page (top -50pt, bottom +10pt) before saving
    #[arg(short, long)]
    resize: bool,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file
    #[arg(long, value_name = "FILE", env = "WARENPOST_LABEL_CONFIG")]
    config: Option<PathBuf>,

    /// Directory to store labels in
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Cached OAuth credentials
    #[arg(long, value_name = "FILE")]
    token_file: Option<PathBuf>,

    /// OAuth redirect URI registered for the client
    #[arg(long, value_name = "URI", env = "GOOGLE_CLOUD_REDIRECT_URI")]
    redirect_uri: Option<String>,

    /// CUPS server address
    #[arg(long, value_name = "IP", env = "CUPS_SERVER_IP")]
    cups_server: Option<String>,

    /// CUPS printer name
    #[arg(long, value_name = "NAME", env = "CUPS_PRINTER_NAME")]
    printer: Option<String>,

    /// Timeout for each HTTP request, in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Do not offer to print the label
    #[arg(long, conflicts_with = "yes")]
    no_print: bool,

    /// Print without asking
    #[arg(short, long)]
    yes: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> ExitCode {
    // `.env` feeds the env-backed options below, so it must be read first.
    let env_file = std::env::current_dir()
        .ok()
        .and_then(|dir| config::load_env_file(&dir));
    let cli = Cli::parse();

    let mut config = config::load_config(cli.config.as_deref());
    apply_overrides(&mut config, &cli);

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);
    if let Some(path) = &env_file {
        tracing::info!(path = %path.display(), "Loaded environment file");
    }

    let result = match cli.command {
        Some(Commands::Completions { shell }) => cmd_completions(shell),
        Some(Commands::Manpage) => cmd_manpage(),
        None => cmd_fetch(&cli, &config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Run failed");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Layer command-line and environment values over the file configuration.
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(dir) = &cli.output_dir {
        config.general.output_dir = dir.clone();
    }
    if let Some(secs) = cli.timeout {
        config.general.timeout_secs = secs;
    }
    if let Some(file) = &cli.token_file {
        config.mail.token_file = file.clone();
    }
    if let Some(uri) = &cli.redirect_uri {
        config.mail.redirect_uri = uri.clone();
    }
    if let Some(server) = &cli.cups_server {
        config.printer.server = server.clone();
    }
    if let Some(name) = &cli.printer {
        config.printer.name = name.clone();
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_dir = config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "warenpost-label.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "warenpost-label", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}

/// Resolve the newest label, then offer to print it.
fn cmd_fetch(cli: &Cli, config: &Config) -> anyhow::Result<()> {
    config.validate()?;
    let mail = GmailClient::connect(config)?;
    let documents = HttpFetcher::new(gmail::http_client(config.timeout())?);
    let pipeline = Pipeline {
        mail: &mail,
        documents: &documents,
        text: &LopdfText,
        settings: PipelineSettings::from_config(config, cli.resize),
    };

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message("Looking for a label notification");
    pb.enable_steady_tick(Duration::from_millis(100));
    let outcome = pipeline.run();
    pb.finish_and_clear();

    let artifact = match outcome? {
        PipelineOutcome::NoMessages => {
            println!("no messages found!");
            return Ok(());
        }
        PipelineOutcome::Label { artifact, .. } => artifact,
    };
    report(&artifact);

    if cli.no_print {
        return Ok(());
    }
    let confirmed = cli.yes
        || prompt::confirm(
            "Do you want to print this label?",
            &mut std::io::stdin().lock(),
            &mut std::io::stdout(),
        )?;
    if confirmed {
        Printer::new(&config.printer).print(&artifact.path)?;
    }
    Ok(())
}

fn report(artifact: &OutputArtifact) {
    use humansize::{format_size, BINARY};

    match artifact.status {
        WriteStatus::AlreadyDownloaded => {
            println!("File {} is already downloaded!", artifact.path.display());
        }
        WriteStatus::Written => {
            let size = std::fs::metadata(&artifact.path)
                .map(|m| format_size(m.len(), BINARY))
                .unwrap_or_default();
            println!(
                "File '{}' downloaded successfully ({size}).",
                artifact.path.display()
            );
        }
    }
}
