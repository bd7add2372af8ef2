use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use shredder::confirm::{AutoConfirm, ConfirmationProvider, ConsolePrompt};
use shredder::scheduler::PassReport;
use shredder::{config, header, shredder::Shredder, validator::Validator, ShredError};
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

const USAGE: &str = "Usage: shredder -f <file location> -i <number of iterations>\n\
The more times you shred the file, the harder it will be to recover.\n\
Default number of iterations is 3.";

/// Shredder - overwrite a file with random data, then optionally delete it
#[derive(Parser, Debug)]
#[command(name = "shredder")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// File to shred
    #[arg(short, long)]
    file: String,

    /// Number of overwrite passes (1-25)
    #[arg(short, long)]
    iterations: Option<String>,

    /// Worker threads (defaults to the number of logical processors)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Delete the file afterwards without asking
    #[arg(short = 'y', long, conflicts_with = "keep")]
    yes: bool,

    /// Keep the shredded file without asking
    #[arg(long)]
    keep: bool,

    /// Only report whether the file already carries the shred banner
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Use RUST_LOG environment variable to control log level (e.g., RUST_LOG=info,shredder=debug)
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .init();

    if std::env::args_os().len() <= 1 {
        return print_usage_and_wait();
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            debug!(error = %e, "argument parsing failed");
            println!("{}", ShredError::InvalidArguments);
            return Ok(());
        }
    };
    info!(file = %cli.file, "Shredder starting");

    if cli.check {
        return cmd_check(&cli.file).await;
    }

    let cfg = config::Config::load_with_env(cli.config.as_deref())?;
    let iterations = cli
        .iterations
        .clone()
        .unwrap_or_else(|| cfg.default_iterations.to_string());

    let request = match Validator::validate(&cli.file, &iterations).await {
        Ok(request) => request,
        Err(e) => {
            println!("{}", e);
            return Ok(());
        }
    };

    let mut shredder = Shredder::new(&cfg);
    if let Some(workers) = cli.workers {
        shredder = shredder.with_workers(workers);
    }

    let pb = create_progress_bar(u64::from(request.iterations()))?;
    let bar = pb.clone();
    let shredder = shredder.with_progress(move |r: &PassReport| {
        bar.inc(1);
        bar.set_message(format!(
            "pass {} by worker {} (passes {}..{})",
            r.pass, r.worker, r.unit.start, r.unit.end
        ));
    });

    let answer: Box<dyn ConfirmationProvider> = if cli.yes {
        Box::new(AutoConfirm(true))
    } else if cli.keep {
        Box::new(AutoConfirm(false))
    } else {
        Box::new(ConsolePrompt)
    };
    let confirm = ShredNotice { inner: answer, pb };

    let report = shredder.shred(&request, &confirm).await?;
    if report.deleted {
        println!("File deleted.");
    }

    Ok(())
}

/// Finishes the progress display and prints the success lines before the
/// deletion question, which only comes after every pass has completed.
struct ShredNotice {
    inner: Box<dyn ConfirmationProvider>,
    pb: ProgressBar,
}

impl ConfirmationProvider for ShredNotice {
    fn confirm_deletion(&self, path: &Path) -> io::Result<bool> {
        self.pb.finish_and_clear();
        print_success();
        self.inner.confirm_deletion(path)
    }
}

fn print_success() {
    println!("---------------------------------------------------");
    println!("File Overwritten successfully.");
    println!("File shredded successfully.");
}

fn print_usage_and_wait() -> Result<()> {
    println!("{}", USAGE);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(())
}

/// Create a progress bar counting completed passes
fn create_progress_bar(total: u64) -> Result<ProgressBar> {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} passes {msg}")?
            .progress_chars("#>-"),
    );
    pb.set_message("overwriting");
    Ok(pb)
}

/// Report whether a file carries the shred banner
async fn cmd_check(file: &str) -> Result<()> {
    match header::read_marker(Path::new(file)).await {
        Ok(true) => println!("{}: shredded", file),
        Ok(false) => println!("{}: not shredded", file),
        Err(e) => {
            debug!(error = %e, "cannot read file");
            println!("{}", ShredError::FileNotFound);
        }
    }
    Ok(())
}
