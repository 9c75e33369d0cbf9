// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap (bad usage -> exit code 1)
// 2. Set up logging
// 3. Load the Pushover credentials (a bad file only disables notifications)
// 4. Build the fetcher, extractor, notifier and the monitor loop
// 5. Run until Ctrl-C (exit code 0), or exit 2 if startup fails
//
// Rust concepts used:
// - async/await: The monitor sleeps and fetches without blocking a thread
// - Result<T, E>: For error handling (T = success type, E = error type)
// - CancellationToken: A clean way to tell the loop "stop now"
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - credentials and timing
mod fetch; // src/fetch/ - HTTP sessions and page fetching
mod logging; // src/logging.rs - tracing setup
mod monitor; // src/monitor/ - the main polling loop
mod notify; // src/notify/ - change messages and Pushover
mod units; // src/units/ - unit records, snapshots, diff, HTML extraction

use clap::Parser; // Parser trait enables the try_parse() method
use cli::Cli;
use config::{Config, Credentials};
use fetch::ReqwestFetcher;
use monitor::{GaussianJitter, Monitor};
use notify::PushoverNotifier;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use units::HtmlExtractor;

// anyhow::Result is like std::result::Result but simpler for applications
// It lets us return any error type with the ? operator
use anyhow::Result;

// The #[tokio::main] attribute transforms our async main into a real main function
// It creates a tokio runtime and runs our async code inside it
#[tokio::main]
async fn main() {
    // Parse command-line arguments into our Cli struct
    // clap would exit with code 2 on bad usage; we want 1, so we handle it
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(usage_exit_code(&e));
        }
    };

    logging::init_logging(&cli.log_level);

    let exit_code = match run(Config::from_cli(cli)).await {
        Ok(()) => 0,
        Err(e) => {
            // If an unexpected error occurred, log it and exit with code 2
            error!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Exit code for a failed parse
// --help and --version also come through here, but aren't errors
fn usage_exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() {
        1
    } else {
        0
    }
}

// This is the main application logic
// Returns:
//   Ok(()) = stopped by Ctrl-C
//   Err    = could not start, or gave up after too many failures
async fn run(config: Config) -> Result<()> {
    let credentials = match Credentials::load(&config.credentials_path) {
        Ok(credentials) => Some(credentials),
        Err(e) => {
            error!("Error: {}", e);
            None
        }
    };

    let notifier = PushoverNotifier::new(credentials)?;
    if !notifier.is_enabled() {
        warn!("Notifications are disabled; monitoring will continue");
    }
    let extractor = HtmlExtractor::new(config.sections.clone())?;
    let fetcher = ReqwestFetcher::new();
    let jitter = GaussianJitter::from_entropy();

    let mut monitor = Monitor::new(&config, fetcher, extractor, notifier, jitter)?;

    // Ctrl-C flips the token; the loop notices between iterations or mid-sleep
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, shutting down...");
                on_signal.cancel();
            }
            Err(e) => error!("Could not listen for Ctrl-C: {}", e),
        }
    });

    monitor.run(&cancel).await?;
    info!(
        "Monitor {:?}; last snapshot had {} unit(s)",
        monitor.state(),
        monitor.previous().len()
    );
    Ok(())
}


// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why try_parse() instead of parse()?
//    - parse() exits by itself on bad input, always with code 2
//    - try_parse() hands us the error so we can pick the exit code
//
// 2. Why spawn a task just for Ctrl-C?
//    - The monitor loop is busy awaiting fetches and sleeps
//    - A separate task waits for the signal and cancels the token, and the
//      loop's tokio::select! sees that immediately
//
// 3. What happens if ctrl_c() itself fails?
//    - We log it and keep monitoring; the process can still be killed the
//      hard way
// -----------------------------------------------------------------------------
