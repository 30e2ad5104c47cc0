// # mxroute-tools
//
// Command-line front end for MXRoute accounts. This is a THIN integration
// layer: listing, diffing and DKIM logic live in mxroute-core.
//
// The binary is responsible for:
// 1. Parsing arguments (with environment fallbacks)
// 2. Initializing logging and the runtime
// 3. Building the DirectAdmin client and the DNS resolver
// 4. Running one command and printing its result
//
// ## Configuration
//
// - `MXROUTE_HOST`: server name, same as `-s/--host`
// - `MXROUTE_USER`: username, same as `-u/--user`
// - `MXROUTE_PASS`: password or login key, same as `-p/--pass`
// - `MXROUTE_LOG_LEVEL`: trace, debug, info, warn (default) or error
//
// ## Example
//
// ```bash
// export MXROUTE_HOST=maildemo
// export MXROUTE_USER=me@example.com
//
// mxroute-tools list
// mxroute-tools forwarders > forwarders.txt
// mxroute-tools sync --dry-run --input forwarders.txt
// ```

mod opt;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use mxroute_core::forwarders;
use mxroute_core::{
    AccountSnapshot, DkimChecker, Error, FetchScope, PanelConfig, SyncConfig, SyncEngine,
};
use mxroute_directadmin::DirectAdminPanel;
use mxroute_dns::HickoryTxtResolver;
use std::env;
use std::path::Path;
use std::process::ExitCode;
use tokio::io::AsyncReadExt;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ToolExitCode {
    /// Command completed
    Success = 0,
    /// Bad arguments, credentials missing, or malformed forwarder list
    ConfigError = 1,
    /// Authentication failure or other fatal runtime error
    RuntimeError = 2,
    /// One or more forwarder writes failed
    WriteFailed = 3,
}

impl From<ToolExitCode> for ExitCode {
    fn from(code: ToolExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

impl ToolExitCode {
    fn for_error(e: &anyhow::Error) -> Self {
        match e.downcast_ref::<Error>() {
            Some(Error::Format(_) | Error::Config(_)) => Self::ConfigError,
            _ => Self::RuntimeError,
        }
    }
}

/// Pick the log level from `-v` count, then `MXROUTE_LOG_LEVEL`
fn log_level(verbose: u8, env_level: Option<&str>) -> Result<Level> {
    match verbose {
        0 => {}
        1 => return Ok(Level::INFO),
        2 => return Ok(Level::DEBUG),
        _ => return Ok(Level::TRACE),
    }

    match env_level.map(str::to_lowercase).as_deref() {
        None | Some("") => Ok(Level::WARN),
        Some("trace") => Ok(Level::TRACE),
        Some("debug") => Ok(Level::DEBUG),
        Some("info") => Ok(Level::INFO),
        Some("warn") => Ok(Level::WARN),
        Some("error") => Ok(Level::ERROR),
        Some(other) => anyhow::bail!(
            "MXROUTE_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            other
        ),
    }
}

fn main() -> ExitCode {
    let options = opt::Options::parse();

    let env_level = env::var("MXROUTE_LOG_LEVEL").ok();
    let log_level = match log_level(options.verbose, env_level.as_deref()) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ToolExitCode::ConfigError.into();
        }
    };

    // Logs go to stderr so listings on stdout stay pipeable
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ToolExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to create tokio runtime: {}", e);
            return ToolExitCode::RuntimeError.into();
        }
    };

    let code = rt.block_on(async {
        match run(options).await {
            Ok(code) => code,
            Err(e) => {
                error!("{:#}", e);
                eprintln!("Error: {:#}", e);
                ToolExitCode::for_error(&e)
            }
        }
    });

    code.into()
}

/// Run the selected command
async fn run(options: opt::Options) -> Result<ToolExitCode> {
    let command = options.command.unwrap_or(opt::Command::List);

    // Malformed input must stop the run before any remote call
    let sync_input = match &command {
        opt::Command::Sync { input, .. } => {
            let text = read_input(input.as_deref()).await?;
            let entries = forwarders::parse(&text).map_err(Error::from)?;
            info!("Read {} forwarder(s)", entries.len());
            Some(entries)
        }
        _ => None,
    };

    let password = match options.pass {
        Some(pass) => pass,
        None => rpassword::prompt_password("Password or Login Key: ")
            .map_err(|e| Error::config(format!("Failed to read password: {}", e)))?,
    };

    let dry_run = matches!(command, opt::Command::Sync { dry_run: true, .. });
    let mut config = PanelConfig::new(options.host, options.user, password)
        .with_timeout_secs(options.timeout)
        .with_dry_run(dry_run);
    if let Some(url) = options.url {
        config = config.with_base_url(url);
    }
    debug!("Panel configuration: {:?}", config);

    let panel = DirectAdminPanel::new(&config)?;

    match command {
        opt::Command::List => {
            let snapshot = AccountSnapshot::fetch(&panel, FetchScope::ALL).await?;
            print!("{}", output::domains(snapshot.domains()));
            print!("{}", output::mailboxes(&snapshot.mailbox_addresses()));
            print!("{}", output::forwarders(&snapshot.forwarder_entries()));
        }
        opt::Command::Domains => {
            let snapshot = AccountSnapshot::fetch(&panel, FetchScope::DOMAINS).await?;
            print!("{}", output::domains(snapshot.domains()));
        }
        opt::Command::Mailboxes => {
            let scope = FetchScope {
                mailboxes: true,
                forwarders: false,
            };
            let snapshot = AccountSnapshot::fetch(&panel, scope).await?;
            print!("{}", output::mailboxes(&snapshot.mailbox_addresses()));
        }
        opt::Command::Forwarders => {
            let scope = FetchScope {
                mailboxes: false,
                forwarders: true,
            };
            let snapshot = AccountSnapshot::fetch(&panel, scope).await?;
            print!("{}", output::forwarders(&snapshot.forwarder_entries()));
        }
        opt::Command::Dkim => {
            let resolver = HickoryTxtResolver::from_system_conf()?;
            let snapshot = AccountSnapshot::fetch(&panel, FetchScope::DOMAINS).await?;
            let reports = DkimChecker::new(&panel, &resolver)
                .check_all(snapshot.domains())
                .await?;
            print!("{}", output::dkim(&reports));
        }
        opt::Command::Sync { dry_run, .. } => {
            let desired = sync_input.unwrap_or_default();
            let (engine, mut event_rx) = SyncEngine::new(Box::new(panel), SyncConfig::default())?;

            tokio::spawn(async move {
                while let Some(event) = event_rx.recv().await {
                    debug!("Sync event: {:?}", event);
                }
            });

            let report = engine.sync(&desired).await?;
            let rendered = output::sync(&report, dry_run);
            print!("{}", rendered.stdout);
            eprint!("{}", rendered.stderr);

            if report.aborted.is_some() {
                return Ok(ToolExitCode::RuntimeError);
            }
            if !report.is_success() {
                return Ok(ToolExitCode::WriteFailed);
            }
        }
    }

    Ok(ToolExitCode::Success)
}

/// Read the forwarder list from a file, or stdin when no path is given
async fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(Error::from)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .map_err(Error::from)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}
