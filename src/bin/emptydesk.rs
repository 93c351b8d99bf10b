use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use emptydesk::actor;
use emptydesk::actor::config_watcher::ConfigWatcher;
use emptydesk::actor::reactor::Reactor;
use emptydesk::common::config::config_file;
use emptydesk::common::log;
use emptydesk::sys::bridge::BridgeHost;
use tokio::io::BufReader;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "emptydesk")]
#[command(about = "Opens the overview when the current workspace runs out of windows")]
struct Cli {
    /// Read preferences from this file instead of the default location.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip the startup check, regardless of the config.
    #[arg(long)]
    no_startup: bool,

    /// Check whether the config file can be loaded, print any issues and
    /// exit without connecting to the shell.
    #[arg(long)]
    validate: bool,
}

fn main() -> ExitCode {
    let opt: Cli = Parser::parse();

    if std::env::var_os("RUST_BACKTRACE").is_none() {
        // SAFETY: We are single threaded at this point.
        unsafe { std::env::set_var("RUST_BACKTRACE", "1") };
    }
    log::init_logging();
    install_panic_hook();

    let path = opt.config.clone().unwrap_or_else(config_file);

    if opt.validate {
        return validate(&path);
    }

    match run(opt, path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn validate(path: &std::path::Path) -> ExitCode {
    let config = match emptydesk::common::config::Config::read_or_default(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {e:#}", path.display());
            return ExitCode::FAILURE;
        }
    };
    let issues = config.validate();
    if issues.is_empty() {
        println!("{}: ok", path.display());
        return ExitCode::SUCCESS;
    }
    for issue in issues {
        eprintln!("{}: {issue}", path.display());
    }
    ExitCode::FAILURE
}

fn run(opt: Cli, path: PathBuf) -> anyhow::Result<()> {
    let mut config = ConfigWatcher::load(&path)?;
    config.settings.on_startup &= !opt.no_startup;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building runtime")?;

    runtime.block_on(async move {
        let (events_tx, events_rx) = actor::channel();
        let host = BridgeHost::connect(
            BufReader::new(tokio::io::stdin()),
            tokio::io::stdout(),
            events_tx.clone(),
        )
        .await
        .context("connecting to shell")?;

        ConfigWatcher::spawn(path, events_tx);
        Reactor::new(config, host).run(events_rx).await;
        info!("exiting");
        Ok(())
    })
}

#[cfg(panic = "unwind")]
fn install_panic_hook() {
    // Abort on panic instead of propagating panics to the main thread.
    // See Cargo.toml for why we don't use panic=abort everywhere.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        original_hook(info);
        std::process::abort();
    }));
}

#[cfg(not(panic = "unwind"))]
fn install_panic_hook() {}
