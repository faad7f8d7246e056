use clap::Parser;
use colored::Colorize;
use directories::ProjectDirs;
use quicknote::api::QuicknoteApi;
use quicknote::config::{home_dir, QuicknoteConfig};
use quicknote::error::{QuicknoteError, Result};
use quicknote::store::FsBackend;
use quicknote::view::{Choice, Prompt, Prompter};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod args;
mod print;
mod session;

use args::{Cli, Commands};
use print::print_snapshots;
use session::{ConsolePrompter, Session};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

struct AppContext {
    api: QuicknoteApi<FsBackend>,
    config: QuicknoteConfig,
    config_dir: PathBuf,
    home: PathBuf,
}

fn run(cli: Cli) -> Result<()> {
    let mut ctx = init_context()?;

    match cli.command {
        Some(Commands::Session { files }) => handle_session(ctx, &files),
        Some(Commands::Snapshots) => handle_snapshots(&ctx),
        Some(Commands::Path { file }) => handle_path(&ctx, &file),
        Some(Commands::Purge { yes }) => handle_purge(&ctx, yes),
        Some(Commands::Config { key, value }) => handle_config(&mut ctx, key, value),
        None => handle_session(ctx, &cli.files),
    }
}

fn init_context() -> Result<AppContext> {
    let proj_dirs = ProjectDirs::from("com", "quicknote", "quicknote")
        .ok_or_else(|| QuicknoteError::Config("Could not determine config dir".to_string()))?;
    let config_dir = proj_dirs.config_dir().to_path_buf();
    let config = QuicknoteConfig::load(&config_dir)?;
    let home = home_dir()?;

    let settings = config.resolve(&home);
    debug!(
        snapshot_dir = %settings.snapshot_dir.display(),
        interval_secs = settings.interval.as_secs(),
        "settings resolved"
    );
    let api = QuicknoteApi::new(FsBackend, &settings, Instant::now());

    Ok(AppContext {
        api,
        config,
        config_dir,
        home,
    })
}

fn handle_session(ctx: AppContext, files: &[PathBuf]) -> Result<()> {
    let stdin = std::io::stdin();
    let mut session = Session::new(ctx.api, stdin.lock());
    session.run(files)
}

fn handle_snapshots(ctx: &AppContext) -> Result<()> {
    let entries = ctx.api.list_snapshots()?;
    print_snapshots(&entries);
    Ok(())
}

fn handle_path(ctx: &AppContext, file: &Path) -> Result<()> {
    println!("{}", ctx.api.snapshot_path_for(file)?.display());
    Ok(())
}

fn handle_purge(ctx: &AppContext, yes: bool) -> Result<()> {
    let count = ctx.api.list_snapshots()?.len();
    if count == 0 {
        println!("No snapshots found.");
        return Ok(());
    }

    if !yes {
        let stdin = std::io::stdin();
        let mut prompter = ConsolePrompter::new(stdin.lock());
        if prompter.confirm(Prompt::PurgeSnapshots { count }) != Choice::Yes {
            println!("{}", "Purge cancelled.".dimmed());
            return Ok(());
        }
    }

    let removed = ctx.api.purge_snapshots()?;
    println!("{}", format!("Purged {} snapshot(s)", removed).green());
    Ok(())
}

fn handle_config(ctx: &mut AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    match (key, value) {
        (None, _) => {
            let settings = ctx.config.resolve(&ctx.home);
            println!("autosave-interval = {}", settings.interval.as_secs());
            println!("snapshot-dir = {}", settings.snapshot_dir.display());
        }
        (Some(k), None) => println!("{} = {}", k, ctx.config.get(&k)?),
        (Some(k), Some(v)) => {
            ctx.config.set(&k, &v)?;
            ctx.config.save(&ctx.config_dir)?;
            println!("{}", format!("{} set to {}", k, v).green());
        }
    }
    Ok(())
}
