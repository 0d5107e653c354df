//! qcomposer - compose question/answer pairs from typed modules in the terminal

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use qcomposer_core::{Config, PointerKind, Presets};
use qcomposer_tui::App;
use std::path::{Path, PathBuf};

/// A terminal composer for question/answer pairs
#[derive(Parser, Debug)]
#[command(name = "qcomposer")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (defaults to the platform config directory)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Presets file; overrides `presets.path` from the config
    #[arg(long, value_name = "FILE")]
    presets: Option<PathBuf>,

    /// Category to start in
    #[arg(long)]
    category: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Pointer class the mouse is treated as
    #[arg(long, value_enum)]
    pointer: Option<PointerArg>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PointerArg {
    Fine,
    Coarse,
}

impl From<PointerArg> for PointerKind {
    fn from(arg: PointerArg) -> Self {
        match arg {
            PointerArg::Fine => PointerKind::Fine,
            PointerArg::Coarse => PointerKind::Coarse,
        }
    }
}

/// The TUI owns the screen, so stderr only gets errors unless RUST_LOG says otherwise
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let default_filter = if log_file.is_some() { "info" } else { "error" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));

    if let Some(path) = log_file {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create log file: {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.try_init().context("Failed to initialize logger")?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.log_file.as_deref())?;

    // Load configuration
    let mut config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load configuration: {}", path.display()))?,
        None => Config::load().context("Failed to load configuration")?,
    };
    if let Some(pointer) = args.pointer {
        config.drag.pointer = pointer.into();
    }

    // Load presets
    let presets = match args.presets.as_ref().or(config.presets.path.as_ref()) {
        Some(path) => Presets::load_from(path)?,
        None => Presets::default(),
    };
    if let Some(category) = &args.category {
        if !presets.categories.contains(category) {
            log::warn!("category {:?} is not in the presets", category);
        }
    }

    let app = App::new(config, presets, args.category);

    // Run TUI
    let result = qcomposer_tui::run(app).context("TUI application error")?;

    if let Some(result) = result {
        let json = serde_json::to_string_pretty(&result).context("Failed to serialize result")?;
        println!("{}", json);
    }

    Ok(())
}
