#![windows_subsystem = "windows"]

use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;

use rsgif::constants::{DEFAULT_RATIO, OUTPUT_DIR_NAME};
use rsgif::encoder::ensure_output_dir;
use rsgif::i18n::Lang;
use rsgif::{logging, GifFileEncoder, RecorderConfig, SessionController, XcapCapturer};

mod draw;
mod selection;
mod ui;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LangArg {
    Zh,
    En,
}

/// Record a screen region as an animated GIF.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Directory the GIFs are written to
    #[arg(long, default_value = OUTPUT_DIR_NAME)]
    output_dir: PathBuf,

    /// Aspect ratio used by fixed-ratio selection (`F`), e.g. 16:9 or 4：3
    #[arg(long, default_value = DEFAULT_RATIO)]
    ratio: String,

    /// Interface language
    #[arg(long, value_enum, default_value_t = LangArg::Zh)]
    lang: LangArg,
}

fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    let config = RecorderConfig::with_output_dir(&cli.output_dir);
    ensure_output_dir(&config.output_dir)
        .with_context(|| format!("cannot create {}", config.output_dir.display()))?;
    info!("writing GIFs to {}", config.output_dir.display());

    let lang = match cli.lang {
        LangArg::Zh => Lang::Zh,
        LangArg::En => Lang::En,
    };

    let (tx, rx) = mpsc::channel();
    let encoder = GifFileEncoder::new(config.frame_delay);
    let mut controller =
        SessionController::new(config, Arc::new(XcapCapturer), Arc::new(encoder), tx);
    let mut presenter = ui::Presenter::new(rx, lang);

    ui::run(&mut controller, &mut presenter, &cli.ratio)
}
