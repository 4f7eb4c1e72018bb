use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use std::path::{Path, PathBuf};
use tsfdata::library::default_library_path;
use tsfdata::{ReaderConfig, TsfData, TsfLibrary};

mod config;
mod convert;
mod info;
mod spectrum;

pub use config::Config;

/// tsfdata - Read spectra from Bruker TSF analyses
#[derive(Parser)]
#[command(name = "tsfdata")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to timsdata.dll / libtimsdata.so (defaults to $TSFDATA_LIBRARY)
    #[arg(long, value_name = "FILE", global = true)]
    library: Option<PathBuf>,

    /// Load settings from a TOML config file
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Number of worker threads for the vendor library
    #[arg(long, value_name = "N", global = true)]
    threads: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

/// Which representation of a spectrum to read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum SpectrumKind {
    /// Line spectrum on the index axis
    #[default]
    Line,
    /// Line spectrum with peak widths
    Width,
    /// Raw profile counts
    Profile,
    /// Line spectrum converted to m/z
    Centroid,
}

#[derive(Subcommand)]
enum Commands {
    /// Display information about a TSF analysis
    Info {
        /// Analysis directory (.d)
        #[arg(value_name = "ANALYSIS_DIR")]
        analysis: PathBuf,

        /// Use device recalibration data if available
        #[arg(long)]
        recalibration: bool,

        /// Ignore device recalibration data, even if the config enables it
        #[arg(long, conflicts_with = "recalibration")]
        no_recalibration: bool,
    },

    /// Print one spectrum
    Spectrum {
        /// Analysis directory (.d)
        #[arg(value_name = "ANALYSIS_DIR")]
        analysis: PathBuf,

        /// Spectrum id (frame id)
        #[arg(value_name = "ID")]
        id: i64,

        /// Spectrum representation
        #[arg(short, long, default_value = "line", value_enum)]
        kind: SpectrumKind,

        /// Use device recalibration data if available
        #[arg(long)]
        recalibration: bool,

        /// Ignore device recalibration data, even if the config enables it
        #[arg(long, conflicts_with = "recalibration")]
        no_recalibration: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Convert sample indices to m/z
    IndexToMz {
        /// Analysis directory (.d)
        #[arg(value_name = "ANALYSIS_DIR")]
        analysis: PathBuf,

        /// Frame whose calibration is used
        #[arg(value_name = "FRAME")]
        frame: i64,

        /// Index values to convert
        #[arg(value_name = "VALUES")]
        values: Vec<f64>,
    },

    /// Convert m/z values to sample indices
    MzToIndex {
        /// Analysis directory (.d)
        #[arg(value_name = "ANALYSIS_DIR")]
        analysis: PathBuf,

        /// Frame whose calibration is used
        #[arg(value_name = "FRAME")]
        frame: i64,

        /// m/z values to convert
        #[arg(value_name = "VALUES")]
        values: Vec<f64>,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let library_path = cli
        .library
        .clone()
        .or_else(|| config.library.path.clone())
        .unwrap_or_else(|| PathBuf::from(default_library_path()));
    let library = load_library(&library_path, cli.threads.or(config.library.num_threads))?;

    match cli.command {
        Commands::Info {
            analysis,
            recalibration,
            no_recalibration,
        } => {
            let recalibration = recalibration_override(recalibration, no_recalibration);
            let tsf = open_analysis(&library, &analysis, &config.reader, recalibration)?;
            info::run(&tsf, &analysis, &library_path)
        }
        Commands::Spectrum {
            analysis,
            id,
            kind,
            recalibration,
            no_recalibration,
            json,
        } => {
            let recalibration = recalibration_override(recalibration, no_recalibration);
            let mut tsf = open_analysis(&library, &analysis, &config.reader, recalibration)?;
            spectrum::run(&mut tsf, id, kind, json)
        }
        Commands::IndexToMz {
            analysis,
            frame,
            values,
        } => {
            let tsf = open_analysis(&library, &analysis, &config.reader, None)?;
            convert::run(&tsf, frame, &values, convert::Direction::IndexToMz)
        }
        Commands::MzToIndex {
            analysis,
            frame,
            values,
        } => {
            let tsf = open_analysis(&library, &analysis, &config.reader, None)?;
            convert::run(&tsf, frame, &values, convert::Direction::MzToIndex)
        }
    }
}

fn load_library(path: &Path, threads: Option<u32>) -> Result<TsfLibrary> {
    info!("Library: {}", path.display());
    let library = TsfLibrary::load(path)
        .with_context(|| format!("Failed to load vendor library: {}", path.display()))?;
    if let Some(threads) = threads {
        library.set_num_threads(threads);
    }
    Ok(library)
}

/// `--recalibration` / `--no-recalibration`; `None` keeps the configured value.
fn recalibration_override(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn reader_config(base: &ReaderConfig, recalibration: Option<bool>) -> ReaderConfig {
    base.clone()
        .with_recalibration(recalibration.unwrap_or(base.use_recalibration))
}

fn open_analysis<'a>(
    library: &'a TsfLibrary,
    analysis: &Path,
    config: &ReaderConfig,
    recalibration: Option<bool>,
) -> Result<TsfData<&'a TsfLibrary>> {
    if !analysis.exists() {
        anyhow::bail!("Analysis directory does not exist: {}", analysis.display());
    }

    let config = reader_config(config, recalibration);
    info!("Analysis: {}", analysis.display());
    info!("Recalibration: {}", config.use_recalibration);

    TsfData::open_with_config(library, analysis, &config)
        .with_context(|| format!("Failed to open analysis: {}", analysis.display()))
}
