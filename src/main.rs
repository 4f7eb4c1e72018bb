//! # tsfdata
//!
//! Command-line access to Bruker TSF analyses through the vendor `timsdata`
//! library.
//!
//! ## Usage
//!
//! ```bash
//! # Show the analysis handle and recalibration state
//! tsfdata info sample.d
//!
//! # Print spectrum 1 as m/z / intensity pairs
//! tsfdata spectrum sample.d 1 --kind centroid
//!
//! # Profile spectrum as JSON, with an explicit library path
//! tsfdata --library /opt/bruker/libtimsdata.so spectrum sample.d 1 --kind profile --json
//!
//! # Convert indices to m/z with the calibration of frame 1
//! tsfdata index-to-mz sample.d 1 1000 25000 180000
//! ```

mod cli;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
