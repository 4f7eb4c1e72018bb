use anyhow::Result;
use std::path::Path;
use tsfdata::{TsfApi, TsfData};

/// Display information about an open TSF analysis
pub fn run<A: TsfApi>(tsf: &TsfData<A>, analysis: &Path, library: &Path) -> Result<()> {
    let recalibrated = if tsf.has_recalibrated_state() {
        "yes"
    } else {
        "no"
    };

    #[cfg(feature = "colorized_output")]
    {
        use console::style;

        println!("{}", style("TSF Analysis Information").bold().cyan());
        println!("{}", style("========================").cyan());
        println!("{}: {}", style("Analysis").bold(), analysis.display());
        println!("{}: {}", style("Library").bold(), library.display());
        println!("{}: {}", style("Handle").bold(), tsf.handle());
        println!("{}: {}", style("Recalibrated").bold(), recalibrated);
    }

    #[cfg(not(feature = "colorized_output"))]
    {
        println!("TSF Analysis Information");
        println!("========================");
        println!("Analysis: {}", analysis.display());
        println!("Library: {}", library.display());
        println!("Handle: {}", tsf.handle());
        println!("Recalibrated: {}", recalibrated);
    }

    Ok(())
}
