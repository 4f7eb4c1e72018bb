use anyhow::{Context, Result};
use tsfdata::{TsfApi, TsfData};

/// Axis conversion direction
#[derive(Clone, Copy, Debug)]
pub enum Direction {
    IndexToMz,
    MzToIndex,
}

/// Convert values between the index and m/z axes and print input/output pairs
pub fn run<A: TsfApi>(tsf: &TsfData<A>, frame: i64, values: &[f64], direction: Direction) -> Result<()> {
    let (converted, header) = match direction {
        Direction::IndexToMz => (tsf.index_to_mz(frame, values), "index\tmz"),
        Direction::MzToIndex => (tsf.mz_to_index(frame, values), "mz\tindex"),
    };
    let converted = converted.with_context(|| format!("Conversion failed for frame {}", frame))?;

    println!("{}", header);
    for (input, output) in values.iter().zip(&converted) {
        println!("{:.6}\t{:.6}", input, output);
    }
    Ok(())
}
