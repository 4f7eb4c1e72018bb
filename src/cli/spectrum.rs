use anyhow::{Context, Result};
use log::info;
use serde::Serialize;
use tsfdata::{TsfApi, TsfData};

use super::SpectrumKind;

/// Read one spectrum and print it
pub fn run<A: TsfApi>(tsf: &mut TsfData<A>, id: i64, kind: SpectrumKind, json: bool) -> Result<()> {
    let context = || format!("Failed to read spectrum {}", id);

    match kind {
        SpectrumKind::Line => {
            let spectrum = tsf.read_line_spectrum(id).with_context(context)?;
            info!(
                "Spectrum {}: {} peaks, total intensity {:.0}",
                id,
                spectrum.len(),
                spectrum.total_intensity()
            );
            if json {
                return print_json(&spectrum);
            }
            println!("index\tintensity");
            for (index, intensity) in spectrum.peaks() {
                println!("{:.4}\t{}", index, intensity);
            }
        }
        SpectrumKind::Width => {
            let spectrum = tsf.read_line_spectrum_with_width(id).with_context(context)?;
            info!("Spectrum {}: {} peaks", id, spectrum.len());
            if json {
                return print_json(&spectrum);
            }
            println!("index\tintensity\twidth");
            for (index, intensity, width) in spectrum.peaks() {
                println!("{:.4}\t{}\t{:.4}", index, intensity, width);
            }
        }
        SpectrumKind::Profile => {
            let spectrum = tsf.read_profile_spectrum(id).with_context(context)?;
            info!("Spectrum {}: {} profile samples", id, spectrum.len());
            if json {
                return print_json(&spectrum);
            }
            println!("index\tintensity");
            for (index, intensity) in spectrum.intensities.iter().enumerate() {
                println!("{}\t{}", index, intensity);
            }
        }
        SpectrumKind::Centroid => {
            let spectrum = tsf.read_centroid_spectrum(id).with_context(context)?;
            if let Some(base) = spectrum.base_peak() {
                info!(
                    "Spectrum {}: {} peaks, base peak m/z {:.4}",
                    id,
                    spectrum.len(),
                    spectrum.mz[base]
                );
            }
            if json {
                return print_json(&spectrum);
            }
            println!("mz\tintensity");
            for (mz, intensity) in spectrum.peaks() {
                println!("{:.6}\t{}", mz, intensity);
            }
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize spectrum")?;
    println!("{}", json);
    Ok(())
}
