//! Side-by-side magnitudes from every spectrum engine for one window
//!
//! Reads the first power-of-two window of a WAV file and prints, per bin, the
//! direct summation, the recursive per-bin butterfly and the planned transform.

use freqgraph::analyzer::direct::bin_magnitude;
use freqgraph::analyzer::fast::bin_frequency;
use freqgraph::analyzer::FastTransformEngine;
use freqgraph::{AnalysisConfig, SampleSource, SpectrumMethod, WavSource};
use std::env;
use std::f64::consts::PI;

const MAX_ROWS: usize = 64;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: compare_engines <file.wav> [max_freq]");
        std::process::exit(1);
    }
    let max_frequency = match args.get(2).map(|s| s.parse::<u32>()) {
        Some(Ok(f)) => f,
        Some(Err(e)) => {
            eprintln!("Bad max_freq: {}", e);
            std::process::exit(1);
        }
        None => 500,
    };

    if let Err(e) = compare(&args[1], max_frequency) {
        eprintln!("{}: {}", args[1], e);
        std::process::exit(1);
    }
}

fn compare(path: &str, max_frequency: u32) -> freqgraph::Result<()> {
    let mut source = WavSource::open(path)?;
    let config = AnalysisConfig::new()
        .with_sample_rate(source.sample_rate())
        .with_max_frequency(max_frequency)
        .with_method(SpectrumMethod::Fft);
    config.validate()?;

    let n = config.window_length();
    let mut window = vec![0i16; n];
    let read = source.read_window(&mut window)?;
    if read < n {
        log::warn!("only {} of {} samples available, rest left at zero", read, n);
    }

    println!("Sample rate: {} Hz", config.sample_rate);
    println!("Window: {} samples ({:.3}s)", n, n as f64 / config.sample_rate as f64);
    println!("{}", "=".repeat(72));
    println!(
        "{:>6} {:>8} {:>14} {:>14} {:>14}",
        "bin", "Hz", "direct", "per-bin", "planned"
    );

    let engine = FastTransformEngine::new(n)?;
    let data: Vec<f64> = window.iter().map(|&s| s as f64).collect();
    let planned = engine.transform(&data)?;
    let scale = 2.0 * PI / n as f64 / config.max_amplitude;

    let mut worst = 0.0f64;
    let mut rows = 0;
    for k in 1..=n / 2 {
        let freq = bin_frequency(k, config.sample_rate, n);
        if freq > max_frequency {
            break;
        }

        let direct = bin_magnitude(&window, k, config.max_amplitude);
        let per_bin = engine.compute_bin(k, &data)?.norm() * scale;
        let fast = planned[k].norm() * scale;
        worst = worst.max((direct - fast).abs()).max((per_bin - fast).abs());

        if rows < MAX_ROWS {
            println!(
                "{:>6} {:>8} {:>14.6} {:>14.6} {:>14.6}",
                k, freq, direct, per_bin, fast
            );
        }
        rows += 1;
    }

    if rows > MAX_ROWS {
        println!("... {} more bins", rows - MAX_ROWS);
    }
    println!("{}", "=".repeat(72));
    println!("Largest disagreement: {:.3e}", worst);
    Ok(())
}
