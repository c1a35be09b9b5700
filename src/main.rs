use clap::{ArgAction, Parser, Subcommand};
use freqgraph::report::{self, Summary};
use freqgraph::{
    AnalysisConfig, AnalysisDriver, RampScaling, SampleSource, SpectrumMethod, WavSource,
};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(name = "freqgraph")]
#[command(author, version, about = "Windowed spectral analysis of 16-bit mono WAV files")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// WAV file or directory to analyze
    path: Option<PathBuf>,

    /// Output report file (.freq, .json); stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory for per-file reports when analyzing a directory
    #[arg(long, default_value = "freqgraph-reports")]
    report_dir: PathBuf,

    /// Write JSON instead of the text format
    #[arg(long)]
    json: bool,

    /// Frequency resolution in Hz
    #[arg(long, default_value = "5")]
    step: u32,

    /// Highest analyzed frequency in Hz
    #[arg(long, default_value = "2000")]
    max_freq: u32,

    /// Minimum normalized magnitude for a bin to be reported
    #[arg(long, default_value = "0.5")]
    threshold: f64,

    /// Full-scale sample value used for normalization
    #[arg(long, default_value = "32768")]
    full_scale: f64,

    /// Samples ramped on each side of a repeat seam
    #[arg(long, default_value = "10")]
    fade_width: usize,

    /// Use integer ramp factors when padding short windows
    #[arg(long)]
    truncated_ramp: bool,

    /// Spectrum method: direct, fft, fft-per-bin
    #[arg(long, default_value = "direct")]
    method: SpectrumMethod,

    /// Stop after this many samples per file
    #[arg(long)]
    max_samples: Option<u64>,

    /// Number of parallel workers (default: number of CPUs)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Raise log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only show errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print summary statistics of an existing report
    Summary {
        /// Text or JSON report to read
        report: PathBuf,
    },
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    if let Some(Command::Summary { report }) = &args.command {
        if let Err(e) = print_report_summary(report) {
            eprintln!("Failed to read report: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let path = if let Some(p) = args.path.clone() {
        p
    } else {
        eprintln!("Usage: freqgraph <PATH>");
        eprintln!("Run 'freqgraph --help' for more options.");
        std::process::exit(1);
    };

    let config = AnalysisConfig::new()
        .with_frequency_step(args.step)
        .with_max_frequency(args.max_freq)
        .with_amplitude_threshold(args.threshold)
        .with_max_amplitude(args.full_scale)
        .with_fade_width(args.fade_width)
        .with_ramp(if args.truncated_ramp {
            RampScaling::Truncated
        } else {
            RampScaling::Linear
        })
        .with_method(args.method)
        .with_max_samples(args.max_samples);

    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .ok();
    }

    let ok = if path.is_dir() {
        analyze_directory(&path, &config, &args)
    } else {
        match analyze_single(&path, &config, &args) {
            Ok(()) => true,
            Err(e) => {
                eprintln!("{}: {}", path.display(), e);
                false
            }
        }
    };

    if !ok {
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// The sample rate comes from the file, everything else from the command line.
fn driver_for(source: &WavSource, config: &AnalysisConfig) -> freqgraph::Result<AnalysisDriver> {
    AnalysisDriver::new(config.clone().with_sample_rate(source.sample_rate()))
}

fn analyze_single(path: &Path, config: &AnalysisConfig, args: &Args) -> freqgraph::Result<()> {
    let mut source = WavSource::open(path)?;
    let driver = driver_for(&source, config)?;

    match &args.output {
        Some(output) => {
            let result = driver.run(&mut source)?;
            if args.json {
                report::json::write(BufWriter::new(File::create(output)?), &result)?;
            } else {
                report::generate(output, &result)?;
            }
            if !args.quiet {
                for line in summary_lines(&Summary::from_report(&result)) {
                    eprintln!("{}", line);
                }
                eprintln!("\n\x1b[32mReport saved: {}\x1b[0m", output.display());
            }
        }
        None if args.json => {
            let result = driver.run(&mut source)?;
            report::json::write(io::stdout().lock(), &result)?;
        }
        None => {
            let windows = driver.run_to_writer(&mut source, BufWriter::new(io::stdout().lock()))?;
            if !args.quiet {
                eprintln!("{} windows analyzed", windows);
            }
        }
    }
    Ok(())
}

fn analyze_directory(dir: &Path, config: &AnalysisConfig, args: &Args) -> bool {
    let files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "wav" | "wave"))
                .unwrap_or(false)
        })
        .map(|e| e.path().to_path_buf())
        .collect();

    if files.is_empty() {
        eprintln!("No WAV files found in {}", dir.display());
        return false;
    }

    if let Err(e) = std::fs::create_dir_all(&args.report_dir) {
        eprintln!("Failed to create {}: {}", args.report_dir.display(), e);
        return false;
    }

    if !args.quiet {
        eprintln!("\x1b[1mFreqgraph - Spectral Analysis\x1b[0m");
        eprintln!("{}", "─".repeat(70));
        eprintln!("Found {} WAV file(s)\n", files.len());
    }

    let pb = if !args.quiet && files.len() > 1 {
        let pb = ProgressBar::new(files.len() as u64);
        let style = ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        pb.set_style(style);
        Some(pb)
    } else {
        None
    };

    let extension = if args.json { "json" } else { "freq" };
    let results: Vec<(PathBuf, freqgraph::Result<Summary>)> = files
        .par_iter()
        .map(|path| {
            let output = report_path(&args.report_dir, path, extension);
            let result = analyze_to_file(path, &output, config);
            if let Some(ref pb) = pb {
                pb.inc(1);
                pb.set_message(file_name(path));
            }
            (path.clone(), result)
        })
        .collect();

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    let mut failures = 0;
    for (path, result) in &results {
        match result {
            Ok(summary) => {
                if !args.quiet {
                    println!(
                        "\x1b[32m[OK]\x1b[0m    {:>6} windows  {:>8} bins  {:<12}  {}",
                        summary.windows,
                        summary.total_bins,
                        summary
                            .dominant_frequency
                            .map(|f| format!("{}Hz", f))
                            .unwrap_or_else(|| "-".to_string()),
                        file_name(path)
                    );
                }
            }
            Err(e) => {
                failures += 1;
                println!("\x1b[90m[ERROR]\x1b[0m {}: {}", file_name(path), e);
            }
        }
    }

    if !args.quiet {
        eprintln!("\n{}", "─".repeat(70));
        eprintln!("\x1b[1mSummary:\x1b[0m");
        eprintln!("  \x1b[32m✓ Analyzed:\x1b[0m {}", results.len() - failures);
        if failures > 0 {
            eprintln!("  \x1b[90mErrors:\x1b[0m     {}", failures);
        }
        eprintln!("\n\x1b[32mReports saved: {}\x1b[0m", args.report_dir.display());
    }

    failures == 0
}

fn analyze_to_file(path: &Path, output: &Path, config: &AnalysisConfig) -> freqgraph::Result<Summary> {
    let mut source = WavSource::open(path)?;
    let driver = driver_for(&source, config)?;
    let result = driver.run(&mut source)?;
    report::generate(output, &result)?;
    log::info!("{} -> {}", path.display(), output.display());
    Ok(Summary::from_report(&result))
}

fn report_path(report_dir: &Path, input: &Path, extension: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    report_dir.join(format!("{}.{}", stem, extension))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_report_summary(path: &Path) -> freqgraph::Result<()> {
    let reader = BufReader::new(File::open(path)?);
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let parsed = if is_json {
        report::json::read(reader)?
    } else {
        report::text::parse(reader)?
    };

    println!("total samples: {}", parsed.total_samples);
    println!("window length: {}", parsed.window_length);
    for line in summary_lines(&Summary::from_report(&parsed)) {
        println!("{}", line);
    }
    Ok(())
}

fn summary_lines(summary: &Summary) -> Vec<String> {
    let mut lines = vec![
        format!("windows:        {}", summary.windows),
        format!("silent windows: {}", summary.silent_windows),
        format!("bins reported:  {}", summary.total_bins),
    ];
    if let Some(peak) = summary.peak {
        lines.push(format!(
            "peak:           {} Hz at sample {} ({:.6})",
            peak.frequency, peak.sample_offset, peak.magnitude
        ));
    }
    if let Some(freq) = summary.dominant_frequency {
        lines.push(format!("dominant:       {} Hz", freq));
    }
    lines
}
